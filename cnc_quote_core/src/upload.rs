//! Simulated chunked upload

use crate::file::{CandidateFile, MIB};
use crate::pacing::{Pacer, UPLOAD_CHUNK_DELAY};
use crate::progress::{ProgressEvent, ProgressObserver, Stage};
use log::debug;
use rand::rngs::StdRng;

/// Pretends to upload a batch in 1 MiB chunks
///
/// Progress is measured against the declared byte total of the whole batch,
/// so it rises monotonically across file boundaries. Nothing is transferred
/// and the simulation cannot fail.
pub struct UploadSimulator<'a> {
    pacer: &'a Pacer,
}

impl<'a> UploadSimulator<'a> {
    pub fn new(pacer: &'a Pacer) -> Self {
        Self { pacer }
    }

    /// Run the simulation, returning the number of chunks sent
    pub async fn upload(
        &self,
        files: &[CandidateFile],
        rng: &mut StdRng,
        observer: &dyn ProgressObserver,
    ) -> u64 {
        let total = files
            .iter()
            .map(CandidateFile::size)
            .fold(0u64, u64::saturating_add);
        let mut uploaded = 0u64;
        let mut chunks = 0u64;

        for file in files {
            let mut remaining = file.size();
            debug!("Uploading {} ({} chunks)", file.name(), file.chunk_count());

            while remaining > 0 {
                self.pacer.pause(rng, UPLOAD_CHUNK_DELAY).await;

                let chunk = remaining.min(MIB);
                remaining -= chunk;
                uploaded = uploaded.saturating_add(chunk);
                chunks += 1;

                let progress = (uploaded as f64 / total as f64 * 100.0).min(100.0);
                observer.on_progress(
                    ProgressEvent::new(Stage::Upload, progress, format!("Uploading {}", file.name()))
                        .with_file(file.name()),
                );
            }
        }

        chunks
    }
}
