use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use cnc_quote_cli::config::{AppConfig, ConfigManager};
use cnc_quote_cli::error::{CliError, ErrorContext, ExitCode};
use cnc_quote_cli::file_discovery::{FileDiscoveryOptions, collect_candidates};
use cnc_quote_cli::output::{FormReport, OutputFormat, OutputFormatter, create_formatter};
use cnc_quote_cli::progress::{RenderOutcome, create_progress_infrastructure};
use cnc_quote_cli::{paths, terminal};
use cnc_quote_core::error::ValidationError;
use cnc_quote_core::forms::{
    ContactForm, FormKind, FormValidation, QuoteRequestForm, submit_contact,
    submit_quote_request, validate_contact_form, validate_quote_form,
};
use cnc_quote_core::{CandidateFile, QuoteProcessor, validate_batch};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "cncquote")]
#[command(author, version, about = "CNC quote simulator - validate parts, simulate analysis and price a batch", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the candidate files come from
#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Files, directories, or NAME:SIZE entries (e.g. bracket.step:2M)
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<String>,

    /// Walk directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Take every file from directories, not only supported CAD formats
    #[arg(long)]
    all: bool,

    /// Follow symbolic links while walking directories
    #[arg(short = 'L', long)]
    follow_links: bool,

    /// Output format (defaults to output.default_format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, analyze and price a batch of parts
    Quote {
        #[command(flatten)]
        input: InputArgs,

        /// Seed the simulation for a reproducible quote
        #[arg(long)]
        seed: Option<u64>,

        /// Microseconds per simulated time unit (0 runs without delays)
        #[arg(long, value_name = "MICROS")]
        time_unit: Option<u64>,

        /// Disable progress bar display
        #[arg(long)]
        no_progress: bool,

        /// Save the quote as JSON; defaults to the data directory
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        save: Option<Option<PathBuf>>,
    },

    /// Check a batch against the upload limits without quoting it
    Validate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Validate a contact or quote-request form given as JSON
    Form {
        #[arg(value_enum)]
        kind: FormKindArg,

        /// JSON file with the form fields, or '-' for stdin
        file: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (e.g., pipeline.limits.max_files)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., pipeline.limits.max_files)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,

    /// Print the configuration file path
    Path,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormKindArg {
    Contact,
    Quote,
}

impl From<FormKindArg> for FormKind {
    fn from(arg: FormKindArg) -> Self {
        match arg {
            FormKindArg::Contact => FormKind::Contact,
            FormKindArg::Quote => FormKind::Quote,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("cnc_quote_core", log::LevelFilter::Debug)
            .filter_module("cnc_quote_cli", log::LevelFilter::Debug)
            .filter_module("cncquote", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let debug = cli.debug;
    if let Err(error) = run(cli).await {
        let error = CliError::from(error);
        log::debug!("exiting with {:?}", error.exit_code());
        eprint!("{}", error.format_for_user(debug));
        std::process::exit(error.exit_code() as i32);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Quote {
            input,
            seed,
            time_unit,
            no_progress,
            save,
        } => {
            let mut config = load_config()?;
            config.apply_cli_overrides(seed, time_unit);
            quote_command(config, input, no_progress, save).await
        }
        Commands::Validate { input } => validate_command(load_config()?, input),
        Commands::Form { kind, file, format } => {
            form_command(load_config()?, kind.into(), &file, format)
        }
        Commands::Config { command } => config_command(command),
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn load_config() -> Result<AppConfig> {
    let manager = ConfigManager::new();
    let config = manager.load()?;
    log::debug!("Loaded configuration from {}", manager.config_path().display());

    if !config.output.color_enabled || !terminal::colors_supported() {
        colored::control::set_override(false);
    }
    Ok(config)
}

fn formatter_for(config: &AppConfig, format: Option<OutputFormat>) -> Box<dyn OutputFormatter> {
    let format = format.unwrap_or_else(|| config.default_format());
    create_formatter(format, config.output.color_enabled && terminal::colors_supported())
}

fn emit(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

fn discover(config: &AppConfig, input: &InputArgs) -> Result<Vec<CandidateFile>> {
    let mut options = FileDiscoveryOptions::new()
        .with_recursive(input.recursive)
        .with_follow_links(input.follow_links);
    if !input.all {
        options = options.with_extensions(&config.pipeline.limits.allowed_extensions);
    }

    let files = collect_candidates(&input.inputs, &options)?;
    log::debug!("Resolved {} input(s) into {} file(s)", input.inputs.len(), files.len());
    Ok(files)
}

async fn quote_command(
    config: AppConfig,
    input: InputArgs,
    no_progress: bool,
    save: Option<Option<PathBuf>>,
) -> Result<()> {
    let files = discover(&config, &input)?;
    let formatter = formatter_for(&config, input.format);

    let show_progress = !no_progress
        && config.output.progress_enabled
        && terminal::should_show_progress_by_default();
    let progress = create_progress_infrastructure(show_progress);

    let mut processor = QuoteProcessor::new(config.pipeline.clone())?;
    let result = processor.process(&files, progress.observer()).await;

    if let Some(RenderOutcome::Failed(message)) = progress.finish().await {
        log::debug!("Renderer saw failure: {message}");
    }

    let quote = result.map_err(|error| {
        let cli = CliError::from(error);
        if cli.exit_code() == ExitCode::ValidationError {
            cli.with_suggestion("Run 'cncquote validate <inputs>' for a per-file report")
        } else {
            cli
        }
    })?;

    emit(&formatter.format_quote(&quote)?);

    if let Some(target) = save {
        let path = target.unwrap_or_else(|| paths::default_quote_path(&quote.id));
        save_quote(&path, &serde_json::to_string_pretty(&quote)?)?;
        eprintln!("{} Saved quote to {}", "✓".green(), path.display());
    }

    Ok(())
}

fn save_quote(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn validate_command(config: AppConfig, input: InputArgs) -> Result<()> {
    let files = discover(&config, &input)?;
    let validation = validate_batch(&files, &config.pipeline.limits);

    emit(&formatter_for(&config, input.format).format_validation(&validation)?);

    if validation.is_valid() {
        Ok(())
    } else {
        let message = validation.errors.join(&config.pipeline.error_delimiter);
        Err(CliError::validation(&message).into())
    }
}

fn read_payload(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read form from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
    }
}

fn form_command(
    config: AppConfig,
    kind: FormKind,
    file: &Path,
    format: Option<OutputFormat>,
) -> Result<()> {
    let payload = read_payload(file)?;
    let mut rng = match config.pipeline.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let parse_error = || {
        CliError::misuse(&format!("{} is not a valid {} form", file.display(), kind.as_str()))
    };

    let (validation, submission_id): (FormValidation, Option<String>) = match kind {
        FormKind::Contact => {
            let form: ContactForm = serde_json::from_str(&payload).map_err(|e| {
                parse_error().with_context("json", &e.to_string())
            })?;
            let validation = validate_contact_form(&form);
            let id = if validation.is_valid() {
                Some(submit_contact(form, &mut rng)?.id)
            } else {
                None
            };
            (validation, id)
        }
        FormKind::Quote => {
            let form: QuoteRequestForm = serde_json::from_str(&payload).map_err(|e| {
                parse_error().with_context("json", &e.to_string())
            })?;
            let validation = validate_quote_form(&form);
            let id = if validation.is_valid() {
                Some(submit_quote_request(form, &mut rng)?.id)
            } else {
                None
            };
            (validation, id)
        }
    };

    let report = FormReport {
        kind,
        validation,
        submission_id,
    };
    emit(&formatter_for(&config, format).format_form(&report)?);

    if report.submission_id.is_some() {
        log::info!("{} form accepted", kind.as_str());
        Ok(())
    } else {
        let error: cnc_quote_core::Error =
            ValidationError::form_rejected(kind.as_str(), report.validation.errors).into();
        Err(error.into())
    }
}

fn config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Init { force } => {
            manager.init(force)?;
            eprintln!(
                "{}",
                format!("Wrote default configuration to {}", manager.config_path().display())
                    .green()
            );
        }
        ConfigCommand::Get { key } => {
            println!("{}", manager.get(&key)?);
        }
        ConfigCommand::Set { key, value } => {
            manager.set(&key, &value)?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.config_path().display()
            );
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("Config file: {}", manager.config_path().display());

            let mut sections: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
            for (key, value) in items {
                let (section, rest) = key.split_once('.').unwrap_or(("general", key.as_str()));
                sections
                    .entry(section.to_string())
                    .or_default()
                    .push((rest.to_string(), value));
            }

            for (section, items) in sections {
                println!("[{}]", section.yellow());
                for (key, value) in items {
                    println!("  {} = {}", key.cyan(), value);
                }
                println!();
            }
        }
        ConfigCommand::Path => {
            println!("{}", manager.config_path().display());
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
