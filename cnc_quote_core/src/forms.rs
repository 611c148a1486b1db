//! Contact and quote-request form validation
//!
//! Each validator returns every error and warning it finds. A form is
//! acceptable when it has no errors; warnings are advisory.

use crate::Result;
use crate::error::ValidationError;
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// Mainland China mobile or landline, with optional country prefix
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\+|00)86)?1[3-9][0-9]{9}$|^(?:(?:\+|00)86)?(?:0[0-9]{2,3}-?)?[0-9]{7,8}$")
        .expect("valid phone pattern")
});

/// Quantity above which a quote request should go to sales
const BULK_QUANTITY: u32 = 10_000;
const EXTREME_PRECISION_QUANTITY: u32 = 100;
const IMMEDIATE_DELIVERY_QUANTITY: u32 = 10;
const SHORT_MESSAGE_CHARS: usize = 10;
const SUBMISSION_SUFFIX_LEN: usize = 9;

pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Spaces and dashes are ignored
pub fn validate_phone(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    PHONE.is_match(&compact)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Errors and warnings for one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn check_contact_details(&mut self, name: &str, email: &str, phone: Option<&str>) {
        if is_blank(name) {
            self.error("Please enter your name");
        }
        if is_blank(email) {
            self.error("Please enter an email address");
        } else if !validate_email(email) {
            self.error("Please enter a valid email address");
        }
        if let Some(phone) = phone.filter(|p| !p.is_empty())
            && !validate_phone(phone)
        {
            self.error("Please enter a valid phone number");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    pub service: Option<String>,
    pub quantity: Option<String>,
    pub contact_preference: String,
    pub privacy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRequestForm {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub material: String,
    pub quantity: u32,
    pub precision: Option<String>,
    pub delivery: Option<String>,
    pub requirements: Option<String>,
}

pub fn validate_contact_form(form: &ContactForm) -> FormValidation {
    let mut v = FormValidation::default();
    v.check_contact_details(&form.name, &form.email, form.phone.as_deref());

    if is_blank(&form.message) {
        v.error("Please describe your project");
    } else if form.message.chars().count() < SHORT_MESSAGE_CHARS {
        v.warning("A project description of at least 10 characters is recommended");
    }
    if is_blank(&form.contact_preference) {
        v.error("Please choose a contact preference");
    }
    if !form.privacy {
        v.error("Please read and accept the privacy policy");
    }
    if form.service.as_deref() == Some("other")
        && !form.message.to_lowercase().contains("service")
    {
        v.warning("When choosing another service, describe the service you need");
    }

    v
}

pub fn validate_quote_form(form: &QuoteRequestForm) -> FormValidation {
    let mut v = FormValidation::default();
    v.check_contact_details(&form.name, &form.email, form.phone.as_deref());

    if is_blank(&form.material) {
        v.error("Please choose a material");
    }
    if form.quantity < 1 {
        v.error("Please enter a valid quantity of at least 1");
    } else if form.quantity > BULK_QUANTITY {
        v.warning("Orders above 10000 parts should contact sales for a dedicated quote");
    }
    if form.precision.as_deref() == Some("extreme") && form.quantity > EXTREME_PRECISION_QUANTITY
    {
        v.warning(
            "Extreme precision (±0.01 mm) is costly at volume; check whether every dimension needs it",
        );
    }
    if form.delivery.as_deref() == Some("immediate") && form.quantity > IMMEDIATE_DELIVERY_QUANTITY
    {
        v.warning("Immediate delivery (12 hours) suits small batches; large orders may be late");
    }

    v
}

/// Which form a submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Contact,
    Quote,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Quote => "quote",
        }
    }
}

/// An accepted form with its assigned id
#[derive(Debug, Clone, Serialize)]
pub struct Submission<T> {
    pub id: String,
    pub kind: FormKind,
    pub status: String,
    pub created_at: chrono::DateTime<Utc>,
    pub warnings: Vec<String>,
    pub data: T,
}

/// Id of the form `<kind>_<millis>_<9 random alphanumerics>`
pub fn submission_id(kind: FormKind, rng: &mut StdRng) -> String {
    let suffix: String = (0..SUBMISSION_SUFFIX_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect();
    format!("{}_{}_{}", kind.as_str(), Utc::now().timestamp_millis(), suffix)
}

fn accept<T>(
    kind: FormKind,
    data: T,
    validation: FormValidation,
    rng: &mut StdRng,
) -> Result<Submission<T>> {
    if !validation.is_valid() {
        return Err(ValidationError::form_rejected(kind.as_str(), validation.errors).into());
    }
    Ok(Submission {
        id: submission_id(kind, rng),
        kind,
        status: "new".to_string(),
        created_at: Utc::now(),
        warnings: validation.warnings,
        data,
    })
}

/// Validate a contact form and assign it an id
pub fn submit_contact(form: ContactForm, rng: &mut StdRng) -> Result<Submission<ContactForm>> {
    let validation = validate_contact_form(&form);
    accept(FormKind::Contact, form, validation, rng)
}

/// Validate a quote request and assign it an id
pub fn submit_quote_request(
    form: QuoteRequestForm,
    rng: &mut StdRng,
) -> Result<Submission<QuoteRequestForm>> {
    let validation = validate_quote_form(&form);
    accept(FormKind::Quote, form, validation, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn contact() -> ContactForm {
        ContactForm {
            name: "Li Wei".to_string(),
            email: "li.wei@example.com".to_string(),
            message: "Need 20 aluminium housings machined".to_string(),
            contact_preference: "email".to_string(),
            privacy: true,
            ..Default::default()
        }
    }

    fn quote_request() -> QuoteRequestForm {
        QuoteRequestForm {
            name: "Ana".to_string(),
            email: "ana@example.org".to_string(),
            material: "aluminium".to_string(),
            quantity: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(validate_email("a@b.co"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.de"));
        assert!(!validate_email("@c.de"));
    }

    #[test]
    fn test_phone_patterns() {
        assert!(validate_phone("13812345678"));
        assert!(validate_phone("+86 138 1234 5678"));
        assert!(validate_phone("010-12345678"));
        assert!(validate_phone("0086 0755 1234567"));
        assert!(!validate_phone("12812345678"));
        assert!(!validate_phone("12345"));
    }

    #[test]
    fn test_phone_rejects_non_ascii_digits() {
        // Arabic-Indic and full-width digits
        assert!(!validate_phone("13١٢٣٤٥٦٧٨٩"));
        assert!(!validate_phone("010-１２３４５６７８"));
    }

    #[test]
    fn test_valid_contact_form() {
        let v = validate_contact_form(&contact());
        assert!(v.is_valid());
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn test_contact_form_collects_all_errors() {
        let form = ContactForm {
            email: "nope".to_string(),
            phone: Some("123".to_string()),
            ..Default::default()
        };

        let v = validate_contact_form(&form);
        assert_eq!(v.errors.len(), 6);
        assert!(v.errors.contains(&"Please enter a valid email address".to_string()));
    }

    #[test]
    fn test_contact_form_warnings() {
        let mut form = contact();
        form.message = "Parts".to_string();
        form.service = Some("other".to_string());

        let v = validate_contact_form(&form);
        assert!(v.is_valid());
        assert_eq!(v.warnings.len(), 2);
    }

    #[test]
    fn test_quote_form_quantity_rules() {
        let mut form = quote_request();
        form.quantity = 0;
        assert!(!validate_quote_form(&form).is_valid());

        form.quantity = 20_000;
        form.precision = Some("extreme".to_string());
        form.delivery = Some("immediate".to_string());
        form.requirements = Some("Anodized, M4 threads".to_string());
        let v = validate_quote_form(&form);
        assert!(v.is_valid());
        assert_eq!(v.warnings.len(), 3);
    }

    #[test]
    fn test_submission_id_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let submission = submit_quote_request(quote_request(), &mut rng).unwrap();

        let parts: Vec<&str> = submission.id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "quote");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert_eq!(submission.status, "new");
    }

    #[test]
    fn test_rejected_submission() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = submit_contact(ContactForm::default(), &mut rng).unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().starts_with("contact form rejected"));
    }
}
