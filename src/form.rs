// Contact form: field rules, validation, character budget and the
// submission state machine. Nothing here touches the document directly.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::notify::{Notification, NotificationKind};
use crate::surface::ClassSlot;
use crate::types::ContactSettings;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

pub const SUCCESS_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Static validation rule for one form field.
#[derive(Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub min_length: Option<usize>,
    pub pattern: Option<&'static Lazy<Regex>>,
    pub pattern_message: &'static str,
}

pub static FIELD_RULES: [FieldRule; 4] = [
    FieldRule {
        name: "name",
        label: "Name",
        required: true,
        min_length: Some(2),
        pattern: None,
        pattern_message: "",
    },
    FieldRule {
        name: "email",
        label: "Email",
        required: true,
        min_length: None,
        pattern: Some(&EMAIL_PATTERN),
        pattern_message: "Please enter a valid email address",
    },
    FieldRule {
        name: "subject",
        label: "Subject",
        required: true,
        min_length: Some(5),
        pattern: None,
        pattern_message: "",
    },
    FieldRule {
        name: "message",
        label: "Message",
        required: true,
        min_length: Some(10),
        pattern: None,
        pattern_message: "",
    },
];

pub fn rule_for(name: &str) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|rule| rule.name == name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldResult {
    fn pass() -> Self {
        FieldResult {
            valid: true,
            message: None,
        }
    }

    fn fail(message: String) -> Self {
        FieldResult {
            valid: false,
            message: Some(message),
        }
    }

    /// Mark the input with `error` or `success`.
    pub fn apply<S: ClassSlot>(&self, field: &S) {
        field.set_class("error", !self.valid);
        field.set_class("success", self.valid);
    }
}

impl FieldRule {
    pub fn check(&self, value: &str) -> FieldResult {
        let value = value.trim();

        if value.is_empty() {
            return if self.required {
                FieldResult::fail(format!("{} is required", self.label))
            } else {
                FieldResult::pass()
            };
        }

        if let Some(min) = self.min_length {
            if value.chars().count() < min {
                return FieldResult::fail(format!(
                    "{} must be at least {} characters",
                    self.label, min
                ));
            }
        }

        if let Some(pattern) = self.pattern {
            if !pattern.is_match(value) {
                return FieldResult::fail(self.pattern_message.to_string());
            }
        }

        FieldResult::pass()
    }
}

/// Validate one field. Fields without a rule always pass.
pub fn validate_field(name: &str, value: &str) -> FieldResult {
    match rule_for(name) {
        Some(rule) => rule.check(value),
        None => FieldResult::pass(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormReport {
    pub valid: bool,
    pub fields: BTreeMap<String, FieldResult>,
}

impl FormReport {
    pub fn invalid_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, result)| !result.valid)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn into_result(self) -> Result<(), SiteError> {
        if self.valid {
            Ok(())
        } else {
            Err(SiteError::Validation {
                fields: self.invalid_fields(),
            })
        }
    }
}

/// Validate every ruled field plus any extra supplied values.
/// A ruled field missing from `values` is checked as empty.
pub fn validate_form(values: &BTreeMap<String, String>) -> FormReport {
    let mut fields = BTreeMap::new();

    for rule in FIELD_RULES.iter() {
        let value = values.get(rule.name).map(String::as_str).unwrap_or("");
        fields.insert(rule.name.to_string(), rule.check(value));
    }
    for (name, value) in values {
        fields
            .entry(name.clone())
            .or_insert_with(|| validate_field(name, value));
    }

    let valid = fields.values().all(|result| result.valid);
    FormReport { valid, fields }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Normal,
    Warning,
    Critical,
}

/// Remaining-characters counter under the message box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBudget {
    pub remaining: i64,
    pub level: BudgetLevel,
}

impl CharacterBudget {
    pub fn measure(text: &str, limit: usize) -> Self {
        let remaining = limit as i64 - text.chars().count() as i64;
        let level = if remaining < 50 {
            BudgetLevel::Critical
        } else if remaining < 100 {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Normal
        };
        CharacterBudget { remaining, level }
    }

    pub fn caption(&self) -> String {
        format!("{} characters remaining", self.remaining)
    }

    pub fn color(&self) -> &'static str {
        match self.level {
            BudgetLevel::Normal => "var(--gray)",
            BudgetLevel::Warning => "#f39c12",
            BudgetLevel::Critical => "#e74c3c",
        }
    }
}

/// Submit button presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub label: String,
    pub icon_class: String,
    pub disabled: bool,
}

impl ButtonState {
    pub fn sending() -> Self {
        ButtonState {
            label: "Sending...".to_string(),
            icon_class: "fas fa-spinner fa-spin".to_string(),
            disabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Sending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// Validation passed; show this button while the request is in flight.
    Started(ButtonState),
    /// A submission is already in flight; ignore.
    AlreadySending,
    Invalid(FormReport),
}

/// What the page does once a submission settles.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub button: ButtonState,
    pub notification: Notification,
    /// Clear inputs and validation styles. Failed submissions keep the input for retry.
    pub reset_form: bool,
}

/// Idle -> Sending -> Idle submission flow.
#[derive(Debug, Clone)]
pub struct ContactForm {
    phase: SubmitPhase,
    idle_button: ButtonState,
}

impl ContactForm {
    /// `idle_button` is the markup's own label and icon, restored after each attempt.
    pub fn new(idle_button: ButtonState) -> Self {
        ContactForm {
            phase: SubmitPhase::Idle,
            idle_button: ButtonState {
                disabled: false,
                ..idle_button
            },
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn begin_submit(&mut self, values: &BTreeMap<String, String>) -> SubmitStart {
        if self.phase == SubmitPhase::Sending {
            return SubmitStart::AlreadySending;
        }

        let report = validate_form(values);
        if !report.valid {
            tracing::debug!(fields = ?report.invalid_fields(), "contact form rejected");
            return SubmitStart::Invalid(report);
        }

        self.phase = SubmitPhase::Sending;
        SubmitStart::Started(ButtonState::sending())
    }

    pub fn finish_submit(&mut self, result: Result<(), SiteError>) -> SubmitOutcome {
        self.phase = SubmitPhase::Idle;
        match result {
            Ok(()) => {
                tracing::info!("contact form sent");
                SubmitOutcome {
                    button: self.idle_button.clone(),
                    notification: Notification::new(NotificationKind::Success, SUCCESS_MESSAGE),
                    reset_form: true,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "contact form failed");
                SubmitOutcome {
                    button: self.idle_button.clone(),
                    notification: Notification::from(&err),
                    reset_form: false,
                }
            }
        }
    }
}

/// Stand-in for a real backend: settles after a delay, failing at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedEndpoint {
    pub delay_ms: f64,
    pub failure_rate: f64,
}

impl SimulatedEndpoint {
    pub fn new(settings: &ContactSettings) -> Self {
        SimulatedEndpoint {
            delay_ms: settings.submission_delay_ms,
            failure_rate: settings.failure_rate,
        }
    }

    /// Settle one request with a uniform draw in [0, 1).
    pub fn settle<R>(&self, rng: &mut R) -> Result<(), SiteError>
    where
        R: FnMut() -> f64,
    {
        if rng() > self.failure_rate {
            Ok(())
        } else {
            Err(SiteError::TransientIo(NETWORK_ERROR_MESSAGE.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::MockElement;

    fn form(name: &str, email: &str, subject: &str, message: &str) -> BTreeMap<String, String> {
        [
            ("name", name),
            ("email", email),
            ("subject", subject),
            ("message", message),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn idle_button() -> ButtonState {
        ButtonState {
            label: "Send Message".to_string(),
            icon_class: "fas fa-paper-plane".to_string(),
            disabled: false,
        }
    }

    #[test]
    fn email_rules() {
        assert!(validate_field("email", "a@b.co").valid);
        let bad = validate_field("email", "not-an-email");
        assert!(!bad.valid);
        assert_eq!(bad.message.as_deref(), Some("Please enter a valid email address"));
        assert!(!validate_field("email", "a b@c.de").valid);
        assert_eq!(
            validate_field("email", "   ").message.as_deref(),
            Some("Email is required")
        );
    }

    #[test]
    fn length_rules_are_inclusive() {
        let short = validate_field("name", "A");
        assert!(!short.valid);
        assert_eq!(short.message.as_deref(), Some("Name must be at least 2 characters"));
        assert!(validate_field("name", "Al").valid);
        assert!(validate_field("message", "0123456789").valid);
        assert!(!validate_field("message", "012345678").valid);
        assert!(!validate_field("subject", "Hi!!").valid);
    }

    #[test]
    fn whitespace_is_trimmed_before_length() {
        assert!(!validate_field("name", "  A  ").valid);
        assert!(validate_field("subject", "  Hello  ").valid);
    }

    #[test]
    fn unknown_fields_pass() {
        assert!(validate_field("phone", "").valid);
    }

    #[test]
    fn form_reports_every_field() {
        let report = validate_form(&form("Al", "bad", "Hello", "short"));
        assert!(!report.valid);
        assert_eq!(report.invalid_fields(), vec!["email", "message"]);
        assert_eq!(
            report.into_result(),
            Err(SiteError::Validation {
                fields: vec!["email".to_string(), "message".to_string()]
            })
        );
    }

    #[test]
    fn missing_values_are_required() {
        let report = validate_form(&BTreeMap::new());
        assert_eq!(report.fields.len(), 4);
        assert!(report.fields.values().all(|r| !r.valid));
    }

    #[test]
    fn validation_never_mutates_input() {
        let values = form(" Al ", "a@b.co", "Hello", "0123456789");
        let before = values.clone();
        assert!(validate_form(&values).valid);
        assert_eq!(values, before);
    }

    #[test]
    fn field_result_marks_input() {
        let input = MockElement::default();
        validate_field("name", "A").apply(&input);
        assert!(input.has_class("error"));
        validate_field("name", "Ada").apply(&input);
        assert!(input.has_class("success"));
        assert!(!input.has_class("error"));
    }

    #[test]
    fn character_budget_levels() {
        let fresh = CharacterBudget::measure("", 500);
        assert_eq!(fresh.caption(), "500 characters remaining");
        assert_eq!(fresh.level, BudgetLevel::Normal);

        let warn = CharacterBudget::measure(&"x".repeat(401), 500);
        assert_eq!(warn.remaining, 99);
        assert_eq!(warn.color(), "#f39c12");

        let critical = CharacterBudget::measure(&"x".repeat(451), 500);
        assert_eq!(critical.level, BudgetLevel::Critical);

        let edge = CharacterBudget::measure(&"x".repeat(400), 500);
        assert_eq!(edge.level, BudgetLevel::Normal);
    }

    #[test]
    fn submit_success_resets_form() {
        let mut contact = ContactForm::new(idle_button());
        let values = form("Ada", "ada@example.com", "Hello there", "A long enough message");

        assert_eq!(contact.begin_submit(&values), SubmitStart::Started(ButtonState::sending()));
        assert_eq!(contact.phase(), SubmitPhase::Sending);
        assert_eq!(contact.begin_submit(&values), SubmitStart::AlreadySending);

        let outcome = contact.finish_submit(Ok(()));
        assert!(outcome.reset_form);
        assert_eq!(outcome.button, idle_button());
        assert_eq!(outcome.notification.kind, NotificationKind::Success);
        assert_eq!(outcome.notification.message, SUCCESS_MESSAGE);
        assert_eq!(contact.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn submit_failure_keeps_input() {
        let mut contact = ContactForm::new(idle_button());
        let values = form("Ada", "ada@example.com", "Hello there", "A long enough message");
        contact.begin_submit(&values);

        let endpoint = SimulatedEndpoint::new(&ContactSettings::default());
        let result = endpoint.settle(&mut || 0.05);
        let outcome = contact.finish_submit(result);
        assert!(!outcome.reset_form);
        assert!(!outcome.button.disabled);
        assert_eq!(outcome.notification.kind, NotificationKind::Error);
        assert_eq!(outcome.notification.message, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn invalid_submit_stays_idle() {
        let mut contact = ContactForm::new(idle_button());
        match contact.begin_submit(&form("A", "", "", "")) {
            SubmitStart::Invalid(report) => assert_eq!(report.invalid_fields().len(), 4),
            other => panic!("expected invalid, got {other:?}"),
        }
        assert_eq!(contact.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn endpoint_failure_rate() {
        let endpoint = SimulatedEndpoint::new(&ContactSettings::default());
        assert_eq!(endpoint.delay_ms, 2000.0);
        assert!(endpoint.settle(&mut || 0.11).is_ok());
        assert!(endpoint.settle(&mut || 0.1).is_err());
        assert!(endpoint.settle(&mut || 0.0).unwrap_err().is_retryable());
    }
}
