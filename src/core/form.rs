//! Contact form: field validation and the submit lifecycle.
//!
//! ```text
//! Editing ──submit (all valid)──▶ Submitting ──settle / ack ok──▶ Sent
//!   ▲ │ ▲                              │ ack err                  │ 4000 ms
//!   │ └─┘ submit (invalid)             ▼                          ▼
//!   │                               Failed (values kept)      Resetting
//!   └──────────── fields cleared ◀── 300 ms fade ◀────────────────┘
//! ```
//!
//! `Failed` accepts edits and a new submit just like `Editing`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::clock::Millis;

/// Optimistic success delay.
pub const SUBMIT_SETTLE: Millis = 2000;
/// How long the success notice stays before the form resets.
pub const RESET_AFTER: Millis = 4000;
/// Fade-out of the success notice before the form reappears.
pub const RESET_FADE: Millis = 300;

pub const INVALID_FORM: &str = "Please correct the errors above";
pub const SENT_MESSAGE: &str = "Thank you! Your message has been sent successfully.";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Text,
    Multiline,
    /// A fixed-choice input; always valid.
    Choice,
}

/// Name, label and kind of the standard contact form fields.
pub const STANDARD_FIELDS: &[(&str, &str, FieldKind)] = &[
    ("name", "Name", FieldKind::Text),
    ("email", "Email", FieldKind::Email),
    ("subject", "Subject", FieldKind::Text),
    ("message", "Message", FieldKind::Multiline),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub valid: bool,
    /// Empty when valid.
    pub message: String,
}

/// Validate a raw value (trimmed) against the rule for its kind.
pub fn validate(kind: FieldKind, raw: &str) -> Validation {
    let value = raw.trim();
    let (valid, message) = match kind {
        FieldKind::Email => (EMAIL.is_match(value), "Please enter a valid email address"),
        FieldKind::Text => (value.chars().count() >= 2, "Please enter at least 2 characters"),
        FieldKind::Multiline => (value.chars().count() >= 5, "Please enter at least 5 characters"),
        FieldKind::Choice => (true, ""),
    };
    Validation {
        valid,
        message: if valid { String::new() } else { message.to_string() },
    }
}

/// True iff every field is valid.
pub fn validate_all<'a>(fields: impl IntoIterator<Item = &'a FormField>) -> bool {
    fields.into_iter().all(|f| f.validation().valid)
}

/// Border colouring of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTone {
    Neutral,
    Valid,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    value: String,
    touched: bool,
    validation: Validation,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            value: String::new(),
            touched: false,
            validation: validate(kind, ""),
        }
    }

    /// Replace the value (an input event): marks the field touched.
    pub fn input(&mut self, value: impl Into<String>) -> &Validation {
        self.value = value.into();
        self.touched = true;
        self.validation = validate(self.kind, &self.value);
        &self.validation
    }

    pub fn push(&mut self, c: char) {
        let mut value = std::mem::take(&mut self.value);
        value.push(c);
        self.input(value);
    }

    pub fn backspace(&mut self) {
        let mut value = std::mem::take(&mut self.value);
        value.pop();
        self.input(value);
    }

    pub fn touch(&mut self) {
        self.touched = true;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Message to display; suppressed until the field has been touched.
    pub fn visible_message(&self) -> Option<&str> {
        (self.touched && !self.validation.message.is_empty()).then_some(self.validation.message.as_str())
    }

    pub fn tone(&self) -> FieldTone {
        if self.value.trim().is_empty() {
            FieldTone::Neutral
        } else if self.validation.valid {
            FieldTone::Valid
        } else {
            FieldTone::Invalid
        }
    }

    fn clear(&mut self) {
        self.value.clear();
        self.touched = false;
        self.validation = validate(self.kind, "");
    }
}

/// When the UI may declare the message sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPolicy {
    /// Success after a fixed delay, whatever the network does.
    Optimistic { settle: Millis },
    /// Success only once the endpoint acknowledges the POST.
    Acknowledged,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        SubmitPolicy::Optimistic { settle: SUBMIT_SETTLE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Sent,
    Failed,
    Resetting,
}

impl FormPhase {
    pub fn is_editable(&self) -> bool {
        matches!(self, FormPhase::Editing | FormPhase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice {
    Error(String),
    Success(String),
}

/// Field values as posted to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// At least one field is invalid; nothing was sent.
    Blocked,
    /// Hand this to the network layer.
    Dispatched(Submission),
    /// A submission is already in flight (button disabled).
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    fields: Vec<FormField>,
    phase: FormPhase,
    policy: SubmitPolicy,
    notice: Option<FormNotice>,
}

impl ContactForm {
    pub fn new(fields: Vec<FormField>, policy: SubmitPolicy) -> Self {
        Self {
            fields,
            phase: FormPhase::Editing,
            policy,
            notice: None,
        }
    }

    pub fn standard(policy: SubmitPolicy) -> Self {
        Self::new(
            STANDARD_FIELDS
                .iter()
                .map(|&(name, label, kind)| FormField::new(name, label, kind))
                .collect(),
            policy,
        )
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Editable only while editing or after a failed send.
    pub fn field_mut(&mut self, index: usize) -> Option<&mut FormField> {
        if !self.phase.is_editable() {
            return None;
        }
        self.fields.get_mut(index)
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn notice(&self) -> Option<&FormNotice> {
        self.notice.as_ref()
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.phase.is_editable() {
            return SubmitOutcome::Ignored;
        }
        for field in &mut self.fields {
            field.touch();
        }
        if !validate_all(&self.fields) {
            self.notice = Some(FormNotice::Error(INVALID_FORM.to_string()));
            self.phase = FormPhase::Editing;
            return SubmitOutcome::Blocked;
        }
        self.notice = None;
        self.phase = FormPhase::Submitting;
        SubmitOutcome::Dispatched(Submission {
            fields: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.value.trim().to_string()))
                .collect(),
        })
    }

    /// Optimistic delay elapsed.
    pub fn settle(&mut self) -> bool {
        if self.phase != FormPhase::Submitting
            || !matches!(self.policy, SubmitPolicy::Optimistic { .. })
        {
            return false;
        }
        self.mark_sent();
        true
    }

    /// Network result.  Decides the outcome only under the acknowledged
    /// policy; returns whether the form changed.
    pub fn acknowledge(&mut self, result: Result<(), String>) -> bool {
        if self.phase != FormPhase::Submitting || self.policy != SubmitPolicy::Acknowledged {
            return false;
        }
        match result {
            Ok(()) => self.mark_sent(),
            Err(reason) => {
                self.phase = FormPhase::Failed;
                self.notice = Some(FormNotice::Error(format!("Sending failed: {reason}")));
            }
        }
        true
    }

    /// Sent → Resetting: the success notice starts fading.
    pub fn begin_reset(&mut self) -> bool {
        if self.phase != FormPhase::Sent {
            return false;
        }
        self.phase = FormPhase::Resetting;
        true
    }

    /// Resetting → Editing with every field cleared.
    pub fn finish_reset(&mut self) -> bool {
        if self.phase != FormPhase::Resetting {
            return false;
        }
        for field in &mut self.fields {
            field.clear();
        }
        self.notice = None;
        self.phase = FormPhase::Editing;
        true
    }

    fn mark_sent(&mut self) {
        self.phase = FormPhase::Sent;
        self.notice = Some(FormNotice::Success(SENT_MESSAGE.to_string()));
    }
}
