//! Upstream Error Classification
//!
//! Maps opaque upstream failures onto the caller-facing taxonomy by
//! case-insensitive substring matching against an ordered rule table.

use crate::error::TaleforgeError;
use std::fmt;
use tracing::error;

/// Generation step an error is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    StoryIdeas,
    CharacterDetails,
    CharacterImage,
    Script,
    /// Any other context; gets the generic failure message
    Other(String),
}

impl Operation {
    /// User-facing prefix for failures with no more specific rule
    fn failure_prefix(&self) -> &'static str {
        match self {
            Operation::StoryIdeas => "Could not generate story ideas.",
            Operation::CharacterDetails => "Could not generate character details.",
            Operation::CharacterImage => "Could not generate the image.",
            Operation::Script => "Could not generate the script.",
            Operation::Other(_) => "An unknown error occurred.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::StoryIdeas => write!(f, "story generation"),
            Operation::CharacterDetails => write!(f, "character generation"),
            Operation::CharacterImage => write!(f, "image generation"),
            Operation::Script => write!(f, "script generation"),
            Operation::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Specific failure classes recognised by [`RULES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BillingRequired,
    Overloaded,
    QuotaExceeded,
}

impl ErrorClass {
    fn into_error(self, operation: Operation) -> TaleforgeError {
        match self {
            ErrorClass::BillingRequired => TaleforgeError::BillingRequired { operation },
            ErrorClass::Overloaded => TaleforgeError::UpstreamOverloaded { operation },
            ErrorClass::QuotaExceeded => TaleforgeError::QuotaExceeded { operation },
        }
    }
}

/// A classification rule: any needle found in the lowercased error selects `class`
#[derive(Debug)]
pub struct Rule {
    pub needles: &'static [&'static str],
    pub class: ErrorClass,
}

impl Rule {
    fn matches(&self, lowered: &str) -> bool {
        self.needles.iter().any(|needle| lowered.contains(needle))
    }
}

/// Classification rules in precedence order; the first match wins.
///
/// Billing must precede quota: the billing message can mention quota too.
pub const RULES: &[Rule] = &[
    Rule {
        needles: &["imagen api is only accessible to billed users"],
        class: ErrorClass::BillingRequired,
    },
    Rule {
        needles: &["overloaded", "unavailable"],
        class: ErrorClass::Overloaded,
    },
    Rule {
        needles: &["resource_exhausted", "quota"],
        class: ErrorClass::QuotaExceeded,
    },
];

/// Find the first rule matching `raw`, ignoring case
pub fn classify(raw: &str) -> Option<ErrorClass> {
    let lowered = raw.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.class)
}

/// Log a raw failure and convert it into exactly one classified error
pub fn normalize<E>(raw: &E, operation: Operation) -> TaleforgeError
where
    E: fmt::Display + ?Sized,
{
    let text = raw.to_string();
    error!(operation = %operation, error = %text, "Error during {}", operation);

    match classify(&text) {
        Some(class) => class.into_error(operation),
        None => TaleforgeError::OperationFailed {
            message: format!("{} {}", operation.failure_prefix(), text),
            operation,
        },
    }
}
