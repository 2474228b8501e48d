use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::value::FieldValue;

/// Constraint set attached to a single field. A rule with nothing set accepts
/// every value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(skip)]
    pub custom: Option<CustomRule>,
}

impl ValidationRule {
    pub fn required() -> Self {
        Self {
            required: Some(true),
            ..Self::default()
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Error raised when a pattern is not a valid regular expression.
#[derive(Debug, Clone, Error)]
#[error("invalid pattern '{pattern}': {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: String,
}

/// Regular expression that must match a text value in full.
///
/// Lookaround and backreferences are supported. `\d`, `\w` and `\b` keep
/// their ASCII meaning. The source is kept verbatim for serialization;
/// matching uses an anchored compilation of it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

const WORD: &str = "0-9A-Za-z_";
const WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?![0-9A-Za-z_])|(?<![0-9A-Za-z_])(?=[0-9A-Za-z_]))";
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?=[0-9A-Za-z_])|(?<![0-9A-Za-z_])(?![0-9A-Za-z_]))";

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, PatternError> {
        let source = source.into();
        let anchored = format!("^(?:{})$", ascii_shorthands(&source));
        let regex = Regex::new(&anchored).map_err(|err| PatternError {
            pattern: source.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// A match that hits the backtracking limit counts as a mismatch.
    pub fn is_full_match(&self, text: &str) -> bool {
        match self.regex.is_match(text) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(pattern = %self.source, error = %err, "pattern match aborted");
                false
            }
        }
    }
}

/// Rewrites `\d`, `\w`, `\b` and their negations to ASCII-only forms.
/// Inside a bracket class only `\d` and `\w` are rewritten.
fn ascii_shorthands(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push(ch);
                    break;
                };
                match (next, in_class) {
                    ('d', false) => out.push_str("[0-9]"),
                    ('D', false) => out.push_str("[^0-9]"),
                    ('w', false) => out.push_str(&format!("[{WORD}]")),
                    ('W', false) => out.push_str(&format!("[^{WORD}]")),
                    ('b', false) => out.push_str(WORD_BOUNDARY),
                    ('B', false) => out.push_str(NOT_WORD_BOUNDARY),
                    ('d', true) => out.push_str("0-9"),
                    ('w', true) => out.push_str(WORD),
                    _ => {
                        out.push(ch);
                        out.push(next);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Result of a custom rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomOutcome {
    Pass,
    /// Fails with the generic "is invalid" message.
    Fail,
    /// Fails with this message, used verbatim.
    Message(String),
}

impl From<bool> for CustomOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            CustomOutcome::Pass
        } else {
            CustomOutcome::Fail
        }
    }
}

impl From<String> for CustomOutcome {
    fn from(message: String) -> Self {
        CustomOutcome::Message(message)
    }
}

impl From<&str> for CustomOutcome {
    fn from(message: &str) -> Self {
        CustomOutcome::Message(message.to_string())
    }
}

impl<T: Into<CustomOutcome>> From<Option<T>> for CustomOutcome {
    fn from(outcome: Option<T>) -> Self {
        outcome.map(Into::into).unwrap_or(CustomOutcome::Pass)
    }
}

/// A custom rule aborted instead of returning an outcome.
#[derive(Debug, Clone, Error)]
#[error("custom rule aborted: {reason}")]
pub struct CustomRuleError {
    pub reason: String,
}

type CustomFn = dyn Fn(Option<&FieldValue>) -> CustomOutcome + Send + Sync;

/// Caller-supplied check evaluated after the built-in ones. It receives the
/// raw value, which may be absent.
#[derive(Clone)]
pub struct CustomRule(Arc<CustomFn>);

impl CustomRule {
    pub fn new<F, O>(rule: F) -> Self
    where
        F: Fn(Option<&FieldValue>) -> O + Send + Sync + 'static,
        O: Into<CustomOutcome>,
    {
        Self(Arc::new(move |value| rule(value).into()))
    }

    /// Runs the rule inside an unwind boundary so a panicking rule surfaces
    /// as an error value.
    pub fn evaluate(&self, value: Option<&FieldValue>) -> Result<CustomOutcome, CustomRuleError> {
        catch_unwind(AssertUnwindSafe(|| (self.0)(value))).map_err(|payload| CustomRuleError {
            reason: panic_reason(payload.as_ref()),
        })
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(..)")
    }
}

impl PartialEq for CustomRule {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
