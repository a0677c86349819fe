//! Intent classification using regex patterns.
//!
//! Each user message is routed to one of three structured-data categories or to
//! the general (LLM) path. Groups are checked in a fixed order and the first
//! match wins: course, then job, then timing. A message mentioning both a course
//! and a job is a course question; that is resolution by order, not an error.
//!
//! Keywords match whole words, singular or plural ("course" and "courses").

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Detected intent type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Courses, classes, training programs
    Course,
    /// Job openings, hiring, careers
    Job,
    /// Course timings and schedules
    Timing,
    /// Anything else; handled by the language model
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns a human-readable label for the intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Course => "course",
            Intent::Job => "job",
            Intent::Timing => "timing",
            Intent::General => "general",
        }
    }

    /// Whether the intent is answered from the dataset instead of the model.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Intent::General)
    }
}

// NOTE: expect() is acceptable here, the patterns are compile-time constants.
static COURSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(courses?|learning|class(?:es)?|subjects?|trainings?|programs?)\b")
        .expect("Invalid regex: course keywords")
});

static JOB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(jobs?|hiring|openings?|positions?|careers?|employment)\b")
        .expect("Invalid regex: job keywords")
});

static TIMING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(timings?|times?|schedules?|when|hours?)\b").expect("Invalid regex: timing keywords")
});

/// Intent classifier over an ordered list of (pattern, intent) pairs.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<(Regex, Intent)>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Create a classifier with the built-in keyword groups in priority order.
    pub fn new() -> Self {
        Self {
            rules: vec![
                (COURSE_PATTERN.clone(), Intent::Course),
                (JOB_PATTERN.clone(), Intent::Job),
                (TIMING_PATTERN.clone(), Intent::Timing),
            ],
        }
    }

    /// Classify the intent of a text. Unmatched or empty input is `General`.
    pub fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(&lowered))
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::General)
    }
}
