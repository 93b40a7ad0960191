pub mod remote;
pub mod session;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use remote::QuizApi;
pub use session::{ADVANCE_DELAY, Effect, QuizEvent, QuizSession, QuizState, VERDICT_FALLBACK};

/// A generated multiple-choice question. Options are expected to hold four
/// entries but the count is whatever the provider returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Whatever the provider put here, if anything. Never read by the runner.
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
}

/// One committed answer, in the wire shape `{question, answer}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "question")]
    pub question_text: String,
    #[serde(rename = "answer")]
    pub chosen_option: String,
}

impl Answer {
    pub fn new(question_text: impl Into<String>, chosen_option: impl Into<String>) -> Self {
        Self {
            question_text: question_text.into(),
            chosen_option: chosen_option.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRequest {
    pub answers: Vec<Answer>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: String,
}
