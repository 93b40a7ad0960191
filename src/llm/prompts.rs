use anyhow::{Context, Result};

use super::provider::Prompt;
use super::response::OutputFormat;
use crate::quiz::Answer;

pub const QUESTION_COUNT: usize = 10;
pub const OPTIONS_PER_QUESTION: usize = 4;

const SYSTEM_PROMPT: &str = r#"
You are a career advisor who helps applicants with career guidance.
"#;

pub fn questions_prompt(language: &str) -> Prompt {
    let user = format!(
        "Create exactly {QUESTION_COUNT} questions in {language} that will help determine the most suitable profession. \
         For each of them, provide {OPTIONS_PER_QUESTION} answers in {language}.\n\
         The questions should be in valid JSON format. Each object must have correctly opened and closed curly braces, quotes, and commas.\n\
         Do not write additional text, just JSON.\n\
         Only use the alphabet of the {language} language.\n\
         Response format:\n\
         {{\"questions\": [{{\"id\": 0, \"question\": \"\", \"options\": []}}]}}"
    );

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        format: OutputFormat::JsonObject,
    }
}

/// Embeds the answers exactly as `serde_json` serializes them.
pub fn verdict_prompt(language: &str, answers: &[Answer]) -> Result<Prompt> {
    let serialized = serde_json::to_string(answers).context("Failed to serialize answers")?;
    let user = format!(
        "Here are the applicant's answers to the questions. Based on these answers, \
         give a conclusion about which profession is most suitable for this person.\n\
         Write the conclusion briefly, just a few sentences. There must be at least one example of a suitable profession.\n\
         Conclusion must be in {language}.\n\
         Here are the answers in JSON format:\n\
         {serialized}"
    );

    Ok(Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        format: OutputFormat::Text,
    })
}
