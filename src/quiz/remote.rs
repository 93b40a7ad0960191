use anyhow::{Context, Result, bail};

use super::{Answer, QuestionSet, Verdict, VerdictRequest};

pub const QUESTIONS_UNAVAILABLE: &str = "Не вдалося отримати запитання";

/// HTTP client for the quiz backend.
#[derive(Clone, Debug)]
pub struct QuizApi {
    client: reqwest::Client,
    base_url: String,
}

impl QuizApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_questions(&self) -> Result<QuestionSet> {
        let response = self
            .client
            .get(format!("{}/api/questions", self.base_url))
            .send()
            .await
            .with_context(|| format!("Не вдалося з'єднатися з сервером {}", self.base_url))?;

        if !response.status().is_success() {
            bail!(QUESTIONS_UNAVAILABLE);
        }

        response
            .json::<QuestionSet>()
            .await
            .context("Сервер повернув запитання у неочікуваному форматі")
    }

    pub async fn request_verdict(&self, answers: Vec<Answer>) -> Result<String> {
        let verdict: Verdict = self
            .client
            .post(format!("{}/api/verdict", self.base_url))
            .json(&VerdictRequest { answers })
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?
            .error_for_status()?
            .json()
            .await
            .context("Server returned a verdict in an unexpected shape")?;

        Ok(verdict.verdict)
    }
}
