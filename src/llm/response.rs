use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponse, CreateResponseArgs, InputMessage, InputRole, OutputItem,
        OutputMessageContent, Response,
    },
};
use serde_json::json;

const MAX_OUTPUT_TOKENS: u32 = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    JsonObject,
}

pub async fn request_single_text_response(
    client: &Client<OpenAIConfig>,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    format: OutputFormat,
) -> Result<String> {
    let request = build_request(model, system_prompt, user_prompt)?;

    let response: Response = match format {
        OutputFormat::Text => client
            .responses()
            .create(request)
            .await
            .with_context(|| "Failed to get response from LLM")?,
        OutputFormat::JsonObject => client
            .responses()
            .create_byot(json_mode_body(&request)?)
            .await
            .with_context(|| "Failed to get JSON response from LLM")?,
    };

    Ok(first_output_text(response.output).unwrap_or_default())
}

fn build_request(model: &str, system_prompt: &str, user_prompt: &str) -> Result<CreateResponse> {
    let request = CreateResponseArgs::default()
        .model(model)
        .max_output_tokens(MAX_OUTPUT_TOKENS)
        .input(vec![
            InputMessage {
                role: InputRole::System,
                content: vec![system_prompt.into()],
                status: None,
            },
            InputMessage {
                role: InputRole::User,
                content: vec![user_prompt.into()],
                status: None,
            },
        ])
        .build()?;
    Ok(request)
}

/// Same request with the `json_object` text format switched on.
fn json_mode_body(request: &CreateResponse) -> Result<serde_json::Value> {
    let mut body = serde_json::to_value(request).context("Failed to encode LLM request")?;
    body["text"] = json!({ "format": { "type": "json_object" } });
    Ok(body)
}

/// First text block of the output, untouched.
fn first_output_text(output: Vec<OutputItem>) -> Option<String> {
    output
        .into_iter()
        .filter_map(|item| match item {
            OutputItem::Message(message) => Some(message.content),
            _ => None,
        })
        .flatten()
        .find_map(|content| match content {
            OutputMessageContent::OutputText(text) => Some(text.text),
            _ => None,
        })
}
