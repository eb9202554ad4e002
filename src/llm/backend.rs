use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, InputMessage, InputRole, OutputItem, OutputMessageContent,
    },
};
use async_trait::async_trait;

pub const DEFAULT_MODEL: &str = "gpt-5-nano";

const MAX_OUTPUT_TOKENS: u32 = 16_000;

/// Something that turns a system and a user prompt into one text reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = CreateResponseArgs::default()
            .model(self.model.as_str())
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

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .with_context(|| format!("Failed to get response from {}", self.model))?;

        for item in response.output {
            if let OutputItem::Message(message) = item {
                for content in message.content {
                    if let OutputMessageContent::OutputText(text) = content {
                        let trimmed = text.text.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        return Ok(trimmed.to_string());
                    }
                }
            }
        }

        bail!("No text output returned from model")
    }
}
