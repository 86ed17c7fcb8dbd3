//! Command insight: AI safety check and explanation for a shell command
//!
//! [`CommandInsight::analyze`] runs both flows concurrently and returns a
//! result only if both succeed. Replies are validated against a fixed shape;
//! anything else is a [`GatewayError`].

pub mod llm;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GatewayError;

pub use llm::LlmClient;

/// Source of generated text
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// Generate a reply to `prompt`; callers expect a JSON object back
    async fn generate(&self, prompt: &str, system: Option<&str>)
        -> Result<String, GatewayError>;
}

/// Input to both flows
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
}

/// Verdict from the safety flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    #[serde(rename = "isSafe")]
    pub is_safe: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ExplanationReply {
    explanation: String,
}

/// Combined result of both flows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub safety: SafetyVerdict,
    pub explanation: String,
}

const SAFETY_SYSTEM: &str = "You are a security reviewer deciding whether shell commands are safe to run.

Weigh the following:
- Does it delete or modify important files?
- Could it expose sensitive information?
- Does it look malicious?
- Could it damage the system?
- Does it need root privileges?

When the command is potentially harmful, say why in the reason field.

Reply with only a JSON object of the form {\"isSafe\": boolean, \"reason\": string}.";

const EXPLAIN_SYSTEM: &str = "You explain shell commands to the person about to run them.

Describe what the command does and what impact running it could have, in plain language.

Reply with only a JSON object of the form {\"explanation\": string}.";

/// Stateless facade over a [`TextGenerator`]
#[derive(Debug)]
pub struct CommandInsight<G> {
    generator: G,
}

impl<G: TextGenerator> CommandInsight<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Ask whether `command` is safe to run
    pub async fn check_safety(&self, command: &str) -> Result<SafetyVerdict, GatewayError> {
        self.ask(SAFETY_SYSTEM, command).await
    }

    /// Ask for a plain-language explanation of `command`
    pub async fn explain(&self, command: &str) -> Result<String, GatewayError> {
        let reply: ExplanationReply = self.ask(EXPLAIN_SYSTEM, command).await?;
        Ok(reply.explanation)
    }

    /// Run both flows concurrently; either failing fails the whole analysis
    pub async fn analyze(&self, command: &str) -> Result<Insight, GatewayError> {
        if command.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "command cannot be empty".to_string(),
            ));
        }

        let (safety, explanation) =
            tokio::try_join!(self.check_safety(command), self.explain(command))?;
        Ok(Insight {
            safety,
            explanation,
        })
    }

    async fn ask<T: DeserializeOwned>(
        &self,
        system: &str,
        command: &str,
    ) -> Result<T, GatewayError> {
        let request = serde_json::to_string(&CommandRequest { command })
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        let prompt = format!("Input: {request}");

        let reply = self.generator.generate(&prompt, Some(system)).await?;
        debug!(len = reply.len(), "received insight reply");
        parse_reply(&reply)
    }
}

/// Deserialize a model reply, tolerating a surrounding Markdown code fence
/// or prose around the JSON object
fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, GatewayError> {
    let trimmed = reply.trim();
    let body = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(body).map_err(|e| GatewayError::Schema(e.to_string()))
}
