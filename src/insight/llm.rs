//! HTTP text-generation client
//!
//! One request per call, no retries. Every request asks the provider for a
//! JSON object reply, which is what the insight flows expect.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::TextGenerator;
use crate::config::LlmConfig;
use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Gemini,
    OpenAI,
    Anthropic,
    Ollama,
}

impl Provider {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAI),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    fn default_env_var(self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAI => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

/// Client for a hosted or local language model
pub struct LlmClient {
    provider: Provider,
    model: String,
    api_key: Option<String>,
    base_url: String,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, GatewayError> {
        let provider = Provider::parse(&config.provider).ok_or_else(|| {
            GatewayError::Config(format!(
                "unknown LLM provider: '{}' (expected gemini, openai, anthropic, or ollama)",
                config.provider
            ))
        })?;

        let api_key = match provider.default_env_var() {
            Some(default_env_var) => Some(resolve_api_key(config, default_env_var)?),
            None => config.api_key.clone().filter(|k| !k.is_empty()),
        };

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(provider.default_base_url())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            provider,
            model: config.model.clone(),
            api_key,
            base_url,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn request(&self, system: Option<&str>, prompt: &str) -> (String, Value) {
        match self.provider {
            Provider::Gemini => {
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, self.model
                );
                let mut body = json!({
                    "contents": [{"parts": [{"text": prompt}]}],
                    "generationConfig": {
                        "maxOutputTokens": self.max_tokens,
                        "responseMimeType": "application/json",
                    }
                });
                if let Some(sys) = system {
                    body["systemInstruction"] = json!({"parts": [{"text": sys}]});
                }
                (url, body)
            }
            Provider::OpenAI => {
                let url = format!("{}/v1/chat/completions", self.base_url);
                let mut messages = Vec::new();
                if let Some(sys) = system {
                    messages.push(json!({"role": "system", "content": sys}));
                }
                messages.push(json!({"role": "user", "content": prompt}));
                let body = json!({
                    "model": self.model,
                    "messages": messages,
                    "max_tokens": self.max_tokens,
                    "response_format": {"type": "json_object"},
                });
                (url, body)
            }
            Provider::Anthropic => {
                let url = format!("{}/v1/messages", self.base_url);
                let mut body = json!({
                    "model": self.model,
                    "max_tokens": self.max_tokens,
                    "messages": [{"role": "user", "content": prompt}],
                });
                if let Some(sys) = system {
                    body["system"] = Value::String(sys.to_string());
                }
                (url, body)
            }
            Provider::Ollama => {
                let url = format!("{}/api/generate", self.base_url);
                let mut body = json!({
                    "model": self.model,
                    "prompt": prompt,
                    "stream": false,
                    "format": "json",
                    "options": {"num_predict": self.max_tokens},
                });
                if let Some(sys) = system {
                    body["system"] = Value::String(sys.to_string());
                }
                (url, body)
            }
        }
    }
}

impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, GatewayError> {
        let (url, body) = self.request(system, prompt);
        debug!(provider = self.provider.name(), model = %self.model, "sending LLM request");

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = match self.provider {
                Provider::Gemini => req.header("x-goog-api-key", key),
                Provider::OpenAI => req.header("Authorization", format!("Bearer {key}")),
                Provider::Anthropic => req
                    .header("x-api-key", key)
                    .header("anthropic-version", "2023-06-01"),
                Provider::Ollama => req.header("Authorization", format!("Bearer {key}")),
            };
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Provider {
                provider: self.provider.name(),
                status,
                body,
            });
        }

        let json: Value = resp.json().await?;
        extract_text(self.provider, &json)
            .map(str::to_string)
            .ok_or(GatewayError::EmptyResponse(self.provider.name()))
    }
}

/// Pull the generated text out of a provider response body
fn extract_text(provider: Provider, json: &Value) -> Option<&str> {
    let text = match provider {
        Provider::Gemini => &json["candidates"][0]["content"]["parts"][0]["text"],
        Provider::OpenAI => &json["choices"][0]["message"]["content"],
        Provider::Anthropic => &json["content"][0]["text"],
        Provider::Ollama => &json["response"],
    };
    text.as_str().filter(|s| !s.trim().is_empty())
}

/// Resolve an API key from config, a custom env var, or the provider's env var
fn resolve_api_key(config: &LlmConfig, default_env_var: &str) -> Result<String, GatewayError> {
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    let env_var_name = config.env_var.as_deref().unwrap_or(default_env_var);
    std::env::var(env_var_name).map_err(|_| {
        GatewayError::Config(format!(
            "{} LLM provider requires an API key (set llm.api_key or {})",
            config.provider, env_var_name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            // Never set, so tests do not depend on the developer's environment
            env_var: Some("COMMAND_PAL_TEST_UNSET_API_KEY".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let err = LlmClient::from_config(&config("banana")).unwrap_err();
        assert!(err.to_string().contains("unknown LLM provider"));
    }

    #[test]
    fn test_from_config_missing_key_errors() {
        for provider in ["gemini", "openai", "anthropic"] {
            let err = LlmClient::from_config(&config(provider)).unwrap_err();
            assert!(err.to_string().contains("API key"), "{provider}: {err}");
        }
    }

    #[test]
    fn test_from_config_with_key() {
        let mut cfg = config("openai");
        cfg.api_key = Some("sk-test".into());
        cfg.base_url = Some("http://localhost:9999/".into());
        let client = LlmClient::from_config(&cfg).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let client = LlmClient::from_config(&config("ollama")).unwrap();
        assert!(client.api_key.is_none());
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_request_shapes() {
        let mut cfg = config("gemini");
        cfg.api_key = Some("k".into());
        let client = LlmClient::from_config(&cfg).unwrap();
        let (url, body) = client.request(Some("be terse"), "hello");
        assert!(url.ends_with("/v1beta/models/gemini-2.0-flash:generateContent"));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );

        let client = LlmClient::from_config(&config("ollama")).unwrap();
        let (url, body) = client.request(None, "hello");
        assert_eq!(url, "http://localhost:11434/api/generate");
        assert_eq!(body["format"], "json");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_extract_text_per_provider() {
        let gemini = json!({"candidates": [{"content": {"parts": [{"text": "{}"}]}}]});
        assert_eq!(extract_text(Provider::Gemini, &gemini), Some("{}"));

        let openai = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(extract_text(Provider::OpenAI, &openai), Some("hi"));

        let anthropic = json!({"content": [{"type": "text", "text": "yo"}]});
        assert_eq!(extract_text(Provider::Anthropic, &anthropic), Some("yo"));

        let ollama = json!({"response": "  "});
        assert_eq!(extract_text(Provider::Ollama, &ollama), None);

        assert_eq!(extract_text(Provider::OpenAI, &json!({})), None);
    }
}
