//! Analyze command - AI safety check and explanation for a command

use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use tracing::debug;

use command_pal::config::LlmConfig;
use command_pal::insight::{CommandInsight, Insight, LlmClient, TextGenerator};

/// Run both insight flows for `command` and return printable output
pub async fn execute(config: &LlmConfig, command: &str, json: bool) -> Result<String> {
    let client = match LlmClient::from_config(config) {
        Ok(client) => client,
        Err(e) => bail!("AI analysis is not available: {}", e),
    };
    run(&CommandInsight::new(client), command, json).await
}

async fn run<G: TextGenerator>(
    insight: &CommandInsight<G>,
    command: &str,
    json: bool,
) -> Result<String> {
    let result = match insight.analyze(command).await {
        Ok(result) => result,
        Err(e) => {
            debug!(error = %e, "command analysis failed");
            bail!("AI analysis failed: could not get analysis for this command");
        }
    };

    if json {
        return Ok(serde_json::to_string_pretty(&result)?);
    }
    Ok(format_insight(command, &result))
}

/// Strip `--json` flags trailing the command words; returns whether any were found
pub fn take_trailing_json(words: &mut Vec<String>) -> bool {
    let mut found = false;
    while words.len() > 1 && words.last().is_some_and(|w| w == "--json") {
        words.pop();
        found = true;
    }
    found
}

/// Human-readable report
pub fn format_insight(command: &str, insight: &Insight) -> String {
    let verdict = if insight.safety.is_safe {
        format!("{} {}", "✔".green(), "Considered Safe".green().bold())
    } else {
        format!("{} {}", "✖".red(), "Potential Risk Detected".red().bold())
    };

    format!(
        "{}\n\n{}\n  {}\n  {}\n\n{}\n  {}",
        command.dimmed(),
        "Safety Check".bold(),
        verdict,
        insight.safety.reason,
        "Explanation".bold(),
        insight.explanation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_pal::error::GatewayError;
    use command_pal::insight::SafetyVerdict;

    struct Canned(Option<&'static str>);

    impl TextGenerator for Canned {
        async fn generate(
            &self,
            _prompt: &str,
            system: Option<&str>,
        ) -> Result<String, GatewayError> {
            let Some(reply) = self.0 else {
                return Err(GatewayError::EmptyResponse("test"));
            };
            if system.is_some_and(|s| s.contains("isSafe")) {
                Ok(r#"{"isSafe": true, "reason": "Only reads state."}"#.to_string())
            } else {
                Ok(reply.to_string())
            }
        }
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_trailing_json_flag_is_not_command_text() {
        let mut command = words("rm -rf / --json");
        assert!(take_trailing_json(&mut command));
        assert_eq!(command, words("rm -rf /"));

        let mut command = words("jq --json . file");
        assert!(!take_trailing_json(&mut command));
        assert_eq!(command.len(), 4);

        // A lone `--json` stays as the command itself
        let mut command = words("--json");
        assert!(!take_trailing_json(&mut command));
    }

    #[tokio::test]
    async fn test_run_formats_report() {
        let insight = CommandInsight::new(Canned(Some(r#"{"explanation": "Lists pods."}"#)));
        let output = run(&insight, "kubectl get pods", false).await.unwrap();
        assert!(output.contains("Considered Safe"));
        assert!(output.contains("Only reads state."));
        assert!(output.contains("Lists pods."));
    }

    #[tokio::test]
    async fn test_run_json() {
        let insight = CommandInsight::new(Canned(Some(r#"{"explanation": "Lists pods."}"#)));
        let output = run(&insight, "kubectl get pods", true).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["safety"]["isSafe"], true);
        assert_eq!(json["explanation"], "Lists pods.");
    }

    #[tokio::test]
    async fn test_run_failure_is_generic() {
        let insight = CommandInsight::new(Canned(None));
        let err = run(&insight, "rm -rf /", false).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "AI analysis failed: could not get analysis for this command"
        );
    }

    #[test]
    fn test_format_risky() {
        let insight = Insight {
            safety: SafetyVerdict {
                is_safe: false,
                reason: "Deletes everything.".into(),
            },
            explanation: "Removes files recursively.".into(),
        };
        let output = format_insight("rm -rf /", &insight);
        assert!(output.contains("Potential Risk Detected"));
        assert!(output.contains("Deletes everything."));
    }
}
