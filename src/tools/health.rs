//! The `check_health` tool.
//!
//! Probes the review agent's `/health` endpoint with a bounded timeout.
//! Both outcomes are successful tool results carrying a status field; an
//! unreachable agent is an answer, not an error, so this handler never
//! returns an error-flagged result.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ToolCallResult, ToolDeps};

/// Arguments for `check_health`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckHealthArgs {
    /// Agent base URL; defaults to the configured agent address.
    #[serde(default)]
    pub agent_url: Option<String>,
}

/// Probes `{agent_url}/health` and reports the outcome.
pub async fn check_health(arguments: &Value, deps: &ToolDeps) -> ToolCallResult {
    // Arguments are schema-validated; a shape serde still rejects is
    // reported as an unhealthy probe, keeping the never-errors contract.
    let args: CheckHealthArgs = match serde_json::from_value(arguments.clone()) {
        Ok(args) => args,
        Err(e) => {
            return ToolCallResult::json(&json!({
                "status": "error",
                "reason": format!("invalid arguments: {e}"),
            }))
        }
    };

    let base_url = args
        .agent_url
        .unwrap_or_else(|| deps.agent.base_url.clone());
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let timeout = Duration::from_secs(deps.agent.health_timeout_secs);

    let probe = deps.http.get(&url).timeout(timeout).send().await;

    let result = match probe {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                json!({
                    "status": "healthy",
                    "agentUrl": base_url,
                    "httpStatus": status.as_u16(),
                })
            } else {
                json!({
                    "status": "unhealthy",
                    "agentUrl": base_url,
                    "httpStatus": status.as_u16(),
                    "reason": format!(
                        "agent answered with HTTP {}",
                        status.as_u16()
                    ),
                })
            }
        }
        Err(e) => json!({
            "status": "unreachable",
            "agentUrl": base_url,
            "reason": e.to_string(),
        }),
    };

    ToolCallResult::json(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::ToolContent;

    fn test_deps() -> ToolDeps {
        let mut config = Config::default();
        config.agent.health_timeout_secs = 1;
        ToolDeps::from_config(&config)
    }

    #[tokio::test]
    async fn unreachable_agent_is_a_successful_result() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let args = json!({ "agentUrl": "http://127.0.0.1:9" });
        let result = check_health(&args, &test_deps()).await;

        assert!(!result.is_error, "probe failures must not be error results");

        let ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("unreachable"));
        assert!(text.contains("http://127.0.0.1:9"));
        assert!(text.contains("reason"));
    }

    #[tokio::test]
    async fn trailing_slash_is_normalised() {
        let args = json!({ "agentUrl": "http://127.0.0.1:9/" });
        let result = check_health(&args, &test_deps()).await;

        let ToolContent::Text { text } = &result.content[0];
        // The reported URL is the caller's; only the probe path is normalised.
        assert!(text.contains("http://127.0.0.1:9/"));
        assert!(!result.is_error);
    }
}
