//! Tool handlers for the review-pilot catalog.
//!
//! Each registered tool has a typed argument structure and a handler
//! function. The router validates raw arguments against the tool's declared
//! schema before anything here runs; handlers deserialise into their typed
//! arguments and never work with the raw JSON object directly.
//!
//! Handler failures are values, not panics: every fallible handler returns
//! `Result<ToolCallResult, ToolError>` and [`dispatch`] folds errors into an
//! error-flagged tool result, so a failing tool call can never take down the
//! transport loop.

pub mod analysis;
pub mod commands;
pub mod health;
pub mod reports;
pub mod review_config;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{AgentConfig, Config, UpstreamConfig};

/// Errors a tool handler can produce.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No upstream API credential is configured.
    #[error("no API credential configured; set upstream.api_key or REVIEW_PILOT_API_KEY")]
    MissingCredential,

    /// The upstream review service answered with a non-success status.
    #[error("upstream review service returned HTTP {status}: {message}")]
    UpstreamStatus {
        /// The HTTP status code.
        status: u16,
        /// The upstream response body or status text.
        message: String,
    },

    /// The upstream review service did not answer within the deadline.
    #[error("upstream review service timed out after {seconds}s")]
    UpstreamTimeout {
        /// The configured timeout.
        seconds: u64,
    },

    /// The HTTP request itself failed (connect error, TLS, bad URL).
    #[error("request to upstream review service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Arguments passed schema validation but are semantically invalid
    /// (for example a string that is not an ISO date).
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Shared, read-only dependencies injected into handlers at startup.
///
/// Safe to share across concurrently in-flight tool calls; nothing here is
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct ToolDeps {
    /// Shared HTTP client for upstream calls and health probes.
    pub http: reqwest::Client,
    /// Upstream review service settings (base URL, credential, timeout).
    pub upstream: UpstreamConfig,
    /// Local review agent settings.
    pub agent: AgentConfig,
}

impl ToolDeps {
    /// Builds handler dependencies from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            upstream: config.upstream.clone(),
            agent: config.agent.clone(),
        }
    }
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates a successful result carrying pretty-printed JSON.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        Self::text(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// Deserialises schema-validated arguments into a typed structure.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if the shape still cannot be
/// deserialised (schema validation checks structure, not every serde
/// constraint).
pub fn parse_args<T: serde::de::DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments.clone())
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Invokes the handler registered for `name` with schema-validated arguments.
///
/// `name` must be a catalog entry; the router resolves the descriptor before
/// calling here, so an unknown name is a routing bug and yields an error
/// result rather than a panic.
pub async fn dispatch(name: &str, arguments: &Value, deps: &ToolDeps) -> ToolCallResult {
    let outcome = match name {
        "generate_report" => reports::generate_report(arguments, deps).await,
        "analyze_pull_request" => analysis::analyze_pull_request(arguments),
        "configure_review_settings" => review_config::configure_review_settings(arguments),
        "send_review_command" => commands::send_review_command(arguments),
        "check_health" => return health::check_health(arguments, deps).await,
        "create_custom_report" => reports::create_custom_report(arguments),
        _ => {
            tracing::error!(tool = name, "Dispatch reached for unregistered tool");
            return ToolCallResult::error(format!("Unknown tool: {name}"));
        }
    };

    outcome.unwrap_or_else(|e| ToolCallResult::error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_result_sets_flag() {
        let result = ToolCallResult::error("boom");
        assert!(result.is_error);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""isError":true"#));
    }

    #[test]
    fn success_result_omits_flag() {
        let result = ToolCallResult::text("fine");
        assert!(!result.is_error);
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("isError"));
    }

    #[test]
    fn upstream_error_message_carries_status() {
        let err = ToolError::UpstreamStatus {
            status: 503,
            message: "service unavailable".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("service unavailable"));
    }

    #[tokio::test]
    async fn dispatch_rejects_unregistered_name() {
        let deps = ToolDeps::from_config(&crate::config::Config::default());
        let result = dispatch("delete_everything", &json!({}), &deps).await;
        assert!(result.is_error);
    }
}
