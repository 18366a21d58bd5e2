//! Report tools: live `generate_report` and synthetic `create_custom_report`.
//!
//! `generate_report` is the one handler that talks to the upstream review
//! service; it needs a configured credential and is bounded by the configured
//! timeout. `create_custom_report` returns a deterministic illustrative
//! summary and performs no network I/O.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, ToolCallResult, ToolDeps, ToolError};

/// Arguments for `generate_report`.
#[derive(Debug, Deserialize)]
pub struct GenerateReportArgs {
    /// Start of the reporting window, ISO `YYYY-MM-DD`.
    pub from: String,
    /// End of the reporting window, ISO `YYYY-MM-DD`.
    pub to: String,
}

/// Calls the upstream review service's report endpoint.
///
/// # Errors
///
/// - [`ToolError::InvalidArguments`] when either bound is not an ISO date or
///   the range is inverted (caught before any network access)
/// - [`ToolError::MissingCredential`] when no API key is configured
/// - [`ToolError::UpstreamTimeout`] when the configured deadline elapses
/// - [`ToolError::UpstreamStatus`] on a non-2xx upstream response
/// - [`ToolError::Transport`] on connection-level failures
pub async fn generate_report(
    arguments: &Value,
    deps: &ToolDeps,
) -> Result<ToolCallResult, ToolError> {
    let args: GenerateReportArgs = parse_args(arguments)?;

    let from = parse_iso_date("from", &args.from)?;
    let to = parse_iso_date("to", &args.to)?;
    if from > to {
        return Err(ToolError::InvalidArguments(format!(
            "'from' ({from}) must not be later than 'to' ({to})"
        )));
    }

    let Some(ref api_key) = deps.upstream.api_key else {
        return Err(ToolError::MissingCredential);
    };

    let url = report_endpoint(&deps.upstream.base_url);
    let timeout = deps.upstream.timeout_secs;

    let response = deps
        .http
        .post(&url)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(timeout))
        .json(&json!({ "from": args.from, "to": args.to }))
        .send()
        .await
        .map_err(|e| classify_transport_error(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ToolError::UpstreamStatus {
            status: status.as_u16(),
            message: if message.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                message
            },
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| classify_transport_error(e, timeout))?;

    Ok(ToolCallResult::json(&body))
}

/// Builds the report endpoint URL, tolerating a slash-terminated base URL.
fn report_endpoint(base_url: &str) -> String {
    format!("{}/reports/generate", base_url.trim_end_matches('/'))
}

fn classify_transport_error(error: reqwest::Error, seconds: u64) -> ToolError {
    if error.is_timeout() {
        ToolError::UpstreamTimeout { seconds }
    } else {
        ToolError::Transport(error)
    }
}

fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ToolError::InvalidArguments(format!(
            "'{field}' must be an ISO date (YYYY-MM-DD), got '{value}'"
        ))
    })
}

/// Arguments for `create_custom_report`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomReportArgs {
    /// Report template name.
    pub template: String,
    /// Reporting window, free-form (e.g. "last 30 days").
    pub date_range: String,
    /// Optional filter expressions.
    #[serde(default)]
    pub filters: Option<Value>,
}

/// Builds a deterministic illustrative custom report.
///
/// No live integration exists for custom reports; the payload is
/// schema-conformant sample output echoing the requested template, range,
/// and filters.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if deserialisation fails.
pub fn create_custom_report(arguments: &Value) -> Result<ToolCallResult, ToolError> {
    let args: CreateCustomReportArgs = parse_args(arguments)?;

    let result = json!({
        "template": args.template,
        "dateRange": args.date_range,
        "filters": args.filters.unwrap_or(Value::Null),
        "summary": {
            "pullRequestsReviewed": 24,
            "suggestionsMade": 87,
            "suggestionsAccepted": 61,
            "averageReviewTimeMinutes": 14,
        },
        "topIssueCategories": [
            { "category": "error handling", "count": 19 },
            { "category": "naming", "count": 12 },
            { "category": "missing tests", "count": 9 },
        ],
        "note": "Illustrative report data; connect a report pipeline for live numbers.",
    });

    Ok(ToolCallResult::json(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::ToolContent;

    fn deps_without_credential() -> ToolDeps {
        ToolDeps::from_config(&Config::default())
    }

    #[tokio::test]
    async fn rejects_malformed_date_before_anything_else() {
        let args = json!({ "from": "January 1st", "to": "2025-01-31" });
        let err = generate_report(&args, &deps_without_credential())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn rejects_inverted_range() {
        let args = json!({ "from": "2025-02-01", "to": "2025-01-01" });
        let err = generate_report(&args, &deps_without_credential())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network() {
        let args = json!({ "from": "2025-01-01", "to": "2025-01-31" });
        let err = generate_report(&args, &deps_without_credential())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingCredential));
    }

    #[test]
    fn report_endpoint_normalises_trailing_slash() {
        assert_eq!(
            report_endpoint("https://review.example.com/api/"),
            "https://review.example.com/api/reports/generate"
        );
        assert_eq!(
            report_endpoint("https://review.example.com/api"),
            "https://review.example.com/api/reports/generate"
        );
    }

    #[test]
    fn custom_report_is_deterministic() {
        let args = json!({ "template": "weekly", "dateRange": "last 7 days" });
        let first = create_custom_report(&args).unwrap();
        let second = create_custom_report(&args).unwrap();

        let ToolContent::Text { text: a } = &first.content[0];
        let ToolContent::Text { text: b } = &second.content[0];
        assert_eq!(a, b);
        assert!(a.contains("weekly"));
        assert!(a.contains("last 7 days"));
    }

    #[test]
    fn custom_report_echoes_filters() {
        let args = json!({
            "template": "security",
            "dateRange": "Q1",
            "filters": { "severity": "high" }
        });
        let result = create_custom_report(&args).unwrap();
        let ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("high"));
    }
}
