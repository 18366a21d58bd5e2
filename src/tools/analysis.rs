//! The `analyze_pull_request` tool.
//!
//! Produces a deterministic, schema-conformant illustrative analysis. No
//! live analysis backend is wired up; the contract of this handler is fixed
//! sample output shaped like a real analysis (suggestions with
//! file/line/message/severity plus aggregate metrics).

use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, ToolCallResult, ToolError};

/// Arguments for `analyze_pull_request`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePullRequestArgs {
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Pull request number.
    pub pull_request_number: u64,
    /// Free-form instructions steering the review.
    #[serde(default)]
    pub review_instructions: Option<String>,
}

/// Builds the illustrative analysis payload.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if deserialisation fails.
pub fn analyze_pull_request(arguments: &Value) -> Result<ToolCallResult, ToolError> {
    let args: AnalyzePullRequestArgs = parse_args(arguments)?;

    let result = json!({
        "repository": args.repository,
        "pullRequestNumber": args.pull_request_number,
        "reviewInstructions": args.review_instructions.unwrap_or_default(),
        "suggestions": [
            {
                "file": "src/handlers/payment.rs",
                "line": 42,
                "severity": "high",
                "message": "This unwrap() can panic on a declined transaction; propagate the error instead.",
            },
            {
                "file": "src/handlers/payment.rs",
                "line": 118,
                "severity": "medium",
                "message": "Duplicated currency-rounding logic; extract a shared helper.",
            },
            {
                "file": "tests/payment.rs",
                "line": 7,
                "severity": "low",
                "message": "Test name does not describe the asserted behaviour.",
            },
        ],
        "metrics": {
            "filesReviewed": 12,
            "suggestionCount": 3,
            "estimatedReviewEffort": "medium",
        },
        "note": "Illustrative analysis; connect a review backend for live results.",
    });

    Ok(ToolCallResult::json(&result))
}
