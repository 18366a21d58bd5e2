//! The `send_review_command` tool.
//!
//! Maps a fixed set of review commands to canonical natural-language
//! directives for the in-IDE review agent. The command set is an exhaustive
//! enum: adding a sixth command is a compile-time exercise, and the match
//! below will not build until the new variant has a directive.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_args, ToolCallResult, ToolError};

/// A review command the agent understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewCommand {
    /// Ask the agent to generate docstrings across the pull request.
    #[serde(rename = "generate docstrings")]
    GenerateDocstrings,
    /// Ask the agent to explain its most recent suggestions.
    #[serde(rename = "explain reasoning")]
    ExplainReasoning,
    /// Teach the agent a rule to apply in future reviews.
    #[serde(rename = "remember rule")]
    RememberRule,
    /// Give the agent extra context for the current review.
    #[serde(rename = "provide context")]
    ProvideContext,
    /// Ask the agent to clarify a suggestion with an example.
    #[serde(rename = "clarify suggestion")]
    ClarifySuggestion,
}

/// Wire values of every command, in catalog order. Used by the input schema's
/// enum constraint and kept in sync with the serde renames above by test.
pub const COMMAND_VALUES: [&str; 5] = [
    "generate docstrings",
    "explain reasoning",
    "remember rule",
    "provide context",
    "clarify suggestion",
];

impl ReviewCommand {
    /// Renders the canonical directive for this command.
    ///
    /// `RememberRule` and `ProvideContext` substitute `context` into their
    /// templates; the other directives are fixed verbatim and ignore it.
    #[must_use]
    pub fn directive(self, context: Option<&str>) -> String {
        match self {
            Self::GenerateDocstrings => {
                "Generate docstrings for all functions and methods changed in this pull request."
                    .to_string()
            }
            Self::ExplainReasoning => {
                "Explain the reasoning behind your most recent review suggestions.".to_string()
            }
            Self::RememberRule => format!(
                "Remember this rule and apply it to all future reviews: {}",
                context.unwrap_or("(no rule provided)")
            ),
            Self::ProvideContext => format!(
                "Use the following additional context for this review: {}",
                context.unwrap_or("(no context provided)")
            ),
            Self::ClarifySuggestion => {
                "Clarify your most recent review suggestion with a concrete code example."
                    .to_string()
            }
        }
    }
}

/// Arguments for `send_review_command`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReviewCommandArgs {
    /// The command to send.
    pub command: ReviewCommand,
    /// Context substituted into templated directives.
    #[serde(default)]
    pub context: Option<String>,
    /// Files the directive applies to.
    #[serde(default)]
    pub target_files: Option<Vec<String>>,
}

/// Maps the command to its directive and echoes the optional file list.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if deserialisation fails.
pub fn send_review_command(arguments: &Value) -> Result<ToolCallResult, ToolError> {
    let args: SendReviewCommandArgs = parse_args(arguments)?;

    let directive = args.command.directive(args.context.as_deref());

    let mut result = json!({
        "command": args.command,
        "directive": directive,
    });
    if let Some(files) = args.target_files {
        result["targetFiles"] = json!(files);
    }

    Ok(ToolCallResult::json(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolContent;

    #[test]
    fn wire_values_round_trip_through_serde() {
        for value in COMMAND_VALUES {
            let command: ReviewCommand = serde_json::from_value(json!(value)).unwrap();
            assert_eq!(serde_json::to_value(command).unwrap(), json!(value));
        }
    }

    #[test]
    fn generate_docstrings_ignores_context() {
        let with = ReviewCommand::GenerateDocstrings.directive(Some("irrelevant"));
        let without = ReviewCommand::GenerateDocstrings.directive(None);
        assert_eq!(with, without);
        assert!(with.contains("docstrings"));
    }

    #[test]
    fn remember_rule_substitutes_context() {
        let directive = ReviewCommand::RememberRule.directive(Some("enforce camelCase"));
        assert!(directive.contains("enforce camelCase"));
    }

    #[test]
    fn remember_rule_without_context_uses_placeholder() {
        let directive = ReviewCommand::RememberRule.directive(None);
        assert!(directive.contains("(no rule provided)"));
    }

    #[test]
    fn handler_echoes_target_files() {
        let args = json!({
            "command": "provide context",
            "context": "this repo uses nightly",
            "targetFiles": ["src/lib.rs"]
        });
        let result = send_review_command(&args).unwrap();
        assert!(!result.is_error);

        let ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("this repo uses nightly"));
        assert!(text.contains("src/lib.rs"));
    }

    #[test]
    fn handler_rejects_unknown_command() {
        let args = json!({ "command": "delete everything" });
        assert!(send_review_command(&args).is_err());
    }
}
