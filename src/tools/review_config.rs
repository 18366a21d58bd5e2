//! The `configure_review_settings` tool.
//!
//! Serialises a nested review configuration into a YAML-shaped document that
//! mirrors the input one-to-one: per-path review instructions plus an
//! optional ast-grep tool section. The document is text for the operator to
//! commit; nothing is written to disk and no network call is made.

use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::Value;

use super::{parse_args, ToolCallResult, ToolError};

/// Arguments for `configure_review_settings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureReviewSettingsArgs {
    /// Repository the configuration applies to.
    pub repository: String,
    /// The review configuration to serialise.
    pub configuration: ReviewConfiguration,
}

/// Nested review configuration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewConfiguration {
    /// Per-path review instructions.
    #[serde(default)]
    pub path_instructions: Vec<PathInstruction>,
    /// Tool sub-configurations.
    #[serde(default)]
    pub tools: Option<ToolsSection>,
}

/// One glob pattern with its review instructions.
#[derive(Debug, Deserialize)]
pub struct PathInstruction {
    /// Glob pattern the instructions apply to.
    pub path: String,
    /// Review instructions for matching files.
    pub instructions: String,
}

/// Tool sub-configuration section.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsSection {
    /// ast-grep configuration.
    #[serde(default)]
    pub ast_grep: Option<AstGrepSection>,
}

/// ast-grep tool configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstGrepSection {
    /// Whether the essential rule pack is enabled.
    #[serde(default)]
    pub essential_rules: Option<bool>,
    /// Directories containing custom rules.
    #[serde(default)]
    pub rule_dirs: Vec<String>,
    /// Directories containing rule utilities.
    #[serde(default)]
    pub util_dirs: Vec<String>,
    /// Rule packages to load.
    #[serde(default)]
    pub packages: Vec<String>,
}

/// Renders the configuration document.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if deserialisation fails.
pub fn configure_review_settings(arguments: &Value) -> Result<ToolCallResult, ToolError> {
    let args: ConfigureReviewSettingsArgs = parse_args(arguments)?;
    Ok(ToolCallResult::text(render_yaml(&args)))
}

/// Renders the YAML document by hand. The shape mirrors the input
/// one-to-one; quoting is limited to what the emitted fields need
/// (globs and instructions are double-quoted).
fn render_yaml(args: &ConfigureReviewSettingsArgs) -> String {
    let mut doc = String::new();

    let _ = writeln!(doc, "# Review configuration for {}", args.repository);
    doc.push_str("reviews:\n");

    if args.configuration.path_instructions.is_empty() {
        doc.push_str("  path_instructions: []\n");
    } else {
        doc.push_str("  path_instructions:\n");
        for instruction in &args.configuration.path_instructions {
            let _ = writeln!(doc, "    - path: {}", quote(&instruction.path));
            let _ = writeln!(doc, "      instructions: {}", quote(&instruction.instructions));
        }
    }

    if let Some(ast_grep) = args
        .configuration
        .tools
        .as_ref()
        .and_then(|tools| tools.ast_grep.as_ref())
    {
        doc.push_str("tools:\n");
        doc.push_str("  ast-grep:\n");
        if let Some(essential) = ast_grep.essential_rules {
            let _ = writeln!(doc, "    essential_rules: {essential}");
        }
        write_string_list(&mut doc, "rule_dirs", &ast_grep.rule_dirs);
        write_string_list(&mut doc, "util_dirs", &ast_grep.util_dirs);
        write_string_list(&mut doc, "packages", &ast_grep.packages);
    }

    doc
}

fn write_string_list(doc: &mut String, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let _ = writeln!(doc, "    {key}:");
    for value in values {
        let _ = writeln!(doc, "      - {}", quote(value));
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolContent;
    use serde_json::json;

    fn text_of(result: &ToolCallResult) -> &str {
        let ToolContent::Text { text } = &result.content[0];
        text
    }

    #[test]
    fn renders_path_instructions_one_to_one() {
        let args = json!({
            "repository": "acme/widgets",
            "configuration": {
                "pathInstructions": [
                    { "path": "src/**/*.rs", "instructions": "Prefer ? over unwrap" },
                    { "path": "tests/**", "instructions": "One behaviour per test" }
                ]
            }
        });

        let result = configure_review_settings(&args).unwrap();
        let text = text_of(&result);
        assert!(text.contains("# Review configuration for acme/widgets"));
        assert!(text.contains(r#"- path: "src/**/*.rs""#));
        assert!(text.contains(r#"instructions: "Prefer ? over unwrap""#));
        assert!(text.contains(r#"- path: "tests/**""#));
    }

    #[test]
    fn renders_ast_grep_section() {
        let args = json!({
            "repository": "acme/widgets",
            "configuration": {
                "pathInstructions": [],
                "tools": {
                    "astGrep": {
                        "essentialRules": true,
                        "ruleDirs": ["rules"],
                        "packages": ["org/security-rules"]
                    }
                }
            }
        });

        let result = configure_review_settings(&args).unwrap();
        let text = text_of(&result);
        assert!(text.contains("path_instructions: []"));
        assert!(text.contains("ast-grep:"));
        assert!(text.contains("essential_rules: true"));
        assert!(text.contains(r#"- "rules""#));
        assert!(text.contains(r#"- "org/security-rules""#));
    }

    #[test]
    fn escapes_embedded_quotes() {
        let args = json!({
            "repository": "acme/widgets",
            "configuration": {
                "pathInstructions": [
                    { "path": "src/**", "instructions": "Say \"please\"" }
                ]
            }
        });

        let result = configure_review_settings(&args).unwrap();
        assert!(text_of(&result).contains(r#"Say \"please\""#));
    }

    #[test]
    fn rejects_missing_configuration() {
        let args = json!({ "repository": "acme/widgets" });
        assert!(configure_review_settings(&args).is_err());
    }
}
