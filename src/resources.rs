//! Static resource content.
//!
//! Each catalog resource maps to a fixed template rendered at read time.
//! Rendering is deterministic: two reads of the same URI return
//! byte-identical content.

/// Renders the content for a resource URI.
///
/// Returns `None` for URIs not in the catalog; the router turns that into
/// an unknown-resource error.
#[must_use]
pub fn render(uri: &str) -> Option<String> {
    match uri {
        "review://config/sample" => Some(sample_config()),
        "review://commands/help" => Some(commands_help()),
        "review://tools/astgrep" => Some(astgrep_guide()),
        "review://env/template" => Some(env_template()),
        _ => None,
    }
}

fn sample_config() -> String {
    "\
# Sample review configuration
# Commit as .review-pilot.yaml in the repository root.
reviews:
  path_instructions:
    - path: \"src/**/*.rs\"
      instructions: \"Prefer ? over unwrap; flag any panic path in non-test code.\"
    - path: \"tests/**\"
      instructions: \"Each test asserts one behaviour; names describe that behaviour.\"
tools:
  ast-grep:
    essential_rules: true
    rule_dirs:
      - \"review/rules\"
    packages:
      - \"org/security-rules\"
"
    .to_string()
}

fn commands_help() -> String {
    "\
# Review commands

Commands accepted by `send_review_command`:

| Command | Effect |
|---|---|
| `generate docstrings` | Generate docstrings for all changed functions and methods |
| `explain reasoning` | Explain the reasoning behind the most recent suggestions |
| `remember rule` | Store the rule given in `context` for all future reviews |
| `provide context` | Supply the `context` text as background for this review |
| `clarify suggestion` | Clarify the most recent suggestion with a code example |

`remember rule` and `provide context` substitute the `context` argument into
their directive. The optional `targetFiles` argument scopes any command to a
file list.
"
    .to_string()
}

fn astgrep_guide() -> String {
    "\
# ast-grep tool configuration
# Place custom rules under rule_dirs; shared utilities under util_dirs.
tools:
  ast-grep:
    essential_rules: true
    rule_dirs:
      - \"review/rules\"
    util_dirs:
      - \"review/utils\"
    packages:
      - \"org/security-rules\"
      - \"org/style-rules\"
"
    .to_string()
}

fn env_template() -> String {
    "\
# Environment for review-pilot-mcp
# The API credential may live here instead of the config file.
REVIEW_PILOT_API_KEY=your-api-key-here
"
    .to_string()
}
