//! Fixed tool and resource catalogs.
//!
//! Both catalogs are built once, never mutated, and always returned in
//! declaration order so clients present a stable list. Tool input schemas
//! are typed [`ObjectSchema`] values; the same value drives validation and
//! the `tools/list` rendering.

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::schema::{ObjectSchema, Schema};
use crate::tools::commands::COMMAND_VALUES;

/// A registered tool: name, description, and declared input schema.
#[derive(Debug)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Declared input schema.
    pub input_schema: ObjectSchema,
}

impl ToolDescriptor {
    /// Renders this descriptor for the `tools/list` response.
    #[must_use]
    pub fn to_definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": Schema::Object(self.input_schema.clone()).to_json_schema(),
        })
    }
}

/// A registered resource: URI, metadata, and MIME type.
#[derive(Debug)]
pub struct ResourceDescriptor {
    /// Unique resource URI (custom `review://` scheme).
    pub uri: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// MIME type of the content.
    pub mime_type: &'static str,
}

impl ResourceDescriptor {
    /// Renders this descriptor for the `resources/list` response.
    #[must_use]
    pub fn to_definition(&self) -> Value {
        json!({
            "uri": self.uri,
            "name": self.name,
            "description": self.description,
            "mimeType": self.mime_type,
        })
    }
}

/// Returns the tool catalog in declaration order.
pub fn tool_descriptors() -> &'static [ToolDescriptor] {
    static TOOLS: OnceLock<Vec<ToolDescriptor>> = OnceLock::new();
    TOOLS.get_or_init(build_tool_descriptors)
}

/// Looks up a tool descriptor by name.
#[must_use]
pub fn find_tool(name: &str) -> Option<&'static ToolDescriptor> {
    tool_descriptors().iter().find(|tool| tool.name == name)
}

/// Returns the resource catalog in declaration order.
#[must_use]
pub fn resource_descriptors() -> &'static [ResourceDescriptor] {
    &RESOURCES
}

/// Looks up a resource descriptor by URI.
#[must_use]
pub fn find_resource(uri: &str) -> Option<&'static ResourceDescriptor> {
    resource_descriptors()
        .iter()
        .find(|resource| resource.uri == uri)
}

#[allow(clippy::too_many_lines)]
fn build_tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "generate_report",
            description: "Generate a review activity report from the upstream review service \
                          for a date range. Requires a configured API credential. Dates are \
                          ISO YYYY-MM-DD.",
            input_schema: ObjectSchema::new()
                .required("from", Schema::string(), "Start date (YYYY-MM-DD)")
                .required("to", Schema::string(), "End date (YYYY-MM-DD)"),
        },
        ToolDescriptor {
            name: "analyze_pull_request",
            description: "Analyze a pull request and return review suggestions with \
                          file/line/severity plus aggregate metrics. Returns illustrative \
                          sample data in a fixed shape.",
            input_schema: ObjectSchema::new()
                .required(
                    "repository",
                    Schema::string(),
                    "Repository in owner/name form",
                )
                .required(
                    "pullRequestNumber",
                    Schema::Integer,
                    "Pull request number",
                )
                .optional(
                    "reviewInstructions",
                    Schema::string(),
                    "Optional instructions steering the review",
                ),
        },
        ToolDescriptor {
            name: "configure_review_settings",
            description: "Serialise review settings (per-path instructions and the ast-grep \
                          tool section) into a YAML configuration document for the repository.",
            input_schema: ObjectSchema::new()
                .required(
                    "repository",
                    Schema::string(),
                    "Repository in owner/name form",
                )
                .required(
                    "configuration",
                    Schema::Object(
                        ObjectSchema::new()
                            .optional(
                                "pathInstructions",
                                Schema::array_of(Schema::Object(
                                    ObjectSchema::new()
                                        .required(
                                            "path",
                                            Schema::string(),
                                            "Glob pattern the instructions apply to",
                                        )
                                        .required(
                                            "instructions",
                                            Schema::string(),
                                            "Review instructions for matching files",
                                        ),
                                )),
                                "Per-path review instructions",
                            )
                            .optional(
                                "tools",
                                Schema::Object(ObjectSchema::new().optional(
                                    "astGrep",
                                    Schema::Object(
                                        ObjectSchema::new()
                                            .optional(
                                                "essentialRules",
                                                Schema::Boolean,
                                                "Enable the essential rule pack",
                                            )
                                            .optional(
                                                "ruleDirs",
                                                Schema::array_of(Schema::string()),
                                                "Directories containing custom rules",
                                            )
                                            .optional(
                                                "utilDirs",
                                                Schema::array_of(Schema::string()),
                                                "Directories containing rule utilities",
                                            )
                                            .optional(
                                                "packages",
                                                Schema::array_of(Schema::string()),
                                                "Rule packages to load",
                                            ),
                                    ),
                                    "ast-grep tool configuration",
                                )),
                                "Tool sub-configurations",
                            ),
                    ),
                    "The review configuration to serialise",
                ),
        },
        ToolDescriptor {
            name: "send_review_command",
            description: "Send a review command to the in-IDE agent. The command is mapped \
                          to a canonical directive; 'remember rule' and 'provide context' \
                          substitute the context argument into the directive.",
            input_schema: ObjectSchema::new()
                .required(
                    "command",
                    Schema::string_enum(COMMAND_VALUES),
                    "The review command to send",
                )
                .optional(
                    "context",
                    Schema::string(),
                    "Context substituted into templated directives",
                )
                .optional(
                    "targetFiles",
                    Schema::array_of(Schema::string()),
                    "Files the directive applies to",
                ),
        },
        ToolDescriptor {
            name: "check_health",
            description: "Probe the review agent's /health endpoint with a bounded timeout. \
                          Always succeeds; the result carries a status of healthy, unhealthy, \
                          or unreachable.",
            input_schema: ObjectSchema::new().optional(
                "agentUrl",
                Schema::string(),
                "Agent base URL (default: http://127.0.0.1:8080)",
            ),
        },
        ToolDescriptor {
            name: "create_custom_report",
            description: "Build a custom review summary from a template and date range. \
                          Returns illustrative sample data in a fixed shape.",
            input_schema: ObjectSchema::new()
                .required("template", Schema::string(), "Report template name")
                .required(
                    "dateRange",
                    Schema::string(),
                    "Reporting window, e.g. 'last 30 days'",
                )
                .optional("filters", Schema::Object(ObjectSchema::new()), "Optional filters"),
        },
    ]
}

/// The resource catalog. Content is rendered at read time from the templates
/// in [`crate::resources`].
static RESOURCES: [ResourceDescriptor; 4] = [
    ResourceDescriptor {
        uri: "review://config/sample",
        name: "Sample review configuration",
        description: "A complete example review configuration file",
        mime_type: "application/yaml",
    },
    ResourceDescriptor {
        uri: "review://commands/help",
        name: "Review command reference",
        description: "Documentation for every review command the agent accepts",
        mime_type: "text/markdown",
    },
    ResourceDescriptor {
        uri: "review://tools/astgrep",
        name: "ast-grep configuration guide",
        description: "Example ast-grep tool configuration with custom rule directories",
        mime_type: "application/yaml",
    },
    ResourceDescriptor {
        uri: "review://env/template",
        name: "Environment template",
        description: "Template for the environment variables the server reads",
        mime_type: "text/plain",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_tools_in_fixed_order() {
        let names: Vec<_> = tool_descriptors().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "generate_report",
                "analyze_pull_request",
                "configure_review_settings",
                "send_review_command",
                "check_health",
                "create_custom_report",
            ]
        );
    }

    #[test]
    fn four_resources_in_fixed_order() {
        let uris: Vec<_> = resource_descriptors().iter().map(|r| r.uri).collect();
        assert_eq!(
            uris,
            vec![
                "review://config/sample",
                "review://commands/help",
                "review://tools/astgrep",
                "review://env/template",
            ]
        );
    }

    #[test]
    fn required_fields_are_marked_required() {
        let report = find_tool("generate_report").unwrap();
        assert_eq!(report.input_schema.required, vec!["from", "to"]);

        let analyze = find_tool("analyze_pull_request").unwrap();
        assert_eq!(
            analyze.input_schema.required,
            vec!["repository", "pullRequestNumber"]
        );

        let configure = find_tool("configure_review_settings").unwrap();
        assert_eq!(
            configure.input_schema.required,
            vec!["repository", "configuration"]
        );

        let command = find_tool("send_review_command").unwrap();
        assert_eq!(command.input_schema.required, vec!["command"]);

        let health = find_tool("check_health").unwrap();
        assert!(health.input_schema.required.is_empty());

        let custom = find_tool("create_custom_report").unwrap();
        assert_eq!(custom.input_schema.required, vec!["template", "dateRange"]);
    }

    #[test]
    fn command_schema_lists_all_five_values() {
        let command = find_tool("send_review_command").unwrap();
        let definition = command.to_definition();
        let members = definition["inputSchema"]["properties"]["command"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(members.len(), 5);
    }

    #[test]
    fn unknown_lookups_return_none() {
        assert!(find_tool("delete_everything").is_none());
        assert!(find_resource("review://nope").is_none());
    }

    #[test]
    fn definitions_serialise_with_input_schema() {
        for tool in tool_descriptors() {
            let definition = tool.to_definition();
            assert_eq!(definition["inputSchema"]["type"], "object");
            assert!(!definition["description"].as_str().unwrap().is_empty());
        }
    }
}
