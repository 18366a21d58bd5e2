//! review-pilot-mcp: MCP server exposing AI code-review tooling
//!
//! This library implements a Model Context Protocol server for a code-review
//! assistant. It exposes a fixed catalog of tools (report generation, pull
//! request analysis, review configuration, review commands, agent health
//! checks) and a small set of static documentation resources over a stdio
//! JSON-RPC 2.0 transport.
//!
//! # Architecture
//!
//! Every tool call is validated against the tool's declared input schema
//! before any handler logic runs, then routed to a typed handler:
//!
//! - **Registry**: immutable tool and resource catalogs, fixed at startup
//! - **Schema**: structural validation of call arguments
//! - **Tools**: one handler per catalog entry, each with typed arguments
//! - **Resources**: static documents rendered from fixed templates
//!
//! The upstream review service (live report generation) and the local review
//! agent (health probe) are external collaborators reached over HTTP; all
//! other handlers are self-contained.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation (transport, router, registry)
//! - [`schema`] — Input schema model and validator
//! - [`tools`] — Tool handlers
//! - [`resources`] — Static resource content

pub mod config;
pub mod error;
pub mod mcp;
pub mod resources;
pub mod schema;
pub mod tools;
