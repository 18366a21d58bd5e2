//! stdio transport for the MCP server.
//!
//! - Messages are UTF-8 encoded JSON-RPC, delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from the client
//! - stdout: sends messages to the client
//! - stderr: may be used for logging (not MCP messages)
//!
//! # Concurrency
//!
//! Tool calls run on spawned tasks so a slow handler (for example a report
//! request waiting on the upstream service) does not block reading further
//! input. All output funnels through one writer task fed by an mpsc channel;
//! responses therefore appear in completion order and are correlated only by
//! request id.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse};

/// The reading half of the stdio transport.
pub struct StdioTransport {
    /// Buffered reader for stdin.
    reader: BufReader<tokio::io::Stdin>,
}

impl StdioTransport {
    /// Creates a new stdio transport reader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }

    /// Reads the next message line from stdin.
    ///
    /// Returns `None` if stdin is closed (EOF).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // EOF - stdin closed
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone-able handle for enqueueing outbound messages.
///
/// Every in-flight request holds one of these; the single writer task owns
/// stdout. Dropping all sinks closes the channel and ends the writer.
#[derive(Clone)]
pub struct OutboundSink {
    tx: mpsc::UnboundedSender<String>,
}

impl OutboundSink {
    /// Serialises and enqueues a success response.
    pub fn send_response(&self, response: &JsonRpcResponse) {
        match serde_json::to_string(response) {
            Ok(json) => self.send_raw(json),
            Err(e) => tracing::error!(error = %e, "Failed to serialise response"),
        }
    }

    /// Serialises and enqueues an error response.
    pub fn send_error(&self, error: &JsonRpcError) {
        match serde_json::to_string(error) {
            Ok(json) => self.send_raw(json),
            Err(e) => tracing::error!(error = %e, "Failed to serialise error response"),
        }
    }

    fn send_raw(&self, json: String) {
        // MCP spec: messages must not contain embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        if self.tx.send(json).is_err() {
            tracing::warn!("Writer task gone, dropping outbound message");
        }
    }
}

/// Spawns the stdout writer task.
///
/// Returns the sink used to enqueue messages and the writer's join handle.
/// The writer exits cleanly once every sink has been dropped.
#[must_use]
pub fn spawn_writer() -> (OutboundSink, JoinHandle<io::Result<()>>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(json) = rx.recv().await {
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok(())
    });

    (OutboundSink { tx }, handle)
}
