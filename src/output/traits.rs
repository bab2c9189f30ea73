//! Output sink traits and error types
//!
//! This module defines the interface emitted nodes are written through.

use crate::model::WebsiteNode;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize node: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination of the nodes a crawl emits
pub trait NodeSink {
    /// Writes one node
    fn write_node(&mut self, node: &WebsiteNode) -> OutputResult<()>;

    /// Flushes buffered nodes to the destination
    fn flush(&mut self) -> OutputResult<()>;
}

impl<S: NodeSink + ?Sized> NodeSink for Box<S> {
    fn write_node(&mut self, node: &WebsiteNode) -> OutputResult<()> {
        (**self).write_node(node)
    }

    fn flush(&mut self) -> OutputResult<()> {
        (**self).flush()
    }
}

impl NodeSink for Vec<WebsiteNode> {
    fn write_node(&mut self, node: &WebsiteNode) -> OutputResult<()> {
        self.push(node.clone());
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
