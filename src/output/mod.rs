//! Output module for emitted nodes and run summaries
//!
//! This module handles:
//! - The `NodeSink` interface crawl results are written through
//! - JSON-lines output to a file or stdout
//! - Deferring output creation until the first write
//! - Run statistics and their console summary

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{NodeSink, OutputError, OutputResult};

use crate::config::OutputConfig;
use crate::model::WebsiteNode;
use std::path::Path;

/// Opens the sink selected by the output configuration
///
/// # Returns
///
/// * `Ok(Box<dyn NodeSink>)` - Stdout for `-`, otherwise a created file
/// * `Err(OutputError)` - The output file could not be created
pub fn open_sink(config: &OutputConfig) -> OutputResult<Box<dyn NodeSink>> {
    if config.is_stdout() {
        tracing::debug!("Writing nodes to stdout");
        Ok(Box::new(JsonLinesSink::stdout()))
    } else {
        tracing::info!("Writing nodes to {}", config.path);
        Ok(Box::new(JsonLinesSink::create(Path::new(&config.path))?))
    }
}

/// Sink that opens its configured output on first use
///
/// A run that fails before anything is written leaves an existing output
/// file untouched. Flushing an unopened sink still opens it, so a finished
/// run with no nodes produces an empty file.
pub struct DeferredSink {
    config: OutputConfig,
    inner: Option<Box<dyn NodeSink>>,
}

impl DeferredSink {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            inner: None,
        }
    }

    /// Whether the underlying output has been opened
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn opened(&mut self) -> OutputResult<&mut Box<dyn NodeSink>> {
        let sink = match self.inner.take() {
            Some(sink) => sink,
            None => open_sink(&self.config)?,
        };
        Ok(self.inner.insert(sink))
    }
}

impl NodeSink for DeferredSink {
    fn write_node(&mut self, node: &WebsiteNode) -> OutputResult<()> {
        self.opened()?.write_node(node)
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.opened()?.flush()
    }
}
