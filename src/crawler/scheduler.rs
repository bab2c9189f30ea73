//! Frontier management and per-document pacing
//!
//! This module handles:
//! - The FIFO queue of fetched sitemap documents awaiting processing
//! - Pausing between two documents so the crawl stays polite

use crate::crawler::parser::XmlElement;
use std::collections::VecDeque;
use std::time::Duration;

/// A fetched and parsed sitemap document waiting to be processed
#[derive(Debug, Clone)]
pub struct QueuedSitemap {
    /// URL the document was fetched from
    pub parent_url: String,

    /// Root element of the document
    pub document: XmlElement,
}

/// Fixed pause between consecutive documents
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Waits for the configured delay
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tracing::debug!("Sleeping {:?} before next sitemap", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Breadth-first frontier of sitemap documents
///
/// Documents are handed out in insertion order. Every document after the
/// first is preceded by one throttle pause, so the delay separates documents
/// and never trails the last one.
#[derive(Debug)]
pub struct Scheduler {
    frontier: VecDeque<QueuedSitemap>,
    throttle: Throttle,
    documents_started: usize,
}

impl Scheduler {
    pub fn new(throttle: Throttle) -> Self {
        Self {
            frontier: VecDeque::new(),
            throttle,
            documents_started: 0,
        }
    }

    /// Appends a document to the back of the frontier
    pub fn enqueue(&mut self, parent_url: String, document: XmlElement) {
        self.frontier.push_back(QueuedSitemap {
            parent_url,
            document,
        });
    }

    /// Takes the next document, pausing first if one was already handed out
    pub async fn next_document(&mut self) -> Option<QueuedSitemap> {
        let next = self.frontier.pop_front()?;

        if self.documents_started > 0 {
            self.throttle.pause().await;
        }
        self.documents_started += 1;

        Some(next)
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Number of documents handed out so far
    pub fn documents_started(&self) -> usize {
        self.documents_started
    }
}
