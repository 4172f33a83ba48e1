// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Per-AI document learn queues

use std::collections::HashMap;
use std::path::PathBuf;

use crate::entities::LearnOutcome;
use crate::error::{CallError, CallResult};
use crate::router::{CallRouter, FilePart};

use super::ai_key;

/// A file waiting to be learned, keyed by its content hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnItem {
    pub hash: String,
    pub path: PathBuf,
}

/// Result of learning one queued file
#[derive(Debug)]
pub struct LearnReport {
    pub hash: String,
    pub path: PathBuf,
    pub result: CallResult<LearnOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct DocStore {
    learn_queues: HashMap<String, Vec<LearnItem>>,
    processing: HashMap<String, bool>,
}

impl DocStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file for `ai`. Returns false if the hash is already queued.
    pub fn enqueue(&mut self, ai: Option<&str>, hash: impl Into<String>, path: impl Into<PathBuf>) -> bool {
        let hash = hash.into();
        if self.contains(ai, &hash) {
            return false;
        }
        self.learn_queues
            .entry(ai_key(ai))
            .or_default()
            .push(LearnItem {
                hash,
                path: path.into(),
            });
        true
    }

    pub fn remove(&mut self, ai: Option<&str>, hash: &str) -> Option<LearnItem> {
        let queue = self.learn_queues.get_mut(&ai_key(ai))?;
        let index = queue.iter().position(|item| item.hash == hash)?;
        Some(queue.remove(index))
    }

    pub fn contains(&self, ai: Option<&str>, hash: &str) -> bool {
        self.queue(ai).iter().any(|item| item.hash == hash)
    }

    pub fn queue(&self, ai: Option<&str>) -> &[LearnItem] {
        self.learn_queues
            .get(&ai_key(ai))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_processing(&mut self, ai: Option<&str>, processing: bool) {
        self.processing.insert(ai_key(ai), processing);
    }

    pub fn is_processing(&self, ai: Option<&str>) -> bool {
        self.processing.get(&ai_key(ai)).copied().unwrap_or(false)
    }

    /// Learn every queued file of `ai`, oldest first.
    ///
    /// Each item leaves the queue once attempted, whether it succeeded or
    /// not. An abort or an unauthorized reply stops processing and leaves
    /// the remaining items queued.
    pub async fn process_queue(&mut self, router: &CallRouter, ai: Option<&str>) -> Vec<LearnReport> {
        let mut reports = Vec::new();
        if self.is_processing(ai) {
            return reports;
        }
        self.set_processing(ai, true);

        while let Some(item) = self.queue(ai).first().cloned() {
            let result = match FilePart::from_path(&item.path).await {
                Ok(file) => router.learn_doc(ai, file).await,
                Err(e) => Err(CallError::InvalidInput(format!(
                    "cannot read {}: {}",
                    item.path.display(),
                    e
                ))),
            };

            let stop = matches!(&result, Err(e) if e.is_unauthorized() || e.is_aborted());
            if stop {
                tracing::debug!("Stopping learn queue: {:?}", result);
                reports.push(LearnReport {
                    hash: item.hash,
                    path: item.path,
                    result,
                });
                break;
            }

            self.remove(ai, &item.hash);
            reports.push(LearnReport {
                hash: item.hash,
                path: item.path,
                result,
            });
        }

        self.set_processing(ai, false);
        reports
    }
}
