// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::entities::{DocEntity, LearnOutcome};
use crate::error::CallResult;
use crate::router::{Action, Args, CallRouter, FilePart};

use super::{parse_count, parse_learn_outcome, parse_text};

impl CallRouter {
    /// Upload a document into an AI's memory.
    ///
    /// Digestion happens in the background on the backend; the outcome only
    /// says whether the same content was already known.
    pub async fn learn_doc(&self, ai: Option<&str>, file: FilePart) -> CallResult<LearnOutcome> {
        let value = self
            .perform(
                Action::DocLearn,
                Args::new().with_opt("ai", ai).with_file("file", file),
            )
            .await?;
        parse_learn_outcome(value)
    }

    pub async fn list_docs(
        &self,
        ai: Option<&str>,
        search: &str,
        limit: u64,
        offset: u64,
    ) -> CallResult<Vec<DocEntity>> {
        self.perform_as(
            Action::DocList,
            Args::new()
                .with_opt("ai", ai)
                .with("search", search)
                .with("limit", limit)
                .with("offset", offset),
        )
        .await
    }

    pub async fn list_docs_by_ids(
        &self,
        ai: Option<&str>,
        ids: &[String],
    ) -> CallResult<Vec<DocEntity>> {
        self.perform_as(
            Action::DocListByIds,
            Args::new().with_opt("ai", ai).with("ids", ids.to_vec()),
        )
        .await
    }

    /// Ids of documents whose digestion has started but not finished.
    pub async fn list_digesting_doc_ids(
        &self,
        ai: Option<&str>,
        limit: u64,
    ) -> CallResult<Vec<String>> {
        self.perform_as(
            Action::DocListDigestingIds,
            Args::new().with_opt("ai", ai).with("limit", limit),
        )
        .await
    }

    /// Number of parts a document was split into.
    pub async fn count_doc_parts(&self, ai: Option<&str>, id: &str) -> CallResult<u64> {
        let value = self
            .perform(
                Action::DocCountPart,
                Args::new().with_opt("ai", ai).with("id", id),
            )
            .await?;
        Ok(parse_count(&value))
    }

    /// Text of one document part, `None` if the index is out of range.
    pub async fn get_doc_part(
        &self,
        ai: Option<&str>,
        id: &str,
        index: u64,
    ) -> CallResult<Option<String>> {
        let value = self
            .perform(
                Action::DocGetPart,
                Args::new()
                    .with_opt("ai", ai)
                    .with("id", id)
                    .with("index", index),
            )
            .await?;
        Ok(parse_text(value))
    }

    pub async fn delete_doc(&self, ai: Option<&str>, id: &str) -> CallResult<Option<DocEntity>> {
        self.perform_as(
            Action::DocDelete,
            Args::new().with_opt("ai", ai).with("id", id),
        )
        .await
    }
}
