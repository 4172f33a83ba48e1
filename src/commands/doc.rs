// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Document commands

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::cli::DocCommands;
use crate::entities::DocEntity;
use crate::error::{ClientError, Result};
use crate::stores::DocStore;

use super::Session;

#[derive(Serialize)]
struct LearnLine {
    file: String,
    doc_id: Option<String>,
    doc_exists: bool,
    error: Option<String>,
}

#[derive(Serialize)]
struct Part {
    index: u64,
    text: Option<String>,
}

/// Hex SHA-256 of the file contents. Unreadable files key on their path
/// and surface the read error when the queue is processed.
async fn content_hash(path: &Path) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            format!("{:x}", hasher.finalize())
        }
        Err(_) => path.display().to_string(),
    }
}

fn digest_state(doc: &DocEntity) -> &'static str {
    if !doc.digest_error.is_empty() {
        "failed"
    } else if doc.is_digested() {
        "digested"
    } else if doc.is_digesting() {
        "digesting"
    } else {
        "queued"
    }
}

/// Execute the doc command
pub async fn execute(session: &Session, command: DocCommands) -> Result<()> {
    let router = &session.router;
    match command {
        DocCommands::Learn { files, ai } => {
            let ai = ai.as_deref();
            let mut store = DocStore::new();
            for file in &files {
                let hash = content_hash(file).await;
                if !store.enqueue(ai, hash, file.clone()) {
                    tracing::debug!("skipping duplicate file {}", file.display());
                }
            }

            let reports = store.process_queue(router, ai).await;
            let mut failed = 0;
            let lines: Vec<LearnLine> = reports
                .into_iter()
                .map(|report| {
                    let file = report.path.display().to_string();
                    match report.result {
                        Ok(outcome) => LearnLine {
                            file,
                            doc_id: Some(outcome.doc_id),
                            doc_exists: outcome.doc_exists,
                            error: None,
                        },
                        Err(e) => {
                            failed += 1;
                            LearnLine {
                                file,
                                doc_id: None,
                                doc_exists: false,
                                error: Some(e.to_string()),
                            }
                        }
                    }
                })
                .collect();

            session.render(&lines, |lines| {
                for line in lines {
                    match (&line.doc_id, &line.error) {
                        (Some(id), _) if line.doc_exists => {
                            println!("{}: already learned ({})", line.file, id)
                        }
                        (Some(id), _) => println!("{}: learning ({})", line.file, id),
                        (None, Some(error)) => eprintln!("{}: {}", line.file, error),
                        (None, None) => {}
                    }
                }
            })?;

            if failed > 0 {
                return Err(ClientError::InvalidInput(format!(
                    "{} of {} files could not be learned",
                    failed,
                    files.len()
                )));
            }
            Ok(())
        }
        DocCommands::List {
            ai,
            search,
            limit,
            offset,
        } => {
            let docs = router
                .list_docs(ai.as_deref(), &search, limit, offset)
                .await?;
            session.render(&docs, |docs| {
                if docs.is_empty() {
                    println!("No documents.");
                }
                for doc in docs {
                    println!("{}  {:<9}  {}", doc.id, digest_state(doc), doc.source);
                }
            })
        }
        DocCommands::Delete { id, ai } => {
            let deleted = router
                .delete_doc(ai.as_deref(), &id)
                .await?
                .ok_or_else(|| ClientError::InvalidInput(format!("Doc '{}' not found", id)))?;
            session.render(&deleted, |doc| println!("Deleted {}", doc.source))
        }
        DocCommands::Parts { id, ai, index } => {
            let ai = ai.as_deref();
            let indexes: Vec<u64> = match index {
                Some(index) => vec![index],
                None => (0..router.count_doc_parts(ai, &id).await?).collect(),
            };

            let mut parts = Vec::with_capacity(indexes.len());
            for index in indexes {
                let text = router.get_doc_part(ai, &id, index).await?;
                parts.push(Part { index, text });
            }

            session.render(&parts, |parts| {
                for part in parts {
                    println!("--- part {} ---", part.index);
                    println!("{}", part.text.as_deref().unwrap_or("(empty)"));
                }
            })
        }
        DocCommands::Digesting { ai } => {
            let ids = router
                .list_digesting_doc_ids(ai.as_deref(), crate::actions::DEFAULT_DIGESTING_LIMIT)
                .await?;
            if ids.is_empty() {
                return session.render(&ids, |_| println!("Nothing is being digested."));
            }
            let docs = router.list_docs_by_ids(ai.as_deref(), &ids).await?;
            session.render(&docs, |docs| {
                for doc in docs {
                    println!("{}  {}", doc.id, doc.source);
                }
            })
        }
    }
}
