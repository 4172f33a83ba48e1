// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::entities::MemStats;
use crate::error::CallResult;
use crate::router::{Action, Args, CallRouter};

impl CallRouter {
    pub async fn mem_stats(&self, ai: Option<&str>) -> CallResult<MemStats> {
        self.perform_as(Action::MemStats, Args::new().with_opt("ai", ai))
            .await
    }

    /// Compact the AI's memory database.
    pub async fn vacuum_mem(&self, ai: Option<&str>) -> CallResult<()> {
        self.perform(Action::MemVacuum, Args::new().with_opt("ai", ai))
            .await
            .map(|_| ())
    }
}
