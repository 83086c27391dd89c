// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The deletion run: categories in order, protected objects skipped,
//! the rest deleted through the batch processor.

use std::sync::Arc;
use std::time::Duration;

use nuketune_config::model::DeletionConfig;
use nuketune_core::{
    ApiError, Category, DeletionLogEntry, DeletionPhase, ManagedObject, NukeError, ObjectApi,
};
use tracing::{debug, info, warn};

use crate::batch::{process_batch, BatchObserver, BatchOptions};
use crate::control::RunControl;
use crate::protect;

/// One category's share of a run: the category and the objects selected
/// for deletion.
#[derive(Debug, Clone)]
pub struct CategoryPlan {
    pub category: Category,
    pub objects: Vec<ManagedObject>,
}

/// What the orchestrator needs from whoever holds session state.
///
/// Every call is a single atomic state transition; `record` updates the
/// category counters, its progress and the log together.
pub trait RunState: Send + Sync {
    fn set_phase(&self, phase: DeletionPhase);

    fn clear_log(&self);

    /// Selected categories with their selected objects, in catalog order.
    fn run_plan(&self) -> Vec<CategoryPlan>;

    /// Resets a category's counters before its objects are processed.
    fn begin_category(&self, category_id: &str, total: usize);

    fn record(&self, entry: DeletionLogEntry);
}

/// Pacing for the delete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionOptions {
    pub batch_size: usize,
    pub chunk_delay: Duration,
    pub pause_poll: Duration,
}

impl Default for DeletionOptions {
    fn default() -> Self {
        Self::from(&DeletionConfig::default())
    }
}

impl From<&DeletionConfig> for DeletionOptions {
    fn from(config: &DeletionConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            chunk_delay: config.chunk_delay(),
            pause_poll: config.pause_poll(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Ids of categories that were started, in order.
    pub categories: Vec<String>,
    pub cancelled: bool,
}

impl RunSummary {
    fn add(&mut self, category_id: &str, summary: CategorySummary) {
        self.deleted += summary.deleted;
        self.failed += summary.failed;
        self.skipped += summary.skipped;
        self.categories.push(category_id.to_string());
    }
}

/// Drives a run against an [`ObjectApi`].
pub struct DeletionOrchestrator {
    api: Arc<dyn ObjectApi>,
    options: DeletionOptions,
}

impl DeletionOrchestrator {
    pub fn new(api: Arc<dyn ObjectApi>, options: DeletionOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &DeletionOptions {
        &self.options
    }

    /// Executes one run and always ends in [`DeletionPhase::Complete`].
    ///
    /// Categories are processed one after another. A cancelled run stops
    /// before the next category; categories not reached are left untouched.
    pub async fn run(&self, state: &dyn RunState, control: &RunControl) -> RunSummary {
        state.set_phase(DeletionPhase::Deleting);
        state.clear_log();

        let mut summary = RunSummary::default();
        for plan in state.run_plan() {
            if plan.objects.is_empty() {
                continue;
            }
            if control.is_cancelled() {
                info!(next = %plan.category.id, "run cancelled, remaining categories untouched");
                break;
            }
            let category_summary = self.delete_category(&plan, state, control).await;
            summary.add(&plan.category.id, category_summary);
        }
        summary.cancelled = control.is_cancelled();

        state.set_phase(DeletionPhase::Complete);
        info!(
            deleted = summary.deleted,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "deletion run complete"
        );
        summary
    }

    /// Skips protected objects and deletes the rest of one category.
    pub async fn delete_category(
        &self,
        plan: &CategoryPlan,
        state: &dyn RunState,
        control: &RunControl,
    ) -> CategorySummary {
        let category = &plan.category;
        state.begin_category(&category.id, plan.objects.len());

        let (deletable, protected) = protect::partition(&plan.objects, category);
        info!(
            category = %category.id,
            total = plan.objects.len(),
            protected = protected.len(),
            "processing category"
        );

        for (object, reason) in &protected {
            debug!(category = %category.id, object = %object.id, %reason, "skipping protected object");
            state.record(DeletionLogEntry::skipped(category, object, reason.message()));
        }

        let api = &self.api;
        let poll = self.options.pause_poll;
        let recorder = Recorder { state, category };
        let result = process_batch(
            deletable.into_iter().cloned().collect(),
            |object: ManagedObject| async move {
                control.wait_while_paused(poll).await?;
                api.delete_object(category, &object.id).await
            },
            &BatchOptions {
                batch_size: self.options.batch_size,
                delay_between_chunks: self.options.chunk_delay,
            },
            control,
            &recorder,
        )
        .await;

        CategorySummary {
            deleted: result.successful.len(),
            failed: result.failed.len(),
            skipped: protected.len(),
        }
    }
}

/// Turns settled items into log entries.
struct Recorder<'a> {
    state: &'a dyn RunState,
    category: &'a Category,
}

impl BatchObserver<ManagedObject, NukeError> for Recorder<'_> {
    fn on_item_complete(&self, object: &ManagedObject, error: Option<&NukeError>) {
        let entry = match error {
            None => {
                debug!(category = %self.category.id, object = %object.id, "deleted");
                DeletionLogEntry::success(self.category, object)
            }
            Some(err) => {
                let classified = ApiError::classify(err);
                warn!(
                    category = %self.category.id,
                    object = %object.id,
                    error = %classified,
                    "delete failed"
                );
                DeletionLogEntry::failed(self.category, object, classified)
            }
        };
        self.state.record(entry);
    }
}
