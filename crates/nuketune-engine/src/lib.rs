// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk deletion engine for NukeTune.
//!
//! [`NukeEngine`] ties the pieces together:
//! - a [`Session`] holding selection, phase and the outcome log
//! - the fetcher, materializing every page of a category
//! - the [`DeletionOrchestrator`], running categories through the
//!   protection filter and the batch processor
//! - the CSV exporter

pub mod batch;
pub mod catalog;
pub mod control;
pub mod export;
pub mod fetcher;
pub mod orchestrator;
pub mod protect;
pub mod session;
pub mod shutdown;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use nuketune_config::NukeTuneConfig;
use nuketune_core::{ApiError, Category, DeletionPhase, NukeError, ObjectApi};
use tracing::{info, warn};

pub use batch::{process_batch, BatchFailure, BatchObserver, BatchOptions, BatchResult};
pub use catalog::{find_category, intune_categories};
pub use control::RunControl;
pub use export::{export_file_name, export_log_to_csv};
pub use fetcher::fetch_category_objects;
pub use orchestrator::{
    CategoryPlan, CategorySummary, DeletionOptions, DeletionOrchestrator, RunState, RunSummary,
};
pub use protect::{Deletability, SkipReason};
pub use session::{CategoryRunState, DeletionStats, Session, SessionSnapshot};

/// Front-end facing handle over one session.
pub struct NukeEngine {
    api: Arc<dyn ObjectApi>,
    session: Arc<Session>,
    orchestrator: DeletionOrchestrator,
}

impl NukeEngine {
    /// Creates an engine over the built-in Intune catalog.
    pub fn new(api: Arc<dyn ObjectApi>, config: &NukeTuneConfig) -> Self {
        Self::with_catalog(api, config, intune_categories())
    }

    pub fn with_catalog(
        api: Arc<dyn ObjectApi>,
        config: &NukeTuneConfig,
        catalog: Vec<Category>,
    ) -> Self {
        let session = Arc::new(Session::new(
            catalog,
            config.deletion.confirmation_phrase.clone(),
        ));
        let orchestrator =
            DeletionOrchestrator::new(Arc::clone(&api), DeletionOptions::from(&config.deletion));
        Self {
            api,
            session,
            orchestrator,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Fetches one category and stores the result on it.
    ///
    /// On failure the error is stored on the category and also returned;
    /// other categories are unaffected. Returns the number of objects.
    pub async fn load_category_objects(&self, category_id: &str) -> Result<usize, NukeError> {
        let category = self
            .session
            .snapshot()
            .category(category_id)
            .map(|c| c.category.clone())
            .ok_or_else(|| NukeError::UnknownCategory(category_id.to_string()))?;

        self.session.set_category_loading(category_id, true)?;
        match fetch_category_objects(self.api.as_ref(), &category).await {
            Ok(objects) => {
                let count = objects.len();
                info!(category = %category_id, count, "category loaded");
                self.session.set_category_objects(category_id, objects)?;
                Ok(count)
            }
            Err(e) => {
                let classified = ApiError::classify(&e);
                warn!(category = %category_id, error = %classified, "category fetch failed");
                self.session
                    .set_category_error(category_id, classified.to_string())?;
                Err(e)
            }
        }
    }

    /// Fetches every selected category concurrently.
    ///
    /// Results come back in catalog order; one failure does not stop the
    /// others.
    pub async fn load_selected_categories(&self) -> Vec<(String, Result<usize, NukeError>)> {
        let ids: Vec<String> = self
            .session
            .snapshot()
            .selected_categories()
            .map(|c| c.id().to_string())
            .collect();

        let results = join_all(ids.iter().map(|id| self.load_category_objects(id))).await;
        ids.into_iter().zip(results).collect()
    }

    /// Runs the confirmed deletion to completion.
    pub async fn start_deletion(&self) -> Result<RunSummary, NukeError> {
        let phase = self.session.snapshot().phase;
        if phase != DeletionPhase::Confirming {
            return Err(NukeError::InvalidPhase {
                action: "start a deletion",
                phase,
            });
        }
        let control = self.session.control();
        Ok(self.orchestrator.run(self.session.as_ref(), &control).await)
    }

    /// The current log as CSV.
    pub fn export_log(&self) -> Result<String, NukeError> {
        let snapshot = self.session.snapshot();
        export_log_to_csv(snapshot.log.iter().map(Arc::as_ref))
    }

    /// Writes the current log to a timestamped file in `dir`.
    pub async fn write_log(&self, dir: &Path) -> Result<PathBuf, NukeError> {
        let csv = self.export_log()?;
        let path = dir.join(export_file_name(Utc::now()));
        write_file(&path, csv).await?;
        Ok(path)
    }

    /// Writes the current log to exactly `path`.
    pub async fn write_log_to(&self, path: &Path) -> Result<(), NukeError> {
        let csv = self.export_log()?;
        write_file(path, csv).await
    }
}

async fn write_file(path: &Path, contents: String) -> Result<(), NukeError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| NukeError::Internal(format!("creating {}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| NukeError::Internal(format!("writing {}: {e}", path.display())))?;
    info!(path = %path.display(), "deletion log written");
    Ok(())
}
