// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine scenarios.
//!
//! `TestHarness` assembles a [`NukeEngine`] over a [`MockObjectApi`] with a
//! caller-defined catalog. `run()` drives the whole workflow: select, fetch,
//! preview, confirm, delete.

use std::sync::Arc;
use std::time::Duration;

use nuketune_config::NukeTuneConfig;
use nuketune_core::{Category, ManagedObject, NukeError};
use nuketune_engine::{NukeEngine, RunSummary, Session};

use crate::mock_api::MockObjectApi;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    catalog: Vec<Category>,
    api: MockObjectApi,
    config: NukeTuneConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            catalog: Vec::new(),
            api: MockObjectApi::new(),
            config: NukeTuneConfig::default(),
        }
    }

    /// Add a catalog category served with `objects` as one page.
    pub fn with_category(mut self, category: Category, objects: Vec<ManagedObject>) -> Self {
        self.api = self.api.with_objects(&category.id, objects);
        self.catalog.push(category);
        self
    }

    /// Customize the mock API (failures, latency, hooks).
    pub fn with_api(mut self, f: impl FnOnce(MockObjectApi) -> MockObjectApi) -> Self {
        self.api = f(self.api);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.deletion.batch_size = batch_size;
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.config.deletion.chunk_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_confirmation_phrase(mut self, phrase: &str) -> Self {
        self.config.deletion.confirmation_phrase = phrase.to_string();
        self
    }

    pub fn build(self) -> TestHarness {
        let engine = NukeEngine::with_catalog(Arc::new(self.api.clone()), &self.config, self.catalog);
        TestHarness {
            api: self.api,
            engine,
            config: self.config,
        }
    }
}

/// A complete engine with a mock API behind it.
pub struct TestHarness {
    /// The mock API; shares recordings with the one inside the engine.
    pub api: MockObjectApi,
    pub engine: NukeEngine,
    pub config: NukeTuneConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn session(&self) -> &Arc<Session> {
        self.engine.session()
    }

    /// Selects every selectable category and fetches them.
    pub async fn load_all(&self) -> Result<(), NukeError> {
        self.session().select_all_categories()?;
        for (_, result) in self.engine.load_selected_categories().await {
            result?;
        }
        Ok(())
    }

    /// Opens the preview and types the configured phrase.
    pub fn confirm(&self) -> Result<(), NukeError> {
        self.session().open_preview()?;
        self.session()
            .begin_confirmation(&self.config.deletion.confirmation_phrase)
    }

    /// Loads, confirms and runs a deletion over every category.
    pub async fn run(&self) -> Result<RunSummary, NukeError> {
        self.load_all().await?;
        self.confirm()?;
        self.engine.start_deletion().await
    }
}

/// `n` objects named `<prefix> <i>` with ids `<prefix>-<i>`.
pub fn objects(prefix: &str, n: usize) -> Vec<ManagedObject> {
    (0..n)
        .map(|i| {
            ManagedObject::new(format!("{prefix}-{i}")).with_display_name(format!("{prefix} {i}"))
        })
        .collect()
}
