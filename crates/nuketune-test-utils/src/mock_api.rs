// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `ObjectApi` for deterministic tests.
//!
//! `MockObjectApi` serves pre-configured pages per category and records
//! every list and delete call, including the (tokio) instant each delete
//! was issued and the peak number of concurrent deletes.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use nuketune_core::{ApiError, Category, ManagedObject, NukeError, ObjectApi, ObjectPage};

/// One recorded delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub category_id: String,
    pub object_id: String,
    pub at: Instant,
}

type DeleteHook = Arc<dyn Fn(&DeleteCall) + Send + Sync>;

#[derive(Default)]
struct Recorded {
    list_calls: Mutex<HashMap<String, usize>>,
    delete_calls: Mutex<Vec<DeleteCall>>,
    deleted: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// A mock object API with per-category pages and per-object failures.
///
/// Clones share recordings.
#[derive(Clone, Default)]
pub struct MockObjectApi {
    pages: HashMap<String, Vec<Vec<ManagedObject>>>,
    list_errors: HashMap<String, ApiError>,
    delete_errors: HashMap<String, ApiError>,
    delete_latency: Duration,
    delete_hook: Option<DeleteHook>,
    recorded: Arc<Recorded>,
}

impl MockObjectApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `pages` for the category, in order, linked by continuation tokens.
    pub fn with_pages(mut self, category_id: &str, pages: Vec<Vec<ManagedObject>>) -> Self {
        self.pages.insert(category_id.to_string(), pages);
        self
    }

    /// Serves `objects` as a single page.
    pub fn with_objects(self, category_id: &str, objects: Vec<ManagedObject>) -> Self {
        self.with_pages(category_id, vec![objects])
    }

    /// Every list call for the category fails with `error`.
    pub fn with_list_error(mut self, category_id: &str, error: ApiError) -> Self {
        self.list_errors.insert(category_id.to_string(), error);
        self
    }

    /// Deleting `object_id` fails with `error`.
    pub fn with_delete_error(mut self, object_id: &str, error: ApiError) -> Self {
        self.delete_errors.insert(object_id.to_string(), error);
        self
    }

    /// Every delete takes `latency` (virtual time under a paused clock).
    pub fn with_delete_latency(mut self, latency: Duration) -> Self {
        self.delete_latency = latency;
        self
    }

    /// Runs `hook` as each delete is issued, before it settles.
    pub fn with_delete_hook(mut self, hook: impl Fn(&DeleteCall) + Send + Sync + 'static) -> Self {
        self.delete_hook = Some(Arc::new(hook));
        self
    }

    pub fn list_calls(&self, category_id: &str) -> usize {
        lock(&self.recorded.list_calls)
            .get(category_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn delete_calls(&self) -> Vec<DeleteCall> {
        lock(&self.recorded.delete_calls).clone()
    }

    /// Categories that received at least one delete, in first-seen order.
    pub fn deleted_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.delete_calls()
            .into_iter()
            .filter(|c| seen.insert(c.category_id.clone()))
            .map(|c| c.category_id)
            .collect()
    }

    /// Ids of objects whose delete succeeded.
    pub fn deleted_ids(&self) -> Vec<String> {
        lock(&self.recorded.deleted).clone()
    }

    /// Peak number of deletes in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.recorded.max_in_flight.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn page_link(category_id: &str, index: usize) -> String {
    format!("mock://{category_id}/page/{index}")
}

fn page_index(next_link: Option<&str>) -> usize {
    next_link
        .and_then(|link| link.rsplit('/').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl ObjectApi for MockObjectApi {
    async fn list_page(
        &self,
        category: &Category,
        next_link: Option<&str>,
    ) -> Result<ObjectPage, NukeError> {
        *lock(&self.recorded.list_calls)
            .entry(category.id.clone())
            .or_default() += 1;

        if let Some(error) = self.list_errors.get(&category.id) {
            return Err(NukeError::Api(error.clone()));
        }

        let Some(pages) = self.pages.get(&category.id) else {
            return Ok(ObjectPage::default());
        };
        let index = page_index(next_link);
        Ok(ObjectPage {
            value: pages.get(index).cloned().unwrap_or_default(),
            next_link: (index + 1 < pages.len()).then(|| page_link(&category.id, index + 1)),
        })
    }

    async fn delete_object(&self, category: &Category, object_id: &str) -> Result<(), NukeError> {
        let call = DeleteCall {
            category_id: category.id.clone(),
            object_id: object_id.to_string(),
            at: Instant::now(),
        };
        lock(&self.recorded.delete_calls).push(call.clone());

        let now = self.recorded.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorded.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(hook) = &self.delete_hook {
            hook(&call);
        }
        if !self.delete_latency.is_zero() {
            tokio::time::sleep(self.delete_latency).await;
        }
        self.recorded.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.delete_errors.get(object_id) {
            Some(error) => Err(NukeError::Api(error.clone())),
            None => {
                lock(&self.recorded.deleted).push(object_id.to_string());
                Ok(())
            }
        }
    }
}
