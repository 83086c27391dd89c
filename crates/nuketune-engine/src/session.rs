// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable session state: selection, phase, run flags and the log.
//!
//! A mutation that changes something builds a new [`SessionSnapshot`] and
//! publishes it on a `watch` channel; one that changes nothing or fails
//! publishes nothing. Slices a mutation does not touch are shared with the
//! previous snapshot (`Arc::ptr_eq` holds), so observers can detect changes
//! by identity.

use std::sync::{Arc, Mutex, PoisonError};

use nuketune_core::{
    Category, DeletionLogEntry, DeletionPhase, DeletionStatus, ManagedObject, NukeError, UserInfo,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::control::RunControl;
use crate::orchestrator::{CategoryPlan, RunState};

/// A catalog category plus everything this session knows about it.
#[derive(Debug, Clone)]
pub struct CategoryRunState {
    pub category: Category,
    pub selected: bool,
    pub objects: Arc<Vec<ManagedObject>>,
    /// True once a fetch has succeeded.
    pub loaded: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Objects in this category's share of the current run.
    pub run_total: usize,
    pub deleted_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    /// `(deleted + failed + skipped) / run_total * 100`, written together
    /// with the counters.
    pub deletion_progress: f64,
}

impl CategoryRunState {
    fn new(category: Category) -> Self {
        Self {
            category,
            selected: false,
            objects: Arc::new(Vec::new()),
            loaded: false,
            is_loading: false,
            error: None,
            run_total: 0,
            deleted_count: 0,
            failed_count: 0,
            skipped_count: 0,
            deletion_progress: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.category.id
    }

    pub fn selected_objects(&self) -> impl Iterator<Item = &ManagedObject> {
        self.objects.iter().filter(|o| o.selected)
    }

    pub fn selected_object_count(&self) -> usize {
        self.selected_objects().count()
    }

    pub fn processed(&self) -> usize {
        self.deleted_count + self.failed_count + self.skipped_count
    }

    fn reset_run(&mut self, total: usize) {
        self.run_total = total;
        self.deleted_count = 0;
        self.failed_count = 0;
        self.skipped_count = 0;
        self.deletion_progress = 0.0;
    }

    fn recompute_progress(&mut self) {
        self.deletion_progress = if self.run_total == 0 {
            0.0
        } else {
            self.processed() as f64 / self.run_total as f64 * 100.0
        };
    }
}

/// Totals over the selected categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionStats {
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Selected objects across selected categories.
    pub total: usize,
    pub remaining: usize,
}

/// An immutable view of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub categories: Arc<Vec<Arc<CategoryRunState>>>,
    pub log: Arc<Vec<Arc<DeletionLogEntry>>>,
    pub phase: DeletionPhase,
    pub preview_open: bool,
    pub is_paused: bool,
    pub should_cancel: bool,
    pub user: Option<Arc<UserInfo>>,
}

impl SessionSnapshot {
    pub fn category(&self, id: &str) -> Option<&Arc<CategoryRunState>> {
        self.categories.iter().find(|c| c.id() == id)
    }

    pub fn selected_categories(&self) -> impl Iterator<Item = &Arc<CategoryRunState>> {
        self.categories.iter().filter(|c| c.selected)
    }

    /// Number of objects a run started now would consider.
    pub fn total_object_count(&self) -> usize {
        self.selected_categories()
            .map(|c| c.selected_object_count())
            .sum()
    }

    pub fn deletion_stats(&self) -> DeletionStats {
        let mut stats = DeletionStats::default();
        for category in self.selected_categories() {
            stats.deleted += category.deleted_count;
            stats.failed += category.failed_count;
            stats.skipped += category.skipped_count;
            stats.total += category.selected_object_count();
        }
        stats.remaining = stats
            .total
            .saturating_sub(stats.deleted + stats.failed + stats.skipped);
        stats
    }
}

struct Inner {
    snapshot: Arc<SessionSnapshot>,
    control: RunControl,
}

/// The session state container.
///
/// Mutations are synchronous and hold a short lock; nothing here performs
/// I/O, and selecting something never fetches or deletes by itself.
pub struct Session {
    catalog: Vec<Category>,
    confirmation_phrase: String,
    inner: Mutex<Inner>,
    tx: watch::Sender<Arc<SessionSnapshot>>,
}

impl Session {
    pub fn new(catalog: Vec<Category>, confirmation_phrase: impl Into<String>) -> Self {
        let snapshot = Arc::new(SessionSnapshot {
            categories: Arc::new(initial_categories(&catalog)),
            ..Default::default()
        });
        let (tx, _rx) = watch::channel(Arc::clone(&snapshot));
        Self {
            catalog,
            confirmation_phrase: confirmation_phrase.into(),
            inner: Mutex::new(Inner {
                snapshot,
                control: RunControl::new(),
            }),
            tx,
        }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.tx.subscribe()
    }

    /// Control handle for the current run.
    pub fn control(&self) -> RunControl {
        self.lock().control.clone()
    }

    pub fn confirmation_phrase(&self) -> &str {
        &self.confirmation_phrase
    }

    pub fn catalog(&self) -> &[Category] {
        &self.catalog
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &mut Inner, next: SessionSnapshot) {
        let next = Arc::new(next);
        inner.snapshot = Arc::clone(&next);
        self.tx.send_replace(next);
    }

    /// Applies `f` to a copy of the current snapshot. The copy is published
    /// only when `f` returns true; otherwise it is dropped and observers are
    /// not woken.
    fn update(&self, f: impl FnOnce(&mut SessionSnapshot, &RunControl) -> bool) {
        let mut inner = self.lock();
        let mut next = SessionSnapshot::clone(&inner.snapshot);
        if f(&mut next, &inner.control) {
            self.publish(&mut inner, next);
        }
    }

    /// Fallible [`Session::update`]. `f` returns its result and whether it
    /// changed anything; an error publishes nothing.
    fn try_update<R>(
        &self,
        f: impl FnOnce(&mut SessionSnapshot, &RunControl) -> Result<(R, bool), NukeError>,
    ) -> Result<R, NukeError> {
        let mut inner = self.lock();
        let mut next = SessionSnapshot::clone(&inner.snapshot);
        let (out, changed) = f(&mut next, &inner.control)?;
        if changed {
            self.publish(&mut inner, next);
        }
        Ok(out)
    }

    /// Runs `f` on one category of a copy. Other categories keep their
    /// identity, and so does this one when `f` reports no change.
    fn update_category<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut CategoryRunState) -> (R, bool),
    ) -> Result<R, NukeError> {
        self.try_update(|snap, _| category_mut(snap, id).map(f))
    }

    /// [`Session::update_category`] for edits a running deletion must not
    /// see: refused while the phase is locked.
    fn edit_category<R>(
        &self,
        action: &'static str,
        id: &str,
        f: impl FnOnce(&mut CategoryRunState) -> (R, bool),
    ) -> Result<R, NukeError> {
        self.try_update(|snap, _| {
            ensure_unlocked(snap.phase, action)?;
            category_mut(snap, id).map(f)
        })
    }

    pub fn set_user(&self, user: Option<UserInfo>) {
        self.update(|snap, _| {
            snap.user = user.map(Arc::new);
            true
        });
    }

    /// Flips a category's selection; returns the new state. Categories that
    /// need application permissions stay unselected.
    pub fn toggle_category(&self, id: &str) -> Result<bool, NukeError> {
        self.edit_category("change the selection", id, |c| {
            if !c.category.is_selectable() {
                return (c.selected, false);
            }
            c.selected = !c.selected;
            (c.selected, true)
        })
    }

    pub fn set_category_selected(&self, id: &str, selected: bool) -> Result<bool, NukeError> {
        self.edit_category("change the selection", id, |c| {
            let wanted = selected && c.category.is_selectable();
            let changed = c.selected != wanted;
            c.selected = wanted;
            (wanted, changed)
        })
    }

    pub fn select_all_categories(&self) -> Result<(), NukeError> {
        self.set_all_categories(true)
    }

    pub fn deselect_all_categories(&self) -> Result<(), NukeError> {
        self.set_all_categories(false)
    }

    fn set_all_categories(&self, selected: bool) -> Result<(), NukeError> {
        self.try_update(|snap, _| {
            ensure_unlocked(snap.phase, "change the selection")?;
            let wanted = |c: &CategoryRunState| selected && c.category.is_selectable();
            if snap.categories.iter().all(|c| c.selected == wanted(&**c)) {
                return Ok(((), false));
            }
            for entry in Arc::make_mut(&mut snap.categories).iter_mut() {
                let wanted = wanted(&**entry);
                if entry.selected != wanted {
                    Arc::make_mut(entry).selected = wanted;
                }
            }
            Ok(((), true))
        })
    }

    pub fn set_category_loading(&self, id: &str, loading: bool) -> Result<(), NukeError> {
        self.edit_category("load objects", id, |c| {
            let changed = c.is_loading != loading || (loading && c.error.is_some());
            c.is_loading = loading;
            if loading {
                c.error = None;
            }
            ((), changed)
        })
    }

    /// Stores a fetch result; every object starts out selected.
    pub fn set_category_objects(
        &self,
        id: &str,
        objects: Vec<ManagedObject>,
    ) -> Result<(), NukeError> {
        let objects: Vec<_> = objects
            .into_iter()
            .map(|mut o| {
                o.selected = true;
                o
            })
            .collect();
        self.edit_category("load objects", id, |c| {
            c.objects = Arc::new(objects);
            c.loaded = true;
            c.is_loading = false;
            c.error = None;
            ((), true)
        })
    }

    pub fn set_category_error(&self, id: &str, error: impl Into<String>) -> Result<(), NukeError> {
        let error = error.into();
        self.edit_category("load objects", id, |c| {
            c.error = Some(error);
            c.is_loading = false;
            ((), true)
        })
    }

    /// Flips one object's selection and returns the new state; `false` when
    /// the category has no such object.
    pub fn toggle_object_selection(
        &self,
        category_id: &str,
        object_id: &str,
    ) -> Result<bool, NukeError> {
        self.edit_category("change the selection", category_id, |c| {
            let Some(index) = c.objects.iter().position(|o| o.id == object_id) else {
                return (false, false);
            };
            let object = &mut Arc::make_mut(&mut c.objects)[index];
            object.selected = !object.selected;
            (object.selected, true)
        })
    }

    pub fn select_all_objects(&self, category_id: &str) -> Result<(), NukeError> {
        self.set_all_objects(category_id, true)
    }

    pub fn deselect_all_objects(&self, category_id: &str) -> Result<(), NukeError> {
        self.set_all_objects(category_id, false)
    }

    fn set_all_objects(&self, category_id: &str, selected: bool) -> Result<(), NukeError> {
        self.edit_category("change the selection", category_id, |c| {
            if c.objects.iter().all(|o| o.selected == selected) {
                return ((), false);
            }
            for object in Arc::make_mut(&mut c.objects).iter_mut() {
                object.selected = selected;
            }
            ((), true)
        })
    }

    pub fn open_preview(&self) -> Result<(), NukeError> {
        self.try_update(|snap, _| {
            ensure_unlocked(snap.phase, "open the preview")?;
            let changed = !snap.preview_open || snap.phase != DeletionPhase::Preview;
            snap.preview_open = true;
            snap.phase = DeletionPhase::Preview;
            Ok(((), changed))
        })
    }

    pub fn close_preview(&self) -> Result<(), NukeError> {
        self.try_update(|snap, _| {
            ensure_unlocked(snap.phase, "close the preview")?;
            let changed = snap.preview_open || snap.phase != DeletionPhase::Idle;
            snap.preview_open = false;
            snap.phase = DeletionPhase::Idle;
            Ok(((), changed))
        })
    }

    /// Moves `preview -> confirming` when `typed` matches the confirmation
    /// phrase, ignoring case. Anything else leaves the state untouched.
    pub fn begin_confirmation(&self, typed: &str) -> Result<(), NukeError> {
        self.try_update(|snap, _| {
            if snap.phase != DeletionPhase::Preview {
                return Err(NukeError::InvalidPhase {
                    action: "confirm a deletion",
                    phase: snap.phase,
                });
            }
            if !typed.eq_ignore_ascii_case(&self.confirmation_phrase) {
                return Err(NukeError::ConfirmationRejected {
                    expected: self.confirmation_phrase.clone(),
                });
            }
            snap.phase = DeletionPhase::Confirming;
            Ok(((), true))
        })?;
        info!("deletion confirmed");
        Ok(())
    }

    pub fn pause(&self) -> Result<(), NukeError> {
        self.try_update(|snap, control| {
            if !matches!(snap.phase, DeletionPhase::Confirming | DeletionPhase::Deleting) {
                return Err(NukeError::InvalidPhase {
                    action: "pause",
                    phase: snap.phase,
                });
            }
            control.pause();
            let paused = control.is_paused();
            let changed = snap.is_paused != paused;
            snap.is_paused = paused;
            Ok(((), changed))
        })?;
        info!("deletion paused");
        Ok(())
    }

    pub fn resume(&self) {
        self.update(|snap, control| {
            control.resume();
            let changed = snap.is_paused;
            snap.is_paused = false;
            changed
        });
        info!("deletion resumed");
    }

    /// Cancels the current run. Stays in effect until [`Session::reset`].
    pub fn cancel(&self) {
        self.update(|snap, control| {
            control.cancel();
            let changed = !snap.should_cancel || snap.is_paused;
            snap.should_cancel = true;
            snap.is_paused = false;
            changed
        });
        info!("deletion cancelled");
    }

    /// Back to a fresh session: catalog categories unselected and unfetched,
    /// empty log, new run control. The signed-in user is kept.
    pub fn reset(&self) -> Result<(), NukeError> {
        let mut inner = self.lock();
        let phase = inner.snapshot.phase;
        if matches!(phase, DeletionPhase::Confirming | DeletionPhase::Deleting) {
            return Err(NukeError::InvalidPhase {
                action: "reset",
                phase,
            });
        }
        let fresh = SessionSnapshot {
            categories: Arc::new(initial_categories(&self.catalog)),
            user: inner.snapshot.user.clone(),
            ..Default::default()
        };
        inner.control = RunControl::new();
        self.publish(&mut inner, fresh);
        debug!("session reset");
        Ok(())
    }
}

fn ensure_unlocked(phase: DeletionPhase, action: &'static str) -> Result<(), NukeError> {
    if phase.is_locked() {
        return Err(NukeError::InvalidPhase { action, phase });
    }
    Ok(())
}

/// The named category of `snap`, copied out of any sharing.
fn category_mut<'a>(
    snap: &'a mut SessionSnapshot,
    id: &str,
) -> Result<&'a mut CategoryRunState, NukeError> {
    let index = snap
        .categories
        .iter()
        .position(|c| c.id() == id)
        .ok_or_else(|| NukeError::UnknownCategory(id.to_string()))?;
    Ok(Arc::make_mut(&mut Arc::make_mut(&mut snap.categories)[index]))
}

fn initial_categories(catalog: &[Category]) -> Vec<Arc<CategoryRunState>> {
    catalog
        .iter()
        .cloned()
        .map(|c| Arc::new(CategoryRunState::new(c)))
        .collect()
}

impl RunState for Session {
    fn set_phase(&self, phase: DeletionPhase) {
        debug!(%phase, "phase change");
        self.update(|snap, _| {
            let changed = snap.phase != phase;
            snap.phase = phase;
            changed
        });
    }

    fn clear_log(&self) {
        self.update(|snap, _| {
            if snap.log.is_empty() {
                return false;
            }
            snap.log = Arc::new(Vec::new());
            true
        });
    }

    fn run_plan(&self) -> Vec<CategoryPlan> {
        self.snapshot()
            .selected_categories()
            .map(|c| CategoryPlan {
                category: c.category.clone(),
                objects: c.selected_objects().cloned().collect(),
            })
            .collect()
    }

    fn begin_category(&self, category_id: &str, total: usize) {
        if let Err(e) = self.update_category(category_id, |c| {
            c.reset_run(total);
            ((), true)
        }) {
            warn!(category = %category_id, error = %e, "cannot start category");
        }
    }

    fn record(&self, entry: DeletionLogEntry) {
        self.update(|snap, _| {
            let index = snap
                .categories
                .iter()
                .position(|c| c.id() == entry.category_id);
            if let Some(index) = index {
                let state = Arc::make_mut(&mut Arc::make_mut(&mut snap.categories)[index]);
                match entry.status {
                    DeletionStatus::Success => state.deleted_count += 1,
                    DeletionStatus::Error => state.failed_count += 1,
                    DeletionStatus::Skipped => state.skipped_count += 1,
                }
                state.recompute_progress();
            }
            Arc::make_mut(&mut snap.log).push(Arc::new(entry));
            true
        });
    }
}
