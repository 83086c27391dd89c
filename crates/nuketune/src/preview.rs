// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nuketune preview` command implementation.
//!
//! Selects categories, fetches them and prints what a deletion would touch.
//! Shared with `delete`, which shows the same preview before asking for
//! confirmation.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::sync::Arc;

use nuketune_config::NukeTuneConfig;
use nuketune_core::NukeError;
use nuketune_engine::protect::{self, Deletability};
use nuketune_engine::{NukeEngine, Session, SessionSnapshot};
use nuketune_graph::GraphClient;

use crate::Selection;

/// Run the `nuketune preview` command.
pub async fn run_preview(config: &NukeTuneConfig, selection: &Selection) -> Result<(), NukeError> {
    let engine = build_engine(config)?;
    load_selection(&engine, selection).await?;
    let use_color = std::io::stdout().is_terminal();
    print!("{}", render_preview(&engine.session().snapshot(), use_color));
    Ok(())
}

/// An engine talking to Graph with the configured credentials.
pub fn build_engine(config: &NukeTuneConfig) -> Result<NukeEngine, NukeError> {
    let client = GraphClient::from_config(config)?;
    Ok(NukeEngine::new(Arc::new(client), config))
}

/// Applies the command-line selection to the session.
pub fn apply_selection(session: &Session, selection: &Selection) -> Result<(), NukeError> {
    if selection.all {
        return session.select_all_categories();
    }
    if selection.categories.is_empty() {
        return Err(NukeError::Config(
            "no categories selected; pass -c <ID> (see `nuketune categories`) or --all".into(),
        ));
    }
    for id in &selection.categories {
        if !session.set_category_selected(id, true)? {
            return Err(NukeError::Config(format!(
                "category `{id}` requires application permissions and cannot be selected"
            )));
        }
    }
    Ok(())
}

/// Selects and fetches. Fetch failures stay on their category and are
/// shown in the preview; they do not fail the command.
pub async fn load_selection(engine: &NukeEngine, selection: &Selection) -> Result<(), NukeError> {
    apply_selection(engine.session(), selection)?;
    for (_, result) in engine.load_selected_categories().await {
        if let Err(e @ NukeError::InteractionRequired(_)) = result {
            return Err(e);
        }
    }
    Ok(())
}

/// Human-readable preview of the selected categories.
pub fn render_preview(snapshot: &SessionSnapshot, use_color: bool) -> String {
    use colored::Colorize;

    let mut out = String::new();
    let mut protected_total = 0;
    for state in snapshot.selected_categories() {
        let category = &state.category;
        let _ = writeln!(out);
        if let Some(error) = &state.error {
            let line = format!("{} ({}): failed to load: {error}", category.name, category.id);
            let _ = writeln!(out, "{}", if use_color { line.red().to_string() } else { line });
            continue;
        }
        let _ = writeln!(
            out,
            "{} ({}): {} object(s)",
            category.name,
            category.id,
            state.selected_object_count()
        );
        for object in state.selected_objects() {
            let label = object.label_for(category);
            match protect::is_deletable(object, category) {
                Deletability::Deletable => {
                    let _ = writeln!(out, "  - {label} [{}]", object.id);
                }
                Deletability::Protected(reason) => {
                    protected_total += 1;
                    let note = format!("(skipped: {reason})");
                    let note = if use_color { note.yellow().to_string() } else { note };
                    let _ = writeln!(out, "  - {label} [{}] {note}", object.id);
                }
            }
        }
    }

    let total = snapshot.total_object_count();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{total} object(s) selected, {protected_total} protected, {} to delete",
        total - protected_total
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuketune_core::{Category, ManagedObject};

    fn session() -> Session {
        Session::new(
            vec![
                Category::new("scopeTags", "Scope tags", "/deviceManagement/roleScopeTags")
                    .cannot_delete(&["Default"]),
                Category::new("apps", "Apps", "/deviceAppManagement/mobileApps"),
                Category::new("pcs", "Cloud PCs", "/pcs").requires_app_permissions(),
            ],
            "DELETE",
        )
    }

    #[test]
    fn explicit_selection() {
        let session = session();
        let selection = Selection {
            categories: vec!["apps".into()],
            all: false,
        };
        apply_selection(&session, &selection).unwrap();
        let snap = session.snapshot();
        let ids: Vec<_> = snap.selected_categories().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, vec!["apps"]);
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(matches!(
            apply_selection(&session(), &Selection::default()),
            Err(NukeError::Config(_))
        ));
    }

    #[test]
    fn unselectable_and_unknown_categories_are_rejected() {
        let session = session();
        let pcs = Selection {
            categories: vec!["pcs".into()],
            all: false,
        };
        assert!(matches!(apply_selection(&session, &pcs), Err(NukeError::Config(_))));
        let unknown = Selection {
            categories: vec!["nope".into()],
            all: false,
        };
        assert!(matches!(
            apply_selection(&session, &unknown),
            Err(NukeError::UnknownCategory(_))
        ));
    }

    #[test]
    fn preview_marks_protected_objects_and_errors() {
        let session = session();
        session.select_all_categories().unwrap();
        session
            .set_category_objects(
                "scopeTags",
                vec![
                    ManagedObject::new("0").with_display_name("Default"),
                    ManagedObject::new("1").with_display_name("Berlin"),
                ],
            )
            .unwrap();
        session.set_category_error("apps", "Forbidden (403): denied").unwrap();

        let text = render_preview(&session.snapshot(), false);
        assert!(text.contains("Scope tags (scopeTags): 2 object(s)"));
        assert!(text.contains("  - Default [0] (skipped: Protected object (built-in or system managed))"));
        assert!(text.contains("  - Berlin [1]\n"));
        assert!(text.contains("Apps (apps): failed to load: Forbidden (403): denied"));
        assert!(text.contains("2 object(s) selected, 1 protected, 1 to delete"));
    }
}
