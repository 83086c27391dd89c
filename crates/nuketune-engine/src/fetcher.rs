// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Materializes every page of a category.

use nuketune_core::{Category, ManagedObject, NukeError, ObjectApi};
use tracing::debug;

/// Fetches all objects of `category`, following continuation links until
/// none is returned, and tags each object with the category.
///
/// Read-only: no filtering, no deletion. Errors propagate unchanged; the
/// caller records them on the category.
pub async fn fetch_category_objects(
    api: &dyn ObjectApi,
    category: &Category,
) -> Result<Vec<ManagedObject>, NukeError> {
    let mut objects = Vec::new();
    let mut next_link: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api.list_page(category, next_link.as_deref()).await?;
        pages += 1;
        debug!(
            category = %category.id,
            page = pages,
            count = page.value.len(),
            "fetched page"
        );

        objects.extend(page.value.into_iter().map(|mut object| {
            object.tag(category);
            object
        }));

        match page.next_link {
            Some(link) => next_link = Some(link),
            None => break,
        }
    }

    Ok(objects)
}
