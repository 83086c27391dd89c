// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The paginated list/delete service the engine operates on.

use async_trait::async_trait;

use crate::error::NukeError;
use crate::types::{Category, ObjectPage};

/// Remote object-management API.
#[async_trait]
pub trait ObjectApi: Send + Sync {
    /// Fetches one page of a category's objects.
    ///
    /// `next_link` is `None` for the first page and afterwards the opaque
    /// continuation returned by the previous page.
    async fn list_page(
        &self,
        category: &Category,
        next_link: Option<&str>,
    ) -> Result<ObjectPage, NukeError>;

    /// Deletes a single object of the given category.
    async fn delete_object(&self, category: &Category, object_id: &str) -> Result<(), NukeError>;
}
