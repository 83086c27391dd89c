// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Microsoft Graph REST API.
//!
//! Only the fields NukeTune reads are modelled; list items keep everything
//! else in [`ManagedObject::extra`].

use nuketune_core::{ManagedObject, ObjectPage, UserInfo};
use serde::Deserialize;

/// A page of an OData collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub value: Vec<ManagedObject>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

impl From<ListResponse> for ObjectPage {
    fn from(response: ListResponse) -> Self {
        ObjectPage {
            value: response.value,
            next_link: response.next_link.filter(|link| !link.is_empty()),
        }
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub inner_error: Option<InnerError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InnerError {
    #[serde(rename = "request-id", default)]
    pub request_id: Option<String>,
}

/// `GET /me`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

/// One entry of `GET /organization`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationList {
    #[serde(default)]
    pub value: Vec<Organization>,
}

/// Combines the signed-in user with the first organization returned.
pub fn user_info(me: MeResponse, organizations: OrganizationList) -> UserInfo {
    let org = organizations.value.into_iter().next();
    UserInfo {
        display_name: me.display_name,
        user_principal_name: me.user_principal_name,
        tenant_id: org.as_ref().map(|o| o.id.clone()),
        tenant_name: org.and_then(|o| o.display_name),
    }
}
