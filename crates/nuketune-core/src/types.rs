// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the fetcher, orchestrator, session and front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::ApiError;

/// How destructive deleting a category's objects is.
///
/// Presentation only; nothing in the engine gates on it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Which Graph API version a category's endpoints live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[strum(serialize = "v1.0")]
    #[serde(rename = "v1.0")]
    V1,
    #[strum(serialize = "beta")]
    Beta,
}

/// National cloud the tenant lives in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CloudEnvironment {
    #[default]
    Global,
    UsGov,
    UsGovDod,
    Germany,
    China,
}

impl CloudEnvironment {
    pub const ALL: [CloudEnvironment; 5] = [
        CloudEnvironment::Global,
        CloudEnvironment::UsGov,
        CloudEnvironment::UsGovDod,
        CloudEnvironment::Germany,
        CloudEnvironment::China,
    ];

    /// Login authority host for this cloud.
    pub fn authority(&self) -> &'static str {
        match self {
            CloudEnvironment::Global => "https://login.microsoftonline.com",
            CloudEnvironment::UsGov | CloudEnvironment::UsGovDod => {
                "https://login.microsoftonline.us"
            }
            CloudEnvironment::Germany => "https://login.microsoftonline.de",
            CloudEnvironment::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Graph API host for this cloud.
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            CloudEnvironment::Global => "https://graph.microsoft.com",
            CloudEnvironment::UsGov => "https://graph.microsoft.us",
            CloudEnvironment::UsGovDod => "https://dod-graph.microsoft.us",
            CloudEnvironment::Germany => "https://graph.microsoft.de",
            CloudEnvironment::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }

    /// Authority URL scoped to a tenant, `common` when none is given.
    pub fn authority_url(&self, tenant_id: Option<&str>) -> String {
        format!("{}/{}", self.authority(), tenant_id.unwrap_or("common"))
    }
}

/// Static description of one class of remotely managed objects.
///
/// Built once from the catalog and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub danger_level: DangerLevel,
    pub list_endpoint: String,
    pub delete_endpoint: String,
    pub api_version: ApiVersion,
    /// OData `$filter` applied to the first list request.
    pub filter: Option<String>,
    /// Objects whose name contains any of these are never deleted.
    pub cannot_delete: Vec<String>,
    /// Boolean field that marks an object as built in.
    pub builtin_flag: Option<String>,
    /// Fields tried in order to derive an object's display name.
    pub name_fields: Vec<String>,
    /// Needs application-only permissions this tool does not request.
    pub requires_app_permissions: bool,
}

impl Category {
    /// Creates a category whose list and delete endpoints are the same path.
    pub fn new(id: impl Into<String>, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            danger_level: DangerLevel::Medium,
            list_endpoint: endpoint.clone(),
            delete_endpoint: endpoint,
            api_version: ApiVersion::Beta,
            filter: None,
            cannot_delete: Vec::new(),
            builtin_flag: Some("isBuiltIn".to_string()),
            name_fields: vec!["displayName".to_string(), "name".to_string()],
            requires_app_permissions: false,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn danger(mut self, level: DangerLevel) -> Self {
        self.danger_level = level;
        self
    }

    pub fn delete_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.delete_endpoint = endpoint.into();
        self
    }

    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn cannot_delete(mut self, patterns: &[&str]) -> Self {
        self.cannot_delete = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn builtin_flag(mut self, field: Option<&str>) -> Self {
        self.builtin_flag = field.map(str::to_string);
        self
    }

    pub fn name_fields(mut self, fields: &[&str]) -> Self {
        self.name_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn requires_app_permissions(mut self) -> Self {
        self.requires_app_permissions = true;
        self
    }

    /// Categories needing application permissions can never be selected.
    pub fn is_selectable(&self) -> bool {
        !self.requires_app_permissions
    }

    /// Path of a single object under the delete endpoint.
    pub fn object_path(&self, object_id: &str) -> String {
        format!("{}/{}", self.delete_endpoint.trim_end_matches('/'), object_id)
    }
}

fn selected_by_default() -> bool {
    true
}

/// A remotely owned record, cached locally for one session.
///
/// Known fields are typed; everything else the remote schema returns lands
/// in `extra`. `selected` and the category tag are local only and never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedObject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "@odata.type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub odata_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip, default = "selected_by_default")]
    pub selected: bool,
    #[serde(skip)]
    pub category_id: Option<String>,
    #[serde(skip)]
    pub category_name: Option<String>,
}

impl ManagedObject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            name: None,
            odata_type: None,
            extra: Map::new(),
            selected: true,
            category_id: None,
            category_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Looks up a string field by its wire name, typed fields included.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        match field {
            "id" => Some(self.id.as_str()),
            "displayName" => self.display_name.as_deref(),
            "name" => self.name.as_deref(),
            "@odata.type" => self.odata_type.as_deref(),
            other => self.extra.get(other).and_then(Value::as_str),
        }
    }

    /// True only when the field is present and literally `true`.
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.extra.get(field), Some(Value::Bool(true)))
    }

    /// First non-empty name according to the category's name-field table.
    pub fn display_name_for(&self, category: &Category) -> Option<&str> {
        category
            .name_fields
            .iter()
            .filter_map(|field| self.field_str(field))
            .find(|value| !value.is_empty())
    }

    /// Name used in logs and tables, falling back to the id.
    pub fn label_for(&self, category: &Category) -> String {
        self.display_name_for(category)
            .unwrap_or(self.id.as_str())
            .to_string()
    }

    /// Records which category this object was fetched from.
    pub fn tag(&mut self, category: &Category) {
        self.category_id = Some(category.id.clone());
        self.category_name = Some(category.name.clone());
    }
}

/// One page of a list call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPage {
    pub value: Vec<ManagedObject>,
    pub next_link: Option<String>,
}

/// Terminal outcome of one object within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeletionStatus {
    Success,
    Error,
    Skipped,
}

/// Immutable record of one object's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub category_id: String,
    pub category_name: String,
    pub object_id: String,
    pub object_name: String,
    pub status: DeletionStatus,
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl DeletionLogEntry {
    fn base(category: &Category, object: &ManagedObject, status: DeletionStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            object_id: object.id.clone(),
            object_name: object.label_for(category),
            status,
            message: None,
            error: None,
        }
    }

    pub fn success(category: &Category, object: &ManagedObject) -> Self {
        Self::base(category, object, DeletionStatus::Success)
    }

    pub fn skipped(category: &Category, object: &ManagedObject, reason: impl Into<String>) -> Self {
        let mut entry = Self::base(category, object, DeletionStatus::Skipped);
        entry.message = Some(reason.into());
        entry
    }

    pub fn failed(category: &Category, object: &ManagedObject, error: ApiError) -> Self {
        let mut entry = Self::base(category, object, DeletionStatus::Error);
        entry.message = Some(error.message.clone());
        entry.error = Some(error);
        entry
    }
}

/// Process-wide phase of the deletion workflow.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeletionPhase {
    #[default]
    Idle,
    Preview,
    Confirming,
    Deleting,
    Complete,
}

impl DeletionPhase {
    /// A run has been confirmed and has not been reset yet.
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            DeletionPhase::Confirming | DeletionPhase::Deleting | DeletionPhase::Complete
        )
    }
}

/// The signed-in user and tenant, as far as the front end knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policies() -> Category {
        Category::new("policies", "Policies", "/deviceManagement/policies")
    }

    #[test]
    fn managed_object_keeps_unknown_fields() {
        let json = serde_json::json!({
            "id": "abc",
            "displayName": "Baseline",
            "@odata.type": "#microsoft.graph.windows10GeneralConfiguration",
            "isBuiltIn": false,
            "version": 3
        });
        let object: ManagedObject = serde_json::from_value(json).unwrap();
        assert_eq!(object.id, "abc");
        assert_eq!(object.display_name.as_deref(), Some("Baseline"));
        assert_eq!(
            object.odata_type.as_deref(),
            Some("#microsoft.graph.windows10GeneralConfiguration")
        );
        assert_eq!(object.extra.get("version"), Some(&Value::from(3)));
        assert!(!object.flag("isBuiltIn"));
        assert!(object.selected);
        assert!(object.category_id.is_none());
    }

    #[test]
    fn serialization_drops_local_fields() {
        let mut object = ManagedObject::new("1").with_display_name("x");
        object.tag(&policies());
        object.selected = false;
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json, serde_json::json!({"id": "1", "displayName": "x"}));
    }

    #[test]
    fn display_name_follows_category_table() {
        let devices = Category::new("devices", "Devices", "/deviceManagement/managedDevices")
            .name_fields(&["deviceName", "displayName"]);
        let object = ManagedObject::new("d1")
            .with_display_name("ignored")
            .with_field("deviceName", "LAPTOP-01");
        assert_eq!(object.display_name_for(&devices), Some("LAPTOP-01"));
        assert_eq!(object.display_name_for(&policies()), Some("ignored"));
    }

    #[test]
    fn label_falls_back_to_id() {
        let object = ManagedObject::new("only-id").with_display_name("");
        assert_eq!(object.label_for(&policies()), "only-id");
    }

    #[test]
    fn object_path_joins_endpoint_and_id() {
        let category = policies().delete_endpoint("/deviceManagement/policies/");
        assert_eq!(category.object_path("42"), "/deviceManagement/policies/42");
    }

    #[test]
    fn cloud_environment_round_trips() {
        use std::str::FromStr;
        for env in CloudEnvironment::ALL {
            let parsed = CloudEnvironment::from_str(&env.to_string()).unwrap();
            assert_eq!(parsed, env);
        }
        assert_eq!(
            CloudEnvironment::UsGovDod.authority_url(Some("tenant")),
            "https://login.microsoftonline.us/tenant"
        );
        assert_eq!(
            CloudEnvironment::Global.authority_url(None),
            "https://login.microsoftonline.com/common"
        );
    }

    #[test]
    fn danger_levels_are_ordered() {
        assert!(DangerLevel::Low < DangerLevel::Medium);
        assert!(DangerLevel::High < DangerLevel::Critical);
    }

    #[test]
    fn failed_entry_carries_classified_message() {
        let category = policies();
        let object = ManagedObject::new("1").with_display_name("Policy");
        let entry =
            DeletionLogEntry::failed(&category, &object, ApiError::new(404, "NotFound", "gone"));
        assert_eq!(entry.status, DeletionStatus::Error);
        assert_eq!(entry.message.as_deref(), Some("gone"));
        assert_eq!(entry.error.as_ref().map(|e| e.status_code), Some(404));
        assert_eq!(entry.object_name, "Policy");
    }
}
