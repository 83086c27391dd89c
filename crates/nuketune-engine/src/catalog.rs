// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in catalog of Intune object categories.
//!
//! Order here is the order categories are shown and processed in.

use nuketune_core::{ApiVersion, Category, DangerLevel};

/// Every category NukeTune knows how to enumerate and delete.
pub fn intune_categories() -> Vec<Category> {
    vec![
        Category::new(
            "managedDevices",
            "Managed devices",
            "/deviceManagement/managedDevices",
        )
        .describe("Enrolled devices. Deleting removes the device record from Intune.")
        .danger(DangerLevel::Critical)
        .name_fields(&["deviceName", "displayName"])
        .builtin_flag(None),
        Category::new(
            "deviceConfigurations",
            "Configuration profiles",
            "/deviceManagement/deviceConfigurations",
        )
        .describe("Template-based device configuration profiles.")
        .danger(DangerLevel::High),
        Category::new(
            "configurationPolicies",
            "Settings catalog",
            "/deviceManagement/configurationPolicies",
        )
        .describe("Settings catalog and endpoint security policies.")
        .danger(DangerLevel::High)
        .name_fields(&["name", "displayName"]),
        Category::new(
            "deviceCompliancePolicies",
            "Compliance policies",
            "/deviceManagement/deviceCompliancePolicies",
        )
        .describe("Device compliance policies.")
        .danger(DangerLevel::High),
        Category::new("mobileApps", "Applications", "/deviceAppManagement/mobileApps")
            .describe("Line-of-business and store apps added to the tenant.")
            .danger(DangerLevel::High)
            .filter("(microsoft.graph.managedApp/appAvailability eq null or microsoft.graph.managedApp/appAvailability eq 'lineOfBusiness' or isAssigned eq true)"),
        Category::new(
            "managedAppPolicies",
            "App protection policies",
            "/deviceAppManagement/managedAppPolicies",
        )
        .describe("MAM app protection policies.")
        .danger(DangerLevel::High),
        Category::new(
            "mobileAppConfigurations",
            "App configuration policies",
            "/deviceAppManagement/mobileAppConfigurations",
        )
        .describe("Managed device app configuration policies.")
        .danger(DangerLevel::Medium),
        Category::new(
            "deviceManagementScripts",
            "PowerShell scripts",
            "/deviceManagement/deviceManagementScripts",
        )
        .describe("Platform scripts deployed to Windows devices.")
        .danger(DangerLevel::Medium),
        Category::new(
            "deviceHealthScripts",
            "Remediations",
            "/deviceManagement/deviceHealthScripts",
        )
        .describe("Detection and remediation script packages.")
        .danger(DangerLevel::Medium)
        .builtin_flag(Some("isGlobalScript")),
        Category::new(
            "deviceEnrollmentConfigurations",
            "Enrollment restrictions",
            "/deviceManagement/deviceEnrollmentConfigurations",
        )
        .describe("Enrollment restrictions, limits and status pages.")
        .danger(DangerLevel::High)
        .cannot_delete(&["Default", "All users and all devices"]),
        Category::new(
            "windowsAutopilotDeploymentProfiles",
            "Autopilot profiles",
            "/deviceManagement/windowsAutopilotDeploymentProfiles",
        )
        .describe("Windows Autopilot deployment profiles.")
        .danger(DangerLevel::High),
        Category::new(
            "windowsAutopilotDeviceIdentities",
            "Autopilot devices",
            "/deviceManagement/windowsAutopilotDeviceIdentities",
        )
        .describe("Hardware hashes registered with Windows Autopilot.")
        .danger(DangerLevel::Critical)
        .name_fields(&["serialNumber", "displayName"])
        .builtin_flag(None),
        Category::new(
            "conditionalAccessPolicies",
            "Conditional Access policies",
            "/identity/conditionalAccess/policies",
        )
        .describe("Entra ID Conditional Access policies.")
        .danger(DangerLevel::Critical)
        .api_version(ApiVersion::V1)
        .builtin_flag(None),
        Category::new(
            "roleDefinitions",
            "Intune roles",
            "/deviceManagement/roleDefinitions",
        )
        .describe("Custom Intune RBAC role definitions.")
        .danger(DangerLevel::High),
        Category::new("roleScopeTags", "Scope tags", "/deviceManagement/roleScopeTags")
            .describe("RBAC scope tags.")
            .danger(DangerLevel::Medium)
            .cannot_delete(&["Default"]),
        Category::new(
            "assignmentFilters",
            "Assignment filters",
            "/deviceManagement/assignmentFilters",
        )
        .describe("Device and app assignment filters.")
        .danger(DangerLevel::Medium)
        .builtin_flag(None),
        Category::new(
            "notificationMessageTemplates",
            "Notification templates",
            "/deviceManagement/notificationMessageTemplates",
        )
        .describe("Compliance notification message templates.")
        .danger(DangerLevel::Low),
        Category::new(
            "termsAndConditions",
            "Terms and conditions",
            "/deviceManagement/termsAndConditions",
        )
        .describe("Company portal terms and conditions.")
        .danger(DangerLevel::Low),
        Category::new(
            "groupPolicyConfigurations",
            "Administrative templates",
            "/deviceManagement/groupPolicyConfigurations",
        )
        .describe("ADMX-backed administrative template profiles.")
        .danger(DangerLevel::Medium),
        Category::new(
            "windowsFeatureUpdateProfiles",
            "Feature update profiles",
            "/deviceManagement/windowsFeatureUpdateProfiles",
        )
        .describe("Windows feature update deployment profiles.")
        .danger(DangerLevel::Medium),
        Category::new("cloudPCs", "Cloud PCs", "/deviceManagement/virtualEndpoint/cloudPCs")
            .describe("Windows 365 Cloud PCs. Requires application permissions.")
            .danger(DangerLevel::Critical)
            .builtin_flag(None)
            .requires_app_permissions(),
    ]
}

/// Looks up a catalog entry by id.
pub fn find_category(id: &str) -> Option<Category> {
    intune_categories().into_iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let categories = intune_categories();
        let ids: HashSet<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), categories.len());
    }

    #[test]
    fn endpoints_are_rooted() {
        for category in intune_categories() {
            assert!(category.list_endpoint.starts_with('/'), "{}", category.id);
            assert!(category.delete_endpoint.starts_with('/'), "{}", category.id);
        }
    }

    #[test]
    fn only_cloud_pcs_need_app_permissions() {
        let blocked: Vec<_> = intune_categories()
            .into_iter()
            .filter(|c| !c.is_selectable())
            .map(|c| c.id)
            .collect();
        assert_eq!(blocked, vec!["cloudPCs".to_string()]);
    }

    #[test]
    fn find_category_by_id() {
        let ca = find_category("conditionalAccessPolicies").unwrap();
        assert_eq!(ca.api_version, ApiVersion::V1);
        assert!(find_category("nope").is_none());
    }
}
