// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rules deciding which objects must never be deleted.
//!
//! Pure functions of `(object, category)`; evaluated before any network
//! call so protected objects never reach the delete endpoint.

use nuketune_core::{Category, ManagedObject};

/// Names of system-managed objects, matched case-insensitively against the
/// whole name.
pub const PROTECTED_NAMES: &[&str] = &[
    "All users and all devices",
    "All Users",
    "All Devices",
    "Default",
    "Default Device Limit Restriction",
    "Default Device Type Restriction",
    "Default Enrollment Status Page",
    "Default Windows Hello for Business",
    "Windows Hello for Business",
    "Built-in",
    "Microsoft Intune Default",
];

/// Why an object was excluded from deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Name is on the system-managed list.
    ProtectedName,
    /// Name contains one of the category's undeletable patterns.
    CategoryDefault,
    /// The category's built-in flag is set on the object.
    BuiltIn,
}

impl SkipReason {
    /// Message recorded on the `skipped` log entry.
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::ProtectedName => "Protected object (built-in or system managed)",
            SkipReason::CategoryDefault => "Cannot be deleted (system default)",
            SkipReason::BuiltIn => "Built-in object",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletability {
    Deletable,
    Protected(SkipReason),
}

impl Deletability {
    pub fn is_deletable(&self) -> bool {
        matches!(self, Deletability::Deletable)
    }
}

/// True when `name` is on the system-managed list.
pub fn is_protected_name(name: &str) -> bool {
    let name = name.trim();
    PROTECTED_NAMES
        .iter()
        .any(|protected| protected.eq_ignore_ascii_case(name))
}

/// Applies the rules in order; the first match supplies the reason.
pub fn is_deletable(object: &ManagedObject, category: &Category) -> Deletability {
    let display = object.display_name_for(category).unwrap_or_default();

    if is_protected_name(display) || object.name.as_deref().is_some_and(is_protected_name) {
        return Deletability::Protected(SkipReason::ProtectedName);
    }

    if !display.is_empty()
        && category
            .cannot_delete
            .iter()
            .any(|pattern| display.contains(pattern.as_str()))
    {
        return Deletability::Protected(SkipReason::CategoryDefault);
    }

    if category
        .builtin_flag
        .as_deref()
        .is_some_and(|flag| object.flag(flag))
    {
        return Deletability::Protected(SkipReason::BuiltIn);
    }

    Deletability::Deletable
}

/// Splits objects into `(deletable, protected)` preserving order.
pub fn partition<'a>(
    objects: &'a [ManagedObject],
    category: &Category,
) -> (Vec<&'a ManagedObject>, Vec<(&'a ManagedObject, SkipReason)>) {
    let mut deletable = Vec::new();
    let mut protected = Vec::new();
    for object in objects {
        match is_deletable(object, category) {
            Deletability::Deletable => deletable.push(object),
            Deletability::Protected(reason) => protected.push((object, reason)),
        }
    }
    (deletable, protected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn restrictions() -> Category {
        Category::new(
            "deviceEnrollmentConfigurations",
            "Enrollment restrictions",
            "/deviceManagement/deviceEnrollmentConfigurations",
        )
        .cannot_delete(&["Default", "All users and all devices"])
    }

    #[test]
    fn protected_name_wins_first() {
        let object = ManagedObject::new("1")
            .with_display_name("all users")
            .with_field("isBuiltIn", true);
        assert_eq!(
            is_deletable(&object, &restrictions()),
            Deletability::Protected(SkipReason::ProtectedName)
        );
    }

    #[test]
    fn category_pattern_is_substring_match() {
        let object = ManagedObject::new("2").with_display_name("Default iOS restriction");
        assert_eq!(
            is_deletable(&object, &restrictions()),
            Deletability::Protected(SkipReason::CategoryDefault)
        );
        let lower = ManagedObject::new("3").with_display_name("my default-ish thing");
        assert!(is_deletable(&lower, &restrictions()).is_deletable());
    }

    #[test]
    fn builtin_flag_follows_category() {
        let object = ManagedObject::new("4")
            .with_display_name("Global script")
            .with_field("isGlobalScript", true);
        let scripts = Category::new("s", "Scripts", "/deviceManagement/deviceHealthScripts")
            .builtin_flag(Some("isGlobalScript"));
        assert_eq!(
            is_deletable(&object, &scripts),
            Deletability::Protected(SkipReason::BuiltIn)
        );
        let no_flag = scripts.clone().builtin_flag(None);
        assert!(is_deletable(&object, &no_flag).is_deletable());
    }

    #[test]
    fn non_boolean_flag_is_not_builtin() {
        let object = ManagedObject::new("5")
            .with_display_name("Custom")
            .with_field("isBuiltIn", "true");
        assert!(is_deletable(&object, &restrictions()).is_deletable());
    }

    #[test]
    fn short_name_is_checked_too() {
        let object = ManagedObject::new("6")
            .with_display_name("Something")
            .with_name("Built-in");
        assert!(!is_deletable(&object, &restrictions()).is_deletable());
    }

    #[test]
    fn partition_keeps_order() {
        let objects = vec![
            ManagedObject::new("a").with_display_name("Keep 1"),
            ManagedObject::new("b").with_display_name("Default"),
            ManagedObject::new("c").with_display_name("Keep 2"),
        ];
        let (deletable, protected) = partition(&objects, &restrictions());
        let ids: Vec<_> = deletable.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(protected.len(), 1);
        assert_eq!(protected[0].1.message(), "Protected object (built-in or system managed)");
    }

    proptest! {
        #[test]
        fn check_is_pure(
            name in "[A-Za-z -]{0,24}",
            builtin in any::<bool>(),
            pattern in "[A-Za-z]{1,6}",
        ) {
            let category = restrictions().cannot_delete(&[pattern.as_str()]);
            let object = ManagedObject::new("p")
                .with_display_name(name)
                .with_field("isBuiltIn", builtin);
            let first = is_deletable(&object, &category);
            let second = is_deletable(&object.clone(), &category.clone());
            prop_assert_eq!(first, second);
            if builtin {
                prop_assert!(!first.is_deletable());
            }
        }
    }
}
