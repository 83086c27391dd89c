// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nuketune categories` command implementation.

use std::io::IsTerminal;

use nuketune_core::{Category, DangerLevel};
use nuketune_engine::intune_categories;

/// Print the catalog, one category per line.
pub fn run_categories() {
    let use_color = std::io::stdout().is_terminal();
    println!();
    println!("  {:<36} {:<9} {}", "ID", "DANGER", "NAME");
    println!("  {}", "-".repeat(72));
    for category in intune_categories() {
        println!("  {}", category_line(&category, use_color));
    }
    println!();
}

fn category_line(category: &Category, use_color: bool) -> String {
    let danger = format!("{:<9}", category.danger_level.to_string());
    let danger = if use_color {
        use colored::Colorize;
        match category.danger_level {
            DangerLevel::Critical => danger.red().bold().to_string(),
            DangerLevel::High => danger.red().to_string(),
            DangerLevel::Medium => danger.yellow().to_string(),
            DangerLevel::Low => danger.green().to_string(),
        }
    } else {
        danger
    };

    let mut line = format!("{:<36} {} {}", category.id, danger, category.name);
    if category.requires_app_permissions {
        line.push_str(" (requires application permissions, not selectable)");
    }
    line
}
