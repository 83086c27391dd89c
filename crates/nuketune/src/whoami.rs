// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nuketune whoami` command implementation.

use nuketune_config::NukeTuneConfig;
use nuketune_core::{NukeError, UserInfo};
use nuketune_graph::GraphClient;

/// Run the `nuketune whoami` command.
pub async fn run_whoami(config: &NukeTuneConfig) -> Result<(), NukeError> {
    let client = GraphClient::from_config(config)?;
    let user = client.current_user().await?;
    print!("{}", render_user(&user, config));
    Ok(())
}

fn render_user(user: &UserInfo, config: &NukeTuneConfig) -> String {
    let unknown = "(unknown)";
    let tenant_id = user
        .tenant_id
        .as_deref()
        .or(config.auth.tenant_id.as_deref());
    format!(
        "\n  nuketune whoami\n  {}\n    User:      {}\n    UPN:       {}\n    Tenant:    {}\n    Tenant ID: {}\n    Cloud:     {}\n    Authority: {}\n    Graph:     {}\n\n",
        "-".repeat(35),
        user.display_name.as_deref().unwrap_or(unknown),
        user.user_principal_name.as_deref().unwrap_or(unknown),
        user.tenant_name.as_deref().unwrap_or(unknown),
        tenant_id.unwrap_or(unknown),
        config.graph.cloud,
        config.graph.cloud.authority_url(tenant_id),
        config.graph.endpoint(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_known_and_missing_fields() {
        let user = UserInfo {
            display_name: Some("Adele Vance".into()),
            user_principal_name: Some("adele@contoso.onmicrosoft.com".into()),
            tenant_id: Some("0000-1111".into()),
            tenant_name: None,
        };
        let text = render_user(&user, &NukeTuneConfig::default());
        assert!(text.contains("User:      Adele Vance"));
        assert!(text.contains("Tenant:    (unknown)"));
        assert!(text.contains("Authority: https://login.microsoftonline.com/0000-1111"));
        assert!(text.contains("Graph:     https://graph.microsoft.com"));
    }
}
