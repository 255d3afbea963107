//! Identification of the application embedding the client

use serde::{Deserialize, Serialize};

use crate::errors::{PaywireError, Result};

/// Plugin or application information appended to the user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl AppInfo {
    /// Creates app info with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// A name is required for the info to be sent.
    ///
    /// # Errors
    /// Returns `PaywireError::Config` when the name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PaywireError::Config("app info name cannot be empty".to_string()));
        }
        Ok(())
    }

    /// `name/version (url)`, omitting absent parts.
    #[must_use]
    pub fn format_user_agent(&self) -> String {
        let mut agent = self.name.clone();
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            agent.push('/');
            agent.push_str(version);
        }
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            agent.push_str(" (");
            agent.push_str(url);
            agent.push(')');
        }
        agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_all_parts() {
        let info = AppInfo {
            name: "MyPlugin".into(),
            partner_id: Some("pp_partner_1".into()),
            url: Some("https://example.com".into()),
            version: Some("1.2.3".into()),
        };
        assert_eq!(info.format_user_agent(), "MyPlugin/1.2.3 (https://example.com)");
    }

    #[test]
    fn formats_name_only() {
        assert_eq!(AppInfo::new("Bare").format_user_agent(), "Bare");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(AppInfo::new("  ").validate(), Err(PaywireError::Config(_))));
        assert!(AppInfo::new("ok").validate().is_ok());
    }
}
