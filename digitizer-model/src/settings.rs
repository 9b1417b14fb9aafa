use serde::{Deserialize, Serialize};

/// Backend output settings (`GET /api/settings`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub output_path: String,
    pub naming_pattern: String,
    pub auto_eject: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_path: "/output/dvd".to_string(),
            naming_pattern: "YYYY-MM-DD_rip_NNN".to_string(),
            auto_eject: true,
        }
    }
}

/// Partial update body for `PUT /api/settings`; absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_eject: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.output_path.is_none()
            && self.naming_pattern.is_none()
            && self.auto_eject.is_none()
    }
}
