use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserTier {
    #[default]
    Free,
    Gold,
}

impl UserTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTier::Free => "free",
            UserTier::Gold => "gold",
        }
    }

    /// Unknown values fall back to `Free` so a bad row never grants paid features.
    pub fn from_str(value: &str) -> Self {
        match value {
            "gold" => UserTier::Gold,
            _ => UserTier::Free,
        }
    }
}

impl Display for UserTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
