use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted toggle name, matching the column width.
pub const MAX_NAME_LENGTH: usize = 100;

/// A named boolean flag owned by the backoffice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggle {
    pub id: i64,
    pub name: String,
    pub toggle: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FeatureToggle {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Payload published for every toggle change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggleMessage {
    pub name: String,
    pub toggle: bool,
}

impl From<&FeatureToggle> for FeatureToggleMessage {
    fn from(feature: &FeatureToggle) -> Self {
        Self {
            name: feature.name.clone(),
            toggle: feature.toggle,
        }
    }
}

/// Partition key of a toggle message: `FEATURE_TOGGLE::{id}`.
pub fn message_key(id: i64) -> String {
    format!("FEATURE_TOGGLE::{id}")
}
