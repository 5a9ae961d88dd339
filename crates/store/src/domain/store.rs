use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{IntegrationPlatform, StoreRegistrationInfo, StoreStatus};
use crate::error::{Result, StoreError};

/// A seller's store as persisted by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub email: String,
    pub phone: String,
    pub status: StoreStatus,
    pub registered_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub registered_by: i64,
    pub deleted_by: Option<i64>,
    pub integrations: Vec<StoreIntegration>,
    pub histories: Vec<StoreHistory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIntegration {
    pub id: i64,
    pub platform: IntegrationPlatform,
    pub platform_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHistory {
    pub id: i64,
    pub history: String,
    pub created_at: DateTime<Utc>,
}

/// A store that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub email: String,
    pub phone: String,
    pub status: StoreStatus,
    pub registered_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub registered_by: i64,
    pub integration: NewStoreIntegration,
    pub history: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoreIntegration {
    pub platform: IntegrationPlatform,
    pub platform_id: String,
}

/// Soft-delete data computed by [`Store::cancel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    pub deleted_by: i64,
    pub deleted_at: DateTime<Utc>,
    pub history: String,
}

impl NewStore {
    /// Builds a store from a successful marketplace registration.
    ///
    /// Fails when the marketplace status has no local equivalent.
    pub fn register(
        name: impl Into<String>,
        description: Option<String>,
        user_id: i64,
        email: impl Into<String>,
        phone: impl Into<String>,
        registration: &StoreRegistrationInfo,
    ) -> Result<Self> {
        let status = registration.integration_status()?;
        let now = Utc::now();

        Ok(Self {
            name: name.into(),
            description,
            user_id,
            email: email.into(),
            phone: phone.into(),
            status,
            registered_at: now,
            confirmed_at: (status == StoreStatus::Confirm).then_some(now),
            registered_by: user_id,
            integration: NewStoreIntegration {
                platform: registration.platform,
                platform_id: registration.platform_id.clone(),
            },
            history: format!(
                "registered on {} as {} (seller status {})",
                registration.platform, registration.platform_id, registration.status
            ),
        })
    }
}

impl Store {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// Computes the soft delete of this store by `by`.
    ///
    /// A store can only be cancelled once.
    pub fn cancel(&self, by: i64) -> Result<Cancellation> {
        if self.is_deleted() {
            return Err(StoreError::AlreadyCancelled(self.id));
        }

        Ok(Cancellation {
            deleted_by: by,
            deleted_at: Utc::now(),
            history: format!("cancelled by user {by}"),
        })
    }

    /// Applies a cancellation, appending its history line.
    pub fn apply_cancellation(&mut self, cancellation: &Cancellation, history_id: i64) {
        self.deleted_at = Some(cancellation.deleted_at);
        self.deleted_by = Some(cancellation.deleted_by);
        self.updated_at = cancellation.deleted_at;
        self.histories.push(StoreHistory {
            id: history_id,
            history: cancellation.history.clone(),
            created_at: cancellation.deleted_at,
        });
    }
}
