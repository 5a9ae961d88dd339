//! Local mirror of the backoffice feature toggles.

pub mod client;
pub mod initializer;
pub mod manager;
pub mod updater;

pub use client::{BackofficeClient, FeatureToggleView};
pub use initializer::FeatureToggleInitializer;
pub use manager::FeatureToggleManager;
pub use updater::{FEATURE_TOGGLE_GROUP_ID, FeatureToggleChange, FeatureToggleUpdater};
