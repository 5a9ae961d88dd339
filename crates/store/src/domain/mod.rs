//! Store aggregate and the values exchanged with marketplaces.

pub mod platform;
pub mod registration;
pub mod store;

pub use platform::{IntegrationPlatform, StoreStatus};
pub use registration::{StoreRegistrationInfo, StoreRegistrationRequestInfo};
pub use store::{Cancellation, NewStore, NewStoreIntegration, Store, StoreHistory, StoreIntegration};
