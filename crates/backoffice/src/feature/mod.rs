//! Feature toggles: storage, publishing and the propagated message.

pub mod memory;
pub mod model;
pub mod postgres;
pub mod repository;
pub mod service;

pub use memory::InMemoryFeatureToggleRepository;
pub use model::{FeatureToggle, FeatureToggleMessage, MAX_NAME_LENGTH, message_key};
pub use postgres::PostgresFeatureToggleRepository;
pub use repository::FeatureToggleRepository;
pub use service::FeatureToggleService;
