//! Lifecycle of the dated Elasticsearch indices receiving crash reports: naming
//! them from a date, creating them with shared settings, listing them and
//! expiring the ones older than the retention policy.

pub mod clock;
pub mod configuration;
pub mod connection;
pub mod errors;
pub mod internal;
pub mod lifecycle;
pub mod mapping;
pub mod model;
pub mod naming;
pub mod settings;

pub use clock::{Clock, FixedClock, SystemClock};
pub use connection::{ConnectionFactory, ConnectionHandle};
pub use errors::{IndexError, Result};
pub use internal::IndexAdmin;
pub use lifecycle::IndexLifecycleManager;
pub use mapping::{FileMappingProvider, MappingContext, MappingProvider, StaticMappingProvider};
pub use model::health::ClusterHealth;
pub use model::sweep::{RetentionSweep, SkippedIndex};
pub use naming::IndexNaming;
pub use settings::ElasticsearchConfig;
