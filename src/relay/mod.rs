//! Upload relay core
//!
//! Everything here works against the `SessionConnector`/`ShareSession`
//! traits and returns classified `RelayError`s. Configuration and HTTP live
//! outside.

pub mod conflict;
pub mod error;
pub mod health;
pub mod reconcile;
pub mod retry;
pub mod session;
pub mod target;
pub mod transfer;
pub mod upload;

pub use conflict::check_conflict;
pub use error::RelayError;
pub use health::{probe, HealthReport, HealthResult};
pub use reconcile::{ensure_directory_path, ReconcileReport};
pub use retry::{with_retry, RetryConfig};
pub use session::{open_session, release_session};
pub use target::RemoteTarget;
pub use transfer::{classify_store_error, store};
pub use upload::upload;
