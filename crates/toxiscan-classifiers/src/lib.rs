//! Toxiscan Classifiers
//!
//! Access to the external toxicity prediction service.
//!
//! - [`gateway`]: sends one comment per call over HTTP and reports failures
//!   as `UpstreamUnavailable` or `UpstreamError`
//! - [`normalizer`]: converts the service's payload shapes into a single
//!   verdict/confidence pair
//!
//! Neither component retries, caches, or touches history.

pub mod config;
pub mod gateway;
pub mod normalizer;

pub use config::GatewayConfig;
pub use gateway::{HttpPredictionGateway, PredictionGateway};
pub use normalizer::{normalize, normalize_value, Prediction, DEFAULT_CONFIDENCE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::gateway::{HttpPredictionGateway, PredictionGateway};
    pub use crate::normalizer::{normalize, Prediction};
}
