pub mod model_service;

pub use model_service::*;
