pub mod error;
pub mod ingest_service;
pub mod merge_engine;
pub mod pending_store;
pub mod submission;

pub use error::*;
pub use ingest_service::*;
pub use merge_engine::*;
pub use pending_store::*;
pub use submission::*;
