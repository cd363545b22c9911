pub mod comment;
pub mod error;
pub mod ingest;
pub mod thread;
pub mod validation;

pub use comment::*;
pub use error::*;
pub use ingest::*;
pub use thread::*;
pub use validation::*;
