pub mod comment_gateway;
pub mod config_store;
pub mod key_value_store;

pub use comment_gateway::*;
pub use config_store::*;
pub use key_value_store::*;
