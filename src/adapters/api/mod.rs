pub mod client;
pub mod comment_gateway;
pub mod dto;

pub use client::*;
pub use comment_gateway::*;
pub use dto::*;
