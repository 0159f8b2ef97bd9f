//! Chain-facing interface types

pub mod client;
pub mod msgs;
pub mod receipt;

pub use client::{smart_query, ChainClient};
pub use receipt::{Attribute, EventGroup, Receipt};
