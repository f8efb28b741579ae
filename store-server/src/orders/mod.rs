//! Order Lifecycle & Status-Transition Engine
//!
//! - `policy`: the transition table (state x actor -> allowed targets
//!   with required fields), pure and storage-free
//! - `service`: orchestrates load -> check -> atomic apply -> reload
//! - `statistics`: read-only aggregates over the order population

pub mod error;
pub mod policy;
pub mod service;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use error::{OrderError, OrderResult};
pub use service::OrderService;
