//! Shared types and models for the Warehouse Fulfillment Platform
//!
//! This crate contains the domain models and the pure computation used by the
//! backend: expiry classification, FEFO lot ordering, allocation planning,
//! picking-line gates and route sequencing. Nothing in here touches the
//! database, so it all stays deterministic and unit-testable.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
