//! Domain models for the Warehouse Fulfillment Platform

mod allocation;
mod expiry;
mod lot;
mod picking;
mod route;

pub use allocation::*;
pub use expiry::*;
pub use lot::*;
pub use picking::*;
pub use route::*;
