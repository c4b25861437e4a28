//! HTTP handlers for the Warehouse Fulfillment Platform

mod alerts;
mod allocation;
mod health;
mod picking;
mod stock_lot;

pub use alerts::*;
pub use allocation::*;
pub use health::*;
pub use picking::*;
pub use stock_lot::*;
