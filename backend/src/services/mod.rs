//! Business logic services for the Warehouse Fulfillment Platform

pub mod alerts;
pub mod allocation;
pub mod picking;
pub mod route;
pub mod stock_lot;

pub use alerts::ExpiryAlertService;
pub use allocation::AllocationService;
pub use picking::PickingService;
pub use route::RouteService;
pub use stock_lot::StockLotService;
