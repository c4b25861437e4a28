//! Route definitions for the Warehouse Fulfillment Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - stock lots
        .nest("/lots", lot_routes())
        // Protected routes - allocation planning and reservations
        .nest("/allocations", allocation_routes())
        // Protected routes - picking orders
        .nest("/picking", picking_routes())
        // Protected routes - expiring-stock alerts
        .nest("/alerts", alert_routes())
}

/// Stock lot routes (protected)
fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots))
        .route(
            "/by-number/:location_id/:lot_number",
            get(handlers::get_lot_by_number),
        )
        .route("/:lot_id", get(handlers::get_lot))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Allocation routes (protected)
fn allocation_routes() -> Router<AppState> {
    Router::new()
        .route("/plan", post(handlers::plan_allocation))
        .route("/reserve", post(handlers::reserve_allocation))
        .route("/release-stale", post(handlers::release_stale_reservations))
        .route("/:reservation_id", get(handlers::get_reservation))
        .route("/:reservation_id/commit", post(handlers::commit_reservation))
        .route("/:reservation_id/release", post(handlers::release_reservation))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Picking order routes (protected)
fn picking_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::list_picking_orders).post(handlers::create_picking_order),
        )
        .route("/orders/:order_id", get(handlers::get_picking_order))
        .route("/orders/:order_id/picker", put(handlers::assign_picker))
        .route(
            "/orders/:order_id/lines/:line_id",
            put(handlers::update_picking_line),
        )
        .route(
            "/orders/:order_id/complete",
            post(handlers::complete_picking_order),
        )
        .route(
            "/orders/:order_id/cancel",
            post(handlers::cancel_picking_order),
        )
        .route("/orders/:order_id/route", get(handlers::get_picking_route))
        .route("/stale", get(handlers::list_stale_orders))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Alert routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/expiring", get(handlers::get_expiring_lots))
        .route_layer(middleware::from_fn(auth_middleware))
}
