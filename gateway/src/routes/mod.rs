//! Route definitions for the inventory gateway

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::session_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/items", item_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/locations", location_routes())
        .nest("/stocks", stock_routes())
        .nest("/grn", grn_routes())
        .nest("/transfers", transfer_routes())
        .nest("/sales", sales_routes())
        .nest("/reports", report_routes())
        .route("/dashboard", get(handlers::reporting::get_dashboard))
        .nest("/counts", count_routes())
        .route_layer(middleware::from_fn_with_state(state, session_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .merge(protected)
}

fn item_routes() -> Router<AppState> {
    use handlers::catalog::*;
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/active", get(list_active_items))
        .route("/:item_id", get(get_item).put(update_item).delete(delete_item))
}

fn warehouse_routes() -> Router<AppState> {
    use handlers::catalog::*;
    Router::new()
        .route("/", get(list_warehouses).post(create_warehouse))
        .route("/active", get(list_active_warehouses))
        .route("/:warehouse_id", get(get_warehouse).put(update_warehouse))
        .route("/:warehouse_id/locations", get(list_warehouse_locations))
        .route(
            "/:warehouse_id/snapshot",
            get(handlers::stock::get_snapshot),
        )
}

fn location_routes() -> Router<AppState> {
    use handlers::catalog::*;
    Router::new()
        .route("/", post(create_location))
        .route("/:location_id", get(get_location).put(update_location))
}

fn stock_routes() -> Router<AppState> {
    use handlers::stock::*;
    Router::new()
        .route("/", get(list_stocks).post(create_stock))
        .route(
            "/:stock_id",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
}

fn grn_routes() -> Router<AppState> {
    use handlers::receiving::*;
    Router::new()
        .route("/", get(list_grns).post(create_grn))
        .route("/:grn_id", get(get_grn).put(update_grn))
        .route("/:grn_id/submit", post(submit_grn))
        .route("/:grn_id/finalize", post(finalize_grn))
}

fn transfer_routes() -> Router<AppState> {
    use handlers::transfer::*;
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route("/:transfer_id", get(get_transfer))
}

fn sales_routes() -> Router<AppState> {
    use handlers::dispatch::*;
    use handlers::sales::*;
    Router::new()
        // Sales orders
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:order_id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/:order_id/check-credit", post(check_credit))
        .route(
            "/orders/from-quotation/:quotation_id",
            post(create_from_quotation),
        )
        // Stock issue notes
        .route("/issue-notes", get(list_issue_notes).post(create_issue_note))
        .route("/issue-notes/check-stock", post(check_stock))
        .route(
            "/issue-notes/:note_id",
            get(get_issue_note)
                .put(update_issue_note)
                .delete(delete_issue_note),
        )
        .route("/issue-notes/:note_id/approve", post(approve_issue_note))
        .route("/issue-notes/:note_id/submit", post(submit_issue_note))
        // Delivery orders
        .route(
            "/delivery-orders",
            get(list_delivery_orders).post(create_delivery_order),
        )
        .route(
            "/delivery-orders/:order_id",
            get(get_delivery_order)
                .put(update_delivery_order)
                .delete(delete_delivery_order),
        )
        .route(
            "/delivery-orders/from-issue-note/:note_id",
            post(create_delivery_from_issue_note),
        )
}

fn report_routes() -> Router<AppState> {
    use handlers::reporting::*;
    Router::new()
        .route("/dual-valuation", get(get_dual_valuation))
        .route("/periodic", get(get_periodic_report))
}

fn count_routes() -> Router<AppState> {
    use handlers::counting::*;
    Router::new()
        .route("/:warehouse_id/sheet", get(get_count_sheet))
        .route("/:warehouse_id/apply", post(apply_count))
}
