// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::state::AppointmentCellState;

pub fn appointment_routes(state: Arc<AppointmentCellState>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .with_state(state)
}

/// Next-day listing, mounted separately from the CRUD routes.
pub fn upcoming_routes(state: Arc<AppointmentCellState>) -> Router {
    Router::new()
        .route("/", get(handlers::get_upcoming_appointments))
        .with_state(state)
}
