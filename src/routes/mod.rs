pub mod registrations;

use axum::routing::any;
use axum::Router;

use crate::state::SharedState;

pub fn intake_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/registrations", any(registrations::submit))
        // Path the hosted form already posts to
        .route(
            "/.netlify/functions/submitRegistration",
            any(registrations::submit),
        )
}
