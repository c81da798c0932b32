use axum::routing::post;
use axum::Router;

pub mod generate;

pub use generate::GenerateError;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/generate", post(generate::handler))
        .with_state(state)
}
