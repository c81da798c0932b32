use axum::Router;

pub mod document;
pub mod identity;
pub mod keys;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/keys", keys::router(state.clone()))
        .nest("/identity", identity::router(state.clone()))
        .nest("/document", document::router(state.clone()))
        .with_state(state)
}
