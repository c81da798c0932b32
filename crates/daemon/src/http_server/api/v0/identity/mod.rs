use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};

use common::ledger::IdentityHandle;
use common::prelude::PublicKey;

pub mod append;
pub mod register;
pub mod rotate_key;
pub mod show;

pub use append::{AppendError, AppendRequest};
pub use register::{RegisterError, RegisterRequest};
pub use rotate_key::{RotateKeyError, RotateKeyRequest};
pub use show::{ShowError, ShowRequest, ShowResponse};

use crate::ServiceState;

/// An identity handle and the key currently bound to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub identity_handle: IdentityHandle,
    pub public_key: PublicKey,
}

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/register", post(register::handler))
        .route("/rotate-key", post(rotate_key::handler))
        .route("/show", post(show::handler))
        .route("/append", post(append::handler))
        .with_state(state)
}
