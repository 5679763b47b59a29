//! Read-only endpoint exposing the bank's ECDH public key.
//!
//! Merchants fetch this once and wrap every exported ledger to it.

use axum::{extract::State, Json};

use crate::models::settlement::BankKeyResponse;
use crate::AppState;

pub async fn get_bank_key(State(state): State<AppState>) -> Json<BankKeyResponse> {
    Json(BankKeyResponse {
        public_key: state.keys.public_jwk().clone(),
    })
}
