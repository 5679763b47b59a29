// src/lib.rs

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crypto::keys::KeyManager;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Bank ECDH keypair, loaded once at startup and read-only after
    pub keys: Arc<KeyManager>,
    /// Wall-clock deadline for one settlement request
    pub settlement_deadline: Duration,
}

pub mod config;
pub mod crypto;

pub mod entities {
    pub mod prelude;
    pub mod audit_logs;
    pub mod settled_transactions;
    pub mod users;
    pub mod wallets;
}

pub mod services {
    pub mod audit;
    pub mod settlement;
    pub mod verifier;
}

pub mod models;
pub mod handlers;
