#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use rand::rngs::OsRng;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};

use settlement_backend::crypto::jwk::EcJwk;
use settlement_backend::crypto::{canonical, primitives};
use settlement_backend::entities::{users, wallets};
use settlement_backend::models::ledger::SignedLedger;
use settlement_backend::models::transaction::{EntryStatus, LedgerEntry, Transaction};
use settlement_backend::services::verifier::GENESIS;

/// Set up test database connection and run migrations.
/// Returns None (and the caller skips) when TEST_DATABASE_URL is not set.
pub async fn setup_test_db() -> Option<DatabaseConnection> {
    let database_url = match env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: TEST_DATABASE_URL not set");
            return None;
        }
    };

    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations on test DB");
    Some(db)
}

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Identifier unique across test runs sharing one database.
pub fn unique_id(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{nanos}-{seq}")
}

pub struct SeededWallet {
    pub user_id: String,
    pub wallet_id: String,
    pub bank_id: String,
}

/// Insert a sender with a wallet holding `balance` of `limit`.
pub async fn seed_wallet(
    db: &DatabaseConnection,
    limit: Decimal,
    balance: Decimal,
    status: &str,
) -> SeededWallet {
    let user_id = unique_id("user");
    let wallet_id = unique_id("wallet");
    let bank_id = unique_id("bank");

    users::ActiveModel {
        user_id: Set(user_id.clone()),
        full_name: Set("Test Sender".to_string()),
        email_or_phone: Set(format!("{user_id}@example.com")),
        role: Set("sender".to_string()),
        bank_id: Set(bank_id.clone()),
        public_key: Set(serde_json::json!({"kty": "EC", "crv": "P-256"})),
        kyc_status: Set("approved".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user");

    wallets::ActiveModel {
        wallet_id: Set(wallet_id.clone()),
        user_id: Set(user_id.clone()),
        approved_limit: Set(limit),
        current_balance: Set(balance),
        used_amount: Set(limit - balance),
        locked_amount: Set(Decimal::ZERO),
        status: Set(status.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed wallet");

    SeededWallet {
        user_id,
        wallet_id,
        bank_id,
    }
}

pub fn sign_hash(key: &SigningKey, hash: &str) -> String {
    let message = match hex::decode(hash) {
        Ok(bytes) if hash.len() == 64 => bytes,
        _ => hash.as_bytes().to_vec(),
    };
    let signature: Signature = key.sign(&message);
    STANDARD.encode(signature.to_bytes())
}

pub struct TxnSpec {
    pub txn_id: String,
    pub amount: Decimal,
    pub wallet_id: Option<String>,
}

/// Build a fully signed, chained ledger the way the customer and merchant
/// front-ends do.
pub fn build_signed_ledger(
    customer: &SigningKey,
    merchant: &SigningKey,
    from_id: &str,
    receiver_id: &str,
    specs: &[TxnSpec],
) -> SignedLedger {
    let mut entries = Vec::new();
    let mut prev_txn_hash: Option<String> = None;
    let mut prev_entry_hash = GENESIS.to_string();

    for (index, spec) in specs.iter().enumerate() {
        let mut txn = Transaction {
            txn_id: spec.txn_id.clone(),
            from_id: from_id.to_string(),
            to_id: receiver_id.to_string(),
            amount: spec.amount,
            timestamp: "2026-01-15T10:00:00Z".to_string(),
            prev_hash: prev_txn_hash.clone(),
            wallet_id: spec.wallet_id.clone(),
            hash: String::new(),
            signature: String::new(),
            sender_public_key: EcJwk::from_public_key(&customer.verifying_key().into()),
        };
        let variant = canonical::preferred_variant(&txn);
        txn.hash = canonical::transaction_hash(&txn, variant).unwrap();
        txn.signature = sign_hash(customer, &txn.hash);

        let entry_hash = primitives::sha256_hex(&format!("{prev_entry_hash}{}", txn.hash));
        prev_txn_hash = Some(txn.hash.clone());
        prev_entry_hash = entry_hash.clone();

        entries.push(LedgerEntry {
            ledger_index: index as i64,
            transaction: txn,
            hash: entry_hash,
            status: EntryStatus::Pending,
        });
    }

    SignedLedger {
        receiver_id: receiver_id.to_string(),
        hash: prev_entry_hash.clone(),
        signature: sign_hash(merchant, &prev_entry_hash),
        receiver_public_key: EcJwk::from_public_key(&merchant.verifying_key().into()),
        entries,
        exported_at: Some("2026-01-15T12:00:00Z".to_string()),
    }
}

pub fn customer_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

pub fn merchant_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}
