pub use sea_orm_migration::prelude::*;

mod m20260210_000001_create_users;
mod m20260210_000002_create_wallets;
mod m20260210_000003_create_settled_transactions;
mod m20260210_000004_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260210_000001_create_users::Migration),
            Box::new(m20260210_000002_create_wallets::Migration),
            Box::new(m20260210_000003_create_settled_transactions::Migration),
            Box::new(m20260210_000004_create_audit_logs::Migration),
        ]
    }
}
