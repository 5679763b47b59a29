//! Migration to create the settled_transactions table
//!
//! The primary key on txn_id is the authoritative double-spend guard:
//! concurrent submissions of the same transaction resolve to one winner
//! through the uniqueness violation. Rows are never updated or deleted.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SettledTransactions::Table)
                    .if_not_exists()
                    .col(string(SettledTransactions::TxnId).primary_key())
                    .col(string(SettledTransactions::WalletId).not_null())
                    .col(string(SettledTransactions::FromUserId).not_null())
                    .col(string(SettledTransactions::ToUserId).not_null())
                    .col(decimal_len(SettledTransactions::Amount, 20, 2).not_null())
                    .col(big_integer(SettledTransactions::LedgerIndex).not_null())
                    .col(string(SettledTransactions::ReceiverId).not_null())
                    .col(
                        timestamp_with_time_zone(SettledTransactions::SettledAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settled_transactions_wallet_id")
                            .from(SettledTransactions::Table, SettledTransactions::WalletId)
                            .to(Wallets::Table, Wallets::WalletId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settled_transactions_from_user_id")
                            .from(SettledTransactions::Table, SettledTransactions::FromUserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-wallet settlement history lookups.
        manager
            .create_index(
                Index::create()
                    .name("idx_settled_transactions_wallet_id")
                    .table(SettledTransactions::Table)
                    .col(SettledTransactions::WalletId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SettledTransactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SettledTransactions {
    Table,
    TxnId,
    WalletId,
    FromUserId,
    ToUserId,
    Amount,
    LedgerIndex,
    ReceiverId,
    SettledAt,
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    WalletId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
