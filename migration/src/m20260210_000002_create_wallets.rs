//! Migration to create the wallets table
//!
//! A wallet is a customer's pre-approved offline spending escrow. The
//! settlement engine is the only writer of the balance columns.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(string(Wallets::WalletId).primary_key())
                    .col(string(Wallets::UserId).not_null())
                    .col(decimal_len(Wallets::ApprovedLimit, 20, 2).not_null())
                    .col(decimal_len(Wallets::CurrentBalance, 20, 2).not_null())
                    .col(
                        decimal_len(Wallets::UsedAmount, 20, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        decimal_len(Wallets::LockedAmount, 20, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(string(Wallets::Status).default("pending"))
                    .col(
                        timestamp_with_time_zone(Wallets::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Wallets::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallets_user_id")
                            .from(Wallets::Table, Wallets::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One wallet per user.
        manager
            .create_index(
                Index::create()
                    .name("idx_wallets_user_id")
                    .table(Wallets::Table)
                    .col(Wallets::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    WalletId,
    UserId,
    ApprovedLimit,
    CurrentBalance,
    UsedAmount,
    LockedAmount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
