//! Migration to create the users table
//!
//! Users are provisioned by the admin console; the settlement core only
//! reads them to resolve wallets and verify ownership.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string(Users::UserId).primary_key())
                    .col(string(Users::FullName).not_null())
                    .col(string(Users::EmailOrPhone).not_null())
                    .col(string(Users::Role).not_null())
                    .col(string(Users::BankId).not_null())
                    .col(json_binary(Users::PublicKey).not_null())
                    .col(string(Users::KycStatus).default("pending"))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One account per contact point per role; senders and receivers may
        // share a phone number or email across roles.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_contact_role")
                    .table(Users::Table)
                    .col(Users::EmailOrPhone)
                    .col(Users::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Bank identifiers are what transactions carry as from_id/to_id.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_bank_id_role")
                    .table(Users::Table)
                    .col(Users::BankId)
                    .col(Users::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
    FullName,
    EmailOrPhone,
    Role,
    BankId,
    PublicKey,
    KycStatus,
    CreatedAt,
    UpdatedAt,
}
