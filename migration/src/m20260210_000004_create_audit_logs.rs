//! Migration to create the audit_logs table
//!
//! Append-only. Settlement-success entries land in the same database
//! transaction as the settlement itself; failure entries are written in
//! their own short transactions.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(pk_auto(AuditLogs::Id))
                    .col(string(AuditLogs::Actor).not_null())
                    .col(string(AuditLogs::Action).not_null())
                    .col(string_null(AuditLogs::TxnId))
                    .col(string(AuditLogs::Status).not_null())
                    .col(json_binary(AuditLogs::Details).not_null())
                    .col(
                        timestamp_with_time_zone(AuditLogs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // The query surface is "newest first".
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_created_at")
                    .table(AuditLogs::Table)
                    .col((AuditLogs::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // Settlement lookups by transaction id.
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_txn_id")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::TxnId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    Actor,
    Action,
    TxnId,
    Status,
    Details,
    CreatedAt,
}
