//! SeaORM Entity for the wallets table
//!
//! Invariant maintained by the settlement engine:
//! used_amount + current_balance == approved_limit, current_balance >= 0.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_id: String,
    pub user_id: String,
    /// Pre-approved escrow ceiling
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub approved_limit: Decimal,
    /// Remaining spendable escrow
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub current_balance: Decimal,
    /// Escrow already consumed by settlements
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub used_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub locked_amount: Decimal,
    /// "pending", "approved", "rejected" or "suspended"
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::UserId"
    )]
    Users,
    #[sea_orm(has_many = "super::settled_transactions::Entity")]
    SettledTransactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::settled_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettledTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
