pub use super::audit_logs::Entity as AuditLogs;
pub use super::settled_transactions::Entity as SettledTransactions;
pub use super::users::Entity as Users;
pub use super::wallets::Entity as Wallets;
