//! Client-side data access for the Fintrack personal finance application.
//!
//! This crate wraps the hosted backend (identity endpoints plus row-level
//! secured table storage) and exposes typed async CRUD functions per entity,
//! two small analytics fetches, and a CSV export helper. Every façade call is
//! a single request/response to the backend; errors are passed through from
//! the backend's own error representation without local retry or recovery.
//!
//! ```text
//! caller (CLI / app shell)
//!        │
//!        ▼
//! fintrack-connect (this crate)
//!        │
//!        ▼
//! hosted backend (/auth/v1 identity, /rest/v1 tables)
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;

#[cfg(test)]
pub(crate) mod testutil;

pub use auth::{AuthSession, AuthUser, SignUpParams, SignUpResponse};
pub use client::ConnectClient;
pub use config::ClientConfig;
pub use error::{ConnectError, Result};
pub use export::{export_to_csv, to_csv_string};
pub use models::{
    Budget, BudgetUpdate, CategorySpend, Expense, ExpenseUpdate, Income, IncomeUpdate, Investment,
    InvestmentUpdate, MonthlyActivity, MonthlyPoint, NewBudget, NewExpense, NewIncome,
    NewInvestment, NewSavingsGoal, SavingsGoal, SavingsGoalUpdate, UserProfile, UserProfileUpdate,
    UserType,
};
