//! Budget hierarchy aggregation for APBD realisation data
//!
//! Builds per-kind category forests from flat transactions and categories,
//! then derives the shares, summaries and table rows the views render.

pub mod aggregate;
pub mod collation;
pub mod error;
pub mod models;
pub mod reports;
pub mod rows;
pub mod types;

pub use aggregate::{aggregate, aggregate_by_kind_name, HierarchyAggregator, MAX_LEVEL};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger,
    ErrorSeverity,
};
pub use models::{AggregatedNode, BudgetDataset, Category, Transaction};
pub use reports::{
    annual_summary, composition, financing_summary, forest_total, group_small_shares,
    level2_shares, shares_within, year_comparison, AnnualSummary, CategoryShare, ComparisonEntry,
    FinancingSummary, KindSummary,
};
pub use rows::{flatten_rows, TableRow};
pub use types::{BudgetKind, CategoryId, TransactionId};
