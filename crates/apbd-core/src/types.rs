//! Basic types for the budget hierarchy

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category identifier (`idKategori`)
pub type CategoryId = i64;

/// Transaction identifier (`idTransaksi`)
pub type TransactionId = i64;

/// Budget kind (`jenis`), the partition key for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetKind {
    /// Revenue
    Pendapatan,
    /// Expenditure
    Belanja,
    /// Expenditure, alternate label used by some backend records
    Pembelanjaan,
    /// Financing (receipts and disbursements)
    Pembiayaan,
}

impl BudgetKind {
    pub const ALL: [BudgetKind; 4] = [
        BudgetKind::Pendapatan,
        BudgetKind::Belanja,
        BudgetKind::Pembelanjaan,
        BudgetKind::Pembiayaan,
    ];

    /// Backend spelling of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetKind::Pendapatan => "Pendapatan",
            BudgetKind::Belanja => "Belanja",
            BudgetKind::Pembelanjaan => "Pembelanjaan",
            BudgetKind::Pembiayaan => "Pembiayaan",
        }
    }
}

impl std::str::FromStr for BudgetKind {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendapatan" => Ok(BudgetKind::Pendapatan),
            "belanja" => Ok(BudgetKind::Belanja),
            "pembelanjaan" => Ok(BudgetKind::Pembelanjaan),
            "pembiayaan" => Ok(BudgetKind::Pembiayaan),
            _ => Err(CoreError::ValidationError {
                message: format!("Invalid budget kind: {}", s),
            }),
        }
    }
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
