//! Core data models for the budget hierarchy

use apbd_wire::{parse_payload, WireCategory, WireTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{BudgetKind, CategoryId, TransactionId};

/// Budget category (`kategoriApbd`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable category identity
    pub id: CategoryId,
    /// Display name, also the default sort key
    pub name: String,
    /// Account code such as "4.1.1"; display and ordering only
    pub code: Option<String>,
    /// 1 = root group, 2 = sub-group, 3 = leaf account
    pub level: u8,
    /// Partition key
    pub kind: BudgetKind,
    /// Parent category, expected at `level - 1`
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Create a category without code or parent
    pub fn new(id: CategoryId, name: impl Into<String>, level: u8, kind: BudgetKind) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            level,
            kind,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Convert a backend category record
    pub fn try_from_wire(wire: &WireCategory) -> CoreResult<Self> {
        let kind: BudgetKind = wire.jenis.parse()?;
        let level = u8::try_from(wire.level).map_err(|_| CoreError::ValidationError {
            message: format!(
                "Category {} has invalid level {}",
                wire.id_kategori, wire.level
            ),
        })?;

        Ok(Self {
            id: wire.id_kategori,
            name: wire.nama_kategori.clone(),
            code: wire.kode.clone().filter(|code| !code.trim().is_empty()),
            level,
            kind,
            parent_id: wire.id_parent,
        })
    }
}

/// Budget transaction (`transaksiApbd`)
///
/// Field order matters: the derived `Ord` sorts by id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Decimal,
    pub category_id: CategoryId,
    pub fiscal_year: i32,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        category_id: CategoryId,
        amount: Decimal,
        fiscal_year: i32,
    ) -> Self {
        Self {
            id,
            amount,
            category_id,
            fiscal_year,
        }
    }

    /// Convert a backend transaction record
    pub fn from_wire(wire: &WireTransaction) -> Self {
        Self {
            id: wire.id_transaksi,
            amount: wire.jumlah,
            category_id: wire.id_kategori,
            fiscal_year: wire.tahun_anggaran.tahun,
        }
    }
}

/// One node of the aggregated forest. Rebuilt on every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedNode {
    pub category: Category,
    /// Direct postings plus the totals of all children
    pub total: Decimal,
    /// Sorted children, one level deeper
    pub children: Vec<AggregatedNode>,
    /// Transactions posted against this category itself, sorted by id
    pub direct_transactions: Vec<Transaction>,
}

impl AggregatedNode {
    /// Sum of the transactions posted directly on this node
    pub fn direct_total(&self) -> Decimal {
        self.direct_transactions.iter().map(|t| t.amount).sum()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Ids of the direct transactions, for row actions
    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.direct_transactions.iter().map(|t| t.id).collect()
    }

    /// Find a node by category id in this subtree
    pub fn find(&self, id: CategoryId) -> Option<&AggregatedNode> {
        if self.category.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Transactions and categories ready for aggregation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetDataset {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
}

impl BudgetDataset {
    /// Build from backend records.
    ///
    /// Categories embedded in transactions fill in ids missing from the
    /// category list; listed categories take precedence.
    pub fn from_wire(
        transactions: &[WireTransaction],
        categories: &[WireCategory],
    ) -> CoreResult<Self> {
        let mut merged: BTreeMap<CategoryId, Category> = BTreeMap::new();

        for wire in categories {
            let category = Category::try_from_wire(wire)?;
            merged.insert(category.id, category);
        }

        let mut embedded = 0usize;
        for wire in transactions.iter().filter_map(|t| t.kategori_apbd.as_ref()) {
            if !merged.contains_key(&wire.id_kategori) {
                merged.insert(wire.id_kategori, Category::try_from_wire(wire)?);
                embedded += 1;
            }
        }

        if embedded > 0 {
            log::debug!(
                target: "apbd::dataset",
                "Merged {} categories embedded in transactions",
                embedded
            );
        }

        Ok(Self {
            transactions: transactions.iter().map(Transaction::from_wire).collect(),
            categories: merged.into_values().collect(),
        })
    }

    /// Decode a backend response or exported bundle
    pub fn from_json(content: &str) -> CoreResult<Self> {
        let payload = parse_payload(content)?;
        Self::from_wire(payload.transactions_or_empty(), payload.categories_or_empty())
    }

    /// Fiscal years present in the transactions, ascending
    pub fn fiscal_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.transactions.iter().map(|t| t.fiscal_year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}
