//! Flattened table rows for the indented category table

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::AggregatedNode;
use crate::types::{CategoryId, TransactionId};

/// One table row per aggregated node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Depth in the output tree; promoted orphans sit at 0
    pub depth: usize,
    pub category_id: CategoryId,
    pub name: String,
    /// Account code, `-` when absent
    pub code: String,
    pub level: u8,
    pub total: Decimal,
    /// Direct transactions, for the row's edit and delete actions
    pub transaction_ids: Vec<TransactionId>,
    pub is_leaf: bool,
}

/// Pre-order walk of the forest
pub fn flatten_rows(forest: &[AggregatedNode]) -> Vec<TableRow> {
    let mut rows = Vec::new();
    for root in forest {
        push_rows(root, 0, &mut rows);
    }
    rows
}

fn push_rows(node: &AggregatedNode, depth: usize, rows: &mut Vec<TableRow>) {
    rows.push(TableRow {
        depth,
        category_id: node.category.id,
        name: node.category.name.clone(),
        code: node.category.code.clone().unwrap_or_else(|| "-".to_string()),
        level: node.category.level,
        total: node.total,
        transaction_ids: node.transaction_ids(),
        is_leaf: node.is_leaf(),
    });
    for child in &node.children {
        push_rows(child, depth + 1, rows);
    }
}
