//! Report structures derived from an aggregated forest
//!
//! Shares, compositions and summaries consumed by charts and summary cards.
//! Amounts stay `Decimal`; percentages are computed in `Decimal` and exposed
//! as `f64` for rendering.

use apbd_config::AggregationConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::aggregate::HierarchyAggregator;
use crate::collation::compare_names;
use crate::error::CoreResult;
use crate::models::{AggregatedNode, Category, Transaction};
use crate::types::BudgetKind;

/// One slice of a breakdown chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: Decimal,
    /// Percent of the reference total, 0 when that total is 0
    pub percentage: f64,
}

/// Sum of the root totals
pub fn forest_total(forest: &[AggregatedNode]) -> Decimal {
    forest.iter().map(|n| n.total).sum()
}

fn percent_of(value: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        value / total * Decimal::ONE_HUNDRED
    }
}

fn to_percentage(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Level-2 nodes that are roots or children of roots, in forest order
fn level2_nodes(forest: &[AggregatedNode]) -> impl Iterator<Item = &AggregatedNode> {
    forest.iter().flat_map(|root| {
        let as_root = (root.category.level == 2).then_some(root);
        as_root
            .into_iter()
            .chain(root.children.iter().filter(|c| c.category.level == 2))
    })
}

fn share_of(node: &AggregatedNode, total: Decimal) -> CategoryShare {
    CategoryShare {
        name: node.category.name.clone(),
        value: node.total,
        percentage: to_percentage(percent_of(node.total, total)),
    }
}

/// Level-2 categories as shares of the forest total
pub fn level2_shares(forest: &[AggregatedNode]) -> Vec<CategoryShare> {
    let total = forest_total(forest);
    level2_nodes(forest).map(|n| share_of(n, total)).collect()
}

/// Children of one node as shares of that node
pub fn shares_within(node: &AggregatedNode) -> Vec<CategoryShare> {
    node.children.iter().map(|c| share_of(c, node.total)).collect()
}

fn by_value_desc(a: &CategoryShare, b: &CategoryShare) -> Ordering {
    b.value.cmp(&a.value).then_with(|| compare_names(&a.name, &b.name))
}

/// Largest level-2 shares first, at most `top_n`
pub fn composition(forest: &[AggregatedNode], top_n: usize) -> Vec<CategoryShare> {
    let mut shares = level2_shares(forest);
    shares.sort_by(by_value_desc);
    shares.truncate(top_n);
    shares
}

/// Fold shares below `threshold` (a fraction of the total) into one
/// `other_label` entry.
///
/// Percentages are recomputed against the total of `shares`, rounded to one
/// decimal, and the rounding residue goes to the largest entry so the result
/// sums to exactly 100.0. A zero total returns the shares with 0 percentages.
pub fn group_small_shares(
    shares: &[CategoryShare],
    threshold: f64,
    other_label: &str,
) -> Vec<CategoryShare> {
    let total: Decimal = shares.iter().map(|s| s.value).sum();
    if total.is_zero() {
        return shares
            .iter()
            .map(|s| CategoryShare { percentage: 0.0, ..s.clone() })
            .collect();
    }

    let threshold = Decimal::from_f64_retain(threshold).unwrap_or(Decimal::ZERO);
    let mut kept: Vec<(String, Decimal)> = Vec::new();
    let mut other = Decimal::ZERO;
    let mut folded = 0usize;
    for share in shares {
        if share.value / total < threshold {
            other += share.value;
            folded += 1;
        } else {
            kept.push((share.name.clone(), share.value));
        }
    }
    if folded > 0 {
        kept.push((other_label.to_string(), other));
    }

    let mut rounded: Vec<Decimal> = kept
        .iter()
        .map(|(_, value)| {
            percent_of(*value, total)
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        })
        .collect();
    let residue = Decimal::ONE_HUNDRED - rounded.iter().copied().sum::<Decimal>();
    let largest = kept
        .iter()
        .enumerate()
        .max_by(|(i, a), (j, b)| a.1.cmp(&b.1).then_with(|| j.cmp(i)))
        .map(|(i, _)| i);
    if let Some(i) = largest {
        rounded[i] += residue;
    }

    kept.into_iter()
        .zip(rounded)
        .map(|((name, value), pct)| CategoryShare {
            name,
            value,
            percentage: to_percentage(pct),
        })
        .collect()
}

/// Level-2 category compared across two years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub current: Decimal,
    pub previous: Decimal,
    /// `None` when the previous value is 0
    pub change_percentage: Option<f64>,
}

/// Level-2 categories of two forests matched by name, largest current first
pub fn year_comparison(
    current: &[AggregatedNode],
    previous: &[AggregatedNode],
    top_n: usize,
) -> Vec<ComparisonEntry> {
    let mut by_name: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for node in level2_nodes(current) {
        by_name.entry(node.category.name.clone()).or_default().0 += node.total;
    }
    for node in level2_nodes(previous) {
        by_name.entry(node.category.name.clone()).or_default().1 += node.total;
    }

    let mut entries: Vec<ComparisonEntry> = by_name
        .into_iter()
        .map(|(name, (current, previous))| ComparisonEntry {
            change_percentage: (!previous.is_zero())
                .then(|| to_percentage((current - previous) / previous * Decimal::ONE_HUNDRED)),
            name,
            current,
            previous,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.current
            .cmp(&a.current)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    entries.truncate(top_n);
    entries
}

/// Financing receipts against disbursements
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancingSummary {
    pub penerimaan: Decimal,
    pub pengeluaran: Decimal,
    /// Penerimaan minus pengeluaran
    pub netto: Decimal,
    /// Surplus/deficit plus netto financing
    pub silpa: Decimal,
}

fn is_receipt(category: &Category) -> bool {
    category.name.to_lowercase().contains("penerimaan")
        || category.code.as_deref().is_some_and(|c| c.starts_with("6.1"))
}

fn is_disbursement(category: &Category) -> bool {
    category.name.to_lowercase().contains("pengeluaran")
        || category.code.as_deref().is_some_and(|c| c.starts_with("6.2"))
}

/// Split a Pembiayaan forest into receipts and disbursements
pub fn financing_summary(forest: &[AggregatedNode], surplus_defisit: Decimal) -> FinancingSummary {
    let mut summary = FinancingSummary::default();
    for node in level2_nodes(forest) {
        if is_receipt(&node.category) {
            summary.penerimaan += node.total;
        } else if is_disbursement(&node.category) {
            summary.pengeluaran += node.total;
        }
    }
    summary.netto = summary.penerimaan - summary.pengeluaran;
    summary.silpa = surplus_defisit + summary.netto;
    summary
}

/// Total and level-2 breakdown of one kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindSummary {
    pub kind: BudgetKind,
    pub total: Decimal,
    pub categories: Vec<CategoryShare>,
}

impl KindSummary {
    fn from_forest(kind: BudgetKind, forest: &[AggregatedNode]) -> Self {
        Self {
            kind,
            total: forest_total(forest),
            categories: level2_shares(forest),
        }
    }
}

/// Budget realisation overview for one fiscal year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    pub fiscal_year: i32,
    pub pendapatan: KindSummary,
    pub belanja: KindSummary,
    pub pembiayaan: KindSummary,
    /// Pendapatan minus belanja
    pub surplus_defisit: Decimal,
    pub financing: FinancingSummary,
}

/// Aggregate revenue, expenditure and financing for `fiscal_year`
pub fn annual_summary(
    fiscal_year: i32,
    transactions: &[Transaction],
    categories: &[Category],
    config: &AggregationConfig,
) -> CoreResult<AnnualSummary> {
    let forest_of = |kind: BudgetKind| {
        HierarchyAggregator::from_config(kind, config)
            .with_fiscal_year(Some(fiscal_year))
            .aggregate(transactions, categories)
    };

    let pendapatan = forest_of(BudgetKind::Pendapatan)?;
    let belanja = forest_of(BudgetKind::Belanja)?;
    let pembiayaan = forest_of(BudgetKind::Pembiayaan)?;

    let surplus_defisit = forest_total(&pendapatan) - forest_total(&belanja);
    let financing = financing_summary(&pembiayaan, surplus_defisit);

    Ok(AnnualSummary {
        fiscal_year,
        pendapatan: KindSummary::from_forest(BudgetKind::Pendapatan, &pendapatan),
        belanja: KindSummary::from_forest(BudgetKind::Belanja, &belanja),
        pembiayaan: KindSummary::from_forest(BudgetKind::Pembiayaan, &pembiayaan),
        surplus_defisit,
        financing,
    })
}
