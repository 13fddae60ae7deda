//! Three-level category hierarchy aggregation
//!
//! Turns a flat list of transactions and a flat list of categories into an
//! ordered forest of [`AggregatedNode`]s for one [`BudgetKind`]:
//!
//! 1. categories of the kind are indexed by id;
//! 2. transactions are grouped by their category id;
//! 3. every posted category and its resolvable ancestors become nodes;
//! 4. totals are summed bottom-up;
//! 5. siblings are sorted at every level.
//!
//! A parent link only resolves when the parent exists in the same kind and sits
//! exactly one level higher. Levels therefore strictly decrease along any
//! resolved chain, so cycles and self references cannot be followed and at most
//! two links are walked per category. Unresolved links promote the node to a
//! root.

use apbd_config::{AggregationConfig, SiblingOrder};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::collation::{compare_codes, compare_names};
use crate::error::{CoreError, CoreResult};
use crate::models::{AggregatedNode, Category, Transaction};
use crate::types::{BudgetKind, CategoryId};

/// Deepest category level in the chart of accounts
pub const MAX_LEVEL: u8 = 3;

/// Categories of one kind, indexed by id
struct CategoryIndex<'a> {
    by_id: HashMap<CategoryId, &'a Category>,
}

impl<'a> CategoryIndex<'a> {
    fn build(categories: &'a [Category], kind: BudgetKind) -> CoreResult<Self> {
        let mut by_id: HashMap<CategoryId, &'a Category> = HashMap::new();

        for category in categories.iter().filter(|c| c.kind == kind) {
            if category.level == 0 || category.level > MAX_LEVEL {
                return Err(CoreError::ValidationError {
                    message: format!(
                        "Category {} ({}) has level {}, expected 1 to {}",
                        category.id, category.name, category.level, MAX_LEVEL
                    ),
                });
            }

            match by_id.entry(category.id) {
                Entry::Vacant(slot) => {
                    slot.insert(category);
                }
                Entry::Occupied(existing) => {
                    if *existing.get() != category {
                        return Err(CoreError::ValidationError {
                            message: format!(
                                "Conflicting records for category id {}",
                                category.id
                            ),
                        });
                    }
                }
            }
        }

        Ok(Self { by_id })
    }

    fn get(&self, id: CategoryId) -> Option<&'a Category> {
        self.by_id.get(&id).copied()
    }

    /// Parent id, only when it exists one level up
    fn parent_of(&self, id: CategoryId) -> Option<CategoryId> {
        let category = self.get(id)?;
        let parent_id = category.parent_id?;
        if parent_id == category.id {
            return None;
        }
        let parent = self.get(parent_id)?;
        (parent.level + 1 == category.level).then_some(parent_id)
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// Builds aggregated category forests for one budget kind
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyAggregator {
    kind: BudgetKind,
    sibling_order: SiblingOrder,
    fiscal_year: Option<i32>,
    name_filter: Option<String>,
}

impl HierarchyAggregator {
    /// Aggregator with name ordering, no year restriction and no search filter
    pub fn new(kind: BudgetKind) -> Self {
        Self {
            kind,
            sibling_order: SiblingOrder::Name,
            fiscal_year: None,
            name_filter: None,
        }
    }

    /// Aggregator configured from the `aggregation` section
    pub fn from_config(kind: BudgetKind, config: &AggregationConfig) -> Self {
        Self::new(kind).with_sibling_order(config.sibling_order)
    }

    pub fn with_sibling_order(mut self, order: SiblingOrder) -> Self {
        self.sibling_order = order;
        self
    }

    /// Only transactions of this fiscal year participate
    pub fn with_fiscal_year(mut self, fiscal_year: Option<i32>) -> Self {
        self.fiscal_year = fiscal_year;
        self
    }

    /// Case-insensitive substring match on the posted category's name.
    /// Blank terms disable the filter.
    pub fn with_name_filter(mut self, term: Option<&str>) -> Self {
        self.name_filter = term
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn kind(&self) -> BudgetKind {
        self.kind
    }

    /// Aggregate `transactions` over `categories` into a sorted forest.
    ///
    /// Fails only on contract violations: a negative amount, a category level
    /// outside 1..=3, or conflicting category records sharing one id.
    pub fn aggregate(
        &self,
        transactions: &[Transaction],
        categories: &[Category],
    ) -> CoreResult<Vec<AggregatedNode>> {
        let negative = transactions
            .iter()
            .find(|t| t.amount.is_sign_negative() && !t.amount.is_zero());
        if let Some(txn) = negative {
            return Err(CoreError::ValidationError {
                message: format!(
                    "Transaction {} has negative amount {}",
                    txn.id, txn.amount
                ),
            });
        }

        let index = CategoryIndex::build(categories, self.kind)?;

        let known: HashSet<CategoryId> = categories.iter().map(|c| c.id).collect();
        let mut postings: BTreeMap<CategoryId, Vec<&Transaction>> = BTreeMap::new();
        let mut unknown = 0usize;
        for txn in transactions {
            if self.fiscal_year.is_some_and(|year| txn.fiscal_year != year) {
                continue;
            }
            let Some(category) = index.get(txn.category_id) else {
                if !known.contains(&txn.category_id) {
                    unknown += 1;
                }
                continue;
            };
            if !self.matches_filter(category) {
                continue;
            }
            postings.entry(txn.category_id).or_default().push(txn);
        }

        if unknown > 0 {
            log::warn!(
                target: "apbd::aggregate",
                "Dropped {} transactions referencing unknown categories",
                unknown
            );
        }

        // Posted categories plus every resolvable ancestor
        let mut active: BTreeSet<CategoryId> = BTreeSet::new();
        for &id in postings.keys() {
            let mut current = Some(id);
            while let Some(category_id) = current {
                if !active.insert(category_id) {
                    break;
                }
                current = index.parent_of(category_id);
            }
        }

        let mut children: BTreeMap<CategoryId, Vec<CategoryId>> = BTreeMap::new();
        let mut roots: Vec<CategoryId> = Vec::new();
        for &id in &active {
            match index.parent_of(id) {
                Some(parent_id) => children.entry(parent_id).or_default().push(id),
                None => {
                    if let Some(category) = index.get(id).filter(|c| c.level > 1) {
                        log::warn!(
                            target: "apbd::aggregate",
                            "Promoting level-{} category {} ({}) to root: \
                             parent {:?} does not resolve",
                            category.level,
                            category.id,
                            category.name,
                            category.parent_id
                        );
                    }
                    roots.push(id);
                }
            }
        }

        let mut forest: Vec<AggregatedNode> = roots
            .into_iter()
            .filter_map(|id| self.build_node(id, &index, &children, &postings))
            .collect();
        forest.sort_by(|a, b| self.compare_siblings(&a.category, &b.category));

        log::debug!(
            target: "apbd::aggregate",
            "Aggregated {}: {} categories, {} posted, {} nodes, {} roots",
            self.kind,
            index.len(),
            postings.len(),
            active.len(),
            forest.len()
        );

        Ok(forest)
    }

    /// Post-order construction; depth is bounded by the level chain.
    fn build_node(
        &self,
        id: CategoryId,
        index: &CategoryIndex<'_>,
        children: &BTreeMap<CategoryId, Vec<CategoryId>>,
        postings: &BTreeMap<CategoryId, Vec<&Transaction>>,
    ) -> Option<AggregatedNode> {
        let category = index.get(id)?.clone();

        let mut direct_transactions: Vec<Transaction> = postings
            .get(&id)
            .map(|txns| txns.iter().map(|t| (*t).clone()).collect())
            .unwrap_or_default();
        direct_transactions.sort();

        let mut child_nodes: Vec<AggregatedNode> = children
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|&child| self.build_node(child, index, children, postings))
                    .collect()
            })
            .unwrap_or_default();
        child_nodes.sort_by(|a, b| self.compare_siblings(&a.category, &b.category));

        let total = direct_transactions.iter().map(|t| t.amount).sum::<Decimal>()
            + child_nodes.iter().map(|c| c.total).sum::<Decimal>();

        Some(AggregatedNode {
            category,
            total,
            children: child_nodes,
            direct_transactions,
        })
    }

    fn matches_filter(&self, category: &Category) -> bool {
        match &self.name_filter {
            Some(term) => category.name.to_lowercase().contains(term.as_str()),
            None => true,
        }
    }

    fn compare_siblings(&self, a: &Category, b: &Category) -> Ordering {
        let primary = match self.sibling_order {
            SiblingOrder::Name => Ordering::Equal,
            SiblingOrder::Code => compare_codes(a.code.as_deref(), b.code.as_deref()),
            SiblingOrder::Id => a.id.cmp(&b.id),
        };
        primary
            .then_with(|| compare_names(&a.name, &b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Aggregate one kind with default options
pub fn aggregate(
    transactions: &[Transaction],
    categories: &[Category],
    kind: BudgetKind,
) -> CoreResult<Vec<AggregatedNode>> {
    HierarchyAggregator::new(kind).aggregate(transactions, categories)
}

/// Aggregate with the kind given as its backend spelling (`jenis`)
pub fn aggregate_by_kind_name(
    transactions: &[Transaction],
    categories: &[Category],
    kind: &str,
) -> CoreResult<Vec<AggregatedNode>> {
    aggregate(transactions, categories, kind.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const P: BudgetKind = BudgetKind::Pendapatan;

    fn txn(id: i64, category_id: i64, amount: Decimal) -> Transaction {
        Transaction::new(id, category_id, amount, 2024)
    }

    /// Pendapatan Asli Daerah > Pajak > Pajak Hotel / Pajak Restoran,
    /// plus Retribusi under the same root.
    fn chart() -> Vec<Category> {
        vec![
            Category::new(1, "Pendapatan Asli Daerah", 1, P).with_code("4.1"),
            Category::new(2, "Pajak", 2, P).with_parent(1).with_code("4.1.1"),
            Category::new(3, "Pajak Hotel", 3, P).with_parent(2).with_code("4.1.1.01"),
            Category::new(4, "Pajak Restoran", 3, P).with_parent(2).with_code("4.1.1.02"),
            Category::new(5, "Retribusi", 2, P).with_parent(1).with_code("4.1.2"),
            Category::new(6, "Retribusi Parkir", 3, P).with_parent(5).with_code("4.1.2.01"),
        ]
    }

    fn names(nodes: &[AggregatedNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.category.name.as_str()).collect()
    }

    fn all_totals_consistent(node: &AggregatedNode) -> bool {
        let children: Decimal = node.children.iter().map(|c| c.total).sum();
        let expected = node.direct_total() + children;
        node.total == expected && node.children.iter().all(all_totals_consistent)
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], &[], P).unwrap().is_empty());
        assert!(aggregate(&[], &chart(), P).unwrap().is_empty());
    }

    #[test]
    fn test_single_leaf_chain() {
        let categories = vec![
            Category::new(1, "Pendapatan Asli Daerah", 1, P),
            Category::new(2, "Pajak", 2, P).with_parent(1),
            Category::new(3, "Pajak Hotel", 3, P).with_parent(2),
        ];
        let forest = aggregate(&[txn(100, 3, dec!(500000))], &categories, P).unwrap();

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.category.id, 1);
        assert_eq!(root.total, dec!(500000));
        assert!(root.direct_transactions.is_empty());

        assert_eq!(root.children.len(), 1);
        let sub = &root.children[0];
        assert_eq!(sub.category.id, 2);
        assert_eq!(sub.total, dec!(500000));

        assert_eq!(sub.children.len(), 1);
        let leaf = &sub.children[0];
        assert_eq!(leaf.category.id, 3);
        assert_eq!(leaf.total, dec!(500000));
        assert_eq!(leaf.transaction_ids(), vec![100]);
        assert!(leaf.children.is_empty());
    }

    #[test]
    fn test_orphan_level2_promoted() {
        let categories = vec![Category::new(9, "Penerimaan Pembiayaan", 2, P).with_parent(404)];
        let forest = aggregate(&[txn(1, 9, dec!(1000))], &categories, P).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, 9);
        assert_eq!(forest[0].total, dec!(1000));
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_multi_leaf_sum() {
        let forest = aggregate(
            &[txn(1, 3, dec!(300)), txn(2, 4, dec!(700))],
            &chart(),
            P,
        )
        .unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].total, dec!(1000));
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].total, dec!(1000));
        assert_eq!(names(&forest[0].children[0].children), vec!["Pajak Hotel", "Pajak Restoran"]);
    }

    #[test]
    fn test_no_double_counting() {
        let transactions = vec![
            txn(1, 3, dec!(125000.50)),
            txn(2, 3, dec!(74999.50)),
            txn(3, 4, dec!(1000)),
            txn(4, 6, dec!(2500)),
            txn(5, 2, dec!(10)),
            txn(6, 1, dec!(1)),
        ];
        let forest = aggregate(&transactions, &chart(), P).unwrap();

        let roots_total: Decimal = forest.iter().map(|n| n.total).sum();
        let input_total: Decimal = transactions.iter().map(|t| t.amount).sum();
        assert_eq!(roots_total, input_total);
        assert!(forest.iter().all(all_totals_consistent));
    }

    #[test]
    fn test_direct_postings_on_internal_nodes() {
        let forest = aggregate(
            &[txn(1, 3, dec!(300)), txn(2, 2, dec!(50)), txn(3, 1, dec!(5))],
            &chart(),
            P,
        )
        .unwrap();

        let root = &forest[0];
        assert_eq!(root.direct_total(), dec!(5));
        assert_eq!(root.total, dec!(355));
        let pajak = root.find(2).unwrap();
        assert_eq!(pajak.transaction_ids(), vec![2]);
        assert_eq!(pajak.total, dec!(350));
    }

    #[test]
    fn test_categories_without_transactions_produce_no_nodes() {
        let forest = aggregate(&[txn(1, 6, dec!(10))], &chart(), P).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(names(&forest[0].children), vec!["Retribusi"]);
        assert!(forest[0].find(2).is_none());
        assert!(forest[0].find(3).is_none());
    }

    #[test]
    fn test_zero_amount_still_creates_node() {
        let forest = aggregate(&[txn(1, 4, dec!(0))], &chart(), P).unwrap();
        let leaf = forest[0].find(4).unwrap();
        assert_eq!(leaf.total, dec!(0));
        assert_eq!(leaf.transaction_ids(), vec![1]);
    }

    #[test]
    fn test_ancestor_synthesis_from_leaf() {
        let forest = aggregate(&[txn(1, 6, dec!(42))], &chart(), P).unwrap();

        let root = &forest[0];
        assert_eq!(root.category.id, 1);
        assert!(root.direct_transactions.is_empty());
        let retribusi = &root.children[0];
        assert_eq!(retribusi.category.id, 5);
        assert!(retribusi.direct_transactions.is_empty());
        assert_eq!(retribusi.total, dec!(42));
    }

    #[test]
    fn test_orphan_level3_promoted() {
        let categories = vec![Category::new(30, "Pajak Reklame", 3, P).with_parent(999)];
        let forest = aggregate(&[txn(1, 30, dec!(15))], &categories, P).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, 30);
        assert_eq!(forest[0].total, dec!(15));
    }

    #[test]
    fn test_level3_under_orphan_level2() {
        let categories = vec![
            Category::new(9, "Pajak", 2, P).with_parent(404),
            Category::new(10, "Pajak Hiburan", 3, P).with_parent(9),
        ];
        let forest = aggregate(&[txn(1, 10, dec!(7))], &categories, P).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, 9);
        assert_eq!(forest[0].total, dec!(7));
        assert_eq!(forest[0].children[0].category.id, 10);
    }

    #[test]
    fn test_self_reference_and_cycle_are_promoted() {
        let categories = vec![
            Category::new(1, "Siklus A", 2, P).with_parent(2),
            Category::new(2, "Siklus B", 2, P).with_parent(1),
            Category::new(3, "Diri Sendiri", 3, P).with_parent(3),
        ];
        let forest = aggregate(
            &[txn(1, 1, dec!(1)), txn(2, 2, dec!(2)), txn(3, 3, dec!(3))],
            &categories,
            P,
        )
        .unwrap();

        assert_eq!(names(&forest), vec!["Diri Sendiri", "Siklus A", "Siklus B"]);
        assert!(forest.iter().all(|n| n.children.is_empty()));
        assert_eq!(forest.iter().map(|n| n.total).sum::<Decimal>(), dec!(6));
    }

    #[test]
    fn test_wrong_level_parent_is_promoted() {
        let categories = vec![
            Category::new(1, "Pendapatan", 1, P),
            // Skips level 2
            Category::new(3, "Pajak Hotel", 3, P).with_parent(1),
            // Level 1 with a parent pointer
            Category::new(4, "Lain-lain", 1, P).with_parent(1),
        ];
        let forest =
            aggregate(&[txn(1, 3, dec!(10)), txn(2, 4, dec!(20))], &categories, P).unwrap();

        assert_eq!(names(&forest), vec!["Lain-lain", "Pajak Hotel"]);
    }

    #[test]
    fn test_parent_of_other_kind_is_promoted() {
        let categories = vec![
            Category::new(1, "Belanja Operasi", 1, BudgetKind::Belanja),
            Category::new(2, "Pajak", 2, P).with_parent(1),
        ];
        let forest = aggregate(&[txn(1, 2, dec!(10))], &categories, P).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, 2);
    }

    #[test]
    fn test_unknown_category_ignored() {
        let forest = aggregate(&[txn(1, 3, dec!(10)), txn(2, 777, dec!(99))], &chart(), P).unwrap();
        assert_eq!(forest[0].total, dec!(10));
    }

    #[test]
    fn test_kind_partition() {
        let mut categories = chart();
        categories.push(Category::new(50, "Belanja Operasi", 1, BudgetKind::Belanja));
        let transactions = vec![txn(1, 3, dec!(10)), txn(2, 50, dec!(20))];

        let pendapatan = aggregate(&transactions, &categories, P).unwrap();
        let belanja = aggregate(&transactions, &categories, BudgetKind::Belanja).unwrap();
        let pembiayaan = aggregate(&transactions, &categories, BudgetKind::Pembiayaan).unwrap();

        assert_eq!(pendapatan[0].total, dec!(10));
        assert_eq!(names(&belanja), vec!["Belanja Operasi"]);
        assert!(pembiayaan.is_empty());
    }

    #[test]
    fn test_sibling_ordering_by_name() {
        let categories = vec![
            Category::new(1, "Pendapatan Transfer", 1, P),
            Category::new(2, "pendapatan asli daerah", 1, P),
            Category::new(3, "Lain-lain Pendapatan", 1, P),
            Category::new(11, "Zakat", 2, P).with_parent(1),
            Category::new(12, "Dana Bagi Hasil", 2, P).with_parent(1),
            Category::new(13, "dana alokasi umum", 2, P).with_parent(1),
        ];
        let transactions: Vec<Transaction> = [1, 2, 3, 11, 12, 13]
            .iter()
            .map(|&id| txn(id * 10, id, dec!(1)))
            .collect();
        let forest = aggregate(&transactions, &categories, P).unwrap();

        assert_eq!(
            names(&forest),
            vec!["Lain-lain Pendapatan", "pendapatan asli daerah", "Pendapatan Transfer"]
        );
        let transfer = forest.iter().find(|n| n.category.id == 1).unwrap();
        assert_eq!(
            names(&transfer.children),
            vec!["dana alokasi umum", "Dana Bagi Hasil", "Zakat"]
        );
    }

    #[test]
    fn test_sibling_ordering_by_code_and_id() {
        let categories = vec![
            Category::new(1, "Root", 1, P),
            Category::new(7, "Alpha", 2, P).with_parent(1).with_code("4.1.10"),
            Category::new(5, "Beta", 2, P).with_parent(1).with_code("4.1.2"),
            Category::new(6, "Gamma", 2, P).with_parent(1),
        ];
        let transactions = vec![txn(1, 7, dec!(1)), txn(2, 5, dec!(1)), txn(3, 6, dec!(1))];

        let by_code = HierarchyAggregator::new(P)
            .with_sibling_order(SiblingOrder::Code)
            .aggregate(&transactions, &categories)
            .unwrap();
        assert_eq!(names(&by_code[0].children), vec!["Beta", "Alpha", "Gamma"]);

        let by_id = HierarchyAggregator::new(P)
            .with_sibling_order(SiblingOrder::Id)
            .aggregate(&transactions, &categories)
            .unwrap();
        assert_eq!(names(&by_id[0].children), vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_idempotent() {
        let transactions = vec![txn(1, 3, dec!(300)), txn(2, 4, dec!(700)), txn(3, 6, dec!(5))];
        let categories = chart();
        let first = aggregate(&transactions, &categories, P).unwrap();
        let second = aggregate(&transactions, &categories, P).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_order_invariance() {
        let transactions = vec![
            txn(1, 3, dec!(300)),
            txn(2, 4, dec!(700)),
            txn(3, 6, dec!(5)),
            txn(4, 3, dec!(1)),
            txn(5, 1, dec!(9)),
        ];
        let categories = chart();
        let expected = aggregate(&transactions, &categories, P).unwrap();

        for shift in 1..transactions.len() {
            let mut t = transactions.clone();
            t.rotate_left(shift);
            let mut c = categories.clone();
            c.rotate_right(shift % categories.len());
            assert_eq!(aggregate(&t, &c, P).unwrap(), expected);

            t.reverse();
            c.reverse();
            assert_eq!(aggregate(&t, &c, P).unwrap(), expected);
        }
    }

    #[test]
    fn test_direct_transactions_sorted_by_id() {
        let forest = aggregate(
            &[txn(30, 3, dec!(1)), txn(10, 3, dec!(1)), txn(20, 3, dec!(1))],
            &chart(),
            P,
        )
        .unwrap();
        assert_eq!(forest[0].find(3).unwrap().transaction_ids(), vec![10, 20, 30]);
    }

    #[test]
    fn test_large_amounts_keep_precision() {
        let forest = aggregate(
            &[
                txn(1, 3, dec!(9999999999999.99)),
                txn(2, 4, dec!(0.01)),
                txn(3, 6, dec!(1234567890123.45)),
            ],
            &chart(),
            P,
        )
        .unwrap();
        assert_eq!(forest[0].total, dec!(11234567890123.45));
        assert_eq!(forest[0].find(2).unwrap().total, dec!(10000000000000.00));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = aggregate(&[txn(1, 3, dec!(-1))], &chart(), P).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_negative_zero_accepted() {
        let forest = aggregate(&[txn(1, 3, dec!(-0))], &chart(), P).unwrap();
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let categories = vec![Category::new(1, "Terlalu Dalam", 4, P)];
        assert!(matches!(
            aggregate(&[], &categories, P),
            Err(CoreError::ValidationError { .. })
        ));

        // Out-of-kind categories are not inspected
        let categories = vec![Category::new(1, "Terlalu Dalam", 0, BudgetKind::Belanja)];
        assert!(aggregate(&[], &categories, P).is_ok());
    }

    #[test]
    fn test_duplicate_category_records() {
        let mut categories = chart();
        categories.push(chart()[1].clone());
        assert!(aggregate(&[txn(1, 3, dec!(1))], &categories, P).is_ok());

        categories.push(Category::new(2, "Pajak Daerah", 2, P).with_parent(1));
        assert!(matches!(
            aggregate(&[txn(1, 3, dec!(1))], &categories, P),
            Err(CoreError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_name_rejected() {
        assert!(aggregate_by_kind_name(&[], &[], "pendapatan").unwrap().is_empty());
        assert!(matches!(
            aggregate_by_kind_name(&[], &[], "Retribusi"),
            Err(CoreError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_fiscal_year_filter() {
        let transactions = vec![
            Transaction::new(1, 3, dec!(100), 2023),
            Transaction::new(2, 3, dec!(200), 2024),
        ];
        let forest = HierarchyAggregator::new(P)
            .with_fiscal_year(Some(2024))
            .aggregate(&transactions, &chart())
            .unwrap();
        assert_eq!(forest[0].total, dec!(200));

        let none = HierarchyAggregator::new(P)
            .with_fiscal_year(Some(2030))
            .aggregate(&transactions, &chart())
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_name_filter_keeps_ancestors() {
        let transactions = vec![txn(1, 3, dec!(100)), txn(2, 4, dec!(200)), txn(3, 6, dec!(5))];
        let forest = HierarchyAggregator::new(P)
            .with_name_filter(Some("  HOTEL "))
            .aggregate(&transactions, &chart())
            .unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].total, dec!(100));
        assert_eq!(names(&forest[0].children), vec!["Pajak"]);
        assert_eq!(names(&forest[0].children[0].children), vec!["Pajak Hotel"]);

        let unfiltered = HierarchyAggregator::new(P)
            .with_name_filter(Some("   "))
            .aggregate(&transactions, &chart())
            .unwrap();
        assert_eq!(unfiltered[0].total, dec!(305));
    }

    #[test]
    fn test_from_config() {
        let config = AggregationConfig { sibling_order: SiblingOrder::Id };
        let aggregator = HierarchyAggregator::from_config(BudgetKind::Pembiayaan, &config);
        assert_eq!(aggregator.kind(), BudgetKind::Pembiayaan);
        assert_eq!(
            aggregator,
            HierarchyAggregator::new(BudgetKind::Pembiayaan).with_sibling_order(SiblingOrder::Id)
        );
    }
}
