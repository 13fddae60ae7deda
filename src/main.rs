//! APBD budget hierarchy command line entry point

use anyhow::Context;
use apbd_config::error::{ConfigErrorDetails, ConfigErrorSeverity, ConfigResult};
use apbd_config::Config;
use apbd_core::{
    annual_summary, flatten_rows, group_small_shares, year_comparison, AggregatedNode,
    AnnualSummary, BudgetDataset, BudgetKind, ComparisonEntry, CoreError, CoreResult,
    DefaultErrorLogger, ErrorContext, ErrorLogger, HierarchyAggregator,
};
use apbd_utils::{format_percentage, format_rupiah_compact, NumberFormat};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "apbd")]
#[command(version = "0.1.0")]
#[command(about = "Aggregate APBD realisation data into category hierarchies", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Exported JSON payload, overrides data.input
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Budget kind: Pendapatan, Belanja, Pembelanjaan or Pembiayaan
    #[arg(short, long)]
    kind: Option<String>,
    /// Only transactions of this fiscal year
    #[arg(short, long)]
    year: Option<i32>,
    /// Case-insensitive match on the posted category name
    #[arg(short, long)]
    search: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the aggregated category tree
    Tree(ViewArgs),
    /// Print the flattened, indented table
    Rows(ViewArgs),
    /// Print the annual revenue, expenditure and financing summary
    Summary {
        #[arg(short, long)]
        year: i32,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SummaryOutput {
    #[serde(flatten)]
    summary: AnnualSummary,
    revenue_comparison: Vec<ComparisonEntry>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, config_warning) = config_or_default(Config::load(args.config.clone()))
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else {
        env_logger::Builder::new()
            .parse_filters(&config.logging.level)
            .init();
    }

    if let Some(details) = config_warning {
        log::warn!("{}", details);
    }

    let format = NumberFormat {
        symbol: config.currency.symbol.clone(),
        thousands_separator: config.currency.thousands_separator.clone(),
        decimal_separator: config.currency.decimal_separator.clone(),
        decimal_places: config.currency.decimal_places,
    };

    match args.command {
        Command::Tree(view) => {
            let (forest, _) = load_forest(&config, &view)?;
            if view.json {
                println!("{}", serde_json::to_string_pretty(&forest)?);
            } else {
                for root in &forest {
                    print_tree(root, 0, &format);
                }
            }
        }
        Command::Rows(view) => {
            let (forest, kind) = load_forest(&config, &view)?;
            let rows = flatten_rows(&forest);
            if view.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<60} {:<14} {:>5} {:>24}", kind.as_str(), "Kode", "Level", "Total");
                for row in &rows {
                    let name = format!("{}{}", "  ".repeat(row.depth), row.name);
                    println!(
                        "{:<60} {:<14} {:>5} {:>24}",
                        name,
                        row.code,
                        row.level,
                        format.currency(row.total)
                    );
                }
            }
        }
        Command::Summary { year, input, json } => {
            let dataset = load_dataset(input.as_deref().unwrap_or(&config.data.input))?;
            let context =
                ErrorContext::new("annual_summary".to_string()).with_fiscal_year(Some(year));

            let summary = annual_summary(
                year,
                &dataset.transactions,
                &dataset.categories,
                &config.aggregation,
            )
            .map_err(|err| report(err, &context))?;
            let revenue_comparison = revenue_comparison(&config, &dataset, year)
                .map_err(|err| report(err, &context))?;

            if json {
                let output = SummaryOutput { summary, revenue_comparison };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_summary(&config, &summary, &revenue_comparison, &format);
            }
        }
    }

    Ok(())
}

/// Recoverable config errors fall back to defaults and hand back their
/// details for logging once the logger is up.
fn config_or_default(
    loaded: ConfigResult<Config>,
) -> anyhow::Result<(Config, Option<ConfigErrorDetails>)> {
    match loaded {
        Ok(config) => Ok((config, None)),
        Err(err) => match err.severity() {
            ConfigErrorSeverity::Warning => Ok((Config::default(), Some(err.to_details()))),
            ConfigErrorSeverity::Error => Err(anyhow::anyhow!("{}", err.to_details())),
        },
    }
}

fn report(err: CoreError, context: &ErrorContext) -> anyhow::Error {
    DefaultErrorLogger.log_error(&err, context);
    anyhow::Error::new(err).context(format!("{} failed", context.operation))
}

fn load_dataset(path: &Path) -> anyhow::Result<BudgetDataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let context = ErrorContext::new(format!("load {}", path.display()));
    let dataset = BudgetDataset::from_json(&content).map_err(|err| report(err, &context))?;
    log::info!(
        "Loaded {} transactions and {} categories from {}",
        dataset.transactions.len(),
        dataset.categories.len(),
        path.display()
    );
    Ok(dataset)
}

fn load_forest(
    config: &Config,
    view: &ViewArgs,
) -> anyhow::Result<(Vec<AggregatedNode>, BudgetKind)> {
    let kind_name = view.kind.as_deref().unwrap_or(&config.data.default_kind);
    let kind: BudgetKind = kind_name.parse()?;

    let dataset = load_dataset(view.input.as_deref().unwrap_or(&config.data.input))?;
    let context = ErrorContext::new("aggregate".to_string())
        .with_kind(kind)
        .with_fiscal_year(view.year);

    let forest = HierarchyAggregator::from_config(kind, &config.aggregation)
        .with_fiscal_year(view.year)
        .with_name_filter(view.search.as_deref())
        .aggregate(&dataset.transactions, &dataset.categories)
        .map_err(|err| report(err, &context))?;

    if forest.is_empty() {
        DefaultErrorLogger.log_warning("No transactions matched", &context);
    }

    Ok((forest, kind))
}

/// Pendapatan level-2 categories against the previous fiscal year, when present
fn revenue_comparison(
    config: &Config,
    dataset: &BudgetDataset,
    year: i32,
) -> CoreResult<Vec<ComparisonEntry>> {
    if !dataset.fiscal_years().contains(&(year - 1)) {
        return Ok(Vec::new());
    }
    let forest_for = |fiscal_year: i32| {
        HierarchyAggregator::from_config(BudgetKind::Pendapatan, &config.aggregation)
            .with_fiscal_year(Some(fiscal_year))
            .aggregate(&dataset.transactions, &dataset.categories)
    };
    Ok(year_comparison(
        &forest_for(year)?,
        &forest_for(year - 1)?,
        config.charts.top_items_count,
    ))
}

fn print_tree(node: &AggregatedNode, depth: usize, format: &NumberFormat) {
    println!(
        "{}{} {} {}",
        "  ".repeat(depth),
        node.category.code.as_deref().unwrap_or("-"),
        node.category.name,
        format.currency(node.total)
    );
    for child in &node.children {
        print_tree(child, depth + 1, format);
    }
}

fn print_summary(
    config: &Config,
    summary: &AnnualSummary,
    comparison: &[ComparisonEntry],
    format: &NumberFormat,
) {
    println!("APBD {}", summary.fiscal_year);
    for kind in [&summary.pendapatan, &summary.belanja, &summary.pembiayaan] {
        println!("  {:<16} {:>24}", kind.kind.as_str(), format.currency(kind.total));
    }
    let totals = [
        ("Surplus/Defisit", summary.surplus_defisit),
        ("Pembiayaan Netto", summary.financing.netto),
        ("SILPA", summary.financing.silpa),
    ];
    for (label, amount) in totals {
        println!("  {:<16} {:>24}", label, format.currency(amount));
    }

    let mut belanja = summary.belanja.categories.clone();
    belanja.sort_by(|a, b| b.value.cmp(&a.value));
    let breakdown = group_small_shares(
        &belanja,
        config.charts.small_share_threshold,
        &config.charts.other_label,
    );
    if !breakdown.is_empty() {
        println!();
        println!("Komposisi Belanja");
        for share in breakdown.iter().take(config.charts.top_items_count) {
            println!(
                "  {:<48} {:>12} {:>7}",
                share.name,
                format_rupiah_compact(share.value),
                format_percentage(share.percentage)
            );
        }
    }

    if !comparison.is_empty() {
        println!();
        println!("Pendapatan {} vs {}", summary.fiscal_year, summary.fiscal_year - 1);
        for entry in comparison {
            let change = entry
                .change_percentage
                .map(format_percentage)
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<48} {:>12} {:>12} {:>8}",
                entry.name,
                format_rupiah_compact(entry.current),
                format_rupiah_compact(entry.previous),
                change
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_tree() {
        let args = Args::try_parse_from([
            "apbd", "tree", "--kind", "Belanja", "--year", "2024", "--search", "pegawai",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        match args.command {
            Command::Tree(view) => {
                assert_eq!(view.kind.as_deref(), Some("Belanja"));
                assert_eq!(view.year, Some(2024));
                assert_eq!(view.search.as_deref(), Some("pegawai"));
                assert!(!view.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let missing = Config::load(PathBuf::from("/nonexistent/apbd/config.yaml"));
        let (config, details) = config_or_default(missing).unwrap();

        assert_eq!(config.charts.top_items_count, 8);
        let details = details.unwrap();
        assert_eq!(details.code, apbd_config::error::ConfigErrorCode::FileNotFound);
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let invalid = Config::from_yaml("charts:\n  top_items_count: 0\n");
        let err = config_or_default(invalid).unwrap_err();
        assert!(err.to_string().contains("charts.top_items_count"));
    }

    #[test]
    fn test_summary_requires_year() {
        assert!(Args::try_parse_from(["apbd", "summary"]).is_err());
        assert!(Args::try_parse_from(["apbd", "summary", "--year", "2024", "--json"]).is_ok());
    }
}
