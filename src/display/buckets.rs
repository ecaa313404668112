//! Bucket display formatting
//!
//! Formats balances, rules and ingestion results for terminal output.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Balances, Money, Rule, RuleSet, SpendBucket, TOTAL};
use crate::services::IngestReport;

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Bucket")]
    bucket: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

#[derive(Tabled)]
struct CreditRow {
    #[tabled(rename = "Bucket")]
    bucket: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "After")]
    after: String,
}

fn signed(amount: Money, symbol: &str) -> String {
    if amount.is_positive() {
        format!("+{}", amount.format_with_symbol(symbol))
    } else {
        amount.format_with_symbol(symbol)
    }
}

/// Balance table: the three buckets then Total
pub fn format_balances(balances: &Balances, symbol: &str) -> String {
    let mut rows: Vec<BalanceRow> = SpendBucket::ALL
        .iter()
        .map(|bucket| BalanceRow {
            bucket: bucket.name().to_string(),
            balance: balances.get(*bucket).format_with_symbol(symbol),
        })
        .collect();
    rows.push(BalanceRow {
        bucket: TOTAL.to_string(),
        balance: balances.total.format_with_symbol(symbol),
    });

    let mut output = Table::new(rows)
        .with(Style::psql())
        .modify(Columns::single(1), Alignment::right())
        .to_string();

    if !balances.is_consistent() {
        output.push_str(&format!(
            "\nWarning: Total {} does not match the bucket sum {}",
            balances.total.format_with_symbol(symbol),
            balances.spendable_sum().format_with_symbol(symbol)
        ));
    }
    output
}

/// Before/change/after table for a planned or committed batch
pub fn format_balance_change(before: &Balances, after: &Balances, symbol: &str) -> String {
    let mut rows: Vec<CreditRow> = SpendBucket::ALL
        .iter()
        .map(|bucket| CreditRow {
            bucket: bucket.name().to_string(),
            before: before.get(*bucket).format_with_symbol(symbol),
            change: signed(after.get(*bucket) - before.get(*bucket), symbol),
            after: after.get(*bucket).format_with_symbol(symbol),
        })
        .collect();
    rows.push(CreditRow {
        bucket: TOTAL.to_string(),
        before: before.total.format_with_symbol(symbol),
        change: signed(after.total - before.total, symbol),
        after: after.total.format_with_symbol(symbol),
    });

    Table::new(rows)
        .with(Style::psql())
        .modify(Columns::new(1..), Alignment::right())
        .to_string()
}

/// One line per rule in evaluation order
pub fn format_rules(rules: &RuleSet) -> String {
    if rules.rules().is_empty() {
        return "No rules configured.".to_string();
    }

    let mut output = String::new();
    for (i, rule) in rules.rules().iter().enumerate() {
        let patterns = if rule.patterns().is_empty() {
            "(no patterns)".to_string()
        } else {
            rule.patterns().join(", ")
        };
        let line = match rule {
            Rule::Split { name, shares, .. } => {
                let split: Vec<String> = shares
                    .iter()
                    .map(|(bucket, fraction)| format!("{} {}", bucket, fraction))
                    .collect();
                format!("{}. {} [split: {}]: {}", i + 1, name, split.join(", "), patterns)
            }
            Rule::Simple { bucket, .. } => format!("{}. {}: {}", i + 1, bucket, patterns),
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Summary of an ingestion run
pub fn format_ingest_report(report: &IngestReport, symbol: &str) -> String {
    let plan = &report.plan;
    let mut output = String::new();

    if report.dry_run {
        output.push_str("Dry run: nothing was written.\n\n");
    }

    for entry in &plan.entries {
        output.push_str(&format!(
            "  {}  {:<40}  {:>12}  {}\n",
            entry.row.date,
            truncate(&entry.row.description, 40),
            entry.row.amount.format_with_symbol(symbol),
            entry.hit
        ));
    }
    if !plan.entries.is_empty() {
        output.push('\n');
    }

    output.push_str(&format!(
        "Rows read: {}, applied: {}, skipped as duplicates: {}\n",
        plan.rows_read,
        plan.entries.len(),
        plan.duplicates
    ));
    output.push_str(&format!("Net amount added: {}\n\n", signed(plan.net(), symbol)));
    output.push_str(&format_balance_change(&plan.before, &plan.after, symbol));
    output.push('\n');

    if !report.archived.is_empty() {
        let verb = if report.inputs_removed { "Moved" } else { "Copied" };
        output.push_str(&format!(
            "\n{} {} export(s) to the input archive.\n",
            verb,
            report.archived.len()
        ));
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{}...", cut)
    }
}
