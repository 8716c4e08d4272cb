//! Дебиторская задолженность: старение и показатели менеджеров
//!
//! The backend only stores open invoices; the per-owner aggregation and the
//! aging buckets are computed here, over the fetched rows.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use contracts::projections::p901_receivables_aging::{
    AgingBucket, OwnerPerformanceDto, ReceivableDto,
};

use crate::shared::api::RpcGateway;
use crate::shared::date_utils::{days_overdue, DateRange};
use crate::shared::error::FetchError;

/// View с непогашенными счетами покупателей
pub const RECEIVABLES_VIEW: &str = "receivables_open";

/// Прочитать непогашенные счета со сроком оплаты внутри периода
pub async fn fetch_receivables(
    gateway: &RpcGateway,
    range: &DateRange,
    branch_filter: Option<&str>,
) -> Result<Vec<ReceivableDto>, FetchError> {
    let mut filters: Vec<(&str, String)> = vec![
        ("order", "due_date.asc,invoice_no.asc".to_string()),
        ("due_date", format!("gte.{}", range.from_param())),
        ("due_date", format!("lte.{}", range.to_param())),
    ];
    if let Some(branch) = branch_filter {
        filters.push(("branch_name", format!("eq.{}", branch)));
    }

    let rows: Vec<ReceivableDto> = gateway.select(RECEIVABLES_VIEW, &filters).await?;
    tracing::debug!("Loaded {} open receivables", rows.len());
    Ok(rows)
}

#[derive(Default)]
struct OwnerAccumulator {
    customers: HashSet<String>,
    invoice_count: i32,
    total: f64,
    current: f64,
    days_31_60: f64,
    days_61_90: f64,
    over_90: f64,
}

/// Сгруппировать задолженность по менеджерам с корзинами старения
///
/// Rows with an unparseable due date are skipped with a warning rather than
/// failing the whole report. Output is ordered by total outstanding,
/// largest first.
pub fn owner_performance(rows: &[ReceivableDto], as_of: NaiveDate) -> Vec<OwnerPerformanceDto> {
    let mut by_owner: BTreeMap<String, OwnerAccumulator> = BTreeMap::new();

    for row in rows {
        let due_date = match NaiveDate::parse_from_str(&row.due_date, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!(
                    "Skipping receivable {} with bad due_date '{}': {}",
                    row.invoice_no,
                    row.due_date,
                    e
                );
                continue;
            }
        };

        let acc = by_owner.entry(row.owner_name.clone()).or_default();
        acc.customers.insert(row.customer_name.clone());
        acc.invoice_count += 1;
        acc.total += row.amount_due;

        match AgingBucket::classify(days_overdue(due_date, as_of)) {
            AgingBucket::Current => acc.current += row.amount_due,
            AgingBucket::Days31To60 => acc.days_31_60 += row.amount_due,
            AgingBucket::Days61To90 => acc.days_61_90 += row.amount_due,
            AgingBucket::Over90 => acc.over_90 += row.amount_due,
        }
    }

    let mut result: Vec<OwnerPerformanceDto> = by_owner
        .into_iter()
        .map(|(owner_name, acc)| {
            let overdue = acc.days_31_60 + acc.days_61_90 + acc.over_90;
            let overdue_share = if acc.total > 0.0 {
                overdue / acc.total
            } else {
                0.0
            };
            OwnerPerformanceDto {
                owner_name,
                customer_count: acc.customers.len() as i32,
                invoice_count: acc.invoice_count,
                total_outstanding: acc.total,
                amount_current: acc.current,
                amount_31_60: acc.days_31_60,
                amount_61_90: acc.days_61_90,
                amount_over_90: acc.over_90,
                overdue_share,
                risk_level: risk_level(overdue_share).to_string(),
            }
        })
        .collect();

    result.sort_by(|a, b| {
        b.total_outstanding
            .partial_cmp(&a.total_outstanding)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.owner_name.cmp(&b.owner_name))
    });

    result
}

fn risk_level(overdue_share: f64) -> &'static str {
    if overdue_share >= 0.5 {
        "high"
    } else if overdue_share >= 0.2 {
        "medium"
    } else {
        "low"
    }
}
