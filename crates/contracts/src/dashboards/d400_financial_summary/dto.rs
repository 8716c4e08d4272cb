use serde::{Deserialize, Serialize};

/// Request for the financial summary dashboard reads
///
/// All KPI functions accept the same filter triple; a `None` date means
/// "no bound on that side" for the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummaryRequest {
    #[serde(default)]
    pub start_date: Option<String>, // "YYYY-MM-DD"
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub branch_filter: Option<String>,
}

impl FinancialSummaryRequest {
    /// Build a request covering one whole calendar month
    pub fn for_month(year: i32, month: u32) -> Self {
        let start = format!("{:04}-{:02}-01", year, month);
        let end = last_day_of_month(year, month)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| start.clone());
        Self {
            start_date: Some(start),
            end_date: Some(end),
            branch_filter: None,
        }
    }
}

/// Last calendar day of a month: first day of the next month minus one day
fn last_day_of_month(year: i32, month: u32) -> Option<chrono::NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    chrono::NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|d| d - chrono::Duration::days(1))
}

/// Cash / bank account balance row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashAccountDto {
    pub account_name: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    pub balance: f64,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// Outstanding vendor payable row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorPayableDto {
    pub vendor_name: String,
    pub amount_due: f64,
    #[serde(default)]
    pub due_date: Option<String>, // "YYYY-MM-DD"
    #[serde(default)]
    pub branch_name: Option<String>,
}

/// VAT return for one filing period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatReturnDto {
    /// Period in format "YYYY-MM"
    pub period: String,
    pub output_vat: f64,
    pub input_vat: f64,
    pub net_due: f64,
    /// Filing status as reported by the backend (e.g. "draft", "filed")
    pub status: String,
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLineDto {
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub branch_name: Option<String>,
}

/// Profit & loss totals for the requested period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossDto {
    pub revenue: f64,
    pub cost_of_sales: f64,
    pub gross_profit: f64,
    pub expenses: f64,
    pub net_profit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_month_covers_whole_month() {
        let req = FinancialSummaryRequest::for_month(2025, 2);
        assert_eq!(req.start_date.as_deref(), Some("2025-02-01"));
        assert_eq!(req.end_date.as_deref(), Some("2025-02-28"));

        let req = FinancialSummaryRequest::for_month(2024, 2);
        assert_eq!(req.end_date.as_deref(), Some("2024-02-29"));

        let req = FinancialSummaryRequest::for_month(2025, 12);
        assert_eq!(req.end_date.as_deref(), Some("2025-12-31"));
    }
}
