use serde::{Deserialize, Serialize};

/// DTO для строки отчёта по продажам (одна строка счёта-фактуры)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    // NK (Natural Key)
    pub invoice_no: String,
    pub line_no: i32,

    // Dates as "YYYY-MM-DD"
    pub invoice_date: String,

    // Product line
    pub item_name: String,
    pub qty: f64,
    pub sale_price: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default)]
    pub profit_pct: Option<f64>,

    // Dimensions
    pub customer_name: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub salesperson_name: Option<String>,
}

/// Request для постраничного чтения продаж с фильтрами
///
/// Аргументы соответствуют серверной функции `get_sales_transactions_page`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPageRequest {
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    #[serde(default)]
    pub page_offset: i32,
    #[serde(default)]
    pub start_date: Option<String>, // "YYYY-MM-DD"
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub branch_filter: Option<String>,
}

fn default_page_size() -> i32 {
    50
}

/// Response постраничного чтения
///
/// `total_count` считается сервером по тому же фильтру, что и страница.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPageResponse {
    pub items: Vec<TransactionDto>,
    pub total_count: i32,
}

/// Request для полного (непостраничного) чтения продаж
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesBulkRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub branch_filter: Option<String>,
}
