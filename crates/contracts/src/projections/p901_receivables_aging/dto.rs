use serde::{Deserialize, Serialize};

/// DTO для непогашенного счёта покупателя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivableDto {
    pub invoice_no: String,
    pub customer_name: String,
    /// Ответственный менеджер по этому покупателю
    pub owner_name: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    pub amount_due: f64,
    pub due_date: String, // "YYYY-MM-DD"
}

/// Корзина старения задолженности по числу дней просрочки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingBucket {
    /// 0-30 дней (включая ещё не наступившие сроки)
    Current,
    /// 31-60 дней
    Days31To60,
    /// 61-90 дней
    Days61To90,
    /// Более 90 дней
    Over90,
}

impl AgingBucket {
    /// Классифицировать по числу дней просрочки
    ///
    /// Отрицательное значение (срок ещё не наступил) попадает в `Current`.
    pub fn classify(days_overdue: i64) -> Self {
        match days_overdue {
            d if d <= 30 => AgingBucket::Current,
            d if d <= 60 => AgingBucket::Days31To60,
            d if d <= 90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }
}

/// Агрегат по менеджеру: сколько дебиторки закреплено и насколько она просрочена
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerPerformanceDto {
    pub owner_name: String,
    pub customer_count: i32,
    pub invoice_count: i32,
    pub total_outstanding: f64,

    // Суммы по корзинам старения
    pub amount_current: f64,
    pub amount_31_60: f64,
    pub amount_61_90: f64,
    pub amount_over_90: f64,

    /// Доля задолженности старше 30 дней (0.0 при нулевой сумме)
    pub overdue_share: f64,
    /// "high" / "medium" / "low"
    pub risk_level: String,
}
