//! Финансовая сводка дашборда: одноразовые чтения KPI
//!
//! Each read is a single backend function call; there is no fallback path
//! here. A missing backend function surfaces as `Unavailable` so the tile
//! can say so instead of rendering an empty number.

use contracts::dashboards::d400_financial_summary::{
    CashAccountDto, ExpenseLineDto, FinancialSummaryRequest, ProfitLossDto, VatReturnDto,
    VendorPayableDto,
};

use crate::shared::api::RpcGateway;
use crate::shared::error::FetchError;

/// Остатки по кассам и банковским счетам
pub async fn cash_position(
    gateway: &RpcGateway,
    request: &FinancialSummaryRequest,
) -> Result<Vec<CashAccountDto>, FetchError> {
    call(gateway, "get_cash_position", request).await
}

/// Непогашенная кредиторская задолженность перед поставщиками
pub async fn vendor_payables(
    gateway: &RpcGateway,
    request: &FinancialSummaryRequest,
) -> Result<Vec<VendorPayableDto>, FetchError> {
    call(gateway, "get_vendor_payables", request).await
}

/// Декларации НДС по периодам
pub async fn vat_returns(
    gateway: &RpcGateway,
    request: &FinancialSummaryRequest,
) -> Result<Vec<VatReturnDto>, FetchError> {
    call(gateway, "get_vat_returns", request).await
}

/// Расходы по категориям
pub async fn expense_summary(
    gateway: &RpcGateway,
    request: &FinancialSummaryRequest,
) -> Result<Vec<ExpenseLineDto>, FetchError> {
    call(gateway, "get_expense_summary", request).await
}

/// Прибыли и убытки за период
pub async fn profit_loss(
    gateway: &RpcGateway,
    request: &FinancialSummaryRequest,
) -> Result<ProfitLossDto, FetchError> {
    call(gateway, "get_profit_loss", request).await
}

async fn call<T>(
    gateway: &RpcGateway,
    function: &str,
    request: &FinancialSummaryRequest,
) -> Result<T, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let result = gateway
        .rpc::<FinancialSummaryRequest, T>(function, request)
        .await?
        .ok_or_else(|| FetchError::Unavailable(function.to_string()))?;
    tracing::debug!("Loaded {}", function);
    Ok(result)
}
