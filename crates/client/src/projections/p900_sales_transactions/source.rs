//! Backend collaborators for the sales transactions report
//!
//! Two seams: the optimized paged query (page + total count in one round
//! trip) and the bulk query used only when the optimized capability is
//! absent. `Ok(None)` from the paged query is the capability-absent signal;
//! it is the only condition that triggers the fallback.

use async_trait::async_trait;
use contracts::projections::p900_sales_transactions::{
    SalesBulkRequest, SalesPageRequest, SalesPageResponse, TransactionDto,
};

use crate::shared::api::RpcGateway;
use crate::shared::error::FetchError;

/// Серверная функция постраничного чтения
pub const SALES_PAGE_FUNCTION: &str = "get_sales_transactions_page";
/// View для полного чтения (fallback)
pub const SALES_VIEW: &str = "sales_transactions";

#[async_trait]
pub trait PagedSalesQuery: Send + Sync {
    /// One page plus the total row count for the same filter.
    ///
    /// `Ok(None)` = the backend does not expose this capability.
    async fn fetch_page(
        &self,
        request: &SalesPageRequest,
    ) -> Result<Option<SalesPageResponse>, FetchError>;
}

#[async_trait]
pub trait BulkSalesQuery: Send + Sync {
    /// Every row matching the filter, no pagination.
    async fn fetch_all(
        &self,
        request: &SalesBulkRequest,
    ) -> Result<Vec<TransactionDto>, FetchError>;
}

#[async_trait]
impl PagedSalesQuery for RpcGateway {
    async fn fetch_page(
        &self,
        request: &SalesPageRequest,
    ) -> Result<Option<SalesPageResponse>, FetchError> {
        self.rpc(SALES_PAGE_FUNCTION, request).await
    }
}

#[async_trait]
impl BulkSalesQuery for RpcGateway {
    async fn fetch_all(
        &self,
        request: &SalesBulkRequest,
    ) -> Result<Vec<TransactionDto>, FetchError> {
        // Stable order: pagination over the view is not well-defined without it
        let mut filters: Vec<(&str, String)> =
            vec![("order", "invoice_date.desc,invoice_no.asc,line_no.asc".to_string())];
        if let Some(start) = &request.start_date {
            filters.push(("invoice_date", format!("gte.{}", start)));
        }
        if let Some(end) = &request.end_date {
            filters.push(("invoice_date", format!("lte.{}", end)));
        }
        if let Some(branch) = &request.branch_filter {
            filters.push(("branch_name", format!("eq.{}", branch)));
        }
        self.select(SALES_VIEW, &filters).await
    }
}
