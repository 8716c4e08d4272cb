//! Постраничный фетчер отчёта по продажам
//!
//! Tries the optimized server-side query first and falls back to a bulk
//! fetch with local slicing only when the backend reports the capability as
//! absent. A genuine backend error is surfaced as-is and never masked by the
//! fallback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::projections::p900_sales_transactions::{
    SalesBulkRequest, SalesPageRequest, TransactionDto,
};
use tokio::sync::{watch, RwLock};

use crate::shared::config::FetchConfig;
use crate::shared::date_utils::DateRange;
use crate::shared::error::FetchError;
use crate::shared::pagination::PaginationState;
use crate::shared::timeout::{with_timeout, DEFAULT_TIMEOUT};

use super::source::{BulkSalesQuery, PagedSalesQuery};

/// Снимок состояния фетчера для потребителя (таблица на дашборде)
#[derive(Debug, Clone, PartialEq)]
pub struct SalesPageSnapshot {
    pub items: Vec<TransactionDto>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: PaginationState,
    /// Whether the last page was served by the optimized path
    pub is_optimized: bool,
}

#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub page_size: i32,
    /// Required: there is no fetch without a report period
    pub date_range: DateRange,
    pub branch_filter: Option<String>,
    pub timeout: Duration,
    pub fallback_row_cap: usize,
}

impl FetcherOptions {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            page_size: 50,
            date_range,
            branch_filter: None,
            timeout: DEFAULT_TIMEOUT,
            fallback_row_cap: 50_000,
        }
    }

    pub fn from_config(config: &FetchConfig, date_range: DateRange) -> Self {
        Self {
            page_size: config.page_size,
            date_range,
            branch_filter: None,
            timeout: Duration::from_secs(config.timeout_secs),
            fallback_row_cap: config.fallback_row_cap,
        }
    }
}

#[derive(Debug, Clone)]
struct Filters {
    date_range: DateRange,
    branch_filter: Option<String>,
}

/// Фетчер одной страницы продаж с навигацией
///
/// Call `load_page(0)` after construction; `go_to_page` is a no-op until a
/// first load has established a total count. Every load takes a
/// monotonically increasing token, and only the newest token may publish:
/// a superseded fetch completes but its result is dropped.
pub struct SalesPageFetcher {
    paged: Arc<dyn PagedSalesQuery>,
    bulk: Arc<dyn BulkSalesQuery>,
    page_size: i32,
    timeout: Duration,
    fallback_row_cap: usize,
    filters: RwLock<Filters>,
    seq: AtomicU64,
    tx: watch::Sender<SalesPageSnapshot>,
}

impl SalesPageFetcher {
    pub fn new(
        paged: Arc<dyn PagedSalesQuery>,
        bulk: Arc<dyn BulkSalesQuery>,
        options: FetcherOptions,
    ) -> Self {
        let page_size = options.page_size.max(1);
        let initial = SalesPageSnapshot {
            items: Vec::new(),
            loading: false,
            error: None,
            pagination: PaginationState::zeroed(page_size),
            is_optimized: false,
        };
        let (tx, _rx) = watch::channel(initial);
        Self {
            paged,
            bulk,
            page_size,
            timeout: options.timeout,
            fallback_row_cap: options.fallback_row_cap,
            filters: RwLock::new(Filters {
                date_range: options.date_range,
                branch_filter: options.branch_filter,
            }),
            seq: AtomicU64::new(0),
            tx,
        }
    }

    /// Current state
    pub fn snapshot(&self) -> SalesPageSnapshot {
        self.tx.borrow().clone()
    }

    /// Watch every state transition (loading / loaded / failed)
    pub fn subscribe(&self) -> watch::Receiver<SalesPageSnapshot> {
        self.tx.subscribe()
    }

    /// Загрузить страницу начиная со смещения `offset`
    pub async fn load_page(&self, offset: i32) {
        let offset = offset.max(0);
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let filters = self.filters.read().await.clone();

        let mut loading = self.snapshot();
        loading.loading = true;
        loading.error = None;
        self.publish_if_current(token, loading);

        let request = SalesPageRequest {
            page_size: self.page_size,
            page_offset: offset,
            start_date: Some(filters.date_range.from_param()),
            end_date: Some(filters.date_range.to_param()),
            branch_filter: filters.branch_filter.clone(),
        };

        match with_timeout(self.timeout, self.paged.fetch_page(&request)).await {
            Ok(Some(response)) => {
                let pagination =
                    PaginationState::compute(response.total_count, self.page_size, offset);
                self.publish_if_current(
                    token,
                    SalesPageSnapshot {
                        items: response.items,
                        loading: false,
                        error: None,
                        pagination,
                        is_optimized: true,
                    },
                );
            }
            Ok(None) => {
                tracing::info!("Optimized sales page query not available, using bulk fallback");
                self.load_page_fallback(token, offset, &filters).await;
            }
            Err(e) => self.publish_failure(token, e),
        }
    }

    async fn load_page_fallback(&self, token: u64, offset: i32, filters: &Filters) {
        let request = SalesBulkRequest {
            start_date: Some(filters.date_range.from_param()),
            end_date: Some(filters.date_range.to_param()),
            branch_filter: filters.branch_filter.clone(),
        };

        let rows = match with_timeout(self.timeout, self.bulk.fetch_all(&request)).await {
            Ok(rows) => rows,
            Err(e) => return self.publish_failure(token, e),
        };

        if rows.len() > self.fallback_row_cap {
            return self.publish_failure(
                token,
                FetchError::DatasetTooLarge {
                    rows: rows.len(),
                    cap: self.fallback_row_cap,
                },
            );
        }

        // The bulk collaborator is not required to honor the branch filter;
        // the predicate is applied here either way.
        let filtered: Vec<TransactionDto> = match &filters.branch_filter {
            Some(branch) => rows
                .into_iter()
                .filter(|r| r.branch_name.as_deref() == Some(branch.as_str()))
                .collect(),
            None => rows,
        };

        let total_count = filtered.len() as i32;
        let items: Vec<TransactionDto> = filtered
            .into_iter()
            .skip(offset as usize)
            .take(self.page_size as usize)
            .collect();

        tracing::debug!(
            "Bulk fallback served offset {} ({} of {} rows)",
            offset,
            items.len(),
            total_count
        );

        self.publish_if_current(
            token,
            SalesPageSnapshot {
                items,
                loading: false,
                error: None,
                pagination: PaginationState::compute(total_count, self.page_size, offset),
                is_optimized: false,
            },
        );
    }

    /// Следующая страница; ничего не делает без `has_more`
    pub async fn next_page(&self) {
        let pagination = self.snapshot().pagination;
        if !pagination.has_more {
            return;
        }
        self.load_page(pagination.current_offset + pagination.page_size)
            .await;
    }

    /// Предыдущая страница; ничего не делает на первой
    pub async fn prev_page(&self) {
        let pagination = self.snapshot().pagination;
        if pagination.current_offset == 0 {
            return;
        }
        self.load_page((pagination.current_offset - pagination.page_size).max(0))
            .await;
    }

    /// Перейти к странице `page` (нумерация с нуля)
    pub async fn go_to_page(&self, page: i32) {
        let pagination = self.snapshot().pagination;
        if page < 0 {
            return;
        }
        let offset = page * pagination.page_size;
        if offset >= pagination.total_count {
            return;
        }
        self.load_page(offset).await;
    }

    /// Перечитать текущую страницу
    pub async fn refresh(&self) {
        let offset = self.snapshot().pagination.current_offset;
        self.load_page(offset).await;
    }

    /// Сменить период отчёта и вернуться на первую страницу
    pub async fn set_date_range(&self, date_range: DateRange) {
        self.filters.write().await.date_range = date_range;
        self.load_page(0).await;
    }

    /// Сменить фильтр по филиалу и вернуться на первую страницу
    pub async fn set_branch_filter(&self, branch_filter: Option<String>) {
        self.filters.write().await.branch_filter = branch_filter;
        self.load_page(0).await;
    }

    fn publish_failure(&self, token: u64, error: FetchError) {
        tracing::error!("Sales page fetch failed: {}", error);
        self.publish_if_current(
            token,
            SalesPageSnapshot {
                items: Vec::new(),
                loading: false,
                error: Some(error.to_string()),
                pagination: PaginationState::zeroed(self.page_size),
                is_optimized: false,
            },
        );
    }

    fn publish_if_current(&self, token: u64, snapshot: SalesPageSnapshot) {
        if self.seq.load(Ordering::SeqCst) != token {
            tracing::debug!("Discarding superseded fetch result (token {})", token);
            return;
        }
        self.tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use contracts::projections::p900_sales_transactions::SalesPageResponse;
    use tokio::sync::Notify;

    use super::*;

    fn make_tx(i: i32, branch: &str) -> TransactionDto {
        TransactionDto {
            invoice_no: format!("INV-{:04}", i),
            line_no: 1,
            invoice_date: "2025-01-15".to_string(),
            item_name: format!("Item {}", i),
            qty: 1.0,
            sale_price: 100.0,
            cost: Some(60.0),
            profit: Some(40.0),
            profit_pct: Some(40.0),
            customer_name: "Acme Trading".to_string(),
            branch_name: Some(branch.to_string()),
            salesperson_name: Some("Alice".to_string()),
        }
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    enum PagedMode {
        Serve { total: i32 },
        NotSupported,
        Fail,
        Hang,
    }

    struct ScriptedPaged {
        mode: PagedMode,
        calls: AtomicUsize,
    }

    impl ScriptedPaged {
        fn new(mode: PagedMode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PagedSalesQuery for ScriptedPaged {
        async fn fetch_page(
            &self,
            request: &SalesPageRequest,
        ) -> Result<Option<SalesPageResponse>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                PagedMode::Serve { total } => {
                    let start = request.page_offset.clamp(0, total);
                    let end = (request.page_offset + request.page_size).clamp(0, total);
                    let items = (start..end).map(|i| make_tx(i, "Main")).collect();
                    Ok(Some(SalesPageResponse {
                        items,
                        total_count: total,
                    }))
                }
                PagedMode::NotSupported => Ok(None),
                PagedMode::Fail => Err(FetchError::Api {
                    status: 500,
                    body: "internal error".to_string(),
                }),
                PagedMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    struct ScriptedBulk {
        rows: Vec<TransactionDto>,
        calls: AtomicUsize,
    }

    impl ScriptedBulk {
        fn new(rows: Vec<TransactionDto>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BulkSalesQuery for ScriptedBulk {
        async fn fetch_all(
            &self,
            _request: &SalesBulkRequest,
        ) -> Result<Vec<TransactionDto>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    fn fetcher(
        paged: Arc<ScriptedPaged>,
        bulk: Arc<ScriptedBulk>,
        options: FetcherOptions,
    ) -> SalesPageFetcher {
        SalesPageFetcher::new(paged, bulk, options)
    }

    #[tokio::test]
    async fn test_optimized_page_math() {
        let paged = ScriptedPaged::new(PagedMode::Serve { total: 125 });
        let bulk = ScriptedBulk::new(Vec::new());
        let mut options = FetcherOptions::new(january());
        options.page_size = 50;
        let f = fetcher(paged.clone(), bulk.clone(), options);

        f.load_page(0).await;
        let snap = f.snapshot();
        assert!(snap.is_optimized);
        assert!(!snap.loading);
        assert_eq!(snap.error, None);
        assert_eq!(snap.items.len(), 50);
        assert_eq!(snap.pagination.total_count, 125);
        assert_eq!(snap.pagination.total_pages, 3);
        assert!(snap.pagination.has_more);

        f.load_page(100).await;
        let snap = f.snapshot();
        assert_eq!(snap.items.len(), 25);
        assert_eq!(snap.pagination.current_offset, 100);
        assert!(!snap.pagination.has_more);
        assert_eq!(bulk.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_navigation_boundaries() {
        let paged = ScriptedPaged::new(PagedMode::Serve { total: 125 });
        let bulk = ScriptedBulk::new(Vec::new());
        let mut options = FetcherOptions::new(january());
        options.page_size = 50;
        let f = fetcher(paged.clone(), bulk, options);

        f.load_page(0).await;
        f.next_page().await;
        f.next_page().await;
        assert_eq!(f.snapshot().pagination.current_offset, 100);
        assert!(!f.snapshot().pagination.has_more);

        // Past the last page: no state change, no fetch issued
        let calls_before = paged.calls.load(Ordering::SeqCst);
        f.next_page().await;
        f.go_to_page(3).await;
        f.go_to_page(-1).await;
        assert_eq!(paged.calls.load(Ordering::SeqCst), calls_before);
        assert_eq!(f.snapshot().pagination.current_offset, 100);

        f.go_to_page(1).await;
        assert_eq!(f.snapshot().pagination.current_offset, 50);

        f.prev_page().await;
        assert_eq!(f.snapshot().pagination.current_offset, 0);

        let calls_before = paged.calls.load(Ordering::SeqCst);
        f.prev_page().await;
        assert_eq!(paged.calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test]
    async fn test_load_page_is_idempotent() {
        let paged = ScriptedPaged::new(PagedMode::Serve { total: 125 });
        let bulk = ScriptedBulk::new(Vec::new());
        let mut options = FetcherOptions::new(january());
        options.page_size = 50;
        let f = fetcher(paged, bulk, options);

        f.load_page(50).await;
        let first = f.snapshot();
        f.load_page(50).await;
        let second = f.snapshot();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fallback_filters_and_slices() {
        let mut rows = Vec::new();
        for i in 0..7 {
            rows.push(make_tx(i, "Main"));
        }
        for i in 7..12 {
            rows.push(make_tx(i, "North"));
        }

        let paged = ScriptedPaged::new(PagedMode::NotSupported);
        let bulk = ScriptedBulk::new(rows.clone());
        let mut options = FetcherOptions::new(january());
        options.page_size = 10;
        options.branch_filter = Some("Main".to_string());
        let f = fetcher(paged, bulk, options);

        f.load_page(0).await;
        let snap = f.snapshot();

        let expected: Vec<TransactionDto> = rows
            .iter()
            .filter(|r| r.branch_name.as_deref() == Some("Main"))
            .skip(0)
            .take(10)
            .cloned()
            .collect();
        assert_eq!(snap.items, expected);
        assert_eq!(snap.items.len(), 7);
        assert!(!snap.is_optimized);
        assert_eq!(snap.error, None);
        assert_eq!(snap.pagination.total_count, 7);
        assert_eq!(snap.pagination.total_pages, 1);
        assert!(!snap.pagination.has_more);
    }

    #[tokio::test]
    async fn test_error_does_not_trigger_fallback() {
        let paged = ScriptedPaged::new(PagedMode::Fail);
        let bulk = ScriptedBulk::new(vec![make_tx(1, "Main")]);
        let f = fetcher(paged, bulk.clone(), FetcherOptions::new(january()));

        f.load_page(0).await;
        let snap = f.snapshot();

        assert_eq!(bulk.calls.load(Ordering::SeqCst), 0);
        assert!(snap.items.is_empty());
        assert_eq!(snap.pagination, PaginationState::zeroed(50));
        assert!(!snap.pagination.has_more);
        assert!(snap.error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_timeout_is_a_genuine_error() {
        let paged = ScriptedPaged::new(PagedMode::Hang);
        let bulk = ScriptedBulk::new(vec![make_tx(1, "Main")]);
        let mut options = FetcherOptions::new(january());
        options.timeout = Duration::from_millis(20);
        let f = fetcher(paged, bulk.clone(), options);

        f.load_page(0).await;
        let snap = f.snapshot();

        assert_eq!(bulk.calls.load(Ordering::SeqCst), 0);
        assert!(snap.items.is_empty());
        assert!(snap.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_fallback_row_cap() {
        let rows: Vec<TransactionDto> = (0..11).map(|i| make_tx(i, "Main")).collect();
        let paged = ScriptedPaged::new(PagedMode::NotSupported);
        let bulk = ScriptedBulk::new(rows);
        let mut options = FetcherOptions::new(january());
        options.fallback_row_cap = 10;
        let f = fetcher(paged, bulk, options);

        f.load_page(0).await;
        let snap = f.snapshot();

        assert!(snap.items.is_empty());
        assert!(snap.error.as_deref().unwrap().contains("exceeds cap"));
        assert_eq!(snap.pagination.total_count, 0);
    }

    #[tokio::test]
    async fn test_filter_change_resets_to_first_page() {
        let paged = ScriptedPaged::new(PagedMode::Serve { total: 125 });
        let bulk = ScriptedBulk::new(Vec::new());
        let mut options = FetcherOptions::new(january());
        options.page_size = 50;
        let f = fetcher(paged, bulk, options);

        f.load_page(100).await;
        assert_eq!(f.snapshot().pagination.current_offset, 100);

        f.set_branch_filter(Some("North".to_string())).await;
        assert_eq!(f.snapshot().pagination.current_offset, 0);
    }

    struct GatedPaged {
        gate: Notify,
        total: i32,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PagedSalesQuery for GatedPaged {
        async fn fetch_page(
            &self,
            request: &SalesPageRequest,
        ) -> Result<Option<SalesPageResponse>, FetchError> {
            let call_no = self.calls.fetch_add(1, Ordering::SeqCst);
            // The first request stalls until the test releases it
            if call_no == 0 {
                self.gate.notified().await;
            }
            let start = request.page_offset.clamp(0, self.total);
            let end = (request.page_offset + request.page_size).clamp(0, self.total);
            let items = (start..end).map(|i| make_tx(i, "Main")).collect();
            Ok(Some(SalesPageResponse {
                items,
                total_count: self.total,
            }))
        }
    }

    #[tokio::test]
    async fn test_superseded_fetch_is_discarded() {
        let paged = Arc::new(GatedPaged {
            gate: Notify::new(),
            total: 125,
            calls: AtomicUsize::new(0),
        });
        let bulk = ScriptedBulk::new(Vec::new());
        let mut options = FetcherOptions::new(january());
        options.page_size = 50;
        let f = Arc::new(SalesPageFetcher::new(paged.clone(), bulk, options));

        // First load stalls inside the collaborator
        let stalled = {
            let f = f.clone();
            tokio::spawn(async move { f.load_page(0).await })
        };
        while paged.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Second load completes while the first is still in flight
        f.load_page(50).await;
        assert_eq!(f.snapshot().pagination.current_offset, 50);

        // Release the stalled fetch; its result must be dropped
        paged.gate.notify_one();
        stalled.await.unwrap();

        let snap = f.snapshot();
        assert_eq!(snap.pagination.current_offset, 50);
        assert_eq!(snap.items[0].invoice_no, "INV-0050");
    }
}
