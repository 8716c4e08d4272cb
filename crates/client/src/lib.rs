//! Data-access layer for the analytics dashboard.
//!
//! The dashboard UI consumes financial KPIs (sales transactions, customer
//! receivables aging, cash, payables, VAT, expenses, profit & loss) from a
//! hosted PostgREST-style backend. This crate owns every backend round trip:
//! the HTTP gateway, the paged sales-transactions fetcher with its bulk
//! fallback, the receivables aging aggregation and the one-shot KPI reads.
//!
//! The crate only emits `tracing` events; installing a subscriber is the
//! host application's job.

pub mod dashboards;
pub mod projections;
pub mod shared;
