//! Shared contract types for the analytics dashboard data layer.
//!
//! Everything here crosses a crate boundary: request/response DTOs for the
//! hosted reporting backend and the row types the dashboard consumes.

pub mod dashboards;
pub mod projections;
