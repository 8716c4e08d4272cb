pub mod service;

pub use service::{fetch_receivables, owner_performance};
