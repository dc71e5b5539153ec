//! # Utility Modules
//!
//! Supporting utilities for observability.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` setup driven by `LoggingConfig`
//! - **Metrics**: Thread-safe counters for reads, yields and key exchanges

pub mod logging;
pub mod metrics;
