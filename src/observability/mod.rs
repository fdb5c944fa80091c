// Observability: Prometheus metrics

pub mod metrics;

pub use metrics::{get_metrics_handle, init};
