use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

// Session requests by reported mode and outcome
pub static SESSION_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("relay_session_requests_total", "Session requests by mode and outcome"),
        &["mode", "outcome"],
    )
    .unwrap()
});

// Outbound gateway latency
pub static GATEWAY_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("relay_gateway_latency_seconds", "Gateway session call latency")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry::new();
    registry.register(Box::new(SESSION_REQUESTS_TOTAL.clone())).unwrap();
    registry.register(Box::new(GATEWAY_LATENCY.clone())).unwrap();
    registry
});

/// Record the outcome of one `POST /` call.
pub fn record_session(mode: &str, outcome: &str) {
    SESSION_REQUESTS_TOTAL.with_label_values(&[mode, outcome]).inc();
}

/// Render all registered metrics in the Prometheus text format.
pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_sessions_appear_in_output() {
        record_session("simple", "success");
        let output = metrics_output();
        assert!(output.contains("relay_session_requests_total"));
        assert!(output.contains("outcome=\"success\""));
    }
}
