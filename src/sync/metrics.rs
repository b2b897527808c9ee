//! Prometheus metrics for the relay
//!
//! Provides observability metrics for monitoring webhook processing in production.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// Counter: inbound webhook events by kind and outcome
    pub static ref WEBHOOK_EVENTS: CounterVec = register_counter_vec!(
        "incident_jira_relay_webhook_events_total",
        "Inbound webhook events by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("Failed to create webhook_events metric");

    /// Counter: catalog lookups by result
    pub static ref CATALOG_LOOKUPS: CounterVec = register_counter_vec!(
        "incident_jira_relay_catalog_lookups_total",
        "incident.io catalog lookups by result",
        &["result"]
    )
    .expect("Failed to create catalog_lookups metric");

    /// Counter: values dropped from a field batch, by reason
    pub static ref VALUES_SKIPPED: CounterVec = register_counter_vec!(
        "incident_jira_relay_values_skipped_total",
        "Catalog values dropped before the Jira write",
        &["reason"]
    )
    .expect("Failed to create values_skipped metric");

    /// Counter: Jira field updates by result
    pub static ref FIELD_UPDATES: CounterVec = register_counter_vec!(
        "incident_jira_relay_field_updates_total",
        "Jira custom field updates by result",
        &["result"]
    )
    .expect("Failed to create field_updates metric");

    /// Histogram: time to sync one incident event (seconds)
    pub static ref SYNC_DURATION: HistogramVec = register_histogram_vec!(
        "incident_jira_relay_sync_duration_seconds",
        "Duration of incident sync operations",
        &["kind"],
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("Failed to create sync_duration metric");
}

/// Record a processed webhook event
pub fn record_webhook_event(kind: &str, outcome: &str) {
    WEBHOOK_EVENTS.with_label_values(&[kind, outcome]).inc();
}

/// Record a catalog lookup result (`found`, `not_found`, `rejected`, `transport_error`)
pub fn record_catalog_lookup(result: &str) {
    CATALOG_LOOKUPS.with_label_values(&[result]).inc();
}

/// Record a value dropped from a field batch
pub fn record_value_skipped(reason: &str) {
    VALUES_SKIPPED.with_label_values(&[reason]).inc();
}

/// Record a field update result (`success`, `fallback_success`, `failure`)
pub fn record_field_update(result: &str) {
    FIELD_UPDATES.with_label_values(&[result]).inc();
}

/// Record how long an event sync took
pub fn record_sync_duration(kind: &str, duration_secs: f64) {
    SYNC_DURATION
        .with_label_values(&[kind])
        .observe(duration_secs);
}

/// Encode all metrics as Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
