use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::sync::Arc;

/// RPC and broadcast metrics on the global `tron_client` meter.
///
/// Without an installed SDK meter provider every instrument is a no-op.
#[derive(Clone)]
pub struct ClientTelemetry {
    inner: Arc<Inner>,
}

struct Inner {
    rpc_total: Counter<u64>,
    rpc_errors_total: Counter<u64>,
    broadcasts_total: Counter<u64>,
    rpc_ms: Histogram<u64>,
}

impl ClientTelemetry {
    pub fn new() -> Self {
        let meter = global::meter("tron_client");

        let rpc_total = meter
            .u64_counter("tron_client.rpc_total")
            .with_description("Total wallet RPCs dispatched")
            .build();
        let rpc_errors_total = meter
            .u64_counter("tron_client.rpc_errors_total")
            .with_description("Total wallet RPCs that failed")
            .build();
        let broadcasts_total = meter
            .u64_counter("tron_client.broadcasts_total")
            .with_description("Total transactions broadcast, partitioned by envelope result")
            .build();
        let rpc_ms = meter
            .u64_histogram("tron_client.rpc_ms")
            .with_description("Wallet RPC runtime including connection acquisition")
            .with_unit("ms")
            .build();

        Self {
            inner: Arc::new(Inner {
                rpc_total,
                rpc_errors_total,
                broadcasts_total,
                rpc_ms,
            }),
        }
    }

    pub fn rpc_ms(&self, method: &'static str, ok: bool, ms: u64) {
        let attrs = [
            KeyValue::new("method", method),
            KeyValue::new("ok", ok),
        ];
        self.inner.rpc_total.add(1, &attrs);
        if !ok {
            self.inner.rpc_errors_total.add(1, &attrs);
        }
        self.inner.rpc_ms.record(ms, &attrs);
    }

    pub fn broadcast(&self, ok: bool) {
        let attrs = [KeyValue::new("status", if ok { "ok" } else { "err" })];
        self.inner.broadcasts_total.add(1, &attrs);
    }
}

impl Default for ClientTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientTelemetry")
    }
}
