use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use earth_engine::ImageryGateway;
use terra_common::Registry;

/// Shared application state.
pub struct AppState {
    pub registry: Registry,
    pub gateway: Arc<dyn ImageryGateway>,
    /// Append error details to user-facing messages.
    pub debug: bool,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(registry: Registry, gateway: Arc<dyn ImageryGateway>) -> Self {
        Self {
            registry,
            gateway,
            debug: false,
            prometheus: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
