use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

/// Counter: vehicles parked. Labels: category.
pub const ENTRIES_TOTAL: &str = "parklot_entries_total";

/// Counter: entries refused. Labels: category, reason.
pub const ENTRIES_REJECTED_TOTAL: &str = "parklot_entries_rejected_total";

/// Counter: vehicles that left. Labels: category.
pub const EXITS_TOTAL: &str = "parklot_exits_total";

/// Counter: exits with an unknown or already used ticket.
pub const INVALID_TICKETS_TOTAL: &str = "parklot_invalid_tickets_total";

/// Counter: fees charged, in currency units. Labels: category.
pub const FEES_TOTAL: &str = "parklot_fees_total";

/// Gauge: free spots across the lot. Labels: category.
pub const SPOTS_FREE: &str = "parklot_spots_free";

/// Gauge: tickets currently active.
pub const TICKETS_ACTIVE: &str = "parklot_tickets_active";

/// Install the fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Short label for a rejected entry.
pub fn rejection_label(err: &crate::engine::EngineError) -> &'static str {
    use crate::engine::EngineError;
    match err {
        EngineError::NoSpotAvailable(_) => "no_spot",
        EngineError::AlreadyParked(_) => "already_parked",
        EngineError::InvalidVehicle(_) => "invalid_vehicle",
        EngineError::IdExhausted => "id_exhausted",
        _ => "other",
    }
}
