mod allocator;
mod clock;
mod error;
mod mutations;
mod pricing;
mod queries;
mod store;

pub use allocator::{FirstFitAllocator, SpotAllocator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::EngineError;
pub use pricing::{HourlyPricing, PricingStrategy};
pub use store::{LotState, LotStore};

use std::sync::Arc;

use tracing::info;

use crate::config::LotConfig;
use crate::limits::*;
use crate::model::*;
use crate::notify::NotifyHub;

/// The parking manager: owns the lot and orchestrates entry and exit.
pub struct Engine {
    pub(super) store: LotStore,
    allocator: Box<dyn SpotAllocator>,
    pricing: Box<dyn PricingStrategy>,
    clock: Arc<dyn Clock>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(
        layout: &LotLayout,
        allocator: Box<dyn SpotAllocator>,
        pricing: Box<dyn PricingStrategy>,
        clock: Arc<dyn Clock>,
        notify: Arc<NotifyHub>,
    ) -> Result<Self, EngineError> {
        validate_layout(layout)?;
        let engine = Self {
            store: LotStore::new(layout),
            allocator,
            pricing,
            clock,
            notify,
        };
        info!(
            "lot initialised: {} floors, {} spots, allocator {}",
            layout.floors.len(),
            layout.floors.iter().map(FloorLayout::total).sum::<u64>(),
            engine.allocator.name()
        );
        Ok(engine)
    }

    /// First-fit allocation and flat hourly pricing.
    pub fn with_rate(
        layout: &LotLayout,
        rate_per_hour: Amount,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        Self::new(
            layout,
            Box::new(FirstFitAllocator),
            Box::new(HourlyPricing::new(rate_per_hour)),
            clock,
            Arc::new(NotifyHub::new()),
        )
    }

    pub fn from_config(config: &LotConfig, clock: Arc<dyn Clock>) -> Result<Self, EngineError> {
        Self::with_rate(&config.layout, config.hourly_rate, clock)
    }

    pub fn notify(&self) -> &Arc<NotifyHub> {
        &self.notify
    }
}

fn validate_layout(layout: &LotLayout) -> Result<(), EngineError> {
    if layout.floors.len() > MAX_FLOORS {
        return Err(EngineError::LimitExceeded("too many floors"));
    }
    if layout.floors.iter().any(|f| f.total() > MAX_SPOTS_PER_FLOOR) {
        return Err(EngineError::LimitExceeded("too many spots on one floor"));
    }
    Ok(())
}

pub(crate) fn validate_vehicle(vehicle: &Vehicle) -> Result<(), EngineError> {
    let plate = vehicle.plate.trim();
    if plate.is_empty() {
        return Err(EngineError::InvalidVehicle("empty plate"));
    }
    if plate.len() != vehicle.plate.len() {
        return Err(EngineError::InvalidVehicle("plate has surrounding whitespace"));
    }
    if plate.len() > MAX_PLATE_LEN {
        return Err(EngineError::InvalidVehicle("plate too long"));
    }
    Ok(())
}
