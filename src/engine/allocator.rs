use crate::model::*;

use super::EngineError;

/// Picks a free spot for an incoming vehicle. The engine only relies on
/// this contract, so the policy can be swapped without touching it.
pub trait SpotAllocator: Send + Sync {
    fn find_spot(&self, floors: &[Floor], vehicle: &Vehicle) -> Result<SpotLocation, EngineError>;

    fn name(&self) -> &'static str;
}

/// Floors in order, spots in creation order, first one that fits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFitAllocator;

impl SpotAllocator for FirstFitAllocator {
    fn find_spot(&self, floors: &[Floor], vehicle: &Vehicle) -> Result<SpotLocation, EngineError> {
        for floor in floors {
            // O(1) skip for floors with nothing left in this category
            if !floor.has_free(vehicle.category) {
                continue;
            }
            if let Some(spot) = floor.spots().iter().find(|s| s.can_fit(vehicle)) {
                return Ok(SpotLocation::new(floor.number, spot.id));
            }
        }
        Err(EngineError::NoSpotAvailable(vehicle.category))
    }

    fn name(&self) -> &'static str {
        "first_fit"
    }
}
