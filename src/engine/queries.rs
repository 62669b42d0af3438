use crate::model::*;

use super::{Engine, EngineError};

impl Engine {
    pub async fn floor_count(&self) -> usize {
        self.store.read().await.floors.len()
    }

    /// Free spots of a category across every floor.
    pub async fn free_count(&self, category: VehicleCategory) -> usize {
        self.store.read().await.free_count(category)
    }

    pub async fn free_count_on_floor(
        &self,
        floor: u32,
        category: VehicleCategory,
    ) -> Result<usize, EngineError> {
        let lot = self.store.read().await;
        Ok(lot.floor(floor)?.free_count(category))
    }

    /// Total spots of a category, occupied or not.
    pub async fn capacity(&self, category: VehicleCategory) -> usize {
        let lot = self.store.read().await;
        lot.floors.iter().map(|f| f.capacity(category)).sum()
    }

    pub async fn spot(&self, location: SpotLocation) -> Result<ParkingSpot, EngineError> {
        let lot = self.store.read().await;
        lot.floor(location.floor)?
            .spot(location.spot)
            .cloned()
            .ok_or(EngineError::SpotNotFound(location))
    }

    pub async fn spot_status(&self, location: SpotLocation) -> Result<SpotStatus, EngineError> {
        self.spot(location).await.map(|s| s.status())
    }

    pub fn ticket(&self, id: &TicketId) -> Option<Ticket> {
        self.store.get_ticket(id)
    }

    pub fn ticket_for_plate(&self, plate: &str) -> Option<Ticket> {
        self.store
            .ticket_for_plate(plate)
            .and_then(|id| self.store.get_ticket(&id))
    }

    /// Active tickets, oldest first.
    pub fn active_tickets(&self) -> Vec<Ticket> {
        self.store.tickets()
    }

    pub fn active_count(&self) -> usize {
        self.store.ticket_count()
    }

    /// Consistent view of every floor plus the ticket count.
    pub async fn snapshot(&self) -> LotSnapshot {
        let lot = self.store.read().await;
        LotSnapshot {
            floors: lot.floors.iter().map(Floor::snapshot).collect(),
            active_tickets: self.store.ticket_count(),
        }
    }
}
