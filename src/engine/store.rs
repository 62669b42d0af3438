use std::time::{Duration, UNIX_EPOCH};

use dashmap::DashMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use ulid::Generator;

use crate::model::*;

use super::EngineError;

/// Everything guarded by the lot lock: spot occupancy and the id generator.
pub struct LotState {
    pub floors: Vec<Floor>,
    ids: Generator,
}

impl LotState {
    pub fn new(layout: &LotLayout) -> Self {
        let floors = layout
            .floors
            .iter()
            .enumerate()
            .map(|(n, f)| Floor::new(n as u32, f))
            .collect();
        Self {
            floors,
            ids: Generator::new(),
        }
    }

    pub fn floor(&self, number: u32) -> Result<&Floor, EngineError> {
        self.floors
            .get(number as usize)
            .ok_or(EngineError::FloorNotFound(number))
    }

    pub fn floor_mut(&mut self, number: u32) -> Result<&mut Floor, EngineError> {
        self.floors
            .get_mut(number as usize)
            .ok_or(EngineError::FloorNotFound(number))
    }

    pub fn free_count(&self, category: VehicleCategory) -> usize {
        self.floors.iter().map(|f| f.free_count(category)).sum()
    }

    /// Monotonic ULID stamped with `now`. Later calls always sort after
    /// earlier ones, even within one millisecond or if `now` goes backwards.
    pub fn next_ticket_id(&mut self, now: Ms) -> Result<TicketId, EngineError> {
        let at = UNIX_EPOCH + Duration::from_millis(now.max(0) as u64);
        self.ids
            .generate_from_datetime(at)
            .map(TicketId)
            .map_err(|_| EngineError::IdExhausted)
    }
}

/// Owns all mutable lot state. Floors sit behind one lock; the ticket and
/// plate indices are only written while that lock is held for writing, so
/// occupancy and the indices move together.
pub struct LotStore {
    lot: RwLock<LotState>,
    tickets: DashMap<TicketId, Ticket>,
    plates: DashMap<String, TicketId>,
}

impl LotStore {
    pub fn new(layout: &LotLayout) -> Self {
        Self {
            lot: RwLock::new(LotState::new(layout)),
            tickets: DashMap::new(),
            plates: DashMap::new(),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, LotState> {
        self.lot.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, LotState> {
        self.lot.write().await
    }

    // ── Ticket index ─────────────────────────────────────────

    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    pub fn get_ticket(&self, id: &TicketId) -> Option<Ticket> {
        self.tickets.get(id).map(|e| e.value().clone())
    }

    pub fn ticket_for_plate(&self, plate: &str) -> Option<TicketId> {
        self.plates.get(plate).map(|e| *e.value())
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        let mut all: Vec<Ticket> = self.tickets.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|t| t.id);
        all
    }

    /// Write-guard parameter proves the caller holds the lot lock.
    pub fn index_ticket(&self, _lot: &mut LotState, ticket: Ticket) {
        self.plates.insert(ticket.vehicle.plate.clone(), ticket.id);
        self.tickets.insert(ticket.id, ticket);
    }

    pub fn unindex_ticket(&self, _lot: &mut LotState, id: &TicketId) -> Option<Ticket> {
        let (_, ticket) = self.tickets.remove(id)?;
        self.plates.remove(&ticket.vehicle.plate);
        Some(ticket)
    }
}
