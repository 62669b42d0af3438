use tracing::{debug, info, warn};

use crate::model::*;
use crate::observability::*;

use super::{validate_vehicle, Engine, EngineError, LotState};

impl Engine {
    /// Park a vehicle: find a spot, occupy it, issue a ticket.
    /// On any error nothing in the lot changes.
    pub async fn enter(&self, vehicle: Vehicle) -> Result<Ticket, EngineError> {
        let category = vehicle.category;
        let mut lot = self.store.write().await;

        let result = self.try_enter(&mut lot, vehicle);
        let ticket = match result {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!("entry refused ({category}): {e}");
                metrics::counter!(
                    ENTRIES_REJECTED_TOTAL,
                    "category" => category.as_str(),
                    "reason" => rejection_label(&e)
                )
                .increment(1);
                return Err(e);
            }
        };

        info!(
            "ticket {} issued to {} at {}",
            ticket.id, ticket.vehicle.plate, ticket.location
        );
        metrics::counter!(ENTRIES_TOTAL, "category" => category.as_str()).increment(1);
        self.record_occupancy(&lot, category);
        self.notify.send(&LotEvent::VehicleParked {
            ticket: ticket.clone(),
        });
        Ok(ticket)
    }

    fn try_enter(&self, lot: &mut LotState, vehicle: Vehicle) -> Result<Ticket, EngineError> {
        validate_vehicle(&vehicle)?;
        if self.store.ticket_for_plate(&vehicle.plate).is_some() {
            return Err(EngineError::AlreadyParked(vehicle.plate));
        }

        let location = self.allocator.find_spot(&lot.floors, &vehicle)?;
        let now = self.clock.now_ms();
        // Mint the id first so a failure here leaves the spot untouched.
        let id = lot.next_ticket_id(now)?;
        lot.floor_mut(location.floor)?
            .occupy(location.spot, vehicle.clone())?;

        let ticket = Ticket {
            id,
            vehicle,
            location,
            entry: now,
            exit: None,
        };
        self.store.index_ticket(lot, ticket.clone());
        Ok(ticket)
    }

    /// Release the ticket's spot and bill the stay. A ticket can be used once.
    pub async fn exit(&self, id: TicketId) -> Result<Receipt, EngineError> {
        let mut lot = self.store.write().await;

        let Some(mut ticket) = self.store.get_ticket(&id) else {
            debug!("exit refused: unknown ticket {id}");
            metrics::counter!(INVALID_TICKETS_TOTAL).increment(1);
            return Err(EngineError::InvalidTicket(id));
        };

        // A clock that stepped back is treated as leaving at the entry instant.
        let exit = self.clock.now_ms().max(ticket.entry);
        let location = ticket.location;
        let removed = lot.floor_mut(location.floor)?.vacate(location.spot)?;
        if removed.is_none() {
            warn!("ticket {id} pointed at {location}, which was already free");
        }
        self.store.unindex_ticket(&mut lot, &id);

        ticket.exit = Some(exit);
        let fee = self.pricing.calculate(ticket.entry, exit);
        let stay = Span::new(ticket.entry, exit);
        let category = ticket.vehicle.category;
        let receipt = Receipt { ticket, stay, fee };

        info!(
            "ticket {id} closed for {} after {} min, fee {fee}",
            receipt.ticket.vehicle.plate,
            stay.duration_ms() / 60_000
        );
        metrics::counter!(EXITS_TOTAL, "category" => category.as_str()).increment(1);
        metrics::counter!(FEES_TOTAL, "category" => category.as_str()).increment(fee);
        self.record_occupancy(&lot, category);
        self.notify.send(&LotEvent::VehicleExited {
            receipt: receipt.clone(),
        });
        Ok(receipt)
    }

    /// Exit keyed by plate instead of ticket id. Losing a race with another
    /// exit for the same vehicle reports `NotParked`.
    pub async fn exit_by_plate(&self, plate: &str) -> Result<Receipt, EngineError> {
        let id = self
            .store
            .ticket_for_plate(plate)
            .ok_or_else(|| EngineError::NotParked(plate.to_string()))?;
        self.exit(id).await.map_err(|e| match e {
            EngineError::InvalidTicket(_) => EngineError::NotParked(plate.to_string()),
            other => other,
        })
    }

    fn record_occupancy(&self, lot: &LotState, category: VehicleCategory) {
        metrics::gauge!(SPOTS_FREE, "category" => category.as_str())
            .set(lot.free_count(category) as f64);
        metrics::gauge!(TICKETS_ACTIVE).set(self.store.ticket_count() as f64);
    }
}
