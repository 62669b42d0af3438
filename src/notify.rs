use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::LotEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for lot events, one channel per floor.
pub struct NotifyHub {
    channels: DashMap<u32, broadcast::Sender<LotEvent>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events on a floor. Creates the channel if needed.
    pub fn subscribe(&self, floor: u32) -> broadcast::Receiver<LotEvent> {
        let sender = self
            .channels
            .entry(floor)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an event to its floor. No-op if nobody is listening.
    pub fn send(&self, event: &LotEvent) {
        if let Some(sender) = self.channels.get(&event.floor()) {
            let _ = sender.send(event.clone());
        }
    }
}
