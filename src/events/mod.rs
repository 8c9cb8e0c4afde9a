use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lifecycle events emitted after a transition commits. Consumers are
/// in-process today (logging, metrics); the channel keeps transition handlers
/// free of notification latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    QuoteAccepted {
        quote_id: i64,
        item_id: i64,
        sales_order_id: i64,
    },
    ProductionReleased {
        production_order_id: i64,
    },
    ProductionStarted {
        production_order_id: i64,
        materials_reserved: usize,
        materials_insufficient: usize,
    },
    MaterialsSynced {
        production_order_id: i64,
        item_count: usize,
    },
    ReservationShortfall {
        production_order_id: i64,
        item_id: i64,
        required: Decimal,
        available: Decimal,
    },
    ProductionCompleted {
        production_order_id: i64,
        quantity_good: Decimal,
        quantity_bad: Decimal,
    },
    ProductionCancelled {
        production_order_id: i64,
    },
    QcPassed {
        production_order_id: i64,
    },
    QcFailed {
        production_order_id: i64,
        reason: String,
    },
    RemakeCreated {
        production_order_id: i64,
        source_order_id: i64,
        quantity: Decimal,
    },
    OrderReadyToShip {
        sales_order_id: i64,
    },
    OrderShipped {
        sales_order_id: i64,
        carrier: String,
        tracking_number: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {}", e))
    }

    /// Fire-and-forget: transitions must not fail because a consumer lags.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event dropped: {}", e);
        }
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event. Spawned once at startup.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "event processed");
    }
}
