use tokio::sync::mpsc;
use watchcord_models::GatewayEvent;

const EVENT_BUFFER: usize = 256;

/// Build the event pipe between the connection owner and the
/// synchronizer. mpsc rather than broadcast: there is exactly one
/// consumer, and handlers must observe emission order.
pub fn event_channel() -> (EventSender, EventStream) {
    let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
    (EventSender { sender }, EventStream { receiver })
}

#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<GatewayEvent>,
}

impl EventSender {
    /// Queue an event for the synchronizer. Returns `false` once the
    /// consumer side has shut down.
    pub async fn emit(&self, event: GatewayEvent) -> bool {
        if self.sender.send(event).await.is_err() {
            tracing::debug!("event dropped: synchronizer has shut down");
            return false;
        }
        true
    }
}

/// Consumer half held by the synchronizer's run loop.
pub struct EventStream {
    receiver: mpsc::Receiver<GatewayEvent>,
}

impl EventStream {
    /// Next event in emission order, or `None` when every sender is gone.
    pub async fn next(&mut self) -> Option<GatewayEvent> {
        self.receiver.recv().await
    }
}
