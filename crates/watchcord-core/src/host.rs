use tokio::sync::mpsc;

/// Ask the host platform to re-read an entity's state. The only effect
/// the engine produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRefresh {
    pub entity_id: String,
    pub force: bool,
}

/// Registration metadata for one record: the parent sensor plus one child
/// per exposed attribute. A refresh of the parent covers its children, so
/// the host fans out without the engine issuing one request per child.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub entity_id: String,
    pub name: String,
    pub children: Vec<String>,
}

/// Outbound half of the host interface, shaped like an event bus: the
/// engine publishes refresh requests, the host drains them.
#[derive(Clone)]
pub struct HostBus {
    sender: mpsc::UnboundedSender<StateRefresh>,
}

impl HostBus {
    pub fn channel() -> (HostBus, mpsc::UnboundedReceiver<StateRefresh>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (HostBus { sender }, receiver)
    }

    pub fn request_refresh(&self, entity_id: &str, force: bool) {
        // the host side may already be gone during teardown
        let _ = self.sender.send(StateRefresh {
            entity_id: entity_id.to_string(),
            force,
        });
    }
}
