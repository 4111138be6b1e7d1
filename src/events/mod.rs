use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::fields::EntityType;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event; a closed channel is logged and otherwise ignored so the
    /// caller's write still succeeds.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }
}

// Events emitted after a field store or entity write has committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Field definition events
    FieldDefinitionCreated {
        id: Uuid,
        entity_type: EntityType,
        field_name: String,
    },
    FieldDefinitionDeleted {
        id: Uuid,
        entity_type: EntityType,
        field_name: String,
    },

    // Field config events
    FieldConfigCreated {
        id: Uuid,
        entity_type: EntityType,
        field_name: String,
    },
    FieldConfigUpdated {
        id: Uuid,
        entity_type: EntityType,
    },
    FieldConfigDeleted {
        id: Uuid,
        entity_type: EntityType,
        field_name: String,
    },
    FieldConfigReordered {
        entity_type: EntityType,
    },

    // Entity events
    EntityCreated {
        entity_type: EntityType,
        id: Uuid,
    },
    EntityUpdated {
        entity_type: EntityType,
        id: Uuid,
        version: i32,
    },
    EntityDeleted {
        entity_type: EntityType,
        id: Uuid,
    },
}

impl Event {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Event::FieldDefinitionCreated { entity_type, .. }
            | Event::FieldDefinitionDeleted { entity_type, .. }
            | Event::FieldConfigCreated { entity_type, .. }
            | Event::FieldConfigUpdated { entity_type, .. }
            | Event::FieldConfigDeleted { entity_type, .. }
            | Event::FieldConfigReordered { entity_type }
            | Event::EntityCreated { entity_type, .. }
            | Event::EntityUpdated { entity_type, .. }
            | Event::EntityDeleted { entity_type, .. } => *entity_type,
        }
    }
}

pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Background consumer; runs until every sender has been dropped
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!("Received event: {:?}", event);

        match &event {
            Event::FieldDefinitionCreated {
                id,
                entity_type,
                field_name,
            } => {
                info!(%id, %entity_type, %field_name, "Custom field defined");
            }
            Event::FieldDefinitionDeleted {
                id,
                entity_type,
                field_name,
            } => {
                // Stored custom_data values under this key are left in place
                info!(%id, %entity_type, %field_name, "Custom field definition removed");
            }
            Event::FieldConfigCreated {
                id,
                entity_type,
                field_name,
            } => {
                info!(%id, %entity_type, %field_name, "Field config created");
            }
            Event::FieldConfigDeleted {
                id,
                entity_type,
                field_name,
            } => {
                info!(%id, %entity_type, %field_name, "Field config deleted");
            }
            Event::FieldConfigUpdated { .. } | Event::FieldConfigReordered { .. } => {
                info!(entity_type = %event.entity_type(), "Field layout changed");
            }
            Event::EntityCreated { entity_type, id } => {
                info!(%entity_type, %id, "Record created");
            }
            Event::EntityUpdated {
                entity_type,
                id,
                version,
            } => {
                info!(%entity_type, %id, version, "Record updated");
            }
            Event::EntityDeleted { entity_type, id } => {
                info!(%entity_type, %id, "Record deleted");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_the_receiver() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();
        sender
            .send(Event::EntityCreated {
                entity_type: EntityType::Customer,
                id,
            })
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.entity_type(), EntityType::Customer);
        assert_eq!(
            received,
            Event::EntityCreated {
                entity_type: EntityType::Customer,
                id
            }
        );
    }

    #[tokio::test]
    async fn closed_channel_does_not_fail_the_caller() {
        let (sender, rx) = channel(1);
        drop(rx);

        assert!(sender
            .send(Event::FieldConfigReordered {
                entity_type: EntityType::Order
            })
            .await
            .is_err());
        sender
            .send_or_log(Event::FieldConfigReordered {
                entity_type: EntityType::Order,
            })
            .await;
    }

    #[tokio::test]
    async fn processing_loop_ends_when_senders_drop() {
        let (sender, rx) = channel(8);
        let handle = tokio::spawn(process_events(rx));
        sender
            .send_or_log(Event::EntityDeleted {
                entity_type: EntityType::Inquiry,
                id: Uuid::new_v4(),
            })
            .await;
        drop(sender);
        handle.await.unwrap();
    }
}
