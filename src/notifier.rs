use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use crate::events::{Delivery, ExtensionMessage, TabId};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Tab {0} is no longer reachable")]
    TargetGone(TabId),
    #[error("Invalid tab id {0}")]
    InvalidTarget(TabId),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, tab_id: TabId, message: ExtensionMessage) -> Result<(), NotifyError>;
}

/// Hands deliveries to the output writer over a channel.
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<Delivery>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::Sender<Delivery>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, tab_id: TabId, message: ExtensionMessage) -> Result<(), NotifyError> {
        if tab_id < 0 {
            return Err(NotifyError::InvalidTarget(tab_id));
        }

        let delivery = Delivery {
            tab_id,
            sent_at: Utc::now(),
            message,
        };
        self.sender
            .send(delivery)
            .await
            .map_err(|_| NotifyError::TargetGone(tab_id))
    }
}
