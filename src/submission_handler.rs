use serde_json::Value;
use tracing::{error, info};

use crate::events::{ExtensionMessage, TabId};
use crate::notifier::Notifier;

/// Returns whether the review message was actually delivered.
pub async fn handle_accepted_submission<N: Notifier + ?Sized>(
    notifier: &N,
    payload: &Value,
    submission_id: &str,
    tab_id: Option<TabId>,
) -> bool {
    let tab_id = match tab_id {
        Some(tab_id) if tab_id != 0 && tab_id != -1 => tab_id,
        _ => {
            info!("No tab to notify for submission {}", submission_id);
            return false;
        }
    };

    let message = ExtensionMessage::ShowReviewDrawer(payload.clone());
    match notifier.send(tab_id, message).await {
        Ok(()) => {
            info!("Review drawer requested for submission {} in tab {}", submission_id, tab_id);
            true
        }
        Err(e) => {
            error!("Failed to contact tab {} for submission {}: {}", tab_id, submission_id, e);
            false
        }
    }
}

pub fn handle_failed_submission(payload: &Value, submission_id: &str) {
    info!(submission_id, payload = %payload, "Failed submission");
}
