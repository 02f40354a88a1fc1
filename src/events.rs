use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque handle of the browser tab an event came from.
pub type TabId = i64;

/// One line of input from the browser side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    RequestCompleted {
        url: String,
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    SubmitClicked {
        tab_id: TabId,
        #[serde(default)]
        button_text: String,
        #[serde(default)]
        locator: Option<String>,
    },
    DomMutation {
        tab_id: TabId,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestCompleted {
    pub url: String,
    pub tab_id: Option<TabId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    ShowReviewDrawer(Value),
}

/// A message addressed to a tab, written out as one JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub tab_id: TabId,
    pub sent_at: DateTime<Utc>,
    pub message: ExtensionMessage,
}
