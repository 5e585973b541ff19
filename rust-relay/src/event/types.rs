//! Notification types.
//!
//! This module defines:
//! - Wire formats of the inbound envelope
//! - The normalized `Entry`/`Item` model the relay works with
//! - The single-item outbound envelope sent to services

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The only `object` value the relay accepts.
pub const PAGE_OBJECT: &str = "page";

// =============================================================================
// Normalized model
// =============================================================================

/// Kind of a conversational event, named after the key that marks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessagingKind {
    Message,
    Delivery,
    Optin,
    Postback,
    Read,
}

impl MessagingKind {
    /// Detection order; the first key present in a payload wins.
    pub const ALL: [MessagingKind; 5] = [
        MessagingKind::Message,
        MessagingKind::Delivery,
        MessagingKind::Optin,
        MessagingKind::Postback,
        MessagingKind::Read,
    ];

    /// Key that carries this kind inside a raw messaging payload.
    pub fn key(self) -> &'static str {
        match self {
            MessagingKind::Message => "message",
            MessagingKind::Delivery => "delivery",
            MessagingKind::Optin => "optin",
            MessagingKind::Postback => "postback",
            MessagingKind::Read => "read",
        }
    }

    pub fn detect(payload: &Value) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| payload.get(kind.key()).is_some())
    }
}

/// Array of an entry an item was read from, and is re-wrapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemGroup {
    Changes,
    Messaging,
}

/// One unit of notification data.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Content/feed update from a `changes` array
    Change { field: String, payload: Value },
    /// Conversational event from a `messaging` array
    Messaging { kind: MessagingKind, payload: Value },
    /// Payload without a recognizable `field` or kind key
    Unclassified { group: ItemGroup, payload: Value },
}

impl Item {
    /// Classify a member of a `changes` array.
    pub fn from_change(payload: Value) -> Self {
        match payload.get("field").and_then(Value::as_str) {
            Some(field) => Item::Change {
                field: field.to_string(),
                payload,
            },
            None => Item::Unclassified {
                group: ItemGroup::Changes,
                payload,
            },
        }
    }

    /// Classify a member of a `messaging` array. Events must carry a `sender`.
    pub fn from_messaging(payload: Value) -> Self {
        let kind = payload
            .get("sender")
            .and_then(|_| MessagingKind::detect(&payload));
        match kind {
            Some(kind) => Item::Messaging { kind, payload },
            None => Item::Unclassified {
                group: ItemGroup::Messaging,
                payload,
            },
        }
    }

    pub fn group(&self) -> ItemGroup {
        match self {
            Item::Change { .. } => ItemGroup::Changes,
            Item::Messaging { .. } => ItemGroup::Messaging,
            Item::Unclassified { group, .. } => *group,
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            Item::Change { payload, .. }
            | Item::Messaging { payload, .. }
            | Item::Unclassified { payload, .. } => payload,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            Item::Change { field, .. } => field,
            Item::Messaging { kind, .. } => kind.key(),
            Item::Unclassified { .. } => "unclassified",
        }
    }
}

/// One account's worth of notification data.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub account_id: String,
    pub time: i64,
    pub items: Vec<Item>,
}

// =============================================================================
// Inbound wire format
// =============================================================================

/// Notification body as posted by the platform.
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    pub object: String,
    pub entry: Vec<InboundEntry>,
}

/// Raw element of the `entry` array.
#[derive(Debug, Deserialize)]
pub struct InboundEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub time: i64,
    #[serde(default)]
    pub changes: Option<Vec<Value>>,
    #[serde(default)]
    pub messaging: Option<Vec<Value>>,
}

/// Account ids arrive as strings, but numeric ids are accepted too.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

// =============================================================================
// Outbound wire format
// =============================================================================

/// Envelope carrying exactly one item, shaped like the inbound one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEnvelope {
    pub object: &'static str,
    pub entry: Vec<OutboundEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEntry {
    pub id: String,
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging: Option<Vec<Value>>,
}

impl OutboundEnvelope {
    /// Re-wrap `item` under a one-element `entry` carrying the entry's id and time.
    pub fn for_item(entry: &Entry, item: &Item) -> Self {
        let wrapped = Some(vec![item.payload().clone()]);
        let (changes, messaging) = match item.group() {
            ItemGroup::Changes => (wrapped, None),
            ItemGroup::Messaging => (None, wrapped),
        };

        OutboundEnvelope {
            object: PAGE_OBJECT,
            entry: vec![OutboundEntry {
                id: entry.account_id.clone(),
                time: entry.time,
                changes,
                messaging,
            }],
        }
    }
}
