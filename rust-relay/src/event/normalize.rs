//! Envelope normalization.
//!
//! ```text
//! raw body → InboundEnvelope → Vec<Entry { account_id, time, items }>
//! ```

use tracing::{info, warn};

use crate::error::RelayError;
use crate::event::types::{Entry, InboundEnvelope, Item, PAGE_OBJECT};

/// Parse a raw notification body and flatten it into entries of typed items.
///
/// Rejects bodies that are not JSON envelopes and envelopes whose `object`
/// is not `page`. Entries carrying neither `changes` nor `messaging` yield
/// no items.
pub fn normalize(body: &[u8]) -> Result<Vec<Entry>, RelayError> {
    let envelope: InboundEnvelope = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body_length = body.len(), "envelope_malformed");
        RelayError::MalformedEnvelope(e.to_string())
    })?;

    if envelope.object != PAGE_OBJECT {
        warn!(object = %envelope.object, "envelope_object_unsupported");
        return Err(RelayError::UnsupportedObject(envelope.object));
    }

    let entries: Vec<Entry> = envelope
        .entry
        .into_iter()
        .map(|raw| {
            let changes = raw.changes.unwrap_or_default().into_iter().map(Item::from_change);
            let messaging = raw
                .messaging
                .unwrap_or_default()
                .into_iter()
                .map(Item::from_messaging);

            Entry {
                account_id: raw.id,
                time: raw.time,
                items: changes.chain(messaging).collect(),
            }
        })
        .collect();

    info!(
        entries = entries.len(),
        items = entries.iter().map(|e| e.items.len()).sum::<usize>(),
        "envelope_normalized"
    );

    Ok(entries)
}
