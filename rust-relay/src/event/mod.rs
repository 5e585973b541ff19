//! Inbound notification model.
//!
//! ```text
//! {object: "page", entry: [...]} → normalize() → Vec<Entry> → Item per change/messaging member
//! ```

pub mod normalize;
pub mod types;

pub use normalize::normalize;
pub use types::{
    Entry, InboundEnvelope, Item, ItemGroup, MessagingKind, OutboundEnvelope, PAGE_OBJECT,
};
