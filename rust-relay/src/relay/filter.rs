//! Subscription filtering.

use std::collections::HashMap;

use crate::config::ServiceConfig;
use crate::event::{Item, MessagingKind};

/// Translation from subscription field names to messaging kinds.
///
/// Services subscribe with the platform's group names (`messages`,
/// `message_deliveries`, ...) while messaging payloads are recognized by the
/// key they carry (`message`, `delivery`, ...).
#[derive(Debug, Clone)]
pub struct FieldTable {
    kinds: HashMap<&'static str, MessagingKind>,
}

impl Default for FieldTable {
    fn default() -> Self {
        let kinds = HashMap::from([
            ("messages", MessagingKind::Message),
            ("message_deliveries", MessagingKind::Delivery),
            ("messaging_optins", MessagingKind::Optin),
            ("messaging_postbacks", MessagingKind::Postback),
            ("message_reads", MessagingKind::Read),
        ]);
        Self { kinds }
    }
}

impl FieldTable {
    pub fn translate(&self, field: &str) -> Option<MessagingKind> {
        self.kinds.get(field).copied()
    }
}

/// Whether `service` wants `item`.
pub fn matches(service: &ServiceConfig, item: &Item, table: &FieldTable) -> bool {
    if service.fields.is_empty() {
        return true;
    }

    match item {
        Item::Change { field, .. } => service.fields.iter().any(|f| f == field),
        Item::Messaging { kind, .. } => service
            .fields
            .iter()
            .filter_map(|f| table.translate(f))
            .any(|translated| translated == *kind),
        Item::Unclassified { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Transport;
    use crate::event::ItemGroup;
    use serde_json::json;

    fn service(fields: &[&str]) -> ServiceConfig {
        ServiceConfig {
            name: "svc".to_string(),
            transport: Transport::Http {
                url: "http://localhost/hook".to_string(),
                token: None,
            },
            fields: fields.iter().map(|f| f.to_string()).collect(),
            test: false,
        }
    }

    fn change(field: &str) -> Item {
        Item::from_change(json!({"field": field, "value": {}}))
    }

    fn event(key: &str) -> Item {
        let mut payload = json!({"sender": {"id": "u"}});
        payload[key] = json!({});
        Item::from_messaging(payload)
    }

    #[test]
    fn test_empty_fields_match_everything() {
        let table = FieldTable::default();
        let svc = service(&[]);
        assert!(matches(&svc, &change("feed"), &table));
        assert!(matches(&svc, &event("read"), &table));
        let odd = Item::Unclassified {
            group: ItemGroup::Changes,
            payload: json!({}),
        };
        assert!(matches(&svc, &odd, &table));
    }

    #[test]
    fn test_change_matches_literal_field() {
        let table = FieldTable::default();
        let svc = service(&["feed", "mention"]);
        assert!(matches(&svc, &change("feed"), &table));
        assert!(matches(&svc, &change("mention"), &table));
        assert!(!matches(&svc, &change("ratings"), &table));
        assert!(!matches(&svc, &change("Feed"), &table));
    }

    #[test]
    fn test_messaging_matches_translated_field() {
        let table = FieldTable::default();
        let svc = service(&["messages"]);
        assert!(matches(&svc, &event("message"), &table));
        assert!(!matches(&svc, &event("delivery"), &table));
    }

    #[test]
    fn test_messaging_ignores_untranslatable_fields() {
        let table = FieldTable::default();
        let svc = service(&["feed", "message"]);
        assert!(!matches(&svc, &event("message"), &table));
    }

    #[test]
    fn test_all_translations() {
        let table = FieldTable::default();
        for (field, key) in [
            ("messages", "message"),
            ("message_deliveries", "delivery"),
            ("messaging_optins", "optin"),
            ("messaging_postbacks", "postback"),
            ("message_reads", "read"),
        ] {
            assert_eq!(table.translate(field).map(MessagingKind::key), Some(key));
            assert!(matches(&service(&[field]), &event(key), &table));
        }
    }

    #[test]
    fn test_messaging_without_sender_never_matches() {
        let table = FieldTable::default();
        let no_sender = Item::from_messaging(json!({"message": {"text": "hi"}}));
        assert!(!matches(&service(&["messages"]), &no_sender, &table));
    }

    #[test]
    fn test_unclassified_never_matches_non_empty_fields() {
        let table = FieldTable::default();
        let odd = Item::from_messaging(json!({"sender": {"id": "u"}}));
        assert!(!matches(&service(&["messages"]), &odd, &table));
    }
}
