/// Serde helpers for SurrealDB record ids.

use serde::{Deserialize, Deserializer, Serializer};

/// SurrealDB hands back record ids as `Thing` values (`{tb, id}`), while the
/// API and every cross-table reference (`post_id`, `sender_id`, ...) carry
/// the bare id string. This module accepts either representation.
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IdValue {
            String(String),
            Thing { id: serde_json::Value },
        }

        match IdValue::deserialize(deserializer)? {
            IdValue::String(s) => Ok(s),
            IdValue::Thing { id } => match id {
                serde_json::Value::String(s) => Ok(s),
                serde_json::Value::Number(n) => Ok(n.to_string()),
                // id arrives variant-tagged when it round-trips through JSON
                serde_json::Value::Object(map) => map
                    .into_iter()
                    .next()
                    .map(|(_, v)| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .ok_or_else(|| serde::de::Error::custom("empty record id")),
                other => Ok(other.to_string()),
            },
        }
    }
}
