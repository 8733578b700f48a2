//! RecordId / bool 的 serde 适配
//!
//! 记录引用对外 (API JSON) 一律是 `"table:id"` 字符串；
//! 从 SurrealDB 读出时则是原生 RecordId 结构。两种都能反序列化。

use std::fmt;

use serde::de::{self, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// null 视为 true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// null 视为 false
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// 字符串或原生格式的 RecordId
struct WireId(RecordId);

struct WireIdVisitor;

impl<'de> Visitor<'de> for WireIdVisitor {
    type Value = WireId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a \"table:id\" string or a record id")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<WireId, E> {
        value
            .parse::<RecordId>()
            .map(WireId)
            .map_err(|_| E::custom(format!("invalid record id: {}", value)))
    }

    fn visit_map<M: de::MapAccess<'de>>(self, map: M) -> Result<WireId, M::Error> {
        RecordId::deserialize(de::value::MapAccessDeserializer::new(map)).map(WireId)
    }
}

impl<'de> Deserialize<'de> for WireId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WireIdVisitor)
    }
}

/// `RecordId` <-> `"table:id"`
pub mod record_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &RecordId, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<RecordId, D::Error> {
        Ok(WireId::deserialize(d)?.0)
    }
}

/// `Option<RecordId>`
pub mod option_record_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RecordId>, D::Error> {
        Ok(Option::<WireId>::deserialize(d)?.map(|w| w.0))
    }
}

/// `Vec<RecordId>`
pub mod vec_record_id {
    use super::*;

    pub fn serialize<S: Serializer>(ids: &[RecordId], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(ids.len()))?;
        for id in ids {
            seq.serialize_element(&id.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RecordId>, D::Error> {
        Ok(Vec::<WireId>::deserialize(d)?
            .into_iter()
            .map(|w| w.0)
            .collect())
    }
}
