//! Ordered-list encoding: a plain JSON array.
//!
//! Usable as a field codec (`#[serde(with = "crate::codec::ordered")]`) or on
//! its own through [`encode_list`] / [`decode_list`]. Decoding keeps element
//! order and drops elements that decode to `null`.

use crate::{ModSyncError, Result};
use serde::de::{self, DeserializeOwned, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Serialize a list field in iteration order.
pub fn serialize<S, T>(items: &[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    serializer.collect_seq(items)
}

/// Deserialize a list field. A `null` field reads as an empty list.
pub fn deserialize<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = deserializer.deserialize_option(OrderedListVisitor(PhantomData))?;
    Ok(items.unwrap_or_default())
}

struct OrderedListVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedListVisitor<T> {
    type Value = Option<Vec<T>>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an array or null")
    }

    fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }

    fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Option<T>>()? {
            if let Some(item) = item {
                items.push(item);
            }
        }
        Ok(Some(items))
    }
}

/// Encode a list as a JSON array; `None` encodes to `null`.
pub fn encode_list<T: Serialize>(items: Option<&[T]>) -> Result<String> {
    Ok(serde_json::to_string(&items)?)
}

/// Decode a JSON array into an ordered list.
///
/// `null` decodes to `None`; any other non-array token is a decode error.
pub fn decode_list<T: DeserializeOwned>(raw: &str) -> Result<Option<Vec<T>>> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let items = deserializer
        .deserialize_option(OrderedListVisitor(PhantomData))
        .and_then(|items| deserializer.end().map(|_| items))
        .map_err(|e| ModSyncError::decode("ordered list", e))?;
    Ok(items)
}
