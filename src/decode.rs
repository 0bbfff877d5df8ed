//! Response decoding with configurable key and date strategies.
//!
//! The dispatch pipeline hands response bytes to [`decode`] together with
//! the strategies supplied by the caller. The key strategy rewrites object
//! keys over the parsed JSON tree; the date strategy is applied through a
//! forwarding [`serde::Deserializer`] adapter, so epoch numbers reach
//! string-expecting targets (such as `chrono::DateTime<Utc>`) as RFC 3339
//! text while ordinary numeric fields stay numbers.

use chrono::{DateTime, Utc};
use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, SeqAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::Value;

/// How timestamp values in the response body are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateDecodingStrategy {
    /// No interpretation; the target type decides (default).
    #[default]
    DeferToValue,
    /// Timestamps are RFC 3339 / ISO 8601 strings.
    Rfc3339,
    /// Timestamps are numbers of seconds since the Unix epoch.
    SecondsSinceEpoch,
    /// Timestamps are numbers of milliseconds since the Unix epoch.
    MillisecondsSinceEpoch,
}

/// How JSON object keys are mapped onto the target type's field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDecodingStrategy {
    /// Keys are used exactly as they appear (default).
    #[default]
    UseKeysAsIs,
    /// `camelCase` keys are rewritten to `snake_case` before decoding.
    ConvertToSnakeCase,
    /// `snake_case` keys are rewritten to `camelCase` before decoding.
    ConvertToCamelCase,
}

/// Decodes a JSON body into `T` under the given strategies.
///
/// With both strategies at their defaults this is a plain
/// `serde_json::from_slice`; otherwise the body is parsed to a value tree
/// first and decoded through the strategy adapter.
pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    dates: DateDecodingStrategy,
    keys: KeyDecodingStrategy,
) -> serde_json::Result<T> {
    if dates == DateDecodingStrategy::DeferToValue && keys == KeyDecodingStrategy::UseKeysAsIs {
        return serde_json::from_slice(bytes);
    }

    let mut value: Value = serde_json::from_slice(bytes)?;
    rewrite_keys(&mut value, keys);
    T::deserialize(StrategyDecoder {
        value,
        dates,
    })
}

fn rewrite_keys(value: &mut Value, strategy: KeyDecodingStrategy) {
    if strategy == KeyDecodingStrategy::UseKeysAsIs {
        return;
    }
    match value {
        Value::Object(map) => {
            let entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            for (key, mut child) in entries {
                rewrite_keys(&mut child, strategy);
                map.insert(convert_key(&key, strategy), child);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_keys(item, strategy);
            }
        }
        _ => {}
    }
}

fn convert_key(key: &str, strategy: KeyDecodingStrategy) -> String {
    match strategy {
        KeyDecodingStrategy::UseKeysAsIs => key.to_string(),
        KeyDecodingStrategy::ConvertToSnakeCase => snake_case(key),
        KeyDecodingStrategy::ConvertToCamelCase => camel_case(key),
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for segment in key.split('_').filter(|s| !s.is_empty()) {
        if out.is_empty() {
            out.push_str(segment);
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn epoch_to_rfc3339(strategy: DateDecodingStrategy, number: &serde_json::Number) -> Option<String> {
    let parsed = match strategy {
        DateDecodingStrategy::SecondsSinceEpoch => match number.as_i64() {
            Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0),
            None => number
                .as_f64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp_millis((secs * 1000.0) as i64)),
        },
        DateDecodingStrategy::MillisecondsSinceEpoch => {
            number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis)
        }
        _ => None,
    };
    parsed.map(|dt| dt.to_rfc3339())
}

/// Owned-value deserializer that carries the date strategy down the tree.
///
/// Only string-expecting targets observe the strategy: when the underlying
/// value is a number and an epoch strategy is active, `deserialize_str`
/// surfaces the converted RFC 3339 text instead. All other requests forward
/// to self-describing deserialization.
struct StrategyDecoder {
    value: Value,
    dates: DateDecodingStrategy,
}

impl<'de> Deserializer<'de> for StrategyDecoder {
    type Error = serde_json::Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(f) = n.as_f64() {
                    visitor.visit_f64(f)
                } else {
                    Err(de::Error::custom("number is not representable"))
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visitor.visit_seq(SeqDecoder {
                iter: items.into_iter(),
                dates: self.dates,
            }),
            Value::Object(map) => visitor.visit_map(MapDecoder {
                iter: map.into_iter(),
                pending: None,
                dates: self.dates,
            }),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if let Value::Number(number) = &self.value {
            if let Some(text) = epoch_to_rfc3339(self.dates, number) {
                return visitor.visit_string(text);
            }
        }
        self.deserialize_any(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Date rewriting does not descend into enum payloads.
        self.value.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char bytes
        byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct SeqDecoder {
    iter: std::vec::IntoIter<Value>,
    dates: DateDecodingStrategy,
}

impl<'de> SeqAccess<'de> for SeqDecoder {
    type Error = serde_json::Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(StrategyDecoder {
                    value,
                    dates: self.dates,
                })
                .map(Some),
            None => Ok(None),
        }
    }
}

struct MapDecoder {
    iter: serde_json::map::IntoIter,
    pending: Option<Value>,
    dates: DateDecodingStrategy,
}

impl<'de> MapAccess<'de> for MapDecoder {
    type Error = serde_json::Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                let key: StringDeserializer<serde_json::Error> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| de::Error::custom("map value requested before key"))?;
        seed.deserialize(StrategyDecoder {
            value,
            dates: self.dates,
        })
    }
}
