//! A loosely typed nested value, for when the destination shape is unknown.

use std::fmt;

use serde::de;
use serde::ser::{self, SerializeMap};

use crate::key::{self, PathKey};
use crate::map::Map;
use crate::values::Values;

/// Either a list of strings or a mapping of names to nested values.
///
/// Built from a [`Values`] multimap: any key that is exactly `name` or
/// `name[]` becomes a list, anything nested under `name[...]` becomes a map.
///
/// ```
/// use serde_railing::{Value, Values};
///
/// let values = Values::parse("a=1&b[]=2&b[]=3&c[d]=4").unwrap();
/// let value = Value::from_values(&values);
///
/// assert_eq!(value["a"].as_list().unwrap(), ["1"]);
/// assert_eq!(value["b"].as_list().unwrap(), ["2", "3"]);
/// assert_eq!(value["c"]["d"].as_list().unwrap(), ["4"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    List(Vec<String>),
    Map(Map<String, Value>),
}

impl Value {
    /// Builds a nested value out of a flat multimap. Always returns
    /// [`Value::Map`], which is empty for an empty multimap.
    pub fn from_values(values: &Values) -> Value {
        let mut map = Map::new();
        for name in key::top_names(values) {
            let value = match key::flat_values(values, name) {
                Some(list) => Value::List(list.to_vec()),
                None => Value::from_values(&key::sub_map(values, name)),
            };
            map.insert(name.to_owned(), value);
        }
        Value::Map(map)
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(list) => Some(list),
            Value::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            Value::List(_) => None,
        }
    }

    /// Looks up a nested entry, `None` for lists and missing names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(name))
    }

    /// Flattens the value back into bracket notation. Lists are always written
    /// as `name[]`, whatever their length, the same as serializing the value.
    pub fn to_values(&self) -> Values {
        let mut values = Values::new();
        if let Value::Map(map) = self {
            for (name, value) in map {
                value.flatten_into(name, &mut values);
            }
        }
        values
    }

    fn flatten_into(&self, path: &str, out: &mut Values) {
        match self {
            Value::List(list) => {
                out.insert(format!("{path}[]"), list.clone());
            }
            Value::Map(map) => {
                for (name, value) in map {
                    let top = PathKey::parse(name).top;
                    value.flatten_into(&format!("{path}[{top}]"), out);
                }
            }
        }
    }
}

impl std::ops::Index<&str> for Value {
    type Output = Value;

    /// Panics if the entry is missing or this is a list.
    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no entry named {name:?}"),
        }
    }
}

impl From<&Values> for Value {
    fn from(values: &Values) -> Self {
        Value::from_values(values)
    }
}

impl ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Value::List(list) => list.serialize(serializer),
            Value::Map(map) => {
                let mut access = serializer.serialize_map(Some(map.len()))?;
                for (name, value) in map {
                    access.serialize_entry(name, value)?;
                }
                access.end()
            }
        }
    }
}

impl<'de> de::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> de::Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a list of strings or a map of values")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::List(vec![v.to_owned()]))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::List(vec![v]))
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut list = Vec::new();
        while let Some(item) = access.next_element::<String>()? {
            list.push(item);
        }
        Ok(Value::List(list))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut map = Map::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            map.insert(name, value);
        }
        Ok(Value::Map(map))
    }
}
