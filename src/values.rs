//! The flat multimap exchanged with forms and query strings.

use std::fmt;

use serde::de;
use serde::ser;

use crate::error::Result;
use crate::map::{self, Map};

/// Name of the newtype struct [`Values`] serializes through.
///
/// The serializer and deserializer of this crate recognize it and hand the
/// raw multimap of the current namespace over instead of walking the
/// contents. Any other format sees an ordinary map.
pub(crate) const TOKEN: &str = "$serde_railing::private::Values";

/// A flat mapping from wire keys to ordered lists of string values.
///
/// Keys are unique and the order of values under one key is preserved.
///
/// ```
/// use serde_railing::Values;
///
/// let mut values = Values::new();
/// values.add("ids[]", "1");
/// values.add("ids[]", "2");
/// values.set("name", "bob");
///
/// assert_eq!(values.get("name"), Some("bob"));
/// assert_eq!(values.get_all("ids[]").unwrap(), ["1", "2"]);
/// assert_eq!(values.encode(), "ids%5B%5D=1&ids%5B%5D=2&name=bob");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Values(Map<String, Vec<String>>);

impl Values {
    pub fn new() -> Self {
        Values(Map::new())
    }

    /// The first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|list| list.first())
            .map(String::as_str)
    }

    /// Every value stored under `key`.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Replaces the values under `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Appends a value to the list under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn insert(&mut self, key: impl Into<String>, list: Vec<String>) -> Option<Vec<String>> {
        self.0.insert(key.into(), list)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        map::remove(&mut self.0, key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &mut Vec<String>) -> bool,
    {
        self.0.retain(|key, list| keep(key, list));
    }

    /// Serializes the multimap into a deterministic, form-encoded string.
    ///
    /// Groups are sorted by their top name, and arrays of objects are
    /// written one element at a time so the output can be read back.
    /// See [`Config::encode`](crate::Config::encode) for other encodings.
    pub fn encode(&self) -> String {
        crate::Config::default().encode(self)
    }

    /// Parses a query string such as `a=1&b[]=2&b[]=3`.
    ///
    /// A leading `?` is skipped, `+` decodes to a space and `%XX` escapes
    /// are resolved.
    ///
    /// ```
    /// use serde_railing::Values;
    ///
    /// let values = Values::parse("?name=Bob+Smith&tags%5B%5D=a&tags[]=b&flag").unwrap();
    /// assert_eq!(values.get("name"), Some("Bob Smith"));
    /// assert_eq!(values.get_all("tags[]").unwrap(), ["a", "b"]);
    /// assert_eq!(values.get("flag"), Some(""));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        crate::de::parse(input.as_bytes())
    }

    pub fn into_inner(self) -> Map<String, Vec<String>> {
        self.0
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl From<Map<String, Vec<String>>> for Values {
    fn from(map: Map<String, Vec<String>>) -> Self {
        Values(map)
    }
}

impl FromIterator<(String, Vec<String>)> for Values {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Values(iter.into_iter().collect())
    }
}

impl Extend<(String, Vec<String>)> for Values {
    fn extend<I: IntoIterator<Item = (String, Vec<String>)>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for Values {
    type Item = (String, Vec<String>);
    type IntoIter = <Map<String, Vec<String>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = <&'a Map<String, Vec<String>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl ser::Serialize for Values {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_newtype_struct(TOKEN, &self.0)
    }
}

impl<'de> de::Deserialize<'de> for Values {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_newtype_struct(TOKEN, ValuesVisitor)
    }
}

struct ValuesVisitor;

impl<'de> de::Visitor<'de> for ValuesVisitor {
    type Value = Values;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of string lists")
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> std::result::Result<Values, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Values, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut values = Values::new();
        while let Some((key, list)) = access.next_entry::<String, Vec<String>>()? {
            values.insert(key, list);
        }
        Ok(values)
    }
}
