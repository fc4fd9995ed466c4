//! Deserialization support for bracket-notation values.
//!
//! Decoding is driven by the destination type. A struct claims its fields'
//! key groups one by one, in declaration order, and removes them from the
//! multimap; embedded fields are decoded afterwards from whatever is left.
//! A sequence of structs is rebuilt by zipping the values of every key in
//! its group, so `as[][Int]=1&as[][Int]=2&as[][Str]=a&as[][Str]=b` becomes
//! two elements `{Int: 1, Str: a}` and `{Int: 2, Str: b}`.

mod leaf;
mod parse;

pub(crate) use parse::parse;

use std::mem;
use std::vec;

use serde::de::{self, IntoDeserializer};

use crate::error::{Error, Result};
use crate::key;
use crate::tag::Directive;
use crate::values::{TOKEN, Values};

use leaf::{Leaf, Name};

/// Deserializes a value out of a flat multimap.
///
/// ```
/// use serde::Deserialize;
/// use serde_railing::Values;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Color {
///     r: u8,
///     g: u8,
///     b: u8,
/// }
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Theme {
///     name: String,
///     palette: Vec<Color>,
/// }
///
/// let values = Values::parse(
///     "name=dusk&palette[][r]=255&palette[][g]=0&palette[][b]=0\
///      &palette[][r]=0&palette[][g]=0&palette[][b]=128",
/// )
/// .unwrap();
/// let theme: Theme = serde_railing::from_values(values).unwrap();
/// assert_eq!(
///     theme,
///     Theme {
///         name: "dusk".to_owned(),
///         palette: vec![Color { r: 255, g: 0, b: 0 }, Color { r: 0, g: 0, b: 128 }],
///     }
/// );
/// ```
pub fn from_values<T: de::DeserializeOwned>(values: Values) -> Result<T> {
    T::deserialize(Deserializer::new(values))
}

/// Deserializes a query string.
///
/// ```
/// use std::collections::HashMap;
///
/// let map: HashMap<String, Vec<u32>> =
///     serde_railing::from_str("first_array[]=1&first_array[]=2").unwrap();
/// assert_eq!(map["first_array"], [1, 2]);
/// ```
pub fn from_str<T: de::DeserializeOwned>(input: &str) -> Result<T> {
    crate::Config::default().deserialize_str(input)
}

/// Deserializes a query string from raw bytes.
pub fn from_bytes<T: de::DeserializeOwned>(input: &[u8]) -> Result<T> {
    crate::Config::default().deserialize_bytes(input)
}

/// A deserializer for a whole multimap.
///
/// Only structs, maps, options of those, [`Value`](crate::Value) and types
/// going through [`Values`] can be decoded at this level.
pub struct Deserializer {
    values: Values,
}

impl Deserializer {
    pub fn new(values: Values) -> Self {
        Deserializer { values }
    }
}

macro_rules! refuse {
    ($err:expr; $($method:ident)*) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                Err($err)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(self.values).deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(self.values).deserialize_map(visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(self.values).deserialize_struct(name, fields, visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(self.values).deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(self.values).deserialize_option(visitor)
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::InvalidTarget("a sequence"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::InvalidTarget("a sequence"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::InvalidTarget("an enum"))
    }

    refuse! {
        Error::InvalidTarget("a sequence");
        deserialize_seq
    }

    refuse! {
        Error::InvalidTarget("a primitive");
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_f32
        deserialize_f64 deserialize_char deserialize_str deserialize_string deserialize_bytes
        deserialize_byte_buf deserialize_unit deserialize_identifier
    }
}

/// Hands a multimap over to [`Values`] as an ordinary map of string lists.
fn hand_over<'de, V>(values: Values, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    tracing::trace!(keys = values.len(), "hook receives values");
    let mut map: de::value::MapDeserializer<'de, _, Error> =
        de::value::MapDeserializer::new(values.into_iter());
    let value = visitor.visit_map(&mut map)?;
    map.end()?;
    Ok(value)
}

/// The key group owned by one field or map entry.
enum Slot {
    /// A value list stored under `name` or `name[]`.
    Flat(Vec<String>),
    /// Everything under `name[...]`, one bracket level stripped.
    Nested(Values),
    /// Keys left over once every direct field had its pick.
    Embedded,
    /// No key at all for the field.
    Absent(&'static str),
}

/// The multimap of a single namespace.
struct Object(Values);

macro_rules! mismatch {
    ($($method:ident => $ty:literal,)*) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                Err(Error::type_mismatch($ty, "object"))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Object {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(GroupAccess::new(self.0))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        tracing::trace!(name, keys = self.0.len(), "decoding struct");
        let mut values = self.0;
        visitor.visit_map(StructAccess::new(&mut values, fields)?)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TOKEN {
            return hand_over(self.0, visitor);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.0.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let records = split_records(self.0)?;
        visitor.visit_seq(Records {
            iter: records.into_iter(),
            padding: 0,
        })
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // fixed-size destinations drop surplus records and zero-fill the rest
        let mut records = split_records(self.0)?;
        records.truncate(len);
        let padding = len - records.len();
        visitor.visit_seq(Records {
            iter: records.into_iter(),
            padding,
        })
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::type_mismatch(name, "object"))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported(format_args!(
            "cannot decode the enum {name} from nested keys"
        )))
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    mismatch! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "string",
        deserialize_string => "string",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_unit => "unit",
        deserialize_identifier => "identifier",
    }
}

/// Splits an array-of-objects group into one multimap per element.
///
/// Every key of the group must hold the same number of values, otherwise
/// there is no telling which element a value belongs to.
fn split_records(values: Values) -> Result<Vec<Values>> {
    let mut lists = values.iter();
    let Some((_, first)) = lists.next() else {
        return Ok(Vec::new());
    };
    let len = first.len();
    for (key, list) in lists {
        if list.len() != len {
            tracing::debug!(
                key = key.as_str(),
                expected = len,
                found = list.len(),
                "object array has mismatched cardinality"
            );
            return Err(Error::IncompleteArrayData {
                key: key.clone(),
                expected: len,
                found: list.len(),
            });
        }
    }

    Ok((0..len)
        .map(|idx| {
            values
                .iter()
                .map(|(key, list)| (key.clone(), vec![list[idx].clone()]))
                .collect()
        })
        .collect())
}

struct Records {
    iter: vec::IntoIter<Values>,
    padding: usize,
}

impl<'de> de::SeqAccess<'de> for Records {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if let Some(record) = self.iter.next() {
            return seed.deserialize(Object(record)).map(Some);
        }
        if self.padding > 0 {
            self.padding -= 1;
            return seed.deserialize(Zero("element")).map(Some);
        }
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len() + self.padding)
    }
}

/// Stands in for a field or fixed-array element with no keys at all.
///
/// Every target decodes to its zero value: `0`, `""`, `false`, `None`, an
/// empty collection, or a struct whose fields are all zero.
struct Zero(&'static str);

macro_rules! zero_leaf {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                Leaf(Vec::new()).$method(visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Zero {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Leaf(Vec::new()).deserialize_any(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(Values::new()).deserialize_map(visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(Values::new()).deserialize_struct(name, fields, visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TOKEN {
            return hand_over(Values::new(), visitor);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(Zeros {
            field: self.0,
            remaining: len,
        })
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // enums have no zero variant
        Err(de::Error::missing_field(self.0))
    }

    zero_leaf! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char deserialize_str
        deserialize_string deserialize_bytes deserialize_byte_buf deserialize_option
        deserialize_unit deserialize_seq deserialize_identifier deserialize_ignored_any
    }
}

/// The elements of a zero-valued fixed array.
struct Zeros {
    field: &'static str,
    remaining: usize,
}

impl<'de> de::SeqAccess<'de> for Zeros {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(Zero(self.field)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Map access yielding one entry per top name.
struct GroupAccess {
    groups: vec::IntoIter<(String, Slot)>,
    pending: Option<Slot>,
}

impl GroupAccess {
    fn new(values: Values) -> Self {
        let groups: Vec<_> = key::top_names(&values)
            .into_iter()
            .map(|name| {
                let slot = match key::flat_values(&values, name) {
                    Some(list) => Slot::Flat(list.to_vec()),
                    None => Slot::Nested(key::sub_map(&values, name)),
                };
                (name.to_owned(), slot)
            })
            .collect();
        GroupAccess {
            groups: groups.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for GroupAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some((name, slot)) = self.groups.next() else {
            return Ok(None);
        };
        self.pending = Some(slot);
        seed.deserialize(Name(name)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(Slot::Flat(list)) => seed.deserialize(Leaf(list)),
            Some(Slot::Nested(values)) => seed.deserialize(Object(values)),
            Some(Slot::Embedded | Slot::Absent(_)) | None => {
                Err(Error::Custom("map value requested before its key".to_owned()))
            }
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.groups.len())
    }
}

/// Map access over the fields of a struct.
///
/// Direct fields claim their key groups up front and remove them from the
/// multimap. Embedded fields come last and decode from what remains.
struct StructAccess<'a> {
    residual: &'a mut Values,
    fields: vec::IntoIter<(&'static str, Slot)>,
    pending: Option<Slot>,
}

impl<'a> StructAccess<'a> {
    fn new(residual: &'a mut Values, fields: &'static [&'static str]) -> Result<Self> {
        let mut claimed = Vec::with_capacity(fields.len());
        let mut embedded = Vec::new();

        for &field in fields {
            let directive = Directive::parse(field);
            if directive.ignore {
                continue;
            }
            if directive.embed {
                embedded.push((field, Slot::Embedded));
                continue;
            }

            let name = directive.wire_name()?;
            let nested = key::sub_map(residual, name);
            let slot = if !nested.is_empty() {
                Slot::Nested(nested)
            } else {
                match key::flat_values(residual, name) {
                    Some(list) if directive.comma => Slot::Flat(split_commas(list)),
                    Some(list) => Slot::Flat(list.to_vec()),
                    None => {
                        claimed.push((field, Slot::Absent(field)));
                        continue;
                    }
                }
            };
            tracing::trace!(field, name, "field claims key group");
            key::release(residual, name);
            claimed.push((field, slot));
        }

        claimed.extend(embedded);
        Ok(StructAccess {
            residual,
            fields: claimed.into_iter(),
            pending: None,
        })
    }
}

fn split_commas(list: &[String]) -> Vec<String> {
    list.iter()
        .flat_map(|value| value.split(','))
        .map(str::to_owned)
        .collect()
}

impl<'de> de::MapAccess<'de> for StructAccess<'_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some((field, slot)) = self.fields.next() else {
            return Ok(None);
        };
        self.pending = Some(slot);
        let key: de::value::StrDeserializer<'_, Error> = field.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(Slot::Flat(list)) => seed.deserialize(Leaf(list)),
            Some(Slot::Nested(values)) => seed.deserialize(Object(values)),
            Some(Slot::Embedded) => {
                tracing::trace!(keys = self.residual.len(), "resolving embedded field");
                seed.deserialize(Embedded(&mut *self.residual))
            }
            Some(Slot::Absent(field)) => seed.deserialize(Zero(field)),
            None => Err(Error::Custom(
                "field value requested before its key".to_owned(),
            )),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// The keys of the enclosing struct not claimed by any direct field.
struct Embedded<'a>(&'a mut Values);

impl<'de> de::Deserializer<'de> for Embedded<'_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Object(mem::take(self.0)).deserialize_any(visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(StructAccess::new(self.0, fields)?)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.0.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TOKEN {
            return hand_over(mem::take(self.0), visitor);
        }
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map enum
        identifier ignored_any
    }
}
