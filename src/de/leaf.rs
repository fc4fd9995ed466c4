//! Deserializers for flat value lists and map keys.

use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use std::vec;

use serde::de::{self, IntoDeserializer};

use crate::error::{Error, Result};
use crate::values::{TOKEN, Values};

/// The value list found under `name` or `name[]`.
///
/// Primitives read the first value and fall back to their zero value when the
/// list is empty. Sequences read one element per value.
pub(crate) struct Leaf(pub Vec<String>);

impl Leaf {
    fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    fn into_first(self) -> Option<String> {
        self.0.into_iter().next()
    }
}

fn parse_int<T>(value: &str, ty: &'static str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    value.parse().map_err(|err: ParseIntError| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::NumericOverflow {
            value: value.to_owned(),
            ty,
        },
        _ => Error::Parse {
            value: value.to_owned(),
            ty,
        },
    })
}

/// `inf` and `infinity` parse to an infinite float without overflowing.
fn is_infinity_literal(value: &str) -> bool {
    let unsigned = value.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

macro_rules! deserialize_int {
    ($($method:ident => $visit:ident: $ty:ident,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                match self.first() {
                    Some(value) => visitor.$visit(parse_int::<$ty>(value, stringify!($ty))?),
                    None => visitor.$visit(0),
                }
            }
        )*
    };
}

macro_rules! deserialize_float {
    ($($method:ident => $visit:ident: $ty:ident,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let Some(value) = self.first() else {
                    return visitor.$visit(0.0);
                };
                let n: $ty = value.parse().map_err(|_| Error::Parse {
                    value: value.to_owned(),
                    ty: stringify!($ty),
                })?;
                if n.is_infinite() && !is_infinity_literal(value) {
                    return Err(Error::NumericOverflow {
                        value: value.to_owned(),
                        ty: stringify!($ty),
                    });
                }
                visitor.$visit(n)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Leaf {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    deserialize_int! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
    }

    deserialize_float! {
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.first() {
            None | Some("false") => visitor.visit_bool(false),
            Some("true") => visitor.visit_bool(true),
            Some(value) => Err(Error::Parse {
                value: value.to_owned(),
                ty: "bool",
            }),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let Some(value) = self.first() else {
            return visitor.visit_char('\0');
        };
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::Parse {
                value: value.to_owned(),
                ty: "char",
            }),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.into_first().unwrap_or_default())
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.into_first().unwrap_or_default().into_bytes())
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

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == TOKEN {
            // a hook reading a plain value list sees it under the empty key
            let mut values = Values::new();
            values.insert("", self.0);
            return super::hand_over(values, visitor);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(LeafSeq {
            iter: self.0.into_iter(),
            padding: 0,
        })
    }

    fn deserialize_tuple<V>(mut self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // fixed-size destinations drop surplus values and zero-fill the rest
        self.0.truncate(len);
        let padding = len - self.0.len();
        visitor.visit_seq(LeafSeq {
            iter: self.0.into_iter(),
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

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::type_mismatch("map", "value list"))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::type_mismatch(name, "value list"))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.into_first() {
            Some(variant) => visitor.visit_enum(Variant(variant)),
            None => Err(Error::type_mismatch(name, "empty value list")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct LeafSeq {
    iter: vec::IntoIter<String>,
    padding: usize,
}

impl<'de> de::SeqAccess<'de> for LeafSeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if let Some(value) = self.iter.next() {
            return seed.deserialize(Leaf(vec![value])).map(Some);
        }
        if self.padding > 0 {
            self.padding -= 1;
            return seed.deserialize(Leaf(Vec::new())).map(Some);
        }
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len() + self.padding)
    }
}

/// A map key. Only string-like destinations are accepted.
pub(crate) struct Name(pub String);

macro_rules! reject_key {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                Err(Error::unsupported(format_args!(
                    "map key {:?} must decode into a string",
                    self.0
                )))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Name {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.0)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(Variant(self.0))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    reject_key! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_u128 deserialize_f32 deserialize_f64 deserialize_option deserialize_unit
        deserialize_seq deserialize_map
    }

    serde::forward_to_deserialize_any! {
        char str string bytes byte_buf unit_struct tuple tuple_struct struct
        identifier ignored_any
    }
}

/// A unit variant read from its name.
struct Variant(String);

impl<'de> de::EnumAccess<'de> for Variant {
    type Error = Error;
    type Variant = UnitOnly;

    fn variant_seed<T>(self, seed: T) -> Result<(T::Value, UnitOnly)>
    where
        T: de::DeserializeSeed<'de>,
    {
        let deserializer: de::value::StringDeserializer<Error> = self.0.into_deserializer();
        seed.deserialize(deserializer).map(|variant| (variant, UnitOnly))
    }
}

pub(crate) struct UnitOnly;

impl<'de> de::VariantAccess<'de> for UnitOnly {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(Error::unsupported("newtype variant"))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported("tuple variant"))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported("struct variant"))
    }
}
