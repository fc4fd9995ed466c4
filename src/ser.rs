//! Serialization support for bracket-notation values.
//!
//! Encoding happens in two steps. A value is first flattened into a
//! [`Values`] multimap, nested fields getting keys such as `user[name]` and
//! sequences keys such as `ids[]`. The multimap is then written out in a
//! deterministic order by [`Values::encode`] or [`Config`](crate::Config).

/// Generates the primitive methods of a serializer that hands every scalar,
/// formatted as a string, to its own `scalar` method.
macro_rules! serialize_scalars {
    () => {
        serialize_scalars! {
            itoa: u8 => serialize_u8, u16 => serialize_u16, u32 => serialize_u32,
            u64 => serialize_u64, u128 => serialize_u128, i8 => serialize_i8,
            i16 => serialize_i16, i32 => serialize_i32, i64 => serialize_i64,
            i128 => serialize_i128,
        }
        serialize_scalars! {
            ryu: f32 => serialize_f32, f64 => serialize_f64,
        }

        fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
            self.scalar(if v { "true" } else { "false" }.to_owned())
        }

        fn serialize_char(self, v: char) -> Result<Self::Ok> {
            self.scalar(v.to_string())
        }

        fn serialize_str(self, v: &str) -> Result<Self::Ok> {
            self.scalar(v.to_owned())
        }
    };
    (itoa: $($ty:ty => $method:ident,)*) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = itoa::Buffer::new();
                self.scalar(buffer.format(v).to_owned())
            }
        )*
    };
    (ryu: $($ty:ty => $method:ident,)*) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = ryu::Buffer::new();
                self.scalar(buffer.format(v).to_owned())
            }
        )*
    };
}

mod canonical;
mod empty;
mod encode;
mod field;
mod key;
mod raw;

pub(crate) use canonical::Canonical;

use std::io::Write;

use serde::ser::{self, Impossible, Serialize};

use crate::error::{Error, Result};
use crate::tag::Directive;
use crate::values::{TOKEN, Values};

use empty::EmptyProbe;
use field::FieldSerializer;
use key::KeySerializer;
use raw::RawSerializer;

/// Flattens a value into a [`Values`] multimap.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Address {
///     city: String,
/// }
///
/// #[derive(Serialize)]
/// struct User {
///     name: String,
///     #[serde(rename = "tags,omitempty")]
///     tags: Vec<String>,
///     address: Address,
/// }
///
/// let user = User {
///     name: "Alice".to_owned(),
///     tags: vec![],
///     address: Address { city: "Paris".to_owned() },
/// };
/// let values = serde_railing::to_values(&user).unwrap();
/// assert_eq!(values.get("name"), Some("Alice"));
/// assert_eq!(values.get("address[city]"), Some("Paris"));
/// assert!(!values.contains_key("tags[]"));
/// ```
pub fn to_values<T: Serialize + ?Sized>(input: &T) -> Result<Values> {
    input.serialize(Serializer)
}

/// Serializes a value into a form-encoded string.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Query {
///     name: String,
///     #[serde(rename = "ids,comma")]
///     ids: Vec<u32>,
///     age: u8,
/// }
///
/// let q = Query {
///     name: "Alice Smith".to_owned(),
///     ids: vec![1, 2],
///     age: 24,
/// };
/// assert_eq!(
///     serde_railing::to_string(&q).unwrap(),
///     "age=24&ids=1%2C2&name=Alice+Smith"
/// );
/// ```
pub fn to_string<T: Serialize + ?Sized>(input: &T) -> Result<String> {
    crate::Config::default().serialize_string(input)
}

/// Serializes a value into a generic writer.
pub fn to_writer<T: Serialize + ?Sized, W: Write>(input: &T, writer: &mut W) -> Result<()> {
    crate::Config::default().serialize_to_writer(input, writer)
}

fn top_level(what: &str) -> Error {
    Error::unsupported(format_args!(
        "cannot encode {what} at the top level, try a struct or a map"
    ))
}

/// A serializer producing a [`Values`] multimap.
///
/// Structs, maps, options of those and types going through [`Values`] are
/// accepted at the top level.
pub struct Serializer;

impl ser::Serializer for Serializer {
    type Ok = Values;
    type Error = Error;
    type SerializeSeq = Impossible<Values, Error>;
    type SerializeTuple = Impossible<Values, Error>;
    type SerializeTupleStruct = Impossible<Values, Error>;
    type SerializeTupleVariant = Impossible<Values, Error>;
    type SerializeMap = MapEncoder;
    type SerializeStruct = StructEncoder;
    type SerializeStructVariant = Impossible<Values, Error>;

    serialize_scalars!();

    fn serialize_bytes(self, _v: &[u8]) -> Result<Values> {
        Err(top_level("bytes"))
    }

    fn serialize_none(self) -> Result<Values> {
        Ok(Values::new())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Values> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Values> {
        Err(top_level("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Values> {
        Ok(Values::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Values> {
        Err(top_level("an enum"))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Values> {
        if name == TOKEN {
            return value.serialize(RawSerializer);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Values> {
        Err(top_level("an enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(top_level("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(top_level("a sequence"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(top_level("a sequence"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(top_level("an enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder> {
        Ok(MapEncoder::new())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructEncoder> {
        Ok(StructEncoder::new())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(top_level("an enum"))
    }
}

impl Serializer {
    fn scalar(self, _value: String) -> Result<Values> {
        Err(top_level("a primitive"))
    }
}

/// Encodes the fields of a struct.
///
/// Embedded fields are buffered until every direct field is written, and
/// only contribute keys nobody else has written.
#[doc(hidden)]
pub struct StructEncoder {
    values: Values,
    embedded: Vec<Values>,
}

impl StructEncoder {
    fn new() -> Self {
        StructEncoder {
            values: Values::new(),
            embedded: Vec::new(),
        }
    }
}

impl ser::SerializeStruct for StructEncoder {
    type Ok = Values;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        let directive = Directive::parse(key);
        if directive.ignore {
            return Ok(());
        }
        if directive.omit_empty && value.serialize(EmptyProbe)? {
            return Ok(());
        }
        if directive.embed {
            self.embedded.push(value.serialize(Serializer)?);
            return Ok(());
        }
        let name = directive.wire_name()?;
        value.serialize(FieldSerializer::field(name, directive.comma, &mut self.values))
    }

    fn end(self) -> Result<Values> {
        let mut values = self.values;
        for embedded in self.embedded {
            for (key, list) in embedded {
                if !values.contains_key(&key) {
                    values.insert(key, list);
                }
            }
        }
        Ok(values)
    }
}

/// Encodes the entries of a map, each under its key.
#[doc(hidden)]
pub struct MapEncoder {
    values: Values,
    key: Option<String>,
}

impl MapEncoder {
    fn new() -> Self {
        MapEncoder {
            values: Values::new(),
            key: None,
        }
    }
}

impl ser::SerializeMap for MapEncoder {
    type Ok = Values;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        let Some(name) = self.key.take() else {
            return Err(Error::Custom(
                "map value serialized before its key".to_owned(),
            ));
        };
        value.serialize(FieldSerializer::map_entry(&name, &mut self.values))
    }

    fn end(self) -> Result<Values> {
        Ok(self.values)
    }
}
