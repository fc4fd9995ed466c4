//! Capture of a [`Values`] multimap passed through serde.

use serde::ser::{self, Impossible, Serialize};

use super::key::KeySerializer;
use crate::error::{Error, Result};
use crate::values::Values;

fn not_raw() -> Error {
    Error::Custom("expected a map of string lists".to_owned())
}

macro_rules! reject {
    ($ok:ty; $($method:ident: $ty:ty,)*) => {
        $(
            fn $method(self, _: $ty) -> Result<$ok> {
                Err(not_raw())
            }
        )*
    };
}

macro_rules! reject_compound {
    ($ok:ty) => {
        fn serialize_unit(self) -> Result<$ok> {
            Err(not_raw())
        }

        fn serialize_none(self) -> Result<$ok> {
            Err(not_raw())
        }

        fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<$ok> {
            Err(not_raw())
        }

        fn serialize_unit_variant(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
        ) -> Result<$ok> {
            Err(not_raw())
        }

        fn serialize_newtype_struct<T: ?Sized + Serialize>(
            self,
            _name: &'static str,
            value: &T,
        ) -> Result<$ok> {
            value.serialize(self)
        }

        fn serialize_newtype_variant<T: ?Sized + Serialize>(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _value: &T,
        ) -> Result<$ok> {
            Err(not_raw())
        }

        fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
            Err(not_raw())
        }

        fn serialize_tuple_struct(
            self,
            _name: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeTupleStruct> {
            Err(not_raw())
        }

        fn serialize_tuple_variant(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeTupleVariant> {
            Err(not_raw())
        }

        fn serialize_struct(
            self,
            _name: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeStruct> {
            Err(not_raw())
        }

        fn serialize_struct_variant(
            self,
            _name: &'static str,
            _variant_index: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self::SerializeStructVariant> {
            Err(not_raw())
        }
    };
}

/// Reads back the map a [`Values`] serializes itself as.
pub(super) struct RawSerializer;

impl ser::Serializer for RawSerializer {
    type Ok = Values;
    type Error = Error;
    type SerializeSeq = Impossible<Values, Error>;
    type SerializeTuple = Impossible<Values, Error>;
    type SerializeTupleStruct = Impossible<Values, Error>;
    type SerializeTupleVariant = Impossible<Values, Error>;
    type SerializeMap = RawMap;
    type SerializeStruct = Impossible<Values, Error>;
    type SerializeStructVariant = Impossible<Values, Error>;

    fn serialize_map(self, _len: Option<usize>) -> Result<RawMap> {
        Ok(RawMap {
            values: Values::new(),
            key: None,
        })
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(not_raw())
    }

    reject! {
        Values;
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
        serialize_unit_struct: &'static str,
    }

    reject_compound!(Values);
}

pub(super) struct RawMap {
    values: Values,
    key: Option<String>,
}

impl ser::SerializeMap for RawMap {
    type Ok = Values;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self.key.take().ok_or_else(not_raw)?;
        let list = value.serialize(ListSerializer)?;
        self.values.insert(key, list);
        Ok(())
    }

    fn end(self) -> Result<Values> {
        Ok(self.values)
    }
}

/// Reads back one string list of a raw multimap.
struct ListSerializer;

impl ser::Serializer for ListSerializer {
    type Ok = Vec<String>;
    type Error = Error;
    type SerializeSeq = RawList;
    type SerializeTuple = Impossible<Vec<String>, Error>;
    type SerializeTupleStruct = Impossible<Vec<String>, Error>;
    type SerializeTupleVariant = Impossible<Vec<String>, Error>;
    type SerializeMap = Impossible<Vec<String>, Error>;
    type SerializeStruct = Impossible<Vec<String>, Error>;
    type SerializeStructVariant = Impossible<Vec<String>, Error>;

    fn serialize_seq(self, len: Option<usize>) -> Result<RawList> {
        Ok(RawList(Vec::with_capacity(len.unwrap_or_default())))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(not_raw())
    }

    reject! {
        Vec<String>;
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
        serialize_unit_struct: &'static str,
    }

    reject_compound!(Vec<String>);
}

struct RawList(Vec<String>);

impl ser::SerializeSeq for RawList {
    type Ok = Vec<String>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.0.push(value.serialize(KeySerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Vec<String>> {
        Ok(self.0)
    }
}
