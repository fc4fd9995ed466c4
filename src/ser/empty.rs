//! Zero-value detection for `omitempty` fields.

use serde::ser::{self, Impossible, Serialize};

use crate::error::{Error, Result};
use crate::values::TOKEN;

/// Answers whether a value is empty: `false`, zero, an empty string, an
/// empty sequence or map, or `None`. Structs are never empty.
pub(super) struct EmptyProbe;

macro_rules! probe_zero {
    ($($method:ident: $ty:ty = $zero:expr,)*) => {
        $(
            fn $method(self, v: $ty) -> Result<bool> {
                Ok(v == $zero)
            }
        )*
    };
}

impl ser::Serializer for EmptyProbe {
    type Ok = bool;
    type Error = Error;
    type SerializeSeq = Count;
    type SerializeTuple = Count;
    type SerializeTupleStruct = Count;
    type SerializeTupleVariant = Impossible<bool, Error>;
    type SerializeMap = Count;
    type SerializeStruct = Count;
    type SerializeStructVariant = Impossible<bool, Error>;

    probe_zero! {
        serialize_bool: bool = false,
        serialize_i8: i8 = 0,
        serialize_i16: i16 = 0,
        serialize_i32: i32 = 0,
        serialize_i64: i64 = 0,
        serialize_i128: i128 = 0,
        serialize_u8: u8 = 0,
        serialize_u16: u16 = 0,
        serialize_u32: u32 = 0,
        serialize_u64: u64 = 0,
        serialize_u128: u128 = 0,
        serialize_f32: f32 = 0.0,
        serialize_f64: f64 = 0.0,
    }

    fn serialize_char(self, _v: char) -> Result<bool> {
        Ok(false)
    }

    fn serialize_str(self, v: &str) -> Result<bool> {
        Ok(v.is_empty())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<bool> {
        Ok(v.is_empty())
    }

    fn serialize_none(self) -> Result<bool> {
        Ok(true)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<bool> {
        Ok(false)
    }

    fn serialize_unit(self) -> Result<bool> {
        Ok(false)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<bool> {
        Ok(false)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<bool> {
        Ok(false)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<bool> {
        // hook types count as structs
        if name == TOKEN {
            return Ok(false);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<bool> {
        Ok(false)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Count> {
        Ok(Count(0))
    }

    fn serialize_tuple(self, len: usize) -> Result<Count> {
        Ok(Count(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Count> {
        Ok(Count(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Count> {
        Ok(Count(0))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Count> {
        Ok(Count(1))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::unsupported("struct variant"))
    }
}

/// Counts elements without looking at them.
pub(super) struct Count(usize);

impl ser::SerializeSeq for Count {
    type Ok = bool;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        self.0 += 1;
        Ok(())
    }

    fn end(self) -> Result<bool> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeTuple for Count {
    type Ok = bool;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<bool> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeTupleStruct for Count {
    type Ok = bool;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<bool> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeStruct for Count {
    type Ok = bool;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<bool> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeMap for Count {
    type Ok = bool;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, _key: &T) -> Result<()> {
        self.0 += 1;
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<bool> {
        Ok(self.0 == 0)
    }
}
