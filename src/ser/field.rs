//! Encoding of a single named value: a struct field or a map entry.

use serde::ser::{self, Impossible, Serialize, SerializeMap, SerializeStruct};

use super::raw::RawSerializer;
use super::{MapEncoder, StructEncoder};
use crate::error::{Error, Result};
use crate::key;
use crate::values::{TOKEN, Values};

/// Writes a value under `name` into the multimap of the enclosing struct
/// or map.
pub(super) struct FieldSerializer<'a> {
    name: &'a str,
    comma: bool,
    map_entry: bool,
    out: &'a mut Values,
}

impl<'a> FieldSerializer<'a> {
    pub fn field(name: &'a str, comma: bool, out: &'a mut Values) -> Self {
        FieldSerializer {
            name,
            comma,
            map_entry: false,
            out,
        }
    }

    pub fn map_entry(name: &'a str, out: &'a mut Values) -> Self {
        FieldSerializer {
            name,
            comma: false,
            map_entry: true,
            out,
        }
    }

    fn scalar(self, value: String) -> Result<()> {
        self.out.set(self.name, value);
        Ok(())
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::unsupported(format_args!("cannot encode {what} in `{}`", self.name))
    }
}

impl<'a> ser::Serializer for FieldSerializer<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = SeqEncoder<'a>;
    type SerializeTuple = SeqEncoder<'a>;
    type SerializeTupleStruct = SeqEncoder<'a>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Nested<'a, MapEncoder>;
    type SerializeStruct = Nested<'a, StructEncoder>;
    type SerializeStructVariant = Impossible<(), Error>;

    serialize_scalars!();

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(self.unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.scalar(String::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.scalar(String::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.scalar(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        if name == TOKEN {
            let raw = value.serialize(RawSerializer)?;
            key::merge_by_key(self.name, raw, self.out);
            return Ok(());
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(self.unsupported(&format!("the newtype variant {variant}")))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder<'a>> {
        Ok(SeqEncoder::new(self, len.unwrap_or_default()))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder<'a>> {
        Ok(SeqEncoder::new(self, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqEncoder<'a>> {
        Ok(SeqEncoder::new(self, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.unsupported(&format!("the tuple variant {variant}")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Nested<'a, MapEncoder>> {
        Ok(Nested {
            name: self.name,
            out: self.out,
            inner: MapEncoder::new(),
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Nested<'a, StructEncoder>> {
        if self.map_entry {
            return Err(self.unsupported(&format!("the struct {name} as a map value")));
        }
        Ok(Nested {
            name: self.name,
            out: self.out,
            inner: StructEncoder::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.unsupported(&format!("the struct variant {variant}")))
    }
}

/// A struct or map whose keys get nested under `name` once complete.
#[doc(hidden)]
pub struct Nested<'a, E> {
    name: &'a str,
    out: &'a mut Values,
    inner: E,
}

impl SerializeStruct for Nested<'_, StructEncoder> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.inner.serialize_field(key, value)
    }

    fn end(self) -> Result<()> {
        let values = self.inner.end()?;
        key::merge_by_key(self.name, values, self.out);
        Ok(())
    }
}

impl SerializeMap for Nested<'_, MapEncoder> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.inner.serialize_key(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.inner.serialize_value(value)
    }

    fn end(self) -> Result<()> {
        let values = self.inner.end()?;
        key::merge_by_key(self.name, values, self.out);
        Ok(())
    }
}

/// One encoded sequence element.
#[doc(hidden)]
pub enum Item {
    Scalar(String),
    Object(Values),
    Skip,
}

/// Collects the elements of a sequence before deciding on its layout.
///
/// Plain values go under `name[]`, or joined with commas under `name`.
/// Objects are flattened into `name[][key]` lists holding one value per
/// element, in element order.
#[doc(hidden)]
pub struct SeqEncoder<'a> {
    name: &'a str,
    comma: bool,
    out: &'a mut Values,
    items: Vec<Item>,
}

impl<'a> SeqEncoder<'a> {
    fn new(field: FieldSerializer<'a>, len: usize) -> Self {
        SeqEncoder {
            name: field.name,
            comma: field.comma,
            out: field.out,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let item = value.serialize(ElementSerializer { name: self.name })?;
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> Result<()> {
        let mut scalars = Vec::new();
        let mut objects = Vec::new();
        for item in self.items {
            match item {
                Item::Scalar(value) => scalars.push(value),
                Item::Object(values) => objects.push(values),
                Item::Skip => {}
            }
        }

        if !objects.is_empty() {
            if !scalars.is_empty() {
                return Err(Error::unsupported(format_args!(
                    "sequence `{}` mixes objects and plain values",
                    self.name
                )));
            }
            let mut merged = Values::new();
            for object in objects {
                for (key, list) in object {
                    merged.add(key, list.join(","));
                }
            }
            key::merge_by_key(&format!("{}[]", self.name), merged, self.out);
            return Ok(());
        }

        if scalars.is_empty() {
            return Ok(());
        }
        if self.comma {
            self.out.set(self.name, scalars.join(","));
        } else {
            self.out.insert(format!("{}[]", self.name), scalars);
        }
        Ok(())
    }
}

impl ser::SerializeSeq for SeqEncoder<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqEncoder<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqEncoder<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Encodes one element of a sequence.
struct ElementSerializer<'a> {
    name: &'a str,
}

impl ElementSerializer<'_> {
    fn scalar(self, value: String) -> Result<Item> {
        Ok(Item::Scalar(value))
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::unsupported(format_args!(
            "cannot encode {what} as an element of `{}`",
            self.name
        ))
    }
}

impl ser::Serializer for ElementSerializer<'_> {
    type Ok = Item;
    type Error = Error;
    type SerializeSeq = Impossible<Item, Error>;
    type SerializeTuple = Impossible<Item, Error>;
    type SerializeTupleStruct = Impossible<Item, Error>;
    type SerializeTupleVariant = Impossible<Item, Error>;
    type SerializeMap = Impossible<Item, Error>;
    type SerializeStruct = Element;
    type SerializeStructVariant = Impossible<Item, Error>;

    serialize_scalars!();

    fn serialize_bytes(self, _v: &[u8]) -> Result<Item> {
        Err(self.unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Item> {
        Ok(Item::Skip)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Item> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Item> {
        self.scalar(String::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Item> {
        self.scalar(String::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Item> {
        self.scalar(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Item> {
        if name == TOKEN {
            return value.serialize(RawSerializer).map(Item::Object);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Item> {
        Err(self.unsupported(&format!("the newtype variant {variant}")))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.unsupported("a nested sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.unsupported("a nested sequence"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.unsupported("a nested sequence"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.unsupported(&format!("the tuple variant {variant}")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.unsupported("a map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Element> {
        Ok(Element(StructEncoder::new()))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.unsupported(&format!("the struct variant {variant}")))
    }
}

/// A struct element of a sequence.
#[doc(hidden)]
pub struct Element(StructEncoder);

impl SerializeStruct for Element {
    type Ok = Item;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.0.serialize_field(key, value)
    }

    fn end(self) -> Result<Item> {
        self.0.end().map(Item::Object)
    }
}
