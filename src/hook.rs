//! Custom encoding and decoding of a type through [`Values`].
//!
//! A type implementing [`EncodeValues`] or [`DecodeValues`] owns the keys of
//! its namespace: structural encoding and decoding are skipped entirely.
//! Wire the traits up with `#[serde(with = "serde_railing::hook")]` on a
//! field, or call [`serialize`] and [`deserialize`] from a manual impl.
//!
//! What a hook sees depends on where its value lives:
//!
//! * in a field named `point`, keys `point[x]` and `point[y]` arrive as `x`
//!   and `y`;
//! * in a field holding a plain value list (`point=1,2`) the list arrives
//!   under the empty key;
//! * at the top level, or in an embedded field, the hook receives the
//!   whole remaining multimap.
//!
//! When encoding, keys returned by the hook are nested under the field's
//! name, and the empty key is written as the bare field name.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_railing::hook::{DecodeValues, EncodeValues};
//! use serde_railing::Values;
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl EncodeValues for Point {
//!     type Error = std::convert::Infallible;
//!
//!     fn encode_values(&self) -> Result<Values, Self::Error> {
//!         let mut values = Values::new();
//!         values.set("", format!("{},{}", self.x, self.y));
//!         Ok(values)
//!     }
//! }
//!
//! impl DecodeValues for Point {
//!     type Error = String;
//!
//!     fn decode_values(values: Values) -> Result<Self, Self::Error> {
//!         let raw = values.get("").ok_or("missing point")?;
//!         let (x, y) = raw.split_once(',').ok_or("expected `x,y`")?;
//!         Ok(Point {
//!             x: x.parse().map_err(|_| "bad x")?,
//!             y: y.parse().map_err(|_| "bad y")?,
//!         })
//!     }
//! }
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Shape {
//!     #[serde(with = "serde_railing::hook")]
//!     origin: Point,
//! }
//!
//! let shape = Shape { origin: Point { x: 1, y: -2 } };
//! let encoded = serde_railing::to_string(&shape).unwrap();
//! assert_eq!(encoded, "origin=1%2C-2");
//! assert_eq!(serde_railing::from_str::<Shape>(&encoded).unwrap(), shape);
//! ```

use std::any;
use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};

use crate::values::Values;

/// A type that produces its own flat multimap.
pub trait EncodeValues {
    type Error: Display;

    fn encode_values(&self) -> Result<Values, Self::Error>;
}

/// A type that builds itself from the multimap of its namespace.
pub trait DecodeValues: Sized {
    type Error: Display;

    fn decode_values(values: Values) -> Result<Self, Self::Error>;
}

fn failure<T: ?Sized>(err: impl Display) -> String {
    format!("hook for {} failed: {err}", any::type_name::<T>())
}

/// Serializes `value` through [`EncodeValues`].
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: EncodeValues + ?Sized,
    S: Serializer,
{
    let values = value
        .encode_values()
        .map_err(|err| ser::Error::custom(failure::<T>(err)))?;
    tracing::trace!(
        ty = any::type_name::<T>(),
        keys = values.len(),
        "hook produced values"
    );
    values.serialize(serializer)
}

/// Deserializes a value through [`DecodeValues`].
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DecodeValues,
    D: Deserializer<'de>,
{
    let values = Values::deserialize(deserializer)?;
    T::decode_values(values).map_err(|err| de::Error::custom(failure::<T>(err)))
}
