//! Serde support for Rails-style bracket key/value data
//!
//! Form bodies and query strings are flat: every key maps to a list of
//! strings. Rails and Rack encode nested data in such a multimap by naming
//! keys with brackets:
//!
//! ```text
//! user[name]=Bob&user[tags][]=admin&user[tags][]=ops&ids[]=1&ids[]=2
//! ```
//!
//! This crate converts between that flat [`Values`] multimap and typed Rust
//! values, in both directions.
//!
//! ## Supported Types
//!
//! At the **top level** only structs, maps, options of those, the dynamic
//! [`Value`] and types going through [`Values`] are supported, since every
//! piece of data needs a key.
//!
//! Below the top level:
//!
//! - primitives (strings, integers, floats, booleans, chars) and unit-only
//!   enums are leaves, holding the values of one key;
//! - sequences of primitives are the value list of `name[]` (or `name`);
//! - structs and maps nest one bracket level (`name[field]`);
//! - sequences of structs are spread across one key per field
//!   (`name[][field]`), each key holding one value per element.
//!
//! ## Field directives
//!
//! A field's serde name may carry options after a comma:
//!
//! - `omitempty`: the field is not encoded when it holds its zero value;
//! - `comma`: a sequence is encoded as a single comma-joined value, and
//!   comma-joined values are split when decoding;
//! - `embed`: the fields of the inner struct live at the parent level. Direct
//!   fields take precedence over embedded ones.
//!
//! A serde name of `-` skips the field.
//!
//! ## Usage
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Color {
//!     #[serde(rename = "R")]
//!     r: u8,
//!     #[serde(rename = "G")]
//!     g: u8,
//!     #[serde(rename = "B")]
//!     b: u8,
//! }
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Theme {
//!     name: String,
//!     #[serde(rename = "tags,omitempty,comma")]
//!     tags: Vec<String>,
//!     palette: Vec<Color>,
//! }
//!
//! let theme = Theme {
//!     name: "dusk".to_owned(),
//!     tags: vec!["dark".to_owned(), "warm".to_owned()],
//!     palette: vec![Color { r: 255, g: 0, b: 0 }, Color { r: 0, g: 0, b: 255 }],
//! };
//!
//! let encoded = serde_railing::Config::new()
//!     .use_form_encoding(false)
//!     .serialize_string(&theme)
//!     .unwrap();
//! assert_eq!(
//!     encoded,
//!     "name=dusk&\
//!      palette[][B]=0&palette[][G]=0&palette[][R]=255&\
//!      palette[][B]=255&palette[][G]=0&palette[][R]=0&\
//!      tags=dark,warm"
//! );
//!
//! let decoded: Theme = serde_railing::from_str(&encoded).unwrap();
//! assert_eq!(decoded, theme);
//! ```
//!
//! Data with no fixed shape can be decoded into [`Value`]:
//!
//! ```
//! use serde_railing::Value;
//!
//! let value: Value = serde_railing::from_str("a[b][]=1&a[b][]=2&c=3").unwrap();
//! assert_eq!(value["a"]["b"].as_list(), Some(&["1".to_owned(), "2".to_owned()][..]));
//! assert_eq!(value["c"].as_list(), Some(&["3".to_owned()][..]));
//! ```

mod config;
mod de;
mod error;
pub mod hook;
mod key;
pub mod map;
mod ser;
mod tag;
mod value;
mod values;

pub use config::Config;
#[doc(inline)]
pub use de::{Deserializer, from_bytes, from_str, from_values};
pub use error::{Error, Result};
#[doc(inline)]
pub use hook::{DecodeValues, EncodeValues};
pub use key::{PathKey, sub_map};
pub use map::Map;
#[doc(inline)]
pub use ser::{Serializer, to_string, to_values, to_writer};
pub use value::Value;
pub use values::Values;
