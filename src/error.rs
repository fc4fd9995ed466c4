use std::fmt::Display;
use std::io;
use std::str;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error that can occur while encoding or decoding bracket-notation values.
#[derive(Debug, Error)]
pub enum Error {
    /// The top-level destination cannot receive a flat multimap.
    ///
    /// Only records, maps, options of those, dynamic values and hook types can
    /// be decoded at the top level.
    #[error("cannot decode into {0} at the top level, try a struct or a map")]
    InvalidTarget(&'static str),

    /// The flat data does not have the shape the destination expects, e.g. a
    /// record was expected but a value list was supplied.
    #[error("cannot decode {found} into a value of type {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A group of keys describing a sequence of records does not carry the
    /// same number of values for every key.
    #[error(
        "cannot decode an object array: `{key}` holds {found} values but the group holds {expected}, \
         every element must contain the same amount of data"
    )]
    IncompleteArrayData {
        key: String,
        expected: usize,
        found: usize,
    },

    /// A number parsed correctly but does not fit the destination width.
    #[error("number {value} overflows {ty}")]
    NumericOverflow { value: String, ty: &'static str },

    /// A string could not be parsed into the destination primitive.
    #[error("cannot parse {value:?} as {ty}")]
    Parse { value: String, ty: &'static str },

    /// The value has a shape that cannot be expressed in bracket notation.
    #[error("unsupported shape: {0}")]
    Unsupported(String),

    /// An [`EncodeValues`](crate::EncodeValues) or
    /// [`DecodeValues`](crate::DecodeValues) implementation failed.
    #[error("hook for {ty} failed: {message}")]
    Hook { ty: String, message: String },

    /// Custom message, raised by serde impls.
    #[error("{0}")]
    Custom(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Utf8(#[from] str::Utf8Error),
}

impl Error {
    pub(crate) fn unsupported<T: Display>(what: T) -> Self {
        Error::Unsupported(what.to_string())
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Error::TypeMismatch { expected, found }
    }

    /// Hook failures cross serde's error traits as plain text and are
    /// recognized again here.
    fn from_message(msg: String) -> Self {
        let hook = msg
            .strip_prefix("hook for ")
            .and_then(|rest| rest.split_once(" failed: "));
        match hook {
            Some((ty, message)) => Error::Hook {
                ty: ty.to_owned(),
                message: message.to_owned(),
            },
            None => Error::Custom(msg),
        }
    }
}

impl serde::de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::from_message(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::from_message(msg.to_string())
    }
}
