use std::io::Write;

use serde::de;
use serde::ser;

use crate::error::Result;
use crate::ser::Canonical;
use crate::values::Values;

/// Configuration for serialization and deserialization behavior.
///
/// ## Encoding
///
/// By default every byte other than ASCII alphanumerics and `-._~` is
/// percent-encoded, brackets included, the way HTML forms and Rack encode
/// them:
///
/// ```
/// use serde_railing::{Config, Values};
///
/// let values = Values::parse("user[name]=Bob Smith").unwrap();
/// assert_eq!(Config::new().encode(&values), "user%5Bname%5D=Bob+Smith");
/// assert_eq!(
///     Config::new().use_form_encoding(false).encode(&values),
///     "user[name]=Bob+Smith"
/// );
/// ```
///
/// Decoding accepts both forms.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    use_form_encoding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            use_form_encoding: true,
        }
    }

    /// With `false`, only the characters the WHATWG
    /// [query percent-encode set](https://url.spec.whatwg.org/#query-percent-encode-set)
    /// requires are escaped, plus those with a meaning in a query string
    /// (`+`, `[`, `]`, `=`, `&`, `%`). Nested keys stay readable:
    /// `a[b][]=1`.
    pub const fn use_form_encoding(mut self, use_form_encoding: bool) -> Self {
        self.use_form_encoding = use_form_encoding;
        self
    }

    /// Writes a multimap as a sorted query string.
    pub fn encode(self, values: &Values) -> String {
        let mut canonical = Canonical::new(self.use_form_encoding);
        canonical.write("", values);
        canonical.finish()
    }

    /// Deserializes a query string from a `&[u8]` using this `Config`.
    pub fn deserialize_bytes<T: de::DeserializeOwned>(self, input: &[u8]) -> Result<T> {
        crate::from_values(crate::de::parse(input)?)
    }

    /// Deserializes a query string from a `&str` using this `Config`.
    pub fn deserialize_str<T: de::DeserializeOwned>(self, input: &str) -> Result<T> {
        self.deserialize_bytes(input.as_bytes())
    }

    /// Serializes an object to a query string using this `Config`.
    pub fn serialize_string<T: ser::Serialize + ?Sized>(self, input: &T) -> Result<String> {
        let values = crate::to_values(input)?;
        Ok(self.encode(&values))
    }

    /// Serializes an object to a writer using this `Config`.
    pub fn serialize_to_writer<T: ser::Serialize + ?Sized, W: Write>(
        self,
        input: &T,
        writer: &mut W,
    ) -> Result<()> {
        let encoded = self.serialize_string(input)?;
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }
}
