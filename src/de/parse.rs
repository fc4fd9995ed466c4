//! Parsing of `application/x-www-form-urlencoded` input into [`Values`].

use std::borrow::Cow;

use crate::error::Result;
use crate::values::Values;

/// Splits `input` into key/value pairs, in order of appearance.
///
/// Pairs are separated by `&` and split on the first `=`; a pair without
/// `=` has an empty value. Empty pairs are skipped.
pub(crate) fn parse(input: &[u8]) -> Result<Values> {
    let input = input.strip_prefix(b"?").unwrap_or(input);
    let mut values = Values::new();
    for pair in input.split(|&b| b == b'&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.iter().position(|&b| b == b'=') {
            Some(idx) => (&pair[..idx], &pair[idx + 1..]),
            None => (pair, &[][..]),
        };
        values.add(decode_utf8(key)?, decode_utf8(value)?);
    }
    Ok(values)
}

fn decode_utf8(input: &[u8]) -> Result<String> {
    Ok(match decode(input) {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes)?.to_owned(),
        Cow::Owned(bytes) => String::from_utf8(bytes).map_err(|err| err.utf8_error())?,
    })
}

fn hex(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}

/// Replaces `+` with a space and resolves `%XX` escapes. Malformed escapes
/// are kept as they are.
fn decode(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.iter().any(|&b| b == b'+' || b == b'%') {
        return Cow::Borrowed(input);
    }

    let mut decoded = Vec::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        match input[idx] {
            b'+' => decoded.push(b' '),
            b'%' => {
                let escape = input
                    .get(idx + 1..idx + 3)
                    .and_then(|pair| Some(hex(pair[0])? << 4 | hex(pair[1])?));
                match escape {
                    Some(byte) => {
                        decoded.push(byte);
                        idx += 2;
                    }
                    None => decoded.push(b'%'),
                }
            }
            b => decoded.push(b),
        }
        idx += 1;
    }
    Cow::Owned(decoded)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    #[test]
    fn decodes_escapes() {
        assert_eq!(decode(b"plain"), Cow::Borrowed(b"plain" as &[u8]));
        assert_eq!(&*decode(b"a+b%5B%5d"), b"a b[]");
        assert_eq!(&*decode(b"100%"), b"100%");
        assert_eq!(&*decode(b"%zz%4"), b"%zz%4");
        assert_eq!(&*decode(b"%C3%A9"), "é".as_bytes());
    }

    #[test]
    fn splits_pairs() {
        let values = parse(b"?a=1&&b[]=2&b%5B%5D=3&c&d=x=y").unwrap();
        assert_eq!(values.get("a"), Some("1"));
        assert_eq!(values.get_all("b[]").unwrap(), ["2", "3"]);
        assert_eq!(values.get("c"), Some(""));
        assert_eq!(values.get("d"), Some("x=y"));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(parse(b"a=%FF"), Err(Error::Utf8(_))));
    }
}
