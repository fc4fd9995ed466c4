//! Field directives carried in serde field names.
//!
//! A field named `ids,omitempty,comma` is written to the wire as `ids`, left
//! out when empty and joined with commas. A field named `-` is never written
//! or read.

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Directive<'a> {
    pub name: &'a str,
    pub ignore: bool,
    pub omit_empty: bool,
    pub comma: bool,
    pub embed: bool,
}

impl<'a> Directive<'a> {
    pub fn parse(tag: &'a str) -> Self {
        if tag == "-" {
            return Directive {
                ignore: true,
                ..Directive::default()
            };
        }

        let mut parts = tag.split(',');
        let mut directive = Directive {
            name: parts.next().unwrap_or_default(),
            ..Directive::default()
        };
        for option in parts {
            match option {
                "omitempty" => directive.omit_empty = true,
                "comma" => directive.comma = true,
                "embed" => directive.embed = true,
                _ => {}
            }
        }
        directive
    }

    /// The key this field is addressed by on the wire.
    pub fn wire_name(&self) -> Result<&'a str> {
        if self.name.is_empty() {
            return Err(Error::unsupported(
                "field directive without a name: serde does not pass on the identifier \
                 of a renamed field, so the wire name must come before the options, \
                 as in `name,omitempty`",
            ));
        }
        Ok(self.name)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_name() {
        let d = Directive::parse("ID");
        assert_eq!(d.name, "ID");
        assert!(!d.ignore && !d.omit_empty && !d.comma && !d.embed);
    }

    #[test]
    fn options() {
        assert_eq!(
            Directive::parse("ids,omitempty,comma"),
            Directive {
                name: "ids",
                omit_empty: true,
                comma: true,
                ..Directive::default()
            }
        );
        assert_eq!(
            Directive::parse(",embed"),
            Directive {
                embed: true,
                ..Directive::default()
            }
        );
        // unknown options are ignored
        assert_eq!(Directive::parse("x,bogus").name, "x");
    }

    #[test]
    fn ignore() {
        assert!(Directive::parse("-").ignore);
        // a dash with options names a field literally called `-`
        assert!(!Directive::parse("-,omitempty").ignore);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Directive::parse(",omitempty").wire_name().unwrap_err();
        assert!(err.to_string().contains("renamed field"), "{err}");
        assert!(err.to_string().contains("`name,omitempty`"), "{err}");
        assert_eq!(Directive::parse("a,comma").wire_name().unwrap(), "a");
    }
}
