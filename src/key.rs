//! Bracket-notation key grammar.
//!
//! A wire key is a top name, optionally followed by an array marker and a
//! chain of bracketed segments:
//!
//! ```text
//! key          := topName suffix?
//! topName      := 1*(byte except '[')
//! suffix       := "[]" | bracketChain
//! bracketChain := "[" segment "]" bracketChain?
//! ```
//!
//! `ids[]` marks a flat array, `user[address][city]` a nested object and
//! `palette[][r]` an array of objects.

use std::fmt;

use crate::map;
use crate::values::Values;

/// A single wire key split into its top name and the rest of the chain.
///
/// ```
/// use serde_railing::PathKey;
///
/// let key = PathKey::parse("palette[][r]");
/// assert_eq!(key.top, "palette");
/// assert!(key.array);
/// assert_eq!(key.rest, "[r]");
/// assert_eq!(key.to_string(), "palette[][r]");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathKey<'a> {
    /// Everything before the first `[`.
    pub top: &'a str,
    /// Whether the top name is immediately followed by `[]`.
    pub array: bool,
    /// The remaining bracket chain, possibly empty. Content that does not
    /// follow the grammar is kept here verbatim.
    pub rest: &'a str,
}

impl<'a> PathKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        let (top, suffix) = match key.find('[') {
            Some(idx) => key.split_at(idx),
            None => (key, ""),
        };
        match suffix.strip_prefix("[]") {
            Some(rest) => PathKey {
                top,
                array: true,
                rest,
            },
            None => PathKey {
                top,
                array: false,
                rest: suffix,
            },
        }
    }

    /// Whether this key holds a flat value list (`top` or `top[]`).
    pub fn is_flat(&self) -> bool {
        self.rest.is_empty()
    }

    /// Strips one level of bracketing: `top[x][y]` and `top[][x][y]` both
    /// become `x[y]`.
    ///
    /// Returns `None` when there is no non-empty segment to promote.
    pub fn strip_top(&self) -> Option<String> {
        let inner = self.rest.strip_prefix('[')?;
        let end = inner.find(']')?;
        if end == 0 {
            return None;
        }
        let mut key = String::with_capacity(inner.len() - 1);
        key.push_str(&inner[..end]);
        key.push_str(&inner[end + 1..]);
        Some(key)
    }
}

impl fmt::Display for PathKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.top)?;
        if self.array {
            f.write_str("[]")?;
        }
        f.write_str(self.rest)
    }
}

/// Returns every entry nested under `name` with one bracket level stripped.
///
/// ```text
/// nested[id]   -> id
/// nested[][id] -> id
/// nested       -> (excluded)
/// nested[]     -> (excluded)
/// ```
pub fn sub_map(values: &Values, name: &str) -> Values {
    collect_nested(values, name, |_| true)
}

/// Like [`sub_map`], but only for keys whose array marker equals `array`.
pub(crate) fn sub_map_marked(values: &Values, name: &str, array: bool) -> Values {
    collect_nested(values, name, |path| path.array == array)
}

fn collect_nested<F>(values: &Values, name: &str, filter: F) -> Values
where
    F: Fn(&PathKey<'_>) -> bool,
{
    values
        .iter()
        .filter_map(|(key, list)| {
            let path = PathKey::parse(key);
            if path.top != name || !filter(&path) {
                return None;
            }
            path.strip_top().map(|key| (key, list.clone()))
        })
        .collect()
}

/// The flat value list stored under `name` or `name[]`.
pub(crate) fn flat_values<'v>(values: &'v Values, name: &str) -> Option<&'v [String]> {
    values
        .get_all(name)
        .or_else(|| values.get_all(&format!("{name}[]")))
}

/// Removes every key whose top name is `name`, flat or nested.
pub(crate) fn release(values: &mut Values, name: &str) {
    values.retain(|key, _| PathKey::parse(key).top != name);
}

/// The distinct top names of `values`, in map order.
pub(crate) fn top_names(values: &Values) -> Vec<&str> {
    let mut names = map::Map::<&str, ()>::new();
    for key in values.keys() {
        names.insert(PathKey::parse(key).top, ());
    }
    names.into_keys().collect()
}

/// Re-prefixes every key of `src` with `name` and moves it into `dst`.
///
/// ```text
/// merge_by_key("bar", { "name": .., "tags[]": .., "": .. })
///     -> { "bar[name]": .., "bar[tags][]": .., "bar": .. }
/// ```
pub(crate) fn merge_by_key(name: &str, src: Values, dst: &mut Values) {
    for (key, list) in src {
        if key.is_empty() {
            dst.insert(name.to_owned(), list);
            continue;
        }
        let path = PathKey::parse(&key);
        let marker = if path.array { "[]" } else { "" };
        dst.insert(format!("{name}[{}]{marker}{}", path.top, path.rest), list);
    }
}
