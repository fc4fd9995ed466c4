//! Deterministic serialization of a [`Values`] multimap.
//!
//! Keys are grouped by top name and the groups written in byte order of
//! `name` / `name[]`. An array of objects cannot be sorted key by key
//! without losing track of which values belong together, so each of its
//! elements is written as one internally sorted fragment:
//!
//! ```text
//! p[][a]=1&p[][b]=2&p[][a]=3&p[][b]=4
//! ```

use super::encode::encode_into;
use crate::key::{self, PathKey};
use crate::values::Values;

pub(crate) struct Canonical {
    out: String,
    use_form_encoding: bool,
}

impl Canonical {
    pub fn new(use_form_encoding: bool) -> Self {
        Canonical {
            out: String::with_capacity(128),
            use_form_encoding,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn open(&self) -> &'static str {
        if self.use_form_encoding { "%5B" } else { "[" }
    }

    fn close(&self) -> &'static str {
        if self.use_form_encoding { "%5D" } else { "]" }
    }

    fn pair(&mut self, key: &str, value: &str) {
        if !self.out.is_empty() {
            self.out.push('&');
        }
        self.out.push_str(key);
        self.out.push('=');
        encode_into(&mut self.out, value, self.use_form_encoding);
    }

    /// Writes every group of `values` with keys nested under `prefix`, which
    /// is already encoded.
    pub fn write(&mut self, prefix: &str, values: &Values) {
        for (top, array) in groups(values) {
            let mut path = String::from(prefix);
            if !prefix.is_empty() {
                path.push_str(self.open());
            }
            encode_into(&mut path, top, self.use_form_encoding);
            if !prefix.is_empty() {
                path.push_str(self.close());
            }

            let marked = if array {
                format!("{path}{}{}", self.open(), self.close())
            } else {
                path.clone()
            };
            let flat_key = if array {
                format!("{top}[]")
            } else {
                top.to_owned()
            };
            if let Some(list) = values.get_all(&flat_key) {
                for value in list {
                    self.pair(&marked, value);
                }
            }
            self.write_stray(&marked, values, top, array);

            let nested = key::sub_map_marked(values, top, array);
            if nested.is_empty() {
                continue;
            }
            if array {
                self.write_records(&marked, &nested);
            } else {
                self.write(&path, &nested);
            }
        }
    }

    /// Writes keys of the group that have a suffix but nothing to nest, such
    /// as `a[][]` or `a[x`, verbatim after `marked`.
    fn write_stray(&mut self, marked: &str, values: &Values, top: &str, array: bool) {
        for (key, list) in values.iter() {
            let path = PathKey::parse(key);
            if path.top != top || path.array != array || path.is_flat() {
                continue;
            }
            if path.strip_top().is_some() {
                continue;
            }
            let mut literal = String::from(marked);
            encode_into(&mut literal, path.rest, self.use_form_encoding);
            for value in list {
                self.pair(&literal, value);
            }
        }
    }

    /// Writes an array of objects one element at a time, in index order.
    fn write_records(&mut self, prefix: &str, nested: &Values) {
        let mut keys: Vec<&String> = nested.keys().collect();
        keys.sort();
        let len = nested.iter().map(|(_, list)| list.len()).max().unwrap_or(0);
        for idx in 0..len {
            let record: Values = keys
                .iter()
                .filter_map(|&key| {
                    let value = nested.get_all(key)?.get(idx)?;
                    Some((key.clone(), vec![value.clone()]))
                })
                .collect();
            self.write(prefix, &record);
        }
    }
}

/// The `(top name, array marker)` groups of `values`, sorted by their
/// `name` / `name[]` spelling.
fn groups(values: &Values) -> Vec<(&str, bool)> {
    let mut groups: Vec<(&str, bool)> = values
        .keys()
        .map(|key| {
            let path = PathKey::parse(key);
            (path.top, path.array)
        })
        .collect();
    groups.sort_by(|a, b| spelling(a).cmp(&spelling(b)));
    groups.dedup();
    groups
}

fn spelling(&(top, array): &(&str, bool)) -> String {
    if array {
        format!("{top}[]")
    } else {
        top.to_owned()
    }
}
