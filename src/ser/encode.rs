use percent_encoding::AsciiSet;

/// The WHATWG query percent-encode set
/// (https://url.spec.whatwg.org/#query-percent-encode-set) plus the
/// characters with a meaning inside a query string: `+` (space), `[` and `]`
/// (nesting), `=` and `&` (pair separators) and `%` (escapes).
///
/// Spaces pass through and are written as `+`.
const MINIMAL_QS_SET: &AsciiSet = &percent_encoding::CONTROLS
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'+')
    .add(b'[')
    .add(b']')
    .add(b'=')
    .add(b'&')
    .add(b'%');

/// Everything except ASCII alphanumerics and `-._~`, the bytes HTML forms and
/// Rack's form encoders leave alone. Spaces are written as `+`.
const FORM_URLENCODED_SET: &AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Appends `input` to `out`, percent-encoded.
pub(super) fn encode_into(out: &mut String, input: &str, use_form_encoding: bool) {
    let set = if use_form_encoding {
        FORM_URLENCODED_SET
    } else {
        MINIMAL_QS_SET
    };
    for chunk in percent_encoding::utf8_percent_encode(input, set) {
        if chunk.contains(' ') {
            out.extend(chunk.chars().map(|c| if c == ' ' { '+' } else { c }));
        } else {
            out.push_str(chunk);
        }
    }
}
