//! Decoded query strings, and the lenient parsers used to read them.

use url::form_urlencoded;

/// The decoded values of a query string, in request order.
///
/// Keys may repeat. [`get`](Self::get) reads the first value for a key and
/// [`get_all`](Self::get_all) reads every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues(Vec<(String, String)>);

impl QueryValues {
    /// Decode an `application/x-www-form-urlencoded` query string, without the
    /// leading `?`. Decoding never fails; invalid escapes are kept as-is.
    pub fn parse(query_string: &str) -> Self {
        Self(
            form_urlencoded::parse(query_string.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// The first value given for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value given for `key`, in the order they appear in the request.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parse a boolean flag.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True`, `0`, `f`, `F`, `FALSE`,
/// `false` and `False`. Anything else, including surrounding whitespace, is
/// not a boolean.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
