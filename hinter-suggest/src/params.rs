//! Paging and versioning parameters read from a suggest request.
//!
//! None of these parsers can fail. A value that is missing or malformed leaves
//! the corresponding field at its default, so a bad parameter never fails the
//! request.

use crate::query::{parse_bool, QueryValues};
use serde::Serialize;

/// Query key of the page size.
const COUNT_KEY: &str = "count";
/// Query key of the zero-based page index.
const PAGE_KEY: &str = "page";
/// Query key of the flag that echoes the index version.
const WITH_VERSION_KEY: &str = "with-version";

/// Whether, and which, index version to echo in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionParameters {
    /// The version to echo. Always the version given to [`Self::from_query`].
    pub version: u64,

    /// True only if `with-version` parsed as true.
    pub version_on: bool,
}

impl VersionParameters {
    /// Read `with-version` from `query`.
    ///
    /// `version` is kept as-is whatever the flag says; the flag only decides
    /// whether it is echoed.
    pub fn from_query(query: &QueryValues, version: u64) -> Self {
        let version_on = query
            .get(WITH_VERSION_KEY)
            .and_then(parse_bool)
            .unwrap_or(false);

        Self {
            version,
            version_on,
        }
    }
}

/// How to cut a page out of the candidate list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PagingParameters {
    /// The page size. Zero means no limit.
    pub count: usize,

    /// The zero-based index of the page to return.
    pub page: usize,

    /// True only if `page` was present and parsed. The presence of `count` has
    /// no bearing on this.
    pub pagination_on: bool,
}

impl PagingParameters {
    /// Read `count` and `page` from `query`. Each is parsed independently of
    /// the other.
    pub fn from_query(query: &QueryValues) -> Self {
        let mut parameters = Self::default();

        if let Some(count) = query.get(COUNT_KEY).and_then(parse_size) {
            parameters.count = count;
        }

        if let Some(page) = query.get(PAGE_KEY).and_then(parse_size) {
            parameters.page = page;
            parameters.pagination_on = true;
        }

        parameters
    }
}

/// Parse a non-negative decimal integer. A leading `+` is allowed.
fn parse_size(value: &str) -> Option<usize> {
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{PagingParameters, VersionParameters};
    use crate::QueryValues;
    use pretty_assertions::assert_eq;

    fn paging(query_string: &str) -> PagingParameters {
        PagingParameters::from_query(&QueryValues::parse(query_string))
    }

    fn version(query_string: &str) -> VersionParameters {
        VersionParameters::from_query(&QueryValues::parse(query_string), 42)
    }

    #[test]
    fn paging_defaults_when_absent() {
        assert_eq!(paging("part=abc"), PagingParameters::default());
    }

    #[test]
    fn count_alone_does_not_enable_pagination() {
        assert_eq!(
            paging("count=3"),
            PagingParameters {
                count: 3,
                page: 0,
                pagination_on: false,
            }
        );
    }

    #[test]
    fn explicit_first_page_enables_pagination() {
        assert_eq!(
            paging("page=0"),
            PagingParameters {
                count: 0,
                page: 0,
                pagination_on: true,
            }
        );
    }

    #[test]
    fn fields_parse_independently() {
        assert_eq!(
            paging("count=abc&page=2"),
            PagingParameters {
                count: 0,
                page: 2,
                pagination_on: true,
            }
        );
        assert_eq!(
            paging("count=5&page=two"),
            PagingParameters {
                count: 5,
                page: 0,
                pagination_on: false,
            }
        );
    }

    #[test]
    fn malformed_sizes_are_ignored() {
        for bad in ["", " 1", "1.0", "-1", "0x10", "99999999999999999999999"] {
            let query = format!("count={0}&page={0}", bad);
            assert_eq!(paging(&query), PagingParameters::default(), "{:?}", bad);
        }
        assert_eq!(paging("count=%2B4").count, 4);
    }

    #[test]
    fn version_flag() {
        assert_eq!(
            version("with-version=true"),
            VersionParameters {
                version: 42,
                version_on: true,
            }
        );
        assert_eq!(
            version("with-version=0"),
            VersionParameters {
                version: 42,
                version_on: false,
            }
        );
    }

    #[test]
    fn bad_or_missing_version_flag_is_off() {
        for query in ["", "with-version=", "with-version=yes", "with-version=TrUe"] {
            let parameters = version(query);
            assert!(!parameters.version_on, "{:?}", query);
            assert_eq!(parameters.version, 42);
        }
    }
}
