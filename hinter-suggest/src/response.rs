//! Shapes the candidate list of a lookup into a response.
//!
//! There are four shapes a response can take, told apart by which fields are
//! present rather than by a tag:
//!
//! | pagination | version | JSON                                                              |
//! |------------|---------|-------------------------------------------------------------------|
//! | off        | off     | `[...]`                                                           |
//! | off        | on      | `{"items": [...], "version": 7}`                                  |
//! | on         | off     | `{"items": [...], "pageNumber": 1, "totalPagesCount": 4, "totalItemsCount": 10}` |
//! | on         | on      | the paginated shape plus `"version": 7`                           |

use crate::params::{PagingParameters, VersionParameters};
use serde::Serialize;

/// One page of candidates, with the totals of the whole candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// The candidates on this page, in lookup order.
    pub items: Vec<T>,

    /// The requested page index. Not clamped to the number of pages.
    pub page_number: usize,

    /// The number of pages the whole candidate list spans.
    pub total_pages_count: usize,

    /// The number of candidates before paging.
    pub total_items_count: usize,

    /// The index version, only present if it was asked for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl<T> PaginatedResponse<T> {
    /// Cut the page described by `paging` out of `items`.
    ///
    /// Both totals are computed before anything is cut. A `count` of zero
    /// disables both skipping and truncation and makes the list a single page.
    /// Page zero is never skipped into, whatever the `count`. A page past the
    /// end yields no items. `version` is left unset.
    pub fn paginate(mut items: Vec<T>, paging: &PagingParameters) -> Self {
        let PagingParameters { count, page, .. } = *paging;
        let total_items_count = items.len();
        let total_pages_count = if count == 0 {
            1
        } else {
            total_items_count.div_ceil(count)
        };

        if page != 0 && count != 0 {
            match page.checked_mul(count) {
                Some(skip) if items.len() > skip => {
                    items.drain(..skip);
                }
                _ => items.clear(),
            }
        }

        if count != 0 {
            items.truncate(count);
        }

        Self {
            items,
            page_number: page,
            total_pages_count,
            total_items_count,
            version: None,
        }
    }
}

/// Candidates along with the index version, without paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedResponse<T> {
    /// The candidates, in lookup order.
    pub items: Vec<T>,

    /// The index version.
    pub version: u64,
}

/// The body of a suggest response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SuggestResponse<T> {
    /// Just the candidates.
    Plain(Vec<T>),

    /// The candidates and the index version.
    Versioned(VersionedResponse<T>),

    /// A page of candidates, with the index version if it was asked for.
    Paginated(PaginatedResponse<T>),
}

impl<T> SuggestResponse<T> {
    /// The candidates that will be sent.
    pub fn items(&self) -> &[T] {
        match self {
            Self::Plain(items) => items,
            Self::Versioned(response) => &response.items,
            Self::Paginated(response) => &response.items,
        }
    }
}

/// Choose the response shape for `items` from the request parameters.
///
/// With pagination on, the result is a [`PaginatedResponse`] carrying the
/// version if it is on. Otherwise a non-zero `count` caps the number of
/// items, and the result is a [`VersionedResponse`] or the bare list depending
/// on whether the version is on.
pub fn assemble<T>(
    mut items: Vec<T>,
    paging: &PagingParameters,
    version: &VersionParameters,
) -> SuggestResponse<T> {
    if paging.pagination_on {
        let mut response = PaginatedResponse::paginate(items, paging);
        if version.version_on {
            response.version = Some(version.version);
        }
        return SuggestResponse::Paginated(response);
    }

    if paging.count != 0 {
        items.truncate(paging.count);
    }

    if version.version_on {
        SuggestResponse::Versioned(VersionedResponse {
            items,
            version: version.version,
        })
    } else {
        SuggestResponse::Plain(items)
    }
}

#[cfg(test)]
mod tests {
    use super::{assemble, PaginatedResponse, SuggestResponse, VersionedResponse};
    use crate::{PagingParameters, QueryValues, VersionParameters};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    const INDEX_VERSION: u64 = 7;

    fn items() -> Vec<String> {
        (0..10).map(|i| format!("i{}", i)).collect()
    }

    fn run(query_string: &str, items: Vec<String>) -> SuggestResponse<String> {
        let query = QueryValues::parse(query_string);
        assemble(
            items,
            &PagingParameters::from_query(&query),
            &VersionParameters::from_query(&query, INDEX_VERSION),
        )
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_parameters_is_identity() {
        assert_eq!(run("part=i", items()), SuggestResponse::Plain(items()));
        assert_eq!(run("", vec![]), SuggestResponse::Plain(vec![]));
    }

    #[test]
    fn count_without_page_caps_items() {
        assert_eq!(
            run("count=3", items()),
            SuggestResponse::Plain(strings(&["i0", "i1", "i2"]))
        );
        assert_eq!(run("count=30", items()), SuggestResponse::Plain(items()));
    }

    #[test]
    fn second_page() {
        assert_eq!(
            run("count=3&page=1", items()),
            SuggestResponse::Paginated(PaginatedResponse {
                items: strings(&["i3", "i4", "i5"]),
                page_number: 1,
                total_pages_count: 4,
                total_items_count: 10,
                version: None,
            })
        );
    }

    #[test]
    fn last_partial_page() {
        assert_eq!(
            run("count=3&page=3", items()),
            SuggestResponse::Paginated(PaginatedResponse {
                items: strings(&["i9"]),
                page_number: 3,
                total_pages_count: 4,
                total_items_count: 10,
                version: None,
            })
        );
    }

    #[test]
    fn first_page_never_skips() {
        assert_eq!(
            run("count=3&page=0", items()),
            SuggestResponse::Paginated(PaginatedResponse {
                items: strings(&["i0", "i1", "i2"]),
                page_number: 0,
                total_pages_count: 4,
                total_items_count: 10,
                version: None,
            })
        );
    }

    #[test]
    fn page_without_count_keeps_everything() {
        for query in ["page=2", "page=2&count=0", "page=2&count=bad"] {
            assert_eq!(
                run(query, items()),
                SuggestResponse::Paginated(PaginatedResponse {
                    items: items(),
                    page_number: 2,
                    total_pages_count: 1,
                    total_items_count: 10,
                    version: None,
                }),
                "{}",
                query
            );
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        assert_eq!(
            run("count=3&page=5", items()),
            SuggestResponse::Paginated(PaginatedResponse {
                items: vec![],
                page_number: 5,
                total_pages_count: 4,
                total_items_count: 10,
                version: None,
            })
        );
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let query = format!("count=3&page={}", usize::MAX);
        let response = run(&query, items());
        assert!(response.items().is_empty());
    }

    #[test]
    fn empty_candidates() {
        assert_eq!(
            run("count=3&page=0", vec![]),
            SuggestResponse::Paginated(PaginatedResponse {
                items: vec![],
                page_number: 0,
                total_pages_count: 0,
                total_items_count: 0,
                version: None,
            })
        );
        assert_eq!(
            run("page=0", vec![]),
            SuggestResponse::Paginated(PaginatedResponse {
                items: vec![],
                page_number: 0,
                total_pages_count: 1,
                total_items_count: 0,
                version: None,
            })
        );
    }

    #[test]
    fn version_without_paging() {
        assert_eq!(
            run("with-version=true", items()),
            SuggestResponse::Versioned(VersionedResponse {
                items: items(),
                version: INDEX_VERSION,
            })
        );
        assert_eq!(
            run("with-version=true&count=2", items()),
            SuggestResponse::Versioned(VersionedResponse {
                items: strings(&["i0", "i1"]),
                version: INDEX_VERSION,
            })
        );
    }

    #[test]
    fn version_with_paging() {
        assert_eq!(
            run("with-version=true&count=3&page=1", items()),
            SuggestResponse::Paginated(PaginatedResponse {
                items: strings(&["i3", "i4", "i5"]),
                page_number: 1,
                total_pages_count: 4,
                total_items_count: 10,
                version: Some(INDEX_VERSION),
            })
        );
    }

    #[test]
    fn serialized_shapes_omit_absent_fields() {
        assert_eq!(
            serde_json::to_value(run("count=2", items())).unwrap(),
            json!(["i0", "i1"])
        );
        assert_eq!(
            serde_json::to_value(run("count=2&with-version=1", items())).unwrap(),
            json!({"items": ["i0", "i1"], "version": 7})
        );
        assert_eq!(
            serde_json::to_value(run("count=2&page=4", items())).unwrap(),
            json!({
                "items": ["i8", "i9"],
                "pageNumber": 4,
                "totalPagesCount": 5,
                "totalItemsCount": 10,
            })
        );
        assert_eq!(
            serde_json::to_value(run("count=2&page=4&with-version=t", items())).unwrap(),
            json!({
                "items": ["i8", "i9"],
                "pageNumber": 4,
                "totalPagesCount": 5,
                "totalItemsCount": 10,
                "version": 7,
            })
        );
    }

    proptest! {
        #[test]
        fn page_is_a_contiguous_run_of_the_input(
            len in 0usize..60,
            count in 0usize..12,
            page in 0usize..12,
        ) {
            let input: Vec<usize> = (0..len).collect();
            let paging = PagingParameters { count, page, pagination_on: true };
            let response = PaginatedResponse::paginate(input.clone(), &paging);

            prop_assert_eq!(response.total_items_count, len);
            prop_assert_eq!(response.page_number, page);
            if count == 0 {
                prop_assert_eq!(response.total_pages_count, 1);
                prop_assert_eq!(&response.items, &input);
            } else {
                prop_assert_eq!(response.total_pages_count, (len + count - 1) / count);
                prop_assert!(response.items.len() <= count);
                let start = if page == 0 { 0 } else { (page * count).min(len) };
                let end = (start + count).min(len);
                prop_assert_eq!(&response.items[..], &input[start..end]);
            }
        }

        #[test]
        fn assembly_is_repeatable(
            len in 0usize..30,
            count in 0usize..8,
            page in proptest::option::of(0usize..8),
            version_on in any::<bool>(),
        ) {
            let input: Vec<usize> = (0..len).collect();
            let paging = PagingParameters {
                count,
                page: page.unwrap_or(0),
                pagination_on: page.is_some(),
            };
            let version = VersionParameters { version: INDEX_VERSION, version_on };

            let first = serde_json::to_vec(&assemble(input.clone(), &paging, &version)).unwrap();
            let second = serde_json::to_vec(&assemble(input, &paging, &version)).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn surviving_items_keep_their_order(
            input in proptest::collection::vec(any::<u32>(), 0..40),
            count in 0usize..10,
            page in proptest::option::of(0usize..5),
        ) {
            let paging = PagingParameters {
                count,
                page: page.unwrap_or(0),
                pagination_on: page.is_some(),
            };
            let version = VersionParameters { version: 0, version_on: false };
            let response = assemble(input.clone(), &paging, &version);

            // The output is always a contiguous window of the input.
            let out = response.items();
            prop_assert!(
                out.is_empty() || input.windows(out.len()).any(|window| window == out)
            );
        }
    }
}
