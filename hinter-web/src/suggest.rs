//! Web handlers for the suggestions API.

use std::sync::Arc;

use crate::{envelope::write_success, errors::HandlerError, extractors::QueryValuesWrapper};
use actix_web::{
    get,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use cadence::{CountedExt, Histogrammed, StatsdClient};
use hinter_settings::Settings;
use hinter_suggest::{
    assemble, FilterSet, IndexError, Normalizer, PagingParameters, PreparedTerm, SanitizePolicy,
    SuggestIndex, SuggestionLookup, VersionParameters,
};

/// Query key of the search term.
const PART_KEY: &str = "part";
/// Query key of the classes to include. May repeat.
const CLASS_KEY: &str = "class";
/// Query key of the classes to exclude. May repeat.
const EXCLUDE_CLASS_KEY: &str = "exclude-class";

/// Configure a route to use the Suggest service.
pub fn configure(config: &mut ServiceConfig) {
    config.service(suggest);
}

/// The shared, read-only state behind the suggest endpoint.
pub struct SuggestHandler {
    /// Where candidates come from.
    lookup: Arc<dyn SuggestionLookup>,

    /// How search terms are normalized. Must match how the lookup's keys were
    /// normalized.
    normalizer: Normalizer,
}

impl SuggestHandler {
    /// Serve suggestions from `lookup`, normalizing terms with `normalizer`.
    pub fn new(lookup: Arc<dyn SuggestionLookup>, normalizer: Normalizer) -> Self {
        Self { lookup, normalizer }
    }

    /// Load the index named in `settings`, normalizing it and every search
    /// term according to `settings.normalization`.
    ///
    /// # Errors
    /// If the index cannot be loaded.
    pub fn from_settings(settings: &Settings) -> Result<Self, IndexError> {
        let normalizer = Normalizer::new(
            SanitizePolicy::strict(),
            settings.normalization.equal_shaped,
        );
        let index = SuggestIndex::from_path(&settings.index.path, &normalizer)?;
        Ok(Self::new(Arc::new(index), normalizer))
    }
}

/// Suggest completions for the partial term in `part`.
#[get("")]
#[tracing::instrument(skip_all)]
async fn suggest(
    QueryValuesWrapper(query): QueryValuesWrapper,
    handler: Data<SuggestHandler>,
    metrics_client: Data<StatsdClient>,
    settings: Data<Settings>,
) -> Result<HttpResponse, HandlerError> {
    let term = handler
        .normalizer
        .prepare(query.get(PART_KEY).unwrap_or_default());
    let include: FilterSet = query.get_all(CLASS_KEY).collect();
    let exclude: FilterSet = query.get_all(EXCLUDE_CLASS_KEY).collect();
    let paging = PagingParameters::from_query(&query);
    let version = VersionParameters::from_query(&query, handler.lookup.version());

    safe_log_request(
        settings.log_full_request,
        &term,
        &include,
        &exclude,
        &paging,
        &version,
    );

    let suggestions = handler
        .lookup
        .lookup(&term.part, &term.normalized, &include, &exclude);

    tracing::debug!(
        r#type = "web.suggest.candidate-count",
        candidate_count = suggestions.len(),
        "Looked up candidates"
    );
    metrics_client
        .histogram("suggest.candidates", suggestions.len() as u64)
        .ok();
    if paging.pagination_on {
        metrics_client.incr("suggest.paginated").ok();
    }
    if version.version_on {
        metrics_client.incr("suggest.versioned").ok();
    }

    write_success(HttpResponse::Ok(), assemble(suggestions, &paging, &version))
}

/// Log a suggestion request, respecting the log_query setting passed, and
/// formatting all fields in a way that is helpful to our downstream log
/// handlers. This primarily means that fields don't generate internal
/// stringified JSON.
fn safe_log_request(
    log_query: bool,
    term: &PreparedTerm,
    include: &FilterSet,
    exclude: &FilterSet,
    paging: &PagingParameters,
    version: &VersionParameters,
) {
    let (part, normalized) = if log_query {
        (term.part.as_str(), term.normalized.as_str())
    } else {
        ("", "")
    };

    tracing::info!(
        r#type = "web.suggest.request",
        sensitive = true,
        %part,
        %normalized,
        classes = %sorted_join(include),
        exclude_classes = %sorted_join(exclude),
        count = paging.count,
        page = paging.page,
        pagination_on = paging.pagination_on,
        version_on = version.version_on,
        "handling suggestion request"
    );
}

/// Join a filter set into a stable, comma separated string.
fn sorted_join(set: &FilterSet) -> String {
    let mut classes: Vec<&str> = set.iter().collect();
    classes.sort_unstable();
    classes.join(",")
}

#[cfg(test)]
mod tests {
    use super::SuggestHandler;
    use actix_web::{
        http::StatusCode,
        test::{self, TestRequest},
        web::Data,
        App,
    };
    use cadence::{NopMetricSink, StatsdClient};
    use hinter_settings::Settings;
    use hinter_suggest::{
        FilterSet, Normalizer, SanitizePolicy, Suggestion, SuggestionLookup,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Returns a fixed list of suggestions, filtered by class, and remembers
    /// the terms it was asked for.
    struct FixedLookup {
        suggestions: Vec<Suggestion>,
        terms: Mutex<Vec<(String, String)>>,
    }

    impl FixedLookup {
        fn new(count: u64) -> Self {
            Self {
                suggestions: (0..count)
                    .map(|id| Suggestion {
                        id,
                        text: format!("i{}", id),
                        class: if id % 2 == 0 { "even" } else { "odd" }.to_string(),
                        weight: 0,
                    })
                    .collect(),
                terms: Mutex::new(Vec::new()),
            }
        }
    }

    impl SuggestionLookup for FixedLookup {
        fn version(&self) -> u64 {
            1234
        }

        fn lookup(
            &self,
            part: &str,
            normalized_part: &str,
            include: &FilterSet,
            exclude: &FilterSet,
        ) -> Vec<Suggestion> {
            self.terms
                .lock()
                .unwrap()
                .push((part.to_string(), normalized_part.to_string()));
            self.suggestions
                .iter()
                .filter(|s| include.is_empty() || include.contains(&s.class))
                .filter(|s| !exclude.contains(&s.class))
                .cloned()
                .collect()
        }
    }

    async fn get(lookup: Arc<FixedLookup>, equal_shaped: bool, uri: &str) -> (StatusCode, Value) {
        let handler = SuggestHandler::new(
            lookup,
            Normalizer::new(SanitizePolicy::strict(), equal_shaped),
        );
        let app = test::init_service(
            App::new()
                .app_data(Data::new(handler))
                .app_data(Data::new(StatsdClient::from_sink("hinter-test", NopMetricSink)))
                .app_data(Data::new(Settings::load_for_tests(|_| ())))
                .configure(crate::configure_app),
        )
        .await;

        let response = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }

    fn texts(body: &Value) -> Vec<String> {
        let items = match body {
            Value::Array(items) => items,
            Value::Object(map) => map["items"].as_array().unwrap(),
            _ => panic!("unexpected payload {}", body),
        };
        items
            .iter()
            .map(|item| item["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[actix_rt::test]
    async fn plain_list_by_default() {
        let (status, body) = get(Arc::new(FixedLookup::new(4)), false, "/suggest?part=i").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_array());
        assert_eq!(texts(&body["data"]), vec!["i0", "i1", "i2", "i3"]);
        assert_eq!(
            body["data"][0],
            json!({"id": 0, "text": "i0", "class": "even", "weight": 0})
        );
    }

    #[actix_rt::test]
    async fn count_caps_the_plain_list() {
        let (_, body) = get(Arc::new(FixedLookup::new(10)), false, "/suggest?count=3").await;
        assert_eq!(texts(&body["data"]), vec!["i0", "i1", "i2"]);
    }

    #[actix_rt::test]
    async fn paginated_and_versioned() {
        let (_, body) = get(
            Arc::new(FixedLookup::new(10)),
            false,
            "/suggest?part=i&count=3&page=1&with-version=true",
        )
        .await;
        let data = &body["data"];
        assert_eq!(texts(data), vec!["i3", "i4", "i5"]);
        assert_eq!(data["pageNumber"], 1);
        assert_eq!(data["totalPagesCount"], 4);
        assert_eq!(data["totalItemsCount"], 10);
        assert_eq!(data["version"], 1234);
    }

    #[actix_rt::test]
    async fn versioned_without_paging() {
        let (_, body) = get(
            Arc::new(FixedLookup::new(2)),
            false,
            "/suggest?with-version=1",
        )
        .await;
        let data = body["data"].as_object().unwrap();
        assert_eq!(
            data.keys().collect::<Vec<_>>(),
            vec!["items", "version"]
        );
        assert_eq!(data["version"], 1234);
    }

    #[actix_rt::test]
    async fn class_filters_reach_the_lookup() {
        let (_, body) = get(
            Arc::new(FixedLookup::new(6)),
            false,
            "/suggest?class=odd&class=even&exclude-class=even",
        )
        .await;
        assert_eq!(texts(&body["data"]), vec!["i1", "i3", "i5"]);
    }

    #[actix_rt::test]
    async fn terms_are_normalized_before_lookup() {
        let lookup = Arc::new(FixedLookup::new(0));
        get(Arc::clone(&lookup), false, "/suggest?part=%3Cb%3EHello%3C%2Fb%3E,%20World").await;
        get(Arc::clone(&lookup), false, "/suggest").await;

        let terms = lookup.terms.lock().unwrap().clone();
        assert_eq!(
            terms,
            vec![
                ("<b>Hello</b>, World".to_string(), "hello world".to_string()),
                (String::new(), String::new()),
            ]
        );
    }

    #[actix_rt::test]
    async fn equal_shaped_mode_folds_the_term() {
        let lookup = Arc::new(FixedLookup::new(0));
        // Cyrillic "Рос", percent encoded.
        get(Arc::clone(&lookup), true, "/suggest?part=%D0%A0%D0%BE%D1%81").await;

        let terms = lookup.terms.lock().unwrap().clone();
        assert_eq!(terms, vec![("Poc".to_string(), "poc".to_string())]);
    }

    #[actix_rt::test]
    async fn cors_headers_are_always_present() {
        let handler = SuggestHandler::new(Arc::new(FixedLookup::new(1)), Normalizer::default());
        let app = test::init_service(
            App::new()
                .app_data(Data::new(handler))
                .app_data(Data::new(StatsdClient::from_sink("hinter-test", NopMetricSink)))
                .app_data(Data::new(Settings::load_for_tests(|_| ())))
                .configure(crate::configure_app),
        )
        .await;

        let response =
            test::call_service(&app, TestRequest::get().uri("/suggest?part=x").to_request()).await;
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(
            response.headers().get("access-control-allow-methods").unwrap(),
            "GET, OPTIONS"
        );
    }
}
