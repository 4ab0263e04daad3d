//! End-to-end tests of the paginator over an in-memory executor and the
//! moka cache provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};

use querypage_cache::memory::MemoryCacheProvider;
use querypage_core::config::PaginateConfig;
use querypage_core::config::cache::MemoryCacheConfig;
use querypage_core::error::{AppError, ErrorKind};
use querypage_core::result::AppResult;
use querypage_core::traits::{CacheProvider, QueryExecutor, SqlDialect};
use querypage_core::types::{SelectPlan, SortDirection, SortSpec};
use querypage_query::RawRequest;
use querypage_service::Paginator;

#[derive(Debug)]
struct DoubleQuotes;

impl SqlDialect for DoubleQuotes {
    fn name(&self) -> &str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }
}

/// Serves fixed rows and a total derived from the first bound parameter.
#[derive(Debug)]
struct StubExecutor {
    dialect: DoubleQuotes,
    rows: Vec<Value>,
    totals: Vec<(Value, u64)>,
    default_total: u64,
    fail: bool,
    plans: Mutex<Vec<SelectPlan>>,
    counts: AtomicUsize,
    fetches: AtomicUsize,
}

impl StubExecutor {
    fn new(rows: Vec<Value>, default_total: u64) -> Self {
        Self {
            dialect: DoubleQuotes,
            rows,
            totals: Vec::new(),
            default_total,
            fail: false,
            plans: Mutex::new(Vec::new()),
            counts: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    fn last_plan(&self) -> SelectPlan {
        self.plans
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a plan was executed")
    }
}

#[async_trait]
impl QueryExecutor for StubExecutor {
    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    async fn count(&self, plan: &SelectPlan) -> AppResult<u64> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::database("relation \"missing\" does not exist"));
        }
        let first = plan.query.params.first();
        Ok(self
            .totals
            .iter()
            .find(|(param, _)| Some(param) == first)
            .map(|(_, total)| *total)
            .unwrap_or(self.default_total))
    }

    async fn fetch(&self, plan: &SelectPlan) -> AppResult<Vec<Value>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.plans.lock().unwrap().push(plan.clone());
        if self.fail {
            return Err(AppError::database("relation \"missing\" does not exist"));
        }
        Ok(self.rows.clone())
    }
}

fn memory_cache() -> Arc<dyn CacheProvider> {
    Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60))
}

fn rows(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({"id": i})).collect()
}

#[tokio::test]
async fn test_response_assembles_envelope() {
    let executor = Arc::new(StubExecutor::new(rows(5), 25));
    let paginator = Paginator::new(&PaginateConfig::default(), executor.clone(), None);

    let page = paginator
        .with("articles")
        .request(&RawRequest::get(b"page=3&size=10&sort=-created_at,user.name"))
        .response()
        .await
        .unwrap();

    assert_eq!(page.page, 3);
    assert_eq!(page.size, 10);
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.max_page, 3);
    assert!(page.last);
    assert!(!page.first);
    assert_eq!(page.visible, 5);
    assert!(!page.error);

    let plan = executor.last_plan();
    assert_eq!(plan.source, "articles");
    assert_eq!(plan.query.limit, 10);
    assert_eq!(plan.query.offset, 20);
    assert_eq!(
        plan.query.sorts,
        vec![
            SortSpec::new("\"created_at\"", SortDirection::Desc),
            SortSpec::new("\"User__name\"", SortDirection::Asc),
        ]
    );
}

#[tokio::test]
async fn test_empty_result_has_no_pages() {
    let executor = Arc::new(StubExecutor::new(Vec::new(), 0));
    let paginator = Paginator::new(&PaginateConfig::default(), executor, None);

    let page = paginator
        .response("articles", &RawRequest::get(b""))
        .await
        .unwrap();
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.max_page, 0);
    assert!(page.first);
    assert!(!page.last);
    assert_eq!(page.visible, 0);
}

#[tokio::test]
async fn test_filters_reach_executor_in_order() {
    let executor = Arc::new(StubExecutor::new(rows(1), 1));
    let paginator = Paginator::new(&PaginateConfig::default(), executor.clone(), None);

    let body = br#"{"filters": [["title", "like", "Rust 100%"], ["AND"], ["views", ">", 10.0]]}"#;
    paginator
        .with("articles")
        .request(&RawRequest::post(body))
        .response()
        .await
        .unwrap();

    let plan = executor.last_plan();
    assert_eq!(
        plan.query.where_string,
        "( LOWER((\"title\")::text) LIKE ? ESCAPE '\\' AND \"views\" > ? )"
    );
    assert_eq!(plan.query.params, vec![json!("%rust 100\\%%"), json!(10)]);
}

#[tokio::test]
async fn test_page_cache_short_circuits_execution() {
    let executor = Arc::new(StubExecutor::new(rows(2), 2));
    let paginator = Paginator::new(
        &PaginateConfig::default(),
        executor.clone(),
        Some(memory_cache()),
    );

    let req = RawRequest::get(b"page=1&size=2");
    let first = paginator
        .with("articles")
        .request(&req)
        .cache("articles:")
        .response()
        .await
        .unwrap();
    let second = paginator
        .with("articles")
        .request(&req)
        .cache("articles:")
        .response()
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(executor.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(executor.counts.load(Ordering::SeqCst), 1);

    // A different page is a different key.
    paginator
        .with("articles")
        .request(&RawRequest::get(b"page=2&size=2"))
        .cache("articles:")
        .response()
        .await
        .unwrap();
    assert_eq!(executor.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_without_prefix_nothing_is_cached() {
    let executor = Arc::new(StubExecutor::new(rows(2), 2));
    let paginator = Paginator::new(
        &PaginateConfig::default(),
        executor.clone(),
        Some(memory_cache()),
    );

    for _ in 0..2 {
        paginator
            .response("articles", &RawRequest::get(b"page=1"))
            .await
            .unwrap();
    }
    assert_eq!(executor.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_distinct_filters_never_share_cached_count() {
    let mut stub = StubExecutor::new(rows(1), 0);
    stub.totals = vec![(json!("active"), 3), (json!("archived"), 7)];
    let executor = Arc::new(stub);
    let config = PaginateConfig {
        count_cache_enabled: true,
        ..Default::default()
    };
    let paginator = Paginator::new(&config, executor.clone(), Some(memory_cache()));

    let active = br#"{"filters": [["status", "active"]]}"#;
    let archived = br#"{"filters": [["status", "archived"]]}"#;

    let a = paginator.response("articles", &RawRequest::post(active)).await.unwrap();
    let b = paginator.response("articles", &RawRequest::post(archived)).await.unwrap();
    let a_again = paginator.response("articles", &RawRequest::post(active)).await.unwrap();

    assert_eq!(a.total, 3);
    assert_eq!(b.total, 7);
    assert_eq!(a_again.total, 3);
    // The repeated filter is served from the count cache.
    assert_eq!(executor.counts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_count_cache_ignores_window() {
    let executor = Arc::new(StubExecutor::new(rows(1), 40));
    let config = PaginateConfig {
        count_cache_enabled: true,
        ..Default::default()
    };
    let paginator = Paginator::new(&config, executor.clone(), Some(memory_cache()));

    paginator.response("articles", &RawRequest::get(b"page=1")).await.unwrap();
    let second = paginator.response("articles", &RawRequest::get(b"page=2&sort=-id")).await.unwrap();

    assert_eq!(second.total, 40);
    assert_eq!(executor.counts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failures_propagate_by_default() {
    let mut stub = StubExecutor::new(Vec::new(), 0);
    stub.fail = true;
    let paginator = Paginator::new(&PaginateConfig::default(), Arc::new(stub), None);

    let err = paginator
        .response("missing", &RawRequest::get(b""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
}

#[tokio::test]
async fn test_failures_reported_in_envelope_when_enabled() {
    let mut stub = StubExecutor::new(Vec::new(), 0);
    stub.fail = true;
    let config = PaginateConfig {
        error_enabled: true,
        ..Default::default()
    };
    let paginator = Paginator::new(&config, Arc::new(stub), Some(memory_cache()));

    let page = paginator
        .with("missing")
        .request(&RawRequest::get(b"page=2&size=5"))
        .cache("missing:")
        .response()
        .await
        .unwrap();

    assert!(page.error);
    assert!(
        page.error_message
            .as_deref()
            .is_some_and(|m| m.contains("does not exist"))
    );
    assert_eq!(page.page, 2);
    assert_eq!(page.size, 5);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_field_whitelist() {
    let executor = Arc::new(StubExecutor::new(rows(1), 1));
    let config = PaginateConfig {
        field_selector_enabled: true,
        ..Default::default()
    };
    let paginator = Paginator::new(&config, executor.clone(), None);

    paginator
        .with("articles")
        .request(&RawRequest::get(b"fields=title,password_hash"))
        .fields(["id", "title"])
        .response()
        .await
        .unwrap();
    assert_eq!(executor.last_plan().columns, vec!["\"title\"".to_string()]);

    paginator
        .with("articles")
        .request(&RawRequest::get(b""))
        .fields(["id", "title"])
        .response()
        .await
        .unwrap();
    assert_eq!(
        executor.last_plan().columns,
        vec!["\"id\"".to_string(), "\"title\"".to_string()]
    );
}

#[tokio::test]
async fn test_clear_cache_forces_reexecution() {
    let executor = Arc::new(StubExecutor::new(rows(1), 1));
    let paginator = Paginator::new(
        &PaginateConfig::default(),
        executor.clone(),
        Some(memory_cache()),
    );

    let run = || async {
        paginator
            .with("articles")
            .request(&RawRequest::get(b"page=1"))
            .cache("articles:")
            .response()
            .await
            .unwrap()
    };

    run().await;
    run().await;
    assert_eq!(executor.fetches.load(Ordering::SeqCst), 1);

    paginator
        .clear_cache(["articles:"])
        .expect("cache configured")
        .await
        .unwrap();
    run().await;
    assert_eq!(executor.fetches.load(Ordering::SeqCst), 2);

    paginator
        .clear_all_cache()
        .expect("cache configured")
        .await
        .unwrap();
    run().await;
    assert_eq!(executor.fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_http_request_shape() {
    let executor = Arc::new(StubExecutor::new(rows(3), 3));
    let paginator = Paginator::new(&PaginateConfig::default(), executor.clone(), None);

    let req = http::Request::builder()
        .method("POST")
        .uri("/api/articles")
        .body(Bytes::from_static(
            br#"{"page": 1, "size": 3, "filters": "[[\"id\", \"in\", [1, 2, 3]]]"}"#,
        ))
        .unwrap();

    let page = paginator.response("articles", &req).await.unwrap();
    assert_eq!(page.visible, 3);
    assert!(page.first);
    assert!(page.last);

    let plan = executor.last_plan();
    assert_eq!(plan.query.where_string, "( \"id\" IN ? )");
    assert_eq!(plan.query.params, vec![json!([1, 2, 3])]);
}

#[tokio::test]
async fn test_caller_config_is_not_mutated() {
    let config = PaginateConfig {
        default_size: 0,
        ..Default::default()
    };
    let executor = Arc::new(StubExecutor::new(Vec::new(), 0));
    let paginator = Paginator::new(&config, executor, None);

    assert_eq!(config.default_size, 0);
    assert!(config.field_wrapper.is_none());
    assert_eq!(paginator.config().default_size, 10);
    assert_eq!(
        paginator.config().field_wrapper.as_deref(),
        Some("LOWER((%s)::text)")
    );
}
