//! List request orchestration.
//!
//! ```text
//! paginator.with("articles")
//!     .request(&req)
//!     .cache("articles:")
//!     .fields(allowed)
//!     .response()
//!     .await
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use querypage_cache::keys;
use querypage_core::config::PaginateConfig;
use querypage_core::error::AppError;
use querypage_core::result::AppResult;
use querypage_core::traits::{CacheProvider, EnvelopeCodec, QueryExecutor};
use querypage_core::types::{Page, RequestDescriptor, SelectPlan};
use querypage_query::column::select_columns;
use querypage_query::{QueryContext, RequestSource, compile_request, describe_request};

use crate::gateway::CacheGateway;

/// Entry point for paginated list queries.
///
/// Holds the resolved configuration, the executor and the cache gateway.
/// Cheap to clone; share one per process.
#[derive(Debug, Clone)]
pub struct Paginator {
    config: Arc<PaginateConfig>,
    executor: Arc<dyn QueryExecutor>,
    gateway: CacheGateway,
}

impl Paginator {
    /// Create a paginator.
    ///
    /// `config` is copied and resolved against the executor's dialect; the
    /// caller's value is never modified.
    pub fn new(
        config: &PaginateConfig,
        executor: Arc<dyn QueryExecutor>,
        cache: Option<Arc<dyn CacheProvider>>,
    ) -> Self {
        let resolved = config.resolved(Some(executor.dialect()));
        info!(
            dialect = executor.dialect().name(),
            default_size = resolved.default_size,
            operator = %resolved.operator,
            cache = cache.is_some(),
            "Paginator ready"
        );

        let gateway = CacheGateway::new(cache, Duration::from_secs(resolved.cache_ttl_seconds));
        Self {
            config: Arc::new(resolved),
            executor,
            gateway,
        }
    }

    /// Replace the codec used for cached envelopes.
    pub fn with_codec(mut self, codec: Arc<dyn EnvelopeCodec>) -> Self {
        self.gateway = self.gateway.with_codec(codec);
        self
    }

    /// The resolved configuration.
    pub fn config(&self) -> &PaginateConfig {
        &self.config
    }

    /// Start a list request against `source` (a table or view).
    pub fn with(&self, source: impl Into<String>) -> SourceContext<'_> {
        SourceContext {
            paginator: self,
            source: source.into(),
        }
    }

    /// One-shot list of `source` without page caching or field whitelist.
    pub async fn response(
        &self,
        source: impl Into<String>,
        req: &impl RequestSource,
    ) -> AppResult<Page> {
        self.with(source).request(req).response().await
    }

    /// Drop cached pages under each prefix in the background.
    pub fn clear_cache<I, S>(&self, prefixes: I) -> Option<JoinHandle<()>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        self.gateway.clear_prefixes(prefixes)
    }

    /// Drop every cached page and count in the background.
    pub fn clear_all_cache(&self) -> Option<JoinHandle<()>> {
        self.gateway.clear_all()
    }

    fn context(&self) -> QueryContext<'_> {
        QueryContext::new(&self.config, self.executor.dialect())
    }
}

/// A list request bound to a source, awaiting its inbound request.
#[derive(Debug)]
pub struct SourceContext<'p> {
    paginator: &'p Paginator,
    source: String,
}

impl<'p> SourceContext<'p> {
    /// Read list parameters from `req`.
    pub fn request(self, req: &impl RequestSource) -> ListRequest<'p> {
        let descriptor = describe_request(req, &self.paginator.context());
        self.descriptor(descriptor)
    }

    /// Use an already built descriptor.
    pub fn descriptor(self, descriptor: RequestDescriptor) -> ListRequest<'p> {
        ListRequest {
            paginator: self.paginator,
            source: self.source,
            descriptor,
            cache_prefix: String::new(),
            fields: Vec::new(),
        }
    }
}

/// A fully described list request, ready to execute.
#[derive(Debug)]
pub struct ListRequest<'p> {
    paginator: &'p Paginator,
    source: String,
    descriptor: RequestDescriptor,
    cache_prefix: String,
    fields: Vec<String>,
}

impl ListRequest<'_> {
    /// Cache the envelope under `prefix`. An empty prefix disables caching.
    pub fn cache(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Restrict the response to these fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The descriptor this request was built with.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Execute the request and assemble the envelope.
    ///
    /// Executor failures are returned as errors, or reported inside the
    /// envelope when `error_enabled` is set.
    pub async fn response(self) -> AppResult<Page> {
        let paginator = self.paginator;
        let gateway = &paginator.gateway;

        let page_key = if !self.cache_prefix.is_empty() && gateway.is_enabled() {
            match keys::page_key(&self.cache_prefix, &self.descriptor) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(error = %e, "Failed to derive page cache key");
                    None
                }
            }
        } else {
            None
        };

        if let Some(key) = &page_key {
            if let Some(page) = gateway.load_page(key).await {
                return Ok(page);
            }
        }

        let ctx = paginator.context();
        let plan = SelectPlan {
            source: self.source.clone(),
            columns: select_columns(&self.descriptor.fields, &self.fields, &ctx),
            query: compile_request(&self.descriptor, &ctx),
        };
        debug!(
            source = %plan.source,
            predicate = %plan.query.where_string,
            params = plan.query.params.len(),
            limit = plan.query.limit,
            offset = plan.query.offset,
            "Executing list query"
        );

        let executed = tokio::try_join!(self.total(&plan), paginator.executor.fetch(&plan));
        let (total, rows) = match executed {
            Ok(result) => result,
            Err(e) => return self.failed(e),
        };

        let page = Page::assemble(
            rows,
            self.descriptor.page,
            self.descriptor.size,
            plan.query.offset,
            total,
        );

        if let Some(key) = &page_key {
            gateway.store_page(key, &page).await;
        }
        Ok(page)
    }

    /// Row count, served from the count cache when enabled.
    async fn total(&self, plan: &SelectPlan) -> AppResult<u64> {
        let paginator = self.paginator;
        let key = if paginator.config.count_cache_enabled && paginator.gateway.is_enabled() {
            keys::count_key(&plan.source, &plan.query).ok()
        } else {
            None
        };

        if let Some(key) = &key {
            if let Some(total) = paginator.gateway.load_count(key).await {
                return Ok(total);
            }
        }

        let total = paginator.executor.count(plan).await?;
        if let Some(key) = &key {
            paginator.gateway.store_count(key, total).await;
        }
        Ok(total)
    }

    fn failed(&self, err: AppError) -> AppResult<Page> {
        if !self.paginator.config.error_enabled {
            return Err(err);
        }
        warn!(source = %self.source, error = %err, "List query failed; reporting in envelope");
        Ok(Page::failed(
            self.descriptor.page,
            self.descriptor.size,
            self.descriptor.offset(),
            err.to_string(),
        ))
    }
}
