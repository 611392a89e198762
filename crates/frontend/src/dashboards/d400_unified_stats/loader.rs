//! Per-view fetch orchestration.
//!
//! A `ViewDataLoader` owns the date range and the `FetchState` of one view.
//! Every fetch cycle (mount, refresh, range change, consistency check)
//! cancels the previous one before it starts, and only the most recently
//! issued cycle may commit its outcome: a superseded request leaves no trace
//! in the state, not even an error.

use chrono::{DateTime, Utc};
use contracts::dashboards::d400_unified_stats::{
    ConsistencyOutcome, GlobalStats, PageType, ViewModel,
};
use contracts::shared::{DateRange, DateRangeError};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

use super::consistency;
use super::normalizer::{self, SchemaError};
use super::source::{source_for, StatsSource};
use crate::shared::api_utils::{ApiClient, ApiError};
use crate::shared::cancel::CancelToken;
use crate::shared::config::Config;

/// Why a fetch cycle failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl LoadError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LoadError::Api(ApiError::Cancelled))
    }
}

/// What a view renders from
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState {
    pub data: Option<ViewModel>,
    /// Snapshot `data` was projected from
    pub stats: Option<Arc<GlobalStats>>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetch_time: Option<DateTime<Utc>>,
    /// Outcome of the last requested consistency check
    pub consistency: Option<ConsistencyOutcome>,
    /// Number of committed fetch outcomes (success or failure)
    pub revision: u64,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            data: None,
            stats: None,
            loading: true,
            error: None,
            last_fetch_time: None,
            consistency: None,
            revision: 0,
        }
    }
}

#[derive(Clone)]
pub struct ViewDataLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    page: PageType,
    source: Arc<dyn StatsSource>,
    range: Mutex<DateRange>,
    inflight: Mutex<Inflight>,
    state: watch::Sender<FetchState>,
}

#[derive(Default)]
struct Inflight {
    generation: u64,
    token: Option<CancelToken>,
}

impl Drop for LoaderInner {
    fn drop(&mut self) {
        let inflight = self.inflight.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = inflight.token.take() {
            token.cancel();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ViewDataLoader {
    /// Loader with the page's default period ending now
    pub fn new(page: PageType, source: Arc<dyn StatsSource>) -> Self {
        let range = DateRange::last_days(Utc::now(), page.default_days());
        Self::with_range(page, source, range)
    }

    pub fn with_range(page: PageType, source: Arc<dyn StatsSource>, range: DateRange) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            inner: Arc::new(LoaderInner {
                page,
                source,
                range: Mutex::new(range),
                inflight: Mutex::new(Inflight::default()),
                state,
            }),
        }
    }

    /// Loader wired to the API client and mode from `config`
    pub fn from_config(page: PageType, config: &Config) -> anyhow::Result<Self> {
        let client = ApiClient::new(config.api.base_url.clone(), config.request_timeout())?;
        tracing::info!(
            "D400 unified stats: {} view uses {:?} API at {}",
            page,
            config.api.mode,
            client.base_url()
        );
        Ok(Self::new(page, source_for(config.api.mode, client)))
    }

    pub fn page_type(&self) -> PageType {
        self.inner.page
    }

    pub fn date_range(&self) -> DateRange {
        *lock(&self.inner.range)
    }

    pub fn snapshot(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    pub fn is_consistent(&self) -> bool {
        self.inner
            .state
            .borrow()
            .consistency
            .as_ref()
            .is_some_and(ConsistencyOutcome::is_consistent)
    }

    /// `data_quality_status` of the current snapshot, `"UNKNOWN"` if none
    pub fn data_quality(&self) -> String {
        self.inner
            .state
            .borrow()
            .stats
            .as_ref()
            .and_then(|s| s.data_quality_status.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }

    /// First load of a freshly displayed view
    pub async fn mount(&self) {
        self.load(false).await
    }

    pub async fn refresh(&self) {
        self.load(false).await
    }

    /// Reload and cross-check the primary total against the independent source
    pub async fn check_consistency(&self) {
        self.load(true).await
    }

    /// Replace the period and reload. An inverted period is rejected and
    /// leaves both the range and the state untouched.
    pub async fn update_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(), DateRangeError> {
        let range = DateRange::new(from, to)?;
        self.set_date_range(range).await;
        Ok(())
    }

    pub async fn set_date_range(&self, range: DateRange) {
        *lock(&self.inner.range) = range;
        self.load(false).await
    }

    /// Abort the pending request, if any, without starting a new one.
    /// The view keeps its last committed data and stops loading.
    pub fn cancel(&self) {
        let mut inflight = lock(&self.inner.inflight);
        inflight.generation += 1;
        if let Some(token) = inflight.token.take() {
            token.cancel();
            self.inner.state.send_modify(|state| state.loading = false);
        }
    }

    async fn load(&self, with_consistency: bool) {
        let (generation, token, range) = self.begin();
        let page = self.inner.page;
        tracing::info!(
            "D400 unified stats: loading {} from {} source for {} .. {} (request #{})",
            page,
            self.inner.source.name(),
            range.from(),
            range.to(),
            generation
        );

        match self.fetch(&range, &token).await {
            Ok(stats) => {
                let view = normalizer::project(&stats, page);
                let total = stats.total_plaintes;
                let committed = self.commit(generation, |state| {
                    state.data = Some(view);
                    state.stats = Some(stats);
                    state.loading = false;
                    state.error = None;
                    state.last_fetch_time = Some(Utc::now());
                    // a report only describes the snapshot it was run against
                    state.consistency = None;
                    state.revision += 1;
                });
                if !committed {
                    tracing::debug!("D400 unified stats: request #{} superseded", generation);
                    return;
                }
                tracing::info!(
                    "D400 unified stats: {} loaded, {} complaints (request #{})",
                    page,
                    total,
                    generation
                );

                if with_consistency {
                    self.run_consistency(generation, total, &range, &token).await;
                }
            }
            Err(e) if e.is_cancellation() => {
                tracing::debug!("D400 unified stats: request #{} cancelled", generation);
                return;
            }
            Err(e) => {
                let message = e.to_string();
                let committed = self.commit(generation, |state| {
                    state.data = None;
                    state.stats = None;
                    state.loading = false;
                    state.error = Some(message);
                    state.consistency = None;
                    state.revision += 1;
                });
                if committed {
                    tracing::error!("D400 unified stats: failed to load {}: {}", page, e);
                }
            }
        }

        self.finish(generation);
    }

    async fn fetch(
        &self,
        range: &DateRange,
        token: &CancelToken,
    ) -> Result<Arc<GlobalStats>, LoadError> {
        let raw = self.inner.source.global_stats(range, token).await?;
        let stats = normalizer::parse_global_stats(&raw)?;
        Ok(Arc::new(stats))
    }

    async fn run_consistency(
        &self,
        generation: u64,
        primary_total: u64,
        range: &DateRange,
        token: &CancelToken,
    ) {
        let source = &self.inner.source;
        let outcome = consistency::check(
            async { Ok::<_, ApiError>(json!(primary_total)) },
            source.consistency_probe(range, token),
        )
        .await;

        if token.is_cancelled() {
            return;
        }
        self.commit(generation, |state| state.consistency = Some(outcome));
    }

    /// Cancel the previous cycle and open a new one
    fn begin(&self) -> (u64, CancelToken, DateRange) {
        let token = CancelToken::new();
        let generation = {
            let mut inflight = lock(&self.inner.inflight);
            if let Some(previous) = inflight.token.replace(token.clone()) {
                previous.cancel();
            }
            inflight.generation += 1;
            inflight.generation
        };

        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        (generation, token, self.date_range())
    }

    /// Apply `update` only if `generation` is still the latest cycle
    fn commit(&self, generation: u64, update: impl FnOnce(&mut FetchState)) -> bool {
        let inflight = lock(&self.inner.inflight);
        if inflight.generation != generation {
            return false;
        }
        self.inner.state.send_modify(update);
        true
    }

    fn finish(&self, generation: u64) {
        let mut inflight = lock(&self.inner.inflight);
        if inflight.generation == generation {
            inflight.token = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_unified_stats::source::testing::{ScriptedSource, Step};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use contracts::dashboards::d400_unified_stats::CommuneTotal;

    fn stats(total: u64) -> serde_json::Value {
        json!({
            "total_plaintes": total,
            "total_resolues": total / 2,
            "taux_resolution_global": 50.0,
            "top_communes": [{ "commune": "Agdal", "total": total }],
            "data_quality_status": "GOOD"
        })
    }

    fn loader(page: PageType, source: &Arc<ScriptedSource>) -> ViewDataLoader {
        let range = DateRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        )
        .unwrap();
        ViewDataLoader::with_range(page, source.clone(), range)
    }

    fn total(state: &FetchState) -> u64 {
        state.data.as_ref().unwrap().base().total_plaintes
    }

    #[tokio::test]
    async fn test_initial_state_is_loading_without_data() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let state = loader(PageType::Dashboard, &source).snapshot();
        assert!(state.loading);
        assert!(state.data.is_none());
        assert!(state.error.is_none());
        assert!(state.last_fetch_time.is_none());
    }

    #[tokio::test]
    async fn test_default_range_per_page() {
        let source: Arc<dyn StatsSource> = Arc::new(ScriptedSource::new(vec![]));
        let dashboard = ViewDataLoader::new(PageType::Dashboard, source.clone());
        assert_eq!(dashboard.date_range().duration(), ChronoDuration::days(7));
        let resolution = ViewDataLoader::new(PageType::Resolution, source);
        assert_eq!(resolution.date_range().duration(), ChronoDuration::days(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_commits_view_model() {
        let source = Arc::new(ScriptedSource::new(vec![Step::ok(20, stats(500))]));
        let loader = loader(PageType::Dashboard, &source);

        loader.mount().await;

        let state = loader.snapshot();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.last_fetch_time.is_some());
        assert_eq!(state.revision, 1);
        let dashboard = state.data.as_ref().unwrap().as_dashboard().unwrap();
        assert_eq!(dashboard.summary.total_plaintes, 500);
        assert_eq!(dashboard.top_communes[0], CommuneTotal::new("Agdal", 500));
        assert_eq!(loader.data_quality(), "GOOD");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_refresh_supersedes_slower_first() {
        let source = Arc::new(ScriptedSource::new(vec![
            Step::ok(100, stats(1)),
            Step::ok(10, stats(2)),
        ]));
        let loader = loader(PageType::Stats, &source);

        tokio::join!(loader.refresh(), loader.refresh());

        let state = loader.snapshot();
        assert_eq!(source.calls(), 2);
        assert_eq!(state.revision, 1);
        assert_eq!(total(&state), 2);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_refresh_supersedes_faster_first() {
        let source = Arc::new(ScriptedSource::new(vec![
            Step::ok(10, stats(1)),
            Step::ok(100, stats(2)),
        ]));
        let loader = loader(PageType::Stats, &source);

        tokio::join!(loader.refresh(), loader.refresh());

        let state = loader.snapshot();
        assert_eq!(state.revision, 1);
        assert_eq!(total(&state), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_failure_is_not_surfaced() {
        let source = Arc::new(ScriptedSource::new(vec![
            Step::err(10, ApiError::Http { status: 500 }),
            Step::ok(50, stats(7)),
        ]));
        let loader = loader(PageType::Resolution, &source);

        tokio::join!(loader.refresh(), loader.refresh());

        let state = loader.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.revision, 1);
        assert_eq!(total(&state), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_previous_data() {
        let source = Arc::new(ScriptedSource::new(vec![
            Step::ok(0, stats(10)),
            Step::err(0, ApiError::Http { status: 502 }),
        ]));
        let loader = loader(PageType::Dashboard, &source);

        loader.mount().await;
        assert!(loader.snapshot().data.is_some());

        loader.refresh().await;
        let state = loader.snapshot();
        assert!(!state.loading);
        assert!(state.data.is_none());
        assert_eq!(state.error.as_deref(), Some("HTTP error: 502"));
        assert_eq!(state.revision, 2);
    }

    #[tokio::test]
    async fn test_schema_error_surfaces_as_message() {
        let source = Arc::new(ScriptedSource::new(vec![Step::ok(0, json!({ "total_resolues": 3 }))]));
        let loader = loader(PageType::Dashboard, &source);

        loader.mount().await;

        let error = loader.snapshot().error.unwrap();
        assert!(error.contains("total_plaintes"), "unexpected error: {}", error);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected_without_fetch() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let loader = loader(PageType::Stats, &source);
        let before = loader.date_range();

        let from = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let result = loader.update_date_range(from, to).await;

        assert!(matches!(result, Err(DateRangeError::Inverted { .. })));
        assert_eq!(loader.date_range(), before);
        assert_eq!(source.calls(), 0);
        assert_eq!(loader.snapshot(), FetchState::default());
    }

    #[tokio::test]
    async fn test_update_date_range_fetches_new_period() {
        let source = Arc::new(ScriptedSource::new(vec![Step::ok(0, stats(4))]));
        let loader = loader(PageType::Stats, &source);

        let from = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        loader.update_date_range(from, to).await.unwrap();

        assert_eq!(loader.date_range().from(), from);
        assert_eq!(source.ranges(), vec![DateRange::new(from, to).unwrap()]);
        assert_eq!(total(&loader.snapshot()), 4);
    }

    #[tokio::test]
    async fn test_refresh_without_consistency_leaves_report_empty() {
        let source = Arc::new(
            ScriptedSource::new(vec![Step::ok(0, stats(100))])
                .with_probes(vec![Step::ok(0, json!(103))]),
        );
        let loader = loader(PageType::Dashboard, &source);

        loader.refresh().await;
        assert!(loader.snapshot().consistency.is_none());
        assert!(!loader.is_consistent());
    }

    #[tokio::test]
    async fn test_check_consistency_attaches_report() {
        let source = Arc::new(
            ScriptedSource::new(vec![Step::ok(0, stats(100))])
                .with_probes(vec![Step::ok(0, json!({ "totalPlaintes": 103 }))]),
        );
        let loader = loader(PageType::Dashboard, &source);

        loader.check_consistency().await;

        let state = loader.snapshot();
        let report = state.consistency.as_ref().unwrap().report().unwrap();
        assert!(!report.is_consistent);
        assert_eq!(report.primary_total, 100.0);
        assert_eq!(report.secondary_total, 103.0);
        assert_eq!(report.percent_difference, 3.0);
        assert!(!loader.is_consistent());
        assert_eq!(state.revision, 1);
    }

    #[tokio::test]
    async fn test_probe_failure_keeps_primary_data() {
        let source = Arc::new(
            ScriptedSource::new(vec![Step::ok(0, stats(100))])
                .with_probes(vec![Step::err(0, ApiError::Timeout(std::time::Duration::from_secs(30)))]),
        );
        let loader = loader(PageType::Dashboard, &source);

        loader.check_consistency().await;

        let state = loader.snapshot();
        assert!(state.error.is_none());
        assert_eq!(total(&state), 100);
        assert_eq!(
            state.consistency,
            Some(ConsistencyOutcome::Failed {
                error: "Request timed out after 30s".to_string()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_committed_state() {
        let source = Arc::new(ScriptedSource::new(vec![Step::ok(5, stats(9))]));
        let loader = loader(PageType::Stats, &source);
        let mut rx = loader.subscribe();

        loader.refresh().await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(total(&state), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending_request() {
        let source = Arc::new(ScriptedSource::new(vec![Step::ok(50, stats(3))]));
        let loader = loader(PageType::Stats, &source);

        let pending = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.refresh().await })
        };
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }
        loader.cancel();
        pending.await.unwrap();

        let state = loader.snapshot();
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert_eq!(state.revision, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_committed_data_and_stops_loading() {
        let source = Arc::new(ScriptedSource::new(vec![
            Step::ok(0, stats(5)),
            Step::ok(50, stats(6)),
        ]));
        let loader = loader(PageType::Stats, &source);
        loader.mount().await;

        let pending = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.refresh().await })
        };
        while source.calls() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(loader.snapshot().loading);
        loader.cancel();
        pending.await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;

        let state = loader.snapshot();
        assert!(!state.loading);
        assert_eq!(total(&state), 5);
        assert_eq!(state.revision, 1);
    }

    #[tokio::test]
    async fn test_cancel_when_idle_leaves_state_untouched() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let loader = loader(PageType::Stats, &source);

        loader.cancel();
        assert_eq!(loader.snapshot(), FetchState::default());
    }

    #[tokio::test]
    async fn test_new_period_drops_previous_consistency_report() {
        let source = Arc::new(
            ScriptedSource::new(vec![Step::ok(0, stats(100)), Step::ok(0, stats(80))])
                .with_probes(vec![Step::ok(0, json!(100))]),
        );
        let loader = loader(PageType::Dashboard, &source);

        loader.check_consistency().await;
        assert!(loader.is_consistent());

        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        loader.update_date_range(from, to).await.unwrap();

        let state = loader.snapshot();
        assert_eq!(total(&state), 80);
        assert!(state.consistency.is_none());
        assert!(!loader.is_consistent());
    }

    #[tokio::test]
    async fn test_failed_refresh_drops_consistency_report() {
        let source = Arc::new(
            ScriptedSource::new(vec![
                Step::ok(0, stats(100)),
                Step::err(0, ApiError::Http { status: 500 }),
            ])
            .with_probes(vec![Step::ok(0, json!(100))]),
        );
        let loader = loader(PageType::Dashboard, &source);

        loader.check_consistency().await;
        assert!(loader.is_consistent());

        loader.refresh().await;
        assert!(loader.snapshot().consistency.is_none());
        assert!(!loader.is_consistent());
    }
}
