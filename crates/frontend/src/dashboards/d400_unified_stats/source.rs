use async_trait::async_trait;
use contracts::shared::DateRange;
use serde_json::Value;
use std::sync::Arc;

use super::api;
use crate::dashboards::d401_legacy_stats::LegacySource;
use crate::shared::api_utils::{ApiClient, ApiError};
use crate::shared::cancel::CancelToken;
use crate::shared::config::ApiMode;

/// Where a view's statistics come from
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Raw payload in the `/debug/global-stats` shape
    async fn global_stats(&self, range: &DateRange, cancel: &CancelToken)
        -> Result<Value, ApiError>;

    /// Independent payload the primary total is cross-checked against
    async fn consistency_probe(
        &self,
        range: &DateRange,
        cancel: &CancelToken,
    ) -> Result<Value, ApiError>;
}

/// `/debug/global-stats` + `/debug/data-consistency`
pub struct UnifiedSource {
    client: ApiClient,
}

impl UnifiedSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatsSource for UnifiedSource {
    fn name(&self) -> &'static str {
        "unified"
    }

    async fn global_stats(
        &self,
        range: &DateRange,
        cancel: &CancelToken,
    ) -> Result<Value, ApiError> {
        api::fetch_global_stats(&self.client, range, cancel).await
    }

    async fn consistency_probe(
        &self,
        range: &DateRange,
        cancel: &CancelToken,
    ) -> Result<Value, ApiError> {
        api::check_data_consistency(&self.client, range, cancel).await
    }
}

/// Source selected by the configured API mode
pub fn source_for(mode: ApiMode, client: ApiClient) -> Arc<dyn StatsSource> {
    match mode {
        ApiMode::Unified => Arc::new(UnifiedSource::new(client)),
        ApiMode::Legacy => Arc::new(LegacySource::new(client)),
    }
}
