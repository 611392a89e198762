//! Canned responses served by the stub, keyed by request path.

use contracts::dashboards::d400_unified_stats::GlobalStats;
use contracts::dashboards::d401_legacy_stats::{
    CommuneStatsResponse, HoraireStats, LegacyDashboard, TrendStats,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::handlers::{d400_unified_stats as d400, d401_legacy_stats as d401};

/// Sample dataset embedded in the binary
const SAMPLE_FIXTURES: &str = include_str!("../../fixtures/sample.json");

/// Response of one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: Value,
    /// Delay before answering, for timeout scenarios
    #[serde(default)]
    pub delay_ms: u64,
}

fn default_status() -> u16 {
    200
}

impl FixtureResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            delay_ms: 0,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Value::Null,
            delay_ms: 0,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixtures {
    endpoints: BTreeMap<String, FixtureResponse>,
}

impl Fixtures {
    /// Consistent sample data for every endpoint
    pub fn sample() -> anyhow::Result<Self> {
        Ok(serde_json::from_str(SAMPLE_FIXTURES)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading fixtures from: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replace the response of `path`
    pub fn with(mut self, path: &str, response: FixtureResponse) -> Self {
        self.endpoints.insert(path.to_string(), response);
        self
    }

    pub fn get(&self, path: &str) -> Option<&FixtureResponse> {
        self.endpoints.get(path)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Successful bodies that the shared DTOs cannot read, as `path: error`.
    /// Endpoints whose row shape varies between backend versions are not checked.
    pub fn validate(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .filter(|(_, response)| (200..300).contains(&response.status))
            .filter_map(|(path, response)| {
                let body = &response.body;
                let result = match path.as_str() {
                    d400::GLOBAL_STATS_PATH => readable::<GlobalStats>(body),
                    d401::DASHBOARD_PATH => readable::<LegacyDashboard>(body),
                    d401::TRENDS_PATH => readable::<TrendStats>(body),
                    d401::COMMUNES_PATH => readable::<CommuneStatsResponse>(body),
                    d401::HORAIRE_PATH => readable::<Vec<HoraireStats>>(body),
                    _ => Ok(()),
                };
                result.err().map(|e| format!("{}: {}", path, e))
            })
            .collect()
    }
}

fn readable<T: DeserializeOwned>(body: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(body).map(|_| ())
}

/// Request as seen by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

/// Shared state of the stub router
#[derive(Clone)]
pub struct AppState {
    fixtures: Arc<Fixtures>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl AppState {
    pub fn new(fixtures: Fixtures) -> Self {
        Self {
            fixtures: Arc::new(fixtures),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub fn record(&self, path: &str, query: HashMap<String, String>) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                path: path.to_string(),
                query,
            });
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}
