//! Reference data: known accounts and payees
//!
//! The form consumes this as a read-only snapshot with its own load
//! lifecycle. The provider seam keeps the core testable without any
//! network or filesystem in the way.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{CoreError, CoreResult};

/// Known account and payee names offered to the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub payees: Vec<String>,
}

/// Load lifecycle of the reference snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReferenceState {
    /// Initial state, nothing loaded yet
    Loading,
    /// Last load attempt failed
    Failed { message: String },
    /// Snapshot available
    Ready { data: ReferenceData },
}

/// Source of reference data
#[async_trait]
pub trait ReferenceProvider: Send + Sync {
    async fn load(&self) -> CoreResult<ReferenceData>;
}

/// Provider reference type
pub type ProviderRef = Arc<dyn ReferenceProvider>;

/// Reads reference data from a YAML file with `accounts` and `payees`
/// lists
pub struct FileReferenceProvider {
    path: PathBuf,
}

impl FileReferenceProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ReferenceProvider for FileReferenceProvider {
    async fn load(&self) -> CoreResult<ReferenceData> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::ReferenceUnavailable {
                message: format!("cannot read {}: {}", self.path.display(), e),
            }
        })?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::ReferenceUnavailable {
            message: format!("cannot parse {}: {}", self.path.display(), e),
        })
    }
}

/// Shared snapshot of the current [`ReferenceState`]
pub struct ReferenceCell {
    provider: ProviderRef,
    state: RwLock<ReferenceState>,
}

impl ReferenceCell {
    pub fn new(provider: ProviderRef) -> Self {
        Self {
            provider,
            state: RwLock::new(ReferenceState::Loading),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> ReferenceState {
        self.state.read().unwrap().clone()
    }

    /// Reload from the provider, recording failure without retrying
    pub async fn refresh(&self) {
        let next = match self.provider.load().await {
            Ok(data) => ReferenceState::Ready { data },
            Err(e) => {
                log::warn!(target: "beanform::reference", "reference load failed: {}", e);
                ReferenceState::Failed {
                    message: e.to_string(),
                }
            }
        };
        *self.state.write().unwrap() = next;
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        data: ReferenceData,
    }

    #[async_trait]
    impl ReferenceProvider for StaticProvider {
        async fn load(&self) -> CoreResult<ReferenceData> {
            Ok(self.data.clone())
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl ReferenceProvider for BrokenProvider {
        async fn load(&self) -> CoreResult<ReferenceData> {
            Err(CoreError::ReferenceUnavailable {
                message: "backend offline".to_string(),
            })
        }
    }

    #[test]
    fn test_cell_starts_loading() {
        let cell = ReferenceCell::new(Arc::new(StaticProvider {
            data: ReferenceData::default(),
        }));
        assert!(matches!(cell.state(), ReferenceState::Loading));
    }

    #[tokio::test]
    async fn test_refresh_reaches_ready() {
        let data = ReferenceData {
            accounts: vec!["Assets:Bank".to_string()],
            payees: vec!["Costco".to_string()],
        };
        let cell = ReferenceCell::new(Arc::new(StaticProvider { data: data.clone() }));
        cell.refresh().await;
        match cell.state() {
            ReferenceState::Ready { data: loaded } => assert_eq!(loaded, data),
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_records_failure() {
        let cell = ReferenceCell::new(Arc::new(BrokenProvider));
        cell.refresh().await;
        match cell.state() {
            ReferenceState::Failed { message } => assert!(message.contains("backend offline")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_yaml_shape() {
        let yaml = "accounts:\n  - Assets:Bank\npayees:\n  - Costco\n";
        let data: ReferenceData = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(data.accounts, vec!["Assets:Bank".to_string()]);
        assert_eq!(data.payees, vec!["Costco".to_string()]);
    }

    #[test]
    fn test_state_serializes_tagged() {
        let state = ReferenceState::Failed {
            message: "nope".to_string(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
    }
}
