//! Index and mapping reconciliation run when a model is bound.
//!
//! Every administrative failure is logged and folded into the reported
//! status; none of them reaches the code that constructed the model.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use rebound_repository::SearchConnection;
use rebound_shared::IndexOptions;

/// Setting fetched from existing indices for diagnostics.
pub(crate) const DYNAMIC_SETTING: &str = "index.mapper.dynamic";

/// Outcome of reconciling a model's index and mapping with the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// Reconciliation has not finished yet.
    Pending,
    /// The index was missing; it was created and the mapping applied.
    Created,
    /// The index existed; the mapping was reapplied.
    Updated,
    /// At least one step failed. The model is still usable.
    Failed(String),
}

impl ReconcileStatus {
    /// Whether reconciliation has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether reconciliation finished without any failed step.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Created | Self::Updated)
    }
}

/// Everything one reconciliation pass needs, detached from the model.
pub(crate) struct Reconciler {
    pub(crate) connection: Arc<dyn SearchConnection>,
    pub(crate) index: String,
    pub(crate) doc_type: String,
    pub(crate) mapping: Value,
    pub(crate) options: Option<IndexOptions>,
}

impl Reconciler {
    /// Check for the index, then provision it or refresh its mapping.
    ///
    /// A failed existence check counts as "absent".
    #[instrument(skip(self), fields(index = %self.index, doc_type = %self.doc_type))]
    pub(crate) async fn run(self) -> ReconcileStatus {
        let exists = match self.connection.index_exists(&self.index).await {
            Ok(exists) => {
                debug!(exists, "Checked index existence");
                exists
            }
            Err(e) => {
                warn!(error = %e, "Index existence check failed, treating index as absent");
                false
            }
        };

        let status = if exists {
            self.refresh().await
        } else {
            self.provision().await
        };

        match &status {
            ReconcileStatus::Failed(reason) => warn!(reason = %reason, "Reconciliation incomplete"),
            other => info!(status = ?other, "Reconciliation finished"),
        }
        status
    }

    /// Create the index, then apply the mapping whatever the create outcome.
    async fn provision(&self) -> ReconcileStatus {
        info!("Creating index");
        let mut failures = Vec::new();

        match self.connection.create_index(&self.index).await {
            Ok(_) => info!("Created index"),
            Err(e) => {
                error!(error = %e, "Failed to create index");
                failures.push(format!("create_index: {}", e));
            }
        }

        if let Err(reason) = self.apply_mapping().await {
            failures.push(reason);
        }

        Self::status(failures, ReconcileStatus::Created)
    }

    /// Log the dynamic-mapping setting and reapply the mapping.
    async fn refresh(&self) -> ReconcileStatus {
        match self
            .connection
            .get_settings(&self.index, DYNAMIC_SETTING)
            .await
        {
            Ok(settings) => debug!(settings = %settings, "Fetched dynamic mapping setting"),
            Err(e) => warn!(error = %e, "Failed to fetch dynamic mapping setting"),
        }

        if self.options.is_some_and(|options| options.is_strict()) {
            // TODO: push `index.mapper.dynamic` to existing indices once the
            // settings payload for strict schemas is agreed on.
            warn!(
                setting = DYNAMIC_SETTING,
                "Strict index options are not applied to existing indices"
            );
        }

        let failures = match self.apply_mapping().await {
            Ok(()) => Vec::new(),
            Err(reason) => vec![reason],
        };

        Self::status(failures, ReconcileStatus::Updated)
    }

    async fn apply_mapping(&self) -> Result<(), String> {
        match self
            .connection
            .put_mapping(&self.index, &self.doc_type, &self.mapping)
            .await
        {
            Ok(_) => {
                debug!("Applied mapping");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to apply mapping");
                Err(format!("put_mapping: {}", e))
            }
        }
    }

    fn status(failures: Vec<String>, success: ReconcileStatus) -> ReconcileStatus {
        if failures.is_empty() {
            success
        } else {
            ReconcileStatus::Failed(failures.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockConnection};
    use rebound_repository::SearchError;
    use serde_json::json;

    fn reconciler(connection: Arc<MockConnection>, options: Option<IndexOptions>) -> Reconciler {
        Reconciler {
            connection,
            index: "blog".to_string(),
            doc_type: "post".to_string(),
            mapping: json!({"properties": {"title": {"type": "text"}}}),
            options,
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_created_then_mapped() {
        let connection = Arc::new(MockConnection::new().with_index_exists(Ok(false)));

        let status = reconciler(connection.clone(), None).run().await;

        assert_eq!(status, ReconcileStatus::Created);
        let calls = connection.calls().await;
        assert_eq!(
            calls,
            vec![
                Call::IndexExists("blog".to_string()),
                Call::CreateIndex("blog".to_string()),
                Call::PutMapping {
                    index: "blog".to_string(),
                    doc_type: "post".to_string(),
                    mapping: json!({"properties": {"title": {"type": "text"}}}),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_mapping_applied_even_when_create_fails() {
        let connection = Arc::new(
            MockConnection::new()
                .with_index_exists(Ok(false))
                .with_admin_failure(SearchError::request("create_index", 400, "already exists")),
        );

        let status = reconciler(connection.clone(), None).run().await;

        assert!(matches!(status, ReconcileStatus::Failed(ref reason) if reason.contains("create_index")));
        let calls = connection.calls().await;
        assert!(calls
            .iter()
            .any(|call| matches!(call, Call::PutMapping { .. })));
    }

    #[tokio::test]
    async fn test_existence_error_treated_as_absent() {
        let connection = Arc::new(
            MockConnection::new().with_index_exists(Err(SearchError::connection("refused"))),
        );

        let status = reconciler(connection.clone(), None).run().await;

        assert_eq!(status, ReconcileStatus::Created);
        assert!(connection
            .calls()
            .await
            .contains(&Call::CreateIndex("blog".to_string())));
    }

    #[tokio::test]
    async fn test_existing_index_fetches_settings_and_remaps() {
        let connection = Arc::new(MockConnection::new().with_index_exists(Ok(true)));

        let status = reconciler(connection.clone(), Some(IndexOptions { dynamic: Some(false) }))
            .run()
            .await;

        assert_eq!(status, ReconcileStatus::Updated);
        let calls = connection.calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            Call::GetSettings {
                index: "blog".to_string(),
                name: DYNAMIC_SETTING.to_string(),
            }
        );
        assert!(matches!(calls[2], Call::PutMapping { .. }));
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::CreateIndex(_))));
    }

    #[tokio::test]
    async fn test_settings_failure_does_not_fail_reconciliation() {
        let connection = Arc::new(
            MockConnection::new()
                .with_index_exists(Ok(true))
                .with_settings_failure(SearchError::request("get_settings", 500, "boom")),
        );

        let status = reconciler(connection, None).run().await;
        assert_eq!(status, ReconcileStatus::Updated);
    }

    #[tokio::test]
    async fn test_mapping_failure_reported() {
        let connection = Arc::new(
            MockConnection::new()
                .with_index_exists(Ok(true))
                .with_admin_failure(SearchError::request("put_mapping", 400, "conflict")),
        );

        let status = reconciler(connection, None).run().await;

        assert!(!status.is_ok());
        assert!(status.is_terminal());
    }

    #[test]
    fn test_status_predicates() {
        assert!(!ReconcileStatus::Pending.is_terminal());
        assert!(ReconcileStatus::Created.is_ok());
        assert!(ReconcileStatus::Updated.is_ok());
        assert!(!ReconcileStatus::Failed("x".to_string()).is_ok());
    }
}
