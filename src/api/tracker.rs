use serde_json::Value;

use super::client::ApiClient;
use crate::config::endpoints;
use crate::logger::Logger;

/// Outcome of a teardown pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    /// `(id, error message)` for every delete that failed
    pub failed: Vec<(String, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ids of transactions created by a suite, deleted again at teardown.
pub struct TransactionTracker {
    ids: Vec<String>,
    logger: Logger,
}

impl Default for TransactionTracker {
    fn default() -> Self {
        Self::new(Logger::util("TransactionTracker"))
    }
}

impl TransactionTracker {
    pub fn new(logger: Logger) -> Self {
        Self {
            ids: Vec::new(),
            logger,
        }
    }

    pub fn track(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Stop tracking `id`, for transactions a test deleted itself.
    pub fn untrack(&mut self, id: &str) {
        self.ids.retain(|tracked| tracked != id);
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Delete every tracked transaction once.
    ///
    /// Failures are logged as warnings and reported; nothing is retried and
    /// the tracker is empty afterwards either way.
    pub async fn cleanup(&mut self, client: &ApiClient) -> CleanupReport {
        let mut report = CleanupReport::default();
        for id in std::mem::take(&mut self.ids) {
            let path = format!("{}/{}", endpoints::TRANSACTIONS, id);
            match client.delete::<Value>(&path).await {
                Ok(_) => report.deleted.push(id),
                Err(e) => {
                    self.logger
                        .warn(format!("Failed to cleanup transaction {}: {}", id, e), None);
                    report.failed.push((id, e.to_string()));
                }
            }
        }
        self.logger.info(
            format!(
                "Cleanup finished: {} deleted, {} failed",
                report.deleted.len(),
                report.failed.len()
            ),
            None,
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url,
            auth_token: "token".to_string(),
            timeout: Duration::from_secs(5),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_cleanup_attempts_every_id_once() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/transactions/a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": null })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/transactions/b"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "success": false })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/transactions/c"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(server.uri());
        let mut tracker = TransactionTracker::default();
        tracker.track("a");
        tracker.track("b");
        tracker.track("a");
        tracker.track("c");
        tracker.track("d");
        tracker.untrack("d");
        assert_eq!(tracker.ids().len(), 3);

        let report = tracker.cleanup(&client).await;
        assert_eq!(report.deleted, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(!report.is_clean());
        assert!(tracker.ids().is_empty());

        let second = tracker.cleanup(&client).await;
        assert!(second.is_clean());
        assert!(second.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_survives_unreachable_server() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = client(uri);
        let mut tracker = TransactionTracker::default();
        tracker.track("orphan");

        let report = tracker.cleanup(&client).await;
        assert_eq!(report.failed.len(), 1);
        assert!(report.deleted.is_empty());
    }
}
