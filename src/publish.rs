//! Identifier publishing
//!
//! Writes a created template identifier into a parameter store entry. Writes
//! always overwrite; there is no create-if-absent mode.

use std::sync::Arc;

use emrc_protocol::PutParameterRequest;
use thiserror::Error;
use tracing::info;

use crate::client::{ClientError, ParameterStore};
use crate::timeout::Deadline;

/// A failed entry write
#[derive(Debug, Error)]
#[error("failed to update SSM parameter '{entry}': ssm update failed: {source}")]
pub struct PublishError {
    pub entry: String,
    #[source]
    pub source: ClientError,
}

/// Publishes identifiers to a [`ParameterStore`]
pub struct IdentifierPublisher {
    store: Arc<dyn ParameterStore>,
}

impl IdentifierPublisher {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    /// Overwrite `entry` with `identifier`
    pub fn publish(
        &self,
        identifier: &str,
        entry: &str,
        deadline: &Deadline,
    ) -> Result<(), PublishError> {
        let request = PutParameterRequest::overwrite_string(entry, identifier);
        self.store
            .put_parameter(&request, deadline)
            .map_err(|source| PublishError {
                entry: entry.to_string(),
                source,
            })?;
        info!(entry, id = identifier, "parameter updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockParameterStore;
    use std::time::Duration;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(30))
    }

    #[test]
    fn test_publish_overwrites_string_entry() {
        let store = Arc::new(MockParameterStore::new());
        let publisher = IdentifierPublisher::new(store.clone());

        publisher.publish("jt0001", "/emr/template-id", &deadline()).unwrap();

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "/emr/template-id");
        assert_eq!(writes[0].value, "jt0001");
        assert!(writes[0].overwrite);
        assert_eq!(store.value("/emr/template-id").as_deref(), Some("jt0001"));
    }

    #[test]
    fn test_failed_write_names_entry() {
        let store = Arc::new(MockParameterStore::new());
        store.fail_on_entry("/b");
        let publisher = IdentifierPublisher::new(store.clone());

        let err = publisher.publish("jt0001", "/b", &deadline()).unwrap_err();

        assert_eq!(err.entry, "/b");
        let message = err.to_string();
        assert!(message.starts_with("failed to update SSM parameter '/b': ssm update failed: "));
        assert!(message.contains("AccessDeniedException"));
        assert_eq!(store.value("/b"), None);
        assert_eq!(store.attempted(), vec!["/b"]);
    }

    #[test]
    fn test_expired_deadline_surfaces_as_write_error() {
        let store = Arc::new(MockParameterStore::new());
        let publisher = IdentifierPublisher::new(store.clone());
        let err = publisher
            .publish("jt0001", "/a", &Deadline::after(Duration::ZERO))
            .unwrap_err();
        assert!(err.source.is_deadline());
        assert!(store.writes().is_empty());
    }
}
