//! In-process parameter store

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use emrc_protocol::PutParameterRequest;

use super::failure::FailureInjector;
use crate::client::{ClientError, Operation, ParameterStore};
use crate::timeout::Deadline;

#[derive(Debug, Default)]
struct StoreState {
    values: BTreeMap<String, String>,
    attempted: Vec<String>,
    writes: Vec<PutParameterRequest>,
    failing_entries: HashSet<String>,
}

/// Parameter store double
#[derive(Debug, Default)]
pub struct MockParameterStore {
    state: Mutex<StoreState>,
    failures: Mutex<FailureInjector>,
}

impl MockParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the failure injector
    pub fn failures(&self) -> std::sync::MutexGuard<'_, FailureInjector> {
        self.failures.lock().unwrap()
    }

    /// Reject every write to `entry`
    pub fn fail_on_entry(&self, entry: impl Into<String>) {
        self.state.lock().unwrap().failing_entries.insert(entry.into());
    }

    /// Current value of `entry`
    pub fn value(&self, entry: &str) -> Option<String> {
        self.state.lock().unwrap().values.get(entry).cloned()
    }

    /// Entry names of every write attempted, failed ones included
    pub fn attempted(&self) -> Vec<String> {
        self.state.lock().unwrap().attempted.clone()
    }

    /// Successful writes, in order
    pub fn writes(&self) -> Vec<PutParameterRequest> {
        self.state.lock().unwrap().writes.clone()
    }
}

impl ParameterStore for MockParameterStore {
    fn put_parameter(
        &self,
        request: &PutParameterRequest,
        deadline: &Deadline,
    ) -> Result<(), ClientError> {
        let op = Operation::PutParameter;
        deadline.check(op.as_str())?;
        self.state.lock().unwrap().attempted.push(request.name.clone());
        self.failures.lock().unwrap().apply(op)?;
        deadline.check(op.as_str())?;

        let mut state = self.state.lock().unwrap();

        if state.failing_entries.contains(&request.name) {
            return Err(ClientError::service(
                op,
                format!("AccessDeniedException: not authorized to write {}", request.name),
            ));
        }
        if !request.overwrite && state.values.contains_key(&request.name) {
            return Err(ClientError::service(op, "ParameterAlreadyExists"));
        }

        state.values.insert(request.name.clone(), request.value.clone());
        state.writes.push(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_overwrite_replaces_value() {
        let store = MockParameterStore::new();
        let deadline = Deadline::after(Duration::from_secs(5));
        store
            .put_parameter(&PutParameterRequest::overwrite_string("/a", "one"), &deadline)
            .unwrap();
        store
            .put_parameter(&PutParameterRequest::overwrite_string("/a", "two"), &deadline)
            .unwrap();
        assert_eq!(store.value("/a").as_deref(), Some("two"));
        assert_eq!(store.writes().len(), 2);
    }

    #[test]
    fn test_without_overwrite_existing_entry_is_rejected() {
        let store = MockParameterStore::new();
        let deadline = Deadline::after(Duration::from_secs(5));
        store
            .put_parameter(&PutParameterRequest::overwrite_string("/a", "one"), &deadline)
            .unwrap();

        let mut request = PutParameterRequest::overwrite_string("/a", "two");
        request.overwrite = false;
        assert!(store.put_parameter(&request, &deadline).is_err());
        assert_eq!(store.value("/a").as_deref(), Some("one"));
    }

    #[test]
    fn test_injected_failure_is_recorded_as_attempt() {
        let store = MockParameterStore::new();
        store.failures().inject_error(Operation::PutParameter, "ThrottlingException");
        let deadline = Deadline::after(Duration::from_secs(5));

        let err = store
            .put_parameter(&PutParameterRequest::overwrite_string("/a", "x"), &deadline)
            .unwrap_err();
        assert!(err.to_string().contains("ThrottlingException"));
        assert_eq!(store.attempted(), vec!["/a"]);
        assert!(store.writes().is_empty());
        assert_eq!(store.value("/a"), None);
    }
}
