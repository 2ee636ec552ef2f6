use crate::errors::EvalError;
use crate::model::{FinalResult, ResultKey};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    keys: HashSet<ResultKey>,
    results: Vec<FinalResult>,
}

/// Collects results for one run and enforces one result per (input, config).
///
/// Safe to share across tasks; the uniqueness check and the insert happen
/// under the same lock.
#[derive(Default)]
pub struct ResultAggregator {
    inner: Mutex<Inner>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, result: FinalResult) -> Result<(), EvalError> {
        let mut inner = self.lock();
        let key = result.key();
        if !inner.keys.insert(key.clone()) {
            return Err(EvalError::DuplicateResult {
                input_id: key.input_id,
                config_id: key.config_id,
            });
        }
        inner.results.push(result);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Results recorded so far, ordered by run number.
    pub fn snapshot(&self) -> Vec<FinalResult> {
        let mut out = self.lock().results.clone();
        out.sort_by_key(|r| r.run_no);
        out
    }
}
