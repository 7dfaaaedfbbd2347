use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use sales_common::{DateRange, Secret};
use serde_json::Value;

use crate::traits::{FetchError, SalesFeed};

/// A [`SalesFeed`] that plays back queued responses and records every request it receives.
///
/// When the queue runs dry the feed answers with the fallback response, which is an empty list unless changed with
/// [`ScriptedFeed::set_fallback`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    inner: Arc<Mutex<FeedState>>,
}

#[derive(Debug, Default)]
struct FeedState {
    queue: VecDeque<Result<Value, FetchError>>,
    fallback: Option<Result<Value, FetchError>>,
    calls: Vec<(i64, DateRange)>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Result<Value, FetchError>) {
        self.state().queue.push_back(response);
    }

    pub fn set_fallback(&self, response: Result<Value, FetchError>) {
        self.state().fallback = Some(response);
    }

    /// `(user_id, range)` of every fetch so far, oldest first.
    pub fn calls(&self) -> Vec<(i64, DateRange)> {
        self.state().calls.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FeedState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SalesFeed for ScriptedFeed {
    async fn fetch_sales(
        &self,
        user_id: i64,
        range: &DateRange,
        credential: &Secret<String>,
    ) -> Result<Value, FetchError> {
        let mut state = self.state();
        state.calls.push((user_id, *range));
        if credential.is_blank() {
            return Err(FetchError::InvalidCredential("blank session token".into()));
        }
        state
            .queue
            .pop_front()
            .or_else(|| state.fallback.clone())
            .unwrap_or_else(|| Ok(Value::Array(Vec::new())))
    }
}
