use std::sync::Arc;

use serde_json::Value;

use crate::{domain::PollCursor, errors::Error, ports::HomeworkApi, Result};

/// Current UNIX time in seconds.
pub fn now_ts() -> PollCursor {
    chrono::Utc::now().timestamp()
}

/// `from_date` to send: the cursor, or "now" when the cursor was never set.
pub fn from_date(cursor: PollCursor, now: PollCursor) -> PollCursor {
    if cursor > 0 {
        cursor
    } else {
        now
    }
}

/// Issues one `homework_statuses` request per cycle.
#[derive(Clone)]
pub struct ApiPoller {
    api: Arc<dyn HomeworkApi>,
}

impl ApiPoller {
    pub fn new(api: Arc<dyn HomeworkApi>) -> Self {
        Self { api }
    }

    /// Fetch the raw payload for everything changed since `cursor`.
    pub async fn fetch(&self, cursor: PollCursor) -> Result<Value> {
        let from = from_date(cursor, now_ts());
        match self.api.homework_statuses(from).await {
            Ok(payload) => {
                tracing::info!(from_date = from, "received api response: {payload}");
                Ok(payload)
            }
            Err(e) => {
                tracing::error!(from_date = from, "request to the endpoint failed: {e}");
                // Adapters should already classify; anything else still counts as an outage.
                match e {
                    Error::ApiUnavailable(_) => Err(e),
                    other => Err(Error::ApiUnavailable(other.to_string())),
                }
            }
        }
    }
}
