use async_trait::async_trait;

use crate::{domain::PollCursor, Result};

/// Hexagonal port for the homework-review API.
///
/// Implementations return the decoded JSON body as-is; shape checks happen in
/// [`crate::response::validate`]. Every transport, status or decoding failure
/// must be reported as [`crate::Error::ApiUnavailable`].
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    async fn homework_statuses(&self, from_date: PollCursor) -> Result<serde_json::Value>;
}
