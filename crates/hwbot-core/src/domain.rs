/// Telegram chat identifier as configured: a numeric id or an `@channel` username.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub String);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower bound (UNIX seconds) of the next `from_date` fetch window.
pub type PollCursor = i64;

/// One homework entry as returned by the API.
///
/// Fields stay optional here: the response validator only checks the envelope,
/// a record missing its name or status is rejected when it is rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub homework_name: Option<String>,
    pub status: Option<String>,
}

impl HomeworkRecord {
    pub fn new(homework_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            homework_name: Some(homework_name.into()),
            status: Some(status.into()),
        }
    }

    pub(crate) fn from_json(v: &serde_json::Value) -> Self {
        let field = |k: &str| v.get(k).and_then(|s| s.as_str()).map(str::to_string);
        Self {
            homework_name: field("homework_name"),
            status: field("status"),
        }
    }
}

/// An API payload that passed the envelope check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedResponse {
    pub homeworks: Vec<HomeworkRecord>,
    pub current_date: PollCursor,
}
