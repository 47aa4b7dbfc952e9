/// Core error type for the homework bot.
///
/// Adapter crates map their library errors into this type so the polling loop
/// can pick a handling policy per error kind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("missing environment variables: {}", .0.join(", "))]
    CredentialsMissing(Vec<&'static str>),

    #[error("practicum api unavailable: {0}")]
    ApiUnavailable(String),

    #[error("malformed api response: {0}")]
    MalformedResponse(String),

    #[error("unknown homework status: {0}")]
    UnknownHomeworkStatus(String),

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),
}

impl Error {
    /// Only missing credentials stop the loop; everything else is retried next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::CredentialsMissing(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_missing_lists_variable_names() {
        let e = Error::CredentialsMissing(vec!["PRACTICUM_TOKEN", "TELEGRAM_CHAT_ID"]);
        assert_eq!(
            e.to_string(),
            "missing environment variables: PRACTICUM_TOKEN, TELEGRAM_CHAT_ID"
        );
        assert!(e.is_fatal());
        assert!(!Error::ApiUnavailable("x".to_string()).is_fatal());
    }
}
