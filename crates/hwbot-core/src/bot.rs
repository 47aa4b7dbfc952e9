//! The polling loop: fetch → validate → render → notify → sleep.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    config::{Config, Credentials},
    domain::PollCursor,
    errors::Error,
    messaging::port::MessagingPort,
    notifier::Notifier,
    poller::{now_ts, ApiPoller},
    ports::HomeworkApi,
    response,
    status::StatusVocabulary,
    Result,
};

/// What a single cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    NoChanges,
    Notified(usize),
    Failed,
}

/// Owns all loop state: the fetch cursor and the outage streak counter.
pub struct HomeworkBot {
    credentials: Credentials,
    statuses: StatusVocabulary,
    retry_time: Duration,
    poller: ApiPoller,
    notifier: Notifier,

    cursor: PollCursor,
    api_error_streak: u32,
}

impl HomeworkBot {
    pub fn new(
        cfg: &Config,
        api: Arc<dyn HomeworkApi>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            credentials: cfg.credentials.clone(),
            statuses: cfg.statuses.clone(),
            retry_time: cfg.retry_time,
            poller: ApiPoller::new(api),
            notifier: Notifier::new(messenger, cfg.credentials.chat_id()),
            cursor: now_ts(),
            api_error_streak: 0,
        }
    }

    pub fn with_cursor(mut self, cursor: PollCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> PollCursor {
        self.cursor
    }

    pub fn api_error_streak(&self) -> u32 {
        self.api_error_streak
    }

    /// Run forever. Returns only when credentials are missing.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            retry_secs = self.retry_time.as_secs(),
            cursor = self.cursor,
            "homework bot started"
        );
        loop {
            self.tick().await?;
            sleep(self.retry_time).await;
        }
    }

    /// One cycle without the trailing sleep.
    ///
    /// Every non-fatal failure is handled here (logged, maybe notified) and
    /// reported as [`CycleOutcome::Failed`].
    pub async fn tick(&mut self) -> Result<CycleOutcome> {
        let missing = self.credentials.missing();
        if !missing.is_empty() {
            let err = Error::CredentialsMissing(missing);
            tracing::error!("CRITICAL: {err}, shutting down");
            return Err(err);
        }
        tracing::debug!("all environment variables are available");

        match self.poll_once().await {
            Ok(outcome) => {
                // Behavior change: a successful fetch ends the outage streak, so
                // a later, separate outage is reported again.
                self.api_error_streak = 0;
                Ok(outcome)
            }
            Err(e) => {
                self.report_failure(e).await;
                Ok(CycleOutcome::Failed)
            }
        }
    }

    async fn poll_once(&mut self) -> Result<CycleOutcome> {
        let payload = self.poller.fetch(self.cursor).await?;
        let validated = response::validate(&payload)?;

        let outcome = if validated.homeworks.is_empty() {
            tracing::debug!("no changes in homework statuses");
            CycleOutcome::NoChanges
        } else {
            for record in &validated.homeworks {
                let message = self.statuses.render(record)?;
                self.notifier.send(&message).await;
            }
            CycleOutcome::Notified(validated.homeworks.len())
        };

        self.cursor = validated.current_date;
        Ok(outcome)
    }

    async fn report_failure(&mut self, err: Error) {
        let message = format!("Program failure: {err}");
        tracing::error!("{message}");

        match err {
            // Handled before polling / inside the notifier; never relayed.
            Error::CredentialsMissing(_) | Error::NotificationDelivery(_) => {}
            Error::ApiUnavailable(_) => {
                if self.api_error_streak == 0 {
                    self.notifier.send(&message).await;
                } else {
                    tracing::debug!(
                        streak = self.api_error_streak,
                        "api still unavailable, notification suppressed"
                    );
                }
                self.api_error_streak = self.api_error_streak.saturating_add(1);
            }
            _ => self.notifier.send(&message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatId;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedApi {
        replies: Mutex<VecDeque<Result<Value>>>,
        seen: Mutex<Vec<PollCursor>>,
    }

    impl ScriptedApi {
        fn new(replies: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::default(),
            })
        }

        fn from_dates(&self) -> Vec<PollCursor> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HomeworkApi for ScriptedApi {
        async fn homework_statuses(&self, from_date: PollCursor) -> Result<Value> {
            self.seen.lock().unwrap().push(from_date);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::ApiUnavailable("script exhausted".to_string())))
        }
    }

    #[derive(Default)]
    struct FakeMessenger {
        sends: Mutex<Vec<(ChatId, String)>>,
        fail: bool,
    }

    impl FakeMessenger {
        fn sent(&self) -> Vec<String> {
            self.sends
                .lock()
                .unwrap()
                .iter()
                .map(|(_, t)| t.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()> {
            self.sends
                .lock()
                .unwrap()
                .push((chat_id.clone(), text.to_string()));
            if self.fail {
                return Err(Error::NotificationDelivery("bot was blocked".to_string()));
            }
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            credentials: Credentials {
                practicum_token: "p".to_string(),
                telegram_token: "t".to_string(),
                telegram_chat_id: "42".to_string(),
            },
            endpoint: "http://localhost/".to_string(),
            http_timeout: Duration::from_secs(1),
            retry_time: Duration::from_millis(0),
            statuses: StatusVocabulary::default(),
        }
    }

    fn outage() -> Result<Value> {
        Err(Error::ApiUnavailable("endpoint returned 503".to_string()))
    }

    fn bot(api: Arc<ScriptedApi>, messenger: Arc<FakeMessenger>) -> HomeworkBot {
        HomeworkBot::new(&test_config(), api, messenger).with_cursor(1_000)
    }

    #[tokio::test]
    async fn missing_credentials_are_fatal() {
        let mut cfg = test_config();
        cfg.credentials.telegram_token = String::new();
        let api = ScriptedApi::new(vec![]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = HomeworkBot::new(&cfg, api.clone(), messenger.clone());

        let err = b.run().await.unwrap_err();
        assert!(matches!(err, Error::CredentialsMissing(ref v) if v == &vec!["TELEGRAM_TOKEN"]));
        assert!(api.from_dates().is_empty());
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_response_advances_cursor_without_sending() {
        let api = ScriptedApi::new(vec![Ok(json!({ "homeworks": [], "current_date": 100 }))]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api, messenger.clone());

        assert_eq!(b.tick().await.unwrap(), CycleOutcome::NoChanges);
        assert_eq!(b.cursor(), 100);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn records_are_notified_in_server_order() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "homeworks": [
                { "homework_name": "hw2", "status": "rejected" },
                { "homework_name": "hw1", "status": "approved" }
            ],
            "current_date": 200
        }))]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api, messenger.clone());

        assert_eq!(b.tick().await.unwrap(), CycleOutcome::Notified(2));
        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with("Status changed for submission \"hw2\"."));
        assert!(sent[1].starts_with("Status changed for submission \"hw1\"."));
        assert_eq!(messenger.sends.lock().unwrap()[0].0, ChatId("42".to_string()));
    }

    #[tokio::test]
    async fn cursor_tracks_previous_current_date() {
        let api = ScriptedApi::new(vec![
            Ok(json!({ "homeworks": [], "current_date": 1_500 })),
            Ok(json!({ "homeworks": [], "current_date": 2_000 })),
            Ok(json!({ "homeworks": [], "current_date": 2_600 })),
        ]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api.clone(), messenger);

        for _ in 0..3 {
            b.tick().await.unwrap();
        }
        assert_eq!(api.from_dates(), vec![1_000, 1_500, 2_000]);
        assert_eq!(b.cursor(), 2_600);
    }

    #[tokio::test]
    async fn repeated_outage_is_notified_once() {
        let api = ScriptedApi::new(vec![outage(), outage(), outage()]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api, messenger.clone());

        for _ in 0..3 {
            assert_eq!(b.tick().await.unwrap(), CycleOutcome::Failed);
        }
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Program failure: practicum api unavailable"));
        assert_eq!(b.api_error_streak(), 3);
        assert_eq!(b.cursor(), 1_000);
    }

    #[tokio::test]
    async fn success_resets_outage_streak() {
        let api = ScriptedApi::new(vec![
            outage(),
            outage(),
            Ok(json!({ "homeworks": [], "current_date": 1_100 })),
            outage(),
        ]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api, messenger.clone());

        for _ in 0..4 {
            b.tick().await.unwrap();
        }
        assert_eq!(messenger.sent().len(), 2);
        assert_eq!(b.api_error_streak(), 1);
    }

    #[tokio::test]
    async fn malformed_response_is_always_notified() {
        let api = ScriptedApi::new(vec![Ok(json!({})), Ok(json!({ "homeworks": "x" }))]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api, messenger.clone());

        b.tick().await.unwrap();
        b.tick().await.unwrap();
        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.contains("malformed api response")));
        assert_eq!(b.cursor(), 1_000);
    }

    #[tokio::test]
    async fn unknown_status_is_notified_and_cursor_kept() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "homeworks": [{ "homework_name": "hw1", "status": "in_review" }],
            "current_date": 300
        }))]);
        let messenger = Arc::new(FakeMessenger::default());
        let mut b = bot(api, messenger.clone());

        assert_eq!(b.tick().await.unwrap(), CycleOutcome::Failed);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("unknown homework status"));
        assert_eq!(b.cursor(), 1_000);
    }

    #[tokio::test]
    async fn delivery_failure_does_not_block_cursor() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "homeworks": [{ "homework_name": "hw1", "status": "reviewing" }],
            "current_date": 400
        }))]);
        let messenger = Arc::new(FakeMessenger {
            fail: true,
            ..Default::default()
        });
        let mut b = bot(api, messenger.clone());

        assert_eq!(b.tick().await.unwrap(), CycleOutcome::Notified(1));
        assert_eq!(b.cursor(), 400);
        // Only the status message was attempted; no failure report follows it.
        assert_eq!(messenger.sent().len(), 1);
    }
}
