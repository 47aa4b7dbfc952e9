//! Status code → verdict translation.

use std::collections::BTreeMap;

use crate::{domain::HomeworkRecord, errors::Error, Result};

/// Fixed mapping of review status codes to the verdict shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusVocabulary {
    verdicts: BTreeMap<String, String>,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::from_pairs([
            (
                "approved",
                "The work has been reviewed: the reviewer liked everything. Hooray!",
            ),
            (
                "reviewing",
                "The work has been taken for review by the reviewer.",
            ),
            (
                "rejected",
                "The work has been reviewed: the reviewer has comments.",
            ),
        ])
    }
}

impl StatusVocabulary {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            verdicts: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn verdict(&self, status: &str) -> Option<&str> {
        self.verdicts.get(status).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.verdicts.keys().map(String::as_str)
    }

    /// Build the notification text for one homework record.
    pub fn render(&self, record: &HomeworkRecord) -> Result<String> {
        let Some(name) = record.homework_name.as_deref() else {
            return Err(unknown(
                "record has a missing or non-string homework_name".to_string(),
            ));
        };
        let Some(status) = record.status.as_deref() else {
            return Err(unknown(format!(
                "record \"{name}\" has a missing or non-string status"
            )));
        };
        let Some(verdict) = self.verdict(status) else {
            return Err(unknown(format!("\"{status}\" for submission \"{name}\"")));
        };

        Ok(format!("Status changed for submission \"{name}\". {verdict}"))
    }
}

fn unknown(detail: String) -> Error {
    tracing::error!("unexpected homework status: {detail}");
    Error::UnknownHomeworkStatus(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_approved() {
        let v = StatusVocabulary::default();
        let msg = v.render(&HomeworkRecord::new("hw1", "approved")).unwrap();
        assert_eq!(
            msg,
            "Status changed for submission \"hw1\". The work has been reviewed: the reviewer liked everything. Hooray!"
        );
    }

    #[test]
    fn vocabulary_has_three_codes() {
        let v = StatusVocabulary::default();
        assert_eq!(
            v.codes().collect::<Vec<_>>(),
            vec!["approved", "rejected", "reviewing"]
        );
    }

    #[test]
    fn render_rejects_unknown_status() {
        let v = StatusVocabulary::default();
        let err = v
            .render(&HomeworkRecord::new("hw1", "in_review"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownHomeworkStatus(_)));
        assert!(err.to_string().contains("in_review"));
    }

    #[test]
    fn render_rejects_missing_fields() {
        let v = StatusVocabulary::default();
        let no_name = HomeworkRecord {
            homework_name: None,
            status: Some("approved".to_string()),
        };
        let no_status = HomeworkRecord {
            homework_name: Some("hw1".to_string()),
            status: None,
        };
        assert!(matches!(
            v.render(&no_name),
            Err(Error::UnknownHomeworkStatus(_))
        ));
        assert!(matches!(
            v.render(&no_status),
            Err(Error::UnknownHomeworkStatus(_))
        ));
    }

    #[test]
    fn non_string_fields_are_reported_as_such() {
        let v = StatusVocabulary::default();
        let record = HomeworkRecord::from_json(&serde_json::json!({
            "homework_name": "hw1",
            "status": 3
        }));
        let err = v.render(&record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown homework status: record \"hw1\" has a missing or non-string status"
        );
    }
}
