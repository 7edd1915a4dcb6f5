use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A question asked by one user and farmed out to others for an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    /// Bare JID of the user who asked.
    pub asker: String,
    pub asked: i64,
    /// Set while the asker's presence is unavailable.
    pub suspended: bool,
    /// Bare JIDs currently asked to answer this question.
    pub assignees: Vec<String>,
    pub last_assigned: Option<i64>,
    pub answer: Option<String>,
    pub answerer: Option<String>,
    pub answered: Option<i64>,
}

impl Question {
    pub fn new(question: String, asker: String) -> Self {
        Self {
            id: 0,
            question,
            asker,
            asked: Utc::now().timestamp(),
            suspended: false,
            assignees: Vec::new(),
            last_assigned: None,
            answer: None,
            answerer: None,
            answered: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.answer.is_none()
    }
}

/// Chat message webhook payload posted by the XMPP gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "from")]
    pub sender: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub body: String,
}

/// Presence webhook payload posted by the XMPP gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdate {
    #[serde(rename = "from")]
    pub sender: String,
}

/// Public view of an answered question, stripped of user addresses.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: String,
    pub asked: i64,
    pub answered: i64,
}

impl From<Question> for AnsweredQuestion {
    fn from(question: Question) -> Self {
        Self {
            question: question.question,
            answer: question.answer.unwrap_or_default(),
            asked: question.asked,
            answered: question.answered.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatestResponse {
    pub questions: Vec<AnsweredQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub version: String,
    pub uptime: u64,
}
