use crate::error::{AppError, AppResult};
use crate::models::Question;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// How long an assignment holds a question before it may be offered to
/// someone else, in seconds.
pub const MAX_ANSWER_TIME: i64 = 120;

pub type DbConnection = Arc<Mutex<Connection>>;

pub struct Database {
    connection: DbConnection,
}

impl Database {
    pub fn new(db_path: &PathBuf) -> AppResult<Self> {
        // Ensure the database directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        let database = Database {
            connection: Arc::new(Mutex::new(conn)),
        };

        database.run_migrations()?;

        Ok(database)
    }

    pub fn connection(&self) -> DbConnection {
        Arc::clone(&self.connection)
    }

    fn run_migrations(&self) -> AppResult<()> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        // Create questions table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                asker TEXT NOT NULL,
                asked INTEGER NOT NULL,
                suspended INTEGER NOT NULL DEFAULT 0,
                assignees TEXT NOT NULL DEFAULT '[]',
                last_assigned INTEGER,
                answer TEXT,
                answerer TEXT,
                answered INTEGER
            )",
            [],
        )?;

        // Index for looking up a user's outstanding question
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_questions_asker ON questions(asker)",
            [],
        )?;

        // Index for the answered listing
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_questions_answered ON questions(answered)",
            [],
        )?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    pub fn create_question(&self, question: &Question) -> AppResult<i64> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        conn.execute(
            "INSERT INTO questions (question, asker, asked, suspended, assignees, last_assigned, answer, answerer, answered)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                question.question,
                question.asker,
                question.asked,
                question.suspended,
                serde_json::to_string(&question.assignees).unwrap_or_default(),
                question.last_assigned,
                question.answer,
                question.answerer,
                question.answered,
            ],
        )?;

        let id = conn.last_insert_rowid();

        tracing::info!("Stored question {} from {}", id, question.asker);
        Ok(id)
    }

    pub fn get_question(&self, id: i64) -> AppResult<Question> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT id, question, asker, asked, suspended, assignees, last_assigned, answer, answerer, answered
             FROM questions WHERE id = ?",
        )?;

        let question = stmt
            .query_row([id], |row| {
                let assignees_json: String = row.get(5)?;
                Ok(Question {
                    id: row.get(0)?,
                    question: row.get(1)?,
                    asker: row.get(2)?,
                    asked: row.get(3)?,
                    suspended: row.get(4)?,
                    assignees: serde_json::from_str(&assignees_json).unwrap_or_default(),
                    last_assigned: row.get(6)?,
                    answer: row.get(7)?,
                    answerer: row.get(8)?,
                    answered: row.get(9)?,
                })
            })
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => AppError::QuestionNotFound(id),
                _ => AppError::Database(e),
            })?;

        Ok(question)
    }

    /// The sender's own outstanding question, if any.
    pub fn get_asked(&self, user: &str) -> AppResult<Option<Question>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT id, question, asker, asked, suspended, assignees, last_assigned, answer, answerer, answered
             FROM questions WHERE asker = ? AND answer IS NULL LIMIT 1",
        )?;

        let question = stmt
            .query_row([user], |row| {
                let assignees_json: String = row.get(5)?;
                Ok(Question {
                    id: row.get(0)?,
                    question: row.get(1)?,
                    asker: row.get(2)?,
                    asked: row.get(3)?,
                    suspended: row.get(4)?,
                    assignees: serde_json::from_str(&assignees_json).unwrap_or_default(),
                    last_assigned: row.get(6)?,
                    answer: row.get(7)?,
                    answerer: row.get(8)?,
                    answered: row.get(9)?,
                })
            })
            .optional()?;

        Ok(question)
    }

    /// The pending question the user is currently assigned to answer, if any.
    pub fn get_answering(&self, user: &str) -> AppResult<Option<Question>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT id, question, asker, asked, suspended, assignees, last_assigned, answer, answerer, answered
             FROM questions
             WHERE answer IS NULL
               AND EXISTS (SELECT 1 FROM json_each(questions.assignees) WHERE json_each.value = ?)
             LIMIT 1",
        )?;

        let question = stmt
            .query_row([user], |row| {
                let assignees_json: String = row.get(5)?;
                Ok(Question {
                    id: row.get(0)?,
                    question: row.get(1)?,
                    asker: row.get(2)?,
                    asked: row.get(3)?,
                    suspended: row.get(4)?,
                    assignees: serde_json::from_str(&assignees_json).unwrap_or_default(),
                    last_assigned: row.get(6)?,
                    answer: row.get(7)?,
                    answerer: row.get(8)?,
                    answered: row.get(9)?,
                })
            })
            .optional()?;

        Ok(question)
    }

    /// Pick an unanswered question the user did not ask and hand it to them.
    ///
    /// Questions whose last assignment is older than [`MAX_ANSWER_TIME`] are
    /// up for grabs again; never-assigned questions come first, oldest first.
    pub fn assign_question(&self, user: &str) -> AppResult<Option<Question>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let expiry = Utc::now().timestamp() - MAX_ANSWER_TIME;

        let mut stmt = conn.prepare(
            "SELECT id, question, asker, asked, suspended, assignees, last_assigned, answer, answerer, answered
             FROM questions
             WHERE answerer IS NULL
               AND asker != ?
               AND (last_assigned IS NULL OR last_assigned < ?)
             ORDER BY last_assigned ASC, asked ASC
             LIMIT 1",
        )?;

        let candidate = stmt
            .query_row(params![user, expiry], |row| {
                let assignees_json: String = row.get(5)?;
                Ok(Question {
                    id: row.get(0)?,
                    question: row.get(1)?,
                    asker: row.get(2)?,
                    asked: row.get(3)?,
                    suspended: row.get(4)?,
                    assignees: serde_json::from_str(&assignees_json).unwrap_or_default(),
                    last_assigned: row.get(6)?,
                    answer: row.get(7)?,
                    answerer: row.get(8)?,
                    answered: row.get(9)?,
                })
            })
            .optional()?;

        let mut question = match candidate {
            Some(question) => question,
            None => return Ok(None),
        };

        question.assignees.push(user.to_string());
        question.last_assigned = Some(Utc::now().timestamp());

        conn.execute(
            "UPDATE questions SET assignees = ?, last_assigned = ? WHERE id = ?",
            params![
                serde_json::to_string(&question.assignees).unwrap_or_default(),
                question.last_assigned,
                question.id,
            ],
        )?;

        tracing::info!("Assigned question {} to {}", question.id, user);
        Ok(Some(question))
    }

    /// Drop the user from a question's assignees. No-op if they are not
    /// assigned to it.
    pub fn unassign(&self, question_id: i64, user: &str) -> AppResult<()> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT assignees FROM questions WHERE id = ?",
        )?;

        let assignees_json: String = stmt
            .query_row([question_id], |row| row.get(0))
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => AppError::QuestionNotFound(question_id),
                _ => AppError::Database(e),
            })?;

        let mut assignees: Vec<String> = serde_json::from_str(&assignees_json).unwrap_or_default();

        if let Some(pos) = assignees.iter().position(|a| a == user) {
            assignees.remove(pos);

            conn.execute(
                "UPDATE questions SET assignees = ? WHERE id = ?",
                params![serde_json::to_string(&assignees).unwrap_or_default(), question_id],
            )?;

            tracing::debug!("Unassigned {} from question {}", user, question_id);
        }

        Ok(())
    }

    /// Record the first answer for a question. Returns false if it was
    /// already answered, in which case nothing changes.
    pub fn record_answer(&self, question_id: i64, answer: &str, answerer: &str) -> AppResult<bool> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let rows_affected = conn.execute(
            "UPDATE questions SET answer = ?, answerer = ?, answered = ?, assignees = '[]'
             WHERE id = ? AND answer IS NULL",
            params![answer, answerer, Utc::now().timestamp(), question_id],
        )?;

        if rows_affected > 0 {
            tracing::info!("Question {} answered by {}", question_id, answerer);
        }

        Ok(rows_affected > 0)
    }

    /// Flip the suspended flag on one of the asker's pending questions.
    /// Returns false if no question was in the opposite state.
    pub fn set_suspended(&self, asker: &str, suspended: bool) -> AppResult<bool> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let rows_affected = conn.execute(
            "UPDATE questions SET suspended = ?
             WHERE id = (SELECT id FROM questions
                         WHERE asker = ? AND answer IS NULL AND suspended = ?
                         LIMIT 1)",
            params![suspended, asker, !suspended],
        )?;

        Ok(rows_affected > 0)
    }

    /// The most recently answered questions, newest first.
    pub fn latest_answered(&self, limit: u32) -> AppResult<Vec<Question>> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT id, question, asker, asked, suspended, assignees, last_assigned, answer, answerer, answered
             FROM questions WHERE answered IS NOT NULL
             ORDER BY answered DESC LIMIT ?",
        )?;

        let question_iter = stmt.query_map([limit], |row| {
            let assignees_json: String = row.get(5)?;
            Ok(Question {
                id: row.get(0)?,
                question: row.get(1)?,
                asker: row.get(2)?,
                asked: row.get(3)?,
                suspended: row.get(4)?,
                assignees: serde_json::from_str(&assignees_json).unwrap_or_default(),
                last_assigned: row.get(6)?,
                answer: row.get(7)?,
                answerer: row.get(8)?,
                answered: row.get(9)?,
            })
        })?;

        let mut questions = Vec::new();
        for question in question_iter {
            questions.push(question?);
        }

        Ok(questions)
    }
}
