use std::path::PathBuf;
use std::sync::Arc;

use crowdguru::database::Database;
use crowdguru::error::AppResult;

use super::config::TestConfig;

/// TestDatabase provides isolated database management for tests
pub struct TestDatabase {
    pub database: Arc<Database>,
    pub config: TestConfig,
}

#[allow(dead_code)]
impl TestDatabase {
    /// Create a new isolated test database
    pub fn new() -> AppResult<Self> {
        let config = TestConfig::new();
        let database = Arc::new(Database::new(config.db_path())?);

        Ok(Self { database, config })
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        self.config.db_path()
    }

    /// Get the test configuration
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Get a reference to the underlying database
    pub fn db(&self) -> &Arc<Database> {
        &self.database
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Cleanup is handled by the TestConfig's TempDir
        tracing::debug!("TestDatabase cleanup: {}", self.config.test_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures::TestDataGenerator;

    #[test]
    fn test_isolated_database_creation() {
        let test_db = TestDatabase::new().unwrap();

        // Database file should exist
        assert!(test_db.path().exists());
        assert!(test_db.path().is_file());

        // Database should be accessible and empty
        let answered = test_db.db().latest_answered(20).unwrap();
        assert_eq!(answered.len(), 0);
    }

    #[test]
    fn test_database_isolation() {
        let test_db1 = TestDatabase::new().unwrap();
        let test_db2 = TestDatabase::new().unwrap();

        // Database paths should be different
        assert_ne!(test_db1.path(), test_db2.path());

        // Both should exist
        assert!(test_db1.path().exists());
        assert!(test_db2.path().exists());

        // Test IDs should be different
        assert_ne!(test_db1.config.test_id, test_db2.config.test_id);
    }

    #[test]
    fn test_database_operations() {
        let test_db = TestDatabase::new().unwrap();

        let question = TestDataGenerator::question("alice@example.com", "What is the airspeed?");
        let id = test_db.db().create_question(&question).unwrap();

        let stored = test_db.db().get_question(id).unwrap();
        assert_eq!(stored.question, "What is the airspeed?");
        assert_eq!(stored.asker, "alice@example.com");
        assert!(stored.answer.is_none());
        assert!(stored.assignees.is_empty());
    }
}
