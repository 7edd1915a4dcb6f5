//! Common test utilities and infrastructure for isolated testing
//!
//! This module provides the foundation for running isolated webhook and API
//! tests with complete separation between test environments.

pub mod database;
pub mod xmpp;

pub use app::TestApp;
pub use config::TestConfig;
pub use database::TestDatabase;
pub use fixtures::TestDataGenerator;
pub use xmpp::{CapturingSender, FailingSender, SentMessage};

use actix_web::test;

use crowdguru::models::{ChatMessage, PresenceUpdate};

/// Build a gateway chat webhook request
#[allow(dead_code)]
pub fn chat_request(from: &str, body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/xmpp/message/chat")
        .set_form(ChatMessage {
            sender: from.to_string(),
            to: "guru@crowdguru.example".to_string(),
            body: body.to_string(),
        })
}

/// Build a gateway presence webhook request
#[allow(dead_code)]
pub fn presence_request(from: &str, status: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/xmpp/presence/{status}"))
        .set_form(PresenceUpdate {
            sender: from.to_string(),
        })
}

#[cfg(test)]
mod isolation_tests {
    // No glob: it would pull in `actix_web::test` from the parent scope
    // and make the bare `#[test]` attributes below ambiguous.
    use super::{TestApp, TestDataGenerator};
    use std::thread;

    #[test]
    fn test_complete_isolation() {
        // Create two completely isolated test environments
        let test_app1 = TestApp::new();
        let test_app2 = TestApp::new();

        // Verify different test IDs
        assert_ne!(
            test_app1.test_config().test_id,
            test_app2.test_config().test_id
        );

        // Verify different database paths
        assert_ne!(test_app1.database.path(), test_app2.database.path());

        // Both should start with empty stores
        assert!(test_app1.db().get_asked("alice@example.com").unwrap().is_none());
        assert!(test_app2.db().get_asked("alice@example.com").unwrap().is_none());
    }

    #[test]
    fn test_parallel_isolation() {
        let handles: Vec<_> = (0..3)
            .map(|i| {
                thread::spawn(move || {
                    let test_app = TestApp::new();

                    // Ask a unique question in each thread
                    let asker = format!("parallel-{}@example.com", i);
                    let question =
                        TestDataGenerator::question(&asker, &format!("question {}", i));
                    test_app.db().create_question(&question).unwrap();

                    // Verify the question exists in this thread's database
                    let stored = test_app.db().get_asked(&asker).unwrap().unwrap();
                    assert_eq!(stored.question, format!("question {}", i));

                    test_app.test_config().test_id.clone()
                })
            })
            .collect();

        // Collect results from all threads
        let test_ids: std::collections::HashSet<_> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        // All IDs should be unique
        assert_eq!(test_ids.len(), 3);
    }
}
