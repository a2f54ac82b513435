//! `/duck` behaviour against a scripted query engine
//! Run with: cargo test --test duck_command_test

mod common;

use common::{Harness, ScriptedEngine};

use chatcraft_commands::domain::traits::ChatStore;
use chatcraft_commands::{CommandError, DuckCommand, ExportPolicy, MessageRole, User};

#[tokio::test]
async fn no_tables_yields_header_only() {
    let h = Harness::new(ScriptedEngine::with_tables(&[]));
    let session = h.store.create_session().await.unwrap();

    let updated = h.service.execute(&session, None, "duck", &[]).await.unwrap();

    assert_eq!(updated.len(), session.len() + 1);
    let message = updated.last_message().unwrap();
    assert_eq!(message.role(), MessageRole::Human);
    assert_eq!(message.text(), "## Query Engine Tables");
}

#[tokio::test]
async fn tables_listed_with_row_counts() {
    let engine = ScriptedEngine::with_tables(&["a", "b"]).exported("a", 3);
    let h = Harness::new(engine);
    let session = h.store.create_session().await.unwrap();

    let updated = h.service.execute(&session, None, "duck", &[]).await.unwrap();
    let text = updated.last_message().unwrap().text();

    let a = text.find("### a (3 rows)").expect("section for a");
    let b = text.find("### b (0 rows)").expect("section for b");
    assert!(a < b);
    assert_eq!(
        text,
        "## Query Engine Tables\n\n\
         ### a (3 rows)\n\n| column_name | column_type |\n| --- | --- |\n| a_id | INTEGER |\n\n\
         ### b (0 rows)\n\n| column_name | column_type |\n| --- | --- |\n| b_id | INTEGER |"
    );
}

#[tokio::test]
async fn listing_order_wins_over_completion_order() {
    let engine = ScriptedEngine::with_tables(&["slow", "medium", "fast"])
        .describe_delay("slow", 60)
        .describe_delay("medium", 30);
    let h = Harness::new(engine);
    let session = h.store.create_session().await.unwrap();

    let updated = h.service.execute(&session, None, "duck", &[]).await.unwrap();

    let finished = h.engine.describe_finished.lock().unwrap().clone();
    assert_eq!(finished, vec!["fast", "medium", "slow"]);

    let text = updated.last_message().unwrap().text();
    let slow = text.find("### slow").unwrap();
    let medium = text.find("### medium").unwrap();
    let fast = text.find("### fast").unwrap();
    assert!(slow < medium && medium < fast);
}

#[tokio::test]
async fn query_args_are_joined_and_fenced() {
    let h = Harness::new(ScriptedEngine::with_tables(&["a"]));
    let session = h.store.create_session().await.unwrap();
    let user = User::new("7").with_username("grace");

    let args = Harness::args(&["SELECT", "*", "FROM", "a"]);
    let updated = h
        .service
        .execute(&session, Some(&user), "duck", &args)
        .await
        .unwrap();

    assert!(h.engine.queries().contains(&"SELECT * FROM a".to_string()));

    let message = updated.last_message().unwrap();
    assert_eq!(message.author(), Some(&user));
    assert_eq!(
        message.text(),
        "```sql\n\nSELECT * FROM a\n\n```\n\n| id | label |\n| --- | --- |\n| 1 | first |\n| 2 | second |"
    );
}

#[tokio::test]
async fn export_runs_before_every_invocation() {
    let h = Harness::new(ScriptedEngine::with_tables(&[]));
    let session = h.store.create_session().await.unwrap();

    h.service.execute(&session, None, "duck", &[]).await.unwrap();
    h.service
        .execute(&session, None, "duck", &Harness::args(&["SELECT", "1"]))
        .await
        .unwrap();

    assert_eq!(h.engine.export_count(), 2);
}

#[tokio::test]
async fn per_turn_policy_reuses_export_while_store_is_unchanged() {
    let duck = DuckCommand::new().with_policy(ExportPolicy::PerTurn);
    let h = Harness::with_duck(ScriptedEngine::with_tables(&[]), duck);
    let session = h.store.create_session().await.unwrap();

    // Failed queries write nothing, so the first export is reused.
    let bogus = Harness::args(&["SELECT", "BOGUS"]);
    assert!(h.service.execute(&session, None, "duck", &bogus).await.is_err());
    assert!(h.service.execute(&session, None, "duck", &bogus).await.is_err());
    assert_eq!(h.engine.export_count(), 1);

    // The appended overview is new data for the next call.
    h.service.execute(&session, None, "duck", &[]).await.unwrap();
    assert_eq!(h.engine.export_count(), 1);
    h.service.execute(&session, None, "duck", &[]).await.unwrap();
    assert_eq!(h.engine.export_count(), 2);
}

#[tokio::test]
async fn per_turn_policy_sees_writes_to_other_sessions() {
    let duck = DuckCommand::new().with_policy(ExportPolicy::PerTurn);
    let h = Harness::with_duck(ScriptedEngine::with_tables(&[]), duck);
    let a = h.store.create_session().await.unwrap();
    let b = h.store.create_session().await.unwrap();

    let bogus = Harness::args(&["SELECT", "BOGUS"]);
    assert!(h.service.execute(&a, None, "duck", &bogus).await.is_err());
    assert_eq!(h.engine.export_count(), 1);

    h.service.handle(&b, None, "hello from b").await.unwrap();

    // Session a is unchanged, but the store is not.
    h.service
        .execute(&a, None, "duck", &Harness::args(&["SELECT", "1"]))
        .await
        .unwrap();
    assert_eq!(h.engine.export_count(), 2);
}

#[tokio::test]
async fn per_turn_policy_ignores_stale_session_copies() {
    let duck = DuckCommand::new().with_policy(ExportPolicy::PerTurn);
    let h = Harness::with_duck(ScriptedEngine::with_tables(&[]), duck);
    let stale = h.store.create_session().await.unwrap();

    h.service.execute(&stale, None, "duck", &[]).await.unwrap();
    h.service.execute(&stale, None, "duck", &[]).await.unwrap();

    assert_eq!(h.engine.export_count(), 2);
}

#[tokio::test]
async fn rejected_query_appends_nothing() {
    let h = Harness::new(ScriptedEngine::with_tables(&[]));
    let session = h.store.create_session().await.unwrap();

    let err = h
        .service
        .execute(&session, None, "duck", &Harness::args(&["SELECT", "BOGUS"]))
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Query(_)));
    let stored = h.store.get_session(session.id()).await.unwrap().unwrap();
    assert_eq!(stored.len(), session.len());
}

#[tokio::test]
async fn failed_export_appends_nothing() {
    let h = Harness::new(ScriptedEngine::with_tables(&["a"]).failing_export());
    let session = h.store.create_session().await.unwrap();

    let err = h.service.execute(&session, None, "duck", &[]).await.unwrap_err();

    assert!(matches!(err, CommandError::Export(_)));
    assert!(h.engine.queries().is_empty());
    let stored = h.store.get_session(session.id()).await.unwrap().unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn vanished_table_is_a_lookup_failure() {
    let h = Harness::new(ScriptedEngine::with_tables(&["a", "gone"]).missing("gone"));
    let session = h.store.create_session().await.unwrap();

    let err = h.service.execute(&session, None, "duck", &[]).await.unwrap_err();

    assert!(matches!(err, CommandError::Lookup { ref table, .. } if table == "gone"));
    let stored = h.store.get_session(session.id()).await.unwrap().unwrap();
    assert!(stored.is_empty());
}
