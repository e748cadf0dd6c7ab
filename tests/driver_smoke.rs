use std::sync::{Arc, Mutex};

use d1crud::{
    driver::{create, get, remove, update, D1Driver, DriverConfig},
    error::{DriverError, DriverResult},
    executor::Executor,
    query::Statement,
    result::{QueryMeta, QueryResult, Row},
    types::{Conditions, Entity, SqlValue},
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    All(Statement),
    Run(Statement),
}

/// Records every statement and answers with a canned result.
#[derive(Clone, Default)]
struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_with: Option<String>,
}

impl RecordingExecutor {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    fn answer(&self) -> DriverResult<QueryResult> {
        if let Some(message) = &self.fail_with {
            return Err(DriverError::Sqlite(rusqlite::Error::InvalidParameterName(
                message.clone(),
            )));
        }
        let mut row = Row::new();
        row.insert("id".to_string(), serde_json::json!(1));
        Ok(QueryResult::ok(
            vec![row],
            QueryMeta {
                changes: 1,
                ..QueryMeta::default()
            },
        ))
    }
}

impl Executor for RecordingExecutor {
    async fn all(&self, statement: &Statement) -> DriverResult<QueryResult> {
        self.calls
            .lock()
            .expect("lock")
            .push(Call::All(statement.clone()));
        self.answer()
    }

    async fn run(&self, statement: &Statement) -> DriverResult<QueryResult> {
        self.calls
            .lock()
            .expect("lock")
            .push(Call::Run(statement.clone()));
        self.answer()
    }
}

#[tokio::test]
async fn get_uses_all_and_returns_result_unchanged() {
    let db = RecordingExecutor::default();
    let conds = Conditions::new().with("id", 1);

    let out = get(&db, "blog", Some(&conds), Some("id, title"))
        .await
        .expect("get");
    assert!(out.success);
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.meta.changes, 1);

    assert_eq!(
        db.calls(),
        vec![Call::All(Statement {
            sql: "SELECT id, title FROM blog WHERE id = ?".to_string(),
            params: vec![SqlValue::Integer(1)],
        })]
    );
}

#[tokio::test]
async fn get_defaults_to_all_fields() {
    let db = RecordingExecutor::default();
    get(&db, "blog", None, None).await.expect("get");
    assert_eq!(
        db.calls(),
        vec![Call::All(Statement {
            sql: "SELECT * FROM blog".to_string(),
            params: vec![],
        })]
    );
}

#[tokio::test]
async fn writes_use_run() {
    let db = RecordingExecutor::default();
    let entity = Entity::new().with("title", "t");
    let conds = Conditions::new().with("id", 2);

    create(&db, "blog", &entity).await.expect("create");
    update(&db, "blog", &entity, Some(&conds))
        .await
        .expect("update");
    remove(&db, "blog", Some(&conds), false)
        .await
        .expect("remove");
    remove(&db, "blog", Some(&conds), true)
        .await
        .expect("soft remove");

    let calls = db.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| matches!(c, Call::Run(_))));
    let sqls: Vec<String> = calls
        .into_iter()
        .map(|c| match c {
            Call::All(s) | Call::Run(s) => s.sql,
        })
        .collect();
    assert_eq!(
        sqls,
        vec![
            "INSERT INTO blog (title) VALUES (?)",
            "UPDATE blog SET title = ? WHERE id = ?",
            "DELETE FROM blog WHERE id = ?",
            "UPDATE blog SET deletedAt = CURRENT_TIMESTAMP WHERE id = ?",
        ]
    );
}

#[tokio::test]
async fn empty_entity_is_a_failure_result_not_an_error() {
    let db = RecordingExecutor::default();

    let out = create(&db, "blog", &Entity::new()).await.expect("create");
    assert!(!out.success);
    assert!(out.results.is_empty());
    assert!(out.error.is_some());

    let out = update(&db, "blog", &Entity::new(), None)
        .await
        .expect("update");
    assert!(!out.success);

    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn executor_errors_propagate() {
    let db = RecordingExecutor::failing("boom");
    let err = get(&db, "blog", None, None).await.expect_err("error");
    assert!(matches!(err, DriverError::Sqlite(_)));
    assert!(!err.is_caller_error());
}

#[tokio::test]
async fn driver_uses_configured_soft_delete_column() {
    let db = RecordingExecutor::default();
    let driver = D1Driver::with_config(
        db.clone(),
        DriverConfig {
            soft_delete_column: "removed_at".to_string(),
            ..DriverConfig::default()
        },
    );

    driver
        .remove("blog", Some(&Conditions::new().with("id", 3)), true)
        .await
        .expect("soft remove");
    assert_eq!(
        db.calls(),
        vec![Call::Run(Statement {
            sql: "UPDATE blog SET removed_at = CURRENT_TIMESTAMP WHERE id = ?".to_string(),
            params: vec![SqlValue::Integer(3)],
        })]
    );
}

#[tokio::test]
async fn identifiers_are_trusted_by_default() {
    let db = RecordingExecutor::default();
    let out = get(&db, "blog b", None, Some("count(*)"))
        .await
        .expect("get");
    assert!(out.success);
    assert_eq!(db.calls().len(), 1);
}

#[tokio::test]
async fn strict_identifiers_reject_before_execution() {
    let db = RecordingExecutor::default();
    let driver = D1Driver::with_config(
        db.clone(),
        DriverConfig {
            strict_identifiers: true,
            ..DriverConfig::default()
        },
    );

    let out = driver
        .get("blog; DROP TABLE blog", None, None)
        .await
        .expect("get");
    assert!(!out.success);

    let out = driver
        .get("blog", None, Some("id, title --"))
        .await
        .expect("get");
    assert!(!out.success);

    let out = driver
        .update(
            "blog",
            &Entity::new().with("title = title", 1),
            Some(&Conditions::new().with("id", 1)),
        )
        .await
        .expect("update");
    assert!(!out.success);
    assert!(db.calls().is_empty());

    let out = driver
        .get("blog", Some(&Conditions::new().with("_id", 1)), Some("id, title"))
        .await
        .expect("get");
    assert!(out.success);
    let out = driver.get("blog", None, Some("*")).await.expect("get");
    assert!(out.success);
    assert_eq!(db.calls().len(), 2);
}

#[test]
fn validate_identifier_accepts_plain_names_only() {
    use d1crud::driver::validate_identifier;

    assert!(validate_identifier("blog_posts2").is_ok());
    assert!(validate_identifier("_private").is_ok());
    assert!(validate_identifier("").is_err());
    assert!(validate_identifier("2fast").is_err());
    assert!(validate_identifier("a.b").is_err());
    assert!(validate_identifier("x y").is_err());
}
