//! Object-shaped CRUD helpers that translate into parameterized SQL for a
//! hosted SQLite-compatible database.
//!
//! Calls take a table name plus ordered column maps and return the
//! executor's `{ success, results, meta }` result unchanged. Values are
//! always bound as parameters. Table and column names are written into the
//! SQL verbatim and must be trusted; see [`driver::DriverConfig::strict_identifiers`]
//! for an opt-in check.
//!
//! # Examples
//!
//! Translation only:
//! ```
//! use d1crud::{query::build_insert, types::{Entity, SqlValue}};
//!
//! let entity = Entity::new().with("title", "x").with("createdAt", "CURRENT_TIMESTAMP");
//! let stmt = build_insert("blog", &entity).expect("insert");
//! assert_eq!(stmt.sql, "INSERT INTO blog (title, createdAt) VALUES (?, CURRENT_TIMESTAMP)");
//! assert_eq!(stmt.params, vec![SqlValue::from("x")]);
//! ```
//!
//! Against a local SQLite database:
//! ```no_run
//! use d1crud::{
//!     driver::{create, get, remove},
//!     executor::sqlite::{SqliteConfig, SqliteExecutor},
//!     types::{Conditions, Entity},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let db = SqliteExecutor::open("blog.db", SqliteConfig::default()).expect("open sqlite");
//! db.execute_batch("CREATE TABLE IF NOT EXISTS blog (id INTEGER PRIMARY KEY, title TEXT, deletedAt TEXT)")
//!     .await
//!     .expect("schema");
//!
//! create(&db, "blog", &Entity::new().with("title", "hello")).await.expect("create");
//! let live = Conditions::new().with("deletedAt", None::<String>);
//! let rows = get(&db, "blog", Some(&live), Some("id, title")).await.expect("get");
//! assert!(rows.success);
//!
//! remove(&db, "blog", Some(&Conditions::new().with("id", 1)), true).await.expect("soft remove");
//! # }
//! ```
#![deny(missing_docs)]

/// High-level `get`/`create`/`update`/`remove` calls and driver config.
pub mod driver;
/// Error type and result alias.
pub mod error;
/// Executor trait and SQLite implementation.
pub mod executor;
/// Pure statement translation.
pub mod query;
/// Result and metadata shapes.
pub mod result;
/// Scalar values and ordered column maps.
pub mod types;

pub use driver::{D1Driver, DriverConfig, create, get, remove, update};
pub use error::{DriverError, DriverResult};
pub use executor::Executor;
pub use query::Statement;
pub use result::{QueryMeta, QueryResult};
pub use types::{Conditions, Entity, FieldValue, SqlKeyword, SqlValue};
