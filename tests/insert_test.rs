//! Insert Tests
//!
//! Datasets are inserted into temporary SQLite databases created with sqlx.
//! Each test opens its own database file so the tests stay independent.

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::Workbook;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xlsxdb::{
    insert_dataset, CellData, ColumnSchema, ColumnType, ConnectionDescriptor, Dataset, Driver,
    LoaderBuilder, TypedRow, XlsxToDbError,
};

const USERS_DDL: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    joined TIMESTAMP,
    active BOOLEAN
)";

async fn create_database(dir: &TempDir, ddl: &str) -> PathBuf {
    let path = dir.path().join("target.db");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::raw_sql(ddl).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
    path
}

async fn query_ids(path: &Path) -> Vec<i64> {
    let options = SqliteConnectOptions::new().filename(path);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM users ORDER BY id")
        .fetch_all(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
    ids
}

fn sqlite_descriptor(path: &Path, table: &str) -> ConnectionDescriptor {
    ConnectionDescriptor::new(
        Driver::Sqlite,
        "",
        "",
        "",
        "",
        path.to_string_lossy(),
        table,
    )
}

fn users_schema() -> ColumnSchema {
    vec![
        ("id", ColumnType::BigInt),
        ("name", ColumnType::String),
        ("joined", ColumnType::Date),
        ("active", ColumnType::Bool),
    ]
    .into_iter()
    .collect()
}

fn joined() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn user(id: i64, name: &str) -> TypedRow {
    vec![
        ("id", CellData::BigInt(id)),
        ("name", CellData::String(name.to_string())),
        ("joined", CellData::DateTime(joined())),
        ("active", CellData::Bool(id % 2 == 1)),
    ]
    .into_iter()
    .collect()
}

fn users_dataset(path: &Path, ids: &[i64]) -> Dataset {
    let rows = ids.iter().map(|&id| user(id, &format!("user{}", id))).collect();
    Dataset::new("users", sqlite_descriptor(path, "users"), users_schema(), rows)
}

#[tokio::test]
async fn test_insert_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, USERS_DDL).await;

    let inserted = users_dataset(&path, &[1, 2, 3]).insert().await.unwrap();

    assert_eq!(inserted, 3);
    assert_eq!(query_ids(&path).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_inserted_values_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, USERS_DDL).await;

    insert_dataset(users_dataset(&path, &[7])).await.unwrap();

    let options = SqliteConnectOptions::new().filename(&path);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    let (name, when, active): (String, NaiveDateTime, bool) =
        sqlx::query_as("SELECT name, joined, active FROM users WHERE id = 7")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    conn.close().await.unwrap();

    assert_eq!(name, "user7");
    assert_eq!(when, joined());
    assert!(active);
}

#[tokio::test]
async fn test_failed_row_keeps_earlier_rows_committed() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, USERS_DDL).await;

    // 3行目が主キー違反、4行目は実行されない
    let result = users_dataset(&path, &[1, 2, 2, 3]).insert().await;

    match result {
        Err(XlsxToDbError::Insert { table, row, .. }) => {
            assert_eq!(table, "users");
            assert_eq!(row, 2);
        }
        other => panic!("Expected Insert error, got {:?}", other),
    }
    assert_eq!(query_ids(&path).await, vec![1, 2]);
}

#[tokio::test]
async fn test_empty_dataset_inserts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, USERS_DDL).await;

    let inserted = users_dataset(&path, &[]).insert().await.unwrap();

    assert_eq!(inserted, 0);
    assert!(query_ids(&path).await.is_empty());
}

#[tokio::test]
async fn test_row_missing_a_schema_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, USERS_DDL).await;

    let partial: TypedRow = vec![("id", CellData::BigInt(1)), ("name", CellData::String("a".into()))]
        .into_iter()
        .collect();
    let dataset = Dataset::new(
        "users",
        sqlite_descriptor(&path, "users"),
        users_schema(),
        vec![partial],
    );

    match dataset.insert().await {
        Err(XlsxToDbError::MissingParameter { row, column, .. }) => {
            assert_eq!(row, 0);
            assert_eq!(column, "joined");
        }
        other => panic!("Expected MissingParameter, got {:?}", other),
    }
    assert!(query_ids(&path).await.is_empty());
}

#[tokio::test]
async fn test_missing_table_is_an_insert_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, USERS_DDL).await;

    let dataset = Dataset::new(
        "ghosts",
        sqlite_descriptor(&path, "ghosts"),
        users_schema(),
        vec![user(1, "boo")],
    );

    match dataset.insert().await {
        Err(XlsxToDbError::Insert { table, row, .. }) => {
            assert_eq!(table, "ghosts");
            assert_eq!(row, 0);
        }
        other => panic!("Expected Insert error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_column_name_is_rejected_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let schema: ColumnSchema = vec![("id", ColumnType::BigInt), ("cost$usd", ColumnType::Float)]
        .into_iter()
        .collect();
    let row: TypedRow = vec![("id", CellData::BigInt(1)), ("cost$usd", CellData::Float(2.5))]
        .into_iter()
        .collect();
    // 接続先ファイルは存在しないが、接続より前に列名で失敗する
    let dataset = Dataset::new(
        "prices",
        sqlite_descriptor(&dir.path().join("nowhere.db"), "prices"),
        schema,
        vec![row],
    );

    match dataset.insert().await {
        Err(XlsxToDbError::InvalidColumnName { table, column }) => {
            assert_eq!(table, "prices");
            assert_eq!(column, "cost$usd");
        }
        other => panic!("Expected InvalidColumnName, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_database_file_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = users_dataset(&dir.path().join("nowhere.db"), &[1]);

    match dataset.insert().await {
        Err(XlsxToDbError::Connection { driver, .. }) => assert_eq!(driver, Driver::Sqlite),
        other => panic!("Expected Connection error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_oracle_dataset_is_unsupported() {
    let descriptor = ConnectionDescriptor::new(Driver::Oracle, "s", "t", "h", "1521", "orcl", "x");
    let dataset = Dataset::new("ora", descriptor, users_schema(), vec![user(1, "a")]);

    assert!(matches!(
        dataset.insert().await,
        Err(XlsxToDbError::UnsupportedDriver(Driver::Oracle))
    ));
}

#[tokio::test]
async fn test_workbook_to_sqlite_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_database(&dir, "CREATE TABLE users (id INTEGER, name TEXT)").await;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 1, "SQLite").unwrap();
    worksheet.write_string(5, 1, path.to_string_lossy()).unwrap();
    worksheet.write_string(6, 1, "users").unwrap();
    worksheet.write_string(8, 0, "id").unwrap();
    worksheet.write_string(8, 1, "int").unwrap();
    worksheet.write_string(9, 0, "name").unwrap();
    worksheet.write_string(9, 1, "text").unwrap();
    worksheet.write_string(0, 2, "id").unwrap();
    worksheet.write_string(0, 3, "name").unwrap();
    worksheet.write_number(1, 2, 1.0).unwrap();
    worksheet.write_string(1, 3, "Alice").unwrap();
    let data = workbook.save_to_buffer().unwrap();

    let datasets = LoaderBuilder::new()
        .build()
        .unwrap()
        .load(Cursor::new(data))
        .unwrap();
    assert_eq!(datasets.len(), 1);

    for dataset in datasets {
        assert_eq!(dataset.insert().await.unwrap(), 1);
    }
    assert_eq!(query_ids(&path).await, vec![1]);
}
