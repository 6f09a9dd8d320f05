//! Insert Executor Module
//!
//! データセットごとに1つのコネクションを開き、型付き行を1行ずつ挿入するモジュール。
//! コネクションは成功・失敗にかかわらず必ず閉じます。

mod connection;
mod statement;

use tracing::{debug, info, warn};

use crate::error::XlsxToDbError;
use crate::types::Dataset;

pub(crate) use connection::DbConnection;
pub(crate) use statement::{CompiledStatement, InsertStatement};

/// データセットの全行を挿入先テーブルへ挿入する
///
/// データセットは消費され、再利用できません。
///
/// # 引数
///
/// * `dataset` - 挿入するデータセット
///
/// # 戻り値
///
/// * `Ok(usize)` - 挿入した行数
/// * `Err(XlsxToDbError::InvalidColumnName)` - 列名をパラメータ名として使用できない場合（接続前に検出）
/// * `Err(XlsxToDbError::Connection)` / `Err(XlsxToDbError::UnsupportedDriver)` - 接続に失敗した場合
/// * `Err(XlsxToDbError::Insert)` / `Err(XlsxToDbError::MissingParameter)` - 行の挿入に失敗した場合
///
/// # 部分的な失敗
///
/// 各行は個別のステートメントとして実行されます。途中の行で失敗した場合、
/// 残りの行は挿入されず、それ以前に挿入された行はコミット済みのまま残ります。
pub async fn insert_dataset(dataset: Dataset) -> Result<usize, XlsxToDbError> {
    let descriptor = dataset.connection();
    let statement = InsertStatement::new(descriptor.table(), dataset.schema())?;

    let mut conn = DbConnection::open(descriptor).await?;
    let compiled = statement.compile(conn.placeholder_style());
    info!(
        sheet = dataset.sheet(),
        target = %descriptor.redacted_target(),
        statement = %statement.named_sql(),
        rows = dataset.rows().len(),
        "inserting dataset"
    );

    let result = insert_rows(&mut conn, &compiled, &dataset).await;

    if let Err(e) = conn.close().await {
        warn!(sheet = dataset.sheet(), error = %e, "failed to close connection");
    }

    if let Ok(inserted) = result {
        info!(sheet = dataset.sheet(), table = statement.table(), inserted, "dataset inserted");
    }
    result
}

impl Dataset {
    /// データセットを挿入先テーブルへ挿入する（[`insert_dataset`]と同じ）
    pub async fn insert(self) -> Result<usize, XlsxToDbError> {
        insert_dataset(self).await
    }
}

async fn insert_rows(
    conn: &mut DbConnection,
    compiled: &CompiledStatement,
    dataset: &Dataset,
) -> Result<usize, XlsxToDbError> {
    let table = dataset.connection().table();

    for (index, row) in dataset.rows().iter().enumerate() {
        let values = compiled.bind_values(table, row, index)?;
        conn.execute(&compiled.sql, &values)
            .await
            .map_err(|source| XlsxToDbError::Insert {
                table: table.to_string(),
                row: index,
                source,
            })?;
        debug!(table, row = index, "inserted row");
    }

    Ok(dataset.rows().len())
}
