//! Database Connection Module
//!
//! 接続記述子からドライバーごとのsqlxコネクションを開くモジュール。
//! コネクションはデータセットごとに1つだけ開き、プールは使用しません。

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, MySql, Postgres, Sqlite};
use tracing::debug;

use crate::database::statement::PlaceholderStyle;
use crate::error::XlsxToDbError;
use crate::types::{CellData, ConnectionDescriptor, Driver};

/// セル値をクエリへバインドする
///
/// ShortIntはPostgreSQLで`"char"`として扱われないよう`i16`に拡張します。
macro_rules! bind_cell {
    ($query:expr, $value:expr) => {
        match $value {
            CellData::String(v) => $query.bind(v.as_str()),
            CellData::ShortInt(v) => $query.bind(i16::from(*v)),
            CellData::Int(v) => $query.bind(*v),
            CellData::BigInt(v) => $query.bind(*v),
            CellData::Float(v) => $query.bind(*v),
            CellData::Double(v) => $query.bind(*v),
            CellData::Bool(v) => $query.bind(*v),
            CellData::DateTime(v) => $query.bind(*v),
        }
    };
}

/// ドライバーごとの単一コネクション
#[derive(Debug)]
pub(crate) enum DbConnection {
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
    MySql(MySqlConnection),
}

impl DbConnection {
    /// 接続記述子に従ってコネクションを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(DbConnection)` - 接続に成功した場合
    /// * `Err(XlsxToDbError::Connection)` - 接続に失敗した場合
    /// * `Err(XlsxToDbError::UnsupportedDriver)` - Oracleなど接続処理のないドライバーの場合
    pub async fn open(descriptor: &ConnectionDescriptor) -> Result<Self, XlsxToDbError> {
        let driver = descriptor.driver();
        let connection_error = |source: sqlx::Error| XlsxToDbError::Connection {
            driver,
            target: descriptor.redacted_target(),
            source,
        };

        debug!(%driver, target = %descriptor.redacted_target(), "opening connection");

        match driver {
            Driver::Postgres => {
                let mut options = PgConnectOptions::new()
                    .username(descriptor.user())
                    .password(descriptor.password())
                    .database(descriptor.database())
                    .ssl_mode(PgSslMode::Disable);
                if !descriptor.host().is_empty() {
                    options = options.host(descriptor.host());
                }
                if let Some(port) = parse_port(descriptor.port()).map_err(connection_error)? {
                    options = options.port(port);
                }

                let conn = PgConnection::connect_with(&options)
                    .await
                    .map_err(connection_error)?;
                Ok(DbConnection::Postgres(conn))
            }
            Driver::MySql => {
                let mut options = MySqlConnectOptions::new()
                    .username(descriptor.user())
                    .password(descriptor.password())
                    .database(descriptor.database())
                    .ssl_mode(MySqlSslMode::Disabled);
                if !descriptor.host().is_empty() {
                    options = options.host(descriptor.host());
                }
                if let Some(port) = parse_port(descriptor.port()).map_err(connection_error)? {
                    options = options.port(port);
                }

                let conn = MySqlConnection::connect_with(&options)
                    .await
                    .map_err(connection_error)?;
                Ok(DbConnection::MySql(conn))
            }
            Driver::Sqlite => {
                let options = SqliteConnectOptions::new()
                    .filename(descriptor.database())
                    .create_if_missing(false);

                let conn = SqliteConnection::connect_with(&options)
                    .await
                    .map_err(connection_error)?;
                Ok(DbConnection::Sqlite(conn))
            }
            Driver::Oracle => Err(XlsxToDbError::UnsupportedDriver(driver)),
        }
    }

    /// ドライバーの位置パラメータ記法
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            DbConnection::Postgres(_) => PlaceholderStyle::Dollar,
            DbConnection::Sqlite(_) | DbConnection::MySql(_) => PlaceholderStyle::Question,
        }
    }

    /// 位置パラメータ形式のSQLを値をバインドして実行
    ///
    /// # 戻り値
    ///
    /// * `Ok(u64)` - 影響を受けた行数
    pub async fn execute(&mut self, sql: &str, values: &[&CellData]) -> Result<u64, sqlx::Error> {
        let affected = match self {
            DbConnection::Postgres(conn) => {
                let mut query = sqlx::query::<Postgres>(sql);
                for value in values {
                    query = bind_cell!(query, *value);
                }
                query.execute(&mut *conn).await?.rows_affected()
            }
            DbConnection::Sqlite(conn) => {
                let mut query = sqlx::query::<Sqlite>(sql);
                for value in values {
                    query = bind_cell!(query, *value);
                }
                query.execute(&mut *conn).await?.rows_affected()
            }
            DbConnection::MySql(conn) => {
                let mut query = sqlx::query::<MySql>(sql);
                for value in values {
                    query = bind_cell!(query, *value);
                }
                query.execute(&mut *conn).await?.rows_affected()
            }
        };
        Ok(affected)
    }

    /// コネクションを閉じる
    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            DbConnection::Postgres(conn) => conn.close().await,
            DbConnection::Sqlite(conn) => conn.close().await,
            DbConnection::MySql(conn) => conn.close().await,
        }
    }
}

/// ポート番号を解析（空文字列はドライバーのデフォルト）
fn parse_port(port: &str) -> Result<Option<u16>, sqlx::Error> {
    if port.is_empty() {
        return Ok(None);
    }
    port.parse::<u16>()
        .map(Some)
        .map_err(|e| sqlx::Error::Configuration(format!("invalid port '{}': {}", port, e).into()))
}
