//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

use crate::types::Driver;

/// xlsxdbクレート全体で使用するエラー型
///
/// ワークブックの読み込み、シート定義の解析、セル値の型変換、
/// データベースへの挿入処理中に発生するすべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - ファイルオープン系: `Io`, `Parse`, `Zip`, `Utf8`, `SecurityViolation`, `Config`
/// - スキーマ系: `UnknownDriver`, `UnknownColumnType`
/// - データ参照系: `UnknownDataColumn`
/// - 型変換系: `Conversion`
/// - 接続系: `Connection`, `UnsupportedDriver`
/// - 挿入系: `Insert`, `InvalidColumnName`, `MissingParameter`
///
/// いずれのエラーも回復処理は行わず、呼び出し元へそのまま伝播します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxdb::XlsxToDbError;
/// use std::fs::File;
///
/// fn open_workbook(path: &str) -> Result<(), XlsxToDbError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToDbError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `LoaderBuilder::build()`時の検証失敗や、シート選択の失敗などで発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 未知のドライバーラベル
    ///
    /// 接続情報ブロックのドライバーセルが既知のラベルと一致しない場合に発生します。
    #[error("Unknown driver '{label}' at sheet '{sheet}', cell {cell}")]
    UnknownDriver {
        /// シート名
        sheet: String,
        /// ドライバーセルの座標（A1記法）
        cell: String,
        /// セルに記載されていたラベル
        label: String,
    },

    /// 未知の列型ラベル
    #[error("Unknown column type '{label}' at sheet '{sheet}', cell {cell}")]
    UnknownColumnType {
        /// シート名
        sheet: String,
        /// 型ラベルセルの座標（A1記法）
        cell: String,
        /// セルに記載されていたラベル
        label: String,
    },

    /// データヘッダーがスキーマに存在しない列を参照している
    #[error("Data column '{column}' at sheet '{sheet}', cell {cell} is not declared in the column schema")]
    UnknownDataColumn {
        /// シート名
        sheet: String,
        /// ヘッダーセルの座標（A1記法）
        cell: String,
        /// 参照された列名
        column: String,
    },

    /// セル値を宣言された型に変換できない
    ///
    /// `row`と`col`は0始まりのシート座標です。
    #[error("Cannot convert cell {cell} (row = {row}, col = {col}) at sheet '{sheet}' to {expected}: found {found}")]
    Conversion {
        /// シート名
        sheet: String,
        /// セルの座標（A1記法）
        cell: String,
        /// 行インデックス（0始まり）
        row: u32,
        /// 列インデックス（0始まり）
        col: u32,
        /// 宣言された型
        expected: String,
        /// 実際のセル内容
        found: String,
    },

    /// データベースへの接続に失敗した
    ///
    /// `target`はパスワードを伏せた接続先文字列です。
    #[error("Failed to connect to {driver} at '{target}': {source}")]
    Connection {
        /// ドライバー
        driver: Driver,
        /// 接続先（パスワードは伏字）
        target: String,
        /// sqlx由来のエラー
        #[source]
        source: sqlx::Error,
    },

    /// 接続処理が実装されていないドライバー
    #[error("Driver {0} is recognised but connections to it are not supported")]
    UnsupportedDriver(Driver),

    /// INSERT文の実行に失敗した
    ///
    /// `row`はデータセット内の行番号（0始まり）です。
    #[error("Failed to insert row {row} into '{table}': {source}")]
    Insert {
        /// 挿入先テーブル
        table: String,
        /// 行番号（0始まり）
        row: usize,
        /// sqlx由来のエラー
        #[source]
        source: sqlx::Error,
    },

    /// 列名が名前付きパラメータとして使用できない
    ///
    /// 列名は英数字とアンダースコアのみで構成されている必要があります。
    #[error("Column '{column}' of '{table}' cannot be used as a named parameter")]
    InvalidColumnName {
        /// 挿入先テーブル
        table: String,
        /// 列名
        column: String,
    },

    /// 名前付きパラメータに対応する値が行に存在しない
    #[error("Row {row} has no value for parameter ':{column}' of the insert into '{table}'")]
    MissingParameter {
        /// 挿入先テーブル
        table: String,
        /// 行番号（0始まり）
        row: usize,
        /// 値が見つからなかった列名
        column: String,
    },
}
