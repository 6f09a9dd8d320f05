//! Types Module
//!
//! クレート全体で使用するデータモデルを定義するモジュール。
//! 接続情報、列スキーマ、型付き行、データセットを提供します。

use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// 接続先データベースのドライバー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// PostgreSQL（ラベル: `PostgreSQL`）
    Postgres,
    /// SQLite（ラベル: `SQLite`）
    Sqlite,
    /// Oracle（ラベル: `Oracle`、接続は未対応）
    Oracle,
    /// MySQL（ラベル: `MySQL`）
    MySql,
}

impl Driver {
    /// シートに記載されたドライバーラベルを解決する
    ///
    /// 大文字・小文字を区別して完全一致で比較します。
    ///
    /// # 戻り値
    ///
    /// * `Some(Driver)` - 既知のラベルの場合
    /// * `None` - 未知のラベルの場合
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PostgreSQL" => Some(Driver::Postgres),
            "SQLite" => Some(Driver::Sqlite),
            "Oracle" => Some(Driver::Oracle),
            "MySQL" => Some(Driver::MySql),
            _ => None,
        }
    }

    /// シート上で使用するラベルを返す
    pub fn label(&self) -> &'static str {
        match self {
            Driver::Postgres => "PostgreSQL",
            Driver::Sqlite => "SQLite",
            Driver::Oracle => "Oracle",
            Driver::MySql => "MySQL",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 接続情報ブロックから読み取った接続記述子
///
/// ドライバー以外の値はすべて前後の空白を除去した文字列として保持します。
/// パスワードはシリアライズ対象外で、ログには伏字の接続先のみを出力します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    pub(crate) driver: Driver,
    pub(crate) user: String,
    #[serde(skip_serializing)]
    pub(crate) password: String,
    pub(crate) host: String,
    pub(crate) port: String,
    pub(crate) database: String,
    pub(crate) table: String,
}

impl ConnectionDescriptor {
    /// 新しい接続記述子を生成
    pub fn new(
        driver: Driver,
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            user: user.into(),
            password: password.into(),
            host: host.into(),
            port: port.into(),
            database: database.into(),
            table: table.into(),
        }
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// ドライバーごとの接続先文字列
    ///
    /// - PostgreSQL / MySQL: `key=value`形式のDSN
    /// - SQLite: データベース名フィールドをファイルパスとしてそのまま使用
    /// - Oracle: 空文字列（接続は未対応）
    pub fn target(&self) -> String {
        self.render_target(&self.password)
    }

    /// パスワードを伏字にした接続先文字列（ログ出力用）
    pub fn redacted_target(&self) -> String {
        if self.password.is_empty() {
            self.render_target("")
        } else {
            self.render_target("****")
        }
    }

    fn render_target(&self, password: &str) -> String {
        match self.driver {
            Driver::Postgres | Driver::MySql => format!(
                "user={} password={} dbname={} host={} port={} sslmode=disable",
                self.user, password, self.database, self.host, self.port
            ),
            Driver::Sqlite => self.database.clone(),
            Driver::Oracle => String::new(),
        }
    }
}

/// 列の宣言型
///
/// 外部の型ラベル（例: `text`, `int8`, `timestamptz`）は
/// [`ColumnType::from_label`] により、いずれか1つの型に対応付けられます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 文字列
    String,
    /// 8ビット整数
    ShortInt,
    /// 32ビット整数
    Int,
    /// 64ビット整数
    BigInt,
    /// 64ビット浮動小数点（numeric）
    Numeric,
    /// 32ビット浮動小数点
    Float,
    /// 64ビット浮動小数点
    BigFloat,
    /// 日時
    Date,
    /// 論理値
    Bool,
}

impl ColumnType {
    /// 型ラベルを解決する（大文字・小文字を区別しない）
    ///
    /// # 対応表
    ///
    /// | ラベル | 型 |
    /// | --- | --- |
    /// | `text`, `varchar`, `string` | String |
    /// | `shortint`, `smallint`, `int2` | ShortInt |
    /// | `int`, `integer`, `int4` | Int |
    /// | `bigint`, `int8` | BigInt |
    /// | `numeric` | Numeric |
    /// | `real`, `float4` | Float |
    /// | `double`, `float8` | BigFloat |
    /// | `date`, `timestamp`, `timestamptz` | Date |
    /// | `bool`, `boolean` | Bool |
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        let column_type = match normalized.as_str() {
            "text" | "varchar" | "string" => ColumnType::String,
            "shortint" | "smallint" | "int2" => ColumnType::ShortInt,
            "int" | "integer" | "int4" => ColumnType::Int,
            "bigint" | "int8" => ColumnType::BigInt,
            "numeric" => ColumnType::Numeric,
            "real" | "float4" => ColumnType::Float,
            "double" | "float8" => ColumnType::BigFloat,
            "date" | "timestamp" | "timestamptz" => ColumnType::Date,
            "bool" | "boolean" => ColumnType::Bool,
            _ => return None,
        };
        Some(column_type)
    }

    /// エラーメッセージ等で使用する型名
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::ShortInt => "shortint",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::Numeric => "numeric",
            ColumnType::Float => "float",
            ColumnType::BigFloat => "bigfloat",
            ColumnType::Date => "date",
            ColumnType::Bool => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列名から宣言型へのマッピング
///
/// 宣言順を保持します。同じ列名が再度宣言された場合は型のみを上書きし、
/// 位置は最初の宣言のものを維持します（後勝ち）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: IndexMap<String, ColumnType>,
}

impl ColumnSchema {
    /// 空のスキーマを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 列を宣言する（既存の列名は型を上書き）
    pub(crate) fn declare(&mut self, name: impl Into<String>, column_type: ColumnType) {
        self.columns.insert(name.into(), column_type);
    }

    /// 列の宣言型を取得
    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 宣言順に列名を返す
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// 宣言順に`(列名, 型)`を返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        let mut schema = ColumnSchema::new();
        for (name, column_type) in iter {
            schema.declare(name, column_type);
        }
        schema
    }
}

/// 型変換済みのセル値
///
/// すべての利用箇所で網羅的に扱えるよう、閉じた列挙型として表現します。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellData {
    /// 文字列（前後の空白は除去済み、空文字列も有効な値）
    String(String),
    /// 8ビット整数
    ShortInt(i8),
    /// 32ビット整数
    Int(i32),
    /// 64ビット整数
    BigInt(i64),
    /// 32ビット浮動小数点
    Float(f32),
    /// 64ビット浮動小数点
    Double(f64),
    /// 論理値
    Bool(bool),
    /// 日時
    DateTime(NaiveDateTime),
}

impl CellData {
    /// 値の種類名
    pub fn type_name(&self) -> &'static str {
        match self {
            CellData::String(_) => "string",
            CellData::ShortInt(_) => "int8",
            CellData::Int(_) => "int32",
            CellData::BigInt(_) => "int64",
            CellData::Float(_) => "float32",
            CellData::Double(_) => "float64",
            CellData::Bool(_) => "bool",
            CellData::DateTime(_) => "timestamp",
        }
    }
}

/// 1行分の型付きデータ（列名 -> 値）
///
/// キーの順序はデータヘッダー行の左から右の順です。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypedRow {
    values: IndexMap<String, CellData>,
}

impl TypedRow {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: CellData) {
        self.values.insert(name.into(), value);
    }

    /// 列名で値を取得
    pub fn get(&self, name: &str) -> Option<&CellData> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 列名を順に返す
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellData)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<S: Into<String>> FromIterator<(S, CellData)> for TypedRow {
    fn from_iter<I: IntoIterator<Item = (S, CellData)>>(iter: I) -> Self {
        let mut row = TypedRow::default();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// 1シート分の作業単位
///
/// 接続記述子、列スキーマ、型付き行の列を所有します。
/// ローダーが構築した後は変更されず、挿入処理で1度だけ消費されます。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    sheet: String,
    connection: ConnectionDescriptor,
    schema: ColumnSchema,
    rows: Vec<TypedRow>,
}

impl Dataset {
    /// 新しいデータセットを生成
    pub fn new(
        sheet: impl Into<String>,
        connection: ConnectionDescriptor,
        schema: ColumnSchema,
        rows: Vec<TypedRow>,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            connection,
            schema,
            rows,
        }
    }

    /// 元になったシート名
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[TypedRow] {
        &self.rows
    }
}
