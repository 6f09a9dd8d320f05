//! Insert Statement Module
//!
//! 列スキーマから名前付きパラメータ形式のINSERT文を生成し、
//! ドライバーごとの位置パラメータ形式へ変換するモジュール。

use crate::error::XlsxToDbError;
use crate::types::{CellData, ColumnSchema, TypedRow};

/// ドライバーごとの位置パラメータ記法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaceholderStyle {
    /// `$1, $2, ...`（PostgreSQL）
    Dollar,
    /// `?, ?, ...`（SQLite, MySQL）
    Question,
}

/// 1つのデータセット用のINSERT文
///
/// 列は列スキーマの宣言順に並びます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InsertStatement {
    table: String,
    columns: Vec<String>,
}

impl InsertStatement {
    /// 挿入先テーブルと列スキーマからINSERT文を生成
    ///
    /// # 戻り値
    ///
    /// * `Ok(InsertStatement)` - 生成に成功した場合
    /// * `Err(XlsxToDbError::InvalidColumnName)` - 列名がパラメータ名の文字だけで構成されていない場合
    pub fn new(table: &str, schema: &ColumnSchema) -> Result<Self, XlsxToDbError> {
        let columns: Vec<String> = schema.names().map(str::to_string).collect();

        if let Some(column) = columns.iter().find(|c| !is_parameter_name(c)) {
            return Err(XlsxToDbError::InvalidColumnName {
                table: table.to_string(),
                column: column.clone(),
            });
        }

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// 名前付きパラメータ形式のSQL
    ///
    /// 例: `INSERT INTO users (id,name) VALUES (:id,:name)`
    pub fn named_sql(&self) -> String {
        let placeholders: Vec<String> = self.columns.iter().map(|c| format!(":{}", c)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(","),
            placeholders.join(",")
        )
    }

    /// ドライバーの位置パラメータ形式へ変換
    pub fn compile(&self, style: PlaceholderStyle) -> CompiledStatement {
        compile_named(&self.named_sql(), style)
    }
}

/// 位置パラメータ形式へ変換済みのSQLとパラメータ名の並び
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledStatement {
    pub sql: String,
    pub params: Vec<String>,
}

impl CompiledStatement {
    /// 行の値をパラメータの順に並べる
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<&CellData>)` - パラメータ順の値
    /// * `Err(XlsxToDbError::MissingParameter)` - 行にパラメータ名の値がない場合
    pub fn bind_values<'r>(
        &self,
        table: &str,
        row: &'r TypedRow,
        row_index: usize,
    ) -> Result<Vec<&'r CellData>, XlsxToDbError> {
        self.params
            .iter()
            .map(|name| {
                row.get(name)
                    .ok_or_else(|| XlsxToDbError::MissingParameter {
                        table: table.to_string(),
                        row: row_index,
                        column: name.clone(),
                    })
            })
            .collect()
    }
}

/// 名前付きパラメータ（`:name`）を位置パラメータへ置き換える
///
/// シングルクォートで囲まれた文字列リテラル内と`::`キャストは置き換えません。
/// 同じ名前が複数回現れた場合は出現ごとに別のパラメータになります。
pub(crate) fn compile_named(sql: &str, style: PlaceholderStyle) -> CompiledStatement {
    let mut out = String::with_capacity(sql.len());
    let mut params = Vec::new();
    let mut chars = sql.chars().peekable();
    let mut in_literal = false;

    while let Some(c) = chars.next() {
        if in_literal {
            out.push(c);
            if c == '\'' {
                in_literal = false;
            }
            continue;
        }

        match c {
            '\'' => {
                in_literal = true;
                out.push(c);
            }
            ':' if chars.peek() == Some(&':') => {
                out.push_str("::");
                chars.next();
            }
            ':' if chars.peek().is_some_and(|&n| is_name_char(n)) => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                params.push(name);
                match style {
                    PlaceholderStyle::Dollar => out.push_str(&format!("${}", params.len())),
                    PlaceholderStyle::Question => out.push('?'),
                }
            }
            _ => out.push(c),
        }
    }

    CompiledStatement { sql: out, params }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `:name`として1つのパラメータに読み取られる名前かどうか
fn is_parameter_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}
