//! Parser Module
//!
//! calamineを使用したワークブックの解析。
//! シートごとに接続記述子・列スキーマ・型付き行を抽出します。

mod metadata;
mod rows;
mod schema;
mod workbook;

pub(crate) use metadata::WorkbookMetadata;
pub(crate) use rows::extract_rows;
pub(crate) use schema::{parse_column_schema, parse_descriptor};
pub(crate) use workbook::WorkbookParser;
