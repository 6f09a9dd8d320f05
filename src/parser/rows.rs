//! Row Extractor Module
//!
//! データブロックのヘッダー行と各データ行を読み取り、
//! 列スキーマに従って型付き行の列を生成するモジュール。

use calamine::{Data, Range};
use tracing::debug;

use crate::api::SheetLayout;
use crate::coercion::coerce_cell;
use crate::error::XlsxToDbError;
use crate::parser::schema::{cell_at, trimmed_text};
use crate::types::{CellCoord, ColumnSchema, ColumnType, TypedRow};

/// データブロックの列定義（ヘッダー行の左から右の順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataColumn {
    pub name: String,
    pub column_type: ColumnType,
}

/// データヘッダー行を解析
///
/// `layout.data_start_col`から右方向へ走査し、空白セルで終了します。
/// 各ヘッダー名は列スキーマで宣言済みでなければなりません。
///
/// # 戻り値
///
/// * `Ok(Vec<DataColumn>)` - ヘッダー行の列定義
/// * `Err(XlsxToDbError::UnknownDataColumn)` - 未宣言の列名が含まれる場合
pub(crate) fn parse_data_header(
    sheet: &str,
    range: &Range<Data>,
    schema: &ColumnSchema,
    layout: &SheetLayout,
    is_1904: bool,
) -> Result<Vec<DataColumn>, XlsxToDbError> {
    let mut columns = Vec::new();
    let last_col = match range.end() {
        Some((_, col)) => col,
        None => return Ok(columns),
    };

    for col in layout.data_start_col..=last_col {
        let coord = CellCoord::new(layout.data_header_row, col);
        let name = trimmed_text(range, coord, is_1904);
        if name.is_empty() {
            break;
        }

        let column_type = schema
            .get(&name)
            .ok_or_else(|| XlsxToDbError::UnknownDataColumn {
                sheet: sheet.to_string(),
                cell: coord.to_a1_notation(),
                column: name.clone(),
            })?;

        columns.push(DataColumn { name, column_type });
    }

    Ok(columns)
}

/// データ行を抽出
///
/// `layout.data_start_row`から、データブロック内に値を持つ最後の行までを読み取ります。
/// いずれかのセルの変換に失敗した時点で抽出全体を中断します。
///
/// # 戻り値
///
/// * `Ok(Vec<TypedRow>)` - 抽出された型付き行（データ行がなければ空）
/// * `Err(XlsxToDbError)` - ヘッダーの参照エラー、またはセルの変換エラー
pub(crate) fn extract_rows(
    sheet: &str,
    range: &Range<Data>,
    schema: &ColumnSchema,
    layout: &SheetLayout,
    is_1904: bool,
) -> Result<Vec<TypedRow>, XlsxToDbError> {
    let columns = parse_data_header(sheet, range, schema, layout, is_1904)?;

    let last_row = match last_data_row(range, layout, columns.len() as u32) {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::with_capacity((last_row + 1 - layout.data_start_row) as usize);
    for row_idx in layout.data_start_row..=last_row {
        let mut row = TypedRow::with_capacity(columns.len());

        for (offset, column) in columns.iter().enumerate() {
            let coord = CellCoord::new(row_idx, layout.data_start_col + offset as u32);
            let value = coerce_cell(
                cell_at(range, coord),
                column.column_type,
                is_1904,
                sheet,
                coord,
            )?;
            row.insert(column.name.clone(), value);
        }

        rows.push(row);
    }

    debug!(sheet, rows = rows.len(), columns = columns.len(), "extracted data rows");
    Ok(rows)
}

/// データブロック内で値を持つ最後の行を探す
///
/// 接続情報や列スキーマのセルはデータブロックの列に含まれないため、判定の対象外です。
fn last_data_row(range: &Range<Data>, layout: &SheetLayout, width: u32) -> Option<u32> {
    if width == 0 {
        return None;
    }

    let (end_row, _) = range.end()?;
    let first_col = layout.data_start_col;

    (layout.data_start_row..=end_row).rev().find(|&row| {
        (first_col..first_col + width).any(|col| !is_blank(cell_at(range, CellCoord::new(row, col))))
    })
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
