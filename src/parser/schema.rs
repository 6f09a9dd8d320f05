//! Schema Parser Module
//!
//! シートの固定位置から接続記述子と列スキーマを読み取るモジュール。

use calamine::{Data, Range};
use tracing::debug;

use crate::api::SheetLayout;
use crate::coercion::cell_text;
use crate::error::XlsxToDbError;
use crate::types::{CellCoord, ColumnSchema, ColumnType, ConnectionDescriptor, Driver};

/// 絶対座標のセルを取得（範囲外は空セル）
pub(crate) fn cell_at(range: &Range<Data>, coord: CellCoord) -> &Data {
    static EMPTY: Data = Data::Empty;
    range.get_value((coord.row, coord.col)).unwrap_or(&EMPTY)
}

/// 絶対座標のセルのテキストを前後の空白を除去して取得
///
/// 日付セルはワークブックの日付システムに従ってISO 8601形式で表現します。
pub(crate) fn trimmed_text(range: &Range<Data>, coord: CellCoord, is_1904: bool) -> String {
    cell_text(cell_at(range, coord), is_1904).trim().to_string()
}

/// 接続情報ブロックを解析
///
/// 列`layout.descriptor_col`の連続する7行（ドライバー、ユーザー、パスワード、
/// ホスト、ポート、データベース、テーブル）を読み取ります。
///
/// # 戻り値
///
/// * `Ok(ConnectionDescriptor)` - 解析に成功した場合
/// * `Err(XlsxToDbError::UnknownDriver)` - ドライバーラベルが既知のものでない場合
pub(crate) fn parse_descriptor(
    sheet: &str,
    range: &Range<Data>,
    layout: &SheetLayout,
    is_1904: bool,
) -> Result<ConnectionDescriptor, XlsxToDbError> {
    let field = |offset: u32| {
        trimmed_text(
            range,
            CellCoord::new(layout.descriptor_row + offset, layout.descriptor_col),
            is_1904,
        )
    };

    let driver_coord = CellCoord::new(layout.descriptor_row, layout.descriptor_col);
    let label = field(0);
    let driver = Driver::from_label(&label).ok_or_else(|| XlsxToDbError::UnknownDriver {
        sheet: sheet.to_string(),
        cell: driver_coord.to_a1_notation(),
        label: label.clone(),
    })?;

    Ok(ConnectionDescriptor {
        driver,
        user: field(1),
        password: field(2),
        host: field(3),
        port: field(4),
        database: field(5),
        table: field(6),
    })
}

/// 列スキーマを解析
///
/// `layout.schema_start_row`から下方向へ走査し、列名セルが空白の行で終了します。
/// 型ラベルは前後の空白を除去し、大文字・小文字を区別せずに解決します。
/// 同じ列名が複数回宣言された場合は後勝ちです。
///
/// # 戻り値
///
/// * `Ok(ColumnSchema)` - 解析に成功した場合（先頭行が空白なら空のスキーマ）
/// * `Err(XlsxToDbError::UnknownColumnType)` - 未知の型ラベルが含まれる場合
pub(crate) fn parse_column_schema(
    sheet: &str,
    range: &Range<Data>,
    layout: &SheetLayout,
    is_1904: bool,
) -> Result<ColumnSchema, XlsxToDbError> {
    let mut schema = ColumnSchema::new();
    let last_row = range.end().map(|(row, _)| row);

    let mut row = layout.schema_start_row;
    loop {
        // 範囲外の行はすべて空白
        if last_row.map_or(true, |last| row > last) {
            break;
        }

        let name = trimmed_text(range, CellCoord::new(row, layout.schema_name_col), is_1904);
        if name.is_empty() {
            break;
        }

        let type_coord = CellCoord::new(row, layout.schema_type_col);
        let label = trimmed_text(range, type_coord, is_1904).to_lowercase();
        let column_type =
            ColumnType::from_label(&label).ok_or_else(|| XlsxToDbError::UnknownColumnType {
                sheet: sheet.to_string(),
                cell: type_coord.to_a1_notation(),
                label: label.clone(),
            })?;

        debug!(sheet, column = %name, column_type = %column_type, "declared column");
        schema.declare(name, column_type);
        row += 1;
    }

    Ok(schema)
}
