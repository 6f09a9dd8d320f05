//! Coercion Module
//!
//! セル値を宣言された列型の値へ変換するモジュール。
//! 型カテゴリごとに専用のパーサーを使用し、暗黙のカテゴリ間変換や既定値での補完は行いません。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::XlsxToDbError;
use crate::types::{CellCoord, CellData, ColumnType};

/// 9999-12-31 に対応するシリアル値の上限
const MAX_SERIAL: f64 = 2_958_466.0;

/// セル値を宣言型に変換する
///
/// # 引数
///
/// * `cell` - calamineのセルデータ
/// * `column_type` - 列の宣言型
/// * `is_1904` - ワークブックが1904年エポックを使用するかどうか
/// * `sheet` - シート名（エラー報告用）
/// * `coord` - セル座標（エラー報告用）
///
/// # 戻り値
///
/// * `Ok(CellData)` - 変換に成功した場合
/// * `Err(XlsxToDbError::Conversion)` - 宣言型として解釈できない場合
pub(crate) fn coerce_cell(
    cell: &Data,
    column_type: ColumnType,
    is_1904: bool,
    sheet: &str,
    coord: CellCoord,
) -> Result<CellData, XlsxToDbError> {
    let value = match column_type {
        ColumnType::String => match cell {
            Data::Error(_) => None,
            _ => Some(CellData::String(cell_text(cell, is_1904).trim().to_string())),
        },
        ColumnType::ShortInt => integer_of(cell)
            .and_then(|v| i8::try_from(v).ok())
            .map(CellData::ShortInt),
        ColumnType::Int => integer_of(cell)
            .and_then(|v| i32::try_from(v).ok())
            .map(CellData::Int),
        ColumnType::BigInt => integer_of(cell).map(CellData::BigInt),
        ColumnType::Numeric | ColumnType::BigFloat => float_of(cell).map(CellData::Double),
        ColumnType::Float => float_of(cell).map(|v| CellData::Float(v as f32)),
        ColumnType::Bool => match cell {
            Data::Bool(b) => Some(CellData::Bool(*b)),
            Data::Int(i) => Some(CellData::Bool(*i != 0)),
            Data::Float(f) if f.is_finite() => Some(CellData::Bool(*f != 0.0)),
            _ => None,
        },
        ColumnType::Date => datetime_of(cell, is_1904).map(CellData::DateTime),
    };

    value.ok_or_else(|| XlsxToDbError::Conversion {
        sheet: sheet.to_string(),
        cell: coord.to_a1_notation(),
        row: coord.row,
        col: coord.col,
        expected: column_type.to_string(),
        found: describe(cell),
    })
}

/// セルの表示テキストを取得（前後の空白は除去しない）
///
/// 数値は整数値であれば小数点なしで、日付セルはISO 8601形式で表現します。
pub(crate) fn cell_text(cell: &Data, is_1904: bool) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64(), is_1904) {
            Some(value) => format_datetime(value),
            None => format_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

/// Excelのシリアル日付値を日時に変換
///
/// # エポックシステム
///
/// - 1900年システム: シリアル値1 = 1900-01-01
///   - Excelの1900年うるう年バグにより、シリアル値60（1900-02-29）は存在しない日付として扱う
///   - シリアル値61以降は1899-12-30起算
/// - 1904年システム: シリアル値0 = 1904-01-01
///
/// 小数部は時刻（1日 = 1.0）として秒単位に丸めます。
pub(crate) fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;

    let epoch = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else if days == 60 {
        return None;
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

fn integer_of(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => {
            let in_range = *f >= -9_223_372_036_854_775_808.0 && *f < 9_223_372_036_854_775_808.0;
            if f.is_finite() && f.fract() == 0.0 && in_range {
                Some(*f as i64)
            } else {
                None
            }
        }
        Data::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn float_of(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn datetime_of(cell: &Data, is_1904: bool) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64(), is_1904),
        Data::Float(f) => serial_to_datetime(*f, is_1904),
        Data::Int(i) => serial_to_datetime(*i as f64, is_1904),
        Data::DateTimeIso(s) => parse_iso_datetime(s),
        _ => None,
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.time() == chrono::NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// エラーメッセージ用のセル内容の説明
fn describe(cell: &Data) -> String {
    match cell {
        Data::String(s) => format!("string {:?}", s),
        Data::Int(i) => format!("integer {}", i),
        Data::Float(f) => format!("number {}", f),
        Data::Bool(b) => format!("boolean {}", b),
        Data::DateTime(dt) => format!("date serial {}", dt.as_f64()),
        Data::DateTimeIso(s) => format!("datetime {}", s),
        Data::DurationIso(s) => format!("duration {}", s),
        Data::Error(e) => format!("error {}", e),
        Data::Empty => "empty cell".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce(cell: Data, column_type: ColumnType) -> Result<CellData, XlsxToDbError> {
        coerce_cell(&cell, column_type, false, "Sheet1", CellCoord::new(2, 3))
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_int_from_text() {
        assert_eq!(
            coerce(Data::String("42".to_string()), ColumnType::Int).unwrap(),
            CellData::Int(42)
        );
    }

    #[test]
    fn test_int_from_invalid_text_fails_with_position() {
        match coerce(Data::String("abc".to_string()), ColumnType::Int) {
            Err(XlsxToDbError::Conversion {
                sheet,
                cell,
                row,
                col,
                expected,
                found,
            }) => {
                assert_eq!(sheet, "Sheet1");
                assert_eq!(cell, "D3");
                assert_eq!(row, 2);
                assert_eq!(col, 3);
                assert_eq!(expected, "int");
                assert!(found.contains("abc"));
            }
            other => panic!("Expected Conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_int_from_numeric_cells() {
        assert_eq!(coerce(Data::Float(7.0), ColumnType::Int).unwrap(), CellData::Int(7));
        assert_eq!(coerce(Data::Int(-3), ColumnType::Int).unwrap(), CellData::Int(-3));
        // 小数部を持つ値は切り捨てない
        assert!(coerce(Data::Float(4.2), ColumnType::Int).is_err());
        assert!(coerce(Data::String("4.2".to_string()), ColumnType::Int).is_err());
    }

    #[test]
    fn test_integer_width_is_enforced() {
        assert_eq!(
            coerce(Data::Float(127.0), ColumnType::ShortInt).unwrap(),
            CellData::ShortInt(127)
        );
        assert!(coerce(Data::Float(128.0), ColumnType::ShortInt).is_err());
        assert!(coerce(Data::Float(3_000_000_000.0), ColumnType::Int).is_err());
        assert_eq!(
            coerce(Data::Float(3_000_000_000.0), ColumnType::BigInt).unwrap(),
            CellData::BigInt(3_000_000_000)
        );
    }

    #[test]
    fn test_empty_cell_is_not_a_number() {
        assert!(coerce(Data::Empty, ColumnType::Int).is_err());
        assert!(coerce(Data::Empty, ColumnType::BigFloat).is_err());
        assert!(coerce(Data::Empty, ColumnType::Bool).is_err());
        assert!(coerce(Data::Empty, ColumnType::Date).is_err());
    }

    #[test]
    fn test_string_is_trimmed_and_empty_is_valid() {
        assert_eq!(
            coerce(Data::String("  Alice \t".to_string()), ColumnType::String).unwrap(),
            CellData::String("Alice".to_string())
        );
        assert_eq!(
            coerce(Data::Empty, ColumnType::String).unwrap(),
            CellData::String(String::new())
        );
    }

    #[test]
    fn test_string_from_number_uses_display_text() {
        assert_eq!(
            coerce(Data::Float(5432.0), ColumnType::String).unwrap(),
            CellData::String("5432".to_string())
        );
        assert_eq!(
            coerce(Data::Float(1.5), ColumnType::String).unwrap(),
            CellData::String("1.5".to_string())
        );
    }

    #[test]
    fn test_string_rejects_error_cells() {
        let cell = Data::Error(calamine::CellErrorType::Div0);
        assert!(coerce(cell, ColumnType::String).is_err());
    }

    #[test]
    fn test_float_precision() {
        assert_eq!(
            coerce(Data::Float(0.1), ColumnType::BigFloat).unwrap(),
            CellData::Double(0.1)
        );
        assert_eq!(
            coerce(Data::Float(0.1), ColumnType::Numeric).unwrap(),
            CellData::Double(0.1)
        );
        assert_eq!(
            coerce(Data::Float(0.1), ColumnType::Float).unwrap(),
            CellData::Float(0.1f32)
        );
        assert_eq!(
            coerce(Data::String(" 2.5 ".to_string()), ColumnType::Float).unwrap(),
            CellData::Float(2.5)
        );
        assert!(coerce(Data::String("two".to_string()), ColumnType::Float).is_err());
    }

    #[test]
    fn test_bool_from_boolean_and_numeric_cells() {
        assert_eq!(coerce(Data::Bool(true), ColumnType::Bool).unwrap(), CellData::Bool(true));
        assert_eq!(coerce(Data::Bool(false), ColumnType::Bool).unwrap(), CellData::Bool(false));
        // 数値セルは0以外が真
        assert_eq!(coerce(Data::Float(1.0), ColumnType::Bool).unwrap(), CellData::Bool(true));
        assert_eq!(coerce(Data::Float(0.0), ColumnType::Bool).unwrap(), CellData::Bool(false));
        assert_eq!(coerce(Data::Float(-2.5), ColumnType::Bool).unwrap(), CellData::Bool(true));
        assert_eq!(coerce(Data::Int(0), ColumnType::Bool).unwrap(), CellData::Bool(false));
        assert_eq!(coerce(Data::Int(1), ColumnType::Bool).unwrap(), CellData::Bool(true));
    }

    #[test]
    fn test_bool_rejects_text() {
        assert!(coerce(Data::String("true".to_string()), ColumnType::Bool).is_err());
        assert!(coerce(Data::String("1".to_string()), ColumnType::Bool).is_err());
    }

    #[test]
    fn test_date_from_serial() {
        assert_eq!(
            coerce(Data::Float(45306.5), ColumnType::Date).unwrap(),
            CellData::DateTime(datetime(2024, 1, 15, 12, 0, 0))
        );
        assert_eq!(
            coerce(Data::Int(45292), ColumnType::Date).unwrap(),
            CellData::DateTime(datetime(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_date_from_iso_cell() {
        assert_eq!(
            coerce(
                Data::DateTimeIso("2024-03-05T08:30:00".to_string()),
                ColumnType::Date
            )
            .unwrap(),
            CellData::DateTime(datetime(2024, 3, 5, 8, 30, 0))
        );
    }

    #[test]
    fn test_date_rejects_text() {
        assert!(coerce(Data::String("2024-01-15".to_string()), ColumnType::Date).is_err());
        assert!(coerce(Data::String("soon".to_string()), ColumnType::Date).is_err());
    }

    #[test]
    fn test_serial_1900_system() {
        assert_eq!(serial_to_datetime(1.0, false), Some(datetime(1900, 1, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(59.0, false), Some(datetime(1900, 2, 28, 0, 0, 0)));
        assert_eq!(serial_to_datetime(60.0, false), None);
        assert_eq!(serial_to_datetime(61.0, false), Some(datetime(1900, 3, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(45292.0, false), Some(datetime(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_serial_1904_system() {
        assert_eq!(serial_to_datetime(0.0, true), Some(datetime(1904, 1, 1, 0, 0, 0)));
        // 1904年システムでは同じ日付のシリアル値が1462小さい
        assert_eq!(serial_to_datetime(43830.0, true), Some(datetime(2024, 1, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(0.25, true), Some(datetime(1904, 1, 1, 6, 0, 0)));
    }

    #[test]
    fn test_serial_out_of_range() {
        assert_eq!(serial_to_datetime(-1.0, false), None);
        assert_eq!(serial_to_datetime(f64::NAN, false), None);
        assert_eq!(serial_to_datetime(1e12, false), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(5432.0), false), "5432");
        assert_eq!(cell_text(&Data::Int(7), false), "7");
        assert_eq!(cell_text(&Data::Bool(true), false), "TRUE");
        assert_eq!(cell_text(&Data::String(" x ".to_string()), false), " x ");
        assert_eq!(cell_text(&Data::Empty, false), "");
    }
}
