//! Workbook Parser Module
//!
//! calamineを使用したワークブックレベルの操作（オープン、シート列挙、シート選択）を提供します。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};

use crate::api::SheetSelector;
use crate::error::XlsxToDbError;
use crate::parser::WorkbookMetadata;
use crate::security::SecurityConfig;

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
/// シート全体はメモリ上に展開されます。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// XMLメタデータ（日付システム）
    metadata: WorkbookMetadata,
}

impl WorkbookParser {
    /// メモリ上のXLSXデータからワークブックを開く
    ///
    /// # 引数
    ///
    /// * `buffer` - XLSXファイルのバイト列
    /// * `security` - 入力制限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックとメタデータの読み込みに成功した場合
    /// * `Err(XlsxToDbError)` - XLSXとして開けない場合、または入力制限に違反した場合
    pub fn open(buffer: Vec<u8>, security: &SecurityConfig) -> Result<Self, XlsxToDbError> {
        security.check_input_size(buffer.len() as u64)?;

        // 日付システムの判定（ZIPアーカイブの検証を含む）
        let metadata = WorkbookMetadata::parse(Cursor::new(buffer.as_slice()), security)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(XlsxToDbError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        Ok(Self { workbook, metadata })
    }

    /// すべてのシート名をファイル内の順序で取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// 1904年エポックを使用するかどうか
    pub fn is_1904(&self) -> bool {
        self.metadata.is_1904()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト
    /// * `Err(XlsxToDbError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, XlsxToDbError> {
        let all_sheet_names = self.sheet_names();

        let pick_index = |index: usize| -> Result<String, XlsxToDbError> {
            all_sheet_names.get(index).cloned().ok_or_else(|| {
                XlsxToDbError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            })
        };

        let check_name = |name: &String| -> Result<String, XlsxToDbError> {
            if all_sheet_names.contains(name) {
                Ok(name.clone())
            } else {
                Err(XlsxToDbError::Config(format!("Sheet '{}' not found", name)))
            }
        };

        match selector {
            SheetSelector::All => Ok(all_sheet_names.clone()),
            SheetSelector::Index(index) => Ok(vec![pick_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![check_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|&i| pick_index(i)).collect(),
            SheetSelector::Names(names) => names.iter().map(check_name).collect(),
        }
    }

    /// シートのセル範囲を取得
    ///
    /// 範囲の座標は絶対座標で参照します（`Range::get_value`）。
    pub fn sheet_range(&mut self, sheet_name: &str) -> Result<Range<Data>, XlsxToDbError> {
        self.workbook
            .worksheet_range(sheet_name)
            .map_err(|e| XlsxToDbError::Parse(e.into()))
    }
}

// テストは統合テスト（tests/）で実装します。
// 実際のXLSXファイルが必要なため、単体テストではなく統合テストとして実装します。
