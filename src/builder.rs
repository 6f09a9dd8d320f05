//! Builder Module
//!
//! Fluent Builder APIを提供し、`Loader`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::api::{SheetLayout, SheetSelector};
use crate::error::XlsxToDbError;
use crate::parser::{extract_rows, parse_column_schema, parse_descriptor, WorkbookParser};
use crate::security::SecurityConfig;
use crate::types::Dataset;

/// 読み込み処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct LoaderConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// シート上の固定レイアウト
    pub layout: SheetLayout,

    /// 入力制限
    pub security: SecurityConfig,
}

/// Fluent Builder APIを提供する構造体
///
/// `Loader`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxdb::{LoaderBuilder, SheetSelector};
///
/// # fn main() -> Result<(), xlsxdb::XlsxToDbError> {
/// let loader = LoaderBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct LoaderBuilder {
    /// 内部設定（構築中）
    config: LoaderConfig,
}

impl LoaderBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート（ファイル内の順序）
    /// - レイアウト: [`SheetLayout::default()`]
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み込み対象のシートを選択する
    ///
    /// # 引数
    ///
    /// * `selector: SheetSelector`: シート選択方式
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxdb::{LoaderBuilder, SheetSelector};
    ///
    /// // 単一シートを名前で指定
    /// let builder = LoaderBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("orders".to_string()));
    ///
    /// // 複数シートを指定
    /// let builder = LoaderBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Indices(vec![0, 2]));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// シート上の固定レイアウトを指定する
    ///
    /// # 引数
    ///
    /// * `layout: SheetLayout`: 接続情報・列スキーマ・データブロックの位置
    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// 設定を検証し、`Loader`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Loader)`: 設定が有効な場合
    /// * `Err(XlsxToDbError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxToDbError::Config(String)`: 設定の検証に失敗した場合
    ///   * シート名・インデックスのリストが空
    ///   * データブロックが接続情報・列スキーマの列と重なっている
    pub fn build(self) -> Result<Loader, XlsxToDbError> {
        // 1. シート選択の検証
        match &self.config.sheet_selector {
            SheetSelector::Names(names) if names.is_empty() => {
                return Err(XlsxToDbError::Config(
                    "Sheet name list must not be empty".to_string(),
                ));
            }
            SheetSelector::Indices(indices) if indices.is_empty() => {
                return Err(XlsxToDbError::Config(
                    "Sheet index list must not be empty".to_string(),
                ));
            }
            _ => {}
        }

        // 2. レイアウトの検証
        let layout = &self.config.layout;
        if layout.data_start_col <= layout.descriptor_col {
            return Err(XlsxToDbError::Config(format!(
                "Invalid layout: data start col ({}) must be right of descriptor col ({})",
                layout.data_start_col, layout.descriptor_col
            )));
        }

        if layout.data_start_col <= layout.schema_type_col
            || layout.data_start_col <= layout.schema_name_col
        {
            return Err(XlsxToDbError::Config(format!(
                "Invalid layout: data start col ({}) must be right of schema cols ({}, {})",
                layout.data_start_col, layout.schema_name_col, layout.schema_type_col
            )));
        }

        if layout.data_start_row <= layout.data_header_row {
            return Err(XlsxToDbError::Config(format!(
                "Invalid layout: data start row ({}) must be below data header row ({})",
                layout.data_start_row, layout.data_header_row
            )));
        }

        // 3. Loaderインスタンス生成
        Ok(Loader::new(self.config))
    }
}

/// ワークブック読み込み処理のファサード
///
/// ワークブックの各シートから[`Dataset`]を構築するメインエントリーポイントです。
/// 読み込みはすべてのシートで成功するか、最初の失敗で全体が失敗するかのどちらかです。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxdb::LoaderBuilder;
///
/// # fn main() -> Result<(), xlsxdb::XlsxToDbError> {
/// let loader = LoaderBuilder::new().build()?;
/// let datasets = loader.load_path("import.xlsx")?;
/// for dataset in &datasets {
///     println!("{}: {} rows", dataset.sheet(), dataset.rows().len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Loader {
    /// 読み込み設定
    config: LoaderConfig,
}

impl Loader {
    pub(crate) fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// ワークブックを読み込み、選択されたシートごとにデータセットを構築する
    ///
    /// # 引数
    ///
    /// * `input` - XLSXファイルを読み込むためのリーダー
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Dataset>)` - シートの順序どおりのデータセット
    /// * `Err(XlsxToDbError)` - いずれかのシートの解析に失敗した場合（部分的な結果は返しません）
    ///
    /// # 処理フロー
    ///
    /// 1. 入力データをメモリに読み込む
    /// 2. WorkbookParserの初期化（日付システムの判定を含む）
    /// 3. シート選択
    /// 4. 各シートについて順に処理
    ///    - 接続情報の解析
    ///    - 列スキーマの解析
    ///    - データ行の抽出
    pub fn load<R: Read>(&self, mut input: R) -> Result<Vec<Dataset>, XlsxToDbError> {
        // 1. 入力データをメモリに読み込む
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;

        // 2. WorkbookParserの初期化
        let mut parser = WorkbookParser::open(buffer, &self.config.security)?;
        let is_1904 = parser.is_1904();

        // 3. シート選択
        let sheet_names = parser.select_sheets(&self.config.sheet_selector)?;
        info!(sheets = sheet_names.len(), is_1904, "opened workbook");

        // 4. 各シートの処理（順次）
        let layout = &self.config.layout;
        let mut datasets = Vec::with_capacity(sheet_names.len());
        for sheet_name in sheet_names {
            let range = parser.sheet_range(&sheet_name)?;

            let connection = parse_descriptor(&sheet_name, &range, layout, is_1904)?;
            let schema = parse_column_schema(&sheet_name, &range, layout, is_1904)?;
            let rows = extract_rows(&sheet_name, &range, &schema, layout, is_1904)?;

            info!(
                sheet = %sheet_name,
                driver = %connection.driver(),
                table = connection.table(),
                columns = schema.len(),
                rows = rows.len(),
                "parsed sheet"
            );
            datasets.push(Dataset::new(sheet_name, connection, schema, rows));
        }

        Ok(datasets)
    }

    /// パスで指定したワークブックを読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Dataset>)` - シートの順序どおりのデータセット
    /// * `Err(XlsxToDbError::Io)` - ファイルを開けない場合
    /// * `Err(XlsxToDbError)` - [`Loader::load`]と同じ
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Dataset>, XlsxToDbError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading workbook");
        let file = File::open(path)?;
        self.load(file)
    }
}
