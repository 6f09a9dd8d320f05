//! Public API Types
//!
//! 公開APIで使用する設定型を定義するモジュール。

/// シート選択方式
///
/// 読み込み対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートをファイル内の順序で読み込む（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),

    /// 複数のインデックス指定
    ///
    /// 例: `SheetSelector::Indices(vec![0, 2, 4])`
    Indices(Vec<usize>),

    /// 複数のシート名指定
    ///
    /// 例: `SheetSelector::Names(vec!["Sheet1".to_string(), "Sheet2".to_string()])`
    Names(Vec<String>),
}

/// シート上の固定レイアウト（すべて0始まりの座標）
///
/// デフォルト値は次の配置です。
///
/// | 領域 | 位置 |
/// | --- | --- |
/// | 接続情報 | 列1、行0〜6（ドライバー、ユーザー、パスワード、ホスト、ポート、データベース、テーブル） |
/// | 列スキーマ | 行8以降、列0が列名、列1が型ラベル（列名が空白の行で終了） |
/// | データヘッダー | 行0、列2から右方向（空白セルで終了） |
/// | データ | 行1以降、列2から |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// 接続情報ブロックの列
    pub descriptor_col: u32,
    /// 接続情報ブロックの先頭行（ドライバー行）
    pub descriptor_row: u32,
    /// 列スキーマの先頭行
    pub schema_start_row: u32,
    /// 列スキーマの列名列
    pub schema_name_col: u32,
    /// 列スキーマの型ラベル列
    pub schema_type_col: u32,
    /// データヘッダー行
    pub data_header_row: u32,
    /// データブロックの先頭列
    pub data_start_col: u32,
    /// データの先頭行
    pub data_start_row: u32,
}

impl SheetLayout {
    /// 接続情報ブロックの行数
    pub const DESCRIPTOR_FIELDS: u32 = 7;
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            descriptor_col: 1,
            descriptor_row: 0,
            schema_start_row: 8,
            schema_name_col: 0,
            schema_type_col: 1,
            data_header_row: 0,
            data_start_col: 2,
            data_start_row: 1,
        }
    }
}
