//! xlsxdb - Load typed rows from self-describing Excel workbooks into relational databases
//!
//! 各シートが「接続先」「列スキーマ」「データ」を固定レイアウトで持つXLSXワークブックを読み込み、
//! シートごとに型付きの[`Dataset`]を構築して、記述された接続先のテーブルへ挿入します。
//!
//! # シートのレイアウト（0始まり）
//!
//! | 領域 | 位置 |
//! | --- | --- |
//! | 接続情報 | 列1、行0〜6: ドライバー、ユーザー、パスワード、ホスト、ポート、データベース、テーブル |
//! | 列スキーマ | 行8以降: 列0が列名、列1が型ラベル（列名が空白の行で終了） |
//! | データヘッダー | 行0、列2から右方向（空白セルで終了） |
//! | データ | 行1以降、列2から |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxdb::LoaderBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Parse every sheet first; nothing is inserted if any sheet is invalid
//!     let loader = LoaderBuilder::new().build()?;
//!     let datasets = loader.load_path("import.xlsx")?;
//!
//!     // Insert datasets one after another, in sheet order
//!     for dataset in datasets {
//!         let inserted = dataset.insert().await?;
//!         println!("inserted {} rows", inserted);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsxdb::{LoaderBuilder, SheetLayout, SheetSelector};
//!
//! # fn main() -> Result<(), xlsxdb::XlsxToDbError> {
//! let loader = LoaderBuilder::new()
//!     .with_sheet_selector(SheetSelector::Names(vec!["orders".to_string()]))
//!     .with_layout(SheetLayout {
//!         schema_start_row: 10,
//!         ..SheetLayout::default()
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod coercion;
mod database;
mod error;
pub mod logging;
mod parser;
mod security;
mod types;

// 公開API
pub use api::{SheetLayout, SheetSelector};
pub use builder::{Loader, LoaderBuilder};
pub use database::insert_dataset;
pub use error::XlsxToDbError;
pub use types::{CellData, ColumnSchema, ColumnType, ConnectionDescriptor, Dataset, Driver, TypedRow};
