//! XML Metadata Parser Module
//!
//! XLSX内部の`xl/workbook.xml`から、日付システム（1900年 / 1904年エポック）を判定するモジュール。
//! 日付セルおよび数値シリアル値の変換は、ここで得たフラグに従って行います。

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::XlsxToDbError;
use crate::security::SecurityConfig;

/// ワークブック全体のメタデータ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WorkbookMetadata {
    /// 1904年エポックを使用するかどうか
    is_1904: bool,
}

impl WorkbookMetadata {
    /// XLSXファイル（ZIPアーカイブ）からメタデータを解析
    ///
    /// アーカイブはセキュリティ制限で検証した後に読み込みます。
    pub fn parse<R: Read + Seek>(
        xlsx_reader: R,
        security: &SecurityConfig,
    ) -> Result<Self, XlsxToDbError> {
        let mut archive =
            ZipArchive::new(xlsx_reader).map_err(|e| XlsxToDbError::Zip(e.to_string()))?;

        security.check_archive(&mut archive)?;

        let mut workbook_file = match archive.by_name("xl/workbook.xml") {
            Ok(file) => file,
            // workbook.xmlが存在しない場合は1900年システムとみなす
            Err(_) => return Ok(Self::default()),
        };

        let mut xml_content = Vec::new();
        workbook_file.read_to_end(&mut xml_content)?;

        Ok(Self {
            is_1904: parse_date1904(&xml_content)?,
        })
    }

    /// 1904年エポックを使用するかどうかを取得
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }
}

/// `<workbookPr date1904="1"/>` を解析し、1904年エポックフラグを取得
fn parse_date1904(xml: &[u8]) -> Result<bool, XlsxToDbError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut is_1904 = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"workbookPr" {
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| {
                            XlsxToDbError::Config(format!("XML attribute error: {}", e))
                        })?;
                        if attr.key.as_ref() == b"date1904" {
                            let value_str = std::str::from_utf8(&attr.value)?;
                            is_1904 = value_str == "1" || value_str.eq_ignore_ascii_case("true");
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxToDbError::Config(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(is_1904)
}
