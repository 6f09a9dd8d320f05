//! Security Module
//!
//! ワークブック読み込み時の入力制限を実装するモジュール。
//! 巨大な入力、ZIP bomb、パストラバーサルを含むアーカイブを拒否します。

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::XlsxToDbError;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 1GB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824,
            max_file_count: 10_000,
            max_file_size: 104_857_600,
            max_input_file_size: 2_147_483_648,
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルサイズの上限を検証
    pub fn check_input_size(&self, bytes: u64) -> Result<(), XlsxToDbError> {
        if bytes > self.max_input_file_size {
            return Err(XlsxToDbError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// ZIPアーカイブのエントリ数・パス・展開サイズを検証
    pub fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), XlsxToDbError> {
        if archive.len() > self.max_file_count {
            return Err(XlsxToDbError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| XlsxToDbError::Zip(e.to_string()))?;

            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                XlsxToDbError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(XlsxToDbError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(file_size)
                .ok_or_else(|| {
                    XlsxToDbError::SecurityViolation(
                        "Total decompressed size calculation overflow".to_string(),
                    )
                })?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(XlsxToDbError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// ZIPエントリのパスを検証
///
/// `..`、絶対パス、バックスラッシュを含むパスを拒否します。
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
