//! Security Module
//!
//! 入力サイズの上限チェックを提供するモジュール。
//! ブラウザやホスト上でメモリに全体を読み込むため、巨大なファイルは読み込み前後で拒否します。

use std::io::Read;

use crate::error::SheetJsonError;

/// セキュリティ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 104_857_600, // 100MB
        }
    }
}

impl SecurityConfig {
    /// バイト数が上限以内かを検証
    pub fn check_input_size(&self, len: u64) -> Result<(), SheetJsonError> {
        if len > self.max_input_file_size {
            return Err(SheetJsonError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                len, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// リーダーの内容をすべて読み込む（上限+1バイトで打ち切り）
    pub fn read_limited<R: Read>(&self, reader: R) -> Result<Vec<u8>, SheetJsonError> {
        let mut buffer = Vec::new();
        reader
            .take(self.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;
        self.check_input_size(buffer.len() as u64)?;
        Ok(buffer)
    }
}
