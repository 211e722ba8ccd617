//! Parser Module
//!
//! バイト列 → ワークブック のデコードを担当するモジュール。
//! デコーダーは `SpreadsheetCodec` トレイトで差し替え可能で、
//! 既定の実装は calamine を使用する `CalamineCodec` です。

mod workbook;

pub use workbook::CalamineCodec;

use crate::error::SheetJsonError;
use crate::types::Workbook;

/// スプレッドシートのデコーダー
///
/// ファイルのバイト列を `Workbook` に変換する唯一の能力を表します。
/// 変換ロジックのテストでは、固定のワークブックを返す偽のデコーダーを使用できます。
///
/// # 実装例
///
/// ```rust
/// use sheetjson::{CellValue, Sheet, SheetJsonError, SpreadsheetCodec, Workbook};
///
/// struct FixedCodec;
///
/// impl SpreadsheetCodec for FixedCodec {
///     fn decode(&self, _bytes: &[u8]) -> Result<Workbook, SheetJsonError> {
///         let mut workbook = Workbook::new();
///         workbook.push_sheet(Sheet::new(
///             "Sheet1",
///             vec![vec![CellValue::String("Name".to_string())]],
///         ))?;
///         Ok(workbook)
///     }
/// }
/// ```
pub trait SpreadsheetCodec {
    /// バイト列をワークブックにデコードする
    ///
    /// デコードできない場合は `SheetJsonError::Decode` を返します。
    fn decode(&self, bytes: &[u8]) -> Result<Workbook, SheetJsonError>;
}

impl<T: SpreadsheetCodec + ?Sized> SpreadsheetCodec for Box<T> {
    fn decode(&self, bytes: &[u8]) -> Result<Workbook, SheetJsonError> {
        (**self).decode(bytes)
    }
}
