//! calamineを使用したデコーダーの実装。
//!
//! calamineの形式自動判定により、XLS（BIFF）、XLSX、XLSB、ODSを読み込みます。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use crate::error::SheetJsonError;
use crate::parser::SpreadsheetCodec;
use crate::types::{CellValue, Sheet, Workbook};

/// calamineによるデコーダー
///
/// セル値の対応:
///
/// - 整数・浮動小数点数 → `CellValue::Number`
/// - 文字列 → `CellValue::String`（空文字列は `CellValue::Empty`）
/// - 論理値 → `CellValue::Bool`
/// - 日付・時刻 → `CellValue::DateTime`（ブックの日付システムを保持）。経過時間は `CellValue::Number`
/// - ISO形式の日付・経過時間文字列 → `CellValue::String`
/// - エラー値（`#DIV/0!` など）・空セル → `CellValue::Empty`
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineCodec;

impl SpreadsheetCodec for CalamineCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Workbook, SheetJsonError> {
        let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let mut workbook = Workbook::new();
        for name in sheets.sheet_names() {
            let range = sheets.worksheet_range(&name)?;
            workbook.push_sheet(sheet_from_range(name, &range))?;
        }

        debug!(sheets = workbook.len(), bytes = bytes.len(), "decoded workbook");
        Ok(workbook)
    }
}

/// calamineのセル範囲を `Sheet` に変換
///
/// calamineの範囲は最初の非空セルの行・列から始まるため、
/// 先頭列の絶対インデックスを `first_col` に記録します。
fn sheet_from_range(name: String, range: &Range<Data>) -> Sheet {
    let first_col = range.start().map(|(_, col)| col).unwrap_or(0);
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Sheet::new(name, rows).with_first_col(first_col)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        Data::DateTime(dt) => CellValue::DateTime(*dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        _ => CellValue::Empty,
    }
}
