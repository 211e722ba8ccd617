//! Records Module
//!
//! デコード済みシートのセルグリッドを行レコードの列に変換するモジュール。
//! 一般的な「シート → レコード」変換の慣例に従います:
//!
//! - 最初の非空行がヘッダーになり、以降の各行が1レコードになる
//! - 空のヘッダーは `__EMPTY`、重複ヘッダーは `_1`, `_2`, ... の接尾辞で一意化する
//! - 空セルはレコードから省略する（デフォルト値が指定された場合はその値で埋める）
//! - 非空セルを1つも含まない行はスキップする

use std::collections::HashMap;

use calamine::ExcelDateTime;
use chrono::{Datelike, NaiveTime};
use serde_json::{Map, Value};

use crate::api::{DateMode, HeaderMode};
use crate::types::{number_to_json, CellValue, RowRecord, Sheet, SheetTable};

/// 空のヘッダーセルに割り当てる名前
const EMPTY_HEADER: &str = "__EMPTY";

/// 9999-12-31 のシリアル値（これを超える日付はISO形式に変換しない）
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// レコード変換の設定
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordOptions {
    pub header_mode: HeaderMode,

    /// 空セルを埋める値（Noneの場合は省略 / 配列では `null`）
    pub default_value: Option<Value>,

    /// 空行を残すか（Noneの場合はヘッダーモードの既定値）
    pub blank_rows: Option<bool>,

    pub date_mode: DateMode,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::FirstRow,
            default_value: None,
            blank_rows: None,
            date_mode: DateMode::SerialNumber,
        }
    }
}

impl RecordOptions {
    /// 空行を残すかどうか
    ///
    /// 配列モードでは既定で残し、それ以外では既定でスキップします。
    fn keep_blank_rows(&self) -> bool {
        self.blank_rows
            .unwrap_or(self.header_mode == HeaderMode::RowArrays)
    }

    fn cell_json(&self, cell: &CellValue) -> Value {
        match (cell, self.date_mode) {
            (CellValue::DateTime(date), DateMode::Iso8601) => date_to_iso8601(date)
                .map(Value::String)
                .unwrap_or_else(|| number_to_json(date.as_f64())),
            _ => cell.to_json(),
        }
    }
}

/// 複数シートを変換（シート順を保持）
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn convert_sheets(sheets: &[Sheet], options: &RecordOptions) -> Vec<SheetTable> {
    use rayon::prelude::*;

    // rayonのcollectはインデックス順を保持する
    sheets
        .par_iter()
        .map(|sheet| convert_sheet(sheet, options))
        .collect()
}

/// 複数シートを変換（シート順を保持）
#[cfg(target_arch = "wasm32")]
pub(crate) fn convert_sheets(sheets: &[Sheet], options: &RecordOptions) -> Vec<SheetTable> {
    sheets
        .iter()
        .map(|sheet| convert_sheet(sheet, options))
        .collect()
}

/// 1シートを変換
pub(crate) fn convert_sheet(sheet: &Sheet, options: &RecordOptions) -> SheetTable {
    let records = match options.header_mode {
        HeaderMode::FirstRow => first_row_records(sheet, options),
        HeaderMode::ColumnLetters => {
            let keys: Vec<String> = (0..grid_width(sheet))
                .map(|c| col_to_letter(sheet.first_col + c as u32))
                .collect();
            keyed_records(&sheet.rows, &keys, options)
        }
        HeaderMode::RowArrays => array_records(sheet, options),
    };

    SheetTable {
        name: sheet.name.clone(),
        records,
    }
}

fn first_row_records(sheet: &Sheet, options: &RecordOptions) -> Vec<RowRecord> {
    let header_idx = match sheet
        .rows
        .iter()
        .position(|row| row.iter().any(|c| !c.is_empty()))
    {
        Some(idx) => idx,
        None => return Vec::new(),
    };

    let headers = unique_headers(&sheet.rows[header_idx], grid_width(sheet));
    keyed_records(&sheet.rows[header_idx + 1..], &headers, options)
}

fn keyed_records(rows: &[Vec<CellValue>], keys: &[String], options: &RecordOptions) -> Vec<RowRecord> {
    let keep_blank = options.keep_blank_rows();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let mut record = Map::new();
        let mut is_blank = true;

        for (col, key) in keys.iter().enumerate() {
            match row.get(col) {
                Some(cell) if !cell.is_empty() => {
                    record.insert(key.clone(), options.cell_json(cell));
                    is_blank = false;
                }
                _ => {
                    if let Some(default) = &options.default_value {
                        record.insert(key.clone(), default.clone());
                    }
                }
            }
        }

        if !is_blank || keep_blank {
            records.push(RowRecord::Object(record));
        }
    }

    records
}

fn array_records(sheet: &Sheet, options: &RecordOptions) -> Vec<RowRecord> {
    let width = grid_width(sheet);
    let keep_blank = options.keep_blank_rows();
    let empty = options.default_value.clone().unwrap_or(Value::Null);

    sheet
        .rows
        .iter()
        .filter(|row| keep_blank || row.iter().any(|c| !c.is_empty()))
        .map(|row| {
            let values = (0..width)
                .map(|col| match row.get(col) {
                    Some(cell) if !cell.is_empty() => options.cell_json(cell),
                    _ => empty.clone(),
                })
                .collect();
            RowRecord::Array(values)
        })
        .collect()
}

/// グリッドの列数（行ごとに長さが異なる場合は最大値）
fn grid_width(sheet: &Sheet) -> usize {
    sheet.rows.iter().map(Vec::len).max().unwrap_or(0)
}

/// ヘッダー行から一意なヘッダー名の列を生成
///
/// `Name`, `Name`, `Name` → `Name`, `Name_1`, `Name_2`
fn unique_headers(header_row: &[CellValue], width: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(width);

    for col in 0..width {
        let base = match header_row.get(col) {
            Some(cell) if !cell.is_empty() => cell.display_text(),
            _ => EMPTY_HEADER.to_string(),
        };

        let name = match counts.get(&base).copied() {
            None => {
                counts.insert(base.clone(), 1);
                base
            }
            Some(mut counter) => {
                let mut candidate = format!("{}_{}", base, counter);
                while counts.contains_key(&candidate) {
                    counter += 1;
                    candidate = format!("{}_{}", base, counter);
                }
                counts.insert(base, counter + 1);
                counts.insert(candidate.clone(), 1);
                candidate
            }
        };
        headers.push(name);
    }

    headers
}

/// 列インデックスをExcel列名（A, B, C, ...）に変換
fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result.chars().rev().collect()
}

/// 日付セルをISO 8601文字列に変換
///
/// 1900年・1904年の日付システムと1900年2月以前の補正はcalamineの変換に従います。
/// 時刻成分がない場合は `YYYY-MM-DD`、ある場合は `YYYY-MM-DDTHH:MM:SS`。
/// 範囲外の値は `None`。
fn date_to_iso8601(date: &ExcelDateTime) -> Option<String> {
    let serial = date.as_f64();
    if !serial.is_finite() || !(0.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    let datetime = date.as_datetime()?;
    if datetime.year() > 9999 {
        return None;
    }

    if datetime.time() == NaiveTime::MIN {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}
