//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! デコード済みのワークブック（`Workbook` / `Sheet`）と、
//! 変換結果（`ConversionResult` / `SheetTable` / `RowRecord`）を含みます。

use calamine::ExcelDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::SheetJsonError;

/// JSONで整数として安全に表現できる最大値（2^53 - 1）
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付・時刻（シリアル値とブックの日付システム）
    DateTime(ExcelDateTime),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 表示用の文字列に変換（ヘッダー名の生成に使用）
    ///
    /// 整数値は小数点なし、論理値は `TRUE` / `FALSE` になります。
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Number(n) => display_number(*n),
            CellValue::DateTime(dt) => display_number(dt.as_f64()),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// JSON値に変換
    ///
    /// 日付はシリアル値の数値として出力されます。空セルは `null` です。
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Number(n) => number_to_json(*n),
            CellValue::DateTime(dt) => number_to_json(dt.as_f64()),
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Empty => Value::Null,
        }
    }
}

fn display_number(n: f64) -> String {
    match number_to_json(n) {
        Value::Number(num) => num.to_string(),
        _ => n.to_string(),
    }
}

/// 数値をJSON値に変換
///
/// 整数かつ ±2^53 の範囲内なら整数、それ以外の有限値は浮動小数点数、
/// NaN・無限大は `null` になります。
pub(crate) fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// デコード済みのシート
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// シート名
    pub name: String,

    /// セルグリッド（行 × 列）。最初の非空セルを含む行・列から始まる
    pub rows: Vec<Vec<CellValue>>,

    /// グリッドの先頭列の絶対インデックス（0始まり）
    pub first_col: u32,
}

impl Sheet {
    /// 先頭列が A 列のシートを生成
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
            first_col: 0,
        }
    }

    /// 先頭列の絶対インデックスを指定
    pub fn with_first_col(mut self, first_col: u32) -> Self {
        self.first_col = first_col;
        self
    }
}

/// デコード済みのワークブック
///
/// シート名は一意で、ワークブック内の順序を保持します。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// 空のワークブックを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// シートを末尾に追加
    ///
    /// 同名のシートが既に存在する場合は `SheetJsonError::Config` を返します。
    pub fn push_sheet(&mut self, sheet: Sheet) -> Result<(), SheetJsonError> {
        if self.sheets.iter().any(|s| s.name == sheet.name) {
            return Err(SheetJsonError::Config(format!(
                "Duplicate sheet name '{}'",
                sheet.name
            )));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// シート名の一覧（ワークブック順）
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// 1行分のレコード
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum RowRecord {
    /// キー → 値 のオブジェクト（キーの順序は列順）
    Object(Map<String, Value>),

    /// 値の配列
    Array(Vec<Value>),
}

/// シート1枚分の変換結果
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// シート名
    pub name: String,

    /// 元の行順のレコード列
    pub records: Vec<RowRecord>,
}

/// 変換結果
///
/// シート名 → レコード列 のマッピングで、シートの順序はワークブック順です。
/// JSONにシリアライズすると `{"Sheet1":[...],"Sheet2":[...]}` になります。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResult {
    sheets: Vec<SheetTable>,
}

impl ConversionResult {
    pub(crate) fn new(sheets: Vec<SheetTable>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[SheetTable] {
        &self.sheets
    }

    /// シート名でレコード列を取得
    pub fn get(&self, sheet_name: &str) -> Option<&[RowRecord]> {
        self.sheets
            .iter()
            .find(|t| t.name == sheet_name)
            .map(|t| t.records.as_slice())
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl Serialize for ConversionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for table in &self.sheets {
            map.serialize_entry(&table.name, &table.records)?;
        }
        map.end()
    }
}
