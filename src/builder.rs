//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::api::{DateMode, HeaderMode, OutputStyle, SheetSelector};
use crate::error::SheetJsonError;
use crate::parser::{CalamineCodec, SpreadsheetCodec};
use crate::records::{convert_sheets, RecordOptions};
use crate::security::SecurityConfig;
use crate::types::{ConversionResult, Sheet, Workbook};
use crate::widget::{SelectedFile, UploadResult};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 行レコードへの変換設定
    pub records: RecordOptions,

    /// JSON出力のスタイル
    pub output_style: OutputStyle,

    /// 入力サイズ制限
    pub security: SecurityConfig,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
/// デコーダーは既定で `CalamineCodec` です。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetjson::{ConverterBuilder, DateMode, SheetSelector};
///
/// # fn main() -> Result<(), sheetjson::SheetJsonError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_date_mode(DateMode::Iso8601)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder<C = CalamineCodec> {
    /// 内部設定（構築中）
    config: ConversionConfig,

    codec: C,
}

impl Default for ConverterBuilder<CalamineCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder<CalamineCodec> {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート（ワークブック順）
    /// - ヘッダー: 最初の非空行
    /// - 空セル: 省略
    /// - 空行: スキップ
    /// - 日付: シリアル値
    /// - 出力: 1行JSON
    /// - 入力サイズ上限: 100MB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
            codec: CalamineCodec,
        }
    }
}

impl<C: SpreadsheetCodec> ConverterBuilder<C> {
    /// 変換対象のシートを選択する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetjson::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Names(vec!["Orders".to_string()]));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 行レコードのキーの決め方を指定する
    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.config.records.header_mode = mode;
        self
    }

    /// 空セルを埋める値を指定する
    ///
    /// 指定しない場合、空セルはレコードから省略されます（配列モードでは `null`）。
    /// 値は文字列・数値・論理値・`null` のいずれかでなければなりません。
    ///
    /// ```rust,no_run
    /// use sheetjson::ConverterBuilder;
    ///
    /// let builder = ConverterBuilder::new().with_default_value("");
    /// ```
    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.config.records.default_value = Some(value.into());
        self
    }

    /// 空行を出力に含めるかを指定する
    ///
    /// 指定しない場合、`HeaderMode::RowArrays` では含め、それ以外ではスキップします。
    pub fn include_blank_rows(mut self, include: bool) -> Self {
        self.config.records.blank_rows = Some(include);
        self
    }

    /// 日付セルの出力形式を指定する
    pub fn with_date_mode(mut self, mode: DateMode) -> Self {
        self.config.records.date_mode = mode;
        self
    }

    /// JSON出力のスタイルを指定する
    pub fn with_output_style(mut self, style: OutputStyle) -> Self {
        self.config.output_style = style;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// デコーダーを差し替える
    ///
    /// テストでは固定のワークブックを返すデコーダーを使用できます。
    pub fn with_codec<D: SpreadsheetCodec>(self, codec: D) -> ConverterBuilder<D> {
        ConverterBuilder {
            config: self.config,
            codec,
        }
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetJsonError::Config(String)`: 設定の検証に失敗した場合
    ///   * 入力サイズ上限が0
    ///   * 空のシート選択リスト
    ///   * 配列・オブジェクトのデフォルト値
    pub fn build(self) -> Result<Converter<C>, SheetJsonError> {
        // 1. 入力サイズ上限の検証
        if self.config.security.max_input_file_size == 0 {
            return Err(SheetJsonError::Config(
                "Maximum input size must be greater than zero".to_string(),
            ));
        }

        // 2. シート選択の検証
        match &self.config.sheet_selector {
            SheetSelector::Indices(indices) if indices.is_empty() => {
                return Err(SheetJsonError::Config(
                    "Empty sheet index list".to_string(),
                ));
            }
            SheetSelector::Names(names) if names.is_empty() => {
                return Err(SheetJsonError::Config("Empty sheet name list".to_string()));
            }
            _ => {}
        }

        // 3. デフォルト値の検証
        if let Some(value) = &self.config.records.default_value {
            if value.is_array() || value.is_object() {
                return Err(SheetJsonError::Config(format!(
                    "Default value must be a scalar, got {}",
                    value
                )));
            }
        }

        Ok(Converter {
            config: self.config,
            codec: self.codec,
        })
    }
}

/// 変換処理のファサード
///
/// スプレッドシートのバイト列を `{シート名: [レコード, ...]}` 形式のJSONに変換します。
/// 変換は状態を持たない純粋関数で、同じバイト列からは常に同じ文字列が得られます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetjson::ConverterBuilder;
///
/// # fn main() -> Result<(), sheetjson::SheetJsonError> {
/// let converter = ConverterBuilder::new().build()?;
/// let bytes = std::fs::read("people.xlsx")?;
/// let json = converter.convert(&bytes)?;
/// // {"Sheet1":[{"Name":"Alice","Age":30},{"Name":"Bob","Age":25}]}
/// println!("{}", json);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter<C = CalamineCodec> {
    /// 変換設定
    config: ConversionConfig,

    codec: C,
}

impl<C: SpreadsheetCodec> Converter<C> {
    /// バイト列をJSON文字列に変換
    ///
    /// # 処理フロー
    ///
    /// 1. 入力サイズの検証
    /// 2. デコーダーでワークブックに変換
    /// 3. シート選択
    /// 4. 各シートを行レコードに変換
    /// 5. JSONにシリアライズ
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetJsonError::Decode`: スプレッドシートとして解析できない場合
    /// * `SheetJsonError::SecurityViolation`: 入力サイズ上限を超えた場合
    /// * `SheetJsonError::Config`: 選択したシートが存在しない場合
    pub fn convert(&self, bytes: &[u8]) -> Result<String, SheetJsonError> {
        let result = self.convert_to_result(bytes)?;
        self.serialize(&result)
    }

    /// バイト列を変換結果（シリアライズ前）に変換
    pub fn convert_to_result(&self, bytes: &[u8]) -> Result<ConversionResult, SheetJsonError> {
        self.config.security.check_input_size(bytes.len() as u64)?;
        let workbook = self.codec.decode(bytes)?;
        self.convert_workbook(&workbook)
    }

    /// デコード済みのワークブックを変換結果に変換
    pub fn convert_workbook(&self, workbook: &Workbook) -> Result<ConversionResult, SheetJsonError> {
        let selected = select_sheets(workbook, &self.config.sheet_selector)?;
        let tables = convert_sheets(&selected, &self.config.records);

        for table in &tables {
            debug!(sheet = %table.name, records = table.records.len(), "converted sheet");
        }

        Ok(ConversionResult::new(tables))
    }

    /// 変換結果をJSON文字列にシリアライズ
    pub fn serialize(&self, result: &ConversionResult) -> Result<String, SheetJsonError> {
        let text = match self.config.output_style {
            OutputStyle::Compact => serde_json::to_string(result)?,
            OutputStyle::Pretty => serde_json::to_string_pretty(result)?,
        };
        Ok(text)
    }

    /// リーダーの内容をすべて読み込んでJSON文字列に変換
    pub fn convert_reader<R: Read>(&self, reader: R) -> Result<String, SheetJsonError> {
        let bytes = self.config.security.read_limited(reader)?;
        self.convert(&bytes)
    }

    /// 選択されたファイルを変換し、ウィジェットの出力値を生成
    pub fn convert_file(&self, file: &SelectedFile) -> Result<UploadResult, SheetJsonError> {
        let json_output = self.convert(file.bytes())?;
        info!(
            file = %file.name(),
            bytes = file.bytes().len(),
            "converted selected file"
        );
        Ok(UploadResult::new(json_output, file.name().to_string()))
    }

    /// ファイルパスからファイルを読み込む（入力サイズ上限を適用）
    ///
    /// 表示名にはパスのファイル名部分を使用します。
    pub fn read_selected_file(&self, path: impl AsRef<Path>) -> Result<SelectedFile, SheetJsonError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.config
            .security
            .check_input_size(file.metadata()?.len())?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = self.config.security.read_limited(file)?;
        Ok(SelectedFile::new(name, bytes))
    }
}

/// シート選択方式に基づいてシートを選択
///
/// `All` はワークブック順、それ以外は指定順です。重複した指定は最初の1つのみ残します。
fn select_sheets(workbook: &Workbook, selector: &SheetSelector) -> Result<Vec<Sheet>, SheetJsonError> {
    let sheets = workbook.sheets();

    let by_index = |index: usize| {
        sheets.get(index).ok_or_else(|| {
            SheetJsonError::Config(format!(
                "Sheet index {} is out of range (total: {})",
                index,
                sheets.len()
            ))
        })
    };
    let by_name = |name: &str| {
        sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SheetJsonError::Config(format!("Sheet '{}' not found", name)))
    };

    let picked: Vec<&Sheet> = match selector {
        SheetSelector::All => sheets.iter().collect(),
        SheetSelector::Index(index) => vec![by_index(*index)?],
        SheetSelector::Name(name) => vec![by_name(name.as_str())?],
        SheetSelector::Indices(indices) => indices
            .iter()
            .map(|&i| by_index(i))
            .collect::<Result<_, _>>()?,
        SheetSelector::Names(names) => names
            .iter()
            .map(|n| by_name(n.as_str()))
            .collect::<Result<_, _>>()?,
    };

    let mut selected: Vec<Sheet> = Vec::with_capacity(picked.len());
    for sheet in picked {
        if !selected.iter().any(|s| s.name == sheet.name) {
            selected.push(sheet.clone());
        }
    }
    Ok(selected)
}
