//! Widget Module
//!
//! ローコードプラットフォームのホストが呼び出すライフサイクル（init / updateView /
//! getOutputs / destroy）を実装するアダプター層。
//! 実際の処理はすべて `Converter` に委譲し、このモジュールはファイル選択の状態管理と
//! ホストへの通知のみを担当します。

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::builder::Converter;
use crate::error::SheetJsonError;
use crate::parser::{CalamineCodec, SpreadsheetCodec};

/// 出力値の変更をホストに通知するコールバック
pub type NotifyOutputChanged = Box<dyn FnMut()>;

/// セッション内でホストが保持する状態（このウィジェットは使用しない）
pub type ControlState = Map<String, Value>;

/// ホストから渡されるプロパティ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlContext {
    /// コントロールが無効化されているか
    pub is_control_disabled: bool,
}

/// ファイル選択UIの定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePicker {
    /// 非表示のfile inputのID
    pub input_id: String,

    /// 受け付ける拡張子
    pub accept: String,

    /// ボタンとして表示するラベル
    pub label: String,

    /// ラベルのCSSクラス名
    pub class_name: String,
}

impl Default for FilePicker {
    fn default() -> Self {
        Self {
            input_id: "fileInput".to_string(),
            accept: ".xls,.xlsx".to_string(),
            label: "Choose File".to_string(),
            class_name: "custom-file-upload".to_string(),
        }
    }
}

/// ホストが用意する描画先
pub trait RenderTarget {
    /// ファイル選択UIを描画する
    fn mount_file_picker(&mut self, picker: &FilePicker);

    /// ファイル選択UIの有効・無効を切り替える
    fn set_disabled(&mut self, disabled: bool);

    /// 選択済みのファイルをクリアし、同じファイルを再選択できるようにする
    fn reset_file_input(&mut self);

    /// 描画したUIを取り除く
    fn unmount(&mut self);
}

/// DOMをホスト側で管理する場合の描画先（何もしない）
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedTarget;

impl RenderTarget for DetachedTarget {
    fn mount_file_picker(&mut self, _picker: &FilePicker) {}
    fn set_disabled(&mut self, _disabled: bool) {}
    fn reset_file_input(&mut self) {}
    fn unmount(&mut self) {}
}

/// ホストのコントロール契約
pub trait StandardControl {
    type Outputs;

    /// UIを構築し、通知コールバックを保持する
    fn init(
        &mut self,
        context: &ControlContext,
        notify_output_changed: NotifyOutputChanged,
        state: &ControlState,
        container: Box<dyn RenderTarget>,
    );

    /// プロパティが変更されたときに呼び出される
    fn update_view(&mut self, context: &ControlContext);

    /// ホストが出力値を取得する
    fn get_outputs(&self) -> Self::Outputs;

    /// UIリソースを解放する
    fn destroy(&mut self);
}

/// ユーザーが選択し、メモリに読み込まれたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// 表示名
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// 1回のファイル選択から得られた出力値
///
/// 変換ごとに新しい値が生成され、ウィジェットは前の値を丸ごと置き換えます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    json_output: String,
    file_name: String,
}

impl UploadResult {
    pub(crate) fn new(json_output: String, file_name: String) -> Self {
        Self {
            json_output,
            file_name,
        }
    }

    pub fn json_output(&self) -> &str {
        &self.json_output
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// ホストに返す出力値
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploaderOutputs {
    /// 変換結果のJSON
    pub json_output: String,

    /// 元のファイル名
    pub file_name: String,

    /// 直近のファイル選択が失敗した場合のエラーメッセージ（成功時は空）
    pub error_message: String,
}

/// 読み込み中のファイルを識別するチケット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadTicket(u64);

/// ファイル選択の処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// 出力値が更新された
    Updated,

    /// ファイルが選択されていなかった（何もしない）
    NoFile,

    /// 読み込み中に新しい選択・キャンセル・破棄が行われたため結果を破棄した
    Superseded,
}

#[derive(Debug)]
struct PendingRead {
    ticket: ReadTicket,
    file_name: String,
}

/// スプレッドシートのファイル選択ウィジェット
///
/// ファイル選択 → 読み込み → 変換 → 出力値の保存 → ホストへの通知 を行います。
/// 読み込みは非同期で行われる想定のため、`begin_read` と `complete_read` に分かれています。
/// 同時に処理される読み込みは1つだけで、新しい読み込みを開始すると古いものは破棄されます。
///
/// # 使用例
///
/// ```rust
/// use sheetjson::{
///     ControlContext, ControlState, ConverterBuilder, DetachedTarget, ExcelUploader,
///     SelectionOutcome, StandardControl,
/// };
///
/// # fn main() -> Result<(), sheetjson::SheetJsonError> {
/// let mut uploader = ExcelUploader::new(ConverterBuilder::new().build()?);
/// uploader.init(
///     &ControlContext::default(),
///     Box::new(|| println!("outputs changed")),
///     &ControlState::new(),
///     Box::new(DetachedTarget),
/// );
///
/// // ファイルが選択されなかった場合は何もしない
/// assert_eq!(uploader.handle_file(None)?, SelectionOutcome::NoFile);
/// assert_eq!(uploader.get_outputs().json_output, "");
/// # Ok(())
/// # }
/// ```
pub struct ExcelUploader<C = CalamineCodec> {
    converter: Converter<C>,
    picker: FilePicker,
    notify_output_changed: Option<NotifyOutputChanged>,
    container: Option<Box<dyn RenderTarget>>,
    current: Option<UploadResult>,
    last_error: Option<String>,
    pending: Option<PendingRead>,
    next_ticket: u64,
}

impl<C> fmt::Debug for ExcelUploader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcelUploader")
            .field("picker", &self.picker)
            .field("current", &self.current)
            .field("last_error", &self.last_error)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<C: SpreadsheetCodec> ExcelUploader<C> {
    pub fn new(converter: Converter<C>) -> Self {
        Self {
            converter,
            picker: FilePicker::default(),
            notify_output_changed: None,
            container: None,
            current: None,
            last_error: None,
            pending: None,
            next_ticket: 0,
        }
    }

    /// ファイル選択UIの定義を差し替える
    pub fn with_file_picker(mut self, picker: FilePicker) -> Self {
        self.picker = picker;
        self
    }

    /// 直近に成功した変換結果
    pub fn current(&self) -> Option<&UploadResult> {
        self.current.as_ref()
    }

    /// 読み込み中のファイルがあるか
    pub fn is_reading(&self) -> bool {
        self.pending.is_some()
    }

    /// ファイルの読み込みを開始する
    ///
    /// 読み込み中のファイルがある場合、そのチケットは無効になります。
    pub fn begin_read(&mut self, file_name: impl Into<String>) -> ReadTicket {
        let ticket = ReadTicket(self.next_ticket);
        self.next_ticket += 1;

        if let Some(previous) = self.pending.take() {
            debug!(file = %previous.file_name, "superseding in-flight read");
        }

        let file_name = file_name.into();
        debug!(file = %file_name, ticket = ticket.0, "reading selected file");
        self.pending = Some(PendingRead { ticket, file_name });
        ticket
    }

    /// 読み込み完了したバイト列を変換し、出力値を更新する
    ///
    /// 成功した場合は出力値を置き換えてホストに通知します。
    /// 変換に失敗した場合は出力値を変更せず、`errorMessage` を設定してホストに通知した上で
    /// エラーを返します。無効になったチケットの結果は無視されます。
    pub fn complete_read(
        &mut self,
        ticket: ReadTicket,
        bytes: &[u8],
    ) -> Result<SelectionOutcome, SheetJsonError> {
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                debug!(ticket = ticket.0, "discarding stale read");
                return Ok(SelectionOutcome::Superseded);
            }
        };

        if let Some(container) = self.container.as_mut() {
            container.reset_file_input();
        }

        let file = SelectedFile::new(pending.file_name, bytes.to_vec());
        match self.converter.convert_file(&file) {
            Ok(result) => {
                self.current = Some(result);
                self.last_error = None;
                self.notify();
                Ok(SelectionOutcome::Updated)
            }
            Err(e) => {
                warn!(file = %file.name(), error = %e, "failed to convert selected file");
                self.last_error = Some(e.to_string());
                self.notify();
                Err(e)
            }
        }
    }

    /// 読み込み中のファイルを破棄する
    pub fn cancel_read(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(file = %pending.file_name, "cancelled in-flight read");
        }
    }

    /// 読み込み済みのファイル選択を処理する
    ///
    /// `None` の場合（ファイル未選択）は出力値を変更せず、通知も行いません。
    pub fn handle_file(
        &mut self,
        file: Option<SelectedFile>,
    ) -> Result<SelectionOutcome, SheetJsonError> {
        let file = match file {
            Some(file) => file,
            None => {
                debug!("{}; ignoring selection event", SheetJsonError::NoFileSelected);
                return Ok(SelectionOutcome::NoFile);
            }
        };

        let ticket = self.begin_read(file.name());
        self.complete_read(ticket, file.bytes())
    }

    fn notify(&mut self) {
        if let Some(notify) = self.notify_output_changed.as_mut() {
            notify();
        }
    }
}

impl<C: SpreadsheetCodec> StandardControl for ExcelUploader<C> {
    type Outputs = UploaderOutputs;

    fn init(
        &mut self,
        context: &ControlContext,
        notify_output_changed: NotifyOutputChanged,
        _state: &ControlState,
        mut container: Box<dyn RenderTarget>,
    ) {
        container.mount_file_picker(&self.picker);
        container.set_disabled(context.is_control_disabled);

        self.notify_output_changed = Some(notify_output_changed);
        self.container = Some(container);
    }

    fn update_view(&mut self, context: &ControlContext) {
        trace!(disabled = context.is_control_disabled, "update view");
        if let Some(container) = self.container.as_mut() {
            container.set_disabled(context.is_control_disabled);
        }
    }

    fn get_outputs(&self) -> UploaderOutputs {
        let (json_output, file_name) = match &self.current {
            Some(result) => (result.json_output.clone(), result.file_name.clone()),
            None => (String::new(), String::new()),
        };

        UploaderOutputs {
            json_output,
            file_name,
            error_message: self.last_error.clone().unwrap_or_default(),
        }
    }

    fn destroy(&mut self) {
        self.cancel_read();
        if let Some(mut container) = self.container.take() {
            container.unmount();
        }
        self.notify_output_changed = None;
    }
}
