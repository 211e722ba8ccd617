//! WebAssembly bindings
//!
//! ブラウザ上のホストから変換処理とファイル選択ウィジェットを利用するためのバインディング。
//! DOMの構築はホスト側（JavaScript）が行い、読み込んだバイト列をこのモジュールに渡します。

use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::builder::ConverterBuilder;
use crate::widget::{
    ControlContext, ControlState, DetachedTarget, ExcelUploader, SelectedFile, StandardControl,
};

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// スプレッドシートのバイト列をJSON文字列に変換
///
/// # Arguments
/// * `excel_bytes` - ファイルの内容（JavaScriptのUint8Array）
///
/// # Returns
/// * Success: `{"Sheet1":[...]}` 形式のJSON文字列
/// * Error: エラーメッセージ
#[wasm_bindgen]
pub fn convert_excel_to_json(excel_bytes: &[u8]) -> Result<String, JsValue> {
    let converter = ConverterBuilder::new().build().map_err(to_js_error)?;
    converter.convert(excel_bytes).map_err(to_js_error)
}

/// ホストから利用するファイル選択ウィジェット
#[wasm_bindgen]
pub struct WasmExcelUploader {
    inner: ExcelUploader,
}

#[wasm_bindgen]
impl WasmExcelUploader {
    /// ウィジェットを生成し、出力変更時に呼び出す関数を登録する
    #[wasm_bindgen(constructor)]
    pub fn new(notify_output_changed: js_sys::Function) -> Result<WasmExcelUploader, JsValue> {
        let converter = ConverterBuilder::new().build().map_err(to_js_error)?;
        let mut inner = ExcelUploader::new(converter);
        inner.init(
            &ControlContext::default(),
            Box::new(move || {
                if let Err(e) = notify_output_changed.call0(&JsValue::NULL) {
                    warn!(error = ?e, "notifyOutputChanged callback threw");
                }
            }),
            &ControlState::new(),
            Box::new(DetachedTarget),
        );
        Ok(WasmExcelUploader { inner })
    }

    /// 読み込み済みのファイルを処理する
    ///
    /// 変換に失敗した場合はエラーメッセージを投げます（出力値は変更されません）。
    #[wasm_bindgen(js_name = handleFile)]
    pub fn handle_file(&mut self, file_name: String, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner
            .handle_file(Some(SelectedFile::new(file_name, bytes.to_vec())))
            .map(|_| ())
            .map_err(to_js_error)
    }

    #[wasm_bindgen(getter, js_name = jsonOutput)]
    pub fn json_output(&self) -> String {
        self.inner.get_outputs().json_output
    }

    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.inner.get_outputs().file_name
    }

    #[wasm_bindgen(getter, js_name = errorMessage)]
    pub fn error_message(&self) -> String {
        self.inner.get_outputs().error_message
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }
}

/// バージョン情報
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
