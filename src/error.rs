//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// sheetjsonクレート全体で使用するエラー型
///
/// ファイルの読み込み、ワークブックのデコード、JSONへのシリアライズ、
/// ウィジェットのファイル選択処理中に発生するすべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Decode`: バイト列をスプレッドシートとしてデコードできなかったエラー（calamine由来）
/// - `Serialization`: JSONへのシリアライズに失敗したエラー
/// - `NoFileSelected`: ファイル選択イベントにファイルが含まれていなかった
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: 入力サイズ制限に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetjson::{ConverterBuilder, SheetJsonError};
///
/// let converter = ConverterBuilder::new().build()?;
/// match converter.convert(b"not a spreadsheet") {
///     Err(e) if e.is_decode_error() => eprintln!("壊れたファイル: {}", e),
///     Err(e) => return Err(e),
///     Ok(json) => println!("{}", json),
/// }
/// # Ok::<(), SheetJsonError>(())
/// ```
#[derive(Error, Debug)]
pub enum SheetJsonError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// バイト列をワークブックとしてデコードできなかったエラー
    ///
    /// ファイル形式が不正、破損したファイル、サポートされていない形式などが
    /// 原因となります。リトライしても結果は変わりません。
    #[error("Failed to decode spreadsheet: {0}")]
    Decode(#[from] calamine::Error),

    /// JSONへのシリアライズに失敗したエラー
    ///
    /// セル値の型が限定されているため、実際にはほぼ発生しません。
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// ファイル選択イベントにファイルが含まれていなかった
    #[error("No file selected")]
    NoFileSelected,

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時、または存在しないシートを選択した場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力サイズ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl SheetJsonError {
    /// デコードエラーかどうかを判定
    pub fn is_decode_error(&self) -> bool {
        matches!(self, SheetJsonError::Decode(_))
    }
}
