//! sheetjson - Spreadsheet file picker backend
//!
//! This crate converts spreadsheet files (XLS/XLSX, decoded with calamine) into
//! JSON row records keyed by sheet name, and provides the widget adapter a
//! low-code host uses to expose the result as a bound output value.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sheetjson::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let bytes = std::fs::read("people.xlsx")?;
//!     let json = converter.convert(&bytes)?;
//!
//!     // {"Sheet1":[{"Name":"Alice","Age":30},{"Name":"Bob","Age":25}]}
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use sheetjson::{ConverterBuilder, DateMode, HeaderMode, OutputStyle, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Orders".to_string()))
//!         .with_header_mode(HeaderMode::FirstRow)
//!         .with_default_value("")
//!         .with_date_mode(DateMode::Iso8601)
//!         .with_output_style(OutputStyle::Pretty)
//!         .build()?;
//!
//!     let json = converter.convert_reader(std::fs::File::open("orders.xls")?)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! # Widget
//!
//! `ExcelUploader` implements the host lifecycle (`init`, `update_view`,
//! `get_outputs`, `destroy`) on top of a `Converter`. A file selection replaces
//! the `jsonOutput` / `fileName` outputs and notifies the host; a decode failure
//! leaves them untouched and sets `errorMessage` instead.

mod api;
mod builder;
mod error;
mod parser;
mod records;
mod security;
mod types;
mod widget;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod wasm;

// 公開API
pub use api::{DateMode, HeaderMode, OutputStyle, SheetSelector};
pub use builder::{Converter, ConverterBuilder};
pub use error::SheetJsonError;
pub use parser::{CalamineCodec, SpreadsheetCodec};
pub use types::{CellValue, ConversionResult, RowRecord, Sheet, SheetTable, Workbook};
pub use widget::{
    ControlContext, ControlState, DetachedTarget, ExcelUploader, FilePicker, NotifyOutputChanged,
    ReadTicket, RenderTarget, SelectedFile, SelectionOutcome, StandardControl, UploadResult,
    UploaderOutputs,
};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use wasm::{convert_excel_to_json, WasmExcelUploader};
