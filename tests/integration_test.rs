//! Integration Tests for sheetjson
//!
//! 実際のXLSXファイル（rust_xlsxwriterでメモリ上に生成）を使用して、
//! バイト列 → JSON の変換とウィジェットの動作を検証します。

use rust_xlsxwriter::*;
use serde_json::{json, Value};
use sheetjson::{
    ControlContext, ControlState, ConverterBuilder, DateMode, DetachedTarget, ExcelUploader,
    HeaderMode, SelectedFile, SelectionOutcome, SheetJsonError, SheetSelector, StandardControl,
};
use std::cell::Cell;
use std::rc::Rc;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// Sheet1: Name,Age / Alice,30 / Bob,25
    pub fn generate_people() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "Name")?;
        worksheet.write_string(0, 1, "Age")?;
        worksheet.write_string(1, 0, "Alice")?;
        worksheet.write_number(1, 1, 30)?;
        worksheet.write_string(2, 0, "Bob")?;
        worksheet.write_number(2, 1, 25)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a workbook whose sheet order is not alphabetical
    pub fn generate_multi_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        for name in ["Zeta", "Alpha", "Mid"] {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name)?;
            sheet.write_string(0, 0, "Sheet")?;
            sheet.write_string(1, 0, name)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Header row [h1,h2,h3] with two data rows
    pub fn generate_three_columns() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let rows = [["h1", "h2", "h3"], ["a", "b", "c"], ["d", "e", "f"]];
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet.write_string(r as u32, c as u16, *value)?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Mixed cell types, a gap in the middle and a blank row
    pub fn generate_mixed_types() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Mixed")?;

        worksheet.write_string(0, 0, "Item")?;
        worksheet.write_string(0, 1, "Price")?;
        worksheet.write_string(0, 2, "InStock")?;

        worksheet.write_string(1, 0, "Pen")?;
        worksheet.write_number(1, 1, 1.25)?;
        worksheet.write_boolean(1, 2, true)?;

        // row 2 is blank

        worksheet.write_string(3, 0, "Ink")?;
        worksheet.write_boolean(3, 2, false)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Table starting at C3 instead of A1
    pub fn generate_offset_table() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(2, 2, "Key")?;
        worksheet.write_string(2, 3, "Value")?;
        worksheet.write_string(3, 2, "k1")?;
        worksheet.write_number(3, 3, 1)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Date cells with a date number format
    pub fn generate_dates() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        worksheet.write_string(0, 0, "When")?;
        let date = ExcelDateTime::from_ymd(2024, 1, 1)?;
        worksheet.write_datetime_with_format(1, 0, &date, &date_format)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// A date cell next to an elapsed-time cell formatted as `[h]:mm:ss`
    pub fn generate_dates_and_durations() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let duration_format = Format::new().set_num_format("[h]:mm:ss");

        worksheet.write_string(0, 0, "When")?;
        worksheet.write_string(0, 1, "Elapsed")?;
        let date = ExcelDateTime::from_ymd(2024, 1, 1)?;
        worksheet.write_datetime_with_format(1, 0, &date, &date_format)?;
        worksheet.write_number_with_format(1, 1, 1.5, &duration_format)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// A workbook with an empty sheet next to a populated one
    pub fn generate_with_empty_sheet() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let empty = workbook.add_worksheet();
        empty.set_name("EmptySheet")?;

        let data = workbook.add_worksheet();
        data.set_name("Data")?;
        data.write_string(0, 0, "A")?;
        data.write_number(1, 0, 1)?;

        Ok(workbook.save_to_buffer()?)
    }
}

fn parse(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_people_scenario_exact_output() {
    let data = fixtures::generate_people().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let json = converter.convert(&data).unwrap();

    assert_eq!(
        json,
        r#"{"Sheet1":[{"Name":"Alice","Age":30},{"Name":"Bob","Age":25}]}"#
    );
}

#[test]
fn test_sheet_order_is_preserved() {
    let data = fixtures::generate_multi_sheets().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let result = converter.convert_to_result(&data).unwrap();
    assert_eq!(result.sheet_names(), vec!["Zeta", "Alpha", "Mid"]);

    let json = converter.convert(&data).unwrap();
    let keys: Vec<String> = match parse(&json) {
        Value::Object(map) => map.keys().cloned().collect(),
        other => panic!("Expected object, got {}", other),
    };
    assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_row_fidelity() {
    let data = fixtures::generate_three_columns().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let json = converter.convert(&data).unwrap();

    assert_eq!(
        parse(&json),
        json!({"Sheet1": [
            {"h1": "a", "h2": "b", "h3": "c"},
            {"h1": "d", "h2": "e", "h3": "f"}
        ]})
    );
}

#[test]
fn test_conversion_is_deterministic() {
    let data = fixtures::generate_mixed_types().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let first = converter.convert(&data).unwrap();
    let second = converter.convert(&data).unwrap();
    assert_eq!(first, second);

    let other_converter = ConverterBuilder::new().build().unwrap();
    assert_eq!(first, other_converter.convert(&data).unwrap());
}

#[test]
fn test_mixed_types_and_blank_rows() {
    let data = fixtures::generate_mixed_types().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let json = converter.convert(&data).unwrap();
    assert_eq!(
        json,
        r#"{"Mixed":[{"Item":"Pen","Price":1.25,"InStock":true},{"Item":"Ink","InStock":false}]}"#
    );
}

#[test]
fn test_default_value_and_blank_rows() {
    let data = fixtures::generate_mixed_types().unwrap();
    let converter = ConverterBuilder::new()
        .with_default_value(Value::Null)
        .include_blank_rows(true)
        .build()
        .unwrap();

    let json = converter.convert(&data).unwrap();
    assert_eq!(
        parse(&json),
        json!({"Mixed": [
            {"Item": "Pen", "Price": 1.25, "InStock": true},
            {"Item": null, "Price": null, "InStock": null},
            {"Item": "Ink", "Price": null, "InStock": false}
        ]})
    );
}

#[test]
fn test_offset_table_header_detection() {
    let data = fixtures::generate_offset_table().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    assert_eq!(
        converter.convert(&data).unwrap(),
        r#"{"Sheet1":[{"Key":"k1","Value":1}]}"#
    );
}

#[test]
fn test_column_letters_use_sheet_columns() {
    let data = fixtures::generate_offset_table().unwrap();
    let converter = ConverterBuilder::new()
        .with_header_mode(HeaderMode::ColumnLetters)
        .build()
        .unwrap();

    assert_eq!(
        parse(&converter.convert(&data).unwrap()),
        json!({"Sheet1": [{"C": "Key", "D": "Value"}, {"C": "k1", "D": 1}]})
    );
}

#[test]
fn test_row_arrays() {
    let data = fixtures::generate_people().unwrap();
    let converter = ConverterBuilder::new()
        .with_header_mode(HeaderMode::RowArrays)
        .build()
        .unwrap();

    assert_eq!(
        converter.convert(&data).unwrap(),
        r#"{"Sheet1":[["Name","Age"],["Alice",30],["Bob",25]]}"#
    );
}

#[test]
fn test_dates_serial_and_iso() {
    let data = fixtures::generate_dates().unwrap();

    let serial = ConverterBuilder::new().build().unwrap();
    assert_eq!(
        serial.convert(&data).unwrap(),
        r#"{"Sheet1":[{"When":45292}]}"#
    );

    let iso = ConverterBuilder::new()
        .with_date_mode(DateMode::Iso8601)
        .build()
        .unwrap();
    assert_eq!(
        iso.convert(&data).unwrap(),
        r#"{"Sheet1":[{"When":"2024-01-01"}]}"#
    );
}

#[test]
fn test_durations_stay_numbers_in_iso_mode() {
    let data = fixtures::generate_dates_and_durations().unwrap();

    let iso = ConverterBuilder::new()
        .with_date_mode(DateMode::Iso8601)
        .build()
        .unwrap();
    assert_eq!(
        iso.convert(&data).unwrap(),
        r#"{"Sheet1":[{"When":"2024-01-01","Elapsed":1.5}]}"#
    );

    let serial = ConverterBuilder::new().build().unwrap();
    assert_eq!(
        serial.convert(&data).unwrap(),
        r#"{"Sheet1":[{"When":45292,"Elapsed":1.5}]}"#
    );
}

#[test]
fn test_empty_sheet_is_kept_with_no_records() {
    let data = fixtures::generate_with_empty_sheet().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    assert_eq!(
        converter.convert(&data).unwrap(),
        r#"{"EmptySheet":[],"Data":[{"A":1}]}"#
    );
}

#[test]
fn test_sheet_selection() {
    let data = fixtures::generate_multi_sheets().unwrap();
    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Alpha".to_string()))
        .build()
        .unwrap();
    assert_eq!(
        converter.convert(&data).unwrap(),
        r#"{"Alpha":[{"Sheet":"Alpha"}]}"#
    );

    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Missing".to_string()))
        .build()
        .unwrap();
    assert!(matches!(
        converter.convert(&data),
        Err(SheetJsonError::Config(_))
    ));
}

#[test]
fn test_invalid_bytes_fail_with_decode_error() {
    let converter = ConverterBuilder::new().build().unwrap();

    let result = converter.convert(b"Name,Age\nAlice,30\n");
    match result {
        Err(e) => assert!(e.is_decode_error(), "unexpected error: {:?}", e),
        Ok(json) => panic!("Expected DecodeError, got {}", json),
    }
}

#[test]
fn test_truncated_xlsx_fails_with_decode_error() {
    let data = fixtures::generate_people().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let truncated = &data[..data.len() / 2];
    assert!(matches!(
        converter.convert(truncated),
        Err(SheetJsonError::Decode(_))
    ));
}

#[test]
fn test_read_selected_file_from_disk() {
    let data = fixtures::generate_people().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xlsx");
    std::fs::write(&path, &data).unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let file = converter.read_selected_file(&path).unwrap();
    assert_eq!(file.name(), "people.xlsx");

    let result = converter.convert_file(&file).unwrap();
    assert_eq!(result.file_name(), "people.xlsx");
    assert_eq!(
        result.json_output(),
        r#"{"Sheet1":[{"Name":"Alice","Age":30},{"Name":"Bob","Age":25}]}"#
    );
}

#[test]
fn test_widget_end_to_end() {
    let notified = Rc::new(Cell::new(0));
    let counter = Rc::clone(&notified);

    let mut uploader = ExcelUploader::new(ConverterBuilder::new().build().unwrap());
    uploader.init(
        &ControlContext::default(),
        Box::new(move || counter.set(counter.get() + 1)),
        &ControlState::new(),
        Box::new(DetachedTarget),
    );

    // ファイル未選択: 何も起きない
    assert_eq!(uploader.handle_file(None).unwrap(), SelectionOutcome::NoFile);
    assert_eq!(notified.get(), 0);

    // 正常なファイル
    let ticket = uploader.begin_read("people.xlsx");
    let data = fixtures::generate_people().unwrap();
    assert_eq!(
        uploader.complete_read(ticket, &data).unwrap(),
        SelectionOutcome::Updated
    );
    assert_eq!(notified.get(), 1);
    let outputs = uploader.get_outputs();
    assert_eq!(outputs.file_name, "people.xlsx");
    assert_eq!(
        outputs.json_output,
        r#"{"Sheet1":[{"Name":"Alice","Age":30},{"Name":"Bob","Age":25}]}"#
    );

    // 壊れたファイル: 出力値は変わらず、エラーが報告される
    let result = uploader.handle_file(Some(SelectedFile::new("broken.xlsx", vec![0u8; 64])));
    assert!(matches!(result, Err(SheetJsonError::Decode(_))));
    assert_eq!(notified.get(), 2);
    let after = uploader.get_outputs();
    assert_eq!(after.json_output, outputs.json_output);
    assert_eq!(after.file_name, "people.xlsx");
    assert!(!after.error_message.is_empty());

    uploader.destroy();
}
