use chrono::NaiveDate;
use serde_json::Value;
use std::{fs, path::PathBuf};

/// # Errors
///
/// Will return `Err` if the file is not readable or is not a json object
pub fn check_readable_file_and_json(file: &str) -> Result<Value, String> {
    let path = PathBuf::from(file);
    if !path.is_file() || fs::metadata(&path).is_err() {
        return Err(format!("The json file '{file}' is not readable."));
    }
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("The json file '{file}' is not readable: {e}"))?;
    let json: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("The json file '{file}' is not valid json: {e}"))?;
    if !json.is_object() {
        return Err(format!(
            "The json file '{file}' must hold an object with statusCode and body."
        ));
    }
    Ok(json)
}

/// # Errors
///
/// Will return `Err` if the date is not formatted as YYYY-MM-DD
pub fn check_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("'{value}' is not a YYYY-MM-DD date: {e}"))
}
