use serde::Serialize;
use serde_json::Value;

/// Тело `spreadsheets/{id}:batchUpdate`
#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub add_sheet: AddSheetRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSheetRequest {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub title: String,
    pub grid_properties: GridProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    pub row_count: u32,
    pub column_count: u32,
}

/// Тело `spreadsheets/{id}/values/{range}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    pub major_dimension: String,
    pub values: Vec<Vec<Value>>,
}
