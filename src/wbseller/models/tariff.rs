use serde::{Deserialize, Serialize};

use crate::util::non_empty;

/// Ответ метода `GET /api/v1/tariffs/box`.
/// Без `response.data` ответ считается ошибкой разбора
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TariffsBoxResponse {
    pub response: TariffsBoxEnvelope,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TariffsBoxEnvelope {
    pub data: TariffsBoxData,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffsBoxData {
    #[serde(rename = "dtNextBox")]
    pub dt_next_box: String,

    #[serde(rename = "dtTillMax")]
    pub dt_till_max: String,

    #[serde(rename = "warehouseList")]
    pub warehouse_list: Vec<WarehouseEntry>,
}

/// Тарифы одного склада. Значения приходят строками ("48", "11,2") и так же хранятся
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseEntry {
    #[serde(rename = "warehouseName")]
    pub warehouse_name: String,

    #[serde(rename = "boxDeliveryAndStorageExpr")]
    pub delivery_and_storage_expr: String,

    #[serde(rename = "boxDeliveryBase")]
    pub delivery_base: String,

    #[serde(rename = "boxDeliveryLiter")]
    pub delivery_liter: String,

    #[serde(rename = "boxStorageBase")]
    pub storage_base: String,

    #[serde(rename = "boxStorageLiter")]
    pub storage_liter: String,
}

/// Снимок тарифов за один день, готовый к сохранению
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TariffSnapshot {
    pub next_box_date: Option<String>,
    pub till_max_date: Option<String>,
    pub warehouses: Vec<WarehouseEntry>,
}

impl From<TariffsBoxResponse> for TariffSnapshot {
    fn from(value: TariffsBoxResponse) -> Self {
        let data = value.response.data;
        Self {
            next_box_date: non_empty(&data.dt_next_box),
            till_max_date: non_empty(&data.dt_till_max),
            warehouses: data.warehouse_list,
        }
    }
}
