use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "icono", default)]
    pub icon: Option<String>,
    /// restaurante、bar、cafe、discoteca 等
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
}

impl Resource for Category {
    const PATH: &'static str = "categorias";
    const ITEM_KEY: &'static str = "categoria";
}
