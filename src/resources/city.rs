use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "departamento", default)]
    pub department: Option<String>,
    #[serde(rename = "imagen_url", default)]
    pub image_url: Option<String>,
}

impl Resource for City {
    const PATH: &'static str = "ciudades";
    const ITEM_KEY: &'static str = "ciudad";
}
