use serde::{Deserialize, Serialize};

use super::{Resource, ResourceOperations};
use crate::pagination::{Aggregated, Progress};

/// 场所：餐厅、酒吧、咖啡馆、夜店
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "ciudad_id", default)]
    pub city_id: Option<i64>,
    #[serde(rename = "categoria_id", default)]
    pub category_id: Option<i64>,
    #[serde(rename = "imagen_url", default)]
    pub image_url: Option<String>,
    #[serde(rename = "activo", default)]
    pub active: bool,
}

impl Resource for Venue {
    const PATH: &'static str = "establecimientos";
    const ITEM_KEY: &'static str = "establecimiento";
}

/// 按城市筛选的查询参数
pub const CITY_FILTER: &str = "ciudad_id";

impl ResourceOperations<Venue> {
    /// 某城市的全部场所，服务端排序保持不变
    pub async fn in_city<F>(&self, city_id: i64, on_progress: F) -> Aggregated<Venue>
    where
        F: FnMut(Progress<'_, Venue>),
    {
        let city_id = city_id.to_string();
        self.list_all(&[(CITY_FILTER, city_id.as_str())], on_progress)
            .await
    }
}
