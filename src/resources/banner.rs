use serde::{Deserialize, Serialize};

use super::Resource;

/// 首页轮播横幅
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: i64,
    #[serde(rename = "titulo", default)]
    pub title: Option<String>,
    #[serde(rename = "imagen_url")]
    pub image_url: String,
    #[serde(rename = "enlace", default)]
    pub link: Option<String>,
    #[serde(rename = "orden", default)]
    pub position: i32,
    #[serde(rename = "activo", default)]
    pub active: bool,
}

impl Resource for Banner {
    const PATH: &'static str = "banners";
    const ITEM_KEY: &'static str = "banner";
}
