use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    /// 折扣百分比
    #[serde(rename = "descuento", default)]
    pub discount: Option<f64>,
    #[serde(rename = "establecimiento_id", default)]
    pub venue_id: Option<i64>,
    #[serde(rename = "fecha_expiracion", default)]
    pub expires_on: Option<NaiveDate>,
    #[serde(rename = "activo", default)]
    pub active: bool,
}

impl Coupon {
    /// 启用且未过期；没有到期日的优惠券一直有效
    pub fn is_redeemable_on(&self, date: NaiveDate) -> bool {
        self.active && self.expires_on.is_none_or(|expires_on| date <= expires_on)
    }
}

impl Resource for Coupon {
    const PATH: &'static str = "cupones";
    const ITEM_KEY: &'static str = "cupon";
}
