use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Page;
use crate::error::{ClientError, Result};

/// 从列表响应中取出一页
///
/// 记录可能在以资源命名的键下、在 `data` 下，或者响应本身就是数组。
/// 总数可能是 `total`，也可能嵌在 `paginacion` 或 `pagination` 里。
pub fn parse_page<T: DeserializeOwned>(body: Value, collection_key: &str) -> Result<Page<T>> {
    let total = extract_total(&body);

    let records = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove(collection_key)
            .or_else(|| map.remove("data"))
            .ok_or_else(|| {
                ClientError::MalformedResponse(format!(
                    "list response has no `{}` collection",
                    collection_key
                ))
            })?,
        other => {
            return Err(ClientError::MalformedResponse(format!(
                "expected a list response, got {}",
                other
            )));
        }
    };

    let records: Vec<T> = serde_json::from_value(records)?;
    Ok(Page { records, total })
}

fn extract_total(body: &Value) -> Option<u64> {
    body.get("total")
        .and_then(as_count)
        .or_else(|| nested_total(body, "paginacion"))
        .or_else(|| nested_total(body, "pagination"))
}

fn nested_total(body: &Value, key: &str) -> Option<u64> {
    body.get(key)?.get("total").and_then(as_count)
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_resource_key_and_flat_total() {
        let page: Page<u32> =
            parse_page(json!({"ciudades": [1, 2], "total": 12}), "ciudades").unwrap();
        assert_eq!(page.records, vec![1, 2]);
        assert_eq!(page.total, Some(12));
    }

    #[test]
    fn reads_nested_pagination_totals() {
        let page: Page<u32> =
            parse_page(json!({"data": [1], "paginacion": {"total": "40"}}), "cupones").unwrap();
        assert_eq!(page.total, Some(40));

        let page: Page<u32> =
            parse_page(json!({"cupones": [], "pagination": {"total": 0}}), "cupones").unwrap();
        assert_eq!(page.total, Some(0));
        assert!(page.records.is_empty());
    }

    #[test]
    fn bare_arrays_have_no_total() {
        let page: Page<u32> = parse_page(json!([3, 4, 5]), "banners").unwrap();
        assert_eq!(page.records, vec![3, 4, 5]);
        assert_eq!(page.total, None);
    }

    #[test]
    fn missing_collection_is_malformed() {
        let err = parse_page::<u32>(json!({"total": 3}), "categorias").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }
}
