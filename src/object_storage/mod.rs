use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use uuid::Uuid;

use crate::error::Result;
use crate::fetch::ensure_success;
use crate::utils::{bearer, content_type_for};

/// 覆盖同名对象而不是报错
const UPSERT_HEADER: &str = "x-upsert";
const API_KEY_HEADER: &str = "apikey";

/// 对象存储（图片上传）
#[derive(Clone)]
pub struct ObjectStorage {
    http: Client,
    base_url: String,
    bucket: String,
    api_key: Option<String>,
}

impl ObjectStorage {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key,
        }
    }

    /// `<base>/object/public/<bucket>/<path>`
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    /// 从公开地址反推对象键，不属于本桶时返回 None
    pub fn object_key(&self, public_url: &str) -> Option<String> {
        let prefix = format!("{}/object/public/{}/", self.base_url, self.bucket);
        public_url
            .strip_prefix(&prefix)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// 上传原始字节，返回公开地址
    pub async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let path = path.trim_start_matches('/');
        let size = bytes.len();

        let mut request = self
            .http
            .post(self.object_url(path))
            .header(UPSERT_HEADER, "true")
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request
                .header(AUTHORIZATION, bearer(key))
                .header(API_KEY_HEADER, key.as_str());
        }

        ensure_success(request.send().await?).await?;
        tracing::info!(bucket = %self.bucket, path, size, "Uploaded object");
        Ok(self.public_url(path))
    }

    /// 上传图片，对象键为 `<folder>/<uuid>.<ext>`，避免覆盖别人的文件
    pub async fn upload_image(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "bin".into());

        let folder = folder.trim_matches('/');
        let key = if folder.is_empty() {
            format!("{}.{}", Uuid::new_v4(), extension)
        } else {
            format!("{}/{}.{}", folder, Uuid::new_v4(), extension)
        };

        self.upload(&key, bytes, content_type_for(file_name)).await
    }

    pub async fn remove(&self, path: &str) -> Result<()> {
        let path = path.trim_start_matches('/');
        let mut request = self.http.delete(self.object_url(path));
        if let Some(key) = &self.api_key {
            request = request
                .header(AUTHORIZATION, bearer(key))
                .header(API_KEY_HEADER, key.as_str());
        }

        ensure_success(request.send().await?).await?;
        tracing::info!(bucket = %self.bucket, path, "Removed object");
        Ok(())
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, path)
    }
}
