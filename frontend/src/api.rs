use crate::auth::AuthGateway;
use crate::config;
use crate::error::{ApiError, ApiResult};
use crate::resource::CancelToken;
use crate::web::{HttpClient, HttpError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use technest_shared::protocol::{ApiRequest, HttpMethod, post_path, posts_path};
use technest_shared::social::PostDraft;
use technest_shared::{
    HEADER_AUTHORIZATION, LoginRequest, LoginResponse, OAuthLoginRequest, OAuthLoginResponse,
    Post, Session,
};
use wasm_bindgen::JsValue;
use web_sys::{FileList, FormData};

#[derive(Clone, Debug, PartialEq)]
pub struct TechNestApi {
    pub base_url: String,
    token: Option<String>,
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// 解析响应体
///
/// 不需要解析或响应体为空时按 JSON `null` 处理，
/// 因此 `()` 与 `Option<T>` 类型的响应都能接受空响应体。
pub(crate) fn decode_body<T: DeserializeOwned>(decode: bool, body: &str) -> ApiResult<T> {
    let body = body.trim();
    if !decode || body.is_empty() {
        return Ok(serde_json::from_str("null")?);
    }
    Ok(serde_json::from_str(body)?)
}

fn form_error(e: JsValue) -> ApiError {
    ApiError::Network(format!("{:?}", e))
}

impl TechNestApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::api_base())
    }

    pub fn with_session(mut self, session: Option<&Session>) -> Self {
        self.token = session.map(|s| s.token.clone());
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn bearer(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| format!("{}{}", technest_shared::BEARER_PREFIX, t))
    }

    fn request(&self, method: HttpMethod, path: &str) -> crate::web::HttpRequestBuilder {
        let builder = HttpClient::request(method, &self.url(path));
        match self.bearer() {
            Some(bearer) => builder.header(HEADER_AUTHORIZATION, &bearer),
            None => builder,
        }
    }

    /// 发送强类型请求并获取解析后的响应
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let path = req.path();
        let mut builder = self.request(R::METHOD, &path).query(req.query());
        if let Some(body) = req.body() {
            builder = builder.json(serde_json::to_string(body)?);
        }

        let response = builder.send().await.inspect_err(|e| {
            log_error!("[Api] {} {} failed: {}", R::METHOD.as_str(), path, e);
        })?;

        if !response.ok() {
            return Err(ApiError::from_status(response.status(), response.text()));
        }
        decode_body(R::DECODE_RESPONSE, response.text())
    }

    /// 在视图的取消令牌下发送请求
    pub async fn send_with<R: ApiRequest>(
        &self,
        req: &R,
        cancel: &CancelToken,
    ) -> ApiResult<R::Response> {
        cancel.run(self.send(req)).await
    }

    /// 创建（`id` 为 `None`）或更新帖子，媒体文件以 multipart 上传
    pub async fn save_post(
        &self,
        id: Option<i64>,
        draft: &PostDraft,
        files: Option<FileList>,
    ) -> ApiResult<Post> {
        let form = FormData::new().map_err(form_error)?;
        form.append_with_str("title", &draft.title)
            .map_err(form_error)?;
        form.append_with_str("description", &draft.description)
            .map_err(form_error)?;
        if let Some(files) = files {
            for index in 0..files.length() {
                if let Some(file) = files.item(index) {
                    form.append_with_blob_and_filename(
                        &format!("mediaFiles[{}]", index),
                        &file,
                        &file.name(),
                    )
                    .map_err(form_error)?;
                }
            }
        }

        let (method, path) = match id {
            Some(id) => (HttpMethod::Put, post_path(id)),
            None => (HttpMethod::Post, posts_path()),
        };
        let response = self.request(method, &path).form(form).send().await?;
        if !response.ok() {
            return Err(ApiError::from_status(response.status(), response.text()));
        }
        decode_body(true, response.text())
    }
}

#[async_trait(?Send)]
impl AuthGateway for TechNestApi {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.send(request).await
    }

    async fn google_login(&self, credential: &str) -> ApiResult<OAuthLoginResponse> {
        self.send(&OAuthLoginRequest {
            credential: credential.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use technest_shared::quiz::AnswerResult;

    #[test]
    fn base_url_is_normalised() {
        let api = TechNestApi::new("http://localhost:8080/");
        assert_eq!(api.url("/api/posts"), "http://localhost:8080/api/posts");
        assert_eq!(api.url("api/posts"), "http://localhost:8080/api/posts");
    }

    #[test]
    fn bearer_follows_session() {
        let api = TechNestApi::new("http://x");
        assert_eq!(api.bearer(), None);
        let session = Session::new("abc", technest_shared::Role::User, "a@b.co");
        assert_eq!(
            api.with_session(Some(&session)).bearer().as_deref(),
            Some("Bearer abc")
        );
    }

    #[test]
    fn empty_or_ignored_bodies_decode() {
        let unit: ApiResult<()> = decode_body(false, "Registered successfully");
        assert!(unit.is_ok());
        let none: Option<AnswerResult> = decode_body(true, "").unwrap();
        assert!(none.is_none());
        let some: Option<AnswerResult> = decode_body(true, r#"{"correct":true}"#).unwrap();
        assert_eq!(some.and_then(|r| r.correct), Some(true));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = decode_body::<Vec<Post>>(true, "{not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
