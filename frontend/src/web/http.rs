//! HTTP 请求封装模块
//!
//! 基于 `gloo-net`，对外只暴露构建器和一个已读完响应体的 [`HttpResponse`]，
//! 状态码判断和错误映射交给上层 API 客户端。

use gloo_net::http::{Request, RequestBuilder};
use technest_shared::protocol::HttpMethod;
use thiserror::Error;
use web_sys::FormData;

/// HTTP 错误类型
#[derive(Debug, Error)]
pub enum HttpError {
    /// 请求构建失败
    #[error("请求构建失败: {0}")]
    RequestBuildFailed(String),
    /// 网络请求失败
    #[error("网络错误: {0}")]
    NetworkError(String),
    /// 响应体读取失败
    #[error("响应解析失败: {0}")]
    ResponseParseFailed(String),
}

/// HTTP 响应
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: String,
}

impl HttpResponse {
    /// 获取 HTTP 状态码
    pub fn status(&self) -> u16 {
        self.status
    }

    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }
}

enum HttpBody {
    Json(String),
    Form(FormData),
}

/// HTTP 请求构建器
pub struct HttpRequestBuilder {
    url: String,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    query: Vec<(&'static str, String)>,
    body: Option<HttpBody>,
}

impl HttpRequestBuilder {
    fn new(url: String, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// 添加请求头
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// 设置 JSON 请求体（已序列化）
    pub fn json(mut self, body: String) -> Self {
        self.body = Some(HttpBody::Json(body));
        self
    }

    /// 设置 multipart 请求体，`Content-Type` 由浏览器补全 boundary
    pub fn form(mut self, body: FormData) -> Self {
        self.body = Some(HttpBody::Form(body));
        self
    }

    fn builder(&self) -> RequestBuilder {
        match self.method {
            HttpMethod::Get => Request::get(&self.url),
            HttpMethod::Post => Request::post(&self.url),
            HttpMethod::Put => Request::put(&self.url),
            HttpMethod::Delete => Request::delete(&self.url),
        }
    }

    /// 发送请求并读取完整响应体
    pub async fn send(self) -> Result<HttpResponse, HttpError> {
        let mut builder = self.builder();
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        if !self.query.is_empty() {
            builder = builder.query(self.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let request = match self.body {
            Some(HttpBody::Json(body)) => builder
                .header("Content-Type", "application/json")
                .body(body),
            Some(HttpBody::Form(form)) => builder.body(form),
            None => builder.build(),
        }
        .map_err(|e| HttpError::RequestBuildFailed(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::ResponseParseFailed(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// 轻量级 HTTP 客户端
pub struct HttpClient;

impl HttpClient {
    pub fn request(method: HttpMethod, url: &str) -> HttpRequestBuilder {
        HttpRequestBuilder::new(url.to_string(), method)
    }
}
