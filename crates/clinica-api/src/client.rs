use crate::config::ApiConfig;
use clinica_auth::SessionStore;
use clinica_error::{ClinicaError, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// REST 客户端
///
/// 包装服务共享的 HTTP 层：拼接基础 URL、附加 bearer 令牌、归一化
/// 响应。成功响应解析为 JSON 并在存在信封字段时解包；非 2xx 响应
/// 转成携带状态码和尽力提取的消息的 `Request` 错误。本层不重试、
/// 不设超时；并发调用只读会话令牌，互不共享可变状态。
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }

    /// 认证端点的令牌快速检查：无令牌直接失败，不发起网络调用
    pub(crate) async fn bearer_token(&self, operation: &str) -> Result<String> {
        self.session
            .token()
            .await
            .ok_or_else(|| ClinicaError::NoSession {
                operation: operation.to_string(),
            })
    }

    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value> {
        let url = self.url(path);
        debug!(%method, %url, "solicitud API");

        let mut req = self.http.request(method, &url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();

        if (200..300).contains(&status) {
            let text = resp.text().await?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(ClinicaError::from)
        } else {
            Err(Self::extract_error(status, resp).await)
        }
    }

    /// 尽力从错误体提取人类可读消息
    ///
    /// 顺序：JSON 的 detail 字段 → message 字段 → 原始文本 →
    /// "Error {status}"。
    async fn extract_error(status: u16, resp: reqwest::Response) -> ClinicaError {
        let text = resp.text().await.unwrap_or_default();

        let from_json = serde_json::from_str::<Value>(&text).ok().and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let message = from_json
            .or_else(|| {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("Error {}", status));

        ClinicaError::Request { status, message }
    }

    /// 列表端点把结果包在 resultado 信封字段里
    pub(crate) fn unwrap_resultado(value: Value) -> Value {
        match value {
            Value::Object(mut map) if map.contains_key("resultado") => {
                map.remove("resultado").unwrap_or(Value::Null)
            }
            other => other,
        }
    }

    pub(crate) fn parse<T: DeserializeOwned>(value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(ClinicaError::from)
    }
}
