use clinica_error::{ClinicaError, Result};
use dotenv::dotenv;

/// 本地开发后端的默认地址
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// API 客户端配置
///
/// 所有端点都挂在一个基础 URL 下，来自 CLINICA_API_URL 环境变量
/// （支持 .env 文件）。尾部斜杠统一去掉，拼接路径时不会出现双斜杠。
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(raw_url: impl Into<String>) -> Self {
        let raw = raw_url.into();
        Self {
            base_url: raw.trim_end_matches('/').to_string(),
        }
    }

    /// 从环境读取配置
    ///
    /// 变量未设置时使用本地默认值；设置了但为空白视为配置错误，
    /// 而不是静默回退。
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        match std::env::var("CLINICA_API_URL") {
            Ok(raw) if raw.trim().is_empty() => Err(ClinicaError::Configuration {
                key: "CLINICA_API_URL".to_string(),
                reason: "valor vacío".to_string(),
            }),
            Ok(raw) => Ok(Self::new(raw)),
            Err(_) => Ok(Self::new(DEFAULT_API_URL)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
