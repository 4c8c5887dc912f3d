use chrono::{DateTime, Utc};
use clinica_error::{ClinicaError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// 令牌载荷
///
/// 后端签发的 bearer token 解码后的内容。签名由服务端校验，
/// 客户端只读取载荷字段，过期时间与墙上时钟比较。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: String, // subject (usuario)
    pub rol: u32,    // role id
    pub exp: i64,    // expiration timestamp (epoch seconds)
}

impl TokenPayload {
    pub fn role_id(&self) -> u32 {
        self.rol
    }

    /// chrono 可表示范围之外的 exp 向对应方向饱和
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(if self.exp > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
    }

    /// 与墙上时钟比较判断是否过期
    ///
    /// 比较以秒为单位，exp 取任意 i64 值都不会溢出。
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// 解码令牌载荷（不校验签名）
///
/// 结构性错误（段数不对、编码非法、载荷非JSON、缺少字段）一律返回
/// `TokenDecode`；对任意输入都不会 panic。解码失败的令牌视为不存在，
/// 绝不部分信任。过期校验属于会话层策略，这里不做。
pub fn decode(token: &str) -> Result<TokenPayload> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = Default::default();

    jsonwebtoken::decode::<TokenPayload>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ClinicaError::TokenDecode {
            message: e.to_string(),
        })
}
