//! 模拟令牌生成
//!
//! 后端不可用时用于本地演示和测试。生成的令牌结构合法（三段
//! base64url）但签名是占位符，只能通过不校验签名的客户端解码。

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde_json::json;

/// 生成一个未签名的模拟令牌，`ttl_secs` 秒后过期
pub fn fake_token(sub: &str, rol: u32, ttl_secs: i64) -> String {
    build(sub, rol, Utc::now().timestamp() + ttl_secs)
}

/// 生成一个已过期的模拟令牌
pub fn expired_token(sub: &str, rol: u32) -> String {
    build(sub, rol, Utc::now().timestamp() - 3600)
}

fn build(sub: &str, rol: u32, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": sub,
            "rol": rol,
            "exp": exp,
        })
        .to_string(),
    );

    format!("{}.{}.firmaFalsa", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_token_roundtrip() {
        let token = fake_token("sara", 2, 60);
        let payload = crate::token::decode(&token).unwrap();

        assert_eq!(payload.sub, "sara");
        assert_eq!(payload.rol, 2);
        assert!(!payload.is_expired());
    }
}
