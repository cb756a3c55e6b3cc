use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体，由外部身份服务签发
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    #[serde(default)]
    pub role: Option<String>, // 签发时的角色，仅作参考，以数据库为准
    #[serde(default)]
    pub token_type: Option<String>, // token类型，存在时必须为 "access"
    pub exp: usize, // Expiration time (时间戳)
    #[serde(default)]
    pub iat: usize, // Issued at (签发时间)
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse::<i64>().ok().filter(|id| *id > 0)
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::verify_with_secret(token, &config.jwt.secret, config.jwt.leeway)
    }

    // 使用指定密钥验证 token
    pub fn verify_with_secret(
        token: &str,
        secret: &str,
        leeway: u64,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let mut validation = Validation::default();
        validation.leeway = leeway;

        let claims =
            decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)?;

        if let Some(token_type) = &claims.token_type
            && token_type != "access"
        {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }
}
