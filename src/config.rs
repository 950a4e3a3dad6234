use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/nexdrive";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";
const DEFAULT_JWT_EXPIRATION_SECONDS: u64 = 3600;
const MAX_JWT_EXPIRATION_SECONDS: u64 = 365 * 24 * 60 * 60;

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// ストアのバックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Cookie JWTの設定
///
/// JWT_SECRET が設定されている場合のみ有効になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub secure_cookie: bool,
}

/// アプリケーション設定
///
/// プロセス起動時に環境変数から一度だけ読み込み、明示的に受け渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub store_backend: StoreBackend,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub auth: Option<AuthConfig>,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列の値は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store_backend = match get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let auth = match get("JWT_SECRET") {
            Some(jwt_secret) => Some(AuthConfig {
                jwt_secret,
                jwt_expiration_seconds: jwt_expiration_seconds(get("JWT_EXPIRATION_SECONDS"))?,
                secure_cookie: parse_or("COOKIE_SECURE", get("COOKIE_SECURE"), false)?,
            }),
            None => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            store_backend,
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            allowed_origins: get("ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            auth,
        })
    }
}

/// トークン有効期間は1秒から1年まで
fn jwt_expiration_seconds(value: Option<String>) -> Result<u64, ConfigError> {
    let raw = value.clone();
    let seconds = parse_or(
        "JWT_EXPIRATION_SECONDS",
        value,
        DEFAULT_JWT_EXPIRATION_SECONDS,
    )?;

    if (1..=MAX_JWT_EXPIRATION_SECONDS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(ConfigError::InvalidValue {
            name: "JWT_EXPIRATION_SECONDS",
            value: raw.unwrap_or_default(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}
