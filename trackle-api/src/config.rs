/// Application configuration
///
/// Loaded once at startup from environment variables, with `.env`
/// support for local development. `DATABASE_URL` and `JWT_SECRET` are
/// required; everything else has a sensible default.
use std::env;

use anyhow::{bail, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub avatar: AvatarConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub production: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct AvatarConfig {
    /// External upload service endpoint. When unset, avatars are
    /// written to `dir` instead.
    pub upload_url: Option<String>,
    pub dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 characters");
        }

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                production: env::var("API_PRODUCTION").map(|v| v == "true").unwrap_or(false),
                cors_origins: parse_origins(
                    &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
                ),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_hours: env::var("ACCESS_TOKEN_TTL_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .context("ACCESS_TOKEN_TTL_HOURS must be a number")?,
                refresh_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("REFRESH_TOKEN_TTL_DAYS must be a number")?,
            },
            avatar: AvatarConfig {
                upload_url: env::var("AVATAR_UPLOAD_URL").ok().filter(|v| !v.is_empty()),
                dir: env::var("AVATAR_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
