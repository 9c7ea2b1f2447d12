use std::net::SocketAddr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let listen_addr = listen_addr(
            std::env::var("APP_HOST").ok().as_deref(),
            std::env::var("APP_PORT").ok().as_deref(),
        )?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fast-zero".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fast-zero-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        Ok(Self {
            database_url,
            listen_addr,
            jwt,
        })
    }
}

/// `APP_HOST`/`APP_PORT`, defaulting to `0.0.0.0:8080`.
fn listen_addr(host: Option<&str>, port: Option<&str>) -> anyhow::Result<SocketAddr> {
    let host = host.unwrap_or("0.0.0.0");
    let port: u16 = match port {
        Some(p) => p.parse().with_context(|| format!("invalid APP_PORT {p:?}"))?,
        None => 8080,
    };
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid APP_HOST {host:?}"))
}
