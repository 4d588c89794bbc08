use once_cell::sync::Lazy;
use std::env;
use std::net::SocketAddr;

pub static CONFIG: Lazy<ServerConfig> = Lazy::new(ServerConfig::from_env);

pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            bind_addr: env::var("MAFIA_BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080))),
            allowed_origin: env::var("MAFIA_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}
