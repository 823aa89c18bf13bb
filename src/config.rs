use serde::Deserialize;

/// Deployment environment, controls the `Secure` flag on the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: Environment,
    pub session_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        let session_ttl_days = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);
        Ok(Self {
            database_url,
            environment,
            session_ttl_days,
        })
    }

    pub fn cookie_secure(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_cookie_only_in_production() {
        let mut config = AppConfig {
            database_url: "postgres://localhost/test".into(),
            environment: Environment::Development,
            session_ttl_days: 30,
        };
        assert!(!config.cookie_secure());
        config.environment = Environment::Production;
        assert!(config.cookie_secure());
    }
}
