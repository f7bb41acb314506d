use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig, web::WebConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    /// `None` keeps users in memory
    pub database: Option<PostgresConfig>,
    pub server: ServerConfig,
    pub web: WebConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        // Optional - users stay in memory when DATABASE_URL is unset
        let database = PostgresConfig::from_env_if_configured()?;
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let web = WebConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            web,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_database_url_uses_memory() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", None::<&str>),
                ("PORT", Some("3000")),
                ("APP_ENV", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.database.is_none());
                assert_eq!(config.server.port, 3000);
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.app.name, "todo_web");
            },
        );
    }

    #[test]
    fn test_database_url_enables_postgres() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/users")),
                ("DB_MAX_CONNECTIONS", Some("5")),
            ],
            || {
                let database = Config::from_env().unwrap().database.unwrap();
                assert_eq!(database.url(), "postgres://localhost/users");
                assert_eq!(database.max_connections, 5);
            },
        );
    }

    #[test]
    fn test_bad_port_is_an_error() {
        temp_env::with_var("PORT", Some("http"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
