use core_config::{AppInfo, FromEnv, app_info, env_parse_or, server::ServerConfig};

use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Render internal error details on 500 pages (`EXPOSE_ERRORS`).
    /// Defaults to on in development only.
    pub expose_errors: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let app = app_info!();
        let mut mongodb = MongoConfig::from_env()?;
        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name(app.name);
        }
        let server = ServerConfig::from_env()?;
        let expose_errors = env_parse_or("EXPOSE_ERRORS", environment.is_development())?;

        Ok(Self {
            app,
            mongodb,
            server,
            environment,
            expose_errors,
        })
    }
}
