//! Application configuration.
//!
//! Layered with figment: defaults, then an optional YAML file, then
//! `QUILL_`-prefixed environment variables (nested fields split on `__`,
//! e.g. `QUILL_AUTH__SESSION__COOKIE_NAME`). `DATABASE_URL` is also read
//! unprefixed since that is what hosting platforms export.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Default)]
#[command(name = "quill", about = "Quill blogging platform backend")]
pub struct Args {
    /// Path to a YAML configuration file.
    #[arg(short = 'f', long = "config", env = "QUILL_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    pub validate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub host: String,
    pub port: u16,

    /// Postgres connection string. Usually provided via `DATABASE_URL`.
    pub database_url: Option<String>,

    /// HMAC secret for signing session tokens.
    pub secret_key: String,

    /// Initial admin account, created at startup if it does not exist.
    /// Skipped entirely when no password is configured.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub uploads: UploadsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: None,
            secret_key: "quill-dev-secret".to_string(),
            admin_email: None,
            admin_password: None,
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub password: PasswordConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 7,
            max_length: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How long a session token stays valid.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// SameSite attribute: `Strict`, `Lax` or `None`.
    pub cookie_same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(24 * 60 * 60),
            cookie_name: "jwt".to_string(),
            cookie_secure: true,
            cookie_same_site: "Strict".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Origins allowed to call the API with credentials. The session
    /// cookie only flows when the browser origin is listed here.
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
            max_age: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory uploaded images are written to and served from.
    pub dir: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let config: Config = Self::figment(args).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(args: &Args) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = &args.config_file {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("QUILL_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret_key.is_empty() {
            anyhow::bail!("secret_key must not be empty");
        }
        if self.auth.password.min_length == 0
            || self.auth.password.min_length > self.auth.password.max_length
        {
            anyhow::bail!(
                "invalid password length bounds: min {} max {}",
                self.auth.password.min_length,
                self.auth.password.max_length
            );
        }
        if self.auth.session.timeout.as_secs() == 0 {
            anyhow::bail!("session timeout must be positive");
        }
        if !matches!(
            self.auth.session.cookie_same_site.as_str(),
            "Strict" | "Lax" | "None"
        ) {
            anyhow::bail!(
                "cookie_same_site must be Strict, Lax or None, got {:?}",
                self.auth.session.cookie_same_site
            );
        }
        if self.admin_password.is_some() && self.admin_email.is_none() {
            anyhow::bail!("admin_password is set but admin_email is not");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
