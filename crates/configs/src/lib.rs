use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_op_timeout")]
    pub op_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: String::new(), db_name: default_db_name(), op_timeout_secs: default_op_timeout() }
    }
}

fn default_db_name() -> String { "moviedb".to_string() }
fn default_op_timeout() -> u64 { 10 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

/// Config file first, environment second: when no config file loads, the
/// server section falls back to `SERVER_HOST`/`SERVER_PORT` and the
/// database section to `MONGODB_URI`/`MONGODB_DB`.
pub fn load_or_env() -> AppConfig {
    load_default().unwrap_or_else(|_| AppConfig {
        server: ServerConfig::from_env(),
        database: DatabaseConfig::default(),
    })
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    /// Binding settings taken from the environment, used when no config
    /// file is present. `SERVER_HOST`/`SERVER_PORT` win over the built-in
    /// defaults; a config file, when it loads, wins over both.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("SERVER_HOST").unwrap_or(defaults.host);
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        Self { host, port, worker_threads: defaults.worker_threads }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 {
                self.worker_threads = Some(4);
            }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Fill connection settings from the environment when the TOML file
    /// leaves them empty.
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("MONGODB_URI") {
                self.url = url;
            }
        }
        if let Ok(name) = std::env::var("MONGODB_DB") {
            if !name.trim().is_empty() {
                self.db_name = name;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!(
                "database.url is empty; set it in config.toml or via MONGODB_URI"
            ));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!(
                "database.url must start with mongodb:// or mongodb+srv://"
            ));
        }
        if self.db_name.trim().is_empty() {
            return Err(anyhow!("database.db_name must not be empty"));
        }
        if self.op_timeout_secs == 0 {
            return Err(anyhow!("database.op_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}
