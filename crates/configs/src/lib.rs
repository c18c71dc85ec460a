use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
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

/// Where the bookings live and how to reach them.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: default_worksheet(),
            credentials_path: default_credentials_path(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_worksheet() -> String { "Sheet1".into() }
fn default_credentials_path() -> String { "credentials.json".into() }
fn default_api_base() -> String { DEFAULT_API_BASE.into() }
fn default_request_timeout() -> u64 { 30 }
fn default_log_format() -> String { "compact".into() }

fn default_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&default_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to env-only settings
    /// when the file is absent, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = Self::load_or_env_only(&default_path())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// A missing file means env-only settings; a file that exists but cannot be
    /// read or parsed is an error.
    fn load_or_env_only(path: &str) -> Result<Self> {
        match load_from_file(path) {
            Ok(cfg) => Ok(cfg),
            Err(e) => match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => Ok(Self::from_env_only()),
                _ => Err(e.context(format!("invalid config file {path}"))),
            },
        }
    }

    fn from_env_only() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.sheet.normalize_from_env();
        self.sheet.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl SheetConfig {
    /// Environment variables win over file values.
    pub fn normalize_from_env(&mut self) {
        if let Ok(id) = std::env::var("SHEET_ID") {
            self.spreadsheet_id = id;
        }
        if let Ok(name) = std::env::var("SHEET_NAME") {
            self.worksheet = name;
        }
        if let Ok(path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials_path = path;
        }
        if let Ok(base) = std::env::var("SHEETS_API_BASE") {
            self.api_base = base;
        }
        self.spreadsheet_id = self.spreadsheet_id.trim().to_string();
        self.api_base = self.api_base.trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.is_empty() {
            return Err(anyhow!("sheet.spreadsheet_id is empty; set it in config.toml or SHEET_ID"));
        }
        if self.worksheet.is_empty() {
            return Err(anyhow!("sheet.worksheet must not be empty"));
        }
        if self.credentials_path.trim().is_empty() {
            return Err(anyhow!("sheet.credentials_path must not be empty"));
        }
        let lower = self.api_base.to_lowercase();
        if !(lower.starts_with("https://") || lower.starts_with("http://")) {
            return Err(anyhow!("sheet.api_base must start with http:// or https://"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("sheet.request_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}
