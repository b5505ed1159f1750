use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetSettings {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    /// Require every known column at load time
    #[serde(default)]
    pub strict_schema: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    /// Rows kept in the peak hours table
    #[serde(default = "default_peak_hours")]
    pub peak_hours: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("all_data.csv")
}

fn default_peak_hours() -> usize {
    5
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            strict_schema: false,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            peak_hours: default_peak_hours(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Load `config/dashboard.toml` (optional) overlaid with `DASHBOARD_*`
/// environment variables, e.g. `DASHBOARD_SERVER__PORT=9000`.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_with_environment(environment())
}

/// `DASHBOARD_` prefix, `__` between nested keys
fn environment() -> config::Environment {
    config::Environment::with_prefix("DASHBOARD")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(environment: config::Environment) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}
