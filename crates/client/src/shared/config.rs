use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    pub page_size: i32,
    pub timeout_secs: u64,
    pub fallback_row_cap: usize,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = "http://127.0.0.1:54321"
key = ""

[fetch]
page_size = 50
timeout_secs = 30
fallback_row_cap = 50000
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `DASHBOARD_API_URL` / `DASHBOARD_API_KEY` environment variables override
/// the `[api]` section either way, so the key never has to live on disk.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_config_file()?;
    apply_overrides(
        &mut config,
        std::env::var("DASHBOARD_API_URL").ok(),
        std::env::var("DASHBOARD_API_KEY").ok(),
    );
    Ok(config)
}

fn load_config_file() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, url: Option<String>, key: Option<String>) {
    if let Some(url) = url {
        config.api.base_url = url;
    }
    if let Some(key) = key {
        config.api.key = key;
    }
}
