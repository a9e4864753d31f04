//! Configuration loading and data root resolution

use std::path::PathBuf;

/// Full job configuration: the two dataset roots and the database path.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub database: PathBuf,
}

impl EtlConfig {
    /// Resolve the full job configuration.
    ///
    /// Each setting resolves independently through the priority order of
    /// [`resolve_setting`]; CLI overrides come from the binary's argument
    /// parser.
    pub fn resolve(
        song_data: Option<&str>,
        log_data: Option<&str>,
        database: Option<&str>,
    ) -> Self {
        Self {
            song_data: resolve_setting(
                song_data,
                "PLAYLOG_SONG_DATA",
                "song_data",
                "data/song_data",
            ),
            log_data: resolve_setting(log_data, "PLAYLOG_LOG_DATA", "log_data", "data/log_data"),
            database: resolve_setting(database, "PLAYLOG_DATABASE", "database", "playlog.db"),
        }
    }
}

/// Setting resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config_file_key: &str,
    default: &str,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(value) = config.get(config_file_key).and_then(|v| v.as_str()) {
                    return PathBuf::from(value);
                }
            }
        }
    }

    // Priority 4: Compiled default
    PathBuf::from(default)
}

/// Locate the config file: user config directory first, then the working
/// directory.
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("playlog").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    let local = PathBuf::from("playlog.toml");
    if local.exists() {
        return Some(local);
    }

    None
}
