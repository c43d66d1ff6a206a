use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "AUDIOPROXY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/audioproxy.toml";
const ENV_PREFIX: &str = "AUDIOPROXY";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file: `path`, else `$AUDIOPROXY_CONFIG`, else `config/audioproxy.toml`
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // .env first so it can also name the config file
    let _ = dotenvy::dotenv();

    let config_path = path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);
    Ok(config)
}

/// S3 credential variables, in order of preference
const ACCESS_KEY_VARS: [&str; 2] = ["S3_ACCESS_KEY", "AWS_ACCESS_KEY_ID"];
const SECRET_KEY_VARS: [&str; 2] = ["S3_SECRET_KEY", "AWS_SECRET_ACCESS_KEY"];

/// Credentials only ever come from the environment
fn load_secrets(config: &mut Config) {
    config.storage.access_key = first_env(&ACCESS_KEY_VARS);
    config.storage.secret_key = first_env(&SECRET_KEY_VARS);
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|value| !value.is_empty()))
}

/// Defaults, then the TOML file when present, then `AUDIOPROXY__*` variables
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration file");
        builder = builder.add_source(File::from(config_path));
    } else {
        tracing::warn!(
            path = %config_path.display(),
            "No configuration file, using defaults and environment"
        );
    }

    // AUDIOPROXY__PROXY__ALLOWED_ORIGINS=a.com,b.com -> proxy.allowed_origins
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("proxy.allowed_origins")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
