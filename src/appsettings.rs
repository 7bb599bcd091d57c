use config::{Config, ConfigError, Environment, File};
use remindme_models::settings::Settings;

/// Reads `appsettings.toml`, `appsettings.local.toml` and `APP__*` environment
/// variables, later sources overriding earlier ones.
pub fn load() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name("appsettings").required(false))
        .add_source(File::with_name("appsettings.local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    settings.try_deserialize()
}
