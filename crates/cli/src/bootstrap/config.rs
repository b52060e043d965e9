use ferrous_hooks_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    config.check_scripts_exist()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        hooks = config.enabled_hooks().count(),
        pool_size = config.engine.pool_size,
        "Configuration loaded"
    );

    Ok(config)
}
