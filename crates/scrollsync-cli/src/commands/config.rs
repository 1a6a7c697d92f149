use anyhow::Result;

use scrollsync_core::AppConfig;

pub async fn run(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            AppConfig::default().save()?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    println!("# Config file: {}", path.display());
    println!("# Progress store: {}", config.store_path().display());
    println!("# Log file: {}\n", config.log_path().display());
    print!("{}", config.to_toml()?);

    Ok(())
}
