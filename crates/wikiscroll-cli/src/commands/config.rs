use anyhow::Result;

use wikiscroll_core::AppConfig;

pub fn run(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if init {
        if path.exists() {
            println!("Config file already exists: {}", path.display());
            return Ok(());
        }
        AppConfig::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let status = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config file: {}{}", path.display(), status);
    println!("Log file:    {}\n", config.log_path().display());
    print!("{}", config.to_toml()?);

    Ok(())
}
