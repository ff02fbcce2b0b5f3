use crate::config::ScheduleConfig;
use crate::dirs;
use crate::error::Result;

/// Execute the `config` command: print the effective configuration as TOML.
///
/// The webhook secret is masked.
pub fn execute() -> Result<()> {
    let mut config = ScheduleConfig::load()?;
    if config.webhook_secret.is_some() {
        config.webhook_secret = Some("********".to_string());
    }

    println!("# {}", dirs::config_path().display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
