use annoyer_core::SettingKey;
use clap::Subcommand;
use std::path::Path;

use super::open_store;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (alarm_threshold, base_period_sec, sound_ref, show_graph)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset settings to defaults (history is kept)
    Reset,
}

pub fn run(file: Option<&Path>, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let key: SettingKey = key.parse()?;
            let store = open_store(file)?;
            println!("{}", store.settings().get(key));
        }
        ConfigAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let mut store = open_store(file)?;
            store.set_by_key(key, &value)?;
            if key == SettingKey::Sound {
                super::sound::warn_if_silent(&store);
            }
            println!("ok");
        }
        ConfigAction::List => {
            let store = open_store(file)?;
            let json = serde_json::to_string_pretty(store.settings())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let mut store = open_store(file)?;
            store.reset_settings()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
