pub mod config;
pub mod history;
pub mod run;
pub mod sound;

use annoyer_core::Store;
use std::path::Path;

/// Open the store at `file`, or at the default location.
pub fn open_store(file: Option<&Path>) -> Result<Store, Box<dyn std::error::Error>> {
    let store = match file {
        Some(path) => Store::load(path)?,
        None => Store::open_default()?,
    };
    Ok(store)
}
