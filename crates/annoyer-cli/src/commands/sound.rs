use annoyer_core::alarm::resolve_sound;
use annoyer_core::Store;
use clap::Subcommand;
use std::path::{Path, PathBuf};

use super::open_store;

#[derive(Subcommand)]
pub enum SoundAction {
    /// Use a sound file for the alarm
    Set {
        /// Path to a .wav file
        path: PathBuf,
    },
    /// Run the alarm silently
    Clear,
    /// Show the configured sound and whether it can be played
    Show,
}

pub fn run(file: Option<&Path>, action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(file)?;

    match action {
        SoundAction::Set { path } => {
            store.set_sound(Some(path))?;
            warn_if_silent(&store);
            println!("ok");
        }
        SoundAction::Clear => {
            store.set_sound(None)?;
            println!("ok");
        }
        SoundAction::Show => match resolve_sound(store.settings().sound_ref.as_deref()) {
            Ok(path) => println!("{}", path.display()),
            Err(reason) => println!("{reason}"),
        },
    }
    Ok(())
}

/// Tell the user the alarm will not make a sound.
pub(super) fn warn_if_silent(store: &Store) {
    let sound_ref = store.settings().sound_ref.as_deref();
    if let (Some(_), Err(reason)) = (sound_ref, resolve_sound(sound_ref)) {
        eprintln!("warning: {reason}");
    }
}
