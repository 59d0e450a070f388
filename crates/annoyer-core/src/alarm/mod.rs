mod machine;
mod sound;

pub use machine::{AlarmEffect, AlarmMachine, AlarmState, PeriodClock};
pub use sound::{resolve_sound, AlarmSound, SilentSound, SoundUnavailable};
