//! Terminal bell standing in for a looping alarm sound.

use annoyer_core::AlarmSound;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// How often the bell repeats while the alarm is on.
const RING_EVERY: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct TerminalBell {
    last_ring: Option<Instant>,
}

impl TerminalBell {
    fn ring(&mut self, sound: &Path) {
        tracing::debug!(sound = %sound.display(), "ringing");
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
        self.last_ring = Some(Instant::now());
    }
}

impl AlarmSound for TerminalBell {
    fn start(&mut self, sound: &Path) {
        if self.last_ring.is_none() {
            self.ring(sound);
        }
    }

    fn ensure_active(&mut self, sound: &Path) {
        match self.last_ring {
            Some(at) if at.elapsed() < RING_EVERY => {}
            _ => self.ring(sound),
        }
    }

    fn stop(&mut self) {
        self.last_ring = None;
    }
}
