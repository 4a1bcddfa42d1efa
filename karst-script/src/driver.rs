//! The cooperative run loop around the machine.
//!
//! Single-threaded by design: scripts never block, they poll. The driver
//! interleaves instruction stepping with a time-based frame service and
//! owns the two jobs that must not happen mid-instruction, movie input
//! suppression and servicing a latched game restore.

use anyhow::{Context, Result};

use crate::host::Host;
use crate::machine::{Machine, Step};
use crate::savestate;

pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

pub struct Driver {
    frame_interval_ms: u64,
}

impl Driver {
    pub fn new(frame_interval_ms: u64) -> Self {
        Self {
            frame_interval_ms: frame_interval_ms.max(1),
        }
    }

    /// Run the script in `entry_slot` until the host asks to quit, the
    /// script halts itself, or a fatal error ends the session.
    pub fn run<H: Host>(&self, m: &mut Machine<H>, host: &mut H, entry_slot: u16) -> Result<()> {
        m.boot(entry_slot)?;
        log::info!("entering script slot {entry_slot}");
        let mut deadline = host.ticks_ms() + self.frame_interval_ms;
        loop {
            if host.quit_requested() {
                log::info!("quit requested by host");
                return Ok(());
            }
            if host.movie_active() {
                // scripts must not see clicks while a movie plays
                m.vars_mut().mouse_button = 0;
            }
            match m.step(host) {
                Ok(Step::Running) => {}
                Ok(Step::Halted) => {
                    log::info!("script halted");
                    return Ok(());
                }
                Err(e) => {
                    log::error!("script aborted: {e}");
                    return Err(e.into());
                }
            }
            if let Some(slot) = m.take_restore_request() {
                let bytes = host
                    .save_read(slot)
                    .with_context(|| format!("reading save slot {slot}"))?;
                savestate::restore(m, &bytes)?;
                log::info!("game state restored from slot {slot}");
            }
            if m.take_frame_service() {
                // the script just called Update; push the deadline out
                deadline = host.ticks_ms() + self.frame_interval_ms;
            } else if host.ticks_ms() >= deadline {
                host.frame_step(m.vars_mut())?;
                deadline = host.ticks_ms() + self.frame_interval_ms;
            }
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL_MS)
    }
}
