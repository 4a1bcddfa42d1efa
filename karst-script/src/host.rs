//! Host-collaborator boundary.
//!
//! Native functions never reach into engine singletons; they go through the
//! narrow trait methods below, handed to the machine as one [`Host`] value.
//! The VM core depends only on these signatures, which is what keeps it
//! testable without a running engine.
//!
//! Slices passed to collaborator methods (text bytes, palette data) borrow
//! interpreter memory and must not be retained past the call.

use anyhow::Result;

use crate::vars::GameVars;

/// Screen / sprite compositor.
pub trait Screen {
    fn backdrop_draw(&mut self, res: u16);
    fn sprite_draw(&mut self, id: u8, res: u16, frame: u8, x: i16, y: i16);
    fn sprite_move(&mut self, id: u8, x: i16, y: i16);
    fn sprite_z(&mut self, id: u8, z: u8);
    fn sprite_hide(&mut self, id: u8);
    fn sprite_flip(&mut self, id: u8, flags: u8);
    fn rect_fill(&mut self, x: i16, y: i16, w: i16, h: i16, color: u8);
    fn rect_copy(&mut self, sx: i16, sy: i16, w: i16, h: i16, dx: i16, dy: i16);
    fn clip_set(&mut self, x: i16, y: i16, w: i16, h: i16);
    fn clip_clear(&mut self);
    fn text_draw(&mut self, x: i16, y: i16, text: &[u8]);
    fn cursor_show(&mut self, visible: bool);
    fn cursor_shape(&mut self, res: u16, frame: u8);
    fn shake(&mut self, amount: u8);
    fn scroll(&mut self, dx: i16, dy: i16);
}

/// Palette manager.
pub trait Palette {
    fn load(&mut self, res: u16);
    fn fade_in(&mut self, ticks: u16);
    fn fade_out(&mut self, ticks: u16);
    /// `rgb` holds `count` packed RGB triplets.
    fn set_block(&mut self, first: u8, count: u8, rgb: &[u8]);
    fn blend(&mut self, level: u8);
    fn cycle(&mut self, first: u8, last: u8, ticks: u16);
}

/// Sound mixer.
pub trait Mixer {
    fn sfx_play(&mut self, res: u16, channel: u8, volume: u8);
    fn sfx_stop(&mut self, channel: u8);
    fn sfx_loop(&mut self, res: u16, channel: u8, volume: u8);
    fn music_play(&mut self, res: u16);
    fn music_stop(&mut self);
    fn music_volume(&mut self, volume: u8);
    fn flush(&mut self);
    fn sfx_playing(&self, channel: u8) -> bool;
}

/// Segment-map pathfinder.
pub trait Walkmap {
    fn load(&mut self, res: u16);
    /// Starts an actor walking; the returned code lands in the `WalkResult`
    /// game variable (0 = en route, nonzero = rejected).
    fn walk_to(&mut self, actor: u8, x: i16, y: i16) -> u8;
    fn walk_stop(&mut self, actor: u8);
    fn walkable(&self, x: i16, y: i16) -> bool;
    fn segment_at(&self, x: i16, y: i16) -> i16;
    fn segment_enable(&mut self, segment: u8, enabled: bool);
}

/// Animation player.
pub trait Animator {
    fn start(&mut self, actor: u8, res: u16, loops: u8);
    fn stop(&mut self, actor: u8);
    fn phase(&self, actor: u8) -> i16;
    fn running(&self, actor: u8) -> bool;
    fn face(&mut self, actor: u8, dir: u8);
    fn place(&mut self, actor: u8, x: i16, y: i16);
}

/// Everything the interpreter needs from the surrounding engine.
///
/// The collaborator accessors hand out the side-effect surfaces; the direct
/// methods cover resources, the save bank, movie playback, the clock and the
/// frame service. `frame_step` presents a frame and polls input into the
/// game variables; it must never call back into the interpreter.
pub trait Host {
    fn screen(&mut self) -> &mut dyn Screen;
    fn palette(&mut self) -> &mut dyn Palette;
    fn mixer(&mut self) -> &mut dyn Mixer;
    fn walkmap(&mut self) -> &mut dyn Walkmap;
    fn animator(&mut self) -> &mut dyn Animator;

    /// Fetch the raw bytes of a script resource. Failure is fatal to the
    /// run; scripts are trusted, shipped content.
    fn script_bytes(&mut self, res: u16) -> Result<Vec<u8>>;

    fn save_write(&mut self, slot: u8, bytes: &[u8]) -> Result<()>;
    fn save_read(&mut self, slot: u8) -> Result<Vec<u8>>;

    fn movie_start(&mut self, res: u16);
    fn movie_stop(&mut self);
    fn movie_active(&self) -> bool;

    fn quit_requested(&self) -> bool;

    /// Monotonic milliseconds; only compared, never interpreted as wall time.
    fn ticks_ms(&self) -> u64;

    fn frame_step(&mut self, vars: &mut GameVars) -> Result<()>;
}
