#![allow(dead_code)]

//! Shared test host: records collaborator calls as readable strings, serves
//! script resources and the save bank out of in-memory maps, and advances
//! its clock by a configurable cost per poll so time-based logic can be
//! driven deterministically.

use std::cell::Cell;
use std::collections::HashMap;

use anyhow::Result;
use karst_script::{Animator, GameVars, Host, Mixer, Palette, Screen, Walkmap};

#[derive(Default)]
pub struct RecHost {
    pub calls: Vec<String>,
    pub scripts: HashMap<u16, Vec<u8>>,
    pub saves: HashMap<u8, Vec<u8>>,
    pub movie: bool,
    pub quit: bool,
    pub frame_steps: u32,
    /// Ask the driver to stop after this many frame services.
    pub quit_after_frames: Option<u32>,
    /// Milliseconds the simulated clock advances per `ticks_ms` poll.
    pub tick_cost_ms: u64,
    now: Cell<u64>,
}

impl RecHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(res: u16, bytes: Vec<u8>) -> Self {
        let mut host = Self::new();
        host.scripts.insert(res, bytes);
        host
    }

    fn note(&mut self, s: String) {
        self.calls.push(s);
    }
}

impl Screen for RecHost {
    fn backdrop_draw(&mut self, res: u16) {
        self.note(format!("backdrop {res}"));
    }
    fn sprite_draw(&mut self, id: u8, res: u16, frame: u8, x: i16, y: i16) {
        self.note(format!("sprite {id} res={res} frame={frame} at {x},{y}"));
    }
    fn sprite_move(&mut self, id: u8, x: i16, y: i16) {
        self.note(format!("sprite {id} move {x},{y}"));
    }
    fn sprite_z(&mut self, id: u8, z: u8) {
        self.note(format!("sprite {id} z={z}"));
    }
    fn sprite_hide(&mut self, id: u8) {
        self.note(format!("sprite {id} hide"));
    }
    fn sprite_flip(&mut self, id: u8, flags: u8) {
        self.note(format!("sprite {id} flip={flags}"));
    }
    fn rect_fill(&mut self, x: i16, y: i16, w: i16, h: i16, color: u8) {
        self.note(format!("fill {x},{y} {w}x{h} color={color}"));
    }
    fn rect_copy(&mut self, sx: i16, sy: i16, w: i16, h: i16, dx: i16, dy: i16) {
        self.note(format!("copy {sx},{sy} {w}x{h} to {dx},{dy}"));
    }
    fn clip_set(&mut self, x: i16, y: i16, w: i16, h: i16) {
        self.note(format!("clip {x},{y} {w}x{h}"));
    }
    fn clip_clear(&mut self) {
        self.note("clip clear".into());
    }
    fn text_draw(&mut self, x: i16, y: i16, text: &[u8]) {
        self.note(format!(
            "text {x},{y} {:?}",
            String::from_utf8_lossy(text)
        ));
    }
    fn cursor_show(&mut self, visible: bool) {
        self.note(format!("cursor show={visible}"));
    }
    fn cursor_shape(&mut self, res: u16, frame: u8) {
        self.note(format!("cursor res={res} frame={frame}"));
    }
    fn shake(&mut self, amount: u8) {
        self.note(format!("shake {amount}"));
    }
    fn scroll(&mut self, dx: i16, dy: i16) {
        self.note(format!("scroll {dx},{dy}"));
    }
}

impl Palette for RecHost {
    fn load(&mut self, res: u16) {
        self.note(format!("pal load {res}"));
    }
    fn fade_in(&mut self, ticks: u16) {
        self.note(format!("pal fade-in {ticks}"));
    }
    fn fade_out(&mut self, ticks: u16) {
        self.note(format!("pal fade-out {ticks}"));
    }
    fn set_block(&mut self, first: u8, count: u8, rgb: &[u8]) {
        self.note(format!("pal set {first}+{count} {rgb:?}"));
    }
    fn blend(&mut self, level: u8) {
        self.note(format!("pal blend {level}"));
    }
    fn cycle(&mut self, first: u8, last: u8, ticks: u16) {
        self.note(format!("pal cycle {first}..{last} every {ticks}"));
    }
}

impl Mixer for RecHost {
    fn sfx_play(&mut self, res: u16, channel: u8, volume: u8) {
        self.note(format!("sfx {res} ch={channel} vol={volume}"));
    }
    fn sfx_stop(&mut self, channel: u8) {
        self.note(format!("sfx stop ch={channel}"));
    }
    fn sfx_loop(&mut self, res: u16, channel: u8, volume: u8) {
        self.note(format!("sfx loop {res} ch={channel} vol={volume}"));
    }
    fn music_play(&mut self, res: u16) {
        self.note(format!("music {res}"));
    }
    fn music_stop(&mut self) {
        self.note("music stop".into());
    }
    fn music_volume(&mut self, volume: u8) {
        self.note(format!("music vol={volume}"));
    }
    fn flush(&mut self) {
        self.note("mixer flush".into());
    }
    fn sfx_playing(&self, channel: u8) -> bool {
        channel == 1
    }
}

impl Walkmap for RecHost {
    fn load(&mut self, res: u16) {
        self.note(format!("walkmap {res}"));
    }
    fn walk_to(&mut self, actor: u8, x: i16, y: i16) -> u8 {
        self.note(format!("walk {actor} to {x},{y}"));
        if x < 0 {
            1
        } else {
            0
        }
    }
    fn walk_stop(&mut self, actor: u8) {
        self.note(format!("walk stop {actor}"));
    }
    fn walkable(&self, x: i16, _y: i16) -> bool {
        x >= 0
    }
    fn segment_at(&self, x: i16, _y: i16) -> i16 {
        if x >= 0 {
            x / 100
        } else {
            -1
        }
    }
    fn segment_enable(&mut self, segment: u8, enabled: bool) {
        self.note(format!("segment {segment} enabled={enabled}"));
    }
}

impl Animator for RecHost {
    fn start(&mut self, actor: u8, res: u16, loops: u8) {
        self.note(format!("anim {actor} res={res} loops={loops}"));
    }
    fn stop(&mut self, actor: u8) {
        self.note(format!("anim stop {actor}"));
    }
    fn phase(&self, actor: u8) -> i16 {
        actor as i16 * 10
    }
    fn running(&self, actor: u8) -> bool {
        actor == 2
    }
    fn face(&mut self, actor: u8, dir: u8) {
        self.note(format!("face {actor} dir={dir}"));
    }
    fn place(&mut self, actor: u8, x: i16, y: i16) {
        self.note(format!("place {actor} at {x},{y}"));
    }
}

impl Host for RecHost {
    fn screen(&mut self) -> &mut dyn Screen {
        self
    }
    fn palette(&mut self) -> &mut dyn Palette {
        self
    }
    fn mixer(&mut self) -> &mut dyn Mixer {
        self
    }
    fn walkmap(&mut self) -> &mut dyn Walkmap {
        self
    }
    fn animator(&mut self) -> &mut dyn Animator {
        self
    }

    fn script_bytes(&mut self, res: u16) -> Result<Vec<u8>> {
        self.scripts
            .get(&res)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no script resource {res}"))
    }

    fn save_write(&mut self, slot: u8, bytes: &[u8]) -> Result<()> {
        self.saves.insert(slot, bytes.to_vec());
        Ok(())
    }

    fn save_read(&mut self, slot: u8) -> Result<Vec<u8>> {
        self.saves
            .get(&slot)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("save slot {slot} is empty"))
    }

    fn movie_start(&mut self, res: u16) {
        self.note(format!("movie {res}"));
        self.movie = true;
    }

    fn movie_stop(&mut self) {
        self.note("movie stop".into());
        self.movie = false;
    }

    fn movie_active(&self) -> bool {
        self.movie
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn ticks_ms(&self) -> u64 {
        let t = self.now.get() + self.tick_cost_ms;
        self.now.set(t);
        t
    }

    fn frame_step(&mut self, vars: &mut GameVars) -> Result<()> {
        self.frame_steps += 1;
        vars.frame_tick();
        vars.movie_flag = self.movie as u8;
        if let Some(limit) = self.quit_after_frames {
            if self.frame_steps >= limit {
                self.quit = true;
            }
        }
        Ok(())
    }
}
