//! The engine-side host: wires the collaborator state structs, the resource
//! directory and the save bank into the single value the interpreter talks to.

pub mod anim;
pub mod mixer;
pub mod palette;
pub mod screen;
pub mod walkmap;

use std::time::{Duration, Instant};

use anyhow::Result;

use karst_script::{Animator, GameVars, Host, Mixer, Palette, Screen, Walkmap};

use crate::resources::DirResources;
use crate::saves::DirSaves;

use anim::AnimChannels;
use mixer::MixerState;
use palette::PaletteRam;
use screen::ScreenState;
use walkmap::SegmentMap;

pub struct EngineHost {
    resources: DirResources,
    saves: DirSaves,
    screen: ScreenState,
    palette: PaletteRam,
    mixer: MixerState,
    walkmap: SegmentMap,
    anim: AnimChannels,
    movie: Option<u16>,
    quit: bool,
    epoch: Instant,
    frame_interval: Duration,
    last_frame: Instant,
}

impl EngineHost {
    pub fn new(resources: DirResources, saves: DirSaves, frame_interval_ms: u64) -> Self {
        let now = Instant::now();
        Self {
            resources,
            saves,
            screen: ScreenState::new(),
            palette: PaletteRam::new(),
            mixer: MixerState::new(),
            walkmap: SegmentMap::new(),
            anim: AnimChannels::new(),
            movie: None,
            quit: false,
            epoch: now,
            frame_interval: Duration::from_millis(frame_interval_ms.max(1)),
            last_frame: now,
        }
    }

    /// Ask the driver loop to wind down at the next iteration.
    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn screen_state(&self) -> &ScreenState {
        &self.screen
    }

    pub fn palette_ram(&self) -> &PaletteRam {
        &self.palette
    }

    pub fn mixer_state(&self) -> &MixerState {
        &self.mixer
    }

    pub fn segment_map(&mut self) -> &mut SegmentMap {
        &mut self.walkmap
    }

    pub fn anim_channels(&self) -> &AnimChannels {
        &self.anim
    }
}

impl Host for EngineHost {
    fn screen(&mut self) -> &mut dyn Screen {
        &mut self.screen
    }

    fn palette(&mut self) -> &mut dyn Palette {
        &mut self.palette
    }

    fn mixer(&mut self) -> &mut dyn Mixer {
        &mut self.mixer
    }

    fn walkmap(&mut self) -> &mut dyn Walkmap {
        &mut self.walkmap
    }

    fn animator(&mut self) -> &mut dyn Animator {
        &mut self.anim
    }

    fn script_bytes(&mut self, res: u16) -> Result<Vec<u8>> {
        self.resources.read(res)
    }

    fn save_write(&mut self, slot: u8, bytes: &[u8]) -> Result<()> {
        self.saves.write(slot, bytes)
    }

    fn save_read(&mut self, slot: u8) -> Result<Vec<u8>> {
        self.saves.read(slot)
    }

    fn movie_start(&mut self, res: u16) {
        log::info!("movie {res} starts");
        self.movie = Some(res);
    }

    fn movie_stop(&mut self) {
        if let Some(res) = self.movie.take() {
            log::info!("movie {res} stops");
        }
    }

    fn movie_active(&self) -> bool {
        self.movie.is_some()
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn ticks_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Present one frame: sleep out the remainder of the cadence, then run
    /// the per-frame bookkeeping (tick counters, movie flag, animations).
    fn frame_step(&mut self, vars: &mut GameVars) -> Result<()> {
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_interval {
            std::thread::sleep(self.frame_interval - elapsed);
        }
        self.last_frame = Instant::now();

        vars.frame_tick();
        vars.movie_flag = self.movie_active() as u8;
        self.anim.tick();
        Ok(())
    }
}
