//! Segment map: rectangular walkable regions with enable flags.
//!
//! Walking is straight-line; an actor either gets a target accepted into
//! its walker record or the request is rejected on the spot. Collision with
//! scenery beyond the segment test is not modelled here.

use karst_script::Walkmap;

pub const NUM_WALKERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
    pub enabled: bool,
}

impl Segment {
    pub fn contains(&self, x: i16, y: i16) -> bool {
        x >= self.x && y >= self.y && (x as i32) < self.x as i32 + self.w as i32
            && (y as i32) < self.y as i32 + self.h as i32
    }
}

#[derive(Debug)]
pub struct SegmentMap {
    loaded: Option<u16>,
    segments: Vec<Segment>,
    walkers: [Option<(i16, i16)>; NUM_WALKERS],
}

impl SegmentMap {
    pub fn new() -> Self {
        Self {
            loaded: None,
            segments: Vec::new(),
            walkers: [None; NUM_WALKERS],
        }
    }

    pub fn loaded(&self) -> Option<u16> {
        self.loaded
    }

    /// Replace the segment set. Room data installs its map through this
    /// once the resource side learns to parse map resources.
    pub fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    pub fn walker(&self, actor: u8) -> Option<(i16, i16)> {
        self.walkers.get(actor as usize).copied().flatten()
    }
}

impl Default for SegmentMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Walkmap for SegmentMap {
    fn load(&mut self, res: u16) {
        log::debug!("segment map {res}");
        self.loaded = Some(res);
        self.segments.clear();
        self.walkers = [None; NUM_WALKERS];
    }

    fn walk_to(&mut self, actor: u8, x: i16, y: i16) -> u8 {
        if actor as usize >= NUM_WALKERS {
            log::error!("walk_to: invalid actor {actor}");
            return 1;
        }
        if !self.walkable(x, y) {
            log::debug!("walk_to: {x},{y} not walkable");
            return 1;
        }
        self.walkers[actor as usize] = Some((x, y));
        0
    }

    fn walk_stop(&mut self, actor: u8) {
        if let Some(w) = self.walkers.get_mut(actor as usize) {
            *w = None;
        }
    }

    fn walkable(&self, x: i16, y: i16) -> bool {
        self.segments.iter().any(|s| s.enabled && s.contains(x, y))
    }

    fn segment_at(&self, x: i16, y: i16) -> i16 {
        self.segments
            .iter()
            .position(|s| s.enabled && s.contains(x, y))
            .map(|i| i as i16)
            .unwrap_or(-1)
    }

    fn segment_enable(&mut self, segment: u8, enabled: bool) {
        match self.segments.get_mut(segment as usize) {
            Some(s) => s.enabled = enabled,
            None => log::error!("segment_enable: invalid segment {segment}"),
        }
    }
}
