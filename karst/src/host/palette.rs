//! Palette RAM: 256 RGB entries plus fade and cycle bookkeeping.

use karst_script::Palette;

pub const NUM_ENTRIES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRange {
    pub first: u8,
    pub last: u8,
    pub ticks: u16,
}

#[derive(Debug)]
pub struct PaletteRam {
    rgb: [[u8; 3]; NUM_ENTRIES],
    loaded: Option<u16>,
    /// 0 = fully faded to black, 255 = fully visible.
    fade: u8,
    blend: u8,
    cycle: Option<CycleRange>,
}

impl PaletteRam {
    pub fn new() -> Self {
        Self {
            rgb: [[0; 3]; NUM_ENTRIES],
            loaded: None,
            fade: 255,
            blend: 0,
            cycle: None,
        }
    }

    pub fn entry(&self, index: u8) -> [u8; 3] {
        self.rgb[index as usize]
    }

    pub fn loaded(&self) -> Option<u16> {
        self.loaded
    }

    pub fn fade_level(&self) -> u8 {
        self.fade
    }

    pub fn blend_level(&self) -> u8 {
        self.blend
    }

    pub fn cycle_range(&self) -> Option<CycleRange> {
        self.cycle
    }
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette for PaletteRam {
    fn load(&mut self, res: u16) {
        log::debug!("palette {res}");
        self.loaded = Some(res);
        self.cycle = None;
    }

    fn fade_in(&mut self, ticks: u16) {
        log::debug!("fade in over {ticks} ticks");
        self.fade = 255;
    }

    fn fade_out(&mut self, ticks: u16) {
        log::debug!("fade out over {ticks} ticks");
        self.fade = 0;
    }

    fn set_block(&mut self, first: u8, count: u8, rgb: &[u8]) {
        for i in 0..count as usize {
            let entry = first as usize + i;
            if entry >= NUM_ENTRIES {
                log::error!("set_block: entry {entry} past the palette end");
                break;
            }
            let Some(triplet) = rgb.get(i * 3..i * 3 + 3) else {
                log::error!("set_block: rgb data ends before entry {entry}");
                break;
            };
            self.rgb[entry].copy_from_slice(triplet);
        }
    }

    fn blend(&mut self, level: u8) {
        self.blend = level;
    }

    fn cycle(&mut self, first: u8, last: u8, ticks: u16) {
        if last < first {
            log::error!("cycle: empty range {first}..{last}");
            self.cycle = None;
            return;
        }
        self.cycle = Some(CycleRange { first, last, ticks });
    }
}
