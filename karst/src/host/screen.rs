//! Software compositor state.
//!
//! Keeps the sprite table, backdrop, clip rectangle and cursor bookkeeping
//! that the scripts drive. Actual rasterization is a renderer concern and
//! lives elsewhere; everything here is observable state.

use karst_script::Screen;

pub const NUM_SPRITES: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteRecord {
    pub res: u16,
    pub frame: u8,
    pub x: i16,
    pub y: i16,
    pub z: u8,
    pub flip: u8,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

#[derive(Debug)]
pub struct ScreenState {
    backdrop: Option<u16>,
    sprites: [SpriteRecord; NUM_SPRITES],
    clip: Option<ClipRect>,
    cursor_visible: bool,
    cursor_res: u16,
    cursor_frame: u8,
    shake: u8,
    scroll: (i16, i16),
}

impl ScreenState {
    pub fn new() -> Self {
        Self {
            backdrop: None,
            sprites: [SpriteRecord::default(); NUM_SPRITES],
            clip: None,
            cursor_visible: true,
            cursor_res: 0,
            cursor_frame: 0,
            shake: 0,
            scroll: (0, 0),
        }
    }

    pub fn backdrop(&self) -> Option<u16> {
        self.backdrop
    }

    pub fn sprite(&self, id: u8) -> Option<&SpriteRecord> {
        self.sprites.get(id as usize)
    }

    pub fn clip(&self) -> Option<ClipRect> {
        self.clip
    }

    pub fn scroll_offset(&self) -> (i16, i16) {
        self.scroll
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn cursor(&self) -> (u16, u8) {
        (self.cursor_res, self.cursor_frame)
    }

    pub fn shake_amount(&self) -> u8 {
        self.shake
    }

    fn sprite_mut(&mut self, id: u8, what: &str) -> Option<&mut SpriteRecord> {
        if id as usize >= NUM_SPRITES {
            log::error!("{what}: invalid sprite {id}");
            return None;
        }
        Some(&mut self.sprites[id as usize])
    }
}

impl Default for ScreenState {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for ScreenState {
    fn backdrop_draw(&mut self, res: u16) {
        log::debug!("backdrop {res}");
        self.backdrop = Some(res);
        // a fresh backdrop implies a fresh scene
        self.sprites = [SpriteRecord::default(); NUM_SPRITES];
        self.scroll = (0, 0);
    }

    fn sprite_draw(&mut self, id: u8, res: u16, frame: u8, x: i16, y: i16) {
        if let Some(s) = self.sprite_mut(id, "sprite_draw") {
            s.res = res;
            s.frame = frame;
            s.x = x;
            s.y = y;
            s.visible = true;
        }
    }

    fn sprite_move(&mut self, id: u8, x: i16, y: i16) {
        if let Some(s) = self.sprite_mut(id, "sprite_move") {
            s.x = x;
            s.y = y;
        }
    }

    fn sprite_z(&mut self, id: u8, z: u8) {
        if let Some(s) = self.sprite_mut(id, "sprite_z") {
            s.z = z;
        }
    }

    fn sprite_hide(&mut self, id: u8) {
        if let Some(s) = self.sprite_mut(id, "sprite_hide") {
            s.visible = false;
        }
    }

    fn sprite_flip(&mut self, id: u8, flags: u8) {
        if let Some(s) = self.sprite_mut(id, "sprite_flip") {
            s.flip = flags;
        }
    }

    fn rect_fill(&mut self, x: i16, y: i16, w: i16, h: i16, color: u8) {
        log::trace!("fill {w}x{h} at {x},{y} color {color}");
    }

    fn rect_copy(&mut self, sx: i16, sy: i16, w: i16, h: i16, dx: i16, dy: i16) {
        log::trace!("copy {w}x{h} from {sx},{sy} to {dx},{dy}");
    }

    fn clip_set(&mut self, x: i16, y: i16, w: i16, h: i16) {
        self.clip = Some(ClipRect { x, y, w, h });
    }

    fn clip_clear(&mut self) {
        self.clip = None;
    }

    fn text_draw(&mut self, x: i16, y: i16, text: &[u8]) {
        log::debug!("text at {x},{y}: {:?}", String::from_utf8_lossy(text));
    }

    fn cursor_show(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn cursor_shape(&mut self, res: u16, frame: u8) {
        self.cursor_res = res;
        self.cursor_frame = frame;
    }

    fn shake(&mut self, amount: u8) {
        self.shake = amount;
    }

    fn scroll(&mut self, dx: i16, dy: i16) {
        let (x, y) = self.scroll;
        self.scroll = (x.wrapping_add(dx), y.wrapping_add(dy));
    }
}
