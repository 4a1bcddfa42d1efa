//! Engine-global game variables.
//!
//! A second-level dispatch behind the `GameVarRead`/`GameVarWrite` natives.
//! Variables are typed 8- or 16-bit: 8-bit reads zero-extend, 8-bit writes
//! truncate to the low byte. An unknown index is content the interpreter
//! does not understand but can survive, so it warns and keeps going instead
//! of failing the instruction.

/// Variable indices as used by the bytecode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GameVar {
    MouseX = 0,
    MouseY = 1,
    MouseButton = 2,
    KeyCode = 3,
    CameraX = 4,
    CameraY = 5,
    HeroX = 6,
    HeroY = 7,
    HeroDir = 8,
    HeroSpeed = 9,
    WalkResult = 10,
    ScriptDelay = 11,
    MusicPlaying = 12,
    MovieFlag = 13,
    RandomSeed = 14,
    GameTicks = 15,
    BackdropId = 16,
    TextSpeed = 17,
    Brightness = 18,
    InputEnabled = 19,
    CursorVisible = 20,
    DebugMode = 21,
}

impl GameVar {
    pub fn from_index(index: u8) -> Option<GameVar> {
        use GameVar::*;
        Some(match index {
            0 => MouseX,
            1 => MouseY,
            2 => MouseButton,
            3 => KeyCode,
            4 => CameraX,
            5 => CameraY,
            6 => HeroX,
            7 => HeroY,
            8 => HeroDir,
            9 => HeroSpeed,
            10 => WalkResult,
            11 => ScriptDelay,
            12 => MusicPlaying,
            13 => MovieFlag,
            14 => RandomSeed,
            15 => GameTicks,
            16 => BackdropId,
            17 => TextSpeed,
            18 => Brightness,
            19 => InputEnabled,
            20 => CursorVisible,
            21 => DebugMode,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameVars {
    pub mouse_x: i16,
    pub mouse_y: i16,
    pub mouse_button: u8,
    pub key_code: u8,
    pub camera_x: i16,
    pub camera_y: i16,
    pub hero_x: i16,
    pub hero_y: i16,
    pub hero_dir: u8,
    pub hero_speed: u8,
    pub walk_result: u8,
    pub script_delay: i16,
    pub music_playing: u8,
    pub movie_flag: u8,
    pub random_seed: i16,
    pub game_ticks: i16,
    pub backdrop_id: i16,
    pub text_speed: u8,
    pub brightness: u8,
    pub input_enabled: u8,
    pub cursor_visible: u8,
    pub debug_mode: u8,
}

impl GameVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a variable by bytecode index. Unknown indices warn and read 0.
    pub fn read(&self, index: u8) -> i16 {
        use GameVar::*;
        let Some(var) = GameVar::from_index(index) else {
            log::warn!("game variable {index} unknown on read, returning 0");
            return 0;
        };
        match var {
            MouseX => self.mouse_x,
            MouseY => self.mouse_y,
            MouseButton => self.mouse_button as i16,
            KeyCode => self.key_code as i16,
            CameraX => self.camera_x,
            CameraY => self.camera_y,
            HeroX => self.hero_x,
            HeroY => self.hero_y,
            HeroDir => self.hero_dir as i16,
            HeroSpeed => self.hero_speed as i16,
            WalkResult => self.walk_result as i16,
            ScriptDelay => self.script_delay,
            MusicPlaying => self.music_playing as i16,
            MovieFlag => self.movie_flag as i16,
            RandomSeed => self.random_seed,
            GameTicks => self.game_ticks,
            BackdropId => self.backdrop_id,
            TextSpeed => self.text_speed as i16,
            Brightness => self.brightness as i16,
            InputEnabled => self.input_enabled as i16,
            CursorVisible => self.cursor_visible as i16,
            DebugMode => self.debug_mode as i16,
        }
    }

    /// Write a variable by bytecode index. Unknown indices warn and no-op.
    pub fn write(&mut self, index: u8, value: i16) {
        use GameVar::*;
        let Some(var) = GameVar::from_index(index) else {
            log::warn!("game variable {index} unknown on write, ignoring {value}");
            return;
        };
        match var {
            MouseX => self.mouse_x = value,
            MouseY => self.mouse_y = value,
            MouseButton => self.mouse_button = value as u8,
            KeyCode => self.key_code = value as u8,
            CameraX => self.camera_x = value,
            CameraY => self.camera_y = value,
            HeroX => self.hero_x = value,
            HeroY => self.hero_y = value,
            HeroDir => self.hero_dir = value as u8,
            HeroSpeed => self.hero_speed = value as u8,
            WalkResult => self.walk_result = value as u8,
            ScriptDelay => self.script_delay = value,
            MusicPlaying => self.music_playing = value as u8,
            MovieFlag => self.movie_flag = value as u8,
            RandomSeed => self.random_seed = value,
            GameTicks => self.game_ticks = value,
            BackdropId => self.backdrop_id = value,
            TextSpeed => self.text_speed = value as u8,
            Brightness => self.brightness = value as u8,
            InputEnabled => self.input_enabled = value as u8,
            CursorVisible => self.cursor_visible = value as u8,
            DebugMode => self.debug_mode = value as u8,
        }
    }

    /// One host frame worth of bookkeeping: advance the tick counter and
    /// run down a pending script delay.
    pub fn frame_tick(&mut self) {
        self.game_ticks = self.game_ticks.wrapping_add(1);
        if self.script_delay > 0 {
            self.script_delay -= 1;
        }
    }
}
