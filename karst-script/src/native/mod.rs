//! The native function table: engine services callable from bytecode.
//!
//! Opcode 0x00 addresses entries by table index and nothing else, so the
//! list is ordered and append-only; reordering or removing an entry breaks
//! every script ever shipped. Handlers read their operands themselves via
//! [`Machine::byte_arg`]/[`Machine::word_arg`] relative to the start of the
//! calling instruction; each entry's operand offsets are its own contract.

use std::fmt;

use crate::host::Host;
use crate::machine::Machine;

mod anim;
mod palette;
mod screen;
mod sound;
mod state;
mod walk;

/// A native handler. Errors are wrapped into [`crate::VmError::Native`]
/// with the entry's name and abort the run.
pub type NativeFn<H> = fn(&mut Machine<H>, &mut H) -> anyhow::Result<()>;

pub struct NativeEntry<H: Host> {
    pub name: &'static str,
    pub run: NativeFn<H>,
}

impl<H: Host> Clone for NativeEntry<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: Host> Copy for NativeEntry<H> {}

/// Entry names in table order, for tooling that has no host to run with.
pub const STANDARD_NAMES: [&str; 60] = [
    "Update",
    "BackdropDraw",
    "SpriteDraw",
    "SpriteMove",
    "SpriteZ",
    "SpriteHide",
    "SpriteFlip",
    "RectFill",
    "RectCopy",
    "ClipSet",
    "ClipClear",
    "TextDraw",
    "CursorShow",
    "CursorShape",
    "ScreenShake",
    "ScreenScroll",
    "PaletteLoad",
    "PaletteFadeIn",
    "PaletteFadeOut",
    "PaletteSetBlock",
    "PaletteBlend",
    "PaletteCycle",
    "SfxPlay",
    "SfxStop",
    "SfxLoop",
    "MusicPlay",
    "MusicStop",
    "MusicVolume",
    "SoundFlush",
    "SfxPlaying",
    "SegmentMapLoad",
    "WalkTo",
    "WalkStop",
    "PointWalkable",
    "SegmentAt",
    "SegmentEnable",
    "AnimStart",
    "AnimStop",
    "AnimPhase",
    "AnimRunning",
    "ActorFace",
    "ActorPlace",
    "GameVarRead",
    "GameVarWrite",
    "ScriptLoad",
    "StackSave",
    "StackRestore",
    "Random",
    "Pause",
    "InputFlush",
    "GameSave",
    "GameLoad",
    "GameQuit",
    "MovieStart",
    "MovieStop",
    "MoviePlaying",
    "HeroLight",
    "RoomEffect",
    "DebugDump",
    "Nop",
];

pub struct NativeTable<H: Host> {
    entries: Vec<NativeEntry<H>>,
}

impl<H: Host> NativeTable<H> {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The full table every shipped script is compiled against.
    pub fn standard() -> Self {
        let specs: [(&'static str, NativeFn<H>); 60] = [
            ("Update", state::update),
            ("BackdropDraw", screen::backdrop_draw),
            ("SpriteDraw", screen::sprite_draw),
            ("SpriteMove", screen::sprite_move),
            ("SpriteZ", screen::sprite_z),
            ("SpriteHide", screen::sprite_hide),
            ("SpriteFlip", screen::sprite_flip),
            ("RectFill", screen::rect_fill),
            ("RectCopy", screen::rect_copy),
            ("ClipSet", screen::clip_set),
            ("ClipClear", screen::clip_clear),
            ("TextDraw", screen::text_draw),
            ("CursorShow", screen::cursor_show),
            ("CursorShape", screen::cursor_shape),
            ("ScreenShake", screen::shake),
            ("ScreenScroll", screen::scroll),
            ("PaletteLoad", palette::load),
            ("PaletteFadeIn", palette::fade_in),
            ("PaletteFadeOut", palette::fade_out),
            ("PaletteSetBlock", palette::set_block),
            ("PaletteBlend", palette::blend),
            ("PaletteCycle", palette::cycle),
            ("SfxPlay", sound::sfx_play),
            ("SfxStop", sound::sfx_stop),
            ("SfxLoop", sound::sfx_loop),
            ("MusicPlay", sound::music_play),
            ("MusicStop", sound::music_stop),
            ("MusicVolume", sound::music_volume),
            ("SoundFlush", sound::flush),
            ("SfxPlaying", sound::sfx_playing),
            ("SegmentMapLoad", walk::map_load),
            ("WalkTo", walk::walk_to),
            ("WalkStop", walk::walk_stop),
            ("PointWalkable", walk::point_walkable),
            ("SegmentAt", walk::segment_at),
            ("SegmentEnable", walk::segment_enable),
            ("AnimStart", anim::start),
            ("AnimStop", anim::stop),
            ("AnimPhase", anim::phase),
            ("AnimRunning", anim::running),
            ("ActorFace", anim::face),
            ("ActorPlace", anim::place),
            ("GameVarRead", state::game_var_read),
            ("GameVarWrite", state::game_var_write),
            ("ScriptLoad", state::script_load),
            ("StackSave", state::stack_save),
            ("StackRestore", state::stack_restore),
            ("Random", state::random),
            ("Pause", state::pause),
            ("InputFlush", state::input_flush),
            ("GameSave", state::game_save),
            ("GameLoad", state::game_load),
            ("GameQuit", state::game_quit),
            ("MovieStart", state::movie_start),
            ("MovieStop", state::movie_stop),
            ("MoviePlaying", state::movie_playing),
            ("HeroLight", state::hero_light),
            ("RoomEffect", state::room_effect),
            ("DebugDump", state::debug_dump),
            ("Nop", state::nop),
        ];
        let mut table = Self::empty();
        for (name, run) in specs {
            table.push(name, run);
        }
        table
    }

    /// Append an entry; the new index is `len() - 1`.
    pub fn push(&mut self, name: &'static str, run: NativeFn<H>) {
        self.entries.push(NativeEntry { name, run });
    }

    pub fn get(&self, index: u16) -> Option<NativeEntry<H>> {
        self.entries.get(index as usize).copied()
    }

    pub fn name(&self, index: u16) -> Option<&'static str> {
        self.entries.get(index as usize).map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Host> fmt::Debug for NativeTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeTable")
            .field("entries", &self.entries.len())
            .finish()
    }
}
