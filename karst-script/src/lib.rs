//! Bytecode interpreter for the adventure-engine script format.
//!
//! Scripts are raw little-endian byte buffers executed in place out of a
//! small slot store. The crate covers the instruction set, the native
//! function table through which scripts drive the engine, game variables,
//! bit-exact save states and the cooperative [`Driver`] loop. Everything
//! engine-specific sits behind the [`Host`] trait family, so the whole
//! interpreter runs under test against mock hosts.

pub mod driver;
pub mod error;
pub mod host;
pub mod machine;
pub mod native;
pub mod opcode;
pub mod savestate;
pub mod slots;
pub mod vars;

pub use driver::{Driver, DEFAULT_FRAME_INTERVAL_MS};
pub use error::VmError;
pub use host::{Animator, Host, Mixer, Palette, Screen, Walkmap};
pub use machine::{
    Machine, Pending, Reg, RunFor, Step, Window, NUM_REGS, STACK_SIZE, STACK_TOP,
};
pub use native::{NativeEntry, NativeFn, NativeTable, STANDARD_NAMES};
pub use opcode::{Opcode, Operands};
pub use slots::{SlotStore, NUM_SLOTS, STACK_SLOT};
pub use vars::{GameVar, GameVars};
