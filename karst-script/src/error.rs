/// Fatal interpreter errors.
///
/// The severity split is deliberate: everything in here means the script
/// content is corrupted or incompatible and there is no safe continuation.
/// Recoverable conditions (unknown game variable, inert natives) never
/// surface as a `VmError`; they log and execution continues.
#[derive(thiserror::Error, Debug)]
pub enum VmError {
    #[error("cursor out of range: slot={slot} offset=0x{offset:X}, code_len=0x{len:X}")]
    CursorOutOfRange { slot: u16, offset: u32, len: u32 },

    #[error("bad opcode: 0x{opcode:02X} at slot={slot} offset=0x{offset:X}")]
    BadOpcode { opcode: u8, slot: u16, offset: u16 },

    #[error("native index {index} out of range (table has {len} entries)")]
    NativeOutOfRange { index: u16, len: usize },

    #[error("native {index} ({name}) failed: {msg}")]
    Native { index: u16, name: &'static str, msg: String },

    #[error("local access out of bounds: offset={offset} window_len=0x{len:X}")]
    LocalOutOfBounds { offset: i32, len: u32 },

    #[error("stack overflow (sp=0x{sp:X})")]
    StackOverflow { sp: u16 },

    #[error("stack underflow (sp=0x{sp:X})")]
    StackUnderflow { sp: u16 },

    #[error("slot index {index} out of range (max {max})")]
    SlotOutOfRange { index: u16, max: u16 },

    #[error("slot {index} is reserved for the stack and cannot hold a resource")]
    SlotReserved { index: u16 },

    #[error("slot {index} is empty")]
    SlotEmpty { index: u16 },

    #[error("bad alu sub-op {op} at slot={slot} offset=0x{offset:X}")]
    BadAluOp { op: u8, slot: u16, offset: u16 },

    #[error("divide by zero at slot={slot} offset=0x{offset:X}")]
    DivideByZero { slot: u16, offset: u16 },

    #[error("save state malformed: {0}")]
    SaveState(String),
}
