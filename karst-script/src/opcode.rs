//! The one-byte opcode set.
//!
//! Exactly 56 opcodes, 0x00..=0x37. Anything else is a fatal decode error:
//! scripts ship with the game data and are trusted content, so an unknown
//! byte means the resource is corrupted or from an incompatible build.

/// Closed enumeration of the bytecode opcodes.
///
/// Registers are encoded in the opcode byte itself (one opcode per register
/// for the hot immediate/move forms), everything else takes little-endian
/// inline operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// 0x00 native call: `len:u8, fn:u16`, then `len - 2` operand bytes
    Native = 0x00,

    /// 0x01..=0x08 load a 16-bit immediate into A/B/X/Y/CS/FS/T0/T1
    LdiA = 0x01,
    LdiB = 0x02,
    LdiX = 0x03,
    LdiY = 0x04,
    LdiCs = 0x05,
    LdiFs = 0x06,
    LdiT0 = 0x07,
    LdiT1 = 0x08,

    /// 0x09..=0x0F copy a register into the accumulator
    GetB = 0x09,
    GetX = 0x0A,
    GetY = 0x0B,
    GetCs = 0x0C,
    GetFs = 0x0D,
    GetT0 = 0x0E,
    GetT1 = 0x0F,

    /// 0x10..=0x16 copy the accumulator into a register
    PutB = 0x10,
    PutX = 0x11,
    PutY = 0x12,
    PutCs = 0x13,
    PutFs = 0x14,
    PutT0 = 0x15,
    PutT1 = 0x16,

    /// 0x17 load a byte from the local window (zero-extended)
    LdByte = 0x17,
    /// 0x18 load a 16-bit word from the local window
    LdWord = 0x18,
    /// 0x19 store the accumulator's low byte into the local window
    StByte = 0x19,
    /// 0x1A store the accumulator into the local window
    StWord = 0x1A,
    /// 0x1B..=0x1E the same four, indexed through X
    LdByteX = 0x1B,
    LdWordX = 0x1C,
    StByteX = 0x1D,
    StWordX = 0x1E,
    /// 0x1F..=0x22 the same four, indexed through Y
    LdByteY = 0x1F,
    LdWordY = 0x20,
    StByteY = 0x21,
    StWordY = 0x22,

    /// 0x23 read-modify-write a local word with the accumulator (add/sub/mul/div)
    AluWord = 0x23,
    /// 0x24 add a small signed constant to a local word in place
    StepWord = 0x24,

    /// 0x25 push the accumulator
    PushA = 0x25,
    /// 0x26 pop into the accumulator
    PopA = 0x26,
    /// 0x27 push the comparison operand register
    PushB = 0x27,
    /// 0x28 pop into the comparison operand register
    PopB = 0x28,

    /// 0x29 set the comparison target (literal or accumulator), equality mode
    CmpSet = 0x29,
    /// 0x2A set the comparison target (literal or accumulator), bitwise mode
    TstSet = 0x2A,

    /// 0x2B..=0x30 conditional branches over B vs the comparison target
    BrEq = 0x2B,
    BrNe = 0x2C,
    BrGe = 0x2D,
    BrLe = 0x2E,
    BrLt = 0x2F,
    BrGt = 0x30,

    /// 0x31 unconditional jump, i8 offset relative to the opcode byte
    Jump = 0x31,

    /// 0x32 jump to an absolute offset in the current slot, no frame
    CallNear = 0x32,
    /// 0x33 push return offset and slot, then jump within the current slot
    CallNearSave = 0x33,
    /// 0x34 switch to the far slot and jump, no frame
    CallFar = 0x34,
    /// 0x35 push return offset and slot, then switch to the far slot
    CallFarSave = 0x35,

    /// 0x36 pop slot and offset, resume there
    Ret = 0x36,
    /// 0x37 as Ret, then release A bytes of arguments from the stack
    RetArgs = 0x37,
}

/// Inline operand shape of an opcode, for decoding and disassembly.
///
/// `Native`, `CmpArm` and `Branch` are irregular: the native call carries its
/// own length byte, the comparison-setup opcodes only have an immediate when
/// the selector byte is zero, and branches end in the 4-byte-skip-then-byte-
/// jump shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    None,
    Imm16,
    LocalOff,
    AluLocal,
    StepLocal,
    CmpArm,
    Branch,
    JumpRel,
    CallOff,
    Native,
}

impl Opcode {
    /// Decode one opcode byte. `None` for anything outside the known set.
    pub fn decode(b: u8) -> Option<Opcode> {
        use Opcode::*;
        Some(match b {
            0x00 => Native,
            0x01 => LdiA,
            0x02 => LdiB,
            0x03 => LdiX,
            0x04 => LdiY,
            0x05 => LdiCs,
            0x06 => LdiFs,
            0x07 => LdiT0,
            0x08 => LdiT1,
            0x09 => GetB,
            0x0A => GetX,
            0x0B => GetY,
            0x0C => GetCs,
            0x0D => GetFs,
            0x0E => GetT0,
            0x0F => GetT1,
            0x10 => PutB,
            0x11 => PutX,
            0x12 => PutY,
            0x13 => PutCs,
            0x14 => PutFs,
            0x15 => PutT0,
            0x16 => PutT1,
            0x17 => LdByte,
            0x18 => LdWord,
            0x19 => StByte,
            0x1A => StWord,
            0x1B => LdByteX,
            0x1C => LdWordX,
            0x1D => StByteX,
            0x1E => StWordX,
            0x1F => LdByteY,
            0x20 => LdWordY,
            0x21 => StByteY,
            0x22 => StWordY,
            0x23 => AluWord,
            0x24 => StepWord,
            0x25 => PushA,
            0x26 => PopA,
            0x27 => PushB,
            0x28 => PopB,
            0x29 => CmpSet,
            0x2A => TstSet,
            0x2B => BrEq,
            0x2C => BrNe,
            0x2D => BrGe,
            0x2E => BrLe,
            0x2F => BrLt,
            0x30 => BrGt,
            0x31 => Jump,
            0x32 => CallNear,
            0x33 => CallNearSave,
            0x34 => CallFar,
            0x35 => CallFarSave,
            0x36 => Ret,
            0x37 => RetArgs,
            _ => return None,
        })
    }

    pub fn operands(self) -> Operands {
        use Opcode::*;
        match self {
            Native => Operands::Native,
            LdiA | LdiB | LdiX | LdiY | LdiCs | LdiFs | LdiT0 | LdiT1 => Operands::Imm16,
            GetB | GetX | GetY | GetCs | GetFs | GetT0 | GetT1 => Operands::None,
            PutB | PutX | PutY | PutCs | PutFs | PutT0 | PutT1 => Operands::None,
            LdByte | LdWord | StByte | StWord | LdByteX | LdWordX | StByteX | StWordX
            | LdByteY | LdWordY | StByteY | StWordY => Operands::LocalOff,
            AluWord => Operands::AluLocal,
            StepWord => Operands::StepLocal,
            PushA | PopA | PushB | PopB => Operands::None,
            CmpSet | TstSet => Operands::CmpArm,
            BrEq | BrNe | BrGe | BrLe | BrLt | BrGt => Operands::Branch,
            Jump => Operands::JumpRel,
            CallNear | CallNearSave | CallFar | CallFarSave => Operands::CallOff,
            Ret | RetArgs => Operands::None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Native => "native",
            LdiA => "ldi.a",
            LdiB => "ldi.b",
            LdiX => "ldi.x",
            LdiY => "ldi.y",
            LdiCs => "ldi.cs",
            LdiFs => "ldi.fs",
            LdiT0 => "ldi.t0",
            LdiT1 => "ldi.t1",
            GetB => "get.b",
            GetX => "get.x",
            GetY => "get.y",
            GetCs => "get.cs",
            GetFs => "get.fs",
            GetT0 => "get.t0",
            GetT1 => "get.t1",
            PutB => "put.b",
            PutX => "put.x",
            PutY => "put.y",
            PutCs => "put.cs",
            PutFs => "put.fs",
            PutT0 => "put.t0",
            PutT1 => "put.t1",
            LdByte => "ld.b",
            LdWord => "ld.w",
            StByte => "st.b",
            StWord => "st.w",
            LdByteX => "ld.b.x",
            LdWordX => "ld.w.x",
            StByteX => "st.b.x",
            StWordX => "st.w.x",
            LdByteY => "ld.b.y",
            LdWordY => "ld.w.y",
            StByteY => "st.b.y",
            StWordY => "st.w.y",
            AluWord => "alu.w",
            StepWord => "step.w",
            PushA => "push.a",
            PopA => "pop.a",
            PushB => "push.b",
            PopB => "pop.b",
            CmpSet => "cmp",
            TstSet => "tst",
            BrEq => "br.eq",
            BrNe => "br.ne",
            BrGe => "br.ge",
            BrLe => "br.le",
            BrLt => "br.lt",
            BrGt => "br.gt",
            Jump => "jump",
            CallNear => "call.n",
            CallNearSave => "call.ns",
            CallFar => "call.f",
            CallFarSave => "call.fs",
            Ret => "ret",
            RetArgs => "ret.a",
        }
    }
}
