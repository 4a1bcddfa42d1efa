//! The interpreter core: register file, script stack, local-data window and
//! the one-instruction-at-a-time dispatcher.
//!
//! Execution state is an offset (`cursor`) into the code region named by the
//! `CS` register, never a raw pointer, so a slot reload under a running
//! script cannot dangle. Every memory access is bounds-checked and turns the
//! original format's silent corruption cases into fatal [`VmError`]s.

use byteorder::{ByteOrder, LittleEndian};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::VmError;
use crate::host::Host;
use crate::native::NativeTable;
use crate::opcode::Opcode;
use crate::slots::{SlotStore, NUM_SLOTS, STACK_SLOT};
use crate::vars::GameVars;

pub const NUM_REGS: usize = 8;

/// Script stack size in bytes. The stack doubles as the code/data region of
/// [`STACK_SLOT`].
pub const STACK_SIZE: usize = 0x200;

/// Initial stack pointer; pushes grow downward from here.
pub const STACK_TOP: u16 = (STACK_SIZE - 2) as u16;

/// The eight general registers by role.
///
/// `A` is the accumulator every ALU and memory opcode implicitly works
/// through; `B` is the comparison operand the branches test; `X`/`Y` index
/// the local window; `CS`/`FS` name the current and far script slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Reg {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    Cs = 4,
    Fs = 5,
    T0 = 6,
    T1 = 7,
}

bitflags::bitflags! {
    /// Pending window relocations, consumed one per instruction boundary.
    ///
    /// Control transfers arm these instead of moving the window directly;
    /// the instruction that performed the transfer still sees the old
    /// window. `FAR_WINDOW` outranks `STACK_WINDOW` outranks `NEAR_WINDOW`,
    /// and consuming the far flag re-arms the near one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pending: u8 {
        const FAR_WINDOW = 1 << 0;
        const STACK_WINDOW = 1 << 1;
        const NEAR_WINDOW = 1 << 2;
    }
}

/// Where local-memory opcodes currently read and write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    Slot(u16),
    Stack,
}

impl Window {
    pub fn for_slot(slot: u16) -> Window {
        if slot == STACK_SLOT {
            Window::Stack
        } else {
            Window::Slot(slot)
        }
    }
}

/// Outcome of a single [`Machine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Running,
    Halted,
}

/// Outcome of [`Machine::run_for`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunFor {
    pub halted: bool,
    pub steps: u64,
}

/// Branch relations; the ordered four compare bit patterns as unsigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cond {
    Eq,
    Ne,
    Ge,
    Le,
    Lt,
    Gt,
}

#[derive(Debug)]
pub struct Machine<H: Host> {
    pub(crate) regs: [i16; NUM_REGS],
    pub(crate) sp: u16,
    pub(crate) aux_sp: u16,
    /// Comparison target set by `CmpSet`/`TstSet`.
    pub(crate) cmp: i16,
    /// One-shot: `TstSet` arms it, the next branch consumes it.
    pub(crate) cmp_bitwise: bool,
    pub(crate) pending: Pending,
    pub(crate) window: Window,
    /// Offset of the next byte to fetch, relative to the current slot's base.
    pub(crate) cursor: u16,
    /// Offset of the opcode byte of the instruction being executed.
    pub(crate) instr: u16,
    pub(crate) slots: SlotStore,
    pub(crate) stack: [u8; STACK_SIZE],
    pub(crate) vars: GameVars,
    rng: SmallRng,
    halted: bool,
    restore_request: Option<u8>,
    frame_service: bool,
    natives: NativeTable<H>,
}

impl<H: Host> Machine<H> {
    pub fn new(natives: NativeTable<H>) -> Self {
        Self {
            regs: [0; NUM_REGS],
            sp: STACK_TOP,
            aux_sp: STACK_TOP,
            cmp: 0,
            cmp_bitwise: false,
            pending: Pending::empty(),
            window: Window::Slot(0),
            cursor: 0,
            instr: 0,
            slots: SlotStore::new(),
            stack: [0; STACK_SIZE],
            vars: GameVars::default(),
            rng: SmallRng::seed_from_u64(0),
            halted: false,
            restore_request: None,
            frame_service: false,
            natives,
        }
    }

    pub fn with_standard_natives() -> Self {
        Self::new(NativeTable::standard())
    }

    /// Reset execution state and enter `entry` at offset 0. Game variables,
    /// slot contents and the RNG survive a re-boot.
    pub fn boot(&mut self, entry: u16) -> Result<(), VmError> {
        if entry >= NUM_SLOTS {
            return Err(VmError::SlotOutOfRange {
                index: entry,
                max: NUM_SLOTS - 1,
            });
        }
        if entry != STACK_SLOT && self.slots.is_empty(entry)? {
            return Err(VmError::SlotEmpty { index: entry });
        }
        self.regs = [0; NUM_REGS];
        self.regs[Reg::Cs as usize] = entry as i16;
        self.sp = STACK_TOP;
        self.aux_sp = STACK_TOP;
        self.cmp = 0;
        self.cmp_bitwise = false;
        self.pending = Pending::empty();
        self.window = Window::for_slot(entry);
        self.cursor = 0;
        self.instr = 0;
        self.halted = false;
        self.restore_request = None;
        Ok(())
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self, host: &mut H) -> Result<Step, VmError> {
        if self.halted {
            return Ok(Step::Halted);
        }
        self.service_window();
        self.instr = self.cursor;
        let byte = self.fetch_u8()?;
        let op = Opcode::decode(byte).ok_or(VmError::BadOpcode {
            opcode: byte,
            slot: self.cs(),
            offset: self.instr,
        })?;
        self.dispatch(op, host)?;
        Ok(if self.halted { Step::Halted } else { Step::Running })
    }

    /// Step at most `budget` instructions; stops early only on halt or error.
    pub fn run_for(&mut self, host: &mut H, budget: u64) -> Result<RunFor, VmError> {
        let mut steps = 0;
        while steps < budget {
            if self.halted {
                break;
            }
            self.step(host)?;
            steps += 1;
        }
        Ok(RunFor {
            halted: self.halted,
            steps,
        })
    }

    fn dispatch(&mut self, op: Opcode, host: &mut H) -> Result<(), VmError> {
        use Opcode::*;
        match op {
            Native => self.op_native(host),

            LdiA => self.op_ldi(Reg::A),
            LdiB => self.op_ldi(Reg::B),
            LdiX => self.op_ldi(Reg::X),
            LdiY => self.op_ldi(Reg::Y),
            LdiCs => self.op_ldi(Reg::Cs),
            LdiFs => self.op_ldi(Reg::Fs),
            LdiT0 => self.op_ldi(Reg::T0),
            LdiT1 => self.op_ldi(Reg::T1),

            GetB => self.op_get(Reg::B),
            GetX => self.op_get(Reg::X),
            GetY => self.op_get(Reg::Y),
            GetCs => self.op_get(Reg::Cs),
            GetFs => self.op_get(Reg::Fs),
            GetT0 => self.op_get(Reg::T0),
            GetT1 => self.op_get(Reg::T1),

            PutB => self.op_put(Reg::B),
            PutX => self.op_put(Reg::X),
            PutY => self.op_put(Reg::Y),
            PutCs => self.op_put(Reg::Cs),
            PutFs => self.op_put(Reg::Fs),
            PutT0 => self.op_put(Reg::T0),
            PutT1 => self.op_put(Reg::T1),

            LdByte => self.op_local_load(false, None),
            LdWord => self.op_local_load(true, None),
            StByte => self.op_local_store(false, None),
            StWord => self.op_local_store(true, None),
            LdByteX => self.op_local_load(false, Some(Reg::X)),
            LdWordX => self.op_local_load(true, Some(Reg::X)),
            StByteX => self.op_local_store(false, Some(Reg::X)),
            StWordX => self.op_local_store(true, Some(Reg::X)),
            LdByteY => self.op_local_load(false, Some(Reg::Y)),
            LdWordY => self.op_local_load(true, Some(Reg::Y)),
            StByteY => self.op_local_store(false, Some(Reg::Y)),
            StWordY => self.op_local_store(true, Some(Reg::Y)),

            AluWord => self.op_alu_word(),
            StepWord => self.op_step_word(),

            PushA => self.op_push_reg(Reg::A),
            PopA => self.op_pop_reg(Reg::A),
            PushB => self.op_push_reg(Reg::B),
            PopB => self.op_pop_reg(Reg::B),

            CmpSet => self.op_cmp_arm(false),
            TstSet => self.op_cmp_arm(true),

            BrEq => self.op_branch(Cond::Eq),
            BrNe => self.op_branch(Cond::Ne),
            BrGe => self.op_branch(Cond::Ge),
            BrLe => self.op_branch(Cond::Le),
            BrLt => self.op_branch(Cond::Lt),
            BrGt => self.op_branch(Cond::Gt),

            Jump => self.op_jump(),

            CallNear => self.op_call(false, false),
            CallNearSave => self.op_call(false, true),
            CallFar => self.op_call(true, false),
            CallFarSave => self.op_call(true, true),
            Ret => self.op_ret(false),
            RetArgs => self.op_ret(true),
        }
    }

    // ---- opcode bodies ------------------------------------------------

    /// 0x00: `[len:u8][fn:u16][operands]`. The entry reads its operands via
    /// [`byte_arg`](Self::byte_arg)/[`word_arg`](Self::word_arg); afterwards
    /// the cursor lands on `instr + 2 + len` whatever the entry did to it.
    fn op_native(&mut self, host: &mut H) -> Result<(), VmError> {
        let len = self.fetch_u8()?;
        let index = self.fetch_u16()?;
        let entry = self.natives.get(index).ok_or(VmError::NativeOutOfRange {
            index,
            len: self.natives.len(),
        })?;
        log::trace!("native {index} {} len={len}", entry.name);
        (entry.run)(self, host).map_err(|e| VmError::Native {
            index,
            name: entry.name,
            msg: format!("{e:#}"),
        })?;
        let end = self.instr as i32 + 2 + len as i32;
        self.advance_to(end)
    }

    /// 0x01–0x08: load a 16-bit immediate into a register.
    fn op_ldi(&mut self, r: Reg) -> Result<(), VmError> {
        let v = self.fetch_i16()?;
        self.regs[r as usize] = v;
        Ok(())
    }

    /// 0x09–0x0F: `A = r`.
    fn op_get(&mut self, r: Reg) -> Result<(), VmError> {
        self.regs[Reg::A as usize] = self.regs[r as usize];
        Ok(())
    }

    /// 0x10–0x16: `r = A`.
    fn op_put(&mut self, r: Reg) -> Result<(), VmError> {
        self.regs[r as usize] = self.regs[Reg::A as usize];
        Ok(())
    }

    /// 0x17–0x22 loads: `A = window[off + index]`, byte loads zero-extend.
    fn op_local_load(&mut self, wide: bool, index: Option<Reg>) -> Result<(), VmError> {
        let off = self.fetch_i16()?;
        let eff = off as i32 + self.index_val(index);
        let v = if wide {
            self.local_read_i16(eff)?
        } else {
            self.local_read_u8(eff)? as i16
        };
        self.regs[Reg::A as usize] = v;
        Ok(())
    }

    /// 0x17–0x22 stores: `window[off + index] = A`, byte stores truncate.
    fn op_local_store(&mut self, wide: bool, index: Option<Reg>) -> Result<(), VmError> {
        let off = self.fetch_i16()?;
        let eff = off as i32 + self.index_val(index);
        let a = self.regs[Reg::A as usize];
        if wide {
            self.local_write_i16(eff, a)
        } else {
            self.local_write_u8(eff, a as u8)
        }
    }

    /// 0x23: 16-bit read-modify-write against the accumulator, wrapping.
    fn op_alu_word(&mut self) -> Result<(), VmError> {
        let sub = self.fetch_u8()?;
        let off = self.fetch_i16()? as i32;
        let cur = self.local_read_i16(off)?;
        let a = self.regs[Reg::A as usize];
        let v = match sub {
            0 => cur.wrapping_add(a),
            1 => cur.wrapping_sub(a),
            2 => cur.wrapping_mul(a),
            3 => {
                if a == 0 {
                    return Err(VmError::DivideByZero {
                        slot: self.cs(),
                        offset: self.instr,
                    });
                }
                cur.wrapping_div(a)
            }
            _ => {
                return Err(VmError::BadAluOp {
                    op: sub,
                    slot: self.cs(),
                    offset: self.instr,
                })
            }
        };
        self.local_write_i16(off, v)
    }

    /// 0x24: `window[off] += delta` in place, wrapping.
    fn op_step_word(&mut self) -> Result<(), VmError> {
        let delta = self.fetch_i8()?;
        let off = self.fetch_i16()? as i32;
        let cur = self.local_read_i16(off)?;
        self.local_write_i16(off, cur.wrapping_add(delta as i16))
    }

    fn op_push_reg(&mut self, r: Reg) -> Result<(), VmError> {
        let v = self.regs[r as usize];
        self.push(v)
    }

    fn op_pop_reg(&mut self, r: Reg) -> Result<(), VmError> {
        let v = self.pop()?;
        self.regs[r as usize] = v;
        Ok(())
    }

    /// 0x29/0x2A: set the comparison target from an immediate (`src == 0`)
    /// or the accumulator, and select equality or bitwise mode.
    fn op_cmp_arm(&mut self, bitwise: bool) -> Result<(), VmError> {
        let src = self.fetch_u8()?;
        self.cmp = if src == 0 {
            self.fetch_i16()?
        } else {
            self.regs[Reg::A as usize]
        };
        self.cmp_bitwise = bitwise;
        Ok(())
    }

    /// 0x2B–0x30: compare `B` with the comparison target, then walk the
    /// dual-operand shape. Taken skips the 4 literal bytes; not-taken reads
    /// them as two chained 16-bit jump offsets. Either way the trailing
    /// byte jump applies at the landing position. Under bitwise mode the
    /// equality pair first folds `B &= cmp` (observable) and tests the
    /// result against zero; the mode resets on every branch.
    fn op_branch(&mut self, cond: Cond) -> Result<(), VmError> {
        let bitwise = self.cmp_bitwise;
        self.cmp_bitwise = false;
        let b = self.regs[Reg::B as usize];
        let cmp = self.cmp;
        let taken = match (cond, bitwise) {
            (Cond::Eq, true) => {
                let masked = b & cmp;
                self.regs[Reg::B as usize] = masked;
                masked == 0
            }
            (Cond::Ne, true) => {
                let masked = b & cmp;
                self.regs[Reg::B as usize] = masked;
                masked != 0
            }
            (Cond::Eq, false) => b == cmp,
            (Cond::Ne, false) => b != cmp,
            (Cond::Ge, _) => (b as u16) >= (cmp as u16),
            (Cond::Le, _) => (b as u16) <= (cmp as u16),
            (Cond::Lt, _) => (b as u16) < (cmp as u16),
            (Cond::Gt, _) => (b as u16) > (cmp as u16),
        };
        if taken {
            self.cursor = self.instr.wrapping_add(5);
        } else {
            let w1 = self.fetch_u16()?;
            self.cursor = self.cursor.wrapping_add(w1);
            let w2 = self.fetch_u16()?;
            self.cursor = self.cursor.wrapping_add(w2);
        }
        let jpos = self.cursor;
        let j = self.fetch_i8()?;
        self.jump_to(jpos as i32 + j as i32)
    }

    /// 0x31: byte jump relative to the instruction itself; offset 0 is a
    /// legitimate tight loop.
    fn op_jump(&mut self) -> Result<(), VmError> {
        let j = self.fetch_i8()?;
        self.jump_to(self.instr as i32 + j as i32)
    }

    /// 0x32–0x35. The `save` variants push the return offset (`instr + 3`)
    /// and then the caller's slot; far calls switch `CS` to `FS`. The
    /// destination decides which relocation flag gets armed, and the window
    /// itself stays put until the next instruction boundary.
    fn op_call(&mut self, far: bool, save: bool) -> Result<(), VmError> {
        let off = self.fetch_u16()?;
        let ret = self.cursor;
        let from = self.cs();
        let dest = if far { self.fs() } else { from };
        if save {
            self.push(ret as i16)?;
            self.push(from as i16)?;
        }
        if far {
            self.regs[Reg::Cs as usize] = dest as i16;
        }
        self.arm_transfer(dest, far);
        self.enter(dest, off)
    }

    /// 0x36/0x37: pop the slot, then the offset, and resume there.
    /// `RetArgs` additionally releases the caller's argument bytes by
    /// adding `A` to the stack pointer.
    fn op_ret(&mut self, clean_args: bool) -> Result<(), VmError> {
        let slot = self.pop()? as u16;
        let off = self.pop()? as u16;
        self.regs[Reg::Cs as usize] = slot as i16;
        self.arm_transfer(slot, false);
        self.enter(slot, off)?;
        if clean_args {
            let sp = self.sp.wrapping_add(self.regs[Reg::A as usize] as u16);
            if sp as usize + 2 > STACK_SIZE {
                return Err(VmError::StackUnderflow { sp });
            }
            self.sp = sp;
        }
        Ok(())
    }

    // ---- window & relocation ------------------------------------------

    /// Consume at most one pending relocation flag. Far wins over stack
    /// wins over near, and far leaves the near flag armed so the window
    /// settles onto `CS` one boundary later.
    fn service_window(&mut self) {
        if self.pending.contains(Pending::FAR_WINDOW) {
            self.window = Window::for_slot(self.fs());
            self.pending.remove(Pending::FAR_WINDOW);
            self.pending.insert(Pending::NEAR_WINDOW);
        } else if self.pending.contains(Pending::STACK_WINDOW) {
            self.window = Window::Stack;
            self.pending.remove(Pending::STACK_WINDOW);
        } else if self.pending.contains(Pending::NEAR_WINDOW) {
            self.window = Window::for_slot(self.cs());
            self.pending.remove(Pending::NEAR_WINDOW);
        }
    }

    fn arm_transfer(&mut self, dest: u16, far: bool) {
        if dest == STACK_SLOT {
            self.pending.insert(Pending::STACK_WINDOW);
        } else if far {
            self.pending.insert(Pending::FAR_WINDOW);
        } else {
            self.pending.insert(Pending::NEAR_WINDOW);
        }
    }

    // ---- code fetch ----------------------------------------------------

    fn cs(&self) -> u16 {
        self.regs[Reg::Cs as usize] as u16
    }

    fn fs(&self) -> u16 {
        self.regs[Reg::Fs as usize] as u16
    }

    fn code(&self, slot: u16) -> Result<&[u8], VmError> {
        if slot == STACK_SLOT {
            Ok(&self.stack)
        } else {
            self.slots.bytes(slot)
        }
    }

    fn code_len(&self, slot: u16) -> Result<usize, VmError> {
        if slot == STACK_SLOT {
            Ok(STACK_SIZE)
        } else {
            self.slots.len(slot)
        }
    }

    fn fetch_u8(&mut self) -> Result<u8, VmError> {
        let slot = self.cs();
        let pos = self.cursor as usize;
        let b = {
            let code = self.code(slot)?;
            *code.get(pos).ok_or_else(|| VmError::CursorOutOfRange {
                slot,
                offset: pos as u32,
                len: code.len() as u32,
            })?
        };
        self.cursor = self.cursor.wrapping_add(1);
        Ok(b)
    }

    fn fetch_i8(&mut self) -> Result<i8, VmError> {
        self.fetch_u8().map(|b| b as i8)
    }

    fn fetch_u16(&mut self) -> Result<u16, VmError> {
        let slot = self.cs();
        let pos = self.cursor as usize;
        let v = {
            let code = self.code(slot)?;
            if pos + 2 > code.len() {
                return Err(VmError::CursorOutOfRange {
                    slot,
                    offset: pos as u32,
                    len: code.len() as u32,
                });
            }
            LittleEndian::read_u16(&code[pos..pos + 2])
        };
        self.cursor = self.cursor.wrapping_add(2);
        Ok(v)
    }

    fn fetch_i16(&mut self) -> Result<i16, VmError> {
        self.fetch_u16().map(|v| v as i16)
    }

    /// Land a jump strictly inside the current code region.
    fn jump_to(&mut self, target: i32) -> Result<(), VmError> {
        let slot = self.cs();
        let len = self.code_len(slot)?;
        if target < 0 || target as usize >= len {
            return Err(VmError::CursorOutOfRange {
                slot,
                offset: target as u32,
                len: len as u32,
            });
        }
        self.cursor = target as u16;
        Ok(())
    }

    /// Like [`jump_to`](Self::jump_to) but tolerates the end-of-code rest
    /// position, which a trailing native call legitimately advances to.
    fn advance_to(&mut self, target: i32) -> Result<(), VmError> {
        let slot = self.cs();
        let len = self.code_len(slot)?;
        if target < 0 || target as usize > len {
            return Err(VmError::CursorOutOfRange {
                slot,
                offset: target as u32,
                len: len as u32,
            });
        }
        self.cursor = target as u16;
        Ok(())
    }

    fn enter(&mut self, slot: u16, off: u16) -> Result<(), VmError> {
        let len = self.code_len(slot)?;
        if off as usize >= len {
            return Err(VmError::CursorOutOfRange {
                slot,
                offset: off as u32,
                len: len as u32,
            });
        }
        self.cursor = off;
        Ok(())
    }

    // ---- local window access -------------------------------------------

    fn index_val(&self, index: Option<Reg>) -> i32 {
        match index {
            Some(r) => self.regs[r as usize] as i32,
            None => 0,
        }
    }

    fn window_buf(&self) -> Result<&[u8], VmError> {
        match self.window {
            Window::Stack => Ok(&self.stack),
            Window::Slot(i) => self.slots.bytes(i),
        }
    }

    fn local_span(&self, off: i32, width: usize) -> Result<usize, VmError> {
        let len = match self.window {
            Window::Stack => STACK_SIZE,
            Window::Slot(i) => self.slots.len(i)?,
        };
        if off < 0 || off as usize + width > len {
            return Err(VmError::LocalOutOfBounds {
                offset: off,
                len: len as u32,
            });
        }
        Ok(off as usize)
    }

    fn local_read_u8(&self, off: i32) -> Result<u8, VmError> {
        let idx = self.local_span(off, 1)?;
        Ok(self.window_buf()?[idx])
    }

    fn local_read_i16(&self, off: i32) -> Result<i16, VmError> {
        let idx = self.local_span(off, 2)?;
        let buf = self.window_buf()?;
        Ok(LittleEndian::read_i16(&buf[idx..idx + 2]))
    }

    fn local_write_u8(&mut self, off: i32, v: u8) -> Result<(), VmError> {
        let idx = self.local_span(off, 1)?;
        self.window_buf_mut()?[idx] = v;
        Ok(())
    }

    fn local_write_i16(&mut self, off: i32, v: i16) -> Result<(), VmError> {
        let idx = self.local_span(off, 2)?;
        let buf = self.window_buf_mut()?;
        LittleEndian::write_i16(&mut buf[idx..idx + 2], v);
        Ok(())
    }

    fn window_buf_mut(&mut self) -> Result<&mut [u8], VmError> {
        match self.window {
            Window::Stack => Ok(&mut self.stack),
            Window::Slot(i) => {
                let slot = self
                    .slots
                    .raw_mut()
                    .get_mut(i as usize)
                    .ok_or(VmError::SlotOutOfRange {
                        index: i,
                        max: NUM_SLOTS - 1,
                    })?;
                Ok(&mut slot.bytes)
            }
        }
    }

    /// Zero-terminated byte string from the local window, terminator
    /// excluded. A missing terminator is an out-of-bounds read.
    pub fn local_cstr(&self, off: i32) -> Result<&[u8], VmError> {
        let start = self.local_span(off, 1)?;
        let buf = self.window_buf()?;
        match buf[start..].iter().position(|&b| b == 0) {
            Some(n) => Ok(&buf[start..start + n]),
            None => Err(VmError::LocalOutOfBounds {
                offset: off,
                len: buf.len() as u32,
            }),
        }
    }

    /// `n` raw bytes from the local window.
    pub fn local_slice(&self, off: i32, n: usize) -> Result<&[u8], VmError> {
        let start = self.local_span(off, n)?;
        let buf = self.window_buf()?;
        Ok(&buf[start..start + n])
    }

    // ---- script stack ---------------------------------------------------

    /// Write a 16-bit value at `sp`, then move `sp` down.
    pub fn push(&mut self, v: i16) -> Result<(), VmError> {
        let sp = self.sp as usize;
        if sp + 2 > STACK_SIZE || self.sp < 2 {
            return Err(VmError::StackOverflow { sp: self.sp });
        }
        LittleEndian::write_i16(&mut self.stack[sp..sp + 2], v);
        self.sp -= 2;
        Ok(())
    }

    /// Move `sp` up, then read the 16-bit value there.
    pub fn pop(&mut self) -> Result<i16, VmError> {
        let sp = self.sp as usize + 2;
        if sp + 2 > STACK_SIZE {
            return Err(VmError::StackUnderflow { sp: self.sp });
        }
        self.sp = sp as u16;
        Ok(LittleEndian::read_i16(&self.stack[sp..sp + 2]))
    }

    // ---- native-call operand access ------------------------------------

    /// Byte operand at `instr + off`; never moves the cursor.
    pub fn byte_arg(&self, off: u16) -> Result<u8, VmError> {
        let slot = self.cs();
        let pos = self.instr as usize + off as usize;
        let code = self.code(slot)?;
        code.get(pos).copied().ok_or(VmError::CursorOutOfRange {
            slot,
            offset: pos as u32,
            len: code.len() as u32,
        })
    }

    /// 16-bit operand at `instr + off`; never moves the cursor.
    pub fn word_arg(&self, off: u16) -> Result<i16, VmError> {
        let slot = self.cs();
        let pos = self.instr as usize + off as usize;
        let code = self.code(slot)?;
        if pos + 2 > code.len() {
            return Err(VmError::CursorOutOfRange {
                slot,
                offset: pos as u32,
                len: code.len() as u32,
            });
        }
        Ok(LittleEndian::read_i16(&code[pos..pos + 2]))
    }

    // ---- accessors ------------------------------------------------------

    pub fn acc(&self) -> i16 {
        self.regs[Reg::A as usize]
    }

    pub fn set_acc(&mut self, v: i16) {
        self.regs[Reg::A as usize] = v;
    }

    pub fn reg(&self, r: Reg) -> i16 {
        self.regs[r as usize]
    }

    pub fn set_reg(&mut self, r: Reg, v: i16) {
        self.regs[r as usize] = v;
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn aux_sp(&self) -> u16 {
        self.aux_sp
    }

    pub fn cmp_target(&self) -> i16 {
        self.cmp
    }

    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    /// Offset of the opcode byte of the instruction currently executing.
    pub fn instr_offset(&self) -> u16 {
        self.instr
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn vars(&self) -> &GameVars {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut GameVars {
        &mut self.vars
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotStore {
        &mut self.slots
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// A freshly restored machine is runnable again.
    pub(crate) fn clear_halt(&mut self) {
        self.halted = false;
    }

    /// `[0, limit)`, or 0 when `limit <= 0`.
    pub fn random(&mut self, limit: i16) -> i16 {
        if limit <= 0 {
            0
        } else {
            self.rng.gen_range(0..limit)
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub(crate) fn save_aux_sp(&mut self) {
        self.aux_sp = self.sp;
    }

    pub(crate) fn restore_aux_sp(&mut self) {
        self.sp = self.aux_sp;
    }

    /// Latch a game-restore request; the driver services it between
    /// instructions, never while one is executing.
    pub fn request_restore(&mut self, slot: u8) {
        self.restore_request = Some(slot);
    }

    pub fn take_restore_request(&mut self) -> Option<u8> {
        self.restore_request.take()
    }

    pub(crate) fn note_frame_service(&mut self) {
        self.frame_service = true;
    }

    pub(crate) fn take_frame_service(&mut self) -> bool {
        std::mem::take(&mut self.frame_service)
    }

    /// One-line state summary for the debug-dump native.
    pub fn debug_line(&self) -> String {
        format!(
            "cs={} cur=0x{:04X} a={} b={} x={} y={} fs={} t0={} t1={} sp=0x{:04X} cmp={} win={:?}",
            self.cs(),
            self.cursor,
            self.regs[Reg::A as usize],
            self.regs[Reg::B as usize],
            self.regs[Reg::X as usize],
            self.regs[Reg::Y as usize],
            self.regs[Reg::Fs as usize],
            self.regs[Reg::T0 as usize],
            self.regs[Reg::T1 as usize],
            self.sp,
            self.cmp,
            self.window,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::testhost::NullHost;

    fn machine() -> Machine<NullHost> {
        Machine::with_standard_natives()
    }

    #[test]
    fn stack_round_trips_and_detects_both_ends() {
        let mut m = machine();
        assert_eq!(m.sp(), STACK_TOP);
        m.push(0x1234).unwrap();
        m.push(-2).unwrap();
        assert_eq!(m.pop().unwrap(), -2);
        assert_eq!(m.pop().unwrap(), 0x1234);
        assert_eq!(m.sp(), STACK_TOP);
        assert!(matches!(m.pop(), Err(VmError::StackUnderflow { .. })));
        for i in 0..255 {
            m.push(i).unwrap();
        }
        assert!(matches!(m.push(0), Err(VmError::StackOverflow { .. })));
    }

    #[test]
    fn local_window_bounds_are_enforced() {
        let mut m = machine();
        m.slots.load(0, 1, vec![0u8; 8]).unwrap();
        m.boot(0).unwrap();
        m.local_write_i16(6, -1).unwrap();
        assert_eq!(m.local_read_i16(6).unwrap(), -1);
        assert_eq!(m.local_read_u8(7).unwrap(), 0xFF);
        assert!(matches!(
            m.local_read_i16(7),
            Err(VmError::LocalOutOfBounds { .. })
        ));
        assert!(matches!(
            m.local_read_u8(-1),
            Err(VmError::LocalOutOfBounds { .. })
        ));
    }

    #[test]
    fn cstr_and_slice_stop_at_the_window_edge() {
        let mut m = machine();
        m.slots.load(0, 1, vec![b'h', b'i', 0, 9, 9]).unwrap();
        m.boot(0).unwrap();
        assert_eq!(m.local_cstr(0).unwrap(), b"hi");
        assert_eq!(m.local_slice(3, 2).unwrap(), &[9, 9]);
        assert!(matches!(
            m.local_cstr(3),
            Err(VmError::LocalOutOfBounds { .. })
        ));
        assert!(matches!(
            m.local_slice(4, 2),
            Err(VmError::LocalOutOfBounds { .. })
        ));
    }

    #[test]
    fn boot_resets_execution_state_but_not_content() {
        let mut m = machine();
        m.slots.load(2, 9, vec![0u8; 4]).unwrap();
        m.regs = [5; NUM_REGS];
        m.sp = 0x10;
        m.cmp_bitwise = true;
        m.pending = Pending::FAR_WINDOW;
        m.boot(2).unwrap();
        assert_eq!(m.reg(Reg::Cs), 2);
        assert_eq!(m.reg(Reg::A), 0);
        assert_eq!(m.sp(), STACK_TOP);
        assert_eq!(m.aux_sp(), STACK_TOP);
        assert_eq!(m.window(), Window::Slot(2));
        assert_eq!(m.pending(), Pending::empty());
        assert_eq!(m.cursor(), 0);
        assert_eq!(m.slots.resource(2).unwrap(), 9);
        assert!(matches!(m.boot(3), Err(VmError::SlotEmpty { .. })));
        assert!(matches!(m.boot(8), Err(VmError::SlotOutOfRange { .. })));
    }

    #[test]
    fn random_is_bounded_and_reseedable() {
        let mut m = machine();
        m.reseed(7);
        let a: Vec<i16> = (0..16).map(|_| m.random(10)).collect();
        m.reseed(7);
        let b: Vec<i16> = (0..16).map(|_| m.random(10)).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0..10).contains(&v)));
        assert_eq!(m.random(0), 0);
        assert_eq!(m.random(-3), 0);
    }
}
