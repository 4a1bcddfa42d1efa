//! Machine snapshots: the on-disk save-game payload.
//!
//! Fixed field order, little-endian, no header. The layout is an external
//! contract shared with every existing save file, so it never grows
//! optional fields: registers, `sp`, the comparison target, each slot as
//! `{len: u32, resource: u16, bytes}` (empty and the stack-alias slot write
//! a zero length), the raw stack, `aux_sp` and the execution cursor. The
//! one-shot comparison mode and pending relocation flags are deliberately
//! absent; saves are taken between instructions where both are clear.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::VmError;
use crate::host::Host;
use crate::machine::{Machine, Pending, Reg, Window, NUM_REGS, STACK_SIZE};
use crate::slots::{NUM_SLOTS, STACK_SLOT};

/// Cap on a single serialized slot, far above any shipped script.
const MAX_SLOT_BYTES: usize = 1 << 20;

/// Serialize with the machine's own cursor. Meaningful between
/// instructions; mid-instruction callers want [`snapshot_at`].
pub fn snapshot<H: Host>(m: &Machine<H>) -> Vec<u8> {
    snapshot_at(m, m.cursor)
}

/// Serialize the machine, recording `cursor` as the resume offset.
pub fn snapshot_at<H: Host>(m: &Machine<H>, cursor: u16) -> Vec<u8> {
    let mut out = Vec::new();
    for r in m.regs {
        out.extend_from_slice(&r.to_le_bytes());
    }
    out.extend_from_slice(&m.sp.to_le_bytes());
    out.extend_from_slice(&m.cmp.to_le_bytes());
    for (i, slot) in m.slots.raw().iter().enumerate() {
        if i as u16 == STACK_SLOT {
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            continue;
        }
        out.extend_from_slice(&(slot.bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&slot.resource.to_le_bytes());
        out.extend_from_slice(&slot.bytes);
    }
    out.extend_from_slice(&m.stack);
    out.extend_from_slice(&m.aux_sp.to_le_bytes());
    out.extend_from_slice(&cursor.to_le_bytes());
    out
}

/// Replace the machine's state wholesale from a snapshot.
///
/// Everything is read and validated before anything is committed, so a
/// malformed payload leaves the machine untouched. The window comes back
/// as the near window of the restored `CS`; transient flags reset.
pub fn restore<H: Host>(m: &mut Machine<H>, bytes: &[u8]) -> Result<(), VmError> {
    let mut r = Reader { buf: bytes, pos: 0 };

    let mut regs = [0i16; NUM_REGS];
    for reg in regs.iter_mut() {
        *reg = r.i16("regs")?;
    }
    let sp = r.u16("sp")?;
    let cmp = r.i16("cmp")?;

    let mut loaded: Vec<(u16, Vec<u8>)> = Vec::with_capacity(NUM_SLOTS as usize);
    for i in 0..NUM_SLOTS {
        let len = r.u32(&format!("slot {i} length"))? as usize;
        let res = r.u16(&format!("slot {i} resource"))?;
        if i == STACK_SLOT && (len != 0 || res != 0) {
            return Err(VmError::SaveState(format!("reserved slot {i} carries data")));
        }
        if len > MAX_SLOT_BYTES {
            return Err(VmError::SaveState(format!(
                "slot {i} length {len} exceeds the {MAX_SLOT_BYTES}-byte cap"
            )));
        }
        let data = r.take(len, &format!("slot {i} bytes"))?.to_vec();
        loaded.push((res, data));
    }

    let stack = r.take(STACK_SIZE, "stack")?;
    let aux_sp = r.u16("aux_sp")?;
    let cursor = r.u16("cursor")?;
    if r.pos != bytes.len() {
        return Err(VmError::SaveState(format!(
            "{} trailing bytes after cursor",
            bytes.len() - r.pos
        )));
    }

    if sp as usize + 2 > STACK_SIZE {
        return Err(VmError::SaveState(format!("sp 0x{sp:X} outside the stack")));
    }
    if aux_sp as usize + 2 > STACK_SIZE {
        return Err(VmError::SaveState(format!(
            "aux_sp 0x{aux_sp:X} outside the stack"
        )));
    }
    let cs = regs[Reg::Cs as usize] as u16;
    if cs >= NUM_SLOTS {
        return Err(VmError::SaveState(format!("current slot {cs} out of range")));
    }
    let code_len = if cs == STACK_SLOT {
        STACK_SIZE
    } else {
        loaded[cs as usize].1.len()
    };
    if cursor as usize > code_len {
        return Err(VmError::SaveState(format!(
            "cursor 0x{cursor:X} outside slot {cs} (len 0x{code_len:X})"
        )));
    }

    m.regs = regs;
    m.sp = sp;
    m.cmp = cmp;
    for (slot, (res, data)) in m.slots.raw_mut().iter_mut().zip(loaded) {
        slot.resource = res;
        slot.bytes = data;
    }
    m.stack.copy_from_slice(stack);
    m.aux_sp = aux_sp;
    m.cursor = cursor;
    m.instr = cursor;
    m.cmp_bitwise = false;
    m.pending = Pending::empty();
    m.window = Window::for_slot(cs);
    m.clear_halt();
    Ok(())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], VmError> {
        if self.pos + n > self.buf.len() {
            return Err(VmError::SaveState(format!(
                "truncated at {what} (offset {})",
                self.pos
            )));
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn u16(&mut self, what: &str) -> Result<u16, VmError> {
        self.take(2, what).map(LittleEndian::read_u16)
    }

    fn i16(&mut self, what: &str) -> Result<i16, VmError> {
        self.take(2, what).map(LittleEndian::read_i16)
    }

    fn u32(&mut self, what: &str) -> Result<u32, VmError> {
        self.take(4, what).map(LittleEndian::read_u32)
    }
}
