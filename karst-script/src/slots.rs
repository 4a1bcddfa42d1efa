//! Script slot store.
//!
//! A fixed array of independently loadable script buffers. Slot indices are
//! the bytecode's only way to name a code region: the current-slot and
//! far-slot registers, call/return frames and the save state all carry slot
//! indices, never pointers.

use crate::error::VmError;

pub const NUM_SLOTS: u16 = 8;

/// The reserved slot whose "buffer" is the interpreter stack itself.
///
/// Scripts push a small code payload onto the stack and far-call into this
/// slot; both code fetch and the local-data window then alias the stack
/// region. It can never hold a resource.
pub const STACK_SLOT: u16 = 7;

#[derive(Debug, Clone, Default)]
pub struct ScriptSlot {
    pub(crate) bytes: Vec<u8>,
    pub(crate) resource: u16,
}

#[derive(Debug, Default)]
pub struct SlotStore {
    slots: [ScriptSlot; NUM_SLOTS as usize],
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `index` with `bytes` from resource `resource`.
    /// The previous buffer, if any, is released.
    pub fn load(&mut self, index: u16, resource: u16, bytes: Vec<u8>) -> Result<(), VmError> {
        if index >= NUM_SLOTS {
            return Err(VmError::SlotOutOfRange { index, max: NUM_SLOTS - 1 });
        }
        if index == STACK_SLOT {
            return Err(VmError::SlotReserved { index });
        }
        log::debug!(
            "slot {}: resource {} loaded ({} bytes)",
            index,
            resource,
            bytes.len()
        );
        self.slots[index as usize] = ScriptSlot { bytes, resource };
        Ok(())
    }

    /// The owned buffer at `index`. Empty slots yield an empty slice; all
    /// offset validation is the caller's job.
    pub fn bytes(&self, index: u16) -> Result<&[u8], VmError> {
        self.slot(index).map(|s| s.bytes.as_slice())
    }

    pub fn resource(&self, index: u16) -> Result<u16, VmError> {
        self.slot(index).map(|s| s.resource)
    }

    pub fn len(&self, index: u16) -> Result<usize, VmError> {
        self.slot(index).map(|s| s.bytes.len())
    }

    pub fn is_empty(&self, index: u16) -> Result<bool, VmError> {
        self.slot(index).map(|s| s.bytes.is_empty())
    }

    fn slot(&self, index: u16) -> Result<&ScriptSlot, VmError> {
        self.slots
            .get(index as usize)
            .ok_or(VmError::SlotOutOfRange { index, max: NUM_SLOTS - 1 })
    }

    pub(crate) fn raw(&self) -> &[ScriptSlot] {
        &self.slots
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [ScriptSlot] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_replaces_and_records_resource() {
        let mut store = SlotStore::new();
        store.load(1, 10, vec![1, 2, 3]).unwrap();
        store.load(1, 11, vec![9]).unwrap();
        assert_eq!(store.bytes(1).unwrap(), &[9]);
        assert_eq!(store.resource(1).unwrap(), 11);
    }

    #[test]
    fn stack_slot_refuses_resources() {
        let mut store = SlotStore::new();
        assert!(matches!(
            store.load(STACK_SLOT, 1, vec![0]),
            Err(VmError::SlotReserved { .. })
        ));
        assert!(matches!(
            store.load(NUM_SLOTS, 1, vec![0]),
            Err(VmError::SlotOutOfRange { .. })
        ));
    }
}
