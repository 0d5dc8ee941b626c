use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Address - Cell index into the heap
// =============================================================================

/// A cell index into a [`Heap`]. Only meaningful for the collector that
/// produced it.
///
/// Address 0 is the null link. Node addresses are even, non-zero and leave
/// room for the node's second cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(usize);

impl Address {
    pub const NULL: Address = Address(0);

    pub const fn new(index: usize) -> Self {
        Address(index)
    }

    /// Decode an address from a raw link cell. Negative cells have no address.
    pub fn from_cell(raw: i32) -> Option<Self> {
        usize::try_from(raw).ok().map(Address)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    fn to_cell(self) -> i32 {
        // Heap sizes are bounded by MAX_CELLS, so every address fits.
        self.0 as i32
    }
}

impl From<usize> for Address {
    fn from(index: usize) -> Self {
        Address(index)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Byte-level access helpers for Vec<u8> memory
// =============================================================================

const CELL_BYTES: usize = 4;

/// Read an i32 cell stored little-endian at the given byte offset.
#[inline(always)]
fn read_i32(memory: &[u8], byte_offset: usize) -> i32 {
    let mut bytes = [0u8; CELL_BYTES];
    bytes.copy_from_slice(&memory[byte_offset..byte_offset + CELL_BYTES]);
    i32::from_le_bytes(bytes)
}

#[inline(always)]
fn write_i32(memory: &mut [u8], byte_offset: usize, value: i32) {
    memory[byte_offset..byte_offset + CELL_BYTES].copy_from_slice(&value.to_le_bytes());
}

// =============================================================================
// Node Layout (in cells)
// =============================================================================
//
// +----------------+----------------+
// | Value (i32)    | Link (address) |
// | cell [addr]    | cell [addr+1]  |
// +----------------+----------------+
//
// Cells 0 and 1 are the reserved null node. Every node is 2 cells, so node
// addresses are 2, 4, ..., size - 2.

/// Number of cells per node.
pub const NODE_CELLS: usize = 2;

/// Largest heap the cell encoding can address.
pub const MAX_CELLS: usize = i32::MAX as usize;

/// Fixed-size linear memory of i32 cells.
///
/// The heap knows nothing about liveness; it only stores cells and answers
/// layout questions. Bounds are the collector's responsibility.
pub struct Heap {
    /// Linear memory buffer (byte-addressed, 4 bytes per cell)
    memory: Vec<u8>,
    /// Length in cells
    size: usize,
}

impl Heap {
    /// Create a zeroed heap of `size` cells. `size` must already be validated.
    pub fn new(size: usize) -> Self {
        Self {
            memory: vec![0u8; size * CELL_BYTES],
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of node slots (addresses 2, 4, ..., size - 2).
    pub fn node_capacity(&self) -> usize {
        self.size / NODE_CELLS - 1
    }

    /// Whether `address` can hold a node in this heap.
    pub fn is_node_address(&self, address: Address) -> bool {
        let index = address.index();
        index != 0 && index % NODE_CELLS == 0 && index < self.size - 1
    }

    /// All node addresses in ascending order.
    pub fn node_addresses(&self) -> impl Iterator<Item = Address> {
        (NODE_CELLS..self.size - 1)
            .step_by(NODE_CELLS)
            .map(Address::new)
    }

    /// Slot index of a node address (address 2 is slot 0).
    pub fn slot_of(address: Address) -> usize {
        address.index() / NODE_CELLS - 1
    }

    /// Node address of a slot index.
    pub fn address_of(slot: usize) -> Address {
        Address::new((slot + 1) * NODE_CELLS)
    }

    pub fn read_cell(&self, index: usize) -> i32 {
        read_i32(&self.memory, index * CELL_BYTES)
    }

    pub fn write_cell(&mut self, index: usize, value: i32) {
        write_i32(&mut self.memory, index * CELL_BYTES, value);
    }

    pub fn value(&self, address: Address) -> i32 {
        self.read_cell(address.index())
    }

    pub fn set_value(&mut self, address: Address, value: i32) {
        self.write_cell(address.index(), value);
    }

    /// Raw contents of the link cell, not checked for liveness.
    pub fn raw_link(&self, address: Address) -> i32 {
        self.read_cell(address.index() + 1)
    }

    pub fn set_link(&mut self, address: Address, target: Address) {
        self.write_cell(address.index() + 1, target.to_cell());
    }

    /// Zero both cells of a node.
    pub fn clear_node(&mut self, address: Address) {
        self.set_value(address, 0);
        self.set_link(address, Address::NULL);
    }

    /// Get raw memory for testing/debugging.
    #[cfg(test)]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }
}
