use std::collections::VecDeque;

use log::{debug, info, warn};
use serde::Serialize;

use super::error::{GcError, GcResult};
use super::heap::{Address, Heap};
use super::liveness::AddressSet;
use super::roots::RootTable;
use crate::config::{CollectorConfig, ConfigError};

/// Outcome of one mark-and-sweep pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    /// 1-based collection number
    pub cycle: u64,
    /// Addresses freed by this pass, ascending
    pub reclaimed: Vec<Address>,
    /// Number of live nodes after the sweep
    pub live_after: usize,
}

/// Running totals since the collector was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GcStats {
    pub allocations: u64,
    pub collections: u64,
    pub reclaimed: u64,
    pub live: usize,
}

/// Stop-the-world mark-and-sweep collector over a heap of two-cell nodes.
///
/// Nodes are reachable only from named root variables. A collection runs
/// only when `allocate` finds no free node slot.
pub struct Collector {
    heap: Heap,
    /// Allocated node addresses
    live: AddressSet,
    roots: RootTable,
    stats: GcStats,
    history: VecDeque<CollectionReport>,
    history_limit: usize,
}

impl Collector {
    /// Create a collector with a heap of `heap_size` cells.
    pub fn new(heap_size: usize) -> Result<Self, ConfigError> {
        Self::with_config(&CollectorConfig::with_heap_size(heap_size))
    }

    pub fn with_config(config: &CollectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: &CollectorConfig) -> Self {
        let heap = Heap::new(config.heap_size);
        let live = AddressSet::with_capacity(heap.node_capacity());
        Self {
            heap,
            live,
            roots: RootTable::new(),
            stats: GcStats::default(),
            history: VecDeque::new(),
            history_limit: config.history_limit,
        }
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a zeroed node at the lowest free address.
    ///
    /// When no slot is free, runs one collection and retries once before
    /// failing with `OutOfMemory`.
    pub fn allocate(&mut self) -> GcResult<Address> {
        let mut collected = false;
        let address = loop {
            if let Some(address) = self.find_free_slot() {
                break address;
            }
            if collected {
                warn!(
                    "out of memory: all {} nodes reachable after collection",
                    self.heap.node_capacity()
                );
                return Err(GcError::OutOfMemory {
                    heap_size: self.heap.size(),
                });
            }
            self.collect()?;
            collected = true;
        };

        self.live.insert(address);
        self.heap.clear_node(address);
        self.stats.allocations += 1;
        debug!("allocated node at {}", address);
        Ok(address)
    }

    fn find_free_slot(&self) -> Option<Address> {
        self.heap
            .node_addresses()
            .find(|address| !self.live.contains(*address))
    }

    // =========================================================================
    // Mark & Sweep
    // =========================================================================

    /// Full collection cycle. On error nothing has been swept.
    fn collect(&mut self) -> GcResult<()> {
        let marks = self.mark()?;
        let report = self.sweep(&marks);

        info!(
            "collection {}: reclaimed {} nodes, {} live",
            report.cycle,
            report.reclaimed.len(),
            report.live_after
        );
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(report);
        Ok(())
    }

    /// Mark phase: a fresh mark set holding every node reachable from a root.
    ///
    /// Roots are visited in table order, which is unspecified. A chain walk
    /// stops at null or at a node already marked, so shared tails and cycles
    /// are visited once.
    fn mark(&self) -> GcResult<AddressSet> {
        let mut marks = AddressSet::with_capacity(self.heap.node_capacity());

        for root in self.roots.addresses() {
            let mut current = root;
            while !current.is_null() {
                if !marks.insert(current) {
                    break;
                }
                current = self.checked_link(current)?;
            }
        }

        Ok(marks)
    }

    /// Sweep phase: drop every unmarked node from the live set.
    fn sweep(&mut self, marks: &AddressSet) -> CollectionReport {
        let garbage: Vec<Address> = self
            .live
            .iter()
            .filter(|address| !marks.contains(*address))
            .collect();

        for &address in &garbage {
            self.live.remove(address);
            info!("deallocating address {}", address);
        }

        self.stats.collections += 1;
        self.stats.reclaimed += garbage.len() as u64;

        CollectionReport {
            cycle: self.stats.collections,
            reclaimed: garbage,
            live_after: self.live.len(),
        }
    }

    // =========================================================================
    // Root variables
    // =========================================================================

    /// Bind `name` to `address`, which must be null or live.
    pub fn bind_variable(&mut self, name: &str, address: Address) -> GcResult<()> {
        self.ensure_allocated(address)?;
        self.roots.bind(name, address);
        debug!("bound '{}' to {}", name, address);
        Ok(())
    }

    /// Remove a binding. Never frees the node it pointed to.
    pub fn unbind_variable(&mut self, name: &str) {
        if let Some(address) = self.roots.unbind(name) {
            debug!("unbound '{}' (was {})", name, address);
        }
    }

    pub fn lookup_variable(&self, name: &str) -> GcResult<Address> {
        self.roots
            .get(name)
            .ok_or_else(|| GcError::UnboundVariable(name.to_string()))
    }

    // =========================================================================
    // Node fields
    // =========================================================================
    //
    // Address 0 counts as allocated here, so its two cells can be read and
    // written like a node's. The tracer never follows it.

    pub fn read_value(&self, address: Address) -> GcResult<i32> {
        self.ensure_allocated(address)?;
        Ok(self.heap.value(address))
    }

    pub fn write_value(&mut self, address: Address, value: i32) -> GcResult<()> {
        self.ensure_allocated(address)?;
        self.heap.set_value(address, value);
        Ok(())
    }

    /// Read a node's link. A stored link to a freed node is reported as
    /// `InvariantViolation`, not `InvalidAddress`.
    pub fn read_link(&self, address: Address) -> GcResult<Address> {
        self.ensure_allocated(address)?;
        self.checked_link(address)
    }

    /// Point `address` at `target`. Both must be null or live.
    pub fn write_link(&mut self, address: Address, target: Address) -> GcResult<()> {
        self.ensure_allocated(address)?;
        self.ensure_allocated(target)?;
        self.heap.set_link(address, target);
        Ok(())
    }

    fn checked_link(&self, address: Address) -> GcResult<Address> {
        let raw = self.heap.raw_link(address);
        match Address::from_cell(raw) {
            Some(link) if self.is_allocated(link) => Ok(link),
            _ => Err(GcError::InvariantViolation { address, link: raw }),
        }
    }

    /// Null or live.
    fn is_allocated(&self, address: Address) -> bool {
        address.is_null() || self.live.contains(address)
    }

    fn ensure_allocated(&self, address: Address) -> GcResult<()> {
        if self.is_allocated(address) {
            Ok(())
        } else {
            Err(GcError::InvalidAddress(address))
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn heap_size(&self) -> usize {
        self.heap.size()
    }

    /// Whether `address` is a live node. Null is not a node.
    pub fn is_live(&self, address: Address) -> bool {
        self.live.contains(address)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live node addresses, ascending.
    pub fn live_addresses(&self) -> Vec<Address> {
        self.live.iter().collect()
    }

    /// Current root bindings, in unspecified order.
    pub fn roots(&self) -> impl Iterator<Item = (&str, Address)> {
        self.roots.iter()
    }

    pub fn stats(&self) -> GcStats {
        GcStats {
            live: self.live.len(),
            ..self.stats
        }
    }

    /// Report of the most recent collection, if any has run.
    pub fn last_collection(&self) -> Option<&CollectionReport> {
        self.history.back()
    }

    /// Retained collection reports, oldest first.
    pub fn collections(&self) -> impl Iterator<Item = &CollectionReport> {
        self.history.iter()
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::from_valid_config(&CollectorConfig::default())
    }
}
