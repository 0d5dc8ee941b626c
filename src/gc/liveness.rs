use super::heap::{Address, Heap};

/// A set of node addresses backed by one flag per node slot.
///
/// The collector keeps one of these as the set of allocated nodes, and builds
/// a second, throwaway one as the mark set of each collection pass.
#[derive(Debug, Clone)]
pub struct AddressSet {
    slots: Vec<bool>,
    len: usize,
}

impl AddressSet {
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            slots: vec![false; node_capacity],
            len: 0,
        }
    }

    /// Returns true if the address was not already present.
    ///
    /// Addresses outside the slot range are ignored and return false.
    pub fn insert(&mut self, address: Address) -> bool {
        match self.slot_mut(address) {
            Some(flag) if !*flag => {
                *flag = true;
                self.len += 1;
                true
            }
            _ => false,
        }
    }

    /// Returns true if the address was present.
    pub fn remove(&mut self, address: Address) -> bool {
        match self.slot_mut(address) {
            Some(flag) if *flag => {
                *flag = false;
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, address: Address) -> bool {
        if address.is_null() || address.index() % 2 != 0 {
            return false;
        }
        self.slots
            .get(Heap::slot_of(address))
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(slot, _)| Heap::address_of(slot))
    }

    fn slot_mut(&mut self, address: Address) -> Option<&mut bool> {
        if address.is_null() || address.index() % 2 != 0 {
            return None;
        }
        self.slots.get_mut(Heap::slot_of(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut set = AddressSet::with_capacity(4);
        assert!(set.is_empty());

        assert!(set.insert(Address::new(4)));
        assert!(!set.insert(Address::new(4)));
        assert!(set.contains(Address::new(4)));
        assert_eq!(set.len(), 1);

        assert!(set.remove(Address::new(4)));
        assert!(!set.remove(Address::new(4)));
        assert!(!set.contains(Address::new(4)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_rejects_non_node_addresses() {
        let mut set = AddressSet::with_capacity(4);
        assert!(!set.insert(Address::NULL));
        assert!(!set.insert(Address::new(3)));
        assert!(!set.insert(Address::new(10)));
        assert!(!set.contains(Address::NULL));
        assert!(!set.contains(Address::new(7)));
        assert!(!set.contains(Address::new(100)));
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_iter_ascending() {
        let mut set = AddressSet::with_capacity(5);
        set.insert(Address::new(8));
        set.insert(Address::new(2));
        set.insert(Address::new(6));
        let addrs: Vec<Address> = set.iter().collect();
        assert_eq!(addrs, vec![Address::new(2), Address::new(6), Address::new(8)]);
    }
}
