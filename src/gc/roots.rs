use std::collections::HashMap;

use super::heap::Address;

/// Named root variables: what the mutator can see directly.
///
/// Iteration order is unspecified. The collector only needs the set of bound
/// addresses, and marking does not depend on the order they are visited in.
#[derive(Debug, Default, Clone)]
pub struct RootTable {
    bindings: HashMap<String, Address>,
}

impl RootTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the previous binding if any.
    pub fn bind(&mut self, name: &str, address: Address) -> Option<Address> {
        self.bindings.insert(name.to_string(), address)
    }

    /// Remove `name`, returning the address it was bound to if any.
    pub fn unbind(&mut self, name: &str) -> Option<Address> {
        self.bindings.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.bindings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.bindings.iter().map(|(name, addr)| (name.as_str(), *addr))
    }

    /// Bound addresses, excluding null bindings.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.bindings.values().copied().filter(|addr| !addr.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_overwrites() {
        let mut roots = RootTable::new();
        assert_eq!(roots.bind("x", Address::new(2)), None);
        assert_eq!(roots.bind("x", Address::new(4)), Some(Address::new(2)));
        assert_eq!(roots.get("x"), Some(Address::new(4)));
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_unbind_missing_is_none() {
        let mut roots = RootTable::new();
        assert_eq!(roots.unbind("nope"), None);
        roots.bind("x", Address::NULL);
        assert_eq!(roots.unbind("x"), Some(Address::NULL));
        assert!(roots.is_empty());
    }

    #[test]
    fn test_addresses_skip_null() {
        let mut roots = RootTable::new();
        roots.bind("a", Address::new(2));
        roots.bind("b", Address::NULL);
        roots.bind("c", Address::new(6));
        let mut addrs: Vec<Address> = roots.addresses().collect();
        addrs.sort();
        assert_eq!(addrs, vec![Address::new(2), Address::new(6)]);
    }
}
