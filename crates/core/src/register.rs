use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Interned register key. Cheap to copy and compare; resolves back to its
/// name through the [`RegisterTable`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reg(u32);

impl Reg {
    /// Key for a dense index. Only meaningful against the table the index
    /// came from.
    pub fn from_index(idx: usize) -> Self {
        Reg(idx as u32)
    }

    /// Dense index, usable to address per-register vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Name interner for registers and input keys.
///
/// Indices are handed out densely in first-seen order, so a table with
/// `len()` entries covers every `Reg` it ever returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterTable {
    names: IndexSet<String>,
}

impl RegisterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the key for `name`, interning it on first use.
    pub fn intern(&mut self, name: &str) -> Reg {
        if let Some(idx) = self.names.get_index_of(name) {
            return Reg(idx as u32);
        }
        let (idx, _) = self.names.insert_full(name.to_string());
        Reg(idx as u32)
    }

    pub fn lookup(&self, name: &str) -> Option<Reg> {
        self.names.get_index_of(name).map(|idx| Reg(idx as u32))
    }

    /// Name of `reg`. Keys from another table yield `"?"`.
    pub fn name(&self, reg: Reg) -> &str {
        self.names
            .get_index(reg.index())
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Reg, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (Reg(idx as u32), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut table = RegisterTable::new();
        let a = table.intern("R1");
        let b = table.intern("R2");
        assert_ne!(a, b);
        assert_eq!(table.intern("R1"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn names_round_trip_in_first_seen_order() {
        let mut table = RegisterTable::new();
        for name in ["x0", "R1", "OUT"] {
            table.intern(name);
        }
        let names: Vec<&str> = table.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["x0", "R1", "OUT"]);
        let r1 = table.lookup("R1").unwrap();
        assert_eq!(r1.index(), 1);
        assert_eq!(table.name(r1), "R1");
        assert!(table.lookup("R9").is_none());
    }

    #[test]
    fn foreign_key_has_placeholder_name() {
        let mut big = RegisterTable::new();
        big.intern("a");
        let far = big.intern("b");
        let small = RegisterTable::new();
        assert_eq!(small.name(far), "?");
    }
}
