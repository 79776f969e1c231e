//! Id allocation and the id-to-location table.
//!
//! Every instrumented site gets a fresh integer id, allocated in visit
//! order; a hook call's first argument is always its site id. Sites that
//! originate from a real AST node also get an entry in the location table,
//! published in the preamble so the runtime can render source positions.
//! Synthesized sites (declare hooks, the update expression's implicit
//! binary) have ids but no table entry.

use std::collections::BTreeMap;

use crate::parser::ast::Loc;

/// A site id. Unique per transformed file, strictly increasing in visit
/// order, never recurring and never encoding structure.
pub type Iid = u32;

/// Allocates ids and remembers source coordinates.
///
/// One registry lives per file transformation; the driver creates a fresh
/// one at the file boundary.
#[derive(Debug)]
pub struct Registry {
    next_id: Iid,
    table: BTreeMap<Iid, [u32; 4]>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            next_id: 1,
            table: BTreeMap::new(),
        }
    }

    /// Allocate the next id. When a location is supplied the table records
    /// `[startLine, startColumn + 1, endLine, endColumn + 1]` - the parser
    /// delivers 0-based columns and the table is 1-based.
    pub fn new_id(&mut self, loc: Option<Loc>) -> Iid {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(loc) = loc {
            self.table.insert(
                id,
                [
                    loc.start.line,
                    loc.start.col + 1,
                    loc.end.line,
                    loc.end.col + 1,
                ],
            );
        }
        id
    }

    /// Number of ids allocated so far.
    pub fn allocated(&self) -> u32 {
        self.next_id - 1
    }

    pub fn location(&self, id: Iid) -> Option<&[u32; 4]> {
        self.table.get(&id)
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Serialize the table as the object literal assigned in the preamble.
    pub fn serialize_table(&self) -> String {
        // BTreeMap<u32, _> serializes as an object with string keys in
        // ascending id order; that is valid JavaScript source.
        serde_json::to_string(&self.table).expect("location table is plain data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Loc;
    use crate::scanner::Position;

    fn loc(sl: u32, sc: u32, el: u32, ec: u32) -> Loc {
        Loc {
            start: Position { line: sl, col: sc },
            end: Position { line: el, col: ec },
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut registry = Registry::new();
        assert_eq!(registry.new_id(None), 1);
        assert_eq!(registry.new_id(Some(loc(1, 0, 1, 5))), 2);
        assert_eq!(registry.new_id(None), 3);
        assert_eq!(registry.allocated(), 3);
    }

    #[test]
    fn columns_are_shifted_to_one_based() {
        let mut registry = Registry::new();
        let id = registry.new_id(Some(loc(2, 4, 2, 9)));
        assert_eq!(registry.location(id), Some(&[2, 5, 2, 10]));
    }

    #[test]
    fn synthesized_sites_have_no_entry() {
        let mut registry = Registry::new();
        let id = registry.new_id(None);
        assert_eq!(registry.location(id), None);
        assert_eq!(registry.table_len(), 0);
    }

    #[test]
    fn table_serializes_as_object_literal() {
        let mut registry = Registry::new();
        registry.new_id(Some(loc(1, 0, 1, 3)));
        registry.new_id(None);
        registry.new_id(Some(loc(3, 2, 4, 0)));
        assert_eq!(
            registry.serialize_table(),
            r#"{"1":[1,1,1,4],"3":[3,3,4,1]}"#
        );
    }
}
