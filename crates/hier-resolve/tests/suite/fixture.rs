use hier_core::{Anchor, CancellationToken, FileId};
use hier_resolve::{ConnectStats, HierarchyConnector};
use hier_stubs::Unit;
use hier_symbols::{SymbolTable, UnitLoader};

/// A symbol table built from in-memory units, one file per unit.
pub struct Fixture {
    pub table: SymbolTable,
    next_file: u32,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            next_file: 0,
        }
    }

    pub fn load(units: impl IntoIterator<Item = Unit>) -> Self {
        let mut fixture = Self::new();
        fixture.enter(units);
        fixture.connect();
        fixture
    }

    pub fn enter(&mut self, units: impl IntoIterator<Item = Unit>) {
        let mut loader = UnitLoader::new(&mut self.table);
        for unit in units {
            loader
                .enter_unit(&unit, FileId::from_raw(self.next_file))
                .expect("unit should be well formed");
            self.next_file += 1;
        }
    }

    pub fn connect(&mut self) -> ConnectStats {
        let token = CancellationToken::new();
        HierarchyConnector::new(&mut self.table)
            .connect_pending(&token, 8)
            .expect("not cancelled")
    }

    /// The only class registered under `dotted`.
    pub fn class(&self, dotted: &str) -> Anchor {
        let qname = self
            .table
            .names()
            .find_dotted(dotted)
            .unwrap_or_else(|| panic!("unknown name {dotted}"));
        match self.table.lookup_by_qualified_name(qname) {
            [anchor] => *anchor,
            other => panic!("expected one class named {dotted}, found {other:?}"),
        }
    }

    /// Dotted names of the supertypes of `dotted`, or `None` when incomplete.
    pub fn supers(&self, dotted: &str) -> Option<Vec<String>> {
        self.supers_of(self.class(dotted))
    }

    pub fn supers_of(&self, anchor: Anchor) -> Option<Vec<String>> {
        if self.table.is_incomplete(anchor) {
            return None;
        }
        Some(
            self.table
                .supertypes(anchor)
                .iter()
                .map(|&sup| self.table.display_name(sup))
                .collect(),
        )
    }
}

pub fn names(dotted: &[&str]) -> Option<Vec<String>> {
    Some(dotted.iter().map(|name| name.to_string()).collect())
}
