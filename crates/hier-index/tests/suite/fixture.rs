use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use hier_core::{CancellationToken, FileId};
use hier_index::{
    HierarchyBuilder, IngestPhase, SingleClassHierarchy, StaticUnits, UnitEntry, UnitProvider,
};
use hier_stubs::{ClassDecl, ClassFlags, Unit};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("hier=debug")
        .try_init();
}

/// Just enough of `java.lang` for synthetic supertypes.
pub fn jdk() -> Vec<Unit> {
    vec![
        Unit::bytecode("java.lang").with_class(ClassDecl::new(0, "Object")),
        Unit::bytecode("java.lang").with_class(
            ClassDecl::new(0, "Enum")
                .with_flags(ClassFlags::ABSTRACT)
                .extends("java.lang.Object"),
        ),
        Unit::bytecode("java.lang").with_class(
            ClassDecl::new(0, "Record")
                .with_flags(ClassFlags::ABSTRACT)
                .extends("java.lang.Object"),
        ),
    ]
}

/// Numbers files in order: compiled units first, then sources.
pub fn units(compiled: Vec<Unit>, sources: Vec<Unit>) -> StaticUnits {
    let mut next = 0u32;
    let mut entries = |units: Vec<Unit>| -> Vec<UnitEntry> {
        units
            .into_iter()
            .map(|unit| {
                let file = FileId::from_raw(next);
                next += 1;
                UnitEntry::decoded(file, unit)
            })
            .collect()
    };
    let compiled = entries(compiled);
    let sources = entries(sources);
    StaticUnits {
        compiled,
        sources,
        modification_count: 0,
    }
}

pub fn build(provider: &StaticUnits) -> SingleClassHierarchy {
    init_logging();
    HierarchyBuilder::default()
        .build(provider, &CancellationToken::new())
        .expect("build should not be cancelled")
}

/// The only class named `dotted`.
pub fn class(hierarchy: &SingleClassHierarchy, dotted: &str) -> hier_core::Anchor {
    match hierarchy.find_class(dotted) {
        [anchor] => *anchor,
        other => panic!("expected one class named {dotted}, found {other:?}"),
    }
}

/// A provider whose contents can change, counting how often it is read.
pub struct CountingProvider {
    pub units: StaticUnits,
    pub modification_count: AtomicU64,
    pub reads: AtomicUsize,
    pub delay: Duration,
}

impl CountingProvider {
    pub fn new(units: StaticUnits, delay: Duration) -> Self {
        Self {
            units,
            modification_count: AtomicU64::new(0),
            reads: AtomicUsize::new(0),
            delay,
        }
    }

    /// Builds started, as observed through compiled-phase reads.
    pub fn builds(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn touch(&self) {
        self.modification_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl UnitProvider for CountingProvider {
    fn modification_count(&self) -> u64 {
        self.modification_count.load(Ordering::SeqCst)
    }

    fn units(&self, phase: IngestPhase) -> Box<dyn Iterator<Item = UnitEntry> + '_> {
        if phase == IngestPhase::Compiled {
            self.reads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
        }
        self.units.units(phase)
    }
}
