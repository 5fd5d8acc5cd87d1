use std::time::{Duration, Instant};

use hier_config::{BuildConfig, HierarchyConfig};
use hier_core::{CancelCheck, CancellationToken, Cancelled, FileId};
use hier_resolve::HierarchyConnector;
use hier_stubs::{Unit, UnitCodec};
use hier_symbols::{SymbolTable, UnitLoader};
use thiserror::Error;

use crate::builder::build_hierarchy;
use crate::hierarchy::SingleClassHierarchy;

/// Which units a provider should yield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IngestPhase {
    /// Class files from libraries and build outputs.
    Compiled,
    /// Source files (and other-dialect scripts).
    Sources,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitPayload {
    Decoded(Unit),
    /// A blob produced by [`UnitCodec::encode`].
    Encoded(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitEntry {
    pub file: FileId,
    pub payload: UnitPayload,
}

impl UnitEntry {
    pub fn decoded(file: FileId, unit: Unit) -> Self {
        Self {
            file,
            payload: UnitPayload::Decoded(unit),
        }
    }

    pub fn encoded(file: FileId, bytes: Vec<u8>) -> Self {
        Self {
            file,
            payload: UnitPayload::Encoded(bytes),
        }
    }
}

/// Source of stub units for a build.
pub trait UnitProvider: Send + Sync {
    /// Changes whenever the set of units changes. Cached hierarchies are keyed
    /// by this value.
    fn modification_count(&self) -> u64;

    fn units(&self, phase: IngestPhase) -> Box<dyn Iterator<Item = UnitEntry> + '_>;
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub units: usize,
    pub skipped_malformed: usize,
    pub skipped_undecodable: usize,
    pub classes: usize,
    pub incomplete: usize,
    pub cyclic: usize,
    pub elapsed: Duration,
}

/// Runs the ingest, connect and index phases of one build.
#[derive(Clone, Debug, Default)]
pub struct HierarchyBuilder {
    config: BuildConfig,
    codec: UnitCodec,
}

impl HierarchyBuilder {
    pub fn new(config: &HierarchyConfig) -> Self {
        let max_payload = usize::try_from(config.codec.max_payload_bytes).unwrap_or(usize::MAX);
        Self {
            config: config.build.clone(),
            codec: UnitCodec::new(max_payload),
        }
    }

    pub fn with_build_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn build(
        &self,
        provider: &dyn UnitProvider,
        token: &CancellationToken,
    ) -> Result<SingleClassHierarchy, BuildError> {
        self.build_with_stats(provider, token)
            .map(|(hierarchy, _)| hierarchy)
    }

    /// Build from scratch. Nothing survives a cancelled attempt.
    pub fn build_with_stats(
        &self,
        provider: &dyn UnitProvider,
        token: &CancellationToken,
    ) -> Result<(SingleClassHierarchy, BuildStats), BuildError> {
        let started = Instant::now();
        let interval = self.config.cancel_check_interval;
        let mut stats = BuildStats::default();
        let mut table = SymbolTable::new();

        self.ingest(&mut table, provider, IngestPhase::Compiled, token, &mut stats)?;
        if self.config.connect_compiled_first {
            self.connect(&mut table, token, interval, &mut stats)?;
        }
        self.ingest(&mut table, provider, IngestPhase::Sources, token, &mut stats)?;
        self.connect(&mut table, token, interval, &mut stats)?;

        stats.classes = table.len();
        let hierarchy = build_hierarchy(table.finalize());
        stats.elapsed = started.elapsed();

        tracing::info!(
            target = "hier.index",
            units = stats.units,
            classes = stats.classes,
            edges = hierarchy.edge_count(),
            incomplete = stats.incomplete,
            skipped = stats.skipped_malformed + stats.skipped_undecodable,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "class hierarchy built"
        );
        Ok((hierarchy, stats))
    }

    fn ingest(
        &self,
        table: &mut SymbolTable,
        provider: &dyn UnitProvider,
        phase: IngestPhase,
        token: &CancellationToken,
        stats: &mut BuildStats,
    ) -> Result<(), BuildError> {
        let mut check = CancelCheck::new(token, self.config.cancel_check_interval);
        let mut loader = UnitLoader::new(table);
        let mut entered = 0usize;

        for entry in provider.units(phase) {
            check.tick()?;
            stats.units += 1;

            let decoded;
            let unit = match &entry.payload {
                UnitPayload::Decoded(unit) => unit,
                UnitPayload::Encoded(bytes) => match self.codec.decode(bytes) {
                    Ok(unit) => {
                        decoded = unit;
                        &decoded
                    }
                    Err(err) => {
                        stats.skipped_undecodable += 1;
                        tracing::warn!(
                            target = "hier.index",
                            file = entry.file.to_raw(),
                            error = %err,
                            "skipping undecodable stub unit"
                        );
                        continue;
                    }
                },
            };

            match loader.enter_unit(unit, entry.file) {
                Ok(summary) => entered += summary.classes,
                Err(err) => {
                    stats.skipped_malformed += 1;
                    tracing::warn!(
                        target = "hier.index",
                        file = entry.file.to_raw(),
                        error = %err,
                        "skipping malformed stub unit"
                    );
                }
            }
        }
        check.check()?;

        tracing::debug!(
            target = "hier.index",
            phase = ?phase,
            classes = entered,
            "ingested stub units"
        );
        Ok(())
    }

    fn connect(
        &self,
        table: &mut SymbolTable,
        token: &CancellationToken,
        interval: u32,
        stats: &mut BuildStats,
    ) -> Result<(), BuildError> {
        let connected = HierarchyConnector::new(table).connect_pending(token, interval)?;
        stats.incomplete += connected.incomplete;
        stats.cyclic += connected.cyclic;
        Ok(())
    }
}

/// A fixed set of units, mostly useful in tests and tools.
#[derive(Clone, Debug, Default)]
pub struct StaticUnits {
    pub compiled: Vec<UnitEntry>,
    pub sources: Vec<UnitEntry>,
    pub modification_count: u64,
}

impl UnitProvider for StaticUnits {
    fn modification_count(&self) -> u64 {
        self.modification_count
    }

    fn units(&self, phase: IngestPhase) -> Box<dyn Iterator<Item = UnitEntry> + '_> {
        let entries = match phase {
            IngestPhase::Compiled => &self.compiled,
            IngestPhase::Sources => &self.sources,
        };
        Box::new(entries.iter().cloned())
    }
}
