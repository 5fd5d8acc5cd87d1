use std::ops::Range;

use hier_core::{FileId, QNameId, ShortName, StubId};
use hier_stubs::{erase_type_arguments, ClassDecl, Decl, MalformedUnit, MemberDecl, Unit, UnitKind};

use crate::compact::Compact;
use crate::symbol::{ImportInfo, Owner, RawName, UnitInfo, UnitInfoId};
use crate::table::SymbolTable;

/// What a single [`UnitLoader::enter_unit`] call added to the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnterSummary {
    pub classes: usize,
    pub member_containers: usize,
}

/// Enters stub units into a [`SymbolTable`] without resolving anything.
pub struct UnitLoader<'a> {
    table: &'a mut SymbolTable,
}

struct UnitContext {
    file: FileId,
    kind: UnitKind,
    unit: UnitInfoId,
}

impl<'a> UnitLoader<'a> {
    pub fn new(table: &'a mut SymbolTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SymbolTable {
        self.table
    }

    /// Create symbols for every class declared in `unit`.
    ///
    /// The unit is validated first; a malformed unit leaves the table untouched.
    pub fn enter_unit(&mut self, unit: &Unit, file: FileId) -> Result<EnterSummary, MalformedUnit> {
        unit.validate()?;

        let package_qname = self.table.names_mut().from_dotted_string(&unit.package_name);
        let package = self.table.package_symbol(package_qname);

        let imports = unit
            .imports
            .iter()
            .map(|import| {
                let names = self.table.names_mut();
                ImportInfo {
                    qualifier: names.from_dotted_string(&import.qualifier),
                    name: import
                        .name
                        .as_deref()
                        .map(|name| names.identifier(name))
                        .unwrap_or_default(),
                    is_static: import.is_static,
                    alias: import
                        .alias
                        .as_deref()
                        .map(|alias| names.identifier(alias))
                        .unwrap_or_default(),
                }
            })
            .collect();
        let info = self.table.intern_unit_info(UnitInfo::new(unit.kind, imports));

        let cx = UnitContext {
            file,
            kind: unit.kind,
            unit: info,
        };
        let mut summary = EnterSummary::default();
        for class in &unit.classes {
            self.enter_class(&cx, class, Owner::Package(package), package_qname, &mut summary);
        }

        tracing::trace!(
            target = "hier.symbols",
            file = file.to_raw(),
            package = %unit.package_name,
            classes = summary.classes,
            "entered unit"
        );
        Ok(summary)
    }

    /// Anchors entered since the previous call.
    pub fn take_pending(&mut self) -> Range<u32> {
        self.table.take_pending()
    }

    fn enter_class(
        &mut self,
        cx: &UnitContext,
        decl: &ClassDecl,
        owner: Owner,
        // Qualified name of the enclosing package or class; ROOT inside bodies.
        scope_qname: QNameId,
        summary: &mut EnterSummary,
    ) {
        let names = self.table.names_mut();
        let name = if decl.name.is_empty() {
            ShortName::EMPTY
        } else {
            names.identifier(&decl.name)
        };
        let qname = match owner {
            Owner::Member(_) => QNameId::ROOT,
            Owner::Class(_) if scope_qname.is_root() => QNameId::ROOT,
            Owner::Package(_) | Owner::Class(_) => names.qualify(scope_qname, name),
        };

        let supers = self.raw_supertypes(cx.kind, decl);
        let anchor = self.table.enter_class(
            cx.file,
            StubId::from_raw(decl.local_stub_id),
            decl.flags,
            name,
            owner,
            supers,
            qname,
            cx.unit,
        );
        summary.classes += 1;

        for member in &decl.members {
            match member {
                Decl::Class(nested) => {
                    self.enter_class(cx, nested, Owner::Class(anchor), qname, summary)
                }
                Decl::Member(body) if body.declares_classes() => {
                    let container = self.table.add_member_container(Owner::Class(anchor));
                    summary.member_containers += 1;
                    self.enter_body(cx, body, Owner::Member(container), summary);
                }
                Decl::Member(_) => {}
            }
        }
    }

    // Bodies nested in a body share the outer container.
    fn enter_body(
        &mut self,
        cx: &UnitContext,
        body: &MemberDecl,
        container: Owner,
        summary: &mut EnterSummary,
    ) {
        for decl in &body.members {
            match decl {
                Decl::Class(local) => {
                    self.enter_class(cx, local, container, QNameId::ROOT, summary)
                }
                Decl::Member(inner) => self.enter_body(cx, inner, container, summary),
            }
        }
    }

    fn raw_supertypes(&mut self, kind: UnitKind, decl: &ClassDecl) -> Compact<RawName> {
        let names = self.table.names_mut();
        let mut supers: Vec<RawName> = match kind {
            UnitKind::Bytecode => decl
                .super_names
                .iter()
                .map(|name| RawName::Interned(names.from_dotted_string(name)))
                .collect(),
            UnitKind::Source | UnitKind::Other => decl
                .super_names
                .iter()
                .map(|name| {
                    let erased = erase_type_arguments(name);
                    let mut segments: Vec<_> = erased
                        .split('.')
                        .filter(|segment| !segment.is_empty())
                        .map(|segment| names.identifier(segment))
                        .collect();
                    if segments.len() == 1 {
                        RawName::Single(segments.remove(0))
                    } else {
                        RawName::Path(segments.into_boxed_slice())
                    }
                })
                .collect(),
        };

        if kind != UnitKind::Bytecode {
            let well_known = self.table.well_known();
            if decl.flags.is_annotation() {
                supers = vec![RawName::Interned(well_known.annotation)];
            } else if decl.flags.is_enum() {
                supers.push(RawName::Interned(well_known.enum_));
            } else if decl.flags.is_record() {
                supers.push(RawName::Interned(well_known.record));
            }
        }

        let mut unique = Vec::with_capacity(supers.len());
        for raw in supers {
            if !unique.contains(&raw) {
                unique.push(raw);
            }
        }
        Compact::from(unique)
    }
}
