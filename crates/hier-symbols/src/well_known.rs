use hier_core::{NameInterner, QNameId, ShortName};
use hier_stubs::UnitKind;

use crate::symbol::ImportInfo;

/// On-demand imports implied for the non-Java dialect.
const OTHER_DIALECT_PACKAGES: [&str; 6] = [
    "java.lang",
    "java.util",
    "java.io",
    "java.net",
    "groovy.lang",
    "groovy.util",
];

/// Single-type imports implied for the non-Java dialect.
const OTHER_DIALECT_CLASSES: [&str; 2] = ["java.math.BigInteger", "java.math.BigDecimal"];

/// Names the loader and resolver treat specially, interned once per build.
#[derive(Clone, Debug)]
pub struct WellKnown {
    pub java_lang: QNameId,
    /// The universal root class, excluded from every supertype set.
    pub object: QNameId,
    pub object_name: ShortName,
    pub enum_: QNameId,
    pub record: QNameId,
    pub annotation: QNameId,
    source_imports: Box<[ImportInfo]>,
    other_imports: Box<[ImportInfo]>,
}

impl WellKnown {
    pub fn new(names: &mut NameInterner) -> Self {
        let java_lang = names.from_dotted_string("java.lang");
        let object_name = names.identifier("Object");
        let object = names.qualify(java_lang, object_name);

        let mut other_imports: Vec<ImportInfo> = OTHER_DIALECT_PACKAGES
            .iter()
            .map(|pkg| ImportInfo::on_demand(names.from_dotted_string(pkg)))
            .collect();
        for class in OTHER_DIALECT_CLASSES {
            let qname = names.from_dotted_string(class);
            other_imports.push(ImportInfo::single(
                names.prefix(qname),
                names.last_segment(qname),
            ));
        }

        Self {
            java_lang,
            object,
            object_name,
            enum_: names.from_dotted_string("java.lang.Enum"),
            record: names.from_dotted_string("java.lang.Record"),
            annotation: names.from_dotted_string("java.lang.annotation.Annotation"),
            source_imports: vec![ImportInfo::on_demand(java_lang)].into_boxed_slice(),
            other_imports: other_imports.into_boxed_slice(),
        }
    }

    /// Imports every unit of `kind` gets without declaring them.
    ///
    /// Bytecode references are fully qualified and need none.
    pub fn default_imports(&self, kind: UnitKind) -> &[ImportInfo] {
        match kind {
            UnitKind::Source => &self.source_imports,
            UnitKind::Other => &self.other_imports,
            UnitKind::Bytecode => &[],
        }
    }

    /// Whether `java.lang` is implicitly imported for `kind`, making the
    /// universal root's simple name always resolvable.
    pub fn imports_java_lang(&self, kind: UnitKind) -> bool {
        self.default_imports(kind)
            .iter()
            .any(|import| import.is_on_demand() && import.qualifier == self.java_lang)
    }
}
