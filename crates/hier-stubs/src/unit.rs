use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::MalformedUnit;
use crate::flags::ClassFlags;

/// What kind of artifact a [`Unit`] was extracted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Java source.
    Source,
    /// A compiled class file. Super names are fully qualified.
    Bytecode,
    /// Another JVM dialect with its own implicit imports (Groovy-like).
    Other,
}

/// The declarations of one compilation artifact, as produced by a stub builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Dotted package name; empty for the default package.
    pub package_name: String,
    pub kind: UnitKind,
    pub imports: Vec<Import>,
    pub classes: Vec<ClassDecl>,
}

/// An import statement.
///
/// `import a.b.Foo;` has qualifier `a.b` and name `Foo`; `import a.b.*;` has
/// qualifier `a.b` and no name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Import {
    pub qualifier: String,
    pub name: Option<String>,
    pub is_static: bool,
    /// `import a.Foo as Bar` in dialects that support aliases.
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub local_stub_id: u32,
    pub flags: ClassFlags,
    /// Simple name; empty for anonymous classes.
    pub name: String,
    /// Super class and interface references as written (source) or fully
    /// qualified (bytecode).
    pub super_names: Vec<String>,
    pub members: Vec<Decl>,
}

/// A declaration nested inside a class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decl {
    Class(ClassDecl),
    /// A method, field or initializer body. Only its nested classes matter.
    Member(MemberDecl),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub members: Vec<Decl>,
}

impl Unit {
    pub fn new(kind: UnitKind, package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            kind,
            imports: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn source(package_name: impl Into<String>) -> Self {
        Self::new(UnitKind::Source, package_name)
    }

    pub fn bytecode(package_name: impl Into<String>) -> Self {
        Self::new(UnitKind::Bytecode, package_name)
    }

    #[must_use]
    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    /// Total number of class declarations, including nested and local ones.
    pub fn class_count(&self) -> usize {
        fn count(decls: &[Decl]) -> usize {
            decls
                .iter()
                .map(|decl| match decl {
                    Decl::Class(class) => 1 + count(&class.members),
                    Decl::Member(member) => count(&member.members),
                })
                .sum()
        }

        self.classes
            .iter()
            .map(|class| 1 + count(&class.members))
            .sum()
    }

    /// Check the structural invariants the symbol loader relies on.
    pub fn validate(&self) -> Result<(), MalformedUnit> {
        if !self.package_name.is_empty() && !is_dotted_path(&self.package_name) {
            return Err(MalformedUnit::InvalidPackage {
                package: self.package_name.clone(),
            });
        }

        for import in &self.imports {
            let name_ok = import
                .name
                .as_deref()
                .map_or(true, |name| is_identifier(name));
            let alias_ok = import
                .alias
                .as_deref()
                .map_or(true, |alias| is_identifier(alias));
            if !is_dotted_path(&import.qualifier) || !name_ok || !alias_ok {
                return Err(MalformedUnit::InvalidImport {
                    import: import.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for class in &self.classes {
            if class.name.is_empty() {
                return Err(MalformedUnit::UnnamedClass {
                    stub: class.local_stub_id,
                });
            }
            validate_class(class, &mut seen)?;
        }
        Ok(())
    }
}

fn validate_class(class: &ClassDecl, seen: &mut HashSet<u32>) -> Result<(), MalformedUnit> {
    if !seen.insert(class.local_stub_id) {
        return Err(MalformedUnit::DuplicateStubId {
            stub: class.local_stub_id,
        });
    }
    if !class.name.is_empty() && !is_identifier(&class.name) {
        return Err(MalformedUnit::InvalidClassName {
            stub: class.local_stub_id,
            name: class.name.clone(),
        });
    }
    for super_name in &class.super_names {
        if !is_dotted_path(&erase_type_arguments(super_name)) {
            return Err(MalformedUnit::InvalidSuperName {
                stub: class.local_stub_id,
                name: super_name.clone(),
            });
        }
    }

    for member in &class.members {
        match member {
            // Member classes are addressable and must be named; anonymous classes
            // only appear inside member bodies.
            Decl::Class(nested) if nested.name.is_empty() => {
                return Err(MalformedUnit::UnnamedClass {
                    stub: nested.local_stub_id,
                });
            }
            Decl::Class(nested) => validate_class(nested, seen)?,
            Decl::Member(body) => validate_body(body, seen)?,
        }
    }
    Ok(())
}

fn validate_body(body: &MemberDecl, seen: &mut HashSet<u32>) -> Result<(), MalformedUnit> {
    for decl in &body.members {
        match decl {
            Decl::Class(local) => validate_class(local, seen)?,
            Decl::Member(inner) => validate_body(inner, seen)?,
        }
    }
    Ok(())
}

impl ClassDecl {
    pub fn new(local_stub_id: u32, name: impl Into<String>) -> Self {
        Self {
            local_stub_id,
            flags: ClassFlags::NONE,
            name: name.into(),
            super_names: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn anonymous(local_stub_id: u32) -> Self {
        Self::new(local_stub_id, "")
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Add a super class or interface reference.
    #[must_use]
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.super_names.push(name.into());
        self
    }

    #[must_use]
    pub fn with_nested(mut self, class: ClassDecl) -> Self {
        self.members.push(Decl::Class(class));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: MemberDecl) -> Self {
        self.members.push(Decl::Member(body));
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

impl MemberDecl {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.members.push(Decl::Class(class));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: MemberDecl) -> Self {
        self.members.push(Decl::Member(body));
        self
    }

    /// Whether any class is declared in this body, at any depth.
    pub fn declares_classes(&self) -> bool {
        self.members.iter().any(|decl| match decl {
            Decl::Class(_) => true,
            Decl::Member(inner) => inner.declares_classes(),
        })
    }
}

impl Import {
    /// `import a.b.Foo;`
    pub fn single(path: &str) -> Self {
        let (qualifier, name) = split_last(path);
        Self {
            qualifier: qualifier.to_string(),
            name: Some(name.to_string()),
            is_static: false,
            alias: None,
        }
    }

    /// `import a.b.*;`
    pub fn on_demand(qualifier: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            name: None,
            is_static: false,
            alias: None,
        }
    }

    /// `import static a.b.Outer.Inner;`
    pub fn static_single(path: &str) -> Self {
        Self {
            is_static: true,
            ..Self::single(path)
        }
    }

    /// `import static a.b.Outer.*;`
    pub fn static_on_demand(qualifier: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::on_demand(qualifier)
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn is_on_demand(&self) -> bool {
        self.name.is_none()
    }
}

impl std::fmt::Display for Import {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("import ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        f.write_str(&self.qualifier)?;
        match &self.name {
            Some(name) => write!(f, ".{name}")?,
            None => f.write_str(".*")?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

fn split_last(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((qualifier, name)) => (qualifier, name),
        None => ("", path),
    }
}

/// Drop type arguments and whitespace from a reference:
/// `java.util.List<String>` becomes `java.util.List`, `Outer<T>.Inner` becomes
/// `Outer.Inner`.
pub fn erase_type_arguments(reference: &str) -> Cow<'_, str> {
    if !reference.contains(|ch: char| ch == '<' || ch.is_whitespace()) {
        return Cow::Borrowed(reference);
    }
    let mut out = String::with_capacity(reference.len());
    let mut depth = 0usize;
    for ch in reference.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 && !ch.is_whitespace() => out.push(ch),
            _ => {}
        }
    }
    Cow::Owned(out)
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start_ok = first == '_' || first == '$' || unicode_ident::is_xid_start(first);
    start_ok && chars.all(|ch| ch == '$' || unicode_ident::is_xid_continue(ch))
}

pub fn is_dotted_path(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(is_identifier)
}
