//! Buildable artifacts and their link lists.
//!
//! An [`Artifact`] is a single buildable output (a library or a unit-test
//! binary) together with the ordered list of artifacts it links against.
//! Link order is insertion order, and duplicates are kept as declared:
//! downstream build-file emission is order-sensitive, so the list is never
//! reordered or deduplicated here.

use std::fmt;
use std::rc::Rc;

/// The kind of buildable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A library build output.
    Library,
    /// A unit-test binary.
    TestBinary,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library => write!(f, "library"),
            Self::TestBinary => write!(f, "test-binary"),
        }
    }
}

/// A single buildable unit with an ordered dependency list.
///
/// Artifacts are constructed and wired by the assembler; consumers (the
/// build-file generator) only ever see them behind `Rc` and read-only.
#[derive(Debug, Clone)]
pub struct Artifact {
    name: String,
    namespace: String,
    kind: ArtifactKind,
    dependencies: Vec<Rc<Artifact>>,
}

impl Artifact {
    /// Create a library artifact with an empty link list.
    pub(crate) fn library(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: ArtifactKind::Library,
            dependencies: Vec::new(),
        }
    }

    /// Create a test-binary artifact with an empty link list.
    pub(crate) fn test_binary(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: ArtifactKind::TestBinary,
            dependencies: Vec::new(),
        }
    }

    /// Append an artifact to the link list.
    ///
    /// Appends unconditionally: a dependency declared twice is linked twice.
    /// Cycle detection is a whole-graph concern handled before wiring, not
    /// here.
    pub(crate) fn add_dependency(&mut self, artifact: Rc<Artifact>) {
        self.dependencies.push(artifact);
    }

    /// The artifact's human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace path disambiguating identically named artifacts
    /// across organizations. Opaque to this crate, never parsed.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The kind of this artifact.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// The artifacts this artifact links against, in link order.
    #[must_use]
    pub fn dependencies(&self) -> &[Rc<Artifact>] {
        &self.dependencies
    }

    /// Returns true if `other` appears in the link list (by identity).
    #[must_use]
    pub fn links_against(&self, other: &Rc<Artifact>) -> bool {
        self.dependencies.iter().any(|d| Rc::ptr_eq(d, other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_order_is_insertion_order() {
        let a = Rc::new(Artifact::library("a", "org/a"));
        let b = Rc::new(Artifact::library("b", "org/b"));

        let mut lib = Artifact::library("top", "org/top");
        lib.add_dependency(Rc::clone(&a));
        lib.add_dependency(Rc::clone(&b));

        let names: Vec<&str> = lib.dependencies().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(lib.links_against(&a));
        assert!(lib.links_against(&b));
    }

    #[test]
    fn duplicate_dependencies_are_kept() {
        let a = Rc::new(Artifact::library("a", "org/a"));

        let mut lib = Artifact::library("top", "org/top");
        lib.add_dependency(Rc::clone(&a));
        lib.add_dependency(Rc::clone(&a));

        assert_eq!(lib.dependencies().len(), 2);
    }

    #[test]
    fn same_name_different_namespace_are_distinct() {
        let first = Rc::new(Artifact::library("core", "org-one/core"));
        let second = Rc::new(Artifact::library("core", "org-two/core"));

        let mut lib = Artifact::library("top", "org-one/top");
        lib.add_dependency(Rc::clone(&first));

        assert!(lib.links_against(&first));
        assert!(!lib.links_against(&second));
    }

    #[test]
    fn kind_display() {
        assert_eq!(ArtifactKind::Library.to_string(), "library");
        assert_eq!(ArtifactKind::TestBinary.to_string(), "test-binary");
    }
}
