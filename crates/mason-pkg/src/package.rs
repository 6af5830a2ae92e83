//! Assembled packages.
//!
//! A [`Package`] is a named bundle owning a main library artifact, a
//! unit-test artifact, and the packages it depends on (registered as
//! sub-packages). Sub-package order is insertion order so that build-file
//! generation is deterministic.

use crate::artifact::Artifact;
use std::rc::Rc;

/// A named bundle of artifacts and the packages they depend on.
///
/// Constructed and wired by the assembler; immutable once returned. A
/// package with neither artifact is a container: it exists purely to pull
/// in its own sub-packages.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    // Insertion-ordered, names unique. Sets are small enough that a
    // linear name lookup beats carrying an index map.
    sub_packages: Vec<Rc<Package>>,
    main_artifact: Option<Rc<Artifact>>,
    test_artifact: Option<Rc<Artifact>>,
}

impl Package {
    /// Create an empty package with no sub-packages and no artifacts.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_packages: Vec::new(),
            main_artifact: None,
            test_artifact: None,
        }
    }

    /// Register a dependency package as a sub-package.
    ///
    /// Idempotent on name: registering a package whose name is already
    /// present is a no-op, so two dependents naming the same shared
    /// package cannot create a second entry.
    pub(crate) fn add_sub_package(&mut self, package: Rc<Package>) {
        if self.sub_package(package.name()).is_none() {
            self.sub_packages.push(package);
        }
    }

    /// Assign the package's main library artifact. Last writer wins.
    pub(crate) fn set_main_artifact(&mut self, artifact: Rc<Artifact>) {
        self.main_artifact = Some(artifact);
    }

    /// Assign the package's unit-test artifact. Last writer wins.
    pub(crate) fn set_test_artifact(&mut self, artifact: Rc<Artifact>) {
        self.test_artifact = Some(artifact);
    }

    /// The package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered sub-packages, in insertion order.
    #[must_use]
    pub fn sub_packages(&self) -> &[Rc<Package>] {
        &self.sub_packages
    }

    /// Look up a sub-package by name.
    #[must_use]
    pub fn sub_package(&self, name: &str) -> Option<&Rc<Package>> {
        self.sub_packages.iter().find(|p| p.name() == name)
    }

    /// The package's main library artifact, absent for a container.
    #[must_use]
    pub fn main_artifact(&self) -> Option<&Rc<Artifact>> {
        self.main_artifact.as_ref()
    }

    /// The package's unit-test artifact, absent for a container.
    #[must_use]
    pub fn test_artifact(&self) -> Option<&Rc<Artifact>> {
        self.test_artifact.as_ref()
    }

    /// Returns true if this package exposes no artifacts of its own.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.main_artifact.is_none() && self.test_artifact.is_none()
    }

    /// The package's own artifacts (main, then test), skipping absent ones.
    pub fn artifacts(&self) -> impl Iterator<Item = &Rc<Artifact>> {
        self.main_artifact.iter().chain(self.test_artifact.iter())
    }
}
