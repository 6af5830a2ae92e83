//! The seam between graph assembly and build-file emission.
//!
//! The emitter for a concrete build system (project files, makefiles) lives
//! outside this crate. It consumes an assembled [`Package`] tree read-only
//! through the [`Generator`] trait, and can use [`packages_leaf_first`] /
//! [`artifacts_leaf_first`] to walk the tree deterministically.

use crate::artifact::Artifact;
use crate::package::Package;
use std::collections::HashSet;
use std::rc::Rc;

/// A build-file emitter for one target build system.
///
/// Implementations receive the fully wired root package and emit whatever
/// project files and workspace aggregation their build system requires.
/// The tree is immutable; generators read it, they never rewire it.
pub trait Generator {
    /// Emission failure type.
    type Error;

    /// Emit build files for every artifact reachable from `package`.
    ///
    /// # Errors
    ///
    /// Implementation-defined emission failures.
    fn generate(&mut self, package: &Package) -> Result<(), Self::Error>;
}

/// Collect every distinct package reachable from `root`, dependencies
/// before dependents.
///
/// A package shared by several dependents appears exactly once (packages
/// are compared by identity, not name). The order is deterministic for a
/// given tree: sub-packages in registration order, post-order.
#[must_use]
pub fn packages_leaf_first(root: &Rc<Package>) -> Vec<Rc<Package>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect(root, &mut seen, &mut out);
    out
}

fn collect(package: &Rc<Package>, seen: &mut HashSet<*const Package>, out: &mut Vec<Rc<Package>>) {
    if !seen.insert(Rc::as_ptr(package)) {
        return;
    }
    for sub in package.sub_packages() {
        collect(sub, seen, out);
    }
    out.push(Rc::clone(package));
}

/// Collect every artifact reachable from `root`, one entry per artifact,
/// in emission order: dependency packages first, main library before test
/// binary within each package.
#[must_use]
pub fn artifacts_leaf_first(root: &Rc<Package>) -> Vec<Rc<Artifact>> {
    let mut out = Vec::new();
    for package in packages_leaf_first(root) {
        out.extend(package.artifacts().map(Rc::clone));
    }
    out
}
