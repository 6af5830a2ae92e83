//! Graph assembly: turning package declarations into a wired package tree.
//!
//! The [`Assembler`] is the one entry point collaborators use. It borrows a
//! [`PackageSet`] and owns a per-session cache, so a package named by two
//! different dependents resolves to the same instance within one session.
//! The cache lives exactly as long as the assembler; a fresh assembler
//! yields a fresh tree.
//!
//! Assembly is a one-shot synchronous computation with no I/O. It either
//! returns a fully wired, immutable tree or fails before any partial tree
//! escapes.

use crate::artifact::Artifact;
use crate::manifest::{PackageDef, PackageSet};
use crate::package::Package;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors that can occur during graph assembly.
#[derive(Error, Debug)]
pub enum AssembleError {
    /// Package resolution revisited a package already on the resolution
    /// stack.
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// A package name does not resolve to any declaration.
    #[error("package '{0}' is not declared in the package set")]
    UnknownPackage(String),

    /// A package was wired as a dependency but exposes no main artifact
    /// to link against.
    #[error("package '{package}' depends on '{dependency}', which exposes no main artifact")]
    MissingMainArtifact { package: String, dependency: String },
}

/// One-session graph assembler over a set of package declarations.
pub struct Assembler<'a> {
    set: &'a PackageSet,
    /// Fully assembled packages, by name.
    cache: HashMap<String, Rc<Package>>,
    /// Packages currently being resolved, outermost first.
    in_progress: Vec<String>,
}

impl<'a> Assembler<'a> {
    /// Create an assembler with an empty session cache.
    #[must_use]
    pub fn new(set: &'a PackageSet) -> Self {
        Self {
            set,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Assemble the fully wired package tree rooted at `name`.
    ///
    /// Dependency packages are resolved recursively, reusing any package
    /// already assembled in this session. Dependency list order follows
    /// declaration order, so repeated runs over the same declarations
    /// produce identically ordered trees.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` or a transitive dependency is
    /// undeclared, if the declarations contain a dependency cycle, or if
    /// a dependency exposes no main artifact.
    pub fn assemble(&mut self, name: &str) -> Result<Rc<Package>, AssembleError> {
        if let Some(package) = self.cache.get(name) {
            return Ok(Rc::clone(package));
        }

        if let Some(pos) = self.in_progress.iter().position(|n| n == name) {
            let mut cycle = self.in_progress[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(AssembleError::CircularDependency { cycle });
        }

        let def = self
            .set
            .get(name)
            .ok_or_else(|| AssembleError::UnknownPackage(name.to_string()))?
            .clone();

        self.in_progress.push(name.to_string());
        let wired = self.wire(&def);
        self.in_progress.pop();

        let package = Rc::new(wired?);
        self.cache.insert(name.to_string(), Rc::clone(&package));
        Ok(package)
    }

    /// Resolve a declaration's dependencies and wire its artifacts.
    fn wire(&mut self, def: &PackageDef) -> Result<Package, AssembleError> {
        let framework = match &def.test_framework {
            Some(name) => Some(self.assemble(name)?),
            None => None,
        };

        let mut dep_packages = Vec::with_capacity(def.dependencies.len());
        for dep_name in &def.dependencies {
            dep_packages.push(self.assemble(dep_name)?);
        }

        let mut package = Package::new(&def.name);
        if let Some(fw) = &framework {
            package.add_sub_package(Rc::clone(fw));
        }
        for dep in &dep_packages {
            package.add_sub_package(Rc::clone(dep));
        }

        // A container pulls in sub-packages but builds nothing itself.
        if def.container {
            return Ok(package);
        }

        let mut dep_libs = Vec::with_capacity(dep_packages.len());
        for dep in &dep_packages {
            let lib = dep
                .main_artifact()
                .ok_or_else(|| AssembleError::MissingMainArtifact {
                    package: def.name.clone(),
                    dependency: dep.name().to_string(),
                })?;
            dep_libs.push(Rc::clone(lib));
        }

        let mut main_lib = Artifact::library(&def.name, &def.namespace);
        for lib in &dep_libs {
            main_lib.add_dependency(Rc::clone(lib));
        }
        let main_lib = Rc::new(main_lib);

        // The test binary always links its own library first, then the
        // framework, then the declared dependencies in order.
        let mut test_bin = Artifact::test_binary(format!("{}_test", def.name), &def.namespace);
        test_bin.add_dependency(Rc::clone(&main_lib));
        if let Some(fw) = &framework {
            let lib = fw
                .main_artifact()
                .ok_or_else(|| AssembleError::MissingMainArtifact {
                    package: def.name.clone(),
                    dependency: fw.name().to_string(),
                })?;
            test_bin.add_dependency(Rc::clone(lib));
        }
        for lib in &dep_libs {
            test_bin.add_dependency(Rc::clone(lib));
        }

        package.set_main_artifact(main_lib);
        package.set_test_artifact(Rc::new(test_bin));
        Ok(package)
    }
}

/// Assemble `name` in a fresh single-use session.
///
/// # Errors
///
/// See [`Assembler::assemble`].
pub fn assemble(set: &PackageSet, name: &str) -> Result<Rc<Package>, AssembleError> {
    Assembler::new(set).assemble(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;

    fn string_set() -> PackageSet {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("cunittest", "org/cunittest"))
            .unwrap();
        set.insert(PackageDef::new("ccore", "org/ccore")).unwrap();
        set.insert(
            PackageDef::new("cbase", "org/cbase")
                .with_dependency("ccore")
                .with_test_framework("cunittest"),
        )
        .unwrap();
        set.insert(
            PackageDef::new("cstring", "org/cstring")
                .with_dependency("ccore")
                .with_dependency("cbase")
                .with_test_framework("cunittest"),
        )
        .unwrap();
        set.insert(
            PackageDef::new("xstring", "org/xstring")
                .with_dependency("cbase")
                .with_test_framework("cunittest"),
        )
        .unwrap();
        set.validate().unwrap();
        set
    }

    fn dep_names(artifact: &Artifact) -> Vec<String> {
        artifact
            .dependencies()
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }

    #[test]
    fn main_artifact_links_dependencies_in_declaration_order() {
        let set = string_set();
        let cstring = assemble(&set, "cstring").unwrap();

        let main = cstring.main_artifact().unwrap();
        assert_eq!(main.kind(), ArtifactKind::Library);
        assert_eq!(main.namespace(), "org/cstring");
        assert_eq!(dep_names(main), vec!["ccore", "cbase"]);
    }

    #[test]
    fn test_artifact_links_own_library_then_framework_then_deps() {
        let set = string_set();
        let cstring = assemble(&set, "cstring").unwrap();

        let test = cstring.test_artifact().unwrap();
        assert_eq!(test.kind(), ArtifactKind::TestBinary);
        assert_eq!(test.name(), "cstring_test");
        assert_eq!(
            dep_names(test),
            vec!["cstring", "cunittest", "ccore", "cbase"]
        );
        assert!(test.links_against(cstring.main_artifact().unwrap()));
    }

    #[test]
    fn dependency_packages_are_registered_as_sub_packages() {
        let set = string_set();
        let cstring = assemble(&set, "cstring").unwrap();

        assert!(cstring.sub_package("cunittest").is_some());
        assert!(cstring.sub_package("ccore").is_some());
        assert!(cstring.sub_package("cbase").is_some());
        assert_eq!(cstring.sub_packages().len(), 3);
    }

    #[test]
    fn shared_dependency_resolves_to_one_instance() {
        let set = string_set();
        let mut session = Assembler::new(&set);

        let cstring = session.assemble("cstring").unwrap();
        let xstring = session.assemble("xstring").unwrap();

        let from_cstring = cstring.sub_package("cbase").unwrap();
        let from_xstring = xstring.sub_package("cbase").unwrap();
        assert!(Rc::ptr_eq(from_cstring, from_xstring));

        // Both dependency lists carry the identical cbase library.
        let cbase_lib = from_cstring.main_artifact().unwrap();
        assert!(cstring.main_artifact().unwrap().links_against(cbase_lib));
        assert!(xstring.main_artifact().unwrap().links_against(cbase_lib));
    }

    #[test]
    fn transitive_sharing_within_one_root() {
        let set = string_set();
        let cstring = assemble(&set, "cstring").unwrap();

        // cstring and its cbase sub-package both depend on ccore; one
        // session means one ccore.
        let direct = cstring.sub_package("ccore").unwrap();
        let via_cbase = cstring
            .sub_package("cbase")
            .unwrap()
            .sub_package("ccore")
            .unwrap();
        assert!(Rc::ptr_eq(direct, via_cbase));
    }

    #[test]
    fn fresh_sessions_yield_structurally_identical_trees() {
        let set = string_set();
        let first = assemble(&set, "cstring").unwrap();
        let second = assemble(&set, "cstring").unwrap();

        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(first.name(), second.name());
        assert_eq!(
            dep_names(first.main_artifact().unwrap()),
            dep_names(second.main_artifact().unwrap())
        );
        assert_eq!(
            dep_names(first.test_artifact().unwrap()),
            dep_names(second.test_artifact().unwrap())
        );
    }

    #[test]
    fn two_package_cycle_is_detected() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("a", "org/a").with_dependency("b"))
            .unwrap();
        set.insert(PackageDef::new("b", "org/b").with_dependency("a"))
            .unwrap();

        let err = assemble(&set, "a").unwrap_err();
        match err {
            AssembleError::CircularDependency { cycle } => {
                assert_eq!(cycle, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn self_dependency_is_detected() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("a", "org/a").with_dependency("a"))
            .unwrap();

        let err = assemble(&set, "a").unwrap_err();
        assert!(matches!(
            err,
            AssembleError::CircularDependency { cycle } if cycle == vec!["a", "a"]
        ));
    }

    #[test]
    fn cycle_error_names_the_full_path() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("a", "org/a").with_dependency("b"))
            .unwrap();
        set.insert(PackageDef::new("b", "org/b").with_dependency("c"))
            .unwrap();
        set.insert(PackageDef::new("c", "org/c").with_dependency("b"))
            .unwrap();

        let err = assemble(&set, "a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "circular dependency detected: b -> c -> b"
        );
    }

    #[test]
    fn unknown_package_fails() {
        let set = PackageSet::new();
        let err = assemble(&set, "nope").unwrap_err();
        assert!(matches!(err, AssembleError::UnknownPackage(name) if name == "nope"));
    }

    #[test]
    fn container_dependency_has_no_main_artifact() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::container("holder")).unwrap();
        set.insert(PackageDef::new("top", "org/top").with_dependency("holder"))
            .unwrap();

        let err = assemble(&set, "top").unwrap_err();
        assert!(matches!(
            err,
            AssembleError::MissingMainArtifact { package, dependency }
                if package == "top" && dependency == "holder"
        ));
    }

    #[test]
    fn container_root_assembles_without_artifacts() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("ccore", "org/ccore")).unwrap();
        set.insert(PackageDef::container("everything").with_dependency("ccore"))
            .unwrap();

        let root = assemble(&set, "everything").unwrap();
        assert!(root.is_container());
        assert_eq!(root.sub_packages().len(), 1);
    }

    #[test]
    fn duplicate_dependency_declaration_links_twice() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("ccore", "org/ccore")).unwrap();
        set.insert(
            PackageDef::new("top", "org/top")
                .with_dependency("ccore")
                .with_dependency("ccore"),
        )
        .unwrap();

        let top = assemble(&set, "top").unwrap();
        // Linked twice as declared, but registered once as a sub-package.
        assert_eq!(dep_names(top.main_artifact().unwrap()), vec!["ccore", "ccore"]);
        assert_eq!(top.sub_packages().len(), 1);
    }

    #[test]
    fn no_framework_means_no_framework_link() {
        let mut set = PackageSet::new();
        set.insert(PackageDef::new("ccore", "org/ccore")).unwrap();
        set.insert(PackageDef::new("top", "org/top").with_dependency("ccore"))
            .unwrap();

        let top = assemble(&set, "top").unwrap();
        assert_eq!(dep_names(top.test_artifact().unwrap()), vec!["top", "ccore"]);
    }

    #[test]
    fn leaf_package_test_links_only_its_own_library() {
        let set = string_set();
        let ccore = assemble(&set, "ccore").unwrap();

        assert_eq!(dep_names(ccore.main_artifact().unwrap()), Vec::<String>::new());
        assert_eq!(dep_names(ccore.test_artifact().unwrap()), vec!["ccore"]);
    }
}
