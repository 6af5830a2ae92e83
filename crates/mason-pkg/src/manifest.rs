//! Package declarations (`mason.toml`) parsing and validation.
//!
//! A build session declares its package universe as a list of
//! [`PackageDef`] entries:
//!
//! ```toml
//! [[package]]
//! name = "cstring"
//! namespace = "github.com/example/cstring"
//! dependencies = ["ccore", "cbase"]
//! test-framework = "cunittest"
//!
//! [[package]]
//! name = "cunittest"
//! namespace = "github.com/example/cunittest"
//! ```
//!
//! The [`PackageSet`] is pure data: it records what was declared, in
//! declaration order, and validates that every reference resolves. Turning
//! declarations into a wired package graph is the assembler's job.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when working with package declarations.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read package manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse package manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid package name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("duplicate package definition '{0}' with conflicting contents")]
    DuplicatePackage(String),

    #[error("package '{package}' must declare a namespace")]
    MissingNamespace { package: String },

    #[error("package '{package}' depends on undeclared package '{dependency}'")]
    UnknownDependency { package: String, dependency: String },

    #[error("package '{package}' names undeclared test framework '{framework}'")]
    UnknownTestFramework { package: String, framework: String },
}

/// One declared package unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDef {
    /// Package name, unique within the set.
    pub name: String,

    /// Namespace path disambiguating the package's artifacts across
    /// organizations. Opaque identity token, never interpreted.
    #[serde(default)]
    pub namespace: String,

    /// Names of the packages the main library links against, in link order.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Name of the unit-test framework package the test binary links
    /// against, if any.
    #[serde(default, rename = "test-framework")]
    pub test_framework: Option<String>,

    /// A container package exposes no artifacts of its own; it exists
    /// purely to pull in its dependencies.
    #[serde(default)]
    pub container: bool,
}

impl PackageDef {
    /// Create a library package declaration with no dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            dependencies: Vec::new(),
            test_framework: None,
            container: false,
        }
    }

    /// Create a dependency-container declaration.
    #[must_use]
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            dependencies: Vec::new(),
            test_framework: None,
            container: true,
        }
    }

    /// Append a dependency package name. Order is preserved; declaring the
    /// same name twice links it twice.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Set the unit-test framework package name.
    #[must_use]
    pub fn with_test_framework(mut self, name: impl Into<String>) -> Self {
        self.test_framework = Some(name.into());
        self
    }
}

/// On-disk shape of a `mason.toml` declarations file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetFile {
    #[serde(default, rename = "package")]
    packages: Vec<PackageDef>,
}

/// The declared package universe for one build session.
#[derive(Debug, Clone, Default)]
pub struct PackageSet {
    defs: Vec<PackageDef>,
}

impl PackageSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load declarations from a `mason.toml` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// declarations are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse declarations from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, a name is malformed, a
    /// duplicate definition conflicts, or a reference does not resolve.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let file: SetFile = toml::from_str(content)?;
        let mut set = Self::new();
        for def in file.packages {
            set.insert(def)?;
        }
        set.validate()?;
        Ok(set)
    }

    /// Insert a declaration.
    ///
    /// Re-inserting an identical definition is idempotent; a conflicting
    /// redefinition of the same name fails. Reference validation is
    /// deferred to [`PackageSet::validate`] so declarations may arrive in
    /// any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or conflicts with an
    /// existing definition.
    pub fn insert(&mut self, def: PackageDef) -> Result<(), ManifestError> {
        validate_name(&def.name)?;
        if let Some(existing) = self.get(&def.name) {
            if *existing == def {
                return Ok(());
            }
            return Err(ManifestError::DuplicatePackage(def.name));
        }
        self.defs.push(def);
        Ok(())
    }

    /// Validate cross-references: every dependency and test-framework name
    /// must be declared, and non-container packages must carry a namespace.
    ///
    /// # Errors
    ///
    /// Returns the first unresolved reference or missing namespace found.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for def in &self.defs {
            if !def.container && def.namespace.is_empty() {
                return Err(ManifestError::MissingNamespace {
                    package: def.name.clone(),
                });
            }
            for dep in &def.dependencies {
                if self.get(dep).is_none() {
                    return Err(ManifestError::UnknownDependency {
                        package: def.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
            if let Some(framework) = &def.test_framework {
                if self.get(framework).is_none() {
                    return Err(ManifestError::UnknownTestFramework {
                        package: def.name.clone(),
                        framework: framework.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Returns true if no packages are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Number of declared packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Iterate over declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageDef> {
        self.defs.iter()
    }

    /// Serialize the declarations to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&SetFile {
            packages: self.defs.clone(),
        })
    }
}

/// Validate a package name.
fn validate_name(name: &str) -> Result<(), ManifestError> {
    if name.is_empty() {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name cannot be empty",
        ));
    }

    if name.len() > 64 {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name cannot exceed 64 characters",
        ));
    }

    // Must start with a letter
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name must start with a letter",
        ));
    }

    // Only alphanumeric, hyphens, and underscores
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
            return Err(ManifestError::InvalidName(
                name.to_string(),
                "name can only contain letters, numbers, hyphens, and underscores",
            ));
        }
    }

    Ok(())
}
