//! Package descriptors and dependency graph assembly for the Mason
//! build-file generator.
//!
//! This crate provides:
//! - Parsing and validation of `mason.toml` package declarations
//! - An in-memory model of packages and their buildable artifacts
//! - Per-session assembly of declarations into a wired, immutable
//!   package tree, with cycle detection and shared-dependency reuse
//! - The read-only seam a build-file generator consumes the tree through
//!
//! It deliberately does not compile anything, resolve version
//! constraints, or emit build files; those belong to the generator and
//! build-system layers built on top.

mod artifact;
mod assemble;
mod generate;
mod manifest;
mod package;

pub use artifact::{Artifact, ArtifactKind};
pub use assemble::{assemble, AssembleError, Assembler};
pub use generate::{artifacts_leaf_first, packages_leaf_first, Generator};
pub use manifest::{ManifestError, PackageDef, PackageSet};
pub use package::Package;
