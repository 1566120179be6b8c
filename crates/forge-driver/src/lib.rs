//! Forge Driver Library
//!
//! Module resolution collaborator for the Forge semantic analyzer.
//! Provides import-path normalization, a cached module loader with
//! circular-import detection, the import dependency graph, and sessions
//! that run fresh analyses against a shared module cache.

pub mod resolver;
pub mod dep_graph;
pub mod cache;
pub mod session;

pub use resolver::ModuleResolver;
pub use dep_graph::{DepGraph, ModuleNode};
pub use cache::{FnSource, MemorySource, ModuleCache, ModuleSource};
pub use session::Session;
