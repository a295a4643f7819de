//! Multi-root workspace registry and path resolution for CLI coding agents.
//!
//! See [`workspace`] for the manager, resolver and VCS detector.

pub mod workspace;
