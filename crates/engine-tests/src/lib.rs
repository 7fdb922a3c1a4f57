//! End-to-end fixtures for the pod runtime: each test assembles a
//! [`engine_runtime::Runner`] against a full pod configuration and a
//! shared [`connectors::MemoryBroker`], then drives it exactly the way
//! the `cli` binary does. These complement (rather than repeat) the
//! component-level unit tests already living next to `engine-core`,
//! `engine-processing` and `connectors`: everything here exercises the
//! assembled pipeline, not one collaborator in isolation.

#[cfg(test)]
mod utils;

#[cfg(test)]
mod integration;
