use std::collections::HashMap;

use thiserror::Error;

use crate::agent::Agent;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no agent registered under tag '{0}'")]
    UnknownTag(String),
}

type Constructor = Box<dyn Fn() -> Box<dyn Agent> + Send + Sync>;

/// Maps the `agent.configuration.className` tag from a pod's configuration
/// to a constructor for the agent it names.
///
/// The originating runtime resolved this by dynamic module/class import
/// (`className` split on its last `.`, then `importlib.import_module` plus
/// `getattr`). That has no equivalent at compile time in Rust, so the tag
/// instead indexes a registry populated once, at binary build time, by
/// whoever assembles the pod process (see `cli`'s `register!` call site).
#[derive(Default)]
pub struct AgentRegistry {
    constructors: HashMap<String, Constructor>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Agent> + Send + Sync + 'static,
    {
        self.constructors.insert(tag.into(), Box::new(constructor));
    }

    pub fn build(&self, tag: &str) -> Result<Box<dyn Agent>, RegistryError> {
        self.constructors
            .get(tag)
            .map(|ctor| ctor())
            .ok_or_else(|| RegistryError::UnknownTag(tag.to_string()))
    }
}
