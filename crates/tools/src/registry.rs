//! Tool registry.

use crate::{Handler, Result, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, unique within a registry.
    pub name: String,
    /// Natural-language description for the model.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// An ordered set of tools, built once and then only read.
///
/// Specs and handlers are kept in parallel so the spec list can be handed to
/// a backend as a plain slice.
#[derive(Default)]
pub struct Registry {
    specs: Vec<ToolSpec>,
    handlers: Vec<Box<dyn Handler>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, spec: ToolSpec, handler: impl Handler + 'static) -> Result<()> {
        if self.specs.iter().any(|s| s.name == spec.name) {
            return Err(ToolError::Duplicate(spec.name));
        }
        self.specs.push(spec);
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    /// Builder form of [`Registry::register`].
    pub fn with_tool(mut self, spec: ToolSpec, handler: impl Handler + 'static) -> Result<Self> {
        self.register(spec, handler)?;
        Ok(self)
    }

    /// Tool specifications in registration order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Find a handler by exact name.
    pub fn lookup(&self, name: &str) -> Option<&dyn Handler> {
        self.specs
            .iter()
            .position(|s| s.name == name)
            .map(|i| self.handlers[i].as_ref())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("tools", &self.specs.iter().map(|s| &s.name).collect::<Vec<_>>())
            .finish()
    }
}
