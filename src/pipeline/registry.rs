//! Name to pass lookup.

use std::collections::BTreeMap;

use crate::{
    pipeline::{
        builtin::{NumberPostorderPass, RemoveDeadPass, RemoveTrailingJumpsPass},
        pass::{BlockPass, Pass},
        script::PassKind,
    },
    Error, Result,
};

/// Summary of a registered pass, for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassInfo {
    /// Registered name.
    pub name: &'static str,
    /// Graph or block pass.
    pub kind: PassKind,
    /// Human-readable description.
    pub description: &'static str,
}

/// Registry of the transformations a pass script may reference.
///
/// Graph passes and block passes live in separate namespaces, so the same name can be
/// registered once of each kind. Lookups are by exact name.
#[derive(Default)]
pub struct PassRegistry {
    graph: BTreeMap<&'static str, Box<dyn Pass>>,
    block: BTreeMap<&'static str, Box<dyn BlockPass>>,
}

impl PassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the passes shipped with the crate.
    ///
    /// - `number_postorder` (graph pass)
    /// - `remove_trailing_jumps` (block pass)
    /// - `remove_dead` (block pass)
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(NumberPostorderPass);
        registry.register_block(RemoveTrailingJumpsPass);
        registry.register_block(RemoveDeadPass);
        registry
    }

    /// Registers a whole-graph pass, replacing any graph pass of the same name.
    pub fn register<P: Pass + 'static>(&mut self, pass: P) {
        self.graph.insert(pass.name(), Box::new(pass));
    }

    /// Registers a block pass, replacing any block pass of the same name.
    pub fn register_block<P: BlockPass + 'static>(&mut self, pass: P) {
        self.block.insert(pass.name(), Box::new(pass));
    }

    /// Looks up a graph pass.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Pass> {
        self.graph.get(name).map(|p| &**p)
    }

    /// Looks up a block pass.
    #[must_use]
    pub fn get_block(&self, name: &str) -> Option<&dyn BlockPass> {
        self.block.get(name).map(|p| &**p)
    }

    /// Returns `true` if a pass of `kind` is registered under `name`.
    #[must_use]
    pub fn contains(&self, kind: PassKind, name: &str) -> bool {
        match kind {
            PassKind::Graph => self.graph.contains_key(name),
            PassKind::Block => self.block.contains_key(name),
        }
    }

    /// Fails with [`Error::UnknownPass`] unless a pass of `kind` named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPass`] naming the keyword and pass.
    pub fn require(&self, kind: PassKind, name: &str) -> Result<()> {
        if self.contains(kind, name) {
            Ok(())
        } else {
            Err(Error::UnknownPass(format!("{kind}: {name}")))
        }
    }

    /// Lists all passes, graph passes first, each group sorted by name.
    #[must_use]
    pub fn passes(&self) -> Vec<PassInfo> {
        let graph = self.graph.values().map(|p| PassInfo {
            name: p.name(),
            kind: PassKind::Graph,
            description: p.description(),
        });
        let block = self.block.values().map(|p| PassInfo {
            name: p.name(),
            kind: PassKind::Block,
            description: p.description(),
        });
        graph.chain(block).collect()
    }

    /// Number of registered passes of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len() + self.block.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty() && self.block.is_empty()
    }
}

impl std::fmt::Debug for PassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassRegistry")
            .field("graph", &self.graph.keys().collect::<Vec<_>>())
            .field("block", &self.block.keys().collect::<Vec<_>>())
            .finish()
    }
}
