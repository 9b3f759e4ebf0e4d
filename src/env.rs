/// The variable environment for one program run.
///
/// Holds, per name, the binding's original source text (spliced back in
/// wherever `$name` appears) and its parsed command, plus the memoized
/// evaluation result so a variable referenced twice materializes at most
/// one backend shape per run.
use crate::ast::Command;
use crate::document::NodeId;
use std::collections::HashMap;

/// One `name = <command>` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// The right-hand side exactly as written (used for `$name` splicing).
    pub source: String,
    /// The right-hand side as parsed at binding time.
    pub command: Command,
}

/// Variable-name → binding table, threaded explicitly through parse and
/// evaluate calls. Independent runs use independent environments.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Binding>,
    results: HashMap<String, NodeId>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name = <source>`; a later binding shadows an earlier one.
    pub fn bind(&mut self, name: &str, source: &str, command: Command) {
        // Rebinding invalidates any memoized result for the old body.
        self.results.remove(name);
        self.bindings.insert(
            name.to_string(),
            Binding {
                source: source.to_string(),
                command,
            },
        );
    }

    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Memoize the evaluated node for `name`.
    pub fn memoize(&mut self, name: &str, id: NodeId) {
        self.results.insert(name.to_string(), id);
    }

    #[must_use]
    pub fn result_of(&self, name: &str) -> Option<NodeId> {
        self.results.get(name).copied()
    }

    /// Forget memoized results but keep bindings. Called at the start of
    /// every run in persist mode: memoization is per program run.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
        self.results.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
