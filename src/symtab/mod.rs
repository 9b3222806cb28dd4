//! # Symbol Table and Scope Chain
//!
//! Nested name environments that distinguish variables, constants, and
//! procedures, and that realize PL/0's lexical scoping.
//!
//! A [`Scope`] is owned by the parser for the duration of the block it
//! belongs to. Enclosing-scope links form a stack, not a cyclic graph: the
//! whole chain is a `Vec<Scope>` where the last element is the innermost
//! (current) scope, so "the back-pointer" from the spec becomes plain index
//! arithmetic rather than a borrowed reference with a lifetime to thread
//! through the parser.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

/// A named symbol: a constant, a variable, or a procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Constant {
        name: String,
        value: i64,
    },
    Variable {
        name: String,
        level: u32,
        index: u32,
    },
    Procedure {
        name: String,
        level: u32,
        /// Unresolved until this procedure's own body has been compiled
        /// (set at that point so recursive calls within the body resolve).
        entry: Option<usize>,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Constant { name, .. } => name,
            Symbol::Variable { name, .. } => name,
            Symbol::Procedure { name, .. } => name,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Symbol::Constant { .. } => 0,
            Symbol::Variable { level, .. } => *level,
            Symbol::Procedure { level, .. } => *level,
        }
    }
}

/// A single lexical scope: a named mapping from identifier spelling to
/// [`Symbol`], plus a running count of variables defined so far (used to
/// assign consecutive frame-local indices).
#[derive(Debug, Default)]
pub struct Scope {
    level: u32,
    var_count: u32,
    members: HashMap<String, Symbol>,
}

impl Scope {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn var_count(&self) -> u32 {
        self.var_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineError {
    DuplicateSymbol,
}

/// The stack of open scopes, innermost last.
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    /// Starts with the global scope already open, at level 0.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn current_level(&self) -> u32 {
        self.current().level
    }

    pub fn current_var_count(&self) -> u32 {
        self.current().var_count
    }

    fn current(&self) -> &Scope {
        self.scopes.last().expect("scope chain is never empty")
    }

    fn current_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope chain is never empty")
    }

    /// Opens a new scope one level deeper than the current one.
    pub fn open_scope(&mut self) {
        let level = self.current_level() + 1;
        self.scopes.push(Scope {
            level,
            var_count: 0,
            members: HashMap::new(),
        });
    }

    /// Closes the current scope, returning to its enclosing scope.
    pub fn close_scope(&mut self) {
        self.scopes.pop();
        assert!(!self.scopes.is_empty(), "closed the global scope");
    }

    /// Defines `symbol` in the current scope. Variables are additionally
    /// assigned `index = var_count` before `var_count` is incremented.
    pub fn define(&mut self, mut symbol: Symbol) -> Result<(), DefineError> {
        let name = symbol.name().to_string();
        let scope = self.current_mut();
        if scope.members.contains_key(&name) {
            return Err(DefineError::DuplicateSymbol);
        }
        if let Symbol::Variable { index, .. } = &mut symbol {
            *index = scope.var_count;
            scope.var_count += 1;
        }
        scope.members.insert(name, symbol);
        Ok(())
    }

    /// Walks from the current scope outward, returning the innermost
    /// binding for `name`.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.members.get(name))
    }

    /// Sets the `entry` of a previously-declared procedure, searching from
    /// the current scope outward. Used once a procedure's own body has been
    /// compiled, so later (and self-recursive) calls resolve the address.
    pub fn set_procedure_entry(&mut self, name: &str, entry: usize) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(Symbol::Procedure { entry: slot, .. }) = scope.members.get_mut(name) {
                *slot = Some(entry);
                return;
            }
        }
        unreachable!("set_procedure_entry called for an undeclared procedure");
    }
}
