use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::FunctionDecl;
use crate::runtime::Value;

/// Handle to a scope stored in an [`Environment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Symbol table: an arena of scopes chained by parent handles
///
/// The root scope is created with the environment and lives as long as it.
/// Call-local scopes are pushed on top and popped when the call returns, so
/// the arena behaves like a stack and a parent chain can never form a cycle.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Scope records, root first
    scopes: Vec<Scope>,
}

/// Single scope in the environment
#[derive(Debug, Clone, Default)]
struct Scope {
    /// Variables defined in this scope; the value's variant fixes its type
    variables: HashMap<String, Value>,
    /// Functions declared in this scope
    functions: HashMap<String, Rc<FunctionDecl>>,
    /// Parent scope (None for global scope)
    parent: Option<ScopeId>,
}

impl Environment {
    /// Creates a new environment with a global scope
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope::default()],
        }
    }

    /// The global (root) scope
    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Pushes a new scope chained to `parent`
    pub fn enter_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        tracing::trace!(scope = id.0, parent = parent.0, "entered scope");
        id
    }

    /// Drops `scope` and every scope pushed after it; the global scope is never dropped
    pub fn exit_scope(&mut self, scope: ScopeId) {
        if scope.0 > 0 && scope.0 < self.scopes.len() {
            self.scopes.truncate(scope.0);
            tracing::trace!(scope = scope.0, "exited scope");
        }
    }

    /// Binds a new variable in `scope`
    pub fn declare(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<()> {
        let variables = &mut self.scopes[scope.0].variables;
        if variables.contains_key(name) {
            return Err(Error::DuplicateDeclaration {
                kind: "variable",
                name: name.to_string(),
            });
        }
        variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Gets the value of a variable, walking the scope chain from `scope` outwards
    pub fn get(&self, scope: ScopeId, name: &str) -> Result<&Value> {
        self.resolve(scope, name)
            .and_then(|owner| self.scopes[owner.0].variables.get(name))
            .ok_or_else(|| Error::UndeclaredVariable {
                name: name.to_string(),
            })
    }

    /// Overwrites an existing variable in the nearest scope that owns it
    ///
    /// The binding keeps its declared type: a value of another type is rejected.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<()> {
        let owner = self
            .resolve(scope, name)
            .ok_or_else(|| Error::UndeclaredVariable {
                name: name.to_string(),
            })?;

        let slot = self.scopes[owner.0]
            .variables
            .get_mut(name)
            .ok_or_else(|| Error::UndeclaredVariable {
                name: name.to_string(),
            })?;
        if slot.ty() != value.ty() {
            return Err(Error::type_error(format!(
                "cannot assign {} to variable '{}' of type {}",
                value.ty(),
                name,
                slot.ty()
            )));
        }
        *slot = value;
        Ok(())
    }

    /// Registers a function declaration in `scope`
    pub fn declare_function(&mut self, scope: ScopeId, decl: Rc<FunctionDecl>) -> Result<()> {
        let functions = &mut self.scopes[scope.0].functions;
        if functions.contains_key(&decl.name) {
            return Err(Error::DuplicateDeclaration {
                kind: "function",
                name: decl.name.clone(),
            });
        }
        functions.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Looks up a function, walking the scope chain from `scope` outwards
    pub fn get_function(&self, scope: ScopeId, name: &str) -> Result<Rc<FunctionDecl>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(decl) = scope.functions.get(name) {
                return Ok(Rc::clone(decl));
            }
            current = scope.parent;
        }
        Err(Error::UndeclaredFunction {
            name: name.to_string(),
        })
    }

    /// Checks if a function is declared anywhere in the chain of `scope`
    pub fn has_function(&self, scope: ScopeId, name: &str) -> bool {
        self.get_function(scope, name).is_ok()
    }

    /// Returns the number of live scopes (1 for global scope only)
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Finds the nearest scope in the chain of `scope` that owns variable `name`
    fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if scope.variables.contains_key(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
