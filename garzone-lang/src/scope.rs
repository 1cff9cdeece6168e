// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use hashbrown::HashMap;

use crate::LangError;
use crate::value::Value;

/// Index of a scope record inside its [`ScopeArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct ScopeRecord {
    variables: HashMap<String, Value>,
    parent: Option<ScopeId>,
}

/// The lexical scope chain, stored as an arena of records addressed by
/// index. Lookup walks the parent links outward; mutation lands on the
/// nearest record that owns the name.
#[derive(Debug)]
pub struct ScopeArena {
    records: Vec<ScopeRecord>,
}

impl ScopeArena {
    /// An arena with only the root scope in it.
    pub fn new() -> Self {
        Self { records: vec![ScopeRecord::default()] }
    }

    #[must_use]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Opens a child scope under `parent` and returns its id.
    pub fn push_child(&mut self, parent: ScopeId) -> ScopeId {
        self.records.push(ScopeRecord {
            variables: HashMap::new(),
            parent: Some(parent),
        });
        ScopeId(self.records.len() - 1)
    }

    /// Binds `name` in `scope`. Re-declaring a name in the same scope fails.
    pub fn declare(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), LangError> {
        let record = &mut self.records[scope.0];
        if record.variables.contains_key(name) {
            return Err(LangError::runtime(format!("variable '{name}' already declared")));
        }
        record.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Reads `name`, walking outward through the chain.
    pub fn get(&self, scope: ScopeId, name: &str) -> Result<Value, LangError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = &self.records[id.0];
            if let Some(value) = record.variables.get(name) {
                return Ok(value.clone());
            }
            current = record.parent;
        }
        Err(LangError::runtime(format!("undefined variable '{name}'")))
    }

    /// Writes `name`, mutating the nearest binding that owns it.
    pub fn set(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), LangError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = &mut self.records[id.0];
            if let Some(slot) = record.variables.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            current = self.records[id.0].parent;
        }
        Err(LangError::runtime(format!("undefined variable '{name}'")))
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
