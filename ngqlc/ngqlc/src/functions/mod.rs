//! The built-in function registry.
//!
//! Functions are looked up by (name, arity), case-insensitively. Every
//! callable is total: invalid input produces a `Null` sentinel value, never
//! a panic. The registry is read-only after construction and is shared
//! through the query context rather than a process global.

pub mod agg;
pub(crate) mod hash;
mod list;
mod math;
mod schema;
mod string;
mod time_fns;

use std::collections::HashMap;

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::Value;

pub use agg::AggFunction;

#[derive(Clone, Debug)]
pub struct FnDef {
    pub name: &'static str,
    pub min_arity: usize,
    pub max_arity: usize,
    /// Impure functions (now, uuid, rand) defeat constant folding.
    pub is_pure: bool,
    pub body: fn(&[Value]) -> Value,
    /// `None` signals a parameter-type error.
    pub ret_type: fn(&[ValueType]) -> Option<ValueType>,
}

pub struct FunctionRegistry {
    fns: HashMap<&'static str, FnDef>,
    /// lowercase alias -> canonical key
    aliases: HashMap<String, &'static str>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut reg = FunctionRegistry {
            fns: HashMap::new(),
            aliases: HashMap::new(),
        };
        math::register(&mut reg);
        string::register(&mut reg);
        list::register(&mut reg);
        time_fns::register(&mut reg);
        schema::register(&mut reg);
        hash::register(&mut reg);
        reg
    }

    pub(crate) fn insert(&mut self, def: FnDef) {
        self.aliases.insert(def.name.to_lowercase(), def.name);
        self.fns.insert(def.name, def);
    }

    /// Register `alias` as another spelling of `name`.
    pub(crate) fn alias(&mut self, alias: &str, name: &str) {
        if let Some(key) = self.aliases.get(&name.to_lowercase()).copied() {
            self.aliases.insert(alias.to_lowercase(), key);
        }
    }

    pub fn get(&self, name: &str, arity: usize) -> Result<&FnDef> {
        let def = self
            .aliases
            .get(&name.to_lowercase())
            .and_then(|key| self.fns.get(key))
            .ok_or_else(|| Error::semantic(format!("Function `{name}' not defined")))?;
        if arity < def.min_arity || arity > def.max_arity {
            return Err(Error::semantic(format!("Function `{name}' not defined")));
        }
        Ok(def)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.aliases.contains_key(&name.to_lowercase())
    }

    /// Infers the return type; `Any` and the NULL family match any
    /// parameter rule.
    pub fn return_type(&self, name: &str, arg_types: &[ValueType]) -> Result<ValueType> {
        let def = self.get(name, arg_types.len())?;
        (def.ret_type)(arg_types).ok_or_else(|| Error::semantic("Parameter's type error"))
    }
}

/// A type that matches every parameter rule.
pub(crate) fn wild(t: ValueType) -> bool {
    matches!(t, ValueType::Any | ValueType::Null | ValueType::Empty)
}

pub(crate) fn numeric_or_wild(t: ValueType) -> bool {
    t.is_numeric() || wild(t)
}

pub(crate) fn matches_or_wild(t: ValueType, expected: ValueType) -> bool {
    t == expected || wild(t)
}

/// The leftmost NULL-family argument, which most functions simply forward.
pub(crate) fn first_null(args: &[Value]) -> Option<Value> {
    args.iter().find(|v| v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let reg = FunctionRegistry::new();
        assert!(reg.get("ABS", 1).is_ok());
        assert!(reg.get("abs", 1).is_ok());
        assert!(reg.get("toLower", 1).is_ok());
    }

    #[test]
    fn unknown_name_and_bad_arity() {
        let reg = FunctionRegistry::new();
        let err = reg.get("nosuch", 1).unwrap_err();
        assert_eq!(err.message, "Function `nosuch' not defined");
        let err = reg.get("abs", 3).unwrap_err();
        assert_eq!(err.message, "Function `abs' not defined");
    }

    #[test]
    fn return_type_errors() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            reg.return_type("abs", &[ValueType::Int]).unwrap(),
            ValueType::Int
        );
        let err = reg.return_type("abs", &[ValueType::String]).unwrap_err();
        assert_eq!(err.message, "Parameter's type error");
        // wildcards pass through
        assert!(reg.return_type("abs", &[ValueType::Any]).is_ok());
        assert!(reg.return_type("upper", &[ValueType::Null]).is_ok());
    }
}
