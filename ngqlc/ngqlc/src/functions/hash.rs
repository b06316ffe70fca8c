//! The `hash` builtin.
//!
//! Strings and floats hash through `hash_bytes`, the MurmurHash2 64-bit
//! routine libstdc++ uses for `std::hash`, with the same seed, so hashes
//! agree with what the storage engine persisted. Integers hash to
//! themselves and booleans to 0/1.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::Value;

use super::{first_null, FnDef, FunctionRegistry};

const SEED: u64 = 0xc70f6907;
const MUL: u64 = (0xc6a4a793u64 << 32) + 0x5bd1e995;

fn shift_mix(v: u64) -> u64 {
    v ^ (v >> 47)
}

fn load_u64(b: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(b);
    u64::from_le_bytes(buf)
}

fn load_partial(b: &[u8]) -> u64 {
    let mut result: u64 = 0;
    for &byte in b.iter().rev() {
        result = (result << 8) + byte as u64;
    }
    result
}

pub fn hash_bytes(data: &[u8]) -> u64 {
    let len = data.len();
    let aligned = len & !0x7;
    let mut hash = SEED ^ (len as u64).wrapping_mul(MUL);
    for chunk in data[..aligned].chunks_exact(8) {
        let d = shift_mix(load_u64(chunk).wrapping_mul(MUL)).wrapping_mul(MUL);
        hash = (hash ^ d).wrapping_mul(MUL);
    }
    if len & 0x7 != 0 {
        hash = (hash ^ load_partial(&data[aligned..])).wrapping_mul(MUL);
    }
    hash = shift_mix(hash).wrapping_mul(MUL);
    shift_mix(hash)
}

pub fn hash_value(v: &Value) -> Value {
    match v {
        Value::Null(_) => v.clone(),
        Value::Empty => Value::Empty,
        Value::Bool(b) => Value::Int(i64::from(*b)),
        Value::Int(i) => Value::Int(*i),
        Value::Float(f) => Value::Int(hash_bytes(&f.to_le_bytes()) as i64),
        Value::String(s) => Value::Int(hash_bytes(s.as_bytes()) as i64),
        Value::Date(d) => Value::Int(hash_bytes(d.to_string().as_bytes()) as i64),
        Value::Time(t) => Value::Int(hash_bytes(t.to_string().as_bytes()) as i64),
        Value::DateTime(dt) => Value::Int(hash_bytes(dt.to_string().as_bytes()) as i64),
        _ => Value::BAD_TYPE,
    }
}

pub(super) fn register(reg: &mut FunctionRegistry) {
    reg.insert(FnDef {
        name: "hash",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |args| {
            if let Some(n) = first_null(args) {
                return n;
            }
            hash_value(&args[0])
        },
        ret_type: |types| match types {
            [t] if !t.is_container() && !matches!(t, ValueType::Vertex | ValueType::Edge | ValueType::Path) => {
                Some(ValueType::Int)
            }
            _ => None,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::super::FunctionRegistry;
    use super::*;

    #[test]
    fn regression_constants() {
        assert_eq!(hash_value(&Value::from("Hello")), Value::Int(2275118702903107253));
        assert_eq!(
            hash_value(&Value::Float(3.14159265)),
            Value::Int(-8359970742410469755)
        );
        assert_eq!(
            hash_value(&Value::Int(1234567890)),
            Value::Int(1234567890)
        );
        assert_eq!(hash_value(&Value::Bool(true)), Value::Int(1));
        assert_eq!(hash_value(&Value::Bool(false)), Value::Int(0));
    }

    #[test]
    fn registry_rules() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            reg.return_type("hash", &[ValueType::String]).unwrap(),
            ValueType::Int
        );
        assert!(reg.return_type("hash", &[ValueType::DataSet]).is_err());
        assert!(reg.get("hash", 2).is_err());
        assert!(reg.get("hash", 0).is_err());
    }

    #[test]
    fn hash_is_stable_across_calls() {
        let a = hash_value(&Value::from("stable"));
        let b = hash_value(&Value::from("stable"));
        assert_eq!(a, b);
        assert_ne!(hash_value(&Value::from("a")), hash_value(&Value::from("b")));
    }
}
