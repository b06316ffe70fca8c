//! String builtins. Positions are 0-indexed; negative positions and
//! lengths are bad data.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::{List, Value};

use super::{first_null, matches_or_wild, numeric_or_wild, wild, FnDef, FunctionRegistry};

fn ret_string_of_string(types: &[ValueType]) -> Option<ValueType> {
    types
        .iter()
        .all(|t| matches_or_wild(*t, ValueType::String))
        .then_some(ValueType::String)
}

fn str_unary(args: &[Value], f: fn(&str) -> String) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::String(s) => Value::String(f(s)),
        _ => Value::BAD_TYPE,
    }
}

fn length_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::String(s) => Value::Int(s.len() as i64),
        Value::Path(p) => Value::Int(p.len() as i64),
        Value::List(l) => Value::Int(l.values.len() as i64),
        _ => Value::BAD_TYPE,
    }
}

fn left_right_body(args: &[Value], from_left: bool) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1]) {
        (Value::String(s), Value::Int(count)) => {
            if *count < 0 {
                return Value::BAD_DATA;
            }
            let count = *count as usize;
            let chars: Vec<char> = s.chars().collect();
            let taken: String = if from_left {
                chars.iter().take(count).collect()
            } else {
                let skip = chars.len().saturating_sub(count);
                chars.iter().skip(skip).collect()
            };
            Value::String(taken)
        }
        _ => Value::BAD_TYPE,
    }
}

fn pad_body(args: &[Value], left: bool) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1], &args[2]) {
        (Value::String(s), Value::Int(size), Value::String(pad)) => {
            if *size < 0 {
                return Value::BAD_DATA;
            }
            let size = *size as usize;
            let chars: Vec<char> = s.chars().collect();
            if size <= chars.len() {
                return Value::String(chars[..size].iter().collect());
            }
            if pad.is_empty() {
                return Value::String(s.clone());
            }
            let padding: String = pad.chars().cycle().take(size - chars.len()).collect();
            Value::String(if left {
                format!("{padding}{s}")
            } else {
                format!("{s}{padding}")
            })
        }
        _ => Value::BAD_TYPE,
    }
}

/// substr(str, start, length): 0-indexed; negative start or length is bad
/// data; an out-of-range start yields the empty string.
fn substr_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    let (s, start, len) = match args {
        [Value::String(s), Value::Int(start)] => (s, *start, None),
        [Value::String(s), Value::Int(start), Value::Int(len)] => (s, *start, Some(*len)),
        _ => return Value::BAD_TYPE,
    };
    if start < 0 || len.is_some_and(|l| l < 0) {
        return Value::BAD_DATA;
    }
    let chars: Vec<char> = s.chars().collect();
    if start as usize >= chars.len() {
        return Value::String(String::new());
    }
    let tail = &chars[start as usize..];
    let taken: String = match len {
        Some(len) => tail.iter().take(len as usize).collect(),
        None => tail.iter().collect(),
    };
    Value::String(taken)
}

fn replace_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1], &args[2]) {
        (Value::String(s), Value::String(from), Value::String(to)) => {
            if from.is_empty() {
                return Value::String(s.clone());
            }
            Value::String(s.replace(from.as_str(), to))
        }
        _ => Value::BAD_TYPE,
    }
}

/// Works on strings and lists.
fn reverse_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::String(s) => Value::String(s.chars().rev().collect()),
        Value::List(l) => Value::List(List {
            values: l.values.iter().rev().cloned().collect(),
        }),
        _ => Value::BAD_TYPE,
    }
}

fn split_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1]) {
        (Value::String(s), Value::String(sep)) => {
            if sep.is_empty() {
                return Value::BAD_DATA;
            }
            Value::List(List {
                values: s.split(sep.as_str()).map(Value::from).collect(),
            })
        }
        _ => Value::BAD_TYPE,
    }
}

fn strcasecmp_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1]) {
        (Value::String(a), Value::String(b)) => {
            let (a, b) = (a.to_lowercase(), b.to_lowercase());
            Value::Int(match a.cmp(&b) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            })
        }
        _ => Value::BAD_TYPE,
    }
}

pub(super) fn register(reg: &mut FunctionRegistry) {
    reg.insert(FnDef {
        name: "lower",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| str_unary(a, |s| s.to_lowercase()),
        ret_type: ret_string_of_string,
    });
    reg.alias("toLower", "lower");
    reg.insert(FnDef {
        name: "upper",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| str_unary(a, |s| s.to_uppercase()),
        ret_type: ret_string_of_string,
    });
    reg.alias("toUpper", "upper");

    reg.insert(FnDef {
        name: "length",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: length_body,
        ret_type: |types| match types {
            [t] if matches!(t, ValueType::String | ValueType::Path | ValueType::List)
                || wild(*t) =>
            {
                Some(ValueType::Int)
            }
            _ => None,
        },
    });

    reg.insert(FnDef {
        name: "trim",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| str_unary(a, |s| s.trim().to_string()),
        ret_type: ret_string_of_string,
    });
    reg.insert(FnDef {
        name: "ltrim",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| str_unary(a, |s| s.trim_start().to_string()),
        ret_type: ret_string_of_string,
    });
    reg.insert(FnDef {
        name: "rtrim",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| str_unary(a, |s| s.trim_end().to_string()),
        ret_type: ret_string_of_string,
    });

    let str_int_to_str = |types: &[ValueType]| -> Option<ValueType> {
        match types {
            [s, n] if matches_or_wild(*s, ValueType::String) && matches_or_wild(*n, ValueType::Int) => {
                Some(ValueType::String)
            }
            _ => None,
        }
    };
    reg.insert(FnDef {
        name: "left",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: |a| left_right_body(a, true),
        ret_type: str_int_to_str,
    });
    reg.insert(FnDef {
        name: "right",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: |a| left_right_body(a, false),
        ret_type: str_int_to_str,
    });

    let pad_rule = |types: &[ValueType]| -> Option<ValueType> {
        match types {
            [s, n, p]
                if matches_or_wild(*s, ValueType::String)
                    && matches_or_wild(*n, ValueType::Int)
                    && matches_or_wild(*p, ValueType::String) =>
            {
                Some(ValueType::String)
            }
            _ => None,
        }
    };
    reg.insert(FnDef {
        name: "lpad",
        min_arity: 3,
        max_arity: 3,
        is_pure: true,
        body: |a| pad_body(a, true),
        ret_type: pad_rule,
    });
    reg.insert(FnDef {
        name: "rpad",
        min_arity: 3,
        max_arity: 3,
        is_pure: true,
        body: |a| pad_body(a, false),
        ret_type: pad_rule,
    });

    let substr_rule = |types: &[ValueType]| -> Option<ValueType> {
        let ok = matches_or_wild(types[0], ValueType::String)
            && types[1..].iter().all(|t| matches_or_wild(*t, ValueType::Int));
        ok.then_some(ValueType::String)
    };
    reg.insert(FnDef {
        name: "substr",
        min_arity: 2,
        max_arity: 3,
        is_pure: true,
        body: substr_body,
        ret_type: substr_rule,
    });
    reg.alias("substring", "substr");

    reg.insert(FnDef {
        name: "replace",
        min_arity: 3,
        max_arity: 3,
        is_pure: true,
        body: replace_body,
        ret_type: |types| {
            types
                .iter()
                .all(|t| matches_or_wild(*t, ValueType::String))
                .then_some(ValueType::String)
        },
    });

    reg.insert(FnDef {
        name: "reverse",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: reverse_body,
        ret_type: |types| match types {
            [ValueType::String] => Some(ValueType::String),
            [ValueType::List] => Some(ValueType::List),
            [t] if wild(*t) => Some(ValueType::Any),
            _ => None,
        },
    });

    reg.insert(FnDef {
        name: "split",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: split_body,
        ret_type: |types| {
            types
                .iter()
                .all(|t| matches_or_wild(*t, ValueType::String))
                .then_some(ValueType::List)
        },
    });

    reg.insert(FnDef {
        name: "strcasecmp",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: strcasecmp_body,
        ret_type: |types| {
            types
                .iter()
                .all(|t| matches_or_wild(*t, ValueType::String))
                .then_some(ValueType::Int)
        },
    });

    reg.insert(FnDef {
        name: "toString",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| a[0].to_string_val(),
        ret_type: |types| match types {
            [t] if wild(*t)
                || t.is_numeric()
                || t.is_temporal()
                || matches!(t, ValueType::Bool | ValueType::String) =>
            {
                Some(ValueType::String)
            }
            _ => None,
        },
    });

    // coercions; string parsing quirks live in Value's coercion methods
    reg.insert(FnDef {
        name: "toBoolean",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| a[0].to_bool(),
        ret_type: |types| match types {
            [ValueType::Bool | ValueType::String] => Some(ValueType::Bool),
            [t] if wild(*t) => Some(ValueType::Bool),
            _ => None,
        },
    });
    reg.insert(FnDef {
        name: "toFloat",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| a[0].to_float(),
        ret_type: |types| match types {
            [t] if numeric_or_wild(*t) || *t == ValueType::String => Some(ValueType::Float),
            _ => None,
        },
    });
    reg.insert(FnDef {
        name: "toInteger",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: |a| a[0].to_int(),
        ret_type: |types| match types {
            [t] if numeric_or_wild(*t) || *t == ValueType::String => Some(ValueType::Int),
            _ => None,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::super::FunctionRegistry;
    use super::*;

    fn call(reg: &FunctionRegistry, name: &str, args: &[Value]) -> Value {
        (reg.get(name, args.len()).unwrap().body)(args)
    }

    #[test]
    fn substr_index_semantics() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            call(&reg, "substr", &[Value::from("abcdefghi"), Value::Int(2), Value::Int(4)]),
            Value::from("cdef")
        );
        assert_eq!(
            call(&reg, "substring", &[Value::from("abcdef"), Value::Int(2)]),
            Value::from("cdef")
        );
        assert_eq!(
            call(&reg, "substring", &[Value::from("abcdef"), Value::Int(10)]),
            Value::from("")
        );
        assert_eq!(
            call(&reg, "substr", &[Value::from("hello"), Value::Int(-1), Value::Int(10)]),
            Value::BAD_DATA
        );
        assert_eq!(
            call(&reg, "substr", &[Value::from("hello"), Value::Int(1), Value::Int(-2)]),
            Value::BAD_DATA
        );
        assert_eq!(
            call(&reg, "substr", &[Value::NULL, Value::Int(1), Value::Int(2)]),
            Value::NULL
        );
    }

    #[test]
    fn case_and_trim() {
        let reg = FunctionRegistry::new();
        assert_eq!(call(&reg, "toLower", &[Value::from("AbC")]), Value::from("abc"));
        assert_eq!(call(&reg, "upper", &[Value::from("abc")]), Value::from("ABC"));
        assert_eq!(call(&reg, "trim", &[Value::from("  x ")]), Value::from("x"));
    }

    #[test]
    fn to_boolean_quirks() {
        let reg = FunctionRegistry::new();
        assert_eq!(call(&reg, "toBoolean", &[Value::from("fAlse")]), Value::Bool(false));
        assert_eq!(call(&reg, "toBoolean", &[Value::from("false ")]), Value::NULL);
        assert_eq!(call(&reg, "toBoolean", &[Value::Int(1)]), Value::BAD_TYPE);
        assert_eq!(call(&reg, "toBoolean", &[Value::NULL]), Value::NULL);
    }

    #[test]
    fn reverse_and_split() {
        let reg = FunctionRegistry::new();
        assert_eq!(call(&reg, "reverse", &[Value::from("abc")]), Value::from("cba"));
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            call(&reg, "reverse", &[list.clone()]),
            Value::list(vec![Value::Int(2), Value::Int(1)])
        );
        // reverse ∘ reverse is the identity
        let back = call(&reg, "reverse", &[call(&reg, "reverse", &[list.clone()])]);
        assert_eq!(back, list);
        assert_eq!(
            call(&reg, "split", &[Value::from("a,b,c"), Value::from(",")]),
            Value::list(vec![Value::from("a"), Value::from("b"), Value::from("c")])
        );
    }

    #[test]
    fn pads_and_compare() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            call(&reg, "lpad", &[Value::from("ab"), Value::Int(5), Value::from("xy")]),
            Value::from("xyxab")
        );
        assert_eq!(
            call(&reg, "rpad", &[Value::from("ab"), Value::Int(1), Value::from("z")]),
            Value::from("a")
        );
        assert_eq!(
            call(&reg, "strcasecmp", &[Value::from("ABC"), Value::from("abc")]),
            Value::Int(0)
        );
        assert_eq!(
            call(&reg, "left", &[Value::from("hello"), Value::Int(3)]),
            Value::from("hel")
        );
        assert_eq!(
            call(&reg, "right", &[Value::from("hello"), Value::Int(3)]),
            Value::from("llo")
        );
        assert_eq!(
            call(&reg, "left", &[Value::from("hello"), Value::Int(-1)]),
            Value::BAD_DATA
        );
    }
}
