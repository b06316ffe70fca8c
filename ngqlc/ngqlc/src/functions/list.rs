//! List builtins.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::{List, Value};

use super::{first_null, matches_or_wild, wild, FnDef, FunctionRegistry};

fn ret_any_of_list(types: &[ValueType]) -> Option<ValueType> {
    matches!(types, [t] if matches_or_wild(*t, ValueType::List)).then_some(ValueType::Any)
}

fn head_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::List(l) => l.values.first().cloned().unwrap_or(Value::NULL),
        _ => Value::BAD_TYPE,
    }
}

fn last_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::List(l) => l.values.last().cloned().unwrap_or(Value::NULL),
        _ => Value::BAD_TYPE,
    }
}

fn tail_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::List(l) => Value::List(List {
            values: l.values.iter().skip(1).cloned().collect(),
        }),
        _ => Value::BAD_TYPE,
    }
}

/// First non-NULL argument; NULL when all are.
fn coalesce_body(args: &[Value]) -> Value {
    args.iter()
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::NULL)
}

/// range(start, end[, step]): inclusive of `end` where the step lands on
/// it. A zero step is bad data; an unreachable range is the empty list.
fn range_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    let (start, end, step) = match args {
        [Value::Int(s), Value::Int(e)] => (*s, *e, 1),
        [Value::Int(s), Value::Int(e), Value::Int(st)] => (*s, *e, *st),
        _ => return Value::BAD_TYPE,
    };
    if step == 0 {
        return Value::BAD_DATA;
    }
    let mut values = Vec::new();
    let mut cur = start;
    while (step > 0 && cur <= end) || (step < 0 && cur >= end) {
        values.push(Value::Int(cur));
        cur = match cur.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Value::List(List { values })
}

fn size_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::List(l) => Value::Int(l.values.len() as i64),
        Value::Set(s) => Value::Int(s.values.len() as i64),
        Value::Map(m) => Value::Int(m.kvs.len() as i64),
        Value::String(s) => Value::Int(s.len() as i64),
        Value::DataSet(d) => Value::Int(d.rows.len() as i64),
        _ => Value::BAD_TYPE,
    }
}

pub(super) fn register(reg: &mut FunctionRegistry) {
    reg.insert(FnDef {
        name: "head",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: head_body,
        ret_type: ret_any_of_list,
    });
    reg.insert(FnDef {
        name: "last",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: last_body,
        ret_type: ret_any_of_list,
    });
    reg.insert(FnDef {
        name: "tail",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: tail_body,
        ret_type: |types| {
            matches!(types, [t] if matches_or_wild(*t, ValueType::List)).then_some(ValueType::List)
        },
    });
    reg.insert(FnDef {
        name: "coalesce",
        min_arity: 1,
        max_arity: usize::MAX,
        is_pure: true,
        body: coalesce_body,
        ret_type: |_| Some(ValueType::Any),
    });
    reg.insert(FnDef {
        name: "range",
        min_arity: 2,
        max_arity: 3,
        is_pure: true,
        body: range_body,
        ret_type: |types| {
            types
                .iter()
                .all(|t| matches_or_wild(*t, ValueType::Int))
                .then_some(ValueType::List)
        },
    });
    reg.insert(FnDef {
        name: "size",
        min_arity: 1,
        max_arity: 1,
        is_pure: true,
        body: size_body,
        ret_type: |types| match types {
            [t] if wild(*t)
                || matches!(
                    t,
                    ValueType::List
                        | ValueType::Set
                        | ValueType::Map
                        | ValueType::String
                        | ValueType::DataSet
                ) =>
            {
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

    fn call(reg: &FunctionRegistry, name: &str, args: &[Value]) -> Value {
        (reg.get(name, args.len()).unwrap().body)(args)
    }

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn range_families() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            call(&reg, "range", &[Value::Int(1), Value::Int(5)]),
            ints(&[1, 2, 3, 4, 5])
        );
        assert_eq!(
            call(&reg, "range", &[Value::Int(1), Value::Int(5), Value::Int(2)]),
            ints(&[1, 3, 5])
        );
        assert_eq!(
            call(&reg, "range", &[Value::Int(5), Value::Int(1), Value::Int(-2)]),
            ints(&[5, 3, 1])
        );
        assert_eq!(
            call(&reg, "range", &[Value::Int(1), Value::Int(5), Value::Int(-2)]),
            ints(&[])
        );
        assert_eq!(
            call(&reg, "range", &[Value::Int(5), Value::Int(1), Value::Int(2)]),
            ints(&[])
        );
        assert_eq!(
            call(&reg, "range", &[Value::Int(1), Value::Int(5), Value::Int(0)]),
            Value::BAD_DATA
        );
    }

    #[test]
    fn head_last_tail() {
        let reg = FunctionRegistry::new();
        let l = ints(&[1, 2, 3]);
        assert_eq!(call(&reg, "head", &[l.clone()]), Value::Int(1));
        assert_eq!(call(&reg, "last", &[l.clone()]), Value::Int(3));
        assert_eq!(call(&reg, "tail", &[l.clone()]), ints(&[2, 3]));
        assert_eq!(call(&reg, "head", &[ints(&[])]), Value::NULL);
        assert_eq!(call(&reg, "head", &[Value::Int(3)]), Value::BAD_TYPE);
    }

    #[test]
    fn coalesce_picks_first_non_null() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            call(&reg, "coalesce", &[Value::NULL, Value::Int(2), Value::Int(3)]),
            Value::Int(2)
        );
        assert_eq!(call(&reg, "coalesce", &[Value::NULL]), Value::NULL);
    }

    #[test]
    fn size_of_containers() {
        let reg = FunctionRegistry::new();
        assert_eq!(call(&reg, "size", &[ints(&[1, 2])]), Value::Int(2));
        assert_eq!(call(&reg, "size", &[Value::from("abc")]), Value::Int(3));
    }
}
