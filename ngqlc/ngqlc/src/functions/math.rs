//! Math builtins.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::Value;

use super::{first_null, numeric_or_wild, wild, FnDef, FunctionRegistry};

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Unary `f64 -> f64` family.
fn float_unary(args: &[Value], f: fn(f64) -> f64) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match as_f64(&args[0]) {
        Some(x) => Value::Float(f(x)),
        None => Value::BAD_TYPE,
    }
}

fn ret_float_of_num(types: &[ValueType]) -> Option<ValueType> {
    types
        .iter()
        .all(|t| numeric_or_wild(*t))
        .then_some(ValueType::Float)
}

fn ret_same_numeric(types: &[ValueType]) -> Option<ValueType> {
    match types {
        [t] if wild(*t) => Some(ValueType::Any),
        [ValueType::Int] => Some(ValueType::Int),
        [ValueType::Float] => Some(ValueType::Float),
        _ => None,
    }
}

fn ret_int_of_ints(types: &[ValueType]) -> Option<ValueType> {
    types
        .iter()
        .all(|t| matches!(t, ValueType::Int) || wild(*t))
        .then_some(ValueType::Int)
}

fn ret_float_const(types: &[ValueType]) -> Option<ValueType> {
    types.is_empty().then_some(ValueType::Float)
}

fn abs_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match &args[0] {
        Value::Int(i) => i.checked_abs().map(Value::Int).unwrap_or(Value::OVERFLOW),
        Value::Float(f) => Value::Float(f.abs()),
        _ => Value::BAD_TYPE,
    }
}

fn sign_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match as_f64(&args[0]) {
        Some(x) => Value::Int(if x > 0.0 {
            1
        } else if x < 0.0 {
            -1
        } else {
            0
        }),
        None => Value::BAD_TYPE,
    }
}

fn round_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match args {
        [v] => match as_f64(v) {
            Some(x) => Value::Float(x.round()),
            None => Value::BAD_TYPE,
        },
        [v, Value::Int(places)] => match as_f64(v) {
            Some(x) => {
                let scale = 10f64.powi(*places as i32);
                Value::Float((x * scale).round() / scale)
            }
            None => Value::BAD_TYPE,
        },
        _ => Value::BAD_TYPE,
    }
}

fn pow_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1]) {
        (Value::Int(b), Value::Int(e)) => {
            if *e < 0 {
                return Value::Float((*b as f64).powi(*e as i32));
            }
            match u32::try_from(*e).ok().and_then(|e| b.checked_pow(e)) {
                Some(v) => Value::Int(v),
                None => Value::OVERFLOW,
            }
        }
        (a, b) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => Value::Float(a.powf(b)),
            _ => Value::BAD_TYPE,
        },
    }
}

fn hypot_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (as_f64(&args[0]), as_f64(&args[1])) {
        (Some(a), Some(b)) => Value::Float(a.hypot(b)),
        _ => Value::BAD_TYPE,
    }
}

fn bit_body(args: &[Value], f: fn(i64, i64) -> i64) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Value::Int(f(*a, *b)),
        _ => Value::BAD_TYPE,
    }
}

pub(super) fn register(reg: &mut FunctionRegistry) {
    let mut unary = |name: &'static str,
                     f: fn(&[Value]) -> Value,
                     rt: fn(&[ValueType]) -> Option<ValueType>| {
        reg.insert(FnDef {
            name,
            min_arity: 1,
            max_arity: 1,
            is_pure: true,
            body: f,
            ret_type: rt,
        });
    };

    unary("abs", abs_body, ret_same_numeric);
    unary("floor", |a| float_unary(a, f64::floor), ret_float_of_num);
    unary("ceil", |a| float_unary(a, f64::ceil), ret_float_of_num);
    unary("sqrt", |a| float_unary(a, f64::sqrt), ret_float_of_num);
    unary("cbrt", |a| float_unary(a, f64::cbrt), ret_float_of_num);
    unary("exp", |a| float_unary(a, f64::exp), ret_float_of_num);
    unary("exp2", |a| float_unary(a, f64::exp2), ret_float_of_num);
    unary("log", |a| float_unary(a, f64::ln), ret_float_of_num);
    unary("log2", |a| float_unary(a, f64::log2), ret_float_of_num);
    unary("log10", |a| float_unary(a, f64::log10), ret_float_of_num);
    unary("sin", |a| float_unary(a, f64::sin), ret_float_of_num);
    unary("asin", |a| float_unary(a, f64::asin), ret_float_of_num);
    unary("cos", |a| float_unary(a, f64::cos), ret_float_of_num);
    unary("acos", |a| float_unary(a, f64::acos), ret_float_of_num);
    unary("tan", |a| float_unary(a, f64::tan), ret_float_of_num);
    unary("atan", |a| float_unary(a, f64::atan), ret_float_of_num);
    unary(
        "radians",
        |a| float_unary(a, f64::to_radians),
        ret_float_of_num,
    );
    unary("sign", sign_body, |t| {
        t.iter()
            .all(|t| numeric_or_wild(*t))
            .then_some(ValueType::Int)
    });

    reg.insert(FnDef {
        name: "round",
        min_arity: 1,
        max_arity: 2,
        is_pure: true,
        body: round_body,
        ret_type: ret_float_of_num,
    });
    reg.insert(FnDef {
        name: "pow",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: pow_body,
        ret_type: |types| match types {
            [a, b] if wild(*a) || wild(*b) => Some(ValueType::Any),
            [ValueType::Int, ValueType::Int] => Some(ValueType::Int),
            [a, b] if a.is_numeric() && b.is_numeric() => Some(ValueType::Float),
            _ => None,
        },
    });
    reg.insert(FnDef {
        name: "hypot",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: hypot_body,
        ret_type: ret_float_of_num,
    });
    reg.insert(FnDef {
        name: "e",
        min_arity: 0,
        max_arity: 0,
        is_pure: true,
        body: |_| Value::Float(std::f64::consts::E),
        ret_type: ret_float_const,
    });
    reg.insert(FnDef {
        name: "pi",
        min_arity: 0,
        max_arity: 0,
        is_pure: true,
        body: |_| Value::Float(std::f64::consts::PI),
        ret_type: ret_float_const,
    });
    reg.insert(FnDef {
        name: "bit_and",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: |a| bit_body(a, |x, y| x & y),
        ret_type: ret_int_of_ints,
    });
    reg.insert(FnDef {
        name: "bit_or",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: |a| bit_body(a, |x, y| x | y),
        ret_type: ret_int_of_ints,
    });
    reg.insert(FnDef {
        name: "bit_xor",
        min_arity: 2,
        max_arity: 2,
        is_pure: true,
        body: |a| bit_body(a, |x, y| x ^ y),
        ret_type: ret_int_of_ints,
    });
}
