//! The date/time constructor builtins. The 0-ary forms read the current
//! UTC clock; the 1-ary forms accept a string or a component map. Range
//! violations surface as bad-data null values.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::Value;

use super::{first_null, wild, FnDef, FunctionRegistry};
use crate::time;

fn ctor_arg_rule(types: &[ValueType], same: ValueType) -> Option<ValueType> {
    match types {
        [] => Some(same),
        [t] if wild(*t) || *t == ValueType::String || *t == ValueType::Map || *t == same => {
            Some(same)
        }
        _ => None,
    }
}

fn date_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match args {
        [] => Value::Date(time::current_date()),
        [Value::Date(d)] => Value::Date(*d),
        [Value::String(s)] => match time::parse_date(s) {
            Ok(d) => Value::Date(d),
            Err(_) => Value::BAD_DATA,
        },
        [Value::Map(m)] => match time::date_from_map(m) {
            Ok(d) => Value::Date(d),
            Err(_) => Value::BAD_DATA,
        },
        _ => Value::BAD_TYPE,
    }
}

fn time_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match args {
        [] => Value::Time(time::current_time()),
        [Value::Time(t)] => Value::Time(*t),
        [Value::String(s)] => match time::parse_time(s) {
            Ok(t) => Value::Time(t),
            Err(_) => Value::BAD_DATA,
        },
        [Value::Map(m)] => match time::time_from_map(m) {
            Ok(t) => Value::Time(t),
            Err(_) => Value::BAD_DATA,
        },
        _ => Value::BAD_TYPE,
    }
}

fn datetime_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match args {
        [] => Value::DateTime(time::current_datetime()),
        [Value::DateTime(dt)] => Value::DateTime(*dt),
        [Value::Int(ts)] => {
            // seconds since the epoch
            if !(0..=time::MAX_TIMESTAMP).contains(ts) {
                return Value::BAD_DATA;
            }
            match ngqlc_ast::value::Date::from_days_since_epoch(ts.div_euclid(86400)) {
                Some(date) => {
                    let secs = ts.rem_euclid(86400);
                    Value::DateTime(ngqlc_ast::value::DateTime::from_parts(
                        date,
                        ngqlc_ast::value::Time::new(
                            (secs / 3600) as i8,
                            (secs % 3600 / 60) as i8,
                            (secs % 60) as i8,
                            0,
                        ),
                    ))
                }
                None => Value::BAD_DATA,
            }
        }
        [Value::String(s)] => match time::parse_datetime(s) {
            Ok(dt) => Value::DateTime(dt),
            Err(_) => Value::BAD_DATA,
        },
        [Value::Map(m)] => match time::datetime_from_map(m) {
            Ok(dt) => Value::DateTime(dt),
            Err(_) => Value::BAD_DATA,
        },
        _ => Value::BAD_TYPE,
    }
}

fn timestamp_body(args: &[Value]) -> Value {
    if let Some(n) = first_null(args) {
        return n;
    }
    match args {
        [] => Value::Int(time::current_timestamp()),
        [Value::Int(ts)] => {
            if (0..=time::MAX_TIMESTAMP).contains(ts) {
                Value::Int(*ts)
            } else {
                Value::BAD_DATA
            }
        }
        [Value::String(s)] => match time::parse_datetime(s) {
            Ok(dt) => match time::timestamp_from_datetime(&dt) {
                Ok(ts) => Value::Int(ts),
                Err(_) => Value::BAD_DATA,
            },
            Err(_) => Value::BAD_DATA,
        },
        [Value::DateTime(dt)] => match time::timestamp_from_datetime(dt) {
            Ok(ts) => Value::Int(ts),
            Err(_) => Value::BAD_DATA,
        },
        _ => Value::BAD_TYPE,
    }
}

pub(super) fn register(reg: &mut FunctionRegistry) {
    reg.insert(FnDef {
        name: "date",
        min_arity: 0,
        max_arity: 1,
        is_pure: false,
        body: date_body,
        ret_type: |t| ctor_arg_rule(t, ValueType::Date),
    });
    reg.insert(FnDef {
        name: "time",
        min_arity: 0,
        max_arity: 1,
        is_pure: false,
        body: time_body,
        ret_type: |t| ctor_arg_rule(t, ValueType::Time),
    });
    reg.insert(FnDef {
        name: "datetime",
        min_arity: 0,
        max_arity: 1,
        is_pure: false,
        body: datetime_body,
        ret_type: |types| match types {
            [ValueType::Int] => Some(ValueType::DateTime),
            other => ctor_arg_rule(other, ValueType::DateTime),
        },
    });
    reg.insert(FnDef {
        name: "timestamp",
        min_arity: 0,
        max_arity: 1,
        is_pure: false,
        body: timestamp_body,
        ret_type: |types| match types {
            [] => Some(ValueType::Int),
            [t] if wild(*t)
                || matches!(t, ValueType::Int | ValueType::String | ValueType::DateTime) =>
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
    use indexmap::indexmap;
    use ngqlc_ast::value::{Date, Map};

    fn call(reg: &FunctionRegistry, name: &str, args: &[Value]) -> Value {
        (reg.get(name, args.len()).unwrap().body)(args)
    }

    #[test]
    fn date_constructor_bounds() {
        let reg = FunctionRegistry::new();
        let non_leap = Value::Map(Map {
            kvs: indexmap! {
                "year".to_string() => Value::Int(2021),
                "month".to_string() => Value::Int(2),
                "day".to_string() => Value::Int(29),
            },
        });
        assert_eq!(call(&reg, "date", &[non_leap]), Value::BAD_DATA);

        let leap = Value::Map(Map {
            kvs: indexmap! {
                "year".to_string() => Value::Int(2020),
                "month".to_string() => Value::Int(2),
                "day".to_string() => Value::Int(29),
            },
        });
        assert_eq!(call(&reg, "date", &[leap]), Value::Date(Date::new(2020, 2, 29)));
    }

    #[test]
    fn date_of_string_round_trips() {
        let reg = FunctionRegistry::new();
        let d = Value::Date(Date::new(2019, 12, 1));
        let printed = d.to_string_val();
        assert_eq!(call(&reg, "date", &[printed]), d);
        assert_eq!(call(&reg, "date", &[Value::from("not-a-date")]), Value::BAD_DATA);
    }

    #[test]
    fn timestamp_round_trips() {
        let reg = FunctionRegistry::new();
        assert_eq!(
            call(&reg, "timestamp", &[Value::from("2020-01-01T00:00:00")]),
            Value::Int(1577836800)
        );
        assert_eq!(call(&reg, "timestamp", &[Value::Int(-5)]), Value::BAD_DATA);
        let dt = call(&reg, "datetime", &[Value::Int(1577836800)]);
        assert_eq!(
            dt,
            Value::DateTime(ngqlc_ast::value::DateTime::new(2020, 1, 1, 0, 0, 0, 0))
        );
    }

    #[test]
    fn zero_ary_forms_are_now() {
        let reg = FunctionRegistry::new();
        assert!(call(&reg, "date", &[]).is_date());
        assert!(call(&reg, "time", &[]).is_time());
        assert!(call(&reg, "datetime", &[]).is_date_time());
        assert!(call(&reg, "timestamp", &[]).is_int());
    }
}
