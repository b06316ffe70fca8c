//! Aggregate functions. These are not in the scalar registry: the
//! validator only accepts them inside a group-by aware context, and the
//! executor applies them per group.

use ngqlc_ast::types::ValueType;
use ngqlc_ast::value::{List, Set, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AggFunction {
    #[strum(serialize = "count")]
    Count,
    #[strum(serialize = "sum")]
    Sum,
    #[strum(serialize = "avg")]
    Avg,
    #[strum(serialize = "max")]
    Max,
    #[strum(serialize = "min")]
    Min,
    #[strum(serialize = "std")]
    Std,
    #[strum(serialize = "bit_and")]
    BitAnd,
    #[strum(serialize = "bit_or")]
    BitOr,
    #[strum(serialize = "bit_xor")]
    BitXor,
    #[strum(serialize = "collect")]
    Collect,
    #[strum(serialize = "collect_set")]
    CollectSet,
}

impl AggFunction {
    pub fn from_name(name: &str) -> Option<AggFunction> {
        Some(match name.to_lowercase().as_str() {
            "count" => AggFunction::Count,
            "sum" => AggFunction::Sum,
            "avg" => AggFunction::Avg,
            "max" => AggFunction::Max,
            "min" => AggFunction::Min,
            "std" => AggFunction::Std,
            "bit_and" => AggFunction::BitAnd,
            "bit_or" => AggFunction::BitOr,
            "bit_xor" => AggFunction::BitXor,
            "collect" => AggFunction::Collect,
            "collect_set" => AggFunction::CollectSet,
            _ => return None,
        })
    }

    pub fn is_agg_name(name: &str) -> bool {
        AggFunction::from_name(name).is_some()
    }

    /// Folds a group's values. NULL and Empty entries are skipped, the way
    /// SQL aggregates skip them; a type mismatch poisons the group.
    pub fn apply(&self, values: &[Value]) -> Value {
        let present: Vec<&Value> = values
            .iter()
            .filter(|v| !v.is_null() && !v.is_empty())
            .collect();
        match self {
            AggFunction::Count => Value::Int(present.len() as i64),
            AggFunction::Sum => {
                let mut acc = Value::Int(0);
                for v in &present {
                    if !v.is_numeric() {
                        return Value::BAD_TYPE;
                    }
                    acc = acc.add(v);
                }
                acc
            }
            AggFunction::Avg => {
                if present.is_empty() {
                    return Value::NULL;
                }
                let sum = AggFunction::Sum.apply(values);
                sum.to_float().divide(&Value::Int(present.len() as i64))
            }
            AggFunction::Max => present
                .iter()
                .max_by(|a, b| a.compare(b))
                .map(|v| (*v).clone())
                .unwrap_or(Value::NULL),
            AggFunction::Min => present
                .iter()
                .min_by(|a, b| a.compare(b))
                .map(|v| (*v).clone())
                .unwrap_or(Value::NULL),
            AggFunction::Std => {
                if present.is_empty() {
                    return Value::NULL;
                }
                let mut nums = Vec::with_capacity(present.len());
                for v in &present {
                    match v {
                        Value::Int(i) => nums.push(*i as f64),
                        Value::Float(f) => nums.push(*f),
                        _ => return Value::BAD_TYPE,
                    }
                }
                let mean = nums.iter().sum::<f64>() / nums.len() as f64;
                let var = nums.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / nums.len() as f64;
                Value::Float(var.sqrt())
            }
            AggFunction::BitAnd | AggFunction::BitOr | AggFunction::BitXor => {
                let mut acc: Option<i64> = None;
                for v in &present {
                    let i = match v {
                        Value::Int(i) => *i,
                        _ => return Value::BAD_TYPE,
                    };
                    acc = Some(match (acc, self) {
                        (None, _) => i,
                        (Some(a), AggFunction::BitAnd) => a & i,
                        (Some(a), AggFunction::BitOr) => a | i,
                        (Some(a), _) => a ^ i,
                    });
                }
                acc.map(Value::Int).unwrap_or(Value::NULL)
            }
            AggFunction::Collect => Value::List(List {
                values: present.into_iter().cloned().collect(),
            }),
            AggFunction::CollectSet => {
                Value::Set(Set::from_values(present.into_iter().cloned()))
            }
        }
    }

    pub fn return_type(&self, arg: ValueType) -> Option<ValueType> {
        use ValueType::*;
        let wild = matches!(arg, Any | Null | Empty);
        match self {
            AggFunction::Count => Some(Int),
            AggFunction::Sum => (arg.is_numeric() || wild).then_some(if arg == Int {
                Int
            } else if arg == Float {
                Float
            } else {
                Any
            }),
            AggFunction::Avg | AggFunction::Std => (arg.is_numeric() || wild).then_some(Float),
            AggFunction::Max | AggFunction::Min => Some(Any),
            AggFunction::BitAnd | AggFunction::BitOr | AggFunction::BitXor => {
                (arg == Int || wild).then_some(Int)
            }
            AggFunction::Collect => Some(List),
            AggFunction::CollectSet => Some(Set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(vals: &[i64]) -> Vec<Value> {
        vals.iter().copied().map(Value::Int).collect()
    }

    #[test]
    fn count_skips_nulls() {
        let mut vals = ints(&[1, 2]);
        vals.push(Value::NULL);
        assert_eq!(AggFunction::Count.apply(&vals), Value::Int(2));
    }

    #[test]
    fn sum_avg_minmax() {
        let vals = ints(&[1, 2, 3, 4]);
        assert_eq!(AggFunction::Sum.apply(&vals), Value::Int(10));
        assert_eq!(AggFunction::Avg.apply(&vals), Value::Float(2.5));
        assert_eq!(AggFunction::Max.apply(&vals), Value::Int(4));
        assert_eq!(AggFunction::Min.apply(&vals), Value::Int(1));
    }

    #[test]
    fn empty_groups() {
        assert_eq!(AggFunction::Count.apply(&[]), Value::Int(0));
        assert_eq!(AggFunction::Avg.apply(&[]), Value::NULL);
        assert_eq!(AggFunction::Max.apply(&[]), Value::NULL);
    }

    #[test]
    fn collect_and_collect_set() {
        let vals = ints(&[1, 1, 2]);
        assert_eq!(
            AggFunction::Collect.apply(&vals),
            Value::list(ints(&[1, 1, 2]))
        );
        let set = AggFunction::CollectSet.apply(&vals);
        assert_eq!(set.as_set().unwrap().values.len(), 2);
    }

    #[test]
    fn bit_folds() {
        assert_eq!(AggFunction::BitAnd.apply(&ints(&[6, 3])), Value::Int(2));
        assert_eq!(AggFunction::BitOr.apply(&ints(&[6, 3])), Value::Int(7));
        assert_eq!(AggFunction::BitXor.apply(&ints(&[6, 3])), Value::Int(5));
    }

    #[test]
    fn name_lookup() {
        assert!(AggFunction::is_agg_name("COUNT"));
        assert!(AggFunction::is_agg_name("collect_set"));
        assert!(!AggFunction::is_agg_name("hash"));
    }
}
