//! Operator semantics over [Value]: total order, ternary equality,
//! arithmetic, three-valued logic and coercions.
//!
//! Every operation is total. Invalid inputs produce a `Null` sentinel; an
//! error operand propagates, preferring the leftmost one.

use std::cmp::Ordering;

use super::Value;

impl Value {
    /// Total order across heterogeneous kinds: by kind position first
    /// (NULL family sorts before everything), by value within a kind.
    /// Int and Float compare by numeric value.
    pub fn compare(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (a, b) if a.kind_order() != b.kind_order() => a.kind_order().cmp(&b.kind_order()),
            (Null(a), Null(b)) => a.cmp(b),
            (Empty, Empty) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Date(a), Date(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Duration(a), Duration(b)) => a.cmp(b),
            (Vertex(a), Vertex(b)) => a.vid.compare(&b.vid),
            (Edge(a), Edge(b)) => {
                let (a, b) = (a.canonicalized(), b.canonicalized());
                a.src
                    .compare(&b.src)
                    .then(a.etype.cmp(&b.etype))
                    .then(a.ranking.cmp(&b.ranking))
                    .then(a.dst.compare(&b.dst))
            }
            (Path(a), Path(b)) => {
                let an = a.nodes();
                let bn = b.nodes();
                for (x, y) in an.iter().zip(bn.iter()) {
                    let ord = x.vid.compare(&y.vid);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                an.len().cmp(&bn.len())
            }
            (List(a), List(b)) => compare_seq(&a.values, &b.values),
            (Set(a), Set(b)) => {
                let mut av: Vec<&Value> = a.values.iter().collect();
                let mut bv: Vec<&Value> = b.values.iter().collect();
                av.sort_by(|x, y| x.compare(y));
                bv.sort_by(|x, y| x.compare(y));
                compare_ref_seq(&av, &bv)
            }
            (Map(a), Map(b)) => {
                let mut ak: Vec<_> = a.kvs.iter().collect();
                let mut bk: Vec<_> = b.kvs.iter().collect();
                ak.sort_by(|x, y| x.0.cmp(y.0));
                bk.sort_by(|x, y| x.0.cmp(y.0));
                for ((k1, v1), (k2, v2)) in ak.iter().zip(bk.iter()) {
                    let ord = k1.cmp(k2).then_with(|| v1.compare(v2));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                ak.len().cmp(&bk.len())
            }
            (DataSet(a), DataSet(b)) => {
                for (x, y) in a.rows.iter().zip(b.rows.iter()) {
                    let ord = compare_seq(x, y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.rows.len().cmp(&b.rows.len())
            }
            _ => unreachable!("kind_order covered all cross-kind pairs"),
        }
    }

    /// The `==` operator: ternary. NULL propagates; Empty equals only
    /// Empty; distinct kinds are FALSE except the Int/Float pair.
    pub fn equal(&self, other: &Value) -> Value {
        use Value::*;
        match (self, other) {
            (Null(_), _) | (_, Null(_)) => Value::NULL,
            (Empty, Empty) => Bool(true),
            (Empty, _) | (_, Empty) => Bool(false),
            (Int(a), Float(b)) => Bool(*a as f64 == *b),
            (Float(a), Int(b)) => Bool(*a == *b as f64),
            (a, b) if a.kind_order() != b.kind_order() => Bool(false),
            (Edge(a), Edge(b)) => Bool(a.canonicalized() == b.canonicalized()),
            (a, b) => Bool(a == b),
        }
    }

    pub fn not_equal(&self, other: &Value) -> Value {
        self.equal(other).not_op()
    }

    fn ordering_op(&self, other: &Value, pred: fn(Ordering) -> bool) -> Value {
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        Value::Bool(pred(self.compare(other)))
    }

    pub fn less_than(&self, other: &Value) -> Value {
        self.ordering_op(other, Ordering::is_lt)
    }

    pub fn less_equal(&self, other: &Value) -> Value {
        self.ordering_op(other, Ordering::is_le)
    }

    pub fn greater_than(&self, other: &Value) -> Value {
        self.ordering_op(other, Ordering::is_gt)
    }

    pub fn greater_equal(&self, other: &Value) -> Value {
        self.ordering_op(other, Ordering::is_ge)
    }

    pub fn add(&self, other: &Value) -> Value {
        use Value::*;
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        match (self, other) {
            (Int(a), Int(b)) => a
                .checked_add(*b)
                .map(Int)
                .unwrap_or(Value::OVERFLOW),
            (Int(a), Float(b)) => Float(*a as f64 + b),
            (Float(a), Int(b)) => Float(a + *b as f64),
            (Float(a), Float(b)) => Float(a + b),
            (String(a), String(b)) => String(format!("{a}{b}")),
            (List(a), List(b)) => List(super::List {
                values: a.values.iter().chain(&b.values).cloned().collect(),
            }),
            (Date(d), Duration(dur)) | (Duration(dur), Date(d)) => d
                .add_duration(dur)
                .map(Date)
                .unwrap_or(Value::OUT_OF_RANGE),
            (Time(t), Duration(dur)) | (Duration(dur), Time(t)) => Time(t.add_duration(dur)),
            (DateTime(dt), Duration(dur)) | (Duration(dur), DateTime(dt)) => dt
                .add_duration(dur)
                .map(DateTime)
                .unwrap_or(Value::OUT_OF_RANGE),
            (Duration(a), Duration(b)) => Duration(super::Duration::new(
                a.months + b.months,
                a.seconds + b.seconds,
                a.microseconds + b.microseconds,
            )),
            _ => Value::BAD_TYPE,
        }
    }

    pub fn subtract(&self, other: &Value) -> Value {
        use Value::*;
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        match (self, other) {
            (Int(a), Int(b)) => a
                .checked_sub(*b)
                .map(Int)
                .unwrap_or(Value::OVERFLOW),
            (Int(a), Float(b)) => Float(*a as f64 - b),
            (Float(a), Int(b)) => Float(a - *b as f64),
            (Float(a), Float(b)) => Float(a - b),
            (Date(d), Duration(dur)) => d
                .sub_duration(dur)
                .map(Date)
                .unwrap_or(Value::OUT_OF_RANGE),
            (Time(t), Duration(dur)) => Time(t.sub_duration(dur)),
            (DateTime(dt), Duration(dur)) => dt
                .sub_duration(dur)
                .map(DateTime)
                .unwrap_or(Value::OUT_OF_RANGE),
            (Duration(a), Duration(b)) => Duration(super::Duration::new(
                a.months - b.months,
                a.seconds - b.seconds,
                a.microseconds - b.microseconds,
            )),
            _ => Value::BAD_TYPE,
        }
    }

    pub fn multiply(&self, other: &Value) -> Value {
        use Value::*;
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        match (self, other) {
            (Int(a), Int(b)) => a
                .checked_mul(*b)
                .map(Int)
                .unwrap_or(Value::OVERFLOW),
            (Int(a), Float(b)) => Float(*a as f64 * b),
            (Float(a), Int(b)) => Float(a * *b as f64),
            (Float(a), Float(b)) => Float(a * b),
            _ => Value::BAD_TYPE,
        }
    }

    pub fn divide(&self, other: &Value) -> Value {
        use Value::*;
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        match (self, other) {
            (Int(_), Int(0)) => Value::BAD_DATA,
            (Int(a), Int(b)) => a
                .checked_div(*b)
                .map(Int)
                .unwrap_or(Value::OVERFLOW),
            (Float(_), Float(b)) if *b == 0.0 => Value::BAD_DATA,
            (Int(_), Float(b)) if *b == 0.0 => Value::BAD_DATA,
            (Float(_), Int(0)) => Value::BAD_DATA,
            (Int(a), Float(b)) => Float(*a as f64 / b),
            (Float(a), Int(b)) => Float(a / *b as f64),
            (Float(a), Float(b)) => Float(a / b),
            _ => Value::BAD_TYPE,
        }
    }

    /// Modulo: ints only. Floats are deliberately rejected.
    pub fn modulo(&self, other: &Value) -> Value {
        use Value::*;
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        match (self, other) {
            (Int(_), Int(0)) => Value::BAD_DATA,
            (Int(a), Int(b)) => a
                .checked_rem(*b)
                .map(Int)
                .unwrap_or(Value::OVERFLOW),
            _ => Value::BAD_TYPE,
        }
    }

    pub fn negate(&self) -> Value {
        use Value::*;
        match self {
            Null(_) => self.clone(),
            Int(a) => a.checked_neg().map(Int).unwrap_or(Value::OVERFLOW),
            Float(a) => Float(-a),
            _ => Value::BAD_TYPE,
        }
    }

    /// Three-valued AND: `NULL AND FALSE` is FALSE.
    pub fn and_op(&self, other: &Value) -> Value {
        use Value::*;
        match (self.as_ternary(), other.as_ternary()) {
            (Some(Some(false)), _) | (_, Some(Some(false))) => Bool(false),
            (Some(Some(true)), Some(Some(true))) => Bool(true),
            (Some(None), _) | (_, Some(None)) => Value::NULL,
            _ => Value::BAD_TYPE,
        }
    }

    /// Three-valued OR: `NULL OR TRUE` is TRUE.
    pub fn or_op(&self, other: &Value) -> Value {
        use Value::*;
        match (self.as_ternary(), other.as_ternary()) {
            (Some(Some(true)), _) | (_, Some(Some(true))) => Bool(true),
            (Some(Some(false)), Some(Some(false))) => Bool(false),
            (Some(None), _) | (_, Some(None)) => Value::NULL,
            _ => Value::BAD_TYPE,
        }
    }

    /// XOR has no short-circuit row: NULL propagates.
    pub fn xor_op(&self, other: &Value) -> Value {
        use Value::*;
        match (self.as_ternary(), other.as_ternary()) {
            (Some(None), _) | (_, Some(None)) => Value::NULL,
            (Some(Some(a)), Some(Some(b))) => Bool(a != b),
            _ => Value::BAD_TYPE,
        }
    }

    pub fn not_op(&self) -> Value {
        use Value::*;
        match self.as_ternary() {
            Some(Some(b)) => Bool(!b),
            Some(None) => Value::NULL,
            None => Value::BAD_TYPE,
        }
    }

    /// `Some(Some(b))` for booleans, `Some(None)` for the NULL family,
    /// `None` for everything else.
    fn as_ternary(&self) -> Option<Option<bool>> {
        match self {
            Value::Bool(b) => Some(Some(*b)),
            Value::Null(_) => Some(None),
            _ => None,
        }
    }

    /// `IN`: NULL needle or NULL inside the container poisons a miss.
    pub fn contained_in(&self, container: &Value) -> Value {
        let items: Vec<&Value> = match container {
            Value::List(l) => l.values.iter().collect(),
            Value::Set(s) => s.values.iter().collect(),
            Value::Null(_) => return Value::NULL,
            _ => return Value::BAD_TYPE,
        };
        if self.is_null() {
            return Value::NULL;
        }
        let mut saw_null = false;
        for item in items {
            match self.equal(item) {
                Value::Bool(true) => return Value::Bool(true),
                Value::Null(_) => saw_null = true,
                _ => {}
            }
        }
        if saw_null {
            Value::NULL
        } else {
            Value::Bool(false)
        }
    }

    fn string_pair_op(&self, other: &Value, op: fn(&str, &str) -> bool) -> Value {
        if let Some(err) = propagate2(self, other) {
            return err;
        }
        match (self, other) {
            (Value::String(a), Value::String(b)) => Value::Bool(op(a, b)),
            _ => Value::BAD_TYPE,
        }
    }

    pub fn contains_str(&self, other: &Value) -> Value {
        self.string_pair_op(other, |a, b| a.contains(b))
    }

    pub fn starts_with(&self, other: &Value) -> Value {
        self.string_pair_op(other, |a, b| a.starts_with(b))
    }

    pub fn ends_with(&self, other: &Value) -> Value {
        self.string_pair_op(other, |a, b| a.ends_with(b))
    }

    /// Total coercion to Bool. Strings accept exactly "true"/"false"
    /// case-insensitively and nothing else, untrimmed.
    pub fn to_bool(&self) -> Value {
        match self {
            Value::Null(_) => self.clone(),
            Value::Empty => Value::Empty,
            Value::Bool(_) => self.clone(),
            Value::String(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Value::Bool(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Value::Bool(false)
                } else {
                    Value::NULL
                }
            }
            _ => Value::BAD_TYPE,
        }
    }

    /// Total coercion to Int. Floats truncate toward zero; strings parse as
    /// integer first, then as float.
    pub fn to_int(&self) -> Value {
        match self {
            Value::Null(_) => self.clone(),
            Value::Empty => Value::Empty,
            Value::Int(_) => self.clone(),
            Value::Float(f) => {
                if f.is_nan() || f.is_infinite() {
                    Value::BAD_DATA
                } else if *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Value::Int(f.trunc() as i64)
                } else {
                    Value::OUT_OF_RANGE
                }
            }
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    Value::Int(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    Value::Float(f).to_int()
                } else {
                    Value::NULL
                }
            }
            _ => Value::BAD_TYPE,
        }
    }

    pub fn to_float(&self) -> Value {
        match self {
            Value::Null(_) => self.clone(),
            Value::Empty => Value::Empty,
            Value::Int(i) => Value::Float(*i as f64),
            Value::Float(_) => self.clone(),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::NULL,
            },
            _ => Value::BAD_TYPE,
        }
    }

    /// Total conversion to the display string, unquoted.
    pub fn to_string_val(&self) -> Value {
        match self {
            Value::Null(_) => self.clone(),
            Value::String(_) => self.clone(),
            Value::Bool(b) => Value::from(if *b { "true" } else { "false" }),
            Value::Int(i) => Value::String(i.to_string()),
            Value::Float(f) => Value::String(float_repr(*f)),
            Value::Date(d) => Value::String(d.to_string()),
            Value::Time(t) => Value::String(t.to_string()),
            Value::DateTime(dt) => Value::String(dt.to_string()),
            Value::Duration(d) => Value::String(d.to_string()),
            _ => Value::BAD_TYPE,
        }
    }
}

/// Shortest representation that still reads back as a float.
pub(crate) fn float_repr(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Leftmost error-or-null operand wins, mirroring left-to-right evaluation.
fn propagate2(a: &Value, b: &Value) -> Option<Value> {
    if a.is_null() {
        Some(a.clone())
    } else if b.is_null() {
        Some(b.clone())
    } else {
        None
    }
}

fn compare_seq(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.compare(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_ref_seq(a: &[&Value], b: &[&Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.compare(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::super::{Date, Duration, NullKind};
    use super::*;

    #[test]
    fn cross_kind_order_follows_discriminants() {
        let vals = [
            Value::NULL,
            Value::Empty,
            Value::Bool(true),
            Value::Int(9),
            Value::from("a"),
            Value::list(vec![]),
        ];
        for w in vals.windows(2) {
            assert_eq!(w[0].compare(&w[1]), Ordering::Less, "{} < {}", w[0], w[1]);
        }
    }

    #[test]
    fn numeric_band_compares_by_value() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(2.5).compare(&Value::Int(2)), Ordering::Greater);
        assert_eq!(Value::Int(2).compare(&Value::Float(2.0)), Ordering::Equal);
    }

    #[test]
    fn strings_compare_by_bytes() {
        assert_eq!(
            Value::from("abc").compare(&Value::from("abd")),
            Ordering::Less
        );
        assert_eq!(Value::from("Z").compare(&Value::from("a")), Ordering::Less);
    }

    #[test]
    fn equality_is_ternary() {
        assert_eq!(Value::NULL.equal(&Value::Int(1)), Value::NULL);
        assert_eq!(Value::Int(1).equal(&Value::NULL), Value::NULL);
        assert_eq!(Value::Empty.equal(&Value::Empty), Value::Bool(true));
        assert_eq!(Value::Empty.equal(&Value::Int(0)), Value::Bool(false));
        assert_eq!(Value::Int(1).equal(&Value::Float(1.0)), Value::Bool(true));
        assert_eq!(Value::Int(1).equal(&Value::from("1")), Value::Bool(false));
    }

    #[test]
    fn arithmetic_coerces_int_to_float() {
        assert_eq!(Value::Int(1).add(&Value::Float(0.5)), Value::Float(1.5));
        assert_eq!(Value::Int(3).multiply(&Value::Int(4)), Value::Int(12));
        assert_eq!(Value::Int(7).divide(&Value::Int(2)), Value::Int(3));
        assert_eq!(Value::Int(7).modulo(&Value::Int(3)), Value::Int(1));
    }

    #[test]
    fn division_by_zero_is_bad_data() {
        assert_eq!(Value::Int(1).divide(&Value::Int(0)), Value::BAD_DATA);
        assert_eq!(Value::Float(1.0).divide(&Value::Int(0)), Value::BAD_DATA);
        assert_eq!(Value::Int(1).modulo(&Value::Int(0)), Value::BAD_DATA);
    }

    #[test]
    fn float_modulo_is_bad_type() {
        assert_eq!(Value::Float(7.0).modulo(&Value::Int(3)), Value::BAD_TYPE);
    }

    #[test]
    fn bool_arithmetic_is_bad_type() {
        assert_eq!(Value::Bool(true).add(&Value::Int(1)), Value::BAD_TYPE);
        assert_eq!(Value::Bool(true).negate(), Value::BAD_TYPE);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(Value::Int(i64::MAX).add(&Value::Int(1)), Value::OVERFLOW);
        assert_eq!(Value::Int(i64::MIN).negate(), Value::OVERFLOW);
    }

    #[test]
    fn error_values_propagate_leftmost_first() {
        let bad = Value::BAD_TYPE;
        let div0 = Value::BAD_DATA;
        assert_eq!(bad.add(&div0), bad);
        assert_eq!(div0.add(&bad), div0);
        assert_eq!(Value::Int(1).add(&bad), bad);
    }

    #[test]
    fn string_and_list_concat() {
        assert_eq!(
            Value::from("ab").add(&Value::from("cd")),
            Value::from("abcd")
        );
        assert_eq!(
            Value::list(vec![Value::Int(1)]).add(&Value::list(vec![Value::Int(2)])),
            Value::list(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn temporal_addition() {
        let d = Value::Date(Date::new(2020, 2, 28));
        let one_day = Value::Duration(Duration::new(0, 86400, 0));
        assert_eq!(d.add(&one_day), Value::Date(Date::new(2020, 2, 29)));
        assert_eq!(
            Value::Date(Date::new(2020, 2, 29)).subtract(&Value::Duration(Duration::new(0, 86400, 0))),
            d
        );
    }

    #[test]
    fn three_valued_logic_tables() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        let n = Value::NULL;
        assert_eq!(n.and_op(&f), f);
        assert_eq!(f.and_op(&n), f);
        assert_eq!(n.and_op(&t), n);
        assert_eq!(n.or_op(&t), t);
        assert_eq!(t.or_op(&n), t);
        assert_eq!(n.or_op(&f), n);
        assert_eq!(n.xor_op(&t), n);
        assert_eq!(t.xor_op(&f), t);
        assert_eq!(t.xor_op(&t), f);
        assert_eq!(n.not_op(), n);
        assert_eq!(Value::Int(1).and_op(&t), Value::BAD_TYPE);
    }

    #[test]
    fn in_operator_null_semantics() {
        let list = Value::list(vec![Value::Int(1), Value::NULL]);
        assert_eq!(Value::Int(1).contained_in(&list), Value::Bool(true));
        assert_eq!(Value::Int(2).contained_in(&list), Value::NULL);
        let clean = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(Value::Int(3).contained_in(&clean), Value::Bool(false));
        assert_eq!(Value::NULL.contained_in(&clean), Value::NULL);
        assert_eq!(Value::Int(1).contained_in(&Value::Int(1)), Value::BAD_TYPE);
    }

    #[test]
    fn string_predicates() {
        assert_eq!(
            Value::from("hello").contains_str(&Value::from("ell")),
            Value::Bool(true)
        );
        assert_eq!(
            Value::from("hello").starts_with(&Value::from("he")),
            Value::Bool(true)
        );
        assert_eq!(
            Value::from("hello").ends_with(&Value::from("lo")),
            Value::Bool(true)
        );
        assert_eq!(
            Value::from("hello").starts_with(&Value::Int(1)),
            Value::BAD_TYPE
        );
    }

    #[test]
    fn to_bool_literal_quirks() {
        assert_eq!(Value::from("fAlse").to_bool(), Value::Bool(false));
        assert_eq!(Value::from("false ").to_bool(), Value::NULL);
        assert_eq!(Value::from("TRUE").to_bool(), Value::Bool(true));
        assert_eq!(Value::Int(1).to_bool(), Value::BAD_TYPE);
        assert_eq!(Value::Null(NullKind::Null).to_bool(), Value::NULL);
    }

    #[test]
    fn numeric_coercion_round_trips() {
        for n in [0i64, 1, -1, 42, i64::MAX, i64::MIN] {
            let printed = Value::Int(n).to_string_val();
            assert_eq!(printed.to_int(), Value::Int(n));
        }
        for x in [0.5f64, -3.25, 1e300] {
            let printed = Value::Float(x).to_string_val();
            assert_eq!(printed.to_float(), Value::Float(x));
        }
        assert_eq!(Value::Float(2.9).to_int(), Value::Int(2));
        assert_eq!(Value::Float(-2.9).to_int(), Value::Int(-2));
        assert_eq!(Value::from("1e3").to_int(), Value::Int(1000));
        assert_eq!(Value::from("abc").to_int(), Value::NULL);
    }
}
