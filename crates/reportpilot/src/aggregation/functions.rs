//! Aggregation function dispatch.

use std::collections::HashSet;

use crate::config::AggFunc;
use crate::stats;
use crate::table::Value;

/// Apply an aggregation function to the cells of one group.
///
/// Numeric functions only look at number cells; a group without any
/// yields `Missing` (or 0 for `sum`). Missing cells are ignored throughout.
pub(crate) fn aggregate(function: AggFunc, values: &[&Value]) -> Value {
    let present = || values.iter().copied().filter(|v| !v.is_missing());
    let numbers = || -> Vec<f64> { values.iter().filter_map(|v| v.as_f64()).collect() };

    match function {
        AggFunc::Sum => Value::number(numbers().iter().sum()),
        AggFunc::Mean => Value::from(stats::mean(&numbers())),
        AggFunc::Median => Value::from(stats::median(&numbers())),
        AggFunc::Std => Value::from(stats::sample_std(&numbers())),
        AggFunc::Var => Value::from(stats::sample_variance(&numbers())),
        AggFunc::Count => Value::Number(present().count() as f64),
        AggFunc::Min => present().min().cloned().unwrap_or_default(),
        AggFunc::Max => present().max().cloned().unwrap_or_default(),
        AggFunc::First => present().next().cloned().unwrap_or_default(),
        AggFunc::Last => present().last().cloned().unwrap_or_default(),
        AggFunc::Nunique => Value::Number(present().collect::<HashSet<_>>().len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(function: AggFunc, values: &[Value]) -> Value {
        let refs: Vec<&Value> = values.iter().collect();
        aggregate(function, &refs)
    }

    #[test]
    fn test_numeric_functions() {
        let values = [
            Value::Number(4.0),
            Value::Missing,
            Value::Number(1.0),
            Value::Number(4.0),
        ];
        assert_eq!(run(AggFunc::Sum, &values), Value::Number(9.0));
        assert_eq!(run(AggFunc::Mean, &values), Value::Number(3.0));
        assert_eq!(run(AggFunc::Median, &values), Value::Number(4.0));
        assert_eq!(run(AggFunc::Count, &values), Value::Number(3.0));
        assert_eq!(run(AggFunc::Min, &values), Value::Number(1.0));
        assert_eq!(run(AggFunc::Max, &values), Value::Number(4.0));
        assert_eq!(run(AggFunc::Var, &values), Value::Number(3.0));
        assert_eq!(run(AggFunc::Nunique, &values), Value::Number(2.0));
        assert_eq!(run(AggFunc::First, &values), Value::Number(4.0));
        assert_eq!(run(AggFunc::Last, &values), Value::Number(4.0));
    }

    #[test]
    fn test_empty_group() {
        let values = [Value::Missing];
        assert_eq!(run(AggFunc::Sum, &values), Value::Number(0.0));
        assert_eq!(run(AggFunc::Mean, &values), Value::Missing);
        assert_eq!(run(AggFunc::Count, &values), Value::Number(0.0));
        assert_eq!(run(AggFunc::Max, &values), Value::Missing);
        assert_eq!(run(AggFunc::Std, &[Value::Number(1.0)]), Value::Missing);
    }

    #[test]
    fn test_min_max_on_text() {
        let values = [Value::text("pear"), Value::text("apple")];
        assert_eq!(run(AggFunc::Min, &values), Value::text("apple"));
        assert_eq!(run(AggFunc::Max, &values), Value::text("pear"));
    }
}
