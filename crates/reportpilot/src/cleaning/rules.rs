//! Evaluation of custom row-filter rules.

use std::cmp::Ordering;

use crate::config::{Comparator, CustomRule, RuleValue};
use crate::table::Value;

/// Returns true if `cell` satisfies the rule and the row should be kept.
///
/// Missing cells and cells of an incomparable type never satisfy an
/// ordering or equality test, so they only survive `!=` and `not_in`.
pub(crate) fn rule_matches(rule: &CustomRule, cell: &Value) -> bool {
    match rule.comparator {
        Comparator::Gt => ordering(cell, &rule.value).is_some_and(|o| o == Ordering::Greater),
        Comparator::Lt => ordering(cell, &rule.value).is_some_and(|o| o == Ordering::Less),
        Comparator::Ge => ordering(cell, &rule.value).is_some_and(|o| o != Ordering::Less),
        Comparator::Le => ordering(cell, &rule.value).is_some_and(|o| o != Ordering::Greater),
        Comparator::Eq => equals(cell, &rule.value),
        Comparator::Ne => !equals(cell, &rule.value),
        Comparator::In => contains(&rule.value, cell),
        Comparator::NotIn => !contains(&rule.value, cell),
    }
}

fn ordering(cell: &Value, value: &RuleValue) -> Option<Ordering> {
    cell.compare(&value.to_value_like(cell))
}

fn equals(cell: &Value, value: &RuleValue) -> bool {
    ordering(cell, value) == Some(Ordering::Equal)
}

fn contains(list: &RuleValue, cell: &Value) -> bool {
    match list {
        RuleValue::List(items) => items.iter().any(|item| equals(cell, item)),
        scalar => equals(cell, scalar),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rule(comparator: Comparator, value: RuleValue) -> CustomRule {
        CustomRule::new("col", comparator, value)
    }

    #[test]
    fn test_numeric_comparisons() {
        let ten = RuleValue::Number(10.0);
        let cell = Value::Number(10.0);
        assert!(!rule_matches(&rule(Comparator::Gt, ten.clone()), &cell));
        assert!(rule_matches(&rule(Comparator::Ge, ten.clone()), &cell));
        assert!(rule_matches(&rule(Comparator::Le, ten.clone()), &cell));
        assert!(!rule_matches(&rule(Comparator::Lt, ten.clone()), &cell));
        assert!(rule_matches(&rule(Comparator::Eq, ten.clone()), &cell));
        assert!(!rule_matches(&rule(Comparator::Ne, ten), &cell));
    }

    #[test]
    fn test_missing_cells() {
        let cell = Value::Missing;
        let ten = RuleValue::Number(10.0);
        assert!(!rule_matches(&rule(Comparator::Gt, ten.clone()), &cell));
        assert!(!rule_matches(&rule(Comparator::Eq, ten.clone()), &cell));
        assert!(rule_matches(&rule(Comparator::Ne, ten), &cell));

        let list = RuleValue::List(vec![RuleValue::Text("a".into())]);
        assert!(!rule_matches(&rule(Comparator::In, list.clone()), &cell));
        assert!(rule_matches(&rule(Comparator::NotIn, list), &cell));
    }

    #[test]
    fn test_membership() {
        let list = RuleValue::List(vec![
            RuleValue::Text("open".into()),
            RuleValue::Text("done".into()),
        ]);
        assert!(rule_matches(&rule(Comparator::In, list.clone()), &Value::text("done")));
        assert!(!rule_matches(&rule(Comparator::In, list.clone()), &Value::text("void")));
        assert!(rule_matches(&rule(Comparator::NotIn, list), &Value::text("void")));
    }

    #[test]
    fn test_incomparable_types() {
        let cell = Value::text("5");
        assert!(!rule_matches(&rule(Comparator::Gt, RuleValue::Number(1.0)), &cell));
        assert!(rule_matches(&rule(Comparator::Ne, RuleValue::Number(5.0)), &cell));
    }

    #[test]
    fn test_date_comparison() {
        let cell = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let value = RuleValue::Text("2024-02-01".into());
        assert!(rule_matches(&rule(Comparator::Ge, value), &cell));
    }
}
