//! Time-dimension derivation.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::diagnostics::DiagnosticsSink;
use crate::error::{ReportError, Result};
use crate::table::{Table, Value};

pub(crate) const YEAR: &str = "year";
pub(crate) const MONTH: &str = "month";
pub(crate) const WEEK: &str = "week";
pub(crate) const DAY_OF_WEEK: &str = "day_of_week";
pub(crate) const WEEK_START: &str = "week_start";

/// Derived columns that never count as metrics in the statistics summary.
pub(crate) const CALENDAR_COLUMNS: [&str; 3] = [YEAR, MONTH, WEEK];

/// The first day of the week containing `date`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(date)
}

/// English name of a weekday.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Coerce the date column and append year, month, ISO week, weekday name
/// and week start. Existing columns with those names are overwritten.
pub(crate) fn add_time_dimensions(
    table: &mut Table,
    date_column: &str,
    first_day: Weekday,
    sink: &mut dyn DiagnosticsSink,
) -> Result<()> {
    let date_idx = table
        .column_index(date_column)
        .ok_or_else(|| ReportError::missing_columns([date_column]))?;

    let mut unparsed = 0;
    for cell in table.column_values_mut(date_idx) {
        let coerced = cell.to_date();
        if coerced.is_missing() && !cell.is_missing() {
            unparsed += 1;
        }
        *cell = coerced;
    }
    if unparsed > 0 {
        sink.warn(
            "time_dimensions",
            format!(
                "{} value(s) in '{}' are not dates and are excluded from time groupings",
                unparsed, date_column
            ),
        );
    }

    for name in [YEAR, MONTH, WEEK, DAY_OF_WEEK, WEEK_START] {
        if name != date_column && table.has_column(name) {
            sink.warn(
                "time_dimensions",
                format!("Derived column '{}' overwrites an existing column", name),
            );
        }
    }

    let dates: Vec<Option<NaiveDate>> = table.column_values(date_idx).map(Value::as_date).collect();
    let derive = |f: &dyn Fn(NaiveDate) -> Value| -> Vec<Value> {
        dates
            .iter()
            .map(|d| d.map(f).unwrap_or(Value::Missing))
            .collect()
    };

    let years = derive(&|d| Value::Number(f64::from(d.year())));
    let months = derive(&|d| Value::Number(f64::from(d.month())));
    let weeks = derive(&|d| Value::Number(f64::from(d.iso_week().week())));
    let day_names = derive(&|d| Value::text(day_name(d.weekday())));
    let starts = derive(&|d| Value::Date(week_start(d, first_day)));

    table.set_column(YEAR, years)?;
    table.set_column(MONTH, months)?;
    table.set_column(WEEK, weeks)?;
    table.set_column(DAY_OF_WEEK, day_names)?;
    table.set_column(WEEK_START, starts)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_monday() {
        // 2024-01-10 is a Wednesday.
        assert_eq!(week_start(date(2024, 1, 10), Weekday::Mon), date(2024, 1, 8));
        assert_eq!(week_start(date(2024, 1, 8), Weekday::Mon), date(2024, 1, 8));
        assert_eq!(week_start(date(2024, 1, 14), Weekday::Mon), date(2024, 1, 8));
    }

    #[test]
    fn test_week_start_sunday() {
        assert_eq!(week_start(date(2024, 1, 10), Weekday::Sun), date(2024, 1, 7));
        assert_eq!(week_start(date(2024, 1, 7), Weekday::Sun), date(2024, 1, 7));
    }

    #[test]
    fn test_add_time_dimensions() {
        let mut table = Table::from_columns(vec![(
            "date",
            vec![Value::text("2024-01-10"), Value::text("garbage")],
        )])
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        add_time_dimensions(&mut table, "date", Weekday::Mon, &mut diagnostics).unwrap();

        assert_eq!(
            table.column_names(),
            &["date", "year", "month", "week", "day_of_week", "week_start"]
        );
        assert_eq!(table.get_by_name(0, "week"), Some(&Value::Number(2.0)));
        assert_eq!(table.get_by_name(0, "day_of_week"), Some(&Value::text("Wednesday")));
        assert_eq!(
            table.get_by_name(0, "week_start"),
            Some(&Value::Date(date(2024, 1, 8)))
        );
        assert_eq!(table.get_by_name(1, "week_start"), Some(&Value::Missing));
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_derived_column_overwrites() {
        let mut table = Table::from_columns(vec![
            ("date", vec![Value::text("2024-03-05")]),
            ("year", vec![Value::text("fiscal-24")]),
        ])
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        add_time_dimensions(&mut table, "date", Weekday::Mon, &mut diagnostics).unwrap();

        assert_eq!(table.column_count(), 6);
        assert_eq!(table.get_by_name(0, "year"), Some(&Value::Number(2024.0)));
        assert_eq!(diagnostics.warning_count(), 1);
    }
}
