use chrono::{Datelike, NaiveDate};

/// Returns every date from `start` to `end`, inclusive.
pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            // Should not happen for typical date ranges
            break;
        }
    }
    days
}

/// Period key for the month containing `date`, formatted "YYYY-MM".
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Period key for the year containing `date`, formatted "YYYY".
pub fn year_key(date: NaiveDate) -> String {
    format!("{:04}", date.year())
}

/// First and last calendar day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of month is always valid");
    let last = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .and_then(|d| d.pred_opt())
    .expect("last of month is always valid");
    (first, last)
}

/// First and last calendar day of the year containing `date`.
pub fn year_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("jan 1 is always valid");
    let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).expect("dec 31 is always valid");
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_between_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days = get_days_between(start, end);
        // 2024 is a leap year
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_days_between_reversed_is_empty() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(get_days_between(start, end).is_empty());
    }

    #[test]
    fn test_period_keys() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 15).unwrap();
        assert_eq!(month_key(date), "2023-07");
        assert_eq!(year_key(date), "2023");
    }

    #[test]
    fn test_month_bounds_december() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 10).unwrap();
        let (first, last) = month_bounds(date);
        assert_eq!(first, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_month_bounds_february_leap() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let (_, last) = month_bounds(date);
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
