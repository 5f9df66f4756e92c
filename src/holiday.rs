//! US federal holiday calendar (observed-date shifting is not applied).

use chrono::{Datelike, NaiveDate, Weekday};

/// Holidays that land on a fixed month/day every year.
const FIXED: [(u32, u32, &str); 6] = [
    (1, 1, "New Year's Day"),
    (6, 19, "Juneteenth"),
    (7, 4, "Independence Day"),
    (11, 11, "Veterans Day"),
    (12, 24, "Christmas Eve"),
    (12, 25, "Christmas Day"),
];

/// Holidays defined as the nth weekday of a month. `n == 0` means the last one.
const FLOATING: [(u32, Weekday, u8, &str); 5] = [
    (1, Weekday::Mon, 3, "Martin Luther King Jr. Day"),
    (2, Weekday::Mon, 3, "Presidents' Day"),
    (5, Weekday::Mon, 0, "Memorial Day"),
    (9, Weekday::Mon, 1, "Labor Day"),
    (11, Weekday::Thu, 4, "Thanksgiving Day"),
];

pub fn is_holiday(date: NaiveDate) -> bool {
    holiday_name(date).is_some()
}

pub fn holiday_name(date: NaiveDate) -> Option<&'static str> {
    let (month, day) = (date.month(), date.day());
    if let Some((_, _, name)) = FIXED.iter().find(|(m, d, _)| *m == month && *d == day) {
        return Some(*name);
    }
    let nth = ((day - 1) / 7 + 1) as u8;
    let is_last = date
        .checked_add_days(chrono::Days::new(7))
        .is_none_or(|next| next.month() != month);
    FLOATING
        .iter()
        .find(|(m, wd, n, _)| {
            *m == month && *wd == date.weekday() && (*n == nth || (*n == 0 && is_last))
        })
        .map(|(_, _, _, name)| *name)
}

/// Every holiday of `year`, sorted by date.
pub fn holidays_in(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let fixed = FIXED
        .iter()
        .filter_map(|(m, d, name)| NaiveDate::from_ymd_opt(year, *m, *d).map(|date| (date, *name)));
    let floating = FLOATING.iter().filter_map(|(m, wd, n, name)| {
        let date = match *n {
            0 => NaiveDate::from_weekday_of_month_opt(year, *m, *wd, 5)
                .or_else(|| NaiveDate::from_weekday_of_month_opt(year, *m, *wd, 4)),
            n => NaiveDate::from_weekday_of_month_opt(year, *m, *wd, n),
        };
        date.map(|date| (date, *name))
    });
    let mut all: Vec<_> = fixed.chain(floating).collect();
    all.sort();
    all
}
