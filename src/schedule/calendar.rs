use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::types::PaycheckMonth;

/// day of month the monthly special charges land on
pub const SPECIAL_CHARGE_DAY: u32 = 15;

/// weekday occurrences in a month at which it holds three biweekly paychecks
const THREE_PAYCHECK_OCCURRENCES: u32 = 5;

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// last calendar day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    days_in_month(date.year(), date.month())
}

/// first day of the month after the one containing `date`
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first + Duration::days(last_day_of_month(date) as i64)
}

/// `weekday` on or after `date`
pub fn first_weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() + 7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(ahead as i64)
}

/// first payday-anchored date of a horizon: never the start date itself
pub fn first_anchored_after(start: NaiveDate, weekday: Weekday) -> NaiveDate {
    let first = first_weekday_on_or_after(start, weekday);
    if first == start {
        first + Duration::days(7)
    } else {
        first
    }
}

/// biweekly dates anchored on `weekday`, from just after `start` through `end`
pub fn biweekly_dates(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = first_anchored_after(start, weekday);
    while current <= end {
        dates.push(current);
        current += Duration::days(14);
    }
    dates
}

/// occurrences of `weekday` in a calendar month
pub fn count_weekday_in_month(year: i32, month: u32, weekday: Weekday) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let first_hit = first_weekday_on_or_after(first, weekday);
    let remaining = days_in_month(year, month) - first_hit.day();
    1 + remaining / 7
}

/// 2- or 3-paycheck classification of the month containing `date`
pub fn classify_month(date: NaiveDate, weekday: Weekday) -> PaycheckMonth {
    if count_weekday_in_month(date.year(), date.month(), weekday) >= THREE_PAYCHECK_OCCURRENCES {
        PaycheckMonth::Three
    } else {
        PaycheckMonth::Two
    }
}

/// first 15th of a month on or after `start`
pub fn fifteenth_on_or_after(start: NaiveDate) -> NaiveDate {
    if start.day() <= SPECIAL_CHARGE_DAY {
        start.with_day(SPECIAL_CHARGE_DAY).unwrap_or(start)
    } else {
        let next = first_of_next_month(start);
        next.with_day(SPECIAL_CHARGE_DAY).unwrap_or(next)
    }
}

/// 15ths of consecutive months from `start` through `end`
pub fn monthly_fifteenths(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = fifteenth_on_or_after(start);
    while current <= end {
        dates.push(current);
        let next = first_of_next_month(current);
        current = next.with_day(SPECIAL_CHARGE_DAY).unwrap_or(next);
    }
    dates
}

/// first day of every month overlapping [start, end]
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = start.with_day(1).unwrap_or(start);
    while current <= end {
        months.push(current);
        current = first_of_next_month(current);
    }
    months
}

/// `day` of the month starting at `month_start`, overflowing into the next month
pub fn day_with_rollover(month_start: NaiveDate, day: u32) -> NaiveDate {
    let len = last_day_of_month(month_start);
    if day > len {
        let next = first_of_next_month(month_start);
        next.checked_add_signed(Duration::days(i64::from(day - len - 1))).unwrap_or(next)
    } else {
        month_start + Duration::days(i64::from(day.saturating_sub(1)))
    }
}
