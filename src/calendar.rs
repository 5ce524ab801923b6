use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::resource::Resource;

/// Working-day predicate for one resource: a weekday pattern plus explicit
/// exception dates (holidays, leave).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    non_working_days: HashSet<Weekday>,
    exceptions: HashSet<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
            exceptions: HashSet::new(),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn new<I, J>(working_days: I, exceptions: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let working: HashSet<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Self {
                exceptions: exceptions.into_iter().collect(),
                ..Self::default()
            };
        }
        let mut non_working_days = HashSet::new();
        for day in Self::ALL_WEEKDAYS {
            if !working.contains(&day) {
                non_working_days.insert(day);
            }
        }
        Self {
            non_working_days,
            exceptions: exceptions.into_iter().collect(),
        }
    }

    /// Calendar for a resource; `None` (or an empty working-day list) falls
    /// back to the Mon-Fri default with no exceptions.
    pub fn for_resource(resource: Option<&Resource>) -> Self {
        match resource {
            Some(resource) => Self::new(
                resource.working_days.iter().copied(),
                resource.calendar_exceptions.iter().map(|ex| ex.date),
            ),
            None => Self::default(),
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.non_working_days.contains(&date.weekday()) && !self.exceptions.contains(&date)
    }

    /// Smallest date strictly after `from` that is a working day.
    pub fn next_working_day(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from + Duration::days(1);
        while !self.is_working_day(current) {
            current = current + Duration::days(1);
        }
        current
    }

    /// Advance `n` working days from `from`, skipping non-working days.
    /// `n <= 0` returns `from` unchanged.
    pub fn add_working_days(&self, from: NaiveDate, n: i64) -> NaiveDate {
        let mut current = from;
        let mut count = 0;
        while count < n {
            current = self.next_working_day(current);
            count += 1;
        }
        current
    }

    /// Count working days within `[start, end]` inclusive.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;
        while current <= end {
            if self.is_working_day(current) {
                count += 1;
            }
            current = current + Duration::days(1);
        }
        count
    }

    pub fn add_exception(&mut self, date: NaiveDate) {
        self.exceptions.insert(date);
    }
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advance `n` Mon-Fri business days from `from`. Negative `n` walks
/// backward (a lead), zero returns `from` unchanged. Dependency-lag
/// arithmetic is resource-agnostic and always uses this generic calendar.
pub fn add_business_days(from: NaiveDate, n: i64) -> NaiveDate {
    let mut current = from;
    let step = if n >= 0 { 1 } else { -1 };
    let mut remaining = n.abs();
    while remaining > 0 {
        current = current + Duration::days(step);
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    current
}

pub fn subtract_business_days(from: NaiveDate, n: i64) -> NaiveDate {
    add_business_days(from, -n)
}

/// Signed count of Mon-Fri days strictly between `a` and `b` (both endpoints
/// exclusive). Zero when the dates are equal or adjacent; negative when `b`
/// precedes `a`.
pub fn business_days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    if a == b {
        return 0;
    }
    let (lo, hi, sign) = if a < b { (a, b, 1) } else { (b, a, -1) };
    let mut count = 0;
    let mut current = lo + Duration::days(1);
    while current < hi {
        if is_business_day(current) {
            count += 1;
        }
        current = current + Duration::days(1);
    }
    count * sign
}
