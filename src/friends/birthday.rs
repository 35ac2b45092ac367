use time::{Date, Month};

/// Where a recurring birthday falls relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextBirthday {
    pub date: Date,
    pub days_until: i64,
    pub is_today: bool,
}

/// Soonest date, on or after `today`, sharing month and day with `birth_date`.
pub fn next_occurrence(birth_date: Date, today: Date) -> NextBirthday {
    let candidate = occurrence_in(birth_date, today.year());

    if candidate == today {
        return NextBirthday {
            date: today,
            days_until: 0,
            is_today: true,
        };
    }

    let date = if candidate < today {
        occurrence_in(birth_date, today.year() + 1)
    } else {
        candidate
    };

    NextBirthday {
        date,
        days_until: (date - today).whole_days(),
        is_today: false,
    }
}

/// The birthday as celebrated in `year`. Feb 29 falls on Mar 1 in common years.
pub fn occurrence_in(birth_date: Date, year: i32) -> Date {
    birth_date
        .replace_year(year)
        .or_else(|_| Date::from_calendar_date(year, Month::March, 1))
        .unwrap_or(Date::MAX)
}
