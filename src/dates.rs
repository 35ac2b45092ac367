use time::{Date, OffsetDateTime};

// `YYYY-MM-DD` on the wire; `iso_date::option` for nullable fields.
time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Current calendar date in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
