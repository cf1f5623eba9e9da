use chrono::{Datelike, NaiveDate};

/// Whole years elapsed between a stored `YYYY-MM-DD` birthday and `today`.
///
/// The year difference is reduced by one when today's month/day still sits
/// before the birthday's month/day. Returns `None` when the stored text does
/// not parse; callers surface that as an unknown age rather than an error.
/// Parsing is strict: the text must be exactly the date, so padded or
/// decorated input counts as unknown.
#[must_use]
pub fn age_on(birthday: &str, today: NaiveDate) -> Option<i32> {
    let birth = NaiveDate::parse_from_str(birthday, "%Y-%m-%d").ok()?;

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }

    Some(age)
}

/// Age as of the server's local date.
#[must_use]
pub fn current_age(birthday: &str) -> Option<i32> {
    age_on(birthday, chrono::Local::now().date_naive())
}
