use time::{Date, Month, macros::format_description};

pub fn parse_iso_date(raw: &str) -> Option<Date> {
	Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Accepts `YYYY-MM-DD`, the date part of an RFC 3339 timestamp, and `DD/MM/YYYY`.
pub fn parse_loose_date(raw: &str) -> Option<Date> {
	let trimmed = raw.trim();

	if let Some(date) = parse_iso_date(trimmed) {
		return Some(date);
	}
	if let Some((date_part, _)) = trimmed.split_once('T') {
		return parse_iso_date(date_part);
	}

	Date::parse(trimmed, format_description!("[day]/[month]/[year]")).ok()
}

/// Same calendar day one year earlier; February 29 maps to February 28.
pub fn one_year_before(date: Date) -> Date {
	let year = date.year() - 1;

	Date::from_calendar_date(year, date.month(), date.day())
		.or_else(|_| Date::from_calendar_date(year, Month::February, 28))
		.unwrap_or(date)
}
