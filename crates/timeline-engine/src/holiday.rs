//! Public holiday lookup.
//!
//! [`HolidayProvider`] is the seam to whatever calendar source the host
//! application uses. [`BuiltinHolidays`] is a rule-table implementation covering
//! a handful of national calendars so the engine works without external data.
//! Fixed dates and weekday-of-month rules are yearly RRULEs expanded with the
//! `rrule` crate; Easter-relative feasts are computed directly.
//!
//! Unknown country codes never fail: [`resolve_region`] substitutes a default
//! region instead.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rrule::RRuleSet;
use tracing::warn;

/// Region used when a country code is missing or unsupported.
pub const DEFAULT_REGION: &str = "US";

/// Years for which holidays are produced. Outside this range a date does not
/// pack into a negative eight-digit id.
pub const HOLIDAY_YEARS: RangeInclusive<i32> = 1000..=9999;

/// Source of holiday names per country and date.
pub trait HolidayProvider {
    /// Whether `country` (an ISO 3166-1 alpha-2 code, upper case) is known.
    fn supports(&self, country: &str) -> bool;

    /// Name of the holiday on `date` in `country`, if any.
    fn holiday_name(&self, country: &str, date: NaiveDate) -> Option<String>;

    /// Every holiday of `country` in `year`, ordered by date.
    ///
    /// The default walks the year day by day through [`holiday_name`]; rule
    /// based providers override it to evaluate each rule once.
    ///
    /// [`holiday_name`]: HolidayProvider::holiday_name
    fn holidays_in_year(&self, country: &str, year: i32) -> Vec<(NaiveDate, String)> {
        let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return Vec::new();
        };
        first
            .iter_days()
            .take_while(|day| day.year() == year)
            .filter_map(|day| self.holiday_name(country, day).map(|name| (day, name)))
            .collect()
    }
}

impl<H: HolidayProvider + ?Sized> HolidayProvider for &H {
    fn supports(&self, country: &str) -> bool {
        (**self).supports(country)
    }

    fn holiday_name(&self, country: &str, date: NaiveDate) -> Option<String> {
        (**self).holiday_name(country, date)
    }

    fn holidays_in_year(&self, country: &str, year: i32) -> Vec<(NaiveDate, String)> {
        (**self).holidays_in_year(country, year)
    }
}

/// Normalize `requested` and fall back to `fallback` if the provider does not
/// know it.
pub fn resolve_region<H: HolidayProvider + ?Sized>(
    provider: &H,
    requested: &str,
    fallback: &str,
) -> String {
    let code = requested.trim().to_ascii_uppercase();
    if provider.supports(&code) {
        return code;
    }
    warn!(requested, fallback, "unsupported holiday region, using fallback");
    fallback.trim().to_ascii_uppercase()
}

/// Holidays in `[from, to]` (inclusive) for an already-resolved region, in
/// date order.
///
/// The iterator is lazy and works one year at a time, so taking a prefix of a
/// very wide range only evaluates the years it reaches. Years outside
/// [`HOLIDAY_YEARS`] are skipped.
pub fn holidays_in_range<'a, H: HolidayProvider + ?Sized>(
    provider: &'a H,
    region: &'a str,
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = (NaiveDate, String)> + 'a {
    let first = from.year().max(*HOLIDAY_YEARS.start());
    let last = to.year().min(*HOLIDAY_YEARS.end());
    (first..=last)
        .flat_map(move |year| provider.holidays_in_year(region, year))
        .filter(move |(date, _)| *date >= from && *date <= to)
}

/// Request-scoped pseudo-id for a holiday: the date as a negated `YYYYMMDD`.
///
/// Storage ids are non-negative, so these never collide with them. Two users
/// share the same id for the same date; ids are only unique within a response.
/// Returns `None` for years outside [`HOLIDAY_YEARS`].
pub fn holiday_id(date: NaiveDate) -> Option<i64> {
    if !HOLIDAY_YEARS.contains(&date.year()) {
        return None;
    }
    let packed = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
    Some(-packed)
}

// ---------------------------------------------------------------------------
// Built-in rule tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Same month/day every year.
    Fixed { month: u32, day: u32, name: &'static str },
    /// The `n`th `weekday` of `month` (1-based).
    Nth { month: u32, weekday: Weekday, n: u8, name: &'static str },
    /// The last `weekday` of `month`.
    Last { month: u32, weekday: Weekday, name: &'static str },
    /// The last `weekday` on or before `month`/`day`.
    OnOrBefore { month: u32, day: u32, weekday: Weekday, name: &'static str },
    /// `offset` days from Western Easter Sunday.
    Easter { offset: i64, name: &'static str },
}

impl Rule {
    fn name(&self) -> &'static str {
        match *self {
            Rule::Fixed { name, .. }
            | Rule::Nth { name, .. }
            | Rule::Last { name, .. }
            | Rule::OnOrBefore { name, .. }
            | Rule::Easter { name, .. } => name,
        }
    }

    /// The RRULE parts selecting this rule's day within a year, or `None` for
    /// Easter-relative rules.
    fn by_parts(&self) -> Option<String> {
        let parts = match *self {
            Rule::Fixed { month, day, .. } => format!("BYMONTH={month};BYMONTHDAY={day}"),
            Rule::Nth { month, weekday, n, .. } => {
                format!("BYMONTH={month};BYDAY={n}{}", ical_weekday(weekday))
            }
            Rule::Last { month, weekday, .. } => {
                format!("BYMONTH={month};BYDAY=-1{}", ical_weekday(weekday))
            }
            Rule::OnOrBefore { month, day, weekday, .. } => {
                let window: Vec<String> =
                    (day.saturating_sub(6).max(1)..=day).map(|d| d.to_string()).collect();
                format!(
                    "BYMONTH={month};BYMONTHDAY={};BYDAY={}",
                    window.join(","),
                    ical_weekday(weekday)
                )
            }
            Rule::Easter { .. } => return None,
        };
        Some(parts)
    }

    fn date_in(&self, year: i32) -> Option<NaiveDate> {
        if let Rule::Easter { offset, .. } = *self {
            return easter_sunday(year).map(|easter| easter + Duration::days(offset));
        }
        let parts = self.by_parts()?;
        let text = format!(
            "DTSTART:{year:04}0101T000000Z\nRRULE:FREQ=YEARLY;UNTIL={year:04}1231T235959Z;{parts}"
        );
        let set: RRuleSet = match text.parse() {
            Ok(set) => set,
            Err(error) => {
                warn!(%error, year, rule = self.name(), "holiday rule rejected");
                return None;
            }
        };
        set.all(1).dates.first().map(|dt| dt.date_naive())
    }
}

fn ical_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Western (Gregorian) Easter Sunday, anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

const US: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "New Year's Day" },
    Rule::Nth { month: 1, weekday: Weekday::Mon, n: 3, name: "Martin Luther King Jr. Day" },
    Rule::Nth { month: 2, weekday: Weekday::Mon, n: 3, name: "Washington's Birthday" },
    Rule::Last { month: 5, weekday: Weekday::Mon, name: "Memorial Day" },
    Rule::Fixed { month: 6, day: 19, name: "Juneteenth National Independence Day" },
    Rule::Fixed { month: 7, day: 4, name: "Independence Day" },
    Rule::Nth { month: 9, weekday: Weekday::Mon, n: 1, name: "Labor Day" },
    Rule::Nth { month: 10, weekday: Weekday::Mon, n: 2, name: "Columbus Day" },
    Rule::Fixed { month: 11, day: 11, name: "Veterans Day" },
    Rule::Nth { month: 11, weekday: Weekday::Thu, n: 4, name: "Thanksgiving" },
    Rule::Fixed { month: 12, day: 25, name: "Christmas Day" },
];

const GB: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "New Year's Day" },
    Rule::Easter { offset: -2, name: "Good Friday" },
    Rule::Easter { offset: 1, name: "Easter Monday" },
    Rule::Nth { month: 5, weekday: Weekday::Mon, n: 1, name: "May Day" },
    Rule::Last { month: 5, weekday: Weekday::Mon, name: "Spring Bank Holiday" },
    Rule::Last { month: 8, weekday: Weekday::Mon, name: "Late Summer Bank Holiday" },
    Rule::Fixed { month: 12, day: 25, name: "Christmas Day" },
    Rule::Fixed { month: 12, day: 26, name: "Boxing Day" },
];

const ES: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "Año Nuevo" },
    Rule::Fixed { month: 1, day: 6, name: "Epifanía del Señor" },
    Rule::Easter { offset: -2, name: "Viernes Santo" },
    Rule::Fixed { month: 5, day: 1, name: "Fiesta del Trabajo" },
    Rule::Fixed { month: 8, day: 15, name: "Asunción de la Virgen" },
    Rule::Fixed { month: 10, day: 12, name: "Fiesta Nacional de España" },
    Rule::Fixed { month: 11, day: 1, name: "Todos los Santos" },
    Rule::Fixed { month: 12, day: 6, name: "Día de la Constitución Española" },
    Rule::Fixed { month: 12, day: 8, name: "Inmaculada Concepción" },
    Rule::Fixed { month: 12, day: 25, name: "Natividad del Señor" },
];

const MX: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "Año Nuevo" },
    Rule::Nth { month: 2, weekday: Weekday::Mon, n: 1, name: "Día de la Constitución" },
    Rule::Nth { month: 3, weekday: Weekday::Mon, n: 3, name: "Natalicio de Benito Juárez" },
    Rule::Fixed { month: 5, day: 1, name: "Día del Trabajo" },
    Rule::Fixed { month: 9, day: 16, name: "Día de la Independencia" },
    Rule::Nth { month: 11, weekday: Weekday::Mon, n: 3, name: "Día de la Revolución" },
    Rule::Fixed { month: 12, day: 25, name: "Navidad" },
];

const CA: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "New Year's Day" },
    Rule::Easter { offset: -2, name: "Good Friday" },
    Rule::OnOrBefore { month: 5, day: 24, weekday: Weekday::Mon, name: "Victoria Day" },
    Rule::Fixed { month: 7, day: 1, name: "Canada Day" },
    Rule::Nth { month: 9, weekday: Weekday::Mon, n: 1, name: "Labour Day" },
    Rule::Nth { month: 10, weekday: Weekday::Mon, n: 2, name: "Thanksgiving" },
    Rule::Fixed { month: 11, day: 11, name: "Remembrance Day" },
    Rule::Fixed { month: 12, day: 25, name: "Christmas Day" },
    Rule::Fixed { month: 12, day: 26, name: "Boxing Day" },
];

const DE: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "Neujahr" },
    Rule::Easter { offset: -2, name: "Karfreitag" },
    Rule::Easter { offset: 1, name: "Ostermontag" },
    Rule::Fixed { month: 5, day: 1, name: "Erster Mai" },
    Rule::Easter { offset: 39, name: "Christi Himmelfahrt" },
    Rule::Easter { offset: 50, name: "Pfingstmontag" },
    Rule::Fixed { month: 10, day: 3, name: "Tag der Deutschen Einheit" },
    Rule::Fixed { month: 12, day: 25, name: "Erster Weihnachtstag" },
    Rule::Fixed { month: 12, day: 26, name: "Zweiter Weihnachtstag" },
];

const FR: &[Rule] = &[
    Rule::Fixed { month: 1, day: 1, name: "Jour de l'an" },
    Rule::Easter { offset: 1, name: "Lundi de Pâques" },
    Rule::Fixed { month: 5, day: 1, name: "Fête du Travail" },
    Rule::Fixed { month: 5, day: 8, name: "Fête de la Victoire" },
    Rule::Easter { offset: 39, name: "Ascension" },
    Rule::Easter { offset: 50, name: "Lundi de Pentecôte" },
    Rule::Fixed { month: 7, day: 14, name: "Fête nationale" },
    Rule::Fixed { month: 8, day: 15, name: "Assomption" },
    Rule::Fixed { month: 11, day: 1, name: "Toussaint" },
    Rule::Fixed { month: 11, day: 11, name: "Armistice" },
    Rule::Fixed { month: 12, day: 25, name: "Noël" },
];

const CALENDARS: &[(&str, &[Rule])] = &[
    ("US", US),
    ("GB", GB),
    ("ES", ES),
    ("MX", MX),
    ("CA", CA),
    ("DE", DE),
    ("FR", FR),
];

/// Rule-based national calendars for US, GB, ES, MX, CA, DE and FR.
///
/// Observed/substitute days (a holiday moved off a weekend) are not modelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinHolidays;

impl BuiltinHolidays {
    /// Country codes with a built-in calendar.
    pub fn regions() -> impl Iterator<Item = &'static str> {
        CALENDARS.iter().map(|(code, _)| *code)
    }

    fn rules(country: &str) -> Option<&'static [Rule]> {
        CALENDARS
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(country))
            .map(|(_, rules)| *rules)
    }
}

impl HolidayProvider for BuiltinHolidays {
    fn supports(&self, country: &str) -> bool {
        Self::rules(country).is_some()
    }

    fn holiday_name(&self, country: &str, date: NaiveDate) -> Option<String> {
        self.holidays_in_year(country, date.year())
            .into_iter()
            .find(|(day, _)| *day == date)
            .map(|(_, name)| name)
    }

    /// Holidays falling on the same day are joined with `"; "` in table order.
    fn holidays_in_year(&self, country: &str, year: i32) -> Vec<(NaiveDate, String)> {
        let Some(rules) = Self::rules(country) else {
            return Vec::new();
        };
        let mut by_date: BTreeMap<NaiveDate, Vec<&'static str>> = BTreeMap::new();
        for rule in rules {
            if let Some(date) = rule.date_in(year) {
                by_date.entry(date).or_default().push(rule.name());
            }
        }
        by_date
            .into_iter()
            .map(|(date, names)| (date, names.join("; ")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn easter_dates_match_known_years() {
        assert_eq!(easter_sunday(2024), Some(ymd(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(ymd(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(ymd(2026, 4, 5)));
    }

    #[test]
    fn us_floating_holidays() {
        let h = BuiltinHolidays;
        assert_eq!(h.holiday_name("US", ymd(2026, 11, 26)).as_deref(), Some("Thanksgiving"));
        assert_eq!(h.holiday_name("US", ymd(2026, 5, 25)).as_deref(), Some("Memorial Day"));
        assert_eq!(h.holiday_name("US", ymd(2026, 9, 7)).as_deref(), Some("Labor Day"));
        assert_eq!(h.holiday_name("US", ymd(2026, 9, 8)), None);
    }

    #[test]
    fn weekday_rules_across_years() {
        let h = BuiltinHolidays;
        // Third Monday of January.
        assert_eq!(h.holiday_name("US", ymd(2025, 1, 20)).as_deref(), Some("Martin Luther King Jr. Day"));
        assert_eq!(h.holiday_name("US", ymd(2027, 1, 18)).as_deref(), Some("Martin Luther King Jr. Day"));
        // Last Monday of August, in a month with five Mondays.
        assert_eq!(h.holiday_name("GB", ymd(2026, 8, 31)).as_deref(), Some("Late Summer Bank Holiday"));
        assert_eq!(h.holiday_name("GB", ymd(2026, 8, 24)), None);
    }

    #[test]
    fn victoria_day_is_monday_on_or_before_may_24() {
        let h = BuiltinHolidays;
        // 2026-05-24 is a Sunday.
        assert_eq!(h.holiday_name("CA", ymd(2026, 5, 18)).as_deref(), Some("Victoria Day"));
        // 2027-05-24 is itself a Monday.
        assert_eq!(h.holiday_name("CA", ymd(2027, 5, 24)).as_deref(), Some("Victoria Day"));
    }

    #[test]
    fn easter_relative_holidays() {
        let h = BuiltinHolidays;
        assert_eq!(h.holiday_name("ES", ymd(2026, 4, 3)).as_deref(), Some("Viernes Santo"));
        assert_eq!(h.holiday_name("DE", ymd(2026, 5, 25)).as_deref(), Some("Pfingstmontag"));
    }

    #[test]
    fn year_listing_is_ordered() {
        let days: Vec<NaiveDate> = BuiltinHolidays
            .holidays_in_year("US", 2026)
            .into_iter()
            .map(|(date, _)| date)
            .collect();
        assert_eq!(days.len(), 11);
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(days.first(), Some(&ymd(2026, 1, 1)));
        assert_eq!(days.last(), Some(&ymd(2026, 12, 25)));
    }

    #[test]
    fn country_codes_are_case_insensitive() {
        let h = BuiltinHolidays;
        assert!(h.supports("es"));
        assert_eq!(h.holiday_name("gb", ymd(2026, 12, 26)).as_deref(), Some("Boxing Day"));
    }

    #[test]
    fn unknown_region_falls_back() {
        assert_eq!(resolve_region(&BuiltinHolidays, "XX", DEFAULT_REGION), "US");
        assert_eq!(resolve_region(&BuiltinHolidays, " mx ", DEFAULT_REGION), "MX");
    }

    #[test]
    fn holiday_id_is_negated_yyyymmdd() {
        assert_eq!(holiday_id(ymd(2026, 12, 25)), Some(-20261225));
        assert_eq!(holiday_id(ymd(1000, 1, 1)), Some(-10000101));
        assert_eq!(holiday_id(ymd(9999, 12, 31)), Some(-99991231));
    }

    #[test]
    fn holiday_id_outside_four_digit_years_is_none() {
        assert_eq!(holiday_id(ymd(999, 1, 1)), None);
        assert_eq!(holiday_id(ymd(-1, 1, 1)), None);
        assert_eq!(holiday_id(ymd(10_000, 1, 1)), None);
    }

    #[test]
    fn range_lookup_is_inclusive() {
        let found: Vec<_> =
            holidays_in_range(&BuiltinHolidays, "US", ymd(2026, 12, 24), ymd(2026, 12, 25)).collect();
        assert_eq!(found, vec![(ymd(2026, 12, 25), "Christmas Day".to_string())]);
        assert_eq!(
            holidays_in_range(&BuiltinHolidays, "US", ymd(2026, 12, 26), ymd(2026, 12, 25)).count(),
            0
        );
    }

    #[test]
    fn range_lookup_skips_years_without_ids() {
        let found: Vec<_> =
            holidays_in_range(&BuiltinHolidays, "US", ymd(998, 12, 1), ymd(1000, 1, 1)).collect();
        assert_eq!(found, vec![(ymd(1000, 1, 1), "New Year's Day".to_string())]);
    }

    #[test]
    fn wide_range_yields_lazily() {
        let first = holidays_in_range(&BuiltinHolidays, "US", NaiveDate::MIN, NaiveDate::MAX).next();
        assert_eq!(first, Some((ymd(1000, 1, 1), "New Year's Day".to_string())));
    }
}
