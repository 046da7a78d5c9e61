//! Calendar-aware alignment of instants to period boundaries
//!
//! Aggregation buckets do not start at multiples of elapsed seconds: a week
//! starts on the user's first day of week, a day starts at the user's start
//! of day, and months, quarters and years follow the calendar in the user's
//! time zone. This module answers "when did the period containing this
//! instant begin?" for both exact durations and calendar periods.
//!
//! # Alignment rules
//!
//! | Amount                         | Aligned to                   |
//! |--------------------------------|------------------------------|
//! | duration <= 1 hour             | top of the hour              |
//! | duration <= 1 day              | start of day                 |
//! | any longer duration            | start of week                |
//! | period <= 1 day                | start of day                 |
//! | period <= 1 week               | start of week                |
//! | period <= 1 month              | first of month               |
//! | period <= 3 months             | first of quarter             |
//! | period <= 6 months             | first of half-year           |
//! | longer periods                 | first of year                |
//!
//! Amounts between two recognised units fall back to the coarser unit, so
//! `1 day + 1ns` aligns to the start of the week. Every boundary except the
//! hour is shifted by `start_time_of_day`; when the local clock has not yet
//! reached it, the previous local day is used.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use kuba_sampling::time::{AggregationPreferences, TemporalAmount, TimeHelper};
//!
//! let helper = TimeHelper::new(AggregationPreferences::default());
//! let instant = Utc.with_ymd_and_hms(2020, 7, 8, 15, 45, 32).unwrap();
//! let start = helper.find_beginning_of_period(&instant, &TemporalAmount::months(3));
//! assert_eq!(start, Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap());
//! ```

use chrono::{
    DateTime, Datelike, Days, FixedOffset, LocalResult, Months, NaiveDate, NaiveDateTime,
    NaiveTime, Offset, TimeDelta, TimeZone, Timelike, Weekday,
};
use std::fmt;

// ============================================================================
// Amounts
// ============================================================================

/// Calendar period made of independent year, month and day fields
///
/// Fields are never normalized: fourteen months stay fourteen months. This
/// mirrors how calendar arithmetic is applied (years and months first, then
/// days) and how periods are compared against the recognised units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Period {
    /// Whole years
    pub years: i32,
    /// Whole months
    pub months: i32,
    /// Whole days
    pub days: i32,
}

impl Period {
    /// Create a period from its fields
    pub const fn new(years: i32, months: i32, days: i32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Period of `days` days
    pub const fn of_days(days: i32) -> Self {
        Self::new(0, 0, days)
    }

    /// Period of `weeks` weeks, stored as days
    pub const fn of_weeks(weeks: i32) -> Self {
        Self::new(0, 0, weeks * 7)
    }

    /// Period of `months` months
    pub const fn of_months(months: i32) -> Self {
        Self::new(0, months, 0)
    }

    /// Period of `years` years
    pub const fn of_years(years: i32) -> Self {
        Self::new(years, 0, 0)
    }

    /// Same period with `days` more days
    pub const fn plus_days(self, days: i32) -> Self {
        Self::new(self.years, self.months, self.days + days)
    }

    /// Field-wise difference
    pub const fn minus(self, other: Period) -> Self {
        Self::new(
            self.years - other.years,
            self.months - other.months,
            self.days - other.days,
        )
    }

    /// Lexicographic sign over (years, months, days)
    pub const fn is_negative_or_zero(&self) -> bool {
        self.years < 0
            || (self.years == 0 && self.months < 0)
            || (self.years == 0 && self.months == 0 && self.days <= 0)
    }

    /// Years and months folded into months
    pub fn total_months(&self) -> i64 {
        i64::from(self.years) * 12 + i64::from(self.months)
    }

    fn at_most(&self, other: Period) -> bool {
        self.minus(other).is_negative_or_zero()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}Y{}M{}D", self.years, self.months, self.days)
    }
}

/// Either an exact duration or a calendar period
///
/// Alignment branches on this distinction: durations are compared against
/// the hour, day and week lengths, periods are matched against calendar
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalAmount {
    /// Exact elapsed time
    FixedDuration(TimeDelta),
    /// Calendar fields
    CalendarPeriod(Period),
}

impl TemporalAmount {
    /// Exact duration of `hours` hours
    pub fn hours(hours: i64) -> Self {
        Self::FixedDuration(TimeDelta::hours(hours))
    }

    /// Exact duration of `days` 24-hour days
    pub fn fixed_days(days: i64) -> Self {
        Self::FixedDuration(TimeDelta::days(days))
    }

    /// Calendar period of `days` days
    pub fn days(days: i32) -> Self {
        Self::CalendarPeriod(Period::of_days(days))
    }

    /// Calendar period of `weeks` weeks
    pub fn weeks(weeks: i32) -> Self {
        Self::CalendarPeriod(Period::of_weeks(weeks))
    }

    /// Calendar period of `months` months
    pub fn months(months: i32) -> Self {
        Self::CalendarPeriod(Period::of_months(months))
    }

    /// Calendar period of `years` years
    pub fn years(years: i32) -> Self {
        Self::CalendarPeriod(Period::of_years(years))
    }
}

impl From<TimeDelta> for TemporalAmount {
    fn from(duration: TimeDelta) -> Self {
        Self::FixedDuration(duration)
    }
}

impl From<Period> for TemporalAmount {
    fn from(period: Period) -> Self {
        Self::CalendarPeriod(period)
    }
}

impl fmt::Display for TemporalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedDuration(d) => write!(f, "{}", d),
            Self::CalendarPeriod(p) => write!(f, "{}", p),
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// User preferences that decide where days and weeks begin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationPreferences {
    /// Day a week starts on
    pub first_day_of_week: Weekday,

    /// Offset from local midnight at which a day starts
    pub start_time_of_day: TimeDelta,
}

impl AggregationPreferences {
    /// Create preferences
    pub fn new(first_day_of_week: Weekday, start_time_of_day: TimeDelta) -> Self {
        Self {
            first_day_of_week,
            start_time_of_day,
        }
    }
}

impl Default for AggregationPreferences {
    fn default() -> Self {
        Self {
            first_day_of_week: Weekday::Mon,
            start_time_of_day: TimeDelta::zero(),
        }
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Calendar unit an amount is aligned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlignmentUnit {
    Day,
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl AlignmentUnit {
    fn for_duration(duration: TimeDelta) -> Option<Self> {
        if duration <= TimeDelta::hours(1) {
            None
        } else if duration <= TimeDelta::days(1) {
            Some(Self::Day)
        } else {
            Some(Self::Week)
        }
    }

    fn for_period(period: &Period) -> Self {
        if period.at_most(Period::of_days(1)) {
            Self::Day
        } else if period.at_most(Period::of_weeks(1)) {
            Self::Week
        } else if period.at_most(Period::of_months(1)) {
            Self::Month
        } else if period.at_most(Period::of_months(3)) {
            Self::Quarter
        } else if period.at_most(Period::of_months(6)) {
            Self::HalfYear
        } else {
            Self::Year
        }
    }

    /// First local date of the unit containing `date`
    fn first_date(self, date: NaiveDate, first_day_of_week: Weekday) -> NaiveDate {
        let first = match self {
            Self::Day => Some(date),
            Self::Week => {
                let back = (7 + date.weekday().num_days_from_monday()
                    - first_day_of_week.num_days_from_monday())
                    % 7;
                date.checked_sub_days(Days::new(u64::from(back)))
            }
            Self::Month => date.with_day(1),
            Self::Quarter => NaiveDate::from_ymd_opt(date.year(), quarter_for_month(date.month()), 1),
            Self::HalfYear => {
                NaiveDate::from_ymd_opt(date.year(), half_year_for_month(date.month()), 1)
            }
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        first.unwrap_or(date)
    }
}

/// Month (1-12) starting the quarter that contains `month`
pub fn quarter_for_month(month: u32) -> u32 {
    3 * ((month.max(1) - 1) / 3) + 1
}

/// Month (1 or 7) starting the half-year that contains `month`
pub fn half_year_for_month(month: u32) -> u32 {
    if month < 7 {
        1
    } else {
        7
    }
}

/// Aligns instants to the start of their containing period
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeHelper {
    preferences: AggregationPreferences,
}

impl TimeHelper {
    /// Create a helper for the given preferences
    pub fn new(preferences: AggregationPreferences) -> Self {
        Self { preferences }
    }

    /// Preferences in use
    pub fn preferences(&self) -> &AggregationPreferences {
        &self.preferences
    }

    /// Start of the period of size `amount` that contains `instant`
    ///
    /// The result is expressed in the time zone of `instant`; convert first
    /// with [`DateTime::with_timezone`] to align in another zone.
    pub fn find_beginning_of_period<Tz: TimeZone>(
        &self,
        instant: &DateTime<Tz>,
        amount: &TemporalAmount,
    ) -> DateTime<Tz> {
        let unit = match amount {
            TemporalAmount::FixedDuration(duration) => {
                match AlignmentUnit::for_duration(*duration) {
                    Some(unit) => unit,
                    None => return top_of_hour(instant),
                }
            }
            TemporalAmount::CalendarPeriod(period) => AlignmentUnit::for_period(period),
        };
        self.align(instant, unit)
    }

    /// Last instant (inclusive, nanosecond precision) of the period containing `instant`
    ///
    /// Returns `None` only when the end falls outside the representable range.
    pub fn find_end_of_period<Tz: TimeZone>(
        &self,
        instant: &DateTime<Tz>,
        amount: &TemporalAmount,
    ) -> Option<DateTime<Tz>> {
        let start = self.find_beginning_of_period(instant, amount);
        add_amount(&start, amount)?.checked_sub_signed(TimeDelta::nanoseconds(1))
    }

    fn align<Tz: TimeZone>(&self, instant: &DateTime<Tz>, unit: AlignmentUnit) -> DateTime<Tz> {
        let mut date = instant.naive_local().date();
        loop {
            let start = self.start_of_unit(instant, unit, date);
            if start <= *instant {
                return start;
            }
            // local clock is before the start of day; on a short day the
            // previous unit can still start after the instant
            let first = unit.first_date(date, self.preferences.first_day_of_week);
            match first.pred_opt() {
                Some(previous) => date = previous,
                None => return start,
            }
        }
    }

    fn start_of_unit<Tz: TimeZone>(
        &self,
        instant: &DateTime<Tz>,
        unit: AlignmentUnit,
        date: NaiveDate,
    ) -> DateTime<Tz> {
        let first = unit.first_date(date, self.preferences.first_day_of_week);
        let midnight = resolve_local(&instant.timezone(), first.and_time(NaiveTime::MIN), None);
        midnight
            .clone()
            .checked_add_signed(self.preferences.start_time_of_day)
            .unwrap_or(midnight)
    }
}

// ============================================================================
// Calendar arithmetic
// ============================================================================

/// `instant` moved forward by `amount`
///
/// Durations are added as elapsed time. Periods are added to the local wall
/// clock (years and months first, then days) and resolved back to an instant,
/// so a one-week step across a daylight-saving change still lands on the
/// same local time.
pub fn add_amount<Tz: TimeZone>(
    instant: &DateTime<Tz>,
    amount: &TemporalAmount,
) -> Option<DateTime<Tz>> {
    match amount {
        TemporalAmount::FixedDuration(duration) => instant.clone().checked_add_signed(*duration),
        TemporalAmount::CalendarPeriod(period) => {
            let local = shift_months(instant.naive_local(), period.total_months())?;
            let local = shift_days(local, i64::from(period.days))?;
            Some(resolve_local(
                &instant.timezone(),
                local,
                Some(instant.offset().fix()),
            ))
        }
    }
}

/// `instant` moved back by `amount`
pub fn subtract_amount<Tz: TimeZone>(
    instant: &DateTime<Tz>,
    amount: &TemporalAmount,
) -> Option<DateTime<Tz>> {
    match amount {
        TemporalAmount::FixedDuration(duration) => instant.clone().checked_sub_signed(*duration),
        TemporalAmount::CalendarPeriod(period) => add_amount(
            instant,
            &TemporalAmount::CalendarPeriod(Period::new(
                -period.years,
                -period.months,
                -period.days,
            )),
        ),
    }
}

fn shift_months(local: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        local.checked_add_months(magnitude)
    } else {
        local.checked_sub_months(magnitude)
    }
}

fn shift_days(local: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        local.checked_add_days(magnitude)
    } else {
        local.checked_sub_days(magnitude)
    }
}

fn top_of_hour<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let local = instant.naive_local();
    let truncated = local
        .date()
        .and_hms_opt(local.hour(), 0, 0)
        .unwrap_or(local);
    resolve_local(&instant.timezone(), truncated, Some(instant.offset().fix()))
}

/// Interpret a wall-clock time in `zone`
///
/// Ambiguous times (autumn fold) keep `preferred` when it is one of the two
/// candidates and otherwise take the earlier instant. Times inside a
/// spring-forward gap are read with the offset in force before the gap,
/// which moves them forward by the gap length.
pub(crate) fn resolve_local<Tz: TimeZone>(
    zone: &Tz,
    local: NaiveDateTime,
    preferred: Option<FixedOffset>,
) -> DateTime<Tz> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, latest) => {
            if preferred == Some(latest.offset().fix()) {
                latest
            } else {
                earliest
            }
        }
        LocalResult::None => {
            let day_before = local - TimeDelta::days(1);
            let before = zone.offset_from_utc_datetime(&day_before).fix();
            let utc = local - TimeDelta::seconds(i64::from(before.local_minus_utc()));
            zone.from_utc_datetime(&utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Europe::London;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn sample_instant() -> DateTime<Utc> {
        utc(2020, 7, 8, 15, 45, 32) + TimeDelta::nanoseconds(432)
    }

    fn helper(first_day: Weekday, start_hours: i64) -> TimeHelper {
        TimeHelper::new(AggregationPreferences::new(
            first_day,
            TimeDelta::hours(start_hours),
        ))
    }

    fn basic() -> TimeHelper {
        TimeHelper::default()
    }

    #[test]
    fn test_daylight_savings_accounted_for() {
        let instant = utc(2021, 10, 31, 0, 30, 0).with_timezone(&London);
        let answer = basic().find_beginning_of_period(&instant, &TemporalAmount::hours(1));
        // 01:00 BST, the first of the two 01:00 local times that night
        assert_eq!(answer.with_timezone(&Utc), utc(2021, 10, 31, 0, 0, 0));
        assert_eq!(answer.naive_local().hour(), 1);
    }

    #[test]
    fn test_duration_hour_with_offset() {
        let instant = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 11, 29, 4, 45, 0)
            .unwrap()
            .with_timezone(&Utc);
        let answer = basic().find_beginning_of_period(&instant, &TemporalAmount::hours(1));
        assert_eq!(answer, utc(2021, 11, 29, 3, 0, 0));
    }

    #[test]
    fn test_period_week_with_offset() {
        let instant = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 10, 29, 0, 1, 0)
            .unwrap()
            .with_timezone(&Utc);
        let answer = basic().find_beginning_of_period(&instant, &TemporalAmount::weeks(1));
        assert_eq!(answer, utc(2021, 10, 25, 0, 0, 0));
    }

    #[test]
    fn test_start_time_of_day_after_instant() {
        let instant = utc(2021, 11, 29, 4, 45, 32);
        let answer = helper(Weekday::Mon, 5)
            .find_beginning_of_period(&instant, &TemporalAmount::fixed_days(1));
        assert_eq!(answer, utc(2021, 11, 28, 5, 0, 0));
    }

    #[test]
    fn test_start_time_of_day_before_instant() {
        let instant = utc(2021, 11, 29, 6, 45, 32);
        let answer = helper(Weekday::Mon, 5)
            .find_beginning_of_period(&instant, &TemporalAmount::fixed_days(1));
        assert_eq!(answer, utc(2021, 11, 29, 5, 0, 0));
    }

    #[test]
    fn test_start_day_of_week_after_instant() {
        let instant = utc(2021, 11, 30, 4, 45, 32);
        let answer =
            helper(Weekday::Wed, 4).find_beginning_of_period(&instant, &TemporalAmount::weeks(1));
        assert_eq!(answer, utc(2021, 11, 24, 4, 0, 0));
    }

    #[test]
    fn test_start_day_of_week_before_instant() {
        let instant = utc(2021, 12, 2, 6, 45, 32);
        let answer =
            helper(Weekday::Wed, 5).find_beginning_of_period(&instant, &TemporalAmount::weeks(1));
        assert_eq!(answer, utc(2021, 12, 1, 5, 0, 0));
    }

    #[test]
    fn test_monday_before_start_of_day_belongs_to_previous_week() {
        let instant = utc(2021, 11, 1, 3, 30, 0);
        let answer =
            helper(Weekday::Mon, 4).find_beginning_of_period(&instant, &TemporalAmount::weeks(1));
        assert_eq!(answer, utc(2021, 10, 25, 4, 0, 0));
    }

    #[test]
    fn test_month_before_start_of_day_uses_previous_month() {
        let instant = utc(2021, 7, 1, 2, 0, 0);
        let answer =
            helper(Weekday::Mon, 4).find_beginning_of_period(&instant, &TemporalAmount::months(1));
        assert_eq!(answer, utc(2021, 6, 1, 4, 0, 0));
    }

    #[test]
    fn test_fixed_duration_units() {
        let h = basic();
        let instant = utc(2020, 6, 8, 15, 45, 32) + TimeDelta::nanoseconds(432);
        let cases = [
            (TemporalAmount::hours(1), utc(2020, 6, 8, 15, 0, 0)),
            (
                TemporalAmount::FixedDuration(TimeDelta::minutes(15)),
                utc(2020, 6, 8, 15, 0, 0),
            ),
            (TemporalAmount::hours(2), utc(2020, 6, 8, 0, 0, 0)),
            (TemporalAmount::fixed_days(1), utc(2020, 6, 8, 0, 0, 0)),
        ];
        for (amount, expected) in cases {
            assert_eq!(h.find_beginning_of_period(&instant, &amount), expected, "{}", amount);
        }
    }

    #[test]
    fn test_fixed_duration_overshoot_falls_back_to_week() {
        let h = basic();
        let instant = sample_instant();
        let one_ns = TimeDelta::nanoseconds(1);
        let cases = [
            TemporalAmount::FixedDuration(TimeDelta::days(1) + one_ns),
            TemporalAmount::fixed_days(7),
            TemporalAmount::FixedDuration(TimeDelta::days(7) + one_ns),
        ];
        for amount in cases {
            assert_eq!(
                h.find_beginning_of_period(&instant, &amount),
                utc(2020, 7, 6, 0, 0, 0),
                "{}",
                amount
            );
        }
    }

    #[test]
    fn test_calendar_periods() {
        let h = basic();
        let july = sample_instant();
        let may = utc(2020, 5, 8, 15, 45, 32) + TimeDelta::nanoseconds(432);
        let cases = [
            (july, Period::of_weeks(1), utc(2020, 7, 6, 0, 0, 0)),
            (july, Period::of_weeks(1).plus_days(1), utc(2020, 7, 1, 0, 0, 0)),
            (july, Period::of_months(1), utc(2020, 7, 1, 0, 0, 0)),
            (july, Period::of_months(1).plus_days(1), utc(2020, 7, 1, 0, 0, 0)),
            (may, Period::of_months(3), utc(2020, 4, 1, 0, 0, 0)),
            (may, Period::of_months(3).plus_days(1), utc(2020, 1, 1, 0, 0, 0)),
            (may, Period::of_months(6), utc(2020, 1, 1, 0, 0, 0)),
            (july, Period::of_months(6).plus_days(1), utc(2020, 1, 1, 0, 0, 0)),
            (july, Period::of_years(1), utc(2020, 1, 1, 0, 0, 0)),
            (july, Period::of_years(4), utc(2020, 1, 1, 0, 0, 0)),
            (july, Period::of_days(1), utc(2020, 7, 8, 0, 0, 0)),
        ];
        for (instant, period, expected) in cases {
            assert_eq!(
                h.find_beginning_of_period(&instant, &TemporalAmount::CalendarPeriod(period)),
                expected,
                "{}",
                period
            );
        }
    }

    #[test]
    fn test_quarter_for_month() {
        let quarters: Vec<u32> = (1..=12).map(quarter_for_month).collect();
        assert_eq!(quarters, vec![1, 1, 1, 4, 4, 4, 7, 7, 7, 10, 10, 10]);
    }

    #[test]
    fn test_half_year_for_month() {
        let halves: Vec<u32> = (1..=12).map(half_year_for_month).collect();
        assert_eq!(halves, vec![1, 1, 1, 1, 1, 1, 7, 7, 7, 7, 7, 7]);
    }

    #[test]
    fn test_find_end_of_period() {
        let end = basic()
            .find_end_of_period(&sample_instant(), &TemporalAmount::days(1))
            .unwrap();
        assert_eq!(
            end,
            utc(2020, 7, 8, 23, 59, 59) + TimeDelta::nanoseconds(999_999_999)
        );
    }

    #[test]
    fn test_late_start_of_day_on_short_day() {
        use chrono_tz::America::New_York;
        let helper = TimeHelper::new(AggregationPreferences::new(
            Weekday::Mon,
            TimeDelta::minutes(23 * 60 + 30),
        ));
        // 2021-03-14 is 23 hours long in New York
        let instant = New_York.with_ymd_and_hms(2021, 3, 15, 0, 15, 0).unwrap();
        let start = helper.find_beginning_of_period(&instant, &TemporalAmount::days(1));
        assert!(start <= instant);
        assert_eq!(start.with_timezone(&Utc), utc(2021, 3, 14, 4, 30, 0));
    }

    #[test]
    fn test_add_week_across_dst_keeps_wall_clock() {
        let start = London.with_ymd_and_hms(2021, 10, 25, 0, 0, 0).unwrap();
        let next = add_amount(&start, &TemporalAmount::weeks(1)).unwrap();
        let midnight = NaiveDate::from_ymd_opt(2021, 11, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(next.naive_local(), midnight);
        assert_eq!(next - start, TimeDelta::hours(7 * 24 + 1));
    }

    #[test]
    fn test_add_fixed_week_across_dst_is_elapsed_time() {
        let start = London.with_ymd_and_hms(2021, 10, 25, 0, 0, 0).unwrap();
        let next = add_amount(&start, &TemporalAmount::fixed_days(7)).unwrap();
        assert_eq!(next.naive_local().hour(), 23);
    }

    #[test]
    fn test_subtract_month_clamps_day() {
        let start = utc(2021, 3, 31, 12, 0, 0);
        let back = subtract_amount(&start, &TemporalAmount::months(1)).unwrap();
        assert_eq!(back, utc(2021, 2, 28, 12, 0, 0));
    }

    #[test]
    fn test_resolve_local_gap_moves_forward() {
        // 01:30 does not exist in London on 2021-03-28
        let local = NaiveDate::from_ymd_opt(2021, 3, 28)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let resolved = resolve_local(&London, local, None);
        assert_eq!(resolved.with_timezone(&Utc), utc(2021, 3, 28, 1, 30, 0));
        assert_eq!(resolved.naive_local().hour(), 2);
    }

    #[test]
    fn test_period_ordering() {
        assert!(Period::of_weeks(1).at_most(Period::of_months(1)));
        assert!(!Period::of_months(1).plus_days(1).at_most(Period::of_months(1)));
        assert!(Period::of_months(14).at_most(Period::of_years(2)));
        assert_eq!(Period::new(1, 2, 3).total_months(), 14);
    }
}
