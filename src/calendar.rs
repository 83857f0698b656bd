// src/calendar.rs
//
// Date arithmetic for the dashboard calendar's toolbar: month and week views
// plus the custom year view, which spans the whole selected year and steps by
// one year at a time.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Month,
    Week,
    Year,
}

/// Toolbar navigation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    Back,
    Today,
    Next,
}

/// Inclusive date range a view displays around an anchor date.
pub fn view_range(view: CalendarView, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        CalendarView::Month => (first_of_month(date), last_of_month(date)),
        CalendarView::Week => {
            let week = date.week(Weekday::Sun);
            (week.first_day(), week.last_day())
        }
        CalendarView::Year => (
            NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
            NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
        ),
    }
}

/// New anchor date after a toolbar action. `today` is supplied by the caller
/// so the arithmetic stays deterministic.
pub fn navigate(
    view: CalendarView,
    date: NaiveDate,
    action: Navigate,
    today: NaiveDate,
) -> NaiveDate {
    match action {
        Navigate::Today => today,
        Navigate::Back => match view {
            CalendarView::Month => date.checked_sub_months(Months::new(1)).unwrap_or(date),
            CalendarView::Week => date - Duration::days(7),
            CalendarView::Year => {
                NaiveDate::from_ymd_opt(date.year() - 1, 1, 1).unwrap_or(date)
            }
        },
        Navigate::Next => match view {
            CalendarView::Month => date.checked_add_months(Months::new(1)).unwrap_or(date),
            CalendarView::Week => date + Duration::days(7),
            CalendarView::Year => {
                NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(date)
            }
        },
    }
}

/// Toolbar label for the current view and anchor date.
pub fn view_title(view: CalendarView, date: NaiveDate) -> String {
    match view {
        CalendarView::Month | CalendarView::Week => date.format("%B %Y").to_string(),
        CalendarView::Year => date.format("%Y").to_string(),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn year_view_spans_jan_first_to_dec_thirty_first() {
        let (start, end) = view_range(CalendarView::Year, d(2024, 6, 15));
        assert_eq!(start, d(2024, 1, 1));
        assert_eq!(end, d(2024, 12, 31));
    }

    #[test]
    fn year_view_steps_by_one_year() {
        let today = d(2024, 6, 15);
        assert_eq!(
            navigate(CalendarView::Year, d(2024, 6, 15), Navigate::Next, today),
            d(2025, 1, 1)
        );
        assert_eq!(
            navigate(CalendarView::Year, d(2024, 6, 15), Navigate::Back, today),
            d(2023, 1, 1)
        );
    }

    #[test]
    fn month_range_handles_leap_february() {
        let (start, end) = view_range(CalendarView::Month, d(2024, 2, 10));
        assert_eq!(start, d(2024, 2, 1));
        assert_eq!(end, d(2024, 2, 29));
    }

    #[test]
    fn month_navigation_clamps_short_months() {
        let today = d(2024, 6, 15);
        assert_eq!(
            navigate(CalendarView::Month, d(2024, 1, 31), Navigate::Next, today),
            d(2024, 2, 29)
        );
    }

    #[test]
    fn week_range_starts_on_sunday() {
        // 2024-06-12 is a Wednesday.
        let (start, end) = view_range(CalendarView::Week, d(2024, 6, 12));
        assert_eq!(start, d(2024, 6, 9));
        assert_eq!(end, d(2024, 6, 15));
    }

    #[test]
    fn today_resets_any_view() {
        let today = d(2024, 6, 15);
        for view in [CalendarView::Month, CalendarView::Week, CalendarView::Year] {
            assert_eq!(navigate(view, d(2020, 1, 1), Navigate::Today, today), today);
        }
    }

    #[test]
    fn titles_match_the_toolbar() {
        assert_eq!(view_title(CalendarView::Month, d(2024, 6, 15)), "June 2024");
        assert_eq!(view_title(CalendarView::Year, d(2024, 6, 15)), "2024");
    }
}
