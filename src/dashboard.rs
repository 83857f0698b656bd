// src/dashboard.rs
//
// Read-only projections for the dashboard view: a per-employee bar chart of
// outstanding hours, the due-date calendar events, and the manpower table.
// Everything is recomputed from a fresh snapshot on each request.

use std::collections::HashMap;

use actix_web::{error::ErrorInternalServerError, web, Error, HttpRequest, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{employee_names, join_employees_with_tasks, EmployeeWithTasks};
use crate::app_state::AppState;
use crate::auth;
use crate::calendar::{navigate, view_range, view_title, CalendarView, Navigate};
use crate::models::{Employee, Tasking};
use crate::store;

pub const UNKNOWN_EMPLOYEE: &str = "Unknown Employee";

/// Bar chart series: one label, one value and one color per employee, in the
/// same order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
    pub background_color: Vec<String>,
}

/// A single all-day calendar entry on a tasking's due date.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub employee_id: String,
    /// Absent for orphan taskings, which have no color assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One row of the manpower table: an active tasking under its owner's name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManpowerRow {
    pub employee_id: String,
    pub name: String,
    pub task_id: String,
    pub task_description: String,
    pub task_progress: String,
    /// `null` renders as "N/A" in the table.
    pub date_due: Option<DateTime<Utc>>,
    pub task_hours: i64,
}

/// Toolbar state for the calendar: the anchor date after navigation, the
/// inclusive range the view spans, and its label.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWindow {
    pub view: String,
    pub date: NaiveDate,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub chart: ChartSeries,
    pub events: Vec<CalendarEvent>,
    pub manpower: Vec<ManpowerRow>,
    pub calendar: CalendarWindow,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// "month" (default), "week" or "year".
    pub view: Option<String>,
    pub date: Option<NaiveDate>,
    /// "prev", "next" or "today", applied to `date` before the range is built.
    pub action: Option<String>,
}

fn parse_view(view: Option<&str>) -> CalendarView {
    match view {
        Some("week") => CalendarView::Week,
        Some("year") => CalendarView::Year,
        _ => CalendarView::Month,
    }
}

fn parse_action(action: Option<&str>) -> Option<Navigate> {
    match action {
        Some("prev") => Some(Navigate::Back),
        Some("next") => Some(Navigate::Next),
        Some("today") => Some(Navigate::Today),
        _ => None,
    }
}

fn view_name(view: CalendarView) -> &'static str {
    match view {
        CalendarView::Month => "month",
        CalendarView::Week => "week",
        CalendarView::Year => "year",
    }
}

/// Resolve the toolbar query into the window the calendar should show.
pub fn build_calendar_window(query: &DashboardQuery, today: NaiveDate) -> CalendarWindow {
    let view = parse_view(query.view.as_deref());
    let mut date = query.date.unwrap_or(today);
    if let Some(action) = parse_action(query.action.as_deref()) {
        date = navigate(view, date, action, today);
    }
    let (range_start, range_end) = view_range(view, date);
    CalendarWindow {
        view: view_name(view).to_string(),
        date,
        range_start,
        range_end,
        title: view_title(view, date),
    }
}

/// A display color, new on every call. Colors are per-request: reloading the
/// dashboard reshuffles them.
fn random_color() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    format!("#{:02X}{:02X}{:02X}", bytes[0], bytes[1], bytes[2])
}

/// One color per employee, stable for the lifetime of a single response.
pub fn assign_employee_colors(employees: &[Employee]) -> HashMap<String, String> {
    employees
        .iter()
        .map(|e| (e.id.clone(), random_color()))
        .collect()
}

pub fn build_chart(
    views: &[EmployeeWithTasks],
    colors: &HashMap<String, String>,
) -> ChartSeries {
    ChartSeries {
        labels: views.iter().map(|v| v.employee.name.clone()).collect(),
        data: views.iter().map(|v| v.total_task_hours).collect(),
        background_color: views
            .iter()
            .map(|v| {
                colors
                    .get(&v.employee.id)
                    .cloned()
                    .unwrap_or_else(random_color)
            })
            .collect(),
    }
}

/// Calendar events for every non-completed tasking with a due date. Orphans
/// keep their event under the "Unknown Employee" label.
pub fn build_calendar_events(
    taskings: &[Tasking],
    names: &HashMap<String, String>,
    colors: &HashMap<String, String>,
) -> Vec<CalendarEvent> {
    taskings
        .iter()
        .filter(|t| !t.is_completed())
        .filter_map(|t| {
            let date_due = t.date_due?;
            Some(CalendarEvent {
                title: names
                    .get(&t.employee_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string()),
                start: date_due,
                end: date_due,
                all_day: true,
                employee_id: t.employee_id.clone(),
                color: colors.get(&t.employee_id).cloned(),
            })
        })
        .collect()
}

pub fn build_manpower_rows(views: &[EmployeeWithTasks]) -> Vec<ManpowerRow> {
    views
        .iter()
        .flat_map(|view| {
            view.tasks.iter().map(|task| ManpowerRow {
                employee_id: view.employee.id.clone(),
                name: view.employee.name.clone(),
                task_id: task.id.clone(),
                task_description: task.task_description.clone(),
                task_progress: task.task_progress.clone(),
                date_due: task.date_due,
                task_hours: task.task_hours,
            })
        })
        .collect()
}

/// GET /dashboard
///
/// Fetches both collections, joins them and returns all three projections in
/// one payload. A failed fetch fails the whole request; a half-fetched join is
/// never served.
pub async fn get_dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, Error> {
    if auth::current_user(&req).is_none() {
        return Ok(HttpResponse::Unauthorized().body("Unauthorized"));
    }

    let employees: Vec<Employee> = state
        .mongodb
        .list(store::EMPLOYEES)
        .await
        .map_err(ErrorInternalServerError)?;
    let taskings: Vec<Tasking> = state
        .mongodb
        .list(store::TASKINGS)
        .await
        .map_err(ErrorInternalServerError)?;

    let colors = assign_employee_colors(&employees);
    let names = employee_names(&employees);
    let views = join_employees_with_tasks(&employees, &taskings);

    let payload = DashboardData {
        chart: build_chart(&views, &colors),
        events: build_calendar_events(&taskings, &names, &colors),
        manpower: build_manpower_rows(&views),
        calendar: build_calendar_window(&query, Utc::now().date_naive()),
    };
    Ok(HttpResponse::Ok().json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PROGRESS_ASSIGNED, PROGRESS_COMPLETED};
    use chrono::TimeZone;

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: name.to_string(),
            skills: "rigging".to_string(),
            image_url: None,
            date_joined: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn tasking(id: &str, employee_id: &str, hours: i64, progress: &str) -> Tasking {
        Tasking {
            id: id.to_string(),
            employee_id: employee_id.to_string(),
            task_description: "Audit".to_string(),
            task_hours: hours,
            date_tasked: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            date_due: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            task_progress: progress.to_string(),
        }
    }

    #[test]
    fn chart_series_stay_aligned_per_employee() {
        let employees = vec![employee("e1", "Ann"), employee("e2", "Bob")];
        let taskings = vec![
            tasking("t1", "e1", 8, PROGRESS_ASSIGNED),
            tasking("t2", "e2", 16, PROGRESS_ASSIGNED),
        ];
        let colors = assign_employee_colors(&employees);
        let views = join_employees_with_tasks(&employees, &taskings);

        let chart = build_chart(&views, &colors);
        assert_eq!(chart.labels, vec!["Ann", "Bob"]);
        assert_eq!(chart.data, vec![8, 16]);
        assert_eq!(chart.background_color.len(), 2);
        assert_eq!(chart.background_color[0], colors["e1"]);
        assert_eq!(chart.background_color[1], colors["e2"]);
    }

    #[test]
    fn colors_are_hex_rgb() {
        let employees = vec![employee("e1", "Ann")];
        let colors = assign_employee_colors(&employees);
        let color = &colors["e1"];
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn completed_taskings_produce_no_events() {
        let employees = vec![employee("e1", "Ann")];
        let taskings = vec![
            tasking("t1", "e1", 8, PROGRESS_ASSIGNED),
            tasking("t2", "e1", 4, PROGRESS_COMPLETED),
        ];
        let colors = assign_employee_colors(&employees);
        let names = employee_names(&employees);

        let events = build_calendar_events(&taskings, &names, &colors);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Ann");
        assert!(events[0].all_day);
    }

    #[test]
    fn taskings_without_due_dates_stay_off_the_calendar() {
        let employees = vec![employee("e1", "Ann")];
        let mut dateless = tasking("t1", "e1", 8, PROGRESS_ASSIGNED);
        dateless.date_due = None;
        let colors = assign_employee_colors(&employees);
        let names = employee_names(&employees);

        let events = build_calendar_events(&[dateless], &names, &colors);
        assert!(events.is_empty());
    }

    #[test]
    fn orphan_taskings_are_labeled_unknown() {
        let employees = vec![employee("e1", "Ann")];
        let taskings = vec![tasking("t1", "ghost", 8, PROGRESS_ASSIGNED)];
        let colors = assign_employee_colors(&employees);
        let names = employee_names(&employees);

        let events = build_calendar_events(&taskings, &names, &colors);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, UNKNOWN_EMPLOYEE);
        assert!(events[0].color.is_none());
    }

    #[test]
    fn calendar_window_defaults_to_the_month_around_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let query = DashboardQuery {
            view: None,
            date: None,
            action: None,
        };

        let window = build_calendar_window(&query, today);
        assert_eq!(window.view, "month");
        assert_eq!(window.range_start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(window.range_end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(window.title, "June 2024");
    }

    #[test]
    fn year_view_navigation_steps_whole_years() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let query = DashboardQuery {
            view: Some("year".to_string()),
            date: Some(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()),
            action: Some("next".to_string()),
        };

        let window = build_calendar_window(&query, today);
        assert_eq!(window.view, "year");
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(window.range_start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(window.range_end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(window.title, "2025");
    }

    #[test]
    fn manpower_rows_cover_each_active_tasking() {
        let employees = vec![employee("e1", "Ann")];
        let mut dateless = tasking("t2", "e1", 2, PROGRESS_ASSIGNED);
        dateless.date_due = None;
        let taskings = vec![tasking("t1", "e1", 8, PROGRESS_ASSIGNED), dateless];
        let views = join_employees_with_tasks(&employees, &taskings);

        let rows = build_manpower_rows(&views);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.name == "Ann"));
        assert!(rows.iter().any(|r| r.date_due.is_none()));
    }
}
