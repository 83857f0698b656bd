// src/aggregate.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Employee, Tasking};

/// An employee joined with their currently-outstanding taskings. Derived on
/// every fetch, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithTasks {
    #[serde(flatten)]
    pub employee: Employee,
    pub tasks: Vec<Tasking>,
    pub total_task_hours: i64,
}

/// Join a fetched employee snapshot with a fetched tasking snapshot.
///
/// Completed taskings are dropped; the rest are grouped by `employee_id` in a
/// single pass, so the join is linear in the two collection sizes. Taskings
/// whose employee is unknown are skipped here (the calendar projection labels
/// them separately), and an employee with nothing outstanding gets an empty
/// list and a zero total.
pub fn join_employees_with_tasks(
    employees: &[Employee],
    taskings: &[Tasking],
) -> Vec<EmployeeWithTasks> {
    let mut by_employee: HashMap<&str, Vec<&Tasking>> = HashMap::new();
    for tasking in taskings.iter().filter(|t| !t.is_completed()) {
        by_employee
            .entry(tasking.employee_id.as_str())
            .or_default()
            .push(tasking);
    }

    employees
        .iter()
        .map(|employee| {
            let tasks: Vec<Tasking> = by_employee
                .remove(employee.id.as_str())
                .unwrap_or_default()
                .into_iter()
                .cloned()
                .collect();
            let total_task_hours = tasks.iter().map(|t| t.task_hours).sum();
            EmployeeWithTasks {
                employee: employee.clone(),
                tasks,
                total_task_hours,
            }
        })
        .collect()
}

/// Map of employee id to display name, for resolving tasking owners.
pub fn employee_names(employees: &[Employee]) -> HashMap<String, String> {
    employees
        .iter()
        .map(|e| (e.id.clone(), e.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PROGRESS_ASSIGNED, PROGRESS_COMPLETED};
    use chrono::{TimeZone, Utc};

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: name.to_string(),
            skills: "welding".to_string(),
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
    fn sums_outstanding_hours_and_skips_completed() {
        let employees = vec![employee("e1", "Ann")];
        let taskings = vec![
            tasking("t1", "e1", 8, PROGRESS_ASSIGNED),
            tasking("t2", "e1", 4, PROGRESS_COMPLETED),
        ];

        let joined = join_employees_with_tasks(&employees, &taskings);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].total_task_hours, 8);
        assert_eq!(joined[0].tasks.len(), 1);
        assert_eq!(joined[0].tasks[0].id, "t1");
    }

    #[test]
    fn employee_without_taskings_totals_zero() {
        let employees = vec![employee("e1", "Ann"), employee("e2", "Bob")];
        let taskings = vec![tasking("t1", "e1", 16, PROGRESS_ASSIGNED)];

        let joined = join_employees_with_tasks(&employees, &taskings);
        let bob = joined.iter().find(|v| v.employee.id == "e2").unwrap();
        assert_eq!(bob.total_task_hours, 0);
        assert!(bob.tasks.is_empty());
    }

    #[test]
    fn missing_due_date_still_counts_toward_totals() {
        let employees = vec![employee("e1", "Ann")];
        let mut dateless = tasking("t1", "e1", 24, PROGRESS_ASSIGNED);
        dateless.date_due = None;

        let joined = join_employees_with_tasks(&employees, &[dateless]);
        assert_eq!(joined[0].total_task_hours, 24);
        assert_eq!(joined[0].tasks.len(), 1);
    }

    #[test]
    fn orphan_tasking_is_skipped_without_panicking() {
        let employees = vec![employee("e1", "Ann")];
        let taskings = vec![
            tasking("t1", "e1", 8, PROGRESS_ASSIGNED),
            tasking("t2", "ghost", 96, PROGRESS_ASSIGNED),
        ];

        let joined = join_employees_with_tasks(&employees, &taskings);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].total_task_hours, 8);
        assert!(joined[0].tasks.iter().all(|t| t.employee_id == "e1"));
    }

    #[test]
    fn totals_are_order_independent() {
        let employees = vec![employee("e1", "Ann")];
        let mut taskings = vec![
            tasking("t1", "e1", 1, PROGRESS_ASSIGNED),
            tasking("t2", "e1", 2, PROGRESS_ASSIGNED),
            tasking("t3", "e1", 48, PROGRESS_ASSIGNED),
        ];

        let forward = join_employees_with_tasks(&employees, &taskings);
        taskings.reverse();
        let backward = join_employees_with_tasks(&employees, &taskings);

        assert_eq!(forward[0].total_task_hours, 51);
        assert_eq!(forward[0].total_task_hours, backward[0].total_task_hours);

        let mut forward_ids: Vec<&str> = forward[0].tasks.iter().map(|t| t.id.as_str()).collect();
        let mut backward_ids: Vec<&str> = backward[0].tasks.iter().map(|t| t.id.as_str()).collect();
        forward_ids.sort_unstable();
        backward_ids.sort_unstable();
        assert_eq!(forward_ids, backward_ids);
    }

    #[test]
    fn rejoining_an_unchanged_snapshot_is_idempotent() {
        let employees = vec![employee("e1", "Ann"), employee("e2", "Bob")];
        let taskings = vec![
            tasking("t1", "e1", 8, PROGRESS_ASSIGNED),
            tasking("t2", "e2", 16, PROGRESS_ASSIGNED),
            tasking("t3", "e2", 4, PROGRESS_COMPLETED),
        ];

        let first = join_employees_with_tasks(&employees, &taskings);
        let second = join_employees_with_tasks(&employees, &taskings);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.employee.id, b.employee.id);
            assert_eq!(a.total_task_hours, b.total_task_hours);
            assert_eq!(
                a.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
                b.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn name_map_covers_every_employee() {
        let employees = vec![employee("e1", "Ann"), employee("e2", "Bob")];
        let names = employee_names(&employees);
        assert_eq!(names.get("e1").map(String::as_str), Some("Ann"));
        assert_eq!(names.get("e2").map(String::as_str), Some("Bob"));
        assert!(names.get("ghost").is_none());
    }
}
