use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::fields::sanitize_label;
use crate::model::{List, Task};

/// Sorts newest-completed first, then by list, due date, priority and name, all
/// descending as one key. Absent fields sort as 0 / "" / "4" / "". Stable.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_cached_key(|t| {
        Reverse((
            t.date_completed.unwrap_or(0),
            t.list_id.clone().unwrap_or_default(),
            t.date_due.unwrap_or(0),
            t.priority.clone().unwrap_or_else(|| "4".to_string()),
            t.name.clone().unwrap_or_default(),
        ))
    });
}

/// Keeps only the first pending instance of each recurring series. Completed
/// instances and tasks outside a series are all kept; unnamed tasks are dropped.
pub fn deduplicate(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen: HashSet<String> = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| {
            if task.name.is_none() {
                return false;
            }
            match task.series_id.as_deref() {
                Some(series) if !task.is_completed() => seen.insert(series.to_string()),
                _ => true,
            }
        })
        .collect()
}

/// Gives every repeat of a task name within a series indent 2, so the target
/// nests later occurrences under the first.
pub fn indent_repeats(tasks: &mut [Task]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for task in tasks.iter_mut() {
        let (Some(name), Some(_)) = (task.name.as_deref(), task.series_id.as_deref()) else {
            continue;
        };
        let seen = counts.entry(name.to_string()).or_default();
        if *seen > 0 {
            task.indent = Some(2);
        }
        *seen += 1;
    }
}

/// `(active, completed)`, each in input order.
pub fn split_by_status(tasks: Vec<Task>) -> (Vec<Task>, Vec<Task>) {
    tasks.into_iter().partition(|t| !t.is_completed())
}

/// Active tasks belonging to one list.
#[derive(Debug)]
pub struct ListGroup<'a> {
    pub list: &'a List,
    pub label: String,
    pub tasks: Vec<&'a Task>,
}

/// Groups in list-collection order; lists with no tasks are left out. Also returns
/// the tasks that belong to no known list.
pub fn group_by_list<'a>(
    tasks: &'a [Task],
    lists: &'a [List],
) -> (Vec<ListGroup<'a>>, Vec<&'a Task>) {
    let groups = lists
        .iter()
        .filter_map(|list| {
            let members: Vec<&Task> = tasks
                .iter()
                .filter(|t| list.id.is_some() && t.list_id == list.id)
                .collect();
            (!members.is_empty()).then(|| ListGroup {
                list,
                label: sanitize_label(list.name.as_deref().unwrap_or_default()),
                tasks: members,
            })
        })
        .collect();

    let known: HashSet<&str> = lists.iter().filter_map(|l| l.id.as_deref()).collect();
    let orphans = tasks
        .iter()
        .filter(|t| !t.list_id.as_deref().is_some_and(|id| known.contains(id)))
        .collect();

    (groups, orphans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Task {
        Task {
            name: Some(name.into()),
            ..Task::default()
        }
    }

    fn names(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.display_name()).collect()
    }

    #[test]
    fn sort_puts_completed_first_then_latest_due() {
        let mut tasks = vec![
            Task {
                date_due: Some(100),
                ..task("early")
            },
            Task {
                date_completed: Some(5),
                ..task("done")
            },
            Task {
                date_due: Some(200),
                ..task("late")
            },
            task("undated"),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(names(&tasks), vec!["done", "late", "early", "undated"]);
    }

    #[test]
    fn sort_orders_priority_codes_descending() {
        let mut tasks = vec![
            Task {
                priority: Some("P1".into()),
                ..task("p1")
            },
            task("none"),
            Task {
                priority: Some("PN".into()),
                ..task("pn")
            },
            Task {
                priority: Some("P3".into()),
                ..task("p3")
            },
        ];
        sort_tasks(&mut tasks);
        assert_eq!(names(&tasks), vec!["pn", "p3", "p1", "none"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut tasks = vec![
            Task {
                series_id: Some("a".into()),
                ..task("same")
            },
            Task {
                series_id: Some("b".into()),
                ..task("same")
            },
        ];
        sort_tasks(&mut tasks);
        assert_eq!(tasks[0].series_id.as_deref(), Some("a"));
    }

    #[test]
    fn sort_groups_by_list_id_before_due_date() {
        let mut tasks = vec![
            Task {
                list_id: Some("1".into()),
                date_due: Some(500),
                ..task("a")
            },
            Task {
                list_id: Some("2".into()),
                ..task("b")
            },
            Task {
                date_due: Some(900),
                ..task("c")
            },
        ];
        sort_tasks(&mut tasks);
        assert_eq!(names(&tasks), vec!["b", "a", "c"]);
    }

    #[test]
    fn sort_breaks_remaining_ties_by_name_descending() {
        let mut tasks = vec![task("apples"), task("pears"), task("figs")];
        sort_tasks(&mut tasks);
        assert_eq!(names(&tasks), vec!["pears", "figs", "apples"]);
    }

    #[test]
    fn dedup_keeps_first_pending_instance_of_series() {
        let tasks = vec![
            Task {
                series_id: Some("s".into()),
                date_due: Some(2),
                ..task("water plants")
            },
            Task {
                series_id: Some("s".into()),
                date_due: Some(1),
                ..task("water plants")
            },
        ];
        let kept = deduplicate(tasks);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date_due, Some(2));
    }

    #[test]
    fn dedup_keeps_completed_and_unseriesed_tasks() {
        let tasks = vec![
            Task {
                series_id: Some("s".into()),
                date_completed: Some(9),
                ..task("done once")
            },
            Task {
                series_id: Some("s".into()),
                date_completed: Some(8),
                ..task("done twice")
            },
            Task {
                series_id: Some("s".into()),
                ..task("pending")
            },
            task("loose"),
            task("loose"),
            Task::default(),
        ];
        let kept = deduplicate(tasks);
        assert_eq!(
            names(&kept),
            vec!["done once", "done twice", "pending", "loose", "loose"]
        );
    }

    #[test]
    fn indent_repeats_nests_later_instances() {
        let mut tasks = vec![
            Task {
                series_id: Some("s".into()),
                ..task("standup")
            },
            Task {
                series_id: Some("s".into()),
                date_completed: Some(1),
                ..task("standup")
            },
            task("standup"),
        ];
        indent_repeats(&mut tasks);
        assert_eq!(
            tasks.iter().map(Task::indent).collect::<Vec<_>>(),
            vec![1, 2, 1]
        );
    }

    #[test]
    fn split_separates_completed() {
        let tasks = vec![
            task("a"),
            Task {
                date_completed: Some(1),
                ..task("b")
            },
            Task {
                date_completed: Some(0),
                ..task("c")
            },
        ];
        let (active, completed) = split_by_status(tasks);
        assert_eq!(names(&active), vec!["a", "c"]);
        assert_eq!(names(&completed), vec!["b"]);
    }

    #[test]
    fn groups_follow_list_order_and_skip_empty_lists() {
        let lists = vec![
            List {
                id: Some("1".into()),
                name: Some("Empty".into()),
            },
            List {
                id: Some("2".into()),
                name: Some("Home & Garden".into()),
            },
        ];
        let tasks = vec![
            Task {
                list_id: Some("2".into()),
                ..task("mow")
            },
            Task {
                list_id: Some("404".into()),
                ..task("lost")
            },
            task("listless"),
        ];
        let (groups, orphans) = group_by_list(&tasks, &lists);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Home_Garden");
        assert_eq!(groups[0].tasks.len(), 1);
        assert_eq!(orphans.len(), 2);
    }
}
