use super::TaskOrdering;
use chrono::NaiveDate;

/// Tri stable : à échéance égale, l'ordre de l'entrée est conservé.
pub(super) fn order_tasks<T, F>(mut items: Vec<T>, ordering: TaskOrdering, due_date: F) -> Vec<T>
where
    F: Fn(&T) -> Option<NaiveDate>,
{
    if ordering == TaskOrdering::DueDate {
        items.sort_by_key(|item| {
            let due = due_date(item);
            (due.is_none(), due)
        });
    }
    items
}
