//! Checklist entries and the list operations on them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEntry {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
        }
    }
}

/// Append an entry, returning its id.
pub fn add_entry(entries: &mut Vec<TodoEntry>, text: impl Into<String>) -> String {
    let entry = TodoEntry::new(text);
    let id = entry.id.clone();
    entries.push(entry);
    id
}

/// Flip completion of `id`. Returns false if absent.
pub fn toggle_entry(entries: &mut [TodoEntry], id: &str) -> bool {
    match entries.iter_mut().find(|e| e.id == id) {
        Some(entry) => {
            entry.completed = !entry.completed;
            true
        }
        None => false,
    }
}

/// Replace the text of `id`. Returns false if absent.
pub fn edit_entry(entries: &mut [TodoEntry], id: &str, text: &str) -> bool {
    match entries.iter_mut().find(|e| e.id == id) {
        Some(entry) => {
            entry.text = text.to_string();
            true
        }
        None => false,
    }
}

/// Remove `id`, returning the entry.
pub fn remove_entry(entries: &mut Vec<TodoEntry>, id: &str) -> Option<TodoEntry> {
    let index = entries.iter().position(|e| e.id == id)?;
    Some(entries.remove(index))
}

/// Insert `entry` before `before`, or at the end when `before` is `None` or
/// not in the list.
pub fn insert_before(entries: &mut Vec<TodoEntry>, entry: TodoEntry, before: Option<&str>) {
    match before.and_then(|b| entries.iter().position(|e| e.id == b)) {
        Some(index) => entries.insert(index, entry),
        None => entries.push(entry),
    }
}
