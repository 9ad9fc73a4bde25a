//! Todo list (spec §3 `Todo item`): a forest of items with parent/child
//! links. Deleting a node deletes its descendants.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Flat storage for the todo forest; acyclic by construction since a
/// node's parent must already exist when the node is added.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Adds a todo. Returns `None` (and adds nothing) if `parent_id` is
    /// `Some` but does not reference an existing item.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        parent_id: Option<String>,
    ) -> Option<&TodoItem> {
        if let Some(parent) = &parent_id
            && self.get(parent).is_none()
        {
            return None;
        }
        let item = TodoItem {
            id: id.into(),
            text: text.into(),
            completed: false,
            created_at: Utc::now(),
            parent_id,
        };
        self.items.push(item);
        self.items.last()
    }

    pub fn set_completed(&mut self, id: &str, completed: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.completed = completed;
                true
            }
            None => false,
        }
    }

    /// Deletes `id` and every descendant, returning the deleted ids.
    pub fn delete(&mut self, id: &str) -> Vec<String> {
        let mut to_delete = vec![id.to_string()];
        let mut frontier = vec![id.to_string()];
        while let Some(current) = frontier.pop() {
            for child in self
                .items
                .iter()
                .filter(|i| i.parent_id.as_deref() == Some(current.as_str()))
                .map(|i| i.id.clone())
            {
                frontier.push(child.clone());
                to_delete.push(child);
            }
        }
        self.items.retain(|i| !to_delete.contains(&i.id));
        to_delete
    }

    pub fn children_of(&self, parent_id: &str) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|i| i.parent_id.as_deref() == Some(parent_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_missing_parent() {
        let mut list = TodoList::new();
        assert!(list.add("a", "text", Some("missing".to_string())).is_none());
        assert!(list.items().is_empty());
    }

    #[test]
    fn delete_cascades_to_descendants() {
        let mut list = TodoList::new();
        list.add("root", "root", None);
        list.add("child", "child", Some("root".to_string()));
        list.add("grandchild", "grandchild", Some("child".to_string()));
        list.add("sibling", "sibling", None);

        let deleted = list.delete("root");
        assert_eq!(deleted.len(), 3);
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].id, "sibling");
    }

    #[test]
    fn set_completed_toggles_flag() {
        let mut list = TodoList::new();
        list.add("a", "text", None);
        assert!(list.set_completed("a", true));
        assert!(list.get("a").expect("item").completed);
        assert!(!list.set_completed("missing", true));
    }
}
