//! Domain values for the todo service.
//!
//! # Design
//! These are detached copies of persisted rows. The store builds them from
//! query results and hands ownership to the caller; mutating a returned value
//! never touches the database. The same types double as the JSON wire shape,
//! so field names follow the HTTP contract (`listID`, `todoItems`).

use serde::{Deserialize, Deserializer, Serialize};

/// A single todo item.
///
/// `id` is assigned by the store on insert and ignored on input. `list_id` is
/// `None` for items created outside any list. Missing or `null` fields decode
/// to their zero value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "listID", default)]
    pub list_id: Option<i64>,
}

impl TodoItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// A todo list and the items attached to it.
///
/// Items are filled in by a query against the item table, never stored
/// inline. The "all items" view returned by `TodoStore::get_all` reuses this
/// type with `id == 0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "todoItems", default, deserialize_with = "null_as_default")]
    pub todo_items: Vec<TodoItem>,
}

/// Accept an explicit `null` wherever a missing key is accepted.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
