use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Status every item is given on creation, whatever the caller sent.
pub const INITIAL_STATUS: &str = "todo";

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct TodoItemId(pub i64);

impl fmt::Display for TodoItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Zero until the store assigns one.
    #[serde(rename = "todoItemId", alias = "id", default)]
    pub id: TodoItemId,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_due_date")]
    pub due_date: NaiveDateTime,
    pub status: String,
}

/// Accepts `2023-02-06`, `2023-02-06T10:30:00` and RFC 3339 values such as
/// `2023-02-06T10:30:00Z`. An offset is dropped, keeping the local wall time.
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    raw.parse::<NaiveDate>().ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn deserialize_due_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_due_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid due date `{raw}`")))
}

/// Conjunction of optional filters. An empty or absent filter imposes no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoItemFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub status: Option<String>,
}

impl TodoItemFilter {
    /// Lowercased name needle, if it constrains anything.
    pub fn name_needle(&self) -> Option<String> {
        needle(&self.name)
    }

    pub fn description_needle(&self) -> Option<String> {
        needle(&self.description)
    }

    pub fn status_needle(&self) -> Option<String> {
        needle(&self.status)
    }

    /// Only the day of month takes part in due date matching; month and year
    /// are ignored.
    pub fn due_day(&self) -> Option<u32> {
        self.due_date.map(|d| d.day())
    }

    pub fn matches(&self, item: &TodoItem) -> bool {
        contains_folded(&item.name, self.name_needle())
            && contains_folded(&item.description, self.description_needle())
            && self.due_day().is_none_or(|day| item.due_date.day() == day)
            && contains_folded(&item.status, self.status_needle())
    }
}

fn needle(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_folded(haystack: &str, needle: Option<String>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
    Description,
    Status,
}

impl SortKey {
    /// Recognises `name`, `description` and `status` in any case. Anything
    /// else, the empty string included, is not a sort key.
    pub fn from_sort_by(sort_by: &str) -> Option<Self> {
        match sort_by.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Status => "status",
        }
    }
}

/// Whether a recognised `sortBy` field actually drives the returned order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortPolicy {
    /// Results come back ordered by id only, whatever `sortBy` says.
    #[default]
    IdOnly,
    /// Results are ordered by the requested field, then by id.
    FieldThenId,
}

impl std::str::FromStr for SortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(Self::IdOnly),
            "field" => Ok(Self::FieldThenId),
            other => Err(format!("unknown sort policy `{other}` (expected `id` or `field`)")),
        }
    }
}

/// The single ordering a listing is enumerated with. `id` always closes the
/// ordering, in the same direction as the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub key: SortKey,
    pub descending: bool,
}

impl OrderBy {
    pub fn resolve(sort_by: Option<&str>, descending: bool, policy: SortPolicy) -> Self {
        let requested = sort_by.and_then(SortKey::from_sort_by);
        let key = match (policy, requested) {
            (SortPolicy::FieldThenId, Some(key)) => key,
            _ => SortKey::Id,
        };
        Self { key, descending }
    }

    pub fn compare(&self, a: &TodoItem, b: &TodoItem) -> Ordering {
        let by_key = match self.key {
            SortKey::Id => Ordering::Equal,
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Description => a.description.cmp(&b.description),
            SortKey::Status => a.status.cmp(&b.status),
        };
        let ordering = by_key.then(a.id.cmp(&b.id));
        if self.descending { ordering.reverse() } else { ordering }
    }
}

/// Parameters of a listing, as the caller supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: TodoItemFilter,
    pub sort_by: Option<String>,
    pub is_descending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, due: &str) -> TodoItem {
        TodoItem {
            id: TodoItemId(id),
            name: name.into(),
            description: format!("Description{id}"),
            due_date: parse_due_date(due).unwrap(),
            status: "TestStatus".into(),
        }
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let filter = TodoItemFilter { name: Some("TEST".into()), ..Default::default() };
        assert!(filter.matches(&item(1, "TestName1", "2023-02-06")));
        assert!(!filter.matches(&item(2, "Other", "2023-02-06")));
    }

    #[test]
    fn empty_filters_match_everything() {
        let filter = TodoItemFilter {
            name: Some(String::new()),
            description: Some(String::new()),
            due_date: None,
            status: Some(String::new()),
        };
        assert!(filter.matches(&item(1, "", "2023-02-06")));
    }

    #[test]
    fn due_date_compares_day_of_month_only() {
        let filter =
            TodoItemFilter { due_date: parse_due_date("2099-11-06"), ..Default::default() };
        assert!(filter.matches(&item(1, "a", "2023-02-06T13:45:00")));
        assert!(!filter.matches(&item(2, "a", "2023-02-07")));
    }

    #[test]
    fn unknown_sort_by_falls_back_to_id() {
        let order = OrderBy::resolve(Some("dueDate"), true, SortPolicy::FieldThenId);
        assert_eq!(order.key, SortKey::Id);
        let order = OrderBy::resolve(Some(""), false, SortPolicy::FieldThenId);
        assert_eq!(order.key, SortKey::Id);
    }

    #[test]
    fn id_only_policy_ignores_sort_field() {
        let order = OrderBy::resolve(Some("name"), false, SortPolicy::IdOnly);
        assert_eq!(order, OrderBy { key: SortKey::Id, descending: false });
    }

    #[test]
    fn field_policy_orders_ordinally_then_by_id() {
        let order = OrderBy::resolve(Some("Name"), false, SortPolicy::FieldThenId);
        let mut items = vec![
            item(3, "b", "2023-01-01"),
            item(1, "B", "2023-01-01"),
            item(2, "b", "2023-01-01"),
        ];
        items.sort_by(|a, b| order.compare(a, b));
        let ids: Vec<i64> = items.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn parses_offset_due_dates_as_local_wall_time() {
        let expected = parse_due_date("2023-02-06T10:30:00").unwrap();
        assert_eq!(parse_due_date("2023-02-06T10:30:00Z"), Some(expected));
        assert_eq!(parse_due_date("2023-02-06T10:30:00+09:00"), Some(expected));
        assert_eq!(parse_due_date("not a date"), None);
    }

    #[test]
    fn deserializes_date_only_and_id_alias() {
        let json = r#"{"id":4,"name":"n","description":"d","dueDate":"2023-02-06","status":"s"}"#;
        let parsed: TodoItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, TodoItemId(4));
        assert_eq!(parsed.due_date, parse_due_date("2023-02-06T00:00:00").unwrap());
    }
}
