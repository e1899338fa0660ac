//! User records and their ordering.
//!
//! Records come from the remote endpoint as-is. `createdAt` stays a string so
//! that a bad timestamp never fails the whole response; it only loses its
//! sort key.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// A user record as returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// ISO-8601 string, e.g. "2023-01-01T00:00:00.000Z"
    pub created_at: String,
    pub name: String,
    /// URL of the avatar image
    pub avatar: String,
}

impl User {
    /// Parse `created_at` into an instant
    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.created_at)
    }

    pub fn alt_text(&self) -> String {
        format!("{}'s avatar image", self.name)
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339, a date-time with minutes precision (`Z` or `+hh:mm`
/// offset), a date-time without offset (UTC), and a bare date (UTC midnight).
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt);
    }
    let naive_part = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().fixed_offset());
    }
    None
}

/// Sort key: epoch milliseconds of `createdAt`, `None` if unparseable
pub fn created_key(user: &User) -> Option<i64> {
    user.created().map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}

/// Order users most recent first.
///
/// The sort is stable. Users without a parseable timestamp go last.
pub fn sort_by_created_desc(users: &mut [User]) {
    users.sort_by_cached_key(|user| std::cmp::Reverse(created_key(user)));
}

#[cfg(test)]
pub(crate) fn user(id: &str, created_at: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        created_at: created_at.to_string(),
        name: name.to_string(),
        avatar: format!("https://cdn.example.com/avatars/{}.jpg", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.created_at.as_str()).collect()
    }

    #[test]
    fn test_sort_descending() {
        let mut users = vec![
            user("1", "2023-01-01", "A"),
            user("2", "2023-03-01", "B"),
            user("3", "2023-02-01", "C"),
            user("4", "2024-01-01", "D"),
        ];
        sort_by_created_desc(&mut users);
        assert_eq!(
            order(&users),
            vec!["2024-01-01", "2023-03-01", "2023-02-01", "2023-01-01"]
        );
    }

    #[test]
    fn test_sort_is_non_increasing() {
        let mut users = vec![
            user("1", "2023-05-04T10:00:00.000Z", "A"),
            user("2", "2023-05-04T12:00:00+02:00", "B"),
            user("3", "2024-11-30T23:59:59.999Z", "C"),
            user("4", "2022-01-01T00:00:00Z", "D"),
            user("5", "2023-05-04T09:59:59.999Z", "E"),
        ];
        sort_by_created_desc(&mut users);
        for pair in users.windows(2) {
            assert!(created_key(&pair[0]) >= created_key(&pair[1]));
        }
    }

    #[test]
    fn test_sort_ties_keep_fetched_order() {
        let mut users = vec![
            user("a", "2023-01-01T00:00:00.000Z", "First"),
            user("b", "2024-01-01T00:00:00.000Z", "Newest"),
            user("c", "2023-01-01T00:00:00Z", "Second"),
        ];
        sort_by_created_desc(&mut users);
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_unparseable_last() {
        let mut users = vec![
            user("x", "not a date", "X"),
            user("1", "2023-01-01", "A"),
            user("y", "", "Y"),
            user("2", "2024-01-01", "B"),
        ];
        sort_by_created_desc(&mut users);
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "x", "y"]);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let rfc = parse_timestamp("2023-01-01T00:00:00.000Z").unwrap();
        let naive = parse_timestamp("2023-01-01T00:00:00").unwrap();
        let date = parse_timestamp("2023-01-01").unwrap();
        assert_eq!(rfc, naive);
        assert_eq!(rfc, date);

        let offset = parse_timestamp("2023-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, rfc);

        assert!(parse_timestamp("01/01/2023").is_none());
        assert!(parse_timestamp("2023-01-01T25:00Z").is_none());
        assert!(parse_timestamp("2023-13-01").is_none());
    }

    #[test]
    fn test_parse_timestamp_minutes_only() {
        let expected = parse_timestamp("2023-01-01T10:30:00Z").unwrap();
        assert_eq!(parse_timestamp("2023-01-01T10:30Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T10:30"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T12:30+02:00"), Some(expected));
        assert_eq!(
            created_key(&user("1", "2023-01-01T10:30Z", "A")),
            Some(expected.timestamp_millis())
        );
    }

    #[test]
    fn test_created_key_millis() {
        let u = user("1", "1970-01-01T00:00:01.500Z", "A");
        assert_eq!(created_key(&u), Some(1500));
        assert_eq!(created_key(&user("2", "garbage", "B")), None);
    }

    #[test]
    fn test_alt_text() {
        assert_eq!(
            user("1", "2023-01-01", "Ada Lovelace").alt_text(),
            "Ada Lovelace's avatar image"
        );
    }

    #[test]
    fn test_deserialize_camel_case() {
        let body = r#"[{
            "createdAt": "2024-09-25T12:54:12.519Z",
            "name": "Irma Schaefer",
            "avatar": "https://avatars.example.com/1.jpg",
            "id": "1",
            "email": "ignored@example.com"
        }]"#;
        let users: Vec<User> = serde_json::from_str(body).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].created_at, "2024-09-25T12:54:12.519Z");
        assert_eq!(users[0].name, "Irma Schaefer");
    }

    #[test]
    fn test_deserialize_missing_field_fails() {
        let body = r#"[{"id": "1", "name": "No Date", "avatar": "x"}]"#;
        assert!(serde_json::from_str::<Vec<User>>(body).is_err());
    }
}
