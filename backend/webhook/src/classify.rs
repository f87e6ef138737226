//! Source classification.
//!
//! Maps the raw origin descriptor of an event onto a `SourceInfo`. Group id
//! takes precedence over room id; anything else is a one-on-one chat. Never
//! fails: a source with no ids at all still classifies as User.

use chatvault_core::{SourceInfo, SourceKind};

use crate::wire::EventSource;

pub fn classify(source: Option<&EventSource>) -> SourceInfo {
    let (user_id, group_id, room_id) = match source {
        Some(s) => (s.user_id.clone(), s.group_id.clone(), s.room_id.clone()),
        None => (None, None, None),
    };

    if group_id.is_some() {
        SourceInfo {
            kind: SourceKind::Group,
            user_id,
            group_id,
            room_id: None,
        }
    } else if room_id.is_some() {
        SourceInfo {
            kind: SourceKind::Room,
            user_id,
            group_id: None,
            room_id,
        }
    } else {
        SourceInfo {
            kind: SourceKind::User,
            user_id,
            group_id: None,
            room_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(user: Option<&str>, group: Option<&str>, room: Option<&str>) -> EventSource {
        EventSource {
            kind: None,
            user_id: user.map(String::from),
            group_id: group.map(String::from),
            room_id: room.map(String::from),
        }
    }

    #[test]
    fn group_id_wins_over_room_id() {
        let info = classify(Some(&source(Some("U1"), Some("C1"), Some("R1"))));
        assert_eq!(info.kind, SourceKind::Group);
        assert_eq!(info.group_id.as_deref(), Some("C1"));
        assert!(info.room_id.is_none());
    }

    #[test]
    fn room_id_when_no_group() {
        let info = classify(Some(&source(Some("U1"), None, Some("R1"))));
        assert_eq!(info.kind, SourceKind::Room);
        assert_eq!(info.room_id.as_deref(), Some("R1"));
    }

    #[test]
    fn bare_user_classifies_as_user() {
        let info = classify(Some(&source(Some("U1"), None, None)));
        assert_eq!(info.kind, SourceKind::User);
    }

    #[test]
    fn absent_source_never_fails() {
        let info = classify(None);
        assert_eq!(info.kind, SourceKind::User);
        assert!(info.user_id.is_none());
    }
}
