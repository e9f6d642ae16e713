// ── Domain model ──
//
// Wire types come straight from `housing-api`; this module adds the
// client-side views built on top of them.

use std::cmp::Reverse;

use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};

pub use housing_api::models::{
    AdminList, Floor, Identifier, Occupancy, Occupants, Reservation, Room, RoomShape, Userinfo,
};

use crate::capability::Capability;

/// The signed-in identity as published by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Blank when the identity API could not be reached.
    pub email: Option<String>,
    pub is_signed_in: bool,
}

impl Identity {
    pub fn signed_in(email: Option<String>) -> Self {
        Self {
            email,
            is_signed_in: true,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

/// The four admin collections, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display)]
pub enum AdminListKind {
    #[strum(serialize = "student list")]
    Student,
    #[strum(serialize = "room list")]
    Room,
    #[strum(serialize = "admin list")]
    Admin,
    #[strum(serialize = "editor list")]
    Editor,
}

impl AdminListKind {
    /// Remote method name under `housing/v1/`.
    pub fn method(self) -> &'static str {
        match self {
            Self::Student => "getStudentList",
            Self::Room => "getRoomList",
            Self::Admin => "getAdminList",
            Self::Editor => "getEditorList",
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Self::Student => Capability::StudentList,
            Self::Room => Capability::RoomList,
            Self::Admin => Capability::AdminList,
            Self::Editor => Capability::EditorList,
        }
    }
}

/// Display preference for admin lists: room, student, admin, editor.
const KNOWN_LISTS: [AdminListKind; 4] = [
    AdminListKind::Room,
    AdminListKind::Student,
    AdminListKind::Admin,
    AdminListKind::Editor,
];

/// Order lists for display. Known keys (case-insensitive) come first in
/// [`KNOWN_LISTS`] order; unknown keys follow in their original order.
pub fn sort_admin_lists(lists: &mut [AdminList]) {
    lists.sort_by_key(|list| {
        let key = list.key.to_lowercase();
        let rank = KNOWN_LISTS.iter().position(|k| k.to_string() == key);
        Reverse(rank.map(|i| KNOWN_LISTS.len() - i))
    });
}

/// Pick the floor to show: the requested one when it exists, else the first.
pub fn select_floor<'a>(floors: &'a [Floor], requested: Option<&str>) -> Option<&'a Floor> {
    requested
        .and_then(|raw| floors.iter().find(|f| f.number.matches(raw)))
        .or_else(|| floors.first())
}

/// The floor holding `room`, if any.
pub fn floor_of<'a>(floors: &'a [Floor], room: &Identifier) -> Option<&'a Floor> {
    let wanted = room.to_string();
    floors
        .iter()
        .find(|f| f.rooms.iter().any(|r| r.number.matches(&wanted)))
}

/// All admin kinds in request order.
pub fn admin_list_kinds() -> impl Iterator<Item = AdminListKind> {
    AdminListKind::iter()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn list(key: &str) -> AdminList {
        AdminList {
            key: key.into(),
            strings: vec![],
        }
    }

    fn floors() -> Vec<Floor> {
        serde_json::from_value(json!([
            { "number": 4, "rooms": [{ "number": 401, "capacity": 2, "occupants": 0 }] },
            { "number": "5b", "rooms": [{ "number": "5b01", "capacity": 1, "occupants": 1 }] }
        ]))
        .expect("floors")
    }

    #[test]
    fn admin_lists_sort_known_keys_first() {
        let mut lists = vec![
            list("Waitlist"),
            list("editor list"),
            list("Student List"),
            list("Room List"),
            list("Audit"),
            list("admin list"),
        ];
        sort_admin_lists(&mut lists);
        let keys: Vec<_> = lists.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(
            keys,
            ["Room List", "Student List", "admin list", "editor list", "Waitlist", "Audit"]
        );
    }

    #[test]
    fn requested_floor_wins_when_present() {
        let floors = floors();
        assert_eq!(
            select_floor(&floors, Some("5b")).map(|f| &f.number),
            Some(&Identifier::from("5b"))
        );
        assert_eq!(
            select_floor(&floors, Some("4")).map(|f| &f.number),
            Some(&Identifier::Number(4))
        );
    }

    #[test]
    fn missing_floor_falls_back_to_first() {
        let floors = floors();
        assert_eq!(
            select_floor(&floors, Some("9")).map(|f| &f.number),
            Some(&Identifier::Number(4))
        );
        assert_eq!(select_floor(&floors, None).map(|f| &f.number), Some(&Identifier::Number(4)));
        assert!(select_floor(&[], Some("4")).is_none());
    }

    #[test]
    fn room_lookup_ignores_wire_representation() {
        let floors = floors();
        let floor = floor_of(&floors, &Identifier::from("401")).expect("floor");
        assert_eq!(floor.number, Identifier::Number(4));
        assert!(floor_of(&floors, &Identifier::from("999")).is_none());
    }

    #[test]
    fn admin_kinds_map_to_methods() {
        let methods: Vec<_> = admin_list_kinds().map(AdminListKind::method).collect();
        assert_eq!(
            methods,
            ["getStudentList", "getRoomList", "getAdminList", "getEditorList"]
        );
    }
}
