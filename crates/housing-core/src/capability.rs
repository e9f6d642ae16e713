// ── Capabilities ──
//
// Which remote operations are available, decided once when the API modules
// finish loading. Everything downstream asks `supports()` instead of probing
// the loaded modules again.

use std::collections::BTreeSet;

use strum::{EnumIter, EnumString, IntoStaticStr};

/// A remote operation, named by its discovery method id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, EnumIter, IntoStaticStr,
    strum::Display,
)]
pub enum Capability {
    #[strum(serialize = "housing.housing.rooms")]
    Rooms,
    #[strum(serialize = "housing.housing.current")]
    Current,
    #[strum(serialize = "housing.housing.reserve")]
    Reserve,
    #[strum(serialize = "housing.housing.deleteReservation")]
    DeleteReservation,
    #[strum(serialize = "housing.housing.isOpen")]
    IsOpen,
    #[strum(serialize = "housing.housing.setOpen")]
    SetOpen,
    #[strum(serialize = "housing.housing.getStudentList")]
    StudentList,
    #[strum(serialize = "housing.housing.getRoomList")]
    RoomList,
    #[strum(serialize = "housing.housing.getAdminList")]
    AdminList,
    #[strum(serialize = "housing.housing.getEditorList")]
    EditorList,
    #[strum(serialize = "oauth2.userinfo.get")]
    Userinfo,
}

impl Capability {
    pub fn method_id(self) -> &'static str {
        self.into()
    }

    /// `true` for operations served by the housing module.
    pub fn is_domain(self) -> bool {
        self.method_id().starts_with("housing.")
    }
}

/// Immutable set of available operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    set: BTreeSet<Capability>,
}

impl Capabilities {
    /// Nothing loaded (offline).
    pub fn none() -> Self {
        Self::default()
    }

    /// Keep the method ids that name a known operation; ignore the rest.
    pub fn from_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = methods
            .into_iter()
            .filter_map(|id| id.as_ref().parse::<Capability>().ok())
            .collect();
        Self { set }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.set.contains(&capability)
    }

    /// Whether any housing operation loaded, i.e. the domain backend exists.
    pub fn has_domain(&self) -> bool {
        self.set.iter().any(|c| c.is_domain())
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            set: self.set.union(&other.set).copied().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.set.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self {
            set: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn method_ids_round_trip_through_parse() {
        for cap in Capability::iter() {
            assert_eq!(cap.method_id().parse::<Capability>(), Ok(cap));
        }
    }

    #[test]
    fn unknown_methods_are_ignored() {
        let caps = Capabilities::from_methods([
            "housing.housing.rooms",
            "housing.housing.somethingNew",
            "oauth2.userinfo.get",
        ]);
        assert!(caps.supports(Capability::Rooms));
        assert!(caps.supports(Capability::Userinfo));
        assert!(!caps.supports(Capability::Reserve));
        assert_eq!(caps.iter().count(), 2);
    }

    #[test]
    fn domain_presence_ignores_identity_module() {
        let identity_only: Capabilities = [Capability::Userinfo].into_iter().collect();
        assert!(!identity_only.has_domain());
        assert!(!Capabilities::none().has_domain());

        let both = identity_only.union(&[Capability::IsOpen].into_iter().collect());
        assert!(both.has_domain());
        assert!(both.supports(Capability::Userinfo));
    }
}
