use crate::channel::ChannelSet;

///
/// Principal
///
/// The calling identity, threaded explicitly through every operation so that
/// access decisions never depend on implicit per-call state.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Principal {
    /// Administrative caller with no channel restriction.
    Admin,

    /// Authenticated end user restricted to a resolved channel set.
    User(ChannelSet),
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// True when no channel restriction applies: an administrator, or a
    /// user whose grants resolved to the wildcard.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        match self {
            Self::Admin => true,
            Self::User(channels) => channels.is_all(),
        }
    }

    /// The channel restriction in effect for this caller, if any.
    #[must_use]
    pub fn restriction(&self) -> Option<&ChannelSet> {
        match self {
            Self::Admin => None,
            Self::User(channels) if channels.is_all() => None,
            Self::User(channels) => Some(channels),
        }
    }
}

///
/// TESTS
///
