use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wildcard channel name granting visibility into every channel.
pub const WILDCARD: &str = "*";

///
/// ChannelSet
///
/// A principal's resolved channel grants. The wildcard is its own variant so
/// every membership test handles it by construction rather than by
/// remembering to compare against a magic string.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ChannelSet {
    /// Visibility into every channel.
    All,

    /// Visibility into the named channels only.
    Named(BTreeSet<String>),
}

impl ChannelSet {
    /// Resolve a set from raw grant names. A literal `"*"` grant promotes
    /// the whole set to [`ChannelSet::All`].
    pub fn resolve<I, T>(grants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut named = BTreeSet::new();
        for grant in grants {
            let grant = grant.into();
            if grant == WILDCARD {
                return Self::All;
            }
            named.insert(grant);
        }

        Self::Named(named)
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    #[must_use]
    pub fn contains(&self, channel: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(named) => named.contains(channel),
        }
    }

    /// True when the set grants nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Named(named) => named.is_empty(),
        }
    }
}

impl<T: Into<String>> FromIterator<T> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::resolve(iter)
    }
}

/// Is any of `channels` visible under `visible`?
///
/// A wildcard on either side short-circuits to true; an empty channel list
/// never intersects anything.
#[must_use]
pub fn channels_intersect<'a, I>(visible: &ChannelSet, channels: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    channels
        .into_iter()
        .any(|channel| channel == WILDCARD || visible.contains(channel))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolve_promotes_wildcard_grant_to_all() {
        let set = ChannelSet::resolve(["chat", "*", "admin"]);
        assert_eq!(set, ChannelSet::All);
        assert!(set.contains("anything"));
    }

    #[test]
    fn named_set_contains_only_its_grants() {
        let set: ChannelSet = ["chat", "admin"].into_iter().collect();
        assert!(set.contains("chat"));
        assert!(set.contains("admin"));
        assert!(!set.contains("other"));
        assert!(!set.is_all());
    }

    #[test]
    fn empty_set_grants_nothing() {
        let set = ChannelSet::resolve(Vec::<String>::new());
        assert!(set.is_empty());
        assert!(!set.contains("chat"));
    }

    #[test]
    fn intersection_requires_a_shared_channel() {
        let visible = ChannelSet::resolve(["chat"]);
        assert!(channels_intersect(&visible, ["chat", "admin"]));
        assert!(!channels_intersect(&visible, ["admin", "other"]));
        assert!(!channels_intersect(&visible, []));
    }

    #[test]
    fn wildcard_row_channel_is_visible_to_everyone() {
        let visible = ChannelSet::resolve(["nothing-shared"]);
        assert!(channels_intersect(&visible, ["*"]));
    }

    proptest! {
        #[test]
        fn intersection_matches_set_model(
            grants in prop::collection::btree_set("[a-d]", 0..4),
            row in prop::collection::vec(prop_oneof![Just("*".to_string()), "[a-f]"], 0..5),
        ) {
            let visible = ChannelSet::Named(grants.clone());
            let shared = row.iter().any(|channel| grants.contains(channel));
            let wildcard = row.iter().any(|channel| channel == WILDCARD);

            prop_assert_eq!(
                channels_intersect(&visible, row.iter().map(String::as_str)),
                shared || wildcard
            );
        }

        #[test]
        fn all_set_sees_every_nonempty_row(
            row in prop::collection::vec("[a-f]", 0..5),
        ) {
            prop_assert_eq!(
                channels_intersect(&ChannelSet::All, row.iter().map(String::as_str)),
                !row.is_empty()
            );
        }
    }
}
