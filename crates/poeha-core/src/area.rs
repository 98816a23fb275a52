//! Tracking of other players sharing the monitored player's area.

use std::collections::HashSet;

/// Names of the *other* players currently in the monitored player's area.
///
/// Level-up and death lines do not say whose character they are about. A name
/// that joined the area is someone else; anything not tracked here is taken to
/// be the monitored player.
///
/// Names are compared exactly (case-sensitive).
#[derive(Debug, Clone, Default)]
pub struct AreaMembers {
    members: HashSet<String>,
    own_name: Option<String>,
}

impl AreaMembers {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set that never admits `own_name`.
    pub fn for_player(own_name: impl Into<String>) -> Self {
        Self {
            members: HashSet::new(),
            own_name: Some(own_name.into()),
        }
    }

    /// Records a player as present. Returns `true` if the name was newly added.
    pub fn add(&mut self, name: &str) -> bool {
        if self.own_name.as_deref() == Some(name) {
            tracing::debug!(name, "ignoring join for monitored player");
            return false;
        }
        self.members.insert(name.to_string())
    }

    /// Forgets a player. Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) -> bool {
        self.members.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in sorted order, for display.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
