//! Location Set Lattice
//!
//! Abstract value of a pointer: the set of locations it may reference.
//!
//! ```text
//!              Top            (may be any location)
//!         /     |     \
//!   Explicit({a}) ... Explicit({a,b}) ...
//!         \     |     /
//!              Bot            (no location: unreachable/uninitialized)
//! ```
//!
//! Explicit sets are persistent ordered sets, so joins share structure with
//! their inputs and iteration is sorted. An empty explicit set is normalised to
//! `Bot` when constructed.

use im::OrdSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pointer_location::PointerLocation;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationSet {
    Top,
    Bot,
    /// Never empty
    Explicit(OrdSet<PointerLocation>),
}

impl LocationSet {
    /// Build an explicit set; no locations at all yields `Bot`
    pub fn explicit(locations: impl IntoIterator<Item = PointerLocation>) -> Self {
        Self::from_set(locations.into_iter().collect())
    }

    pub fn from_set(set: OrdSet<PointerLocation>) -> Self {
        if set.is_empty() {
            LocationSet::Bot
        } else {
            LocationSet::Explicit(set)
        }
    }

    #[inline]
    pub fn singleton(location: PointerLocation) -> Self {
        LocationSet::Explicit(OrdSet::unit(location))
    }

    #[inline]
    pub fn is_top(&self) -> bool {
        matches!(self, LocationSet::Top)
    }

    #[inline]
    pub fn is_bot(&self) -> bool {
        matches!(self, LocationSet::Bot)
    }

    #[inline]
    pub fn is_explicit(&self) -> bool {
        matches!(self, LocationSet::Explicit(_))
    }

    /// Join: Top absorbs, Bot is the identity, explicit sets unite
    pub fn with_pointer_targets(&self, other: &LocationSet) -> LocationSet {
        match (self, other) {
            (LocationSet::Top, _) | (_, LocationSet::Top) => LocationSet::Top,
            (LocationSet::Bot, x) | (x, LocationSet::Bot) => x.clone(),
            (LocationSet::Explicit(a), LocationSet::Explicit(b)) => {
                LocationSet::Explicit(a.clone().union(b.clone()))
            }
        }
    }

    /// Non-empty and every member is the null location
    ///
    /// A set holding null next to any other location is *not* all nulls.
    pub fn contains_all_nulls(&self) -> bool {
        match self {
            LocationSet::Explicit(set) => !set.is_empty() && set.iter().all(PointerLocation::is_null),
            _ => false,
        }
    }

    /// Lattice order `self ⊑ other`
    pub fn is_subset_of(&self, other: &LocationSet) -> bool {
        match (self, other) {
            (LocationSet::Bot, _) | (_, LocationSet::Top) => true,
            (LocationSet::Top, _) | (_, LocationSet::Bot) => false,
            (LocationSet::Explicit(a), LocationSet::Explicit(b)) => a.is_subset(b),
        }
    }

    /// Whether both sets may reference a common location
    pub fn may_overlap(&self, other: &LocationSet) -> bool {
        match (self, other) {
            (LocationSet::Bot, _) | (_, LocationSet::Bot) => false,
            (LocationSet::Top, _) | (_, LocationSet::Top) => true,
            (LocationSet::Explicit(a), LocationSet::Explicit(b)) => {
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                small.iter().any(|loc| large.contains(loc))
            }
        }
    }

    /// The only member of a one-element explicit set
    pub fn single_location(&self) -> Option<&PointerLocation> {
        match self {
            LocationSet::Explicit(set) if set.len() == 1 => set.get_min(),
            _ => None,
        }
    }

    /// Members in sorted order; empty for Top and Bot
    pub fn iter(&self) -> impl Iterator<Item = &PointerLocation> + '_ {
        let set = match self {
            LocationSet::Explicit(set) => Some(set),
            _ => None,
        };
        set.into_iter().flat_map(|s| s.iter())
    }
}

impl From<PointerLocation> for LocationSet {
    fn from(location: PointerLocation) -> Self {
        LocationSet::singleton(location)
    }
}

impl FromIterator<PointerLocation> for LocationSet {
    fn from_iter<I: IntoIterator<Item = PointerLocation>>(iter: I) -> Self {
        LocationSet::explicit(iter)
    }
}

impl fmt::Display for LocationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSet::Top => write!(f, "TOP"),
            LocationSet::Bot => write!(f, "BOT"),
            LocationSet::Explicit(set) => {
                let members: Vec<String> = set.iter().map(|loc| loc.to_string()).collect();
                write!(f, "{{{}}}", members.join(", "))
            }
        }
    }
}
