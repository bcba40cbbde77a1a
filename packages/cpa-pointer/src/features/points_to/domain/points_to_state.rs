//! Points-to State
//!
//! Abstract state of the flow-sensitive pointer analysis:
//! - PointsToMap: persistent map location → location set
//! - PointerAnalysisState: a map, or the shared unreachable state
//!
//! A location missing from the map points to Top. Update logic still tells
//! "absent" apart from an explicitly stored set, so the map never stores Top.
//!
//! Every transition returns a new state. `im::OrdMap` shares structure between
//! the old and new map, so keeping all intermediate states of a path is cheap.

use im::OrdMap;
use serde_json::{json, Value};
use std::fmt;

use super::location_set::LocationSet;
use super::pointer_location::{InvalidReason, PointerLocation};

/// Persistent location → location-set map (sorted, structurally shared)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PointsToMap {
    entries: OrdMap<PointerLocation, LocationSet>,
}

impl PointsToMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored set, `None` when absent
    #[inline]
    pub fn get(&self, location: &PointerLocation) -> Option<&LocationSet> {
        self.entries.get(location)
    }

    /// Stored set, Top when absent
    pub fn points_to_set(&self, location: &PointerLocation) -> LocationSet {
        self.entries.get(location).cloned().unwrap_or(LocationSet::Top)
    }

    #[inline]
    pub fn contains(&self, location: &PointerLocation) -> bool {
        self.entries.contains_key(location)
    }

    /// New map with `location ↦ targets`; storing Top removes the entry instead
    pub fn insert(&self, location: PointerLocation, targets: LocationSet) -> Self {
        if targets.is_top() {
            return self.without(&location);
        }
        Self {
            entries: self.entries.update(location, targets),
        }
    }

    pub fn without(&self, location: &PointerLocation) -> Self {
        Self {
            entries: self.entries.without(location),
        }
    }

    /// Drop all storage of variable `qualified_name`: every offset and every
    /// struct field of the instances it holds
    pub fn without_variable(&self, qualified_name: &str) -> Self {
        let rooted: Vec<&PointerLocation> = self
            .entries
            .keys()
            .filter(|location| location.is_rooted_at(qualified_name))
            .collect();
        let entries = rooted
            .into_iter()
            .fold(self.entries.clone(), |entries, location| entries.without(location));
        Self { entries }
    }

    /// Entries in location order
    pub fn iter(&self) -> impl Iterator<Item = (&PointerLocation, &LocationSet)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PointerLocation, LocationSet)> for PointsToMap {
    fn from_iter<I: IntoIterator<Item = (PointerLocation, LocationSet)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PointsToMap::new(), |map, (location, targets)| map.insert(location, targets))
    }
}

/// Analysis state at a CFA node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerAnalysisState {
    /// Path infeasible; absorbs every transition
    Bottom,
    Reachable(PointsToMap),
}

/// The unreachable state
pub const BOTTOM_STATE: PointerAnalysisState = PointerAnalysisState::Bottom;

impl Default for PointerAnalysisState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerAnalysisState {
    /// Initial state: nothing known, every location points to Top
    pub fn new() -> Self {
        PointerAnalysisState::Reachable(PointsToMap::new())
    }

    pub fn from_map(map: PointsToMap) -> Self {
        PointerAnalysisState::Reachable(map)
    }

    #[inline]
    pub fn is_bottom(&self) -> bool {
        matches!(self, PointerAnalysisState::Bottom)
    }

    pub fn points_to_map(&self) -> Option<&PointsToMap> {
        match self {
            PointerAnalysisState::Bottom => None,
            PointerAnalysisState::Reachable(map) => Some(map),
        }
    }

    /// Stored set of `location`: Top when absent, Bot in the unreachable state
    pub fn points_to_set(&self, location: &PointerLocation) -> LocationSet {
        match self {
            PointerAnalysisState::Bottom => LocationSet::Bot,
            PointerAnalysisState::Reachable(map) => map.points_to_set(location),
        }
    }

    /// Whether `location` has an entry (Bottom has none)
    pub fn has_entry(&self, location: &PointerLocation) -> bool {
        self.points_to_map().is_some_and(|map| map.contains(location))
    }

    /// Successor with `location ↦ targets`; Bottom stays Bottom
    pub fn with_points_to(&self, location: PointerLocation, targets: LocationSet) -> Self {
        match self {
            PointerAnalysisState::Bottom => BOTTOM_STATE,
            PointerAnalysisState::Reachable(map) => PointerAnalysisState::Reachable(map.insert(location, targets)),
        }
    }

    /// Successor forgetting `location` (it reads as Top again)
    pub fn without(&self, location: &PointerLocation) -> Self {
        match self {
            PointerAnalysisState::Bottom => BOTTOM_STATE,
            PointerAnalysisState::Reachable(map) => PointerAnalysisState::Reachable(map.without(location)),
        }
    }

    pub fn without_variable(&self, qualified_name: &str) -> Self {
        match self {
            PointerAnalysisState::Bottom => BOTTOM_STATE,
            PointerAnalysisState::Reachable(map) => {
                PointerAnalysisState::Reachable(map.without_variable(qualified_name))
            }
        }
    }

    /// Locations the members of `set` point to
    ///
    /// Top and Bot are returned unchanged. A set of nothing but null pointers
    /// dereferences to `{INVALID(NULL_DEREFERENCE)}`. Otherwise the pointee sets
    /// of all members are joined; one Top pointee makes the result Top, else one
    /// Bot pointee makes it Bot.
    pub fn dereference(&self, set: &LocationSet) -> LocationSet {
        let members = match set {
            LocationSet::Top | LocationSet::Bot => return set.clone(),
            LocationSet::Explicit(members) => members,
        };
        if set.contains_all_nulls() {
            return LocationSet::singleton(PointerLocation::Invalid(InvalidReason::NullDereference));
        }

        let mut result = LocationSet::Bot;
        let mut saw_bot = false;
        for member in members.iter() {
            match self.points_to_set(member) {
                LocationSet::Top => return LocationSet::Top,
                LocationSet::Bot => saw_bot = true,
                pointees => result = result.with_pointer_targets(&pointees),
            }
        }
        if saw_bot {
            LocationSet::Bot
        } else {
            result
        }
    }

    /// Least upper bound
    ///
    /// Keys present in both maps join pointwise; a key missing on either side
    /// is Top there and so is missing in the result.
    pub fn join(&self, other: &PointerAnalysisState) -> PointerAnalysisState {
        let (left, right) = match (self, other) {
            (PointerAnalysisState::Bottom, x) | (x, PointerAnalysisState::Bottom) => return x.clone(),
            (PointerAnalysisState::Reachable(l), PointerAnalysisState::Reachable(r)) => (l, r),
        };
        let joined = left
            .iter()
            .filter_map(|(location, targets)| {
                right
                    .get(location)
                    .map(|theirs| (location.clone(), targets.with_pointer_targets(theirs)))
            })
            .collect();
        PointerAnalysisState::Reachable(joined)
    }

    /// Pointwise ⊑ with absent entries read as Top; Bottom is below everything
    pub fn is_less_or_equal(&self, other: &PointerAnalysisState) -> bool {
        match (self, other) {
            (PointerAnalysisState::Bottom, _) => true,
            (_, PointerAnalysisState::Bottom) => false,
            (PointerAnalysisState::Reachable(mine), PointerAnalysisState::Reachable(theirs)) => theirs
                .iter()
                .all(|(location, bound)| mine.get(location).is_some_and(|set| set.is_subset_of(bound))),
        }
    }

    /// JSON snapshot with locations and sets rendered as strings
    pub fn to_json(&self) -> Value {
        match self {
            PointerAnalysisState::Bottom => json!({ "bottom": true }),
            PointerAnalysisState::Reachable(map) => {
                let entries: serde_json::Map<String, Value> = map
                    .iter()
                    .map(|(location, targets)| {
                        let rendered = match targets {
                            LocationSet::Explicit(_) => {
                                Value::Array(targets.iter().map(|l| Value::String(l.to_string())).collect())
                            }
                            other => Value::String(other.to_string()),
                        };
                        (location.to_string(), rendered)
                    })
                    .collect();
                json!({ "bottom": false, "points_to": entries })
            }
        }
    }
}

impl fmt::Display for PointerAnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerAnalysisState::Bottom => write!(f, "BOTTOM"),
            PointerAnalysisState::Reachable(map) => {
                let entries: Vec<String> = map.iter().map(|(l, s)| format!("{} -> {}", l, s)).collect();
                write!(f, "[{}]", entries.join(", "))
            }
        }
    }
}
