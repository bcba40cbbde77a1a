//! Path Analyzer
//!
//! Replays a sequence of CFA edges (one program path) through the transfer
//! relation and keeps the state after every edge. States share structure, so
//! keeping all of them costs little more than the final one.
//!
//! The replay stops at the first edge that makes the path infeasible.
//!
//! # Example
//! ```rust,ignore
//! let config = PointerAnalysisConfig::from_preset(Preset::Thorough);
//! let analyzer = PointerAnalyzer::from_config(config);
//!
//! let result = analyzer.analyze_path(&edges)?;
//! let view = analyzer.view(&result.final_state);
//! assert!(view.may_alias(&p, &q)?);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::config::PointerAnalysisConfig;
use crate::features::points_to::domain::{
    LocationSet, PointerAnalysisError, PointerAnalysisState, PointerLocation, PointerResult,
};
use crate::features::points_to::infrastructure::{resolve_expression, ResolveMode, UpdateKind};
use crate::features::points_to::ports::{OffsetOperator, PointsToQuery};
use crate::shared::models::{CExpression, CfaEdge, CfaNodeId};

use super::transfer_relation::PointerTransferRelation;

/// Path analysis statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAnalysisStats {
    pub edges_processed: usize,
    pub strong_updates: usize,
    pub weak_updates: usize,
    pub forgets: usize,
    pub infeasible: usize,
    pub analysis_time_ms: u64,
}

impl PathAnalysisStats {
    fn record(&mut self, updates: &[UpdateKind]) {
        for update in updates {
            match update {
                UpdateKind::Strong => self.strong_updates += 1,
                UpdateKind::Weak => self.weak_updates += 1,
                UpdateKind::Forget => self.forgets += 1,
                UpdateKind::Infeasible => self.infeasible += 1,
                UpdateKind::Unchanged => {}
            }
        }
    }
}

/// Path analysis result
#[derive(Debug, Clone)]
pub struct PathAnalysisResult {
    /// `states[0]` is the initial state, `states[i + 1]` the state after edge `i`
    pub states: Vec<PointerAnalysisState>,
    /// State at each reached CFA node (joined when a node repeats)
    pub states_at_node: FxHashMap<CfaNodeId, PointerAnalysisState>,
    /// Last computed state (`BOTTOM_STATE` for an infeasible path)
    pub final_state: PointerAnalysisState,
    /// Index of the edge that made the path infeasible
    pub infeasible_at: Option<usize>,
    pub stats: PathAnalysisStats,
}

impl PathAnalysisResult {
    pub fn is_feasible(&self) -> bool {
        self.infeasible_at.is_none()
    }

    /// State after edge `index`
    pub fn state_after(&self, index: usize) -> Option<&PointerAnalysisState> {
        self.states.get(index + 1)
    }

    pub fn state_at(&self, node: CfaNodeId) -> Option<&PointerAnalysisState> {
        self.states_at_node.get(&node)
    }

    /// Points-to set of `location` at the end of the path
    pub fn points_to(&self, location: &PointerLocation) -> LocationSet {
        self.final_state.points_to_set(location)
    }
}

/// Replays program paths
#[derive(Debug, Clone, Default)]
pub struct PointerAnalyzer {
    relation: PointerTransferRelation,
    initial_state: PointerAnalysisState,
}

impl PointerAnalyzer {
    /// Create a new analyzer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from config
    pub fn from_config(config: PointerAnalysisConfig) -> Self {
        Self {
            relation: PointerTransferRelation::new(config),
            initial_state: PointerAnalysisState::new(),
        }
    }

    /// State the replay starts from (e.g. after global declarations)
    pub fn with_initial_state(mut self, state: PointerAnalysisState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_offset_operator(mut self, offsets: Arc<dyn OffsetOperator>) -> Self {
        self.relation = self.relation.with_offset_operator(offsets);
        self
    }

    pub fn config(&self) -> &PointerAnalysisConfig {
        self.relation.config()
    }

    pub fn transfer_relation(&self) -> &PointerTransferRelation {
        &self.relation
    }

    /// Query view over one of the states this analyzer produced
    pub fn view<'a>(&'a self, state: &'a PointerAnalysisState) -> PointsToView<'a> {
        PointsToView::new(state, self.config())
    }

    /// Run the analysis along `edges`
    pub fn analyze_path(&self, edges: &[CfaEdge]) -> PointerResult<PathAnalysisResult> {
        if let Some(limit) = self.config().max_path_edges {
            if edges.len() > limit {
                return Err(PointerAnalysisError::PathTooLong {
                    length: edges.len(),
                    limit,
                });
            }
        }

        let start = Instant::now();
        let mut stats = PathAnalysisStats::default();
        let mut states = Vec::with_capacity(edges.len() + 1);
        let mut states_at_node: FxHashMap<CfaNodeId, PointerAnalysisState> = FxHashMap::default();
        let mut infeasible_at = None;

        let mut current = self.initial_state.clone();
        states.push(current.clone());
        if let Some(first) = edges.first() {
            record_node(&mut states_at_node, first.predecessor, &current);
        }

        for (index, edge) in edges.iter().enumerate() {
            let transition = self.relation.transfer(&current, edge)?;
            stats.edges_processed += 1;
            stats.record(&transition.updates);

            current = transition.state;
            states.push(current.clone());

            if current.is_bottom() {
                tracing::debug!(edge = %edge, index, "Path is infeasible");
                infeasible_at = Some(index);
                break;
            }
            record_node(&mut states_at_node, edge.successor, &current);
        }

        stats.analysis_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            edges = stats.edges_processed,
            strong = stats.strong_updates,
            weak = stats.weak_updates,
            forgets = stats.forgets,
            feasible = infeasible_at.is_none(),
            "Path analysis finished"
        );

        Ok(PathAnalysisResult {
            states,
            states_at_node,
            final_state: current,
            infeasible_at,
            stats,
        })
    }
}

fn record_node(
    states_at_node: &mut FxHashMap<CfaNodeId, PointerAnalysisState>,
    node: CfaNodeId,
    state: &PointerAnalysisState,
) {
    states_at_node
        .entry(node)
        .and_modify(|existing| *existing = existing.join(state))
        .or_insert_with(|| state.clone());
}

/// Read access to one state under one configuration
#[derive(Debug, Clone, Copy)]
pub struct PointsToView<'a> {
    state: &'a PointerAnalysisState,
    config: &'a PointerAnalysisConfig,
}

impl<'a> PointsToView<'a> {
    pub fn new(state: &'a PointerAnalysisState, config: &'a PointerAnalysisConfig) -> Self {
        Self { state, config }
    }

    pub fn state(&self) -> &PointerAnalysisState {
        self.state
    }
}

impl PointsToQuery for PointsToView<'_> {
    fn points_to(&self, expression: &CExpression) -> PointerResult<LocationSet> {
        resolve_expression(expression, self.state, ResolveMode::PointsTo, self.config)
    }

    fn locations_of(&self, expression: &CExpression) -> PointerResult<LocationSet> {
        resolve_expression(expression, self.state, ResolveMode::Address, self.config)
    }
}
