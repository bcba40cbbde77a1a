//! Pointer Transfer Relation
//!
//! Computes the successor state of one CFA edge.
//!
//! | Edge              | Effect                                                    |
//! |-------------------|-----------------------------------------------------------|
//! | Declaration       | forget old storage, write initializer (or zero) cells     |
//! | Statement         | pointer / aggregate assignment                            |
//! | Assume            | prune paths contradicting a pointer (in)equality          |
//! | FunctionCall      | bind parameters to arguments resolved in the caller       |
//! | ReturnStatement   | write the function's return-value location                |
//! | FunctionReturn    | copy the return value to the call's lhs, drop it          |
//!
//! All values of one edge are resolved against the state before the edge, then
//! written in order. A state that becomes `BOTTOM_STATE` stays there.
//!
//! # Example
//! ```rust,ignore
//! let relation = PointerTransferRelation::new(PointerAnalysisConfig::default());
//! let next = relation.successor(&PointerAnalysisState::new(), &edge)?;
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::PointerAnalysisConfig;
use crate::features::points_to::domain::{
    LocationSet, PointerAnalysisError, PointerAnalysisState, PointerLocation, PointerResult, BOTTOM_STATE,
};
use crate::features::points_to::infrastructure::{
    copy_cells, handle_assignment, initializer_cells, is_summarized_write, resolve_call_result,
    resolve_expression_with, CellValue, CellWrite, DeclaredOffsetOperator, ResolveMode, UpdateKind,
};
use crate::features::points_to::ports::OffsetOperator;
use crate::shared::models::{
    BinaryOperator, CDeclaration, CExpression, CFunctionCallExpression, CFunctionDeclaration, CStatement, CType,
    CVariableDeclaration, CfaEdge, CfaEdgeKind, FileLocation, UnaryOperator,
};

/// Name of the synthetic variable holding a function's return value
const RETURN_VALUE_VARIABLE: &str = "__retval__";

/// Successor state plus the kind of every write it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: PointerAnalysisState,
    pub updates: Vec<UpdateKind>,
}

impl Transition {
    fn unchanged(state: PointerAnalysisState) -> Self {
        Self {
            state,
            updates: Vec::new(),
        }
    }

    fn infeasible() -> Self {
        Self {
            state: BOTTOM_STATE,
            updates: vec![UpdateKind::Infeasible],
        }
    }
}

/// Resolved write, not yet applied
#[derive(Debug, Clone)]
struct PendingWrite {
    targets: LocationSet,
    value: LocationSet,
    summarized: bool,
}

/// State threaded through the writes of one edge
struct Step {
    state: PointerAnalysisState,
    updates: Vec<UpdateKind>,
}

impl Step {
    fn new(state: PointerAnalysisState) -> Self {
        Self {
            state,
            updates: Vec::new(),
        }
    }

    fn assign(&mut self, targets: &LocationSet, value: &LocationSet, summarized: bool, location: &FileLocation) {
        if self.state.is_bottom() {
            return;
        }
        let outcome = handle_assignment(&self.state, targets, value, summarized, location);
        self.updates.push(outcome.update);
        self.state = outcome.state;
    }

    fn apply(&mut self, writes: Vec<PendingWrite>, location: &FileLocation) {
        for write in writes {
            self.assign(&write.targets, &write.value, write.summarized, location);
        }
    }

    /// Write storage that was just forgotten (declarations, parameters,
    /// return values): every value aimed at the same location is joined
    /// first, so collapsed array cells and merged aggregates receive the
    /// union of their initializers in a single strong write.
    fn initialize(&mut self, writes: Vec<PendingWrite>, location: &FileLocation) {
        let mut values: BTreeMap<PointerLocation, LocationSet> = BTreeMap::new();
        let mut ambiguous = Vec::new();
        for write in writes {
            let Some(target) = write.targets.single_location() else {
                ambiguous.push(write);
                continue;
            };
            match values.entry(target.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(write.value);
                }
                Entry::Occupied(mut slot) => {
                    let joined = slot.get().with_pointer_targets(&write.value);
                    slot.insert(joined);
                }
            }
        }
        for (target, value) in values {
            self.assign(&LocationSet::singleton(target), &value, false, location);
        }
        self.apply(ambiguous, location);
    }

    fn finish(self) -> Transition {
        Transition {
            state: self.state,
            updates: self.updates,
        }
    }
}

/// One side of a pointer comparison
enum Operand<'a> {
    Expression(&'a CExpression),
    Null,
}

impl<'a> Operand<'a> {
    fn of(expression: &'a CExpression) -> Self {
        if expression.is_zero_literal() {
            Operand::Null
        } else {
            Operand::Expression(expression)
        }
    }
}

/// Transfer relation of the points-to analysis
#[derive(Clone)]
pub struct PointerTransferRelation {
    config: PointerAnalysisConfig,
    offsets: Arc<dyn OffsetOperator>,
}

impl fmt::Debug for PointerTransferRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerTransferRelation")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for PointerTransferRelation {
    fn default() -> Self {
        Self::new(PointerAnalysisConfig::default())
    }
}

impl PointerTransferRelation {
    pub fn new(config: PointerAnalysisConfig) -> Self {
        let offsets = Arc::new(DeclaredOffsetOperator::from_config(&config));
        Self { config, offsets }
    }

    /// Replace the offset model derived from the configuration
    pub fn with_offset_operator(mut self, offsets: Arc<dyn OffsetOperator>) -> Self {
        self.offsets = offsets;
        self
    }

    pub fn config(&self) -> &PointerAnalysisConfig {
        &self.config
    }

    /// Successor state only
    pub fn successor(&self, state: &PointerAnalysisState, edge: &CfaEdge) -> PointerResult<PointerAnalysisState> {
        self.transfer(state, edge).map(|transition| transition.state)
    }

    /// Successor state of `edge`, or an error naming the edge
    pub fn transfer(&self, state: &PointerAnalysisState, edge: &CfaEdge) -> PointerResult<Transition> {
        if state.is_bottom() {
            return Ok(Transition::unchanged(BOTTOM_STATE));
        }
        tracing::debug!(edge = %edge, "Pointer transfer");

        let location = &edge.location;
        let transition = match &edge.kind {
            CfaEdgeKind::Blank => Ok(Transition::unchanged(state.clone())),
            CfaEdgeKind::Declaration(declaration) => self.handle_declaration(state, declaration, location),
            CfaEdgeKind::Statement(statement) => self.handle_statement(state, statement, location),
            CfaEdgeKind::Assume {
                expression,
                truth_assumption,
            } => self.handle_assume(state, expression, *truth_assumption),
            CfaEdgeKind::FunctionCall { call, callee } => self.handle_function_call(state, call, callee, location),
            CfaEdgeKind::ReturnStatement {
                function_name,
                expression,
                return_type,
            } => self.handle_return_statement(state, function_name, expression.as_ref(), return_type, location),
            CfaEdgeKind::FunctionReturn {
                function_name,
                call_statement,
            } => self.handle_function_return(state, function_name, call_statement, location),
        };
        transition.map_err(|err| err.on_edge(edge))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Edge handlers
    // ═══════════════════════════════════════════════════════════════════════

    fn handle_declaration(
        &self,
        state: &PointerAnalysisState,
        declaration: &CDeclaration,
        location: &FileLocation,
    ) -> PointerResult<Transition> {
        let CDeclaration::Variable(variable) = declaration else {
            return Ok(Transition::unchanged(state.clone()));
        };

        // a declaration inside a loop starts over with fresh storage
        let cleared = state.without_variable(&variable.qualified_name);
        let cells = self.declaration_cells(variable);
        let writes = self.resolve_cells(&cleared, cells)?;

        let mut step = Step::new(cleared);
        step.initialize(writes, location);
        Ok(step.finish())
    }

    fn declaration_cells(&self, variable: &CVariableDeclaration) -> Vec<CellWrite> {
        // uninitialized locals hold garbage: leaving them out reads as Top
        if variable.initializer.is_none() && !variable.is_global {
            return Vec::new();
        }
        initializer_cells(
            &variable.as_expression(),
            &variable.ty,
            variable.initializer.as_ref(),
            self.config.offset_sensitive,
        )
    }

    fn handle_statement(
        &self,
        state: &PointerAnalysisState,
        statement: &CStatement,
        location: &FileLocation,
    ) -> PointerResult<Transition> {
        let writes = match statement {
            CStatement::ExpressionAssignment { lhs, rhs } => {
                let cells = copy_cells(lhs, Some(rhs), lhs.ty(), self.config.offset_sensitive);
                self.resolve_cells(state, cells)?
            }
            CStatement::FunctionCallAssignment { lhs, call } if lhs.ty().is_pointer() => {
                let targets = self.resolve(lhs, state, ResolveMode::Address)?;
                vec![PendingWrite {
                    summarized: is_summarized_write(lhs, &targets, &self.config),
                    targets,
                    value: resolve_call_result(call, state),
                }]
            }
            CStatement::FunctionCallAssignment { lhs, .. } => {
                // aggregate returned by a function we did not enter
                let cells = copy_cells(lhs, None, lhs.ty(), self.config.offset_sensitive);
                self.resolve_cells(state, cells)?
            }
            CStatement::ExpressionStatement(_) | CStatement::FunctionCallStatement(_) => Vec::new(),
        };

        let mut step = Step::new(state.clone());
        step.apply(writes, location);
        Ok(step.finish())
    }

    fn handle_assume(
        &self,
        state: &PointerAnalysisState,
        expression: &CExpression,
        truth_assumption: bool,
    ) -> PointerResult<Transition> {
        let Some((lhs, rhs, assumed_equal)) = pointer_comparison(expression, truth_assumption) else {
            return Ok(Transition::unchanged(state.clone()));
        };
        let lhs = self.resolve_operand(&lhs, state)?;
        let rhs = self.resolve_operand(&rhs, state)?;

        let contradicted = if assumed_equal {
            definitely_distinct(&lhs, &rhs)
        } else {
            is_exactly_null(&lhs) && is_exactly_null(&rhs)
        };
        if contradicted {
            tracing::debug!(condition = %expression, truth_assumption, "Assumption contradicts points-to facts");
            return Ok(Transition::infeasible());
        }
        Ok(Transition::unchanged(state.clone()))
    }

    fn handle_function_call(
        &self,
        state: &PointerAnalysisState,
        call: &CFunctionCallExpression,
        callee: &CFunctionDeclaration,
        location: &FileLocation,
    ) -> PointerResult<Transition> {
        let expected = callee.parameters.len();
        let actual = call.arguments.len();
        if actual < expected || (actual > expected && !callee.is_variadic()) {
            return Err(PointerAnalysisError::ArityMismatch {
                function: callee.name.clone(),
                expected,
                actual,
            });
        }

        // arguments see the caller's state, including recursive calls that
        // rebind the caller's own parameters
        let mut cells = Vec::new();
        for (parameter, argument) in callee.parameters.iter().zip(&call.arguments) {
            cells.extend(copy_cells(
                &parameter.as_expression(),
                Some(argument),
                &parameter.ty,
                self.config.offset_sensitive,
            ));
        }
        let writes = self.resolve_cells(state, cells)?;

        let cleared = callee
            .parameters
            .iter()
            .fold(state.clone(), |acc, parameter| acc.without_variable(&parameter.qualified_name));
        let mut step = Step::new(cleared);
        step.initialize(writes, location);
        Ok(step.finish())
    }

    fn handle_return_statement(
        &self,
        state: &PointerAnalysisState,
        function_name: &str,
        expression: Option<&CExpression>,
        return_type: &CType,
        location: &FileLocation,
    ) -> PointerResult<Transition> {
        let Some(expression) = expression else {
            return Ok(Transition::unchanged(state.clone()));
        };
        let return_value = return_value_expression(function_name, return_type);
        let cells = copy_cells(&return_value, Some(expression), return_type, self.config.offset_sensitive);
        let writes = self.resolve_cells(state, cells)?;

        let mut step = Step::new(state.without_variable(&PointerLocation::return_value_name(function_name)));
        step.initialize(writes, location);
        Ok(step.finish())
    }

    fn handle_function_return(
        &self,
        state: &PointerAnalysisState,
        function_name: &str,
        call_statement: &CStatement,
        location: &FileLocation,
    ) -> PointerResult<Transition> {
        let mut step = Step::new(state.clone());
        if let CStatement::FunctionCallAssignment { lhs, .. } = call_statement {
            let return_value = return_value_expression(function_name, lhs.ty());
            let cells = copy_cells(lhs, Some(&return_value), lhs.ty(), self.config.offset_sensitive);
            step.apply(self.resolve_cells(state, cells)?, location);
        }
        if !step.state.is_bottom() {
            step.state = step
                .state
                .without_variable(&PointerLocation::return_value_name(function_name));
        }
        Ok(step.finish())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Resolution
    // ═══════════════════════════════════════════════════════════════════════

    fn resolve(&self, expression: &CExpression, state: &PointerAnalysisState, mode: ResolveMode) -> PointerResult<LocationSet> {
        resolve_expression_with(expression, state, mode, &self.config, self.offsets.as_ref())
    }

    /// Pointer value stored by an assignment; a bare `0` is the null pointer
    fn resolve_value(&self, expression: &CExpression, state: &PointerAnalysisState) -> PointerResult<LocationSet> {
        if expression.is_zero_literal() {
            return Ok(LocationSet::singleton(PointerLocation::Null));
        }
        self.resolve(expression, state, ResolveMode::PointsTo)
    }

    fn resolve_cells(&self, state: &PointerAnalysisState, cells: Vec<CellWrite>) -> PointerResult<Vec<PendingWrite>> {
        cells
            .into_iter()
            .map(|cell| {
                let value = match &cell.value {
                    CellValue::Expression(expression) => self.resolve_value(expression, state)?,
                    CellValue::Null => LocationSet::singleton(PointerLocation::Null),
                    CellValue::Unknown => LocationSet::Top,
                };
                let targets = self.resolve(&cell.target, state, ResolveMode::Address)?;
                Ok(PendingWrite {
                    summarized: is_summarized_write(&cell.target, &targets, &self.config),
                    targets,
                    value,
                })
            })
            .collect()
    }

    fn resolve_operand(&self, operand: &Operand<'_>, state: &PointerAnalysisState) -> PointerResult<LocationSet> {
        match operand {
            Operand::Null => Ok(LocationSet::singleton(PointerLocation::Null)),
            Operand::Expression(expression) => self.resolve(expression, state, ResolveMode::PointsTo),
        }
    }
}

/// Synthetic variable holding the value returned by `function_name`
fn return_value_expression(function_name: &str, ty: &CType) -> CExpression {
    CExpression::id(
        RETURN_VALUE_VARIABLE,
        PointerLocation::return_value_name(function_name),
        ty.clone(),
    )
}

/// Normalizes a branch condition to `(a, b, a == b is assumed)`
///
/// Recognized: `a == b`, `a != b`, a bare pointer (`p` means `p != NULL`) and
/// negations of those. Comparisons not involving pointers yield `None`.
fn pointer_comparison(expression: &CExpression, truth: bool) -> Option<(Operand<'_>, Operand<'_>, bool)> {
    match expression {
        CExpression::Binary {
            operator: operator @ (BinaryOperator::Equals | BinaryOperator::NotEquals),
            lhs,
            rhs,
            ..
        } => {
            if !is_pointer_operand(lhs) && !is_pointer_operand(rhs) {
                return None;
            }
            let equal = (*operator == BinaryOperator::Equals) == truth;
            Some((Operand::of(lhs), Operand::of(rhs), equal))
        }
        CExpression::Unary {
            operator: UnaryOperator::Not,
            operand,
            ..
        } => pointer_comparison(operand, !truth),
        _ if is_pointer_operand(expression) => Some((Operand::Expression(expression), Operand::Null, !truth)),
        _ => None,
    }
}

fn is_pointer_operand(expression: &CExpression) -> bool {
    expression.ty().is_pointer_or_array()
}

/// Both sets are exact and no member of one can share an address with a
/// member of the other
///
/// Distinct locations of one variable may still start at the same address
/// (`&s` and `&s.first`, or two offsets of a reinterpreted array), so only
/// locations in different variables count as apart.
fn definitely_distinct(a: &LocationSet, b: &LocationSet) -> bool {
    let exact = |set: &LocationSet| set.is_explicit() && !set.iter().any(PointerLocation::is_invalid);
    exact(a) && exact(b) && !a.may_overlap(b) && !shares_storage(a, b)
}

fn shares_storage(a: &LocationSet, b: &LocationSet) -> bool {
    a.iter()
        .filter_map(PointerLocation::storage_root)
        .any(|root| b.iter().filter_map(PointerLocation::storage_root).any(|other| other == root))
}

fn is_exactly_null(set: &LocationSet) -> bool {
    set.single_location().is_some_and(PointerLocation::is_null)
}
