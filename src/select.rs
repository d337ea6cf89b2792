//! Set-partition selection of candidate routes.

use crate::error::{Error, Result};
use crate::plan::Plan;
use crate::problem::{NodeId, Problem};
use crate::route::{Route, TruckType};
use log::{debug, info, warn};
use std::collections::HashMap;

const EPSILON: f64 = 1e-9;

/// Binary program: minimise `objective · x` subject to every partition row
/// summing to exactly one and the limited columns summing to at most `limit`.
#[derive(Debug, Clone)]
pub struct IntegerProgram {
    /// Cost coefficient of each column
    pub objective: Vec<f64>,
    /// For each equality row, the columns with a 1 in that row
    pub partition_rows: Vec<Vec<usize>>,
    /// Columns counted by the single `<=` row
    pub limited_columns: Vec<usize>,
    /// Right-hand side of the `<=` row
    pub limit: usize,
}

impl IntegerProgram {
    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.objective.len()
    }

    /// Objective value of a set of selected columns.
    pub fn evaluate(&self, selected: &[usize]) -> f64 {
        selected.iter().map(|&c| self.objective[c]).sum()
    }
}

/// Assignment returned by a solver.
#[derive(Debug, Clone)]
pub struct IpSolution {
    /// Columns set to one
    pub selected: Vec<usize>,
    /// Objective value of the assignment
    pub objective: f64,
    /// False when the search stopped early and this is only the best found
    pub optimal: bool,
}

/// Why a solver returned no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveFailure {
    /// The whole search space was explored and no assignment satisfies every row
    Infeasible,
    /// The search stopped on its node limit before finding any assignment
    NodeLimit { nodes: usize },
}

/// Something able to solve an [`IntegerProgram`].
pub trait IntegerProgramSolver {
    fn solve(&self, program: &IntegerProgram) -> std::result::Result<IpSolution, SolveFailure>;
}

/// Exact depth-first branch and bound for set-partition programs.
///
/// Branches on the uncovered row with the fewest columns still compatible,
/// trying cheaper columns first. A node is pruned when the incumbent is not
/// beaten by the cost so far plus, for every uncovered row, the smallest
/// per-row share `cost / rows covered` among its compatible columns.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    pub node_limit: Option<usize>,
}

impl BranchAndBound {
    pub fn new() -> Self {
        BranchAndBound::default()
    }

    pub fn with_node_limit(node_limit: Option<usize>) -> Self {
        BranchAndBound { node_limit }
    }
}

impl IntegerProgramSolver for BranchAndBound {
    fn solve(&self, program: &IntegerProgram) -> std::result::Result<IpSolution, SolveFailure> {
        let mut search = Search::new(program, self.node_limit);
        search.explore();

        if search.exhausted {
            warn!(
                "branch and bound stopped after {} nodes, keeping best plan found",
                search.nodes
            );
        } else {
            debug!("branch and bound explored {} nodes", search.nodes);
        }

        match search.best {
            Some((selected, objective)) => Ok(IpSolution {
                selected,
                objective,
                optimal: !search.exhausted,
            }),
            None if search.exhausted => Err(SolveFailure::NodeLimit {
                nodes: search.nodes,
            }),
            None => Err(SolveFailure::Infeasible),
        }
    }
}

/// Mutable state of one branch-and-bound run.
struct Search<'a> {
    program: &'a IntegerProgram,
    column_rows: Vec<Vec<usize>>,
    column_limited: Vec<bool>,
    row_columns: Vec<Vec<usize>>,
    covered: Vec<bool>,
    uncovered: usize,
    limited_used: usize,
    chosen: Vec<usize>,
    cost: f64,
    best: Option<(Vec<usize>, f64)>,
    nodes: usize,
    node_limit: Option<usize>,
    exhausted: bool,
}

impl<'a> Search<'a> {
    fn new(program: &'a IntegerProgram, node_limit: Option<usize>) -> Self {
        let columns = program.column_count();
        let mut column_rows = vec![Vec::new(); columns];
        for (row, cols) in program.partition_rows.iter().enumerate() {
            for &col in cols {
                column_rows[col].push(row);
            }
        }

        let mut column_limited = vec![false; columns];
        for &col in &program.limited_columns {
            column_limited[col] = true;
        }

        // Cheaper columns first so the first dive gives a good incumbent.
        let row_columns = program
            .partition_rows
            .iter()
            .map(|cols| {
                let mut cols = cols.clone();
                cols.sort_by(|&a, &b| program.objective[a].total_cmp(&program.objective[b]));
                cols
            })
            .collect();

        let rows = program.partition_rows.len();
        Search {
            program,
            column_rows,
            column_limited,
            row_columns,
            covered: vec![false; rows],
            uncovered: rows,
            limited_used: 0,
            chosen: Vec::new(),
            cost: 0.0,
            best: None,
            nodes: 0,
            node_limit,
            exhausted: false,
        }
    }

    fn best_cost(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |(_, cost)| *cost)
    }

    fn is_compatible(&self, col: usize) -> bool {
        if self.column_limited[col] && self.limited_used >= self.program.limit {
            return false;
        }
        let rows = &self.column_rows[col];
        !rows.is_empty() && rows.iter().all(|&r| !self.covered[r])
    }

    fn explore(&mut self) {
        self.nodes += 1;
        if let Some(limit) = self.node_limit {
            if self.nodes > limit {
                self.exhausted = true;
                return;
            }
        }

        if self.uncovered == 0 {
            if self.cost < self.best_cost() - EPSILON {
                self.best = Some((self.chosen.clone(), self.cost));
            }
            return;
        }

        let mut bound = self.cost;
        let mut branch_row = None;
        let mut fewest = usize::MAX;

        for row in 0..self.covered.len() {
            if self.covered[row] {
                continue;
            }

            let mut count = 0;
            let mut share = f64::INFINITY;
            for &col in &self.row_columns[row] {
                if self.is_compatible(col) {
                    count += 1;
                    let rows = self.column_rows[col].len() as f64;
                    share = share.min(self.program.objective[col] / rows);
                }
            }

            if count == 0 {
                return;
            }

            bound += share;
            if count < fewest {
                fewest = count;
                branch_row = Some(row);
            }
        }

        if bound >= self.best_cost() - EPSILON {
            return;
        }

        let Some(row) = branch_row else {
            return;
        };

        let columns = self.row_columns[row].clone();
        for col in columns {
            if !self.is_compatible(col) {
                continue;
            }
            if self.cost + self.program.objective[col] >= self.best_cost() - EPSILON {
                continue;
            }

            self.apply(col);
            self.explore();
            self.undo(col);

            if self.exhausted {
                return;
            }
        }
    }

    fn apply(&mut self, col: usize) {
        for &row in &self.column_rows[col] {
            self.covered[row] = true;
        }
        self.uncovered -= self.column_rows[col].len();
        if self.column_limited[col] {
            self.limited_used += 1;
        }
        self.cost += self.program.objective[col];
        self.chosen.push(col);
    }

    fn undo(&mut self, col: usize) {
        for &row in &self.column_rows[col] {
            self.covered[row] = false;
        }
        self.uncovered += self.column_rows[col].len();
        if self.column_limited[col] {
            self.limited_used -= 1;
        }
        self.cost -= self.program.objective[col];
        self.chosen.pop();
    }
}

/// Outcome of a selection.
#[derive(Debug, Clone)]
pub struct Selection {
    pub plan: Plan,
    /// Route costs plus the per-route penalty
    pub objective: f64,
    /// False when the solver stopped on its node limit
    pub optimal: bool,
}

/// Picks a minimum-cost subset of candidates covering every store exactly once.
///
/// Every candidate contributes two columns, its owned variant at `2i` and its
/// leased variant at `2i + 1`; only owned columns count against the fleet limit.
pub struct RouteSelector<S: IntegerProgramSolver = BranchAndBound> {
    solver: S,
    route_penalty: f64,
}

impl<S: IntegerProgramSolver> RouteSelector<S> {
    pub fn new(solver: S, route_penalty: f64) -> Self {
        RouteSelector {
            solver,
            route_penalty,
        }
    }

    /// Build the binary program for the candidates.
    ///
    /// Candidates visiting a store outside `stores` get columns that appear in
    /// no row, so the solver never selects them.
    pub fn formulate(
        &self,
        candidates: &[Route],
        stores: &[NodeId],
        owned_limit: usize,
    ) -> IntegerProgram {
        let mut objective = Vec::with_capacity(candidates.len() * 2);
        let mut limited_columns = Vec::with_capacity(candidates.len());

        for (i, route) in candidates.iter().enumerate() {
            objective.push(route.owned_cost + self.route_penalty);
            objective.push(route.leased_cost + self.route_penalty);
            limited_columns.push(2 * i);
        }

        let row_of: HashMap<NodeId, usize> = stores
            .iter()
            .enumerate()
            .map(|(row, &store)| (store, row))
            .collect();
        let mut partition_rows = vec![Vec::new(); stores.len()];

        for (i, route) in candidates.iter().enumerate() {
            if route.stores().iter().any(|s| !row_of.contains_key(s)) {
                continue;
            }
            for store in route.stores() {
                if let Some(&row) = row_of.get(store) {
                    partition_rows[row].push(2 * i);
                    partition_rows[row].push(2 * i + 1);
                }
            }
        }

        IntegerProgram {
            objective,
            partition_rows,
            limited_columns,
            limit: owned_limit,
        }
    }

    /// Select routes for `stores` with at most `trucks * shifts_per_truck` owned routes.
    pub fn select(
        &self,
        candidates: &[Route],
        stores: &[NodeId],
        problem: &Problem,
        trucks: usize,
        shifts_per_truck: usize,
    ) -> Result<Selection> {
        let owned_limit = trucks * shifts_per_truck;
        let program = self.formulate(candidates, stores, owned_limit);

        if let Some(row) = program.partition_rows.iter().position(|cols| cols.is_empty()) {
            return Err(Error::UncoveredStore {
                store: problem.node_name(stores[row]).to_string(),
            });
        }

        let solution = self.solver.solve(&program).map_err(|failure| match failure {
            SolveFailure::Infeasible => Error::SolverInfeasible { owned_limit },
            SolveFailure::NodeLimit { nodes } => Error::SearchLimitReached { nodes },
        })?;

        let mut selected = solution.selected.clone();
        selected.sort_unstable();
        let routes: Vec<Route> = selected
            .iter()
            .map(|&col| {
                let truck = if col % 2 == 0 {
                    TruckType::Owned
                } else {
                    TruckType::Leased
                };
                candidates[col / 2].with_truck(truck)
            })
            .collect();

        let plan = Plan::new(routes);
        info!(
            "selected {} routes ({} owned, {} leased), objective {:.2}",
            plan.get_route_count(),
            plan.owned_count(),
            plan.leased_count(),
            solution.objective
        );

        Ok(Selection {
            plan,
            objective: solution.objective,
            optimal: solution.optimal,
        })
    }
}
