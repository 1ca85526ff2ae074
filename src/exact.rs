use crate::{
    cnf::{encode, encode_3cnf, Formula, Slots},
    deadline::CancelToken,
    sat::SatSolver,
    Bits, Cover, Error, Graph,
};
use bitvec::prelude::*;
use log::{debug, info};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Direct,
    ThreeCnf,
}

impl SearchMode {
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Direct => "CNF-SAT-VC",
            SearchMode::ThreeCnf => "CNF-3-SAT-VC",
        }
    }

    pub fn encode(self, graph: &Graph, k: u32) -> Formula {
        match self {
            SearchMode::Direct => encode(graph, k),
            SearchMode::ThreeCnf => encode_3cnf(graph, k),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Cover),
    TimedOut,
}

impl SearchOutcome {
    pub fn cover(&self) -> Option<&Cover> {
        match self {
            SearchOutcome::Found(cover) => Some(cover),
            SearchOutcome::TimedOut => None,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found(cover) => write!(f, "{cover}"),
            SearchOutcome::TimedOut => f.write_str("timeout"),
        }
    }
}

/// Loads `formula` into a fresh solver and solves it.
pub fn solve<S: SatSolver>(formula: &Formula, solver: &mut S) -> Result<bool, Error> {
    solver.new_vars(formula.variables());
    for clause in formula.clauses() {
        solver.add_clause(clause);
    }
    solver.solve()
}

fn decode<S: SatSolver>(solver: &S, graph: &Graph, k: u32) -> Cover {
    let slots = Slots::new(graph.vertex_count(), k);
    let mut selected: Bits = bitvec![usize, Lsb0; 0; graph.vertex_count() as usize];
    for v in 0..graph.vertex_count() {
        if (0..k).any(|p| solver.value(slots.var(v, p)) == Some(true)) {
            selected.set(v as usize, true);
        }
    }
    Cover::from(selected)
}

/// Checks `cancel` before every `k`. A solver call already running is not
/// interrupted.
pub fn minimum_cover<S, F>(
    graph: &Graph,
    mode: SearchMode,
    new_solver: F,
    cancel: &CancelToken,
) -> Result<SearchOutcome, Error>
where
    S: SatSolver,
    F: Fn() -> S,
{
    for k in 0..=graph.vertex_count() {
        if cancel.is_cancelled() {
            info!("{mode}: cancelled before k = {k}");
            return Ok(SearchOutcome::TimedOut);
        }
        let formula = mode.encode(graph, k);
        if formula.has_empty_clause() {
            debug!("{mode}: k = {k} has an empty clause, skipping");
            continue;
        }
        debug!(
            "{mode}: k = {k}, {} variables, {} clauses",
            formula.variables(),
            formula.clauses().len()
        );
        let mut solver = new_solver();
        if solve(&formula, &mut solver)? {
            let cover = decode(&solver, graph, k);
            debug_assert_eq!(cover.len(), k as usize);
            debug_assert!(graph.validate_cover(&cover));
            info!("{mode}: minimum cover has {k} vertices");
            return Ok(SearchOutcome::Found(cover));
        }
    }
    Err(Error::SearchExhausted {
        mode,
        vertices: graph.vertex_count(),
    })
}
