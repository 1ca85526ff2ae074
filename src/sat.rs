use crate::{cnf::Lit, Bits, Error};
use bitvec::prelude::*;
use varisat::ExtendFormula;

pub trait SatSolver {
    /// Allocates `count` fresh variables after the existing ones.
    fn new_vars(&mut self, count: u32);
    fn add_clause(&mut self, clause: &[Lit]);
    fn solve(&mut self) -> Result<bool, Error>;
    /// Assigned value of `var` after a satisfiable [`SatSolver::solve`].
    fn value(&self, var: u32) -> Option<bool>;
}

pub struct Varisat {
    solver: varisat::Solver<'static>,
    variables: u32,
    model: Option<Bits>,
}

impl Default for Varisat {
    fn default() -> Self {
        Varisat {
            solver: varisat::Solver::new(),
            variables: 0,
            model: None,
        }
    }
}

impl Varisat {
    pub fn new() -> Varisat {
        Varisat::default()
    }
}

impl SatSolver for Varisat {
    fn new_vars(&mut self, count: u32) {
        for _ in 0..count {
            self.solver.new_var();
        }
        self.variables += count;
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        let lits: Vec<varisat::Lit> = clause
            .iter()
            .map(|lit| {
                debug_assert!(lit.var() < self.variables);
                varisat::Lit::from_index(lit.var() as usize, lit.is_positive())
            })
            .collect();
        self.solver.add_clause(&lits);
    }

    fn solve(&mut self) -> Result<bool, Error> {
        self.model = None;
        let satisfiable = self
            .solver
            .solve()
            .map_err(|err| Error::Solver(err.to_string()))?;
        if satisfiable {
            let mut model = bitvec![usize, Lsb0; 0; self.variables as usize];
            for lit in self.solver.model().unwrap_or_default() {
                if lit.is_positive() && lit.index() < model.len() {
                    model.set(lit.index(), true);
                }
            }
            self.model = Some(model);
        }
        Ok(satisfiable)
    }

    fn value(&self, var: u32) -> Option<bool> {
        self.model
            .as_ref()
            .and_then(|model| model.get(var as usize).map(|bit| *bit))
    }
}
