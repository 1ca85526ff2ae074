use crate::{three_cnf::ThreeCnf, Graph};
use smallvec::SmallVec;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    var: u32,
    negated: bool,
}

impl Lit {
    pub fn positive(var: u32) -> Lit {
        Lit {
            var,
            negated: false,
        }
    }

    pub fn negative(var: u32) -> Lit {
        Lit { var, negated: true }
    }

    pub fn var(self) -> u32 {
        self.var
    }

    pub fn is_positive(self) -> bool {
        !self.negated
    }

    /// Truth value of the literal under `assignment`.
    pub fn eval(self, assignment: impl Fn(u32) -> bool) -> bool {
        assignment(self.var) != self.negated
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit {
            var: self.var,
            negated: !self.negated,
        }
    }
}

pub type Clause = SmallVec<[Lit; 3]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formula {
    variables: u32,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new(variables: u32) -> Formula {
        Formula {
            variables,
            clauses: Vec::new(),
        }
    }

    pub fn variables(&self) -> u32 {
        self.variables
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = Lit>) {
        let clause: Clause = clause.into_iter().collect();
        debug_assert!(clause.iter().all(|lit| lit.var < self.variables));
        self.clauses.push(clause);
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(|clause| clause.is_empty())
    }

    pub fn max_width(&self) -> usize {
        self.clauses.iter().map(|clause| clause.len()).max().unwrap_or(0)
    }

    /// Whether every clause holds under `assignment`.
    pub fn eval(&self, assignment: impl Fn(u32) -> bool + Copy) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|lit| lit.eval(assignment)))
    }

    pub(crate) fn into_parts(self) -> (u32, Vec<Clause>) {
        (self.variables, self.clauses)
    }

    pub(crate) fn from_parts(variables: u32, clauses: Vec<Clause>) -> Formula {
        Formula { variables, clauses }
    }
}

/// Maps "vertex sits in slot" to a variable index.
#[derive(Debug, Clone, Copy)]
pub struct Slots {
    vertices: u32,
    k: u32,
}

impl Slots {
    pub fn new(vertices: u32, k: u32) -> Slots {
        Slots { vertices, k }
    }

    pub fn var(&self, vertex: u32, position: u32) -> u32 {
        debug_assert!(vertex < self.vertices && position < self.k);
        vertex * self.k + position
    }

    pub fn count(&self) -> u32 {
        self.vertices * self.k
    }
}

/// Variable `v * k + p` means vertex `v` fills slot `p` of a cover of size `k`.
pub fn encode(graph: &Graph, k: u32) -> Formula {
    let n = graph.vertex_count();
    let slots = Slots::new(n, k);
    let mut formula = Formula::new(slots.count());

    for p in 0..k {
        formula.add_clause((0..n).map(|v| Lit::positive(slots.var(v, p))));
    }

    for v in 0..n {
        for q in 0..k {
            for p in 0..q {
                formula.add_clause([
                    Lit::negative(slots.var(v, p)),
                    Lit::negative(slots.var(v, q)),
                ]);
            }
        }
    }

    for p in 0..k {
        for w in 0..n {
            for v in 0..w {
                formula.add_clause([
                    Lit::negative(slots.var(v, p)),
                    Lit::negative(slots.var(w, p)),
                ]);
            }
        }
    }

    for &(i, j) in graph.edges() {
        formula.add_clause((0..k).flat_map(|p| {
            [
                Lit::positive(slots.var(i, p)),
                Lit::positive(slots.var(j, p)),
            ]
        }));
    }

    formula
}

/// [`encode`] with every clause narrowed to at most three literals.
pub fn encode_3cnf(graph: &Graph, k: u32) -> Formula {
    let formula = encode(graph, k);
    ThreeCnf::new(formula.variables()).transform(formula)
}
