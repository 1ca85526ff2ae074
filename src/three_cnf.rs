use crate::cnf::{Clause, Formula, Lit};
use smallvec::smallvec;

pub struct ThreeCnf {
    base: u32,
    next: u32,
}

/// Auxiliary variables needed to rewrite `formula`.
pub fn aux_required(formula: &Formula) -> u32 {
    formula
        .clauses()
        .iter()
        .filter(|clause| clause.len() > 3)
        .map(|clause| clause.len() as u32 - 1)
        .sum()
}

impl ThreeCnf {
    /// `base` is the first index not used by the formula's own variables.
    pub fn new(base: u32) -> ThreeCnf {
        ThreeCnf { base, next: base }
    }

    /// Auxiliaries handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next - self.base
    }

    fn fresh(&mut self) -> Lit {
        let lit = Lit::positive(self.next);
        self.next += 1;
        lit
    }

    /// Appends the chain for `clause` to `out`. Auxiliary `ai` is true when
    /// one of the first `i + 1` literals is.
    pub fn chain(&mut self, clause: &[Lit], out: &mut Vec<Clause>) {
        let n = clause.len();
        if n <= 3 {
            out.push(Clause::from_slice(clause));
            return;
        }
        let mut aux = self.fresh();
        out.push(smallvec![clause[0], aux]);
        for &lit in &clause[1..n - 1] {
            let prev = aux;
            aux = self.fresh();
            out.push(smallvec![!prev, lit, aux]);
        }
        out.push(smallvec![!aux, clause[n - 1]]);
    }

    pub fn transform(mut self, formula: Formula) -> Formula {
        let needed = aux_required(&formula);
        let (variables, clauses) = formula.into_parts();
        debug_assert!(variables <= self.base);

        let mut out = Vec::with_capacity(clauses.len());
        for clause in &clauses {
            self.chain(clause, &mut out);
        }
        debug_assert_eq!(self.allocated(), needed);
        Formula::from_parts(self.base + needed, out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{cnf::encode, test::cycle4};

    fn wide(n: u32) -> Formula {
        let mut formula = Formula::new(n);
        formula.add_clause((0..n).map(Lit::positive));
        formula
    }

    /// Whether some assignment of the auxiliaries satisfies `formula` with the
    /// first `outer` variables fixed to the bits of `fixed`.
    fn satisfiable(formula: &Formula, fixed: u32, outer: u32) -> bool {
        let aux = formula.variables() - outer;
        (0u32..1 << aux).any(|bits| {
            formula.eval(|var| {
                if var < outer {
                    fixed & (1 << var) != 0
                } else {
                    bits & (1 << (var - outer)) != 0
                }
            })
        })
    }

    #[test]
    fn test_narrow_clauses_pass_through() {
        let mut formula = Formula::new(3);
        formula.add_clause([Lit::positive(0)]);
        formula.add_clause([Lit::negative(0), Lit::positive(1)]);
        formula.add_clause([Lit::positive(0), Lit::negative(1), Lit::positive(2)]);
        let transformed = ThreeCnf::new(3).transform(formula.clone());
        assert_eq!(transformed, formula);
    }

    #[test]
    fn test_width_four_chain() {
        let transformed = ThreeCnf::new(4).transform(wide(4));
        assert_eq!(transformed.variables(), 4 + 3);
        let clauses: Vec<Vec<Lit>> = transformed
            .clauses()
            .iter()
            .map(|clause| clause.to_vec())
            .collect();
        assert_eq!(
            clauses,
            vec![
                vec![Lit::positive(0), Lit::positive(4)],
                vec![Lit::negative(4), Lit::positive(1), Lit::positive(5)],
                vec![Lit::negative(5), Lit::positive(2), Lit::positive(6)],
                vec![Lit::negative(6), Lit::positive(3)],
            ]
        );
    }

    #[test]
    fn test_counter_shared_across_clauses() {
        let mut formula = Formula::new(10);
        formula.add_clause((0..5).map(Lit::positive));
        formula.add_clause([Lit::positive(0), Lit::positive(1)]);
        formula.add_clause((5..10).map(Lit::negative));
        let transformed = ThreeCnf::new(10).transform(formula);

        assert_eq!(transformed.variables(), 10 + 4 + 4);
        assert!(transformed.max_width() <= 3);
        let aux_of = |range: std::ops::Range<usize>| -> Vec<u32> {
            let mut vars: Vec<u32> = transformed.clauses()[range]
                .iter()
                .flatten()
                .map(|lit| lit.var())
                .filter(|&var| var >= 10)
                .collect();
            vars.sort_unstable();
            vars.dedup();
            vars
        };
        assert_eq!(aux_of(0..5), vec![10, 11, 12, 13]);
        assert_eq!(transformed.clauses()[5].len(), 2);
        assert_eq!(aux_of(6..11), vec![14, 15, 16, 17]);
    }

    #[test]
    fn test_chain_matches_clause_for_every_assignment() {
        for n in 4..=10 {
            let original = wide(n);
            let transformed = ThreeCnf::new(n).transform(original.clone());
            assert_eq!(transformed.variables(), 2 * n - 1);
            for fixed in 0u32..1 << n {
                let expected = original.eval(|var| fixed & (1 << var) != 0);
                assert_eq!(
                    satisfiable(&transformed, fixed, n),
                    expected,
                    "width {n}, assignment {fixed:b}"
                );
            }
        }
    }

    #[test]
    fn test_pool_grows_with_graph() {
        let graph = cycle4();
        for k in 0..=4 {
            let formula = encode(&graph, k);
            let needed = aux_required(&formula);
            let transformed = ThreeCnf::new(formula.variables()).transform(formula);
            assert_eq!(transformed.variables(), graph.vertex_count() * k + needed);
            assert!(transformed.max_width() <= 3);
        }
    }
}
