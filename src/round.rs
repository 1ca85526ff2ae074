use crate::{
    approx,
    deadline::{CancelToken, Deadline, ThreadClock},
    exact::{minimum_cover, SearchMode, SearchOutcome},
    sat::SatSolver,
    Cover, Error, Graph,
};
use log::{debug, info};
use std::{
    fmt,
    sync::mpsc,
    thread::{self, Scope, ScopedJoinHandle},
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    /// CPU time each exact search may use.
    pub cpu_limit: Duration,
    /// How often a watcher samples its worker's clock.
    pub poll_interval: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        RoundConfig {
            cpu_limit: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub direct: SearchOutcome,
    pub three_cnf: SearchOutcome,
    pub approx1: Cover,
    pub approx2: Cover,
    pub refined1: Cover,
    pub refined2: Cover,
}

impl RoundResult {
    /// Label and text of every line, in output order.
    pub fn lines(&self) -> [(&'static str, String); 6] {
        [
            (SearchMode::Direct.label(), self.direct.to_string()),
            (SearchMode::ThreeCnf.label(), self.three_cnf.to_string()),
            ("APPROX-VC-1", self.approx1.format()),
            ("APPROX-VC-2", self.approx2.format()),
            ("REFINED-APPROX-VC-1", self.refined1.format()),
            ("REFINED-APPROX-VC-2", self.refined2.format()),
        ]
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.lines() {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

struct ExactTask<'scope> {
    name: &'static str,
    worker: ScopedJoinHandle<'scope, Result<SearchOutcome, Error>>,
    watcher: ScopedJoinHandle<'scope, ()>,
}

impl ExactTask<'_> {
    fn join(self) -> Result<SearchOutcome, Error> {
        let outcome = join(self.name, self.worker)?;
        join(self.name, self.watcher)?;
        outcome
    }
}

fn join<T>(name: &'static str, handle: ScopedJoinHandle<'_, T>) -> Result<T, Error> {
    handle.join().map_err(|_| Error::TaskPanicked(name))
}

pub struct Orchestrator<F> {
    config: RoundConfig,
    new_solver: F,
}

impl<F, S> Orchestrator<F>
where
    F: Fn() -> S + Sync,
    S: SatSolver,
{
    pub fn new(config: RoundConfig, new_solver: F) -> Orchestrator<F> {
        Orchestrator { config, new_solver }
    }

    fn spawn_exact<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        graph: &'env Graph,
        mode: SearchMode,
        token: &'env CancelToken,
    ) -> ExactTask<'scope> {
        let name = mode.label();
        let deadline = Deadline::new(self.config.cpu_limit, self.config.poll_interval);
        let (clock_tx, clock_rx) = mpsc::channel();

        let watcher = scope.spawn(move || {
            deadline.watch(name, clock_rx, token);
        });
        let worker = scope.spawn(move || {
            let clock = ThreadClock::current().map_err(Error::CpuClock)?;
            // the watcher only goes away after we hang up
            let _ = clock_tx.send(clock);
            let outcome = minimum_cover(graph, mode, &self.new_solver, token);
            drop(clock_tx);
            outcome
        });
        ExactTask {
            name,
            worker,
            watcher,
        }
    }

    /// Runs every computation for `graph` and waits for all of them.
    pub fn run(&self, graph: &Graph) -> Result<RoundResult, Error> {
        info!(
            "round: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edges().len()
        );
        let tokens = [CancelToken::new(), CancelToken::new()];

        let result = thread::scope(|scope| {
            let direct = self.spawn_exact(scope, graph, SearchMode::Direct, &tokens[0]);
            let three_cnf = self.spawn_exact(scope, graph, SearchMode::ThreeCnf, &tokens[1]);
            let approx1 = scope.spawn(|| approx::greedy_degree(graph));
            let approx2 = scope.spawn(|| approx::greedy_edge_scan(graph));
            let refined1 = scope.spawn(|| approx::refined_greedy_degree(graph));
            let refined2 = scope.spawn(|| approx::refined_greedy_edge_scan(graph));

            // join everything before looking at any result
            let joined = (
                direct.join(),
                three_cnf.join(),
                join("APPROX-VC-1", approx1),
                join("APPROX-VC-2", approx2),
                join("REFINED-APPROX-VC-1", refined1),
                join("REFINED-APPROX-VC-2", refined2),
            );
            Ok::<_, Error>(RoundResult {
                direct: joined.0?,
                three_cnf: joined.1?,
                approx1: joined.2?,
                approx2: joined.3?,
                refined1: joined.4?,
                refined2: joined.5?,
            })
        })?;

        debug!(
            "round done: exact {:?}/{:?}, approx {}/{}, refined {}/{}",
            result.direct.cover().map(Cover::len),
            result.three_cnf.cover().map(Cover::len),
            result.approx1.len(),
            result.approx2.len(),
            result.refined1.len(),
            result.refined2.len(),
        );
        Ok(result)
    }
}
