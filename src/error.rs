use crate::{exact::SearchMode, parse::ParseError};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("sat solver failed: {0}")]
    Solver(String),
    /// A cover of size `vertices` always exists, so this means the encoder
    /// or the solver integration is broken.
    #[error("{mode} search found no satisfiable cover size in 0..={vertices}")]
    SearchExhausted { mode: SearchMode, vertices: u32 },
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
    #[error("unable to read thread cpu clock: {0}")]
    CpuClock(#[source] io::Error),
}
