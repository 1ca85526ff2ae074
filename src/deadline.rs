use log::{debug, info, warn};
use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, TryRecvError},
    },
    time::Duration,
};

/// Cooperative stop request. One per search per round.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// CPU time consumed by one thread, readable from any thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadClock {
    #[cfg(target_os = "linux")]
    id: libc::clockid_t,
    #[cfg(not(target_os = "linux"))]
    started: std::time::Instant,
}

#[cfg(target_os = "linux")]
impl ThreadClock {
    /// Clock of the calling thread.
    pub fn current() -> io::Result<ThreadClock> {
        let mut id: libc::clockid_t = 0;
        // SAFETY: `id` is a valid out pointer and `pthread_self` is always a live thread.
        let rc = unsafe { libc::pthread_getcpuclockid(libc::pthread_self(), &mut id) };
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        Ok(ThreadClock { id })
    }

    pub fn elapsed(&self) -> io::Result<Duration> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid out pointer.
        if unsafe { libc::clock_gettime(self.id, &mut ts) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }
}

// Without per-thread cpu clocks, fall back to wall time since the worker started.
#[cfg(not(target_os = "linux"))]
impl ThreadClock {
    pub fn current() -> io::Result<ThreadClock> {
        Ok(ThreadClock {
            started: std::time::Instant::now(),
        })
    }

    pub fn elapsed(&self) -> io::Result<Duration> {
        Ok(self.started.elapsed())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The worker finished (or never reported a clock) within its budget.
    Finished,
    Cancelled,
    /// The clock of a still running worker could not be read.
    ClockLost,
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    limit: Duration,
    poll: Duration,
}

impl Deadline {
    pub fn new(limit: Duration, poll: Duration) -> Deadline {
        Deadline {
            limit,
            poll: poll.max(Duration::from_millis(1)),
        }
    }

    /// Watches the worker on the other end of `clock`, which sends its
    /// [`ThreadClock`] once and hangs up when done. Sleeps on the channel
    /// between samples and sets `token` once the worker has used up its
    /// budget.
    pub fn watch(
        &self,
        name: &str,
        clock: Receiver<ThreadClock>,
        token: &CancelToken,
    ) -> WatchOutcome {
        let Ok(worker) = clock.recv() else {
            debug!("{name}: worker exited before reporting its clock");
            return WatchOutcome::Finished;
        };
        loop {
            // an exited thread's clock id is no longer valid
            if hung_up(&clock) {
                debug!("{name}: finished");
                return WatchOutcome::Finished;
            }
            let used = match worker.elapsed() {
                Ok(used) => used,
                Err(_) if hung_up(&clock) => {
                    debug!("{name}: finished");
                    return WatchOutcome::Finished;
                }
                Err(err) => {
                    warn!("{name}: cpu clock unreadable, no longer watching: {err}");
                    return WatchOutcome::ClockLost;
                }
            };
            if used >= self.limit {
                info!("{name}: used {used:?} of cpu time, cancelling");
                token.cancel();
                return WatchOutcome::Cancelled;
            }
            let wait = self.poll.min(self.limit - used);
            match clock.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(_) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("{name}: finished after {used:?} of cpu time");
                    return WatchOutcome::Finished;
                }
            }
        }
    }
}

/// A second clock is never sent, so anything but an empty channel means the
/// worker is done.
fn hung_up(clock: &Receiver<ThreadClock>) -> bool {
    !matches!(clock.try_recv(), Err(TryRecvError::Empty))
}
