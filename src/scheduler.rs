//! Spreads frame jobs over a bounded pool of scoped threads.
//!
//! Every frame is independent, so workers share nothing but the list
//! of frame indices still to do.  Two policies are offered:
//!
//! * `BatchBarrier` (the default) cuts the frames into batches of at
//!   most `capacity`, starts every job of a batch at once, and waits
//!   for the whole batch before starting the next.  A slow frame stalls
//!   its batch, but peak resource use is easy to reason about.
//!
//! * `WorkQueue` starts `capacity` threads that each pull the next
//!   frame index off a shared iterator until it runs dry.
//!
//! Both produce the same frames; completion order is never exposed,
//! as results come back sorted by frame index.

extern crate crossbeam;

use crossbeam::thread::ScopedJoinHandle;
use errors::RenderError;
use std::any::Any;
use std::iter::Cloned;
use std::panic::{self, AssertUnwindSafe};
use std::slice::Iter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The frames not yet handed out, and every frame a worker has taken.
type FrameQueue<'a> = Mutex<(Cloned<Iter<'a, usize>>, Vec<usize>)>;

/// How frames are handed out to workers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Fixed batches with a join-all barrier between them.
    BatchBarrier,
    /// Workers pull frames from a shared queue.
    WorkQueue,
}

impl Default for Policy {
    fn default() -> Self {
        Policy::BatchBarrier
    }
}

/// A cooperative cancellation flag.  Clones share the flag.  It is
/// checked before each frame starts; a frame already running is
/// allowed to finish.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Ask every holder of this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one frame.
enum Attempt<T> {
    Done(T),
    Failed(String),
    Skipped,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Run one job, turning both errors and panics into a failed attempt.
fn attempt<T, F>(job: &F, index: usize, cancel: &CancelToken) -> Attempt<T>
where
    F: Fn(usize) -> Result<T, RenderError>,
{
    if cancel.is_cancelled() {
        return Attempt::Skipped;
    }
    match panic::catch_unwind(AssertUnwindSafe(|| job(index))) {
        Ok(Ok(value)) => Attempt::Done(value),
        Ok(Err(err)) => Attempt::Failed(err.to_string()),
        Err(payload) => Attempt::Failed(panic_message(&*payload)),
    }
}

/// Frames that a worker took but never reported on were lost with the
/// worker; record each as failed with the worker's panic message.
fn reclaim_lost<T>(taken: &[usize], attempts: &mut Vec<(usize, Attempt<T>)>, why: &str) {
    let lost: Vec<usize> = taken
        .iter()
        .cloned()
        .filter(|index| !attempts.iter().any(|&(seen, _)| seen == *index))
        .collect();
    for index in lost {
        attempts.push((index, Attempt::Failed(why.to_string())));
    }
}

/// A bounded pool of frame workers.
#[derive(Clone, Debug)]
pub struct Scheduler {
    capacity: usize,
    policy: Policy,
    cancel: CancelToken,
}

impl Scheduler {
    /// A scheduler that keeps at most `capacity` frames in flight.
    pub fn new(capacity: usize, policy: Policy, cancel: CancelToken) -> Result<Self, RenderError> {
        if capacity == 0 {
            return Err(RenderError::invalid("worker pool capacity must be positive"));
        }
        Ok(Scheduler {
            capacity,
            policy,
            cancel,
        })
    }

    /// Render every frame in `frames` with `job`, returning the results
    /// paired with their frame index, ascending.  `context` is attached
    /// to any failure report.
    pub fn run<T, F>(
        &self,
        frames: &[usize],
        context: &str,
        job: F,
    ) -> Result<Vec<(usize, T)>, RenderError>
    where
        T: Send,
        F: Fn(usize) -> Result<T, RenderError> + Sync,
    {
        let mut attempts = match self.policy {
            Policy::BatchBarrier => self.run_batches(frames, context, &job)?,
            Policy::WorkQueue => self.run_queue(frames, context, &job)?,
        };
        attempts.sort_by_key(|&(index, _)| index);

        let mut done = Vec::with_capacity(attempts.len());
        let mut failed = Vec::new();
        let mut reason = None;
        let mut skipped = false;
        for (index, outcome) in attempts {
            match outcome {
                Attempt::Done(value) => done.push((index, value)),
                Attempt::Failed(why) => {
                    error!("frame {} failed: {}", index, why);
                    failed.push(index);
                    reason.get_or_insert(why);
                }
                Attempt::Skipped => skipped = true,
            }
        }

        if !failed.is_empty() {
            return Err(RenderError::WorkerFailure {
                frames: failed,
                params: context.to_string(),
                reason: reason.unwrap_or_default(),
            });
        }
        if skipped || done.len() < frames.len() {
            warn!("cancelled with {} of {} frames rendered", done.len(), frames.len());
            return Err(RenderError::Cancelled {
                completed: done.len(),
            });
        }
        Ok(done)
    }

    fn run_batches<T, F>(
        &self,
        frames: &[usize],
        context: &str,
        job: &F,
    ) -> Result<Vec<(usize, Attempt<T>)>, RenderError>
    where
        T: Send,
        F: Fn(usize) -> Result<T, RenderError> + Sync,
    {
        let mut attempts: Vec<(usize, Attempt<T>)> = Vec::with_capacity(frames.len());
        let cancel = &self.cancel;
        for (number, batch) in frames.chunks(self.capacity).enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            debug!("batch {}: frames {:?}", number + 1, batch);

            let results = crossbeam::scope(|spawner| {
                let handles: Vec<(usize, ScopedJoinHandle<Attempt<T>>)> = batch
                    .iter()
                    .map(|&index| (index, spawner.spawn(move |_| attempt(job, index, cancel))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(index, handle)| match handle.join() {
                        Ok(outcome) => (index, outcome),
                        Err(payload) => (index, Attempt::Failed(panic_message(&*payload))),
                    })
                    .collect::<Vec<_>>()
            })
            .map_err(|payload| RenderError::WorkerFailure {
                frames: batch.to_vec(),
                params: context.to_string(),
                reason: panic_message(&*payload),
            })?;

            let batch_failed = results.iter().any(|(_, outcome)| match outcome {
                Attempt::Failed(_) => true,
                _ => false,
            });
            attempts.extend(results);
            if batch_failed {
                break;
            }
        }
        Ok(attempts)
    }

    fn run_queue<T, F>(
        &self,
        frames: &[usize],
        context: &str,
        job: &F,
    ) -> Result<Vec<(usize, Attempt<T>)>, RenderError>
    where
        T: Send,
        F: Fn(usize) -> Result<T, RenderError> + Sync,
    {
        let queue: FrameQueue = Mutex::new((frames.iter().cloned(), vec![]));
        let halt = AtomicBool::new(false);
        let cancel = &self.cancel;
        let workers = self.capacity.min(frames.len());

        let (mut attempts, lost) = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Vec<(usize, Attempt<T>)>>> = (0..workers)
                .map(|_| {
                    let (queue, halt) = (&queue, &halt);
                    spawner.spawn(move |_| {
                        let mut attempts = vec![];
                        loop {
                            if halt.load(Ordering::SeqCst) || cancel.is_cancelled() {
                                break;
                            }
                            let index = match queue.lock() {
                                Ok(mut queue) => {
                                    let next = queue.0.next();
                                    if let Some(index) = next {
                                        queue.1.push(index);
                                    }
                                    next
                                }
                                Err(_) => None,
                            };
                            match index {
                                Some(index) => {
                                    let outcome = attempt(job, index, cancel);
                                    if let Attempt::Failed(_) = outcome {
                                        halt.store(true, Ordering::SeqCst);
                                    }
                                    attempts.push((index, outcome));
                                }
                                None => {
                                    break;
                                }
                            }
                        }
                        attempts
                    })
                })
                .collect();

            let mut attempts = vec![];
            let mut lost = None;
            for handle in handles {
                match handle.join() {
                    Ok(done) => attempts.extend(done),
                    Err(payload) => {
                        lost.get_or_insert(panic_message(&*payload));
                    }
                }
            }
            (attempts, lost)
        })
        .map_err(|payload| RenderError::WorkerFailure {
            frames: frames.to_vec(),
            params: context.to_string(),
            reason: panic_message(&*payload),
        })?;

        if let Some(why) = lost {
            let taken = match queue.into_inner() {
                Ok(queue) => queue.1,
                Err(poisoned) => poisoned.into_inner().1,
            };
            reclaim_lost(&taken, &mut attempts, &why);
        }
        Ok(attempts)
    }
}
