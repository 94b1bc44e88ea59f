//! Per-thread fan-out.
//!
//! [`run_per_thread`] hands each worker exclusive ownership of one slot
//! (typically a `&mut ThreadData` plus that thread's objects), runs the
//! same job on every slot in a scoped thread, and collects results over
//! a crossbeam channel. Slots are disjoint by construction, so no locks
//! are involved. Results come back ordered by thread.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use tessera_core::ThreadId;
use tracing::debug;

use crate::error::EngineError;

/// Run `job` once per slot, slot `i` on thread `ThreadId(i)`.
///
/// A single slot runs inline on the caller's thread. A panic there is
/// caught and reported the same way as a panicking worker.
///
/// # Errors
///
/// The first error by thread order: a job failure,
/// [`EngineError::ThreadSpawnFailed`], or [`EngineError::WorkerPanicked`].
pub fn run_per_thread<S, R, F>(slots: Vec<S>, job: F) -> Result<Vec<R>, EngineError>
where
    S: Send,
    R: Send,
    F: Fn(ThreadId, S) -> Result<R, EngineError> + Sync,
{
    let n = slots.len();
    if n == 1 {
        let mut slots = slots;
        return match slots.pop() {
            Some(slot) => panic::catch_unwind(AssertUnwindSafe(|| job(ThreadId(0), slot)))
                .map_err(|_| EngineError::WorkerPanicked {
                    thread: ThreadId(0),
                })?
                .map(|r| vec![r]),
            None => Ok(Vec::new()),
        };
    }

    let (tx, rx) = crossbeam_channel::bounded::<(usize, Result<R, EngineError>)>(n);
    let job = &job;
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(n);
        for (i, slot) in slots.into_iter().enumerate() {
            let worker_tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("tessera-worker-{i}"))
                .spawn_scoped(s, move || {
                    // Receiver outlives the scope; a failed send is unreachable.
                    let _ = worker_tx.send((i, job(ThreadId(i), slot)));
                });
            match spawned {
                Ok(handle) => handles.push((i, handle)),
                Err(e) => {
                    let _ = tx.send((
                        i,
                        Err(EngineError::ThreadSpawnFailed {
                            reason: e.to_string(),
                        }),
                    ));
                }
            }
        }
        for (i, handle) in handles {
            if handle.join().is_err() {
                let _ = tx.send((
                    i,
                    Err(EngineError::WorkerPanicked {
                        thread: ThreadId(i),
                    }),
                ));
            }
        }
    });
    drop(tx);

    let mut results: Vec<(usize, Result<R, EngineError>)> = rx.try_iter().collect();
    results.sort_by_key(|(i, _)| *i);
    debug!(threads = n, "per-thread job finished");
    results.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_are_ordered_by_thread() {
        let out = run_per_thread(vec![10, 20, 30, 40], |t, x| Ok(x + t.0)).unwrap();
        assert_eq!(out, vec![10, 21, 32, 43]);
    }

    #[test]
    fn slots_are_mutated_in_place() {
        let mut data = vec![vec![1], vec![2], vec![3]];
        let slots: Vec<&mut Vec<i32>> = data.iter_mut().collect();
        run_per_thread(slots, |t, v| {
            v.push(t.0 as i32);
            Ok(())
        })
        .unwrap();
        assert_eq!(data, vec![vec![1, 0], vec![2, 1], vec![3, 2]]);
    }

    #[test]
    fn first_error_by_thread_wins() {
        let err = run_per_thread(vec![0, 1, 2], |t, _| {
            if t.0 >= 1 {
                Err(EngineError::WorkerPanicked { thread: t })
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert_eq!(err, EngineError::WorkerPanicked { thread: ThreadId(1) });
    }

    #[test]
    fn single_slot_runs_inline() {
        let caller = thread::current().id();
        let out = run_per_thread(vec![()], |_, _| Ok(thread::current().id())).unwrap();
        assert_eq!(out, vec![caller]);
    }

    #[test]
    fn inline_panic_is_reported() {
        let err = run_per_thread(vec![()], |_, _| -> Result<(), EngineError> {
            panic!("boom");
        })
        .unwrap_err();
        assert_eq!(err, EngineError::WorkerPanicked { thread: ThreadId(0) });
    }

    #[test]
    fn panicking_worker_is_reported() {
        let err = run_per_thread(vec![0, 1], |t, _| {
            if t.0 == 1 {
                panic!("boom");
            }
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err, EngineError::WorkerPanicked { thread: ThreadId(1) });
    }
}
