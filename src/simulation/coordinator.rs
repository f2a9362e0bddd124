//! Concurrency coordinator - fork-join over contiguous particle chunks
//!
//! The pool is split into `chunk_count` contiguous, non-overlapping chunks.
//! Each chunk goes to one worker of a dedicated rayon pool; a pass returns
//! only after every chunk has finished. A worker that errors or panics does
//! not stop the others: its failure is logged and collected, and whatever
//! it already applied stays applied.

use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::battle::resolver::{apply_moves, plan_chunk, settle, ChunkStats, Intent, ResolveContext};
use crate::core::error::{Result, TidewarError};
use crate::core::types::{CellCoord, ParticleId};

/// Merged result of one fork-join pass
#[derive(Debug, Default)]
pub struct ChunkOutcome {
    pub stats: ChunkStats,
    pub failures: Vec<TidewarError>,
}

impl ChunkOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold a later pass into this one
    pub fn absorb(&mut self, other: ChunkOutcome) {
        self.stats = self.stats.merge(other.stats);
        self.failures.extend(other.failures);
    }
}

pub struct Coordinator {
    pool: rayon::ThreadPool,
    chunk_count: usize,
}

impl Coordinator {
    /// Build the worker pool (`None` threads = one per core)
    pub fn new(worker_threads: Option<usize>, chunk_count: usize) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("tidewar-worker-{}", i));
        if let Some(threads) = worker_threads {
            builder = builder.num_threads(threads);
        }
        Ok(Self {
            pool: builder.build()?,
            chunk_count: chunk_count.max(1),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Run `op` inside the worker pool
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Chunk length for `items` elements (never zero)
    pub fn chunk_len(&self, items: usize) -> usize {
        items.div_ceil(self.chunk_count).max(1)
    }

    /// Run `work` on every chunk of `items` and wait for all of them
    ///
    /// `work` receives the index of the chunk's first element and the chunk.
    /// Errors and panics are caught per chunk.
    pub fn run_chunks<T, F>(&self, items: &mut [T], work: F) -> ChunkOutcome
    where
        T: Send,
        F: Fn(usize, &mut [T]) -> Result<ChunkStats> + Sync + Send,
    {
        let chunk_len = self.chunk_len(items.len());
        let results: Vec<Result<ChunkStats>> = self.pool.install(|| {
            items
                .par_chunks_mut(chunk_len)
                .enumerate()
                .map(|(chunk, slice)| {
                    let first = chunk * chunk_len;
                    match catch_unwind(AssertUnwindSafe(|| work(first, slice))) {
                        Ok(result) => result,
                        Err(payload) => Err(TidewarError::WorkerPanicked {
                            chunk,
                            message: panic_message(payload.as_ref()),
                        }),
                    }
                })
                .collect()
        });

        let mut outcome = ChunkOutcome::default();
        for (chunk, result) in results.into_iter().enumerate() {
            match result {
                Ok(stats) => outcome.stats = outcome.stats.merge(stats),
                Err(e) => {
                    tracing::error!(chunk, error = %e, "Worker failed");
                    outcome.failures.push(e);
                }
            }
        }
        outcome
    }

    /// Resolve one tick of movement and combat for every particle
    ///
    /// `intents` is scratch space with one slot per particle. Planning and
    /// moving run chunk-parallel; hits then land in particle-id order on the
    /// calling thread. The result is the same for any worker count.
    pub fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        positions: &mut [CellCoord],
        intents: &mut [Intent],
    ) -> ChunkOutcome {
        let frozen: &[CellCoord] = &*positions;
        let mut outcome =
            self.run_chunks(intents, |first, chunk| plan_chunk(ctx, first, frozen, chunk));

        let intents: &[Intent] = &*intents;
        outcome.absorb(
            self.run_chunks(positions, |first, chunk| apply_moves(ctx, first, chunk, intents)),
        );

        for (index, intent) in intents.iter().enumerate() {
            match settle(ctx, ParticleId::from_index(index), *intent) {
                Ok(Some(action)) => outcome.stats.record(action),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(particle = index, error = %e, "Contact failed");
                    outcome.failures.push(e);
                }
            }
        }

        if !outcome.is_clean() {
            ctx.claims.reset();
        }
        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
