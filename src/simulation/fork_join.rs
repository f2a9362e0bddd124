//! Divide-and-conquer reduction over slices
//!
//! Auxiliary whole-pool sums (faction tallies, health totals) split the
//! slice in halves until a leaf is small enough, then combine results on
//! the way back up. The split strategy is written once against the
//! [`ForkJoin`] trait so it runs on rayon's work-stealing `join` or
//! sequentially on the calling thread.

/// Something that can run two closures, possibly in parallel
pub trait ForkJoin: Sync {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send;
}

/// Parallel executor backed by `rayon::join`
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonJoin;

impl ForkJoin for RayonJoin {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        rayon::join(a, b)
    }
}

/// Runs both halves on the calling thread, left first
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ForkJoin for Sequential {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        let ra = a();
        let rb = b();
        (ra, rb)
    }
}

/// Reduce `items` by splitting in halves down to `grain`-sized leaves
///
/// `leaf` folds one leaf slice, `combine` merges two partial results.
/// `combine` must be associative; leaves are combined left to right.
pub fn split_reduce<E, T, R, L, C>(executor: &E, items: &[T], grain: usize, leaf: &L, combine: &C) -> R
where
    E: ForkJoin,
    T: Sync,
    R: Send,
    L: Fn(&[T]) -> R + Sync,
    C: Fn(R, R) -> R + Sync,
{
    if items.len() <= grain.max(1) {
        return leaf(items);
    }
    let (left, right) = items.split_at(items.len() / 2);
    let (a, b) = executor.join(
        || split_reduce(executor, left, grain, leaf, combine),
        || split_reduce(executor, right, grain, leaf, combine),
    );
    combine(a, b)
}
