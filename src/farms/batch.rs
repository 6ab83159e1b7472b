//! Bounded, batch-sequential fan-out.
//!
//! Work is split into consecutive batches of at most `batch_size` items.
//! Every item of a batch is started before any is awaited, and batch N+1
//! starts only after batch N fully resolved. At no point are more than
//! `batch_size` items in flight, which keeps a shared public RPC endpoint
//! from being flooded.

use futures::future::try_join_all;
use std::future::Future;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::Duration;

use crate::chain::FetchError;

/// Per-call deadline. A call that does not answer in time fails with
/// [`FetchError::Timeout`] and goes down the same path as any other failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDeadline(pub Duration);

impl CallDeadline {
    pub async fn within<T, F>(self, call: &'static str, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        match tokio::time::timeout(self.0, fut).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { call, after: self.0 }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    batch_size: NonZeroUsize,
}

impl BatchRunner {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }

    /// Number of ranges [`index_batches`](Self::index_batches) yields for `len`
    pub fn batch_count(&self, len: u64) -> u64 {
        len.div_ceil(self.batch_size.get() as u64)
    }

    /// Split `[0, len)` into consecutive index ranges of `batch_size`
    pub fn index_batches(&self, len: u64) -> impl Iterator<Item = Range<u64>> {
        let step = self.batch_size.get() as u64;
        (0..self.batch_count(len)).map(move |n| {
            let start = n * step;
            start..(start + step).min(len)
        })
    }

    /// Split a slice into consecutive batches of `batch_size`
    pub fn batches<'a, T>(&self, items: &'a [T]) -> std::slice::Chunks<'a, T> {
        items.chunks(self.batch_size.get())
    }

    /// Run `f` over every item, batch by batch. Results keep input order.
    ///
    /// Stops at the first failed batch: the remaining calls of that batch are
    /// dropped and later batches never start.
    pub async fn try_run<'a, T, O, E, F, Fut>(&self, items: &'a [T], mut f: F) -> Result<Vec<O>, E>
    where
        F: FnMut(&'a T) -> Fut,
        Fut: Future<Output = Result<O, E>>,
    {
        let mut out = Vec::with_capacity(items.len());
        for batch in self.batches(items) {
            out.extend(try_join_all(batch.iter().map(&mut f)).await?);
        }
        Ok(out)
    }
}
