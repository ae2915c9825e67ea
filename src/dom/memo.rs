//! Memoizing lazy indexed sequence
//!
//! A sequence defined by a seed state and a step function. Element `i` is
//! computed on first access from the state left behind by element `i - 1`
//! and cached forever; the length is only known once the step reports the
//! end. The memo table and running state sit behind one mutex, so the step
//! runs at most once per index even with concurrent readers.
//!
//! The step must not force the sequence that is calling it; nested forcing
//! of *other* sequences is fine.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Step function: given the state after the previous element, produce the
/// next state and element, or `None` at the end of the sequence
pub trait Step<S, T>: Send + Sync {
    fn step(&self, state: &S) -> Result<Option<(S, T)>>;
}

impl<S, T, F> Step<S, T> for F
where
    F: Fn(&S) -> Result<Option<(S, T)>> + Send + Sync,
{
    fn step(&self, state: &S) -> Result<Option<(S, T)>> {
        self(state)
    }
}

struct Memo<S, T> {
    /// Forced elements, always a prefix of the sequence
    items: Vec<Arc<T>>,
    /// State after the last forced element (the seed while `items` is empty)
    state: S,
    /// The step has reported the end
    exhausted: bool,
}

/// Lazily computed, memoized, randomly indexable sequence
pub struct MemoLazySequence<S, T, F> {
    step: F,
    memo: Mutex<Memo<S, T>>,
}

impl<S, T, F> MemoLazySequence<S, T, F>
where
    F: Step<S, T>,
{
    pub fn new(seed: S, step: F) -> Self {
        MemoLazySequence {
            step,
            memo: Mutex::new(Memo {
                items: Vec::new(),
                state: seed,
                exhausted: false,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Memo<S, T>>> {
        self.memo.lock().map_err(|_| Error::Poisoned)
    }

    /// Step until `index` is cached (or until the end when `index` is `None`).
    /// A failing step leaves the memo untouched.
    fn force(&self, memo: &mut Memo<S, T>, index: Option<usize>) -> Result<()> {
        while !memo.exhausted && index.map_or(true, |i| memo.items.len() <= i) {
            match self.step.step(&memo.state)? {
                Some((next, item)) => {
                    memo.state = next;
                    memo.items.push(Arc::new(item));
                    tracing::trace!(index = memo.items.len() - 1, "forced sequence element");
                }
                None => memo.exhausted = true,
            }
        }
        Ok(())
    }

    /// Element `index`, forcing every earlier element first.
    ///
    /// Asking past the end is an error; see [`try_get`](Self::try_get).
    pub fn get(&self, index: usize) -> Result<Arc<T>> {
        let mut memo = self.lock()?;
        self.force(&mut memo, Some(index))?;
        memo.items.get(index).cloned().ok_or(Error::IndexOutOfRange {
            index,
            len: memo.items.len(),
        })
    }

    /// Element `index`, or `None` if the sequence ends before it
    pub fn try_get(&self, index: usize) -> Result<Option<Arc<T>>> {
        let mut memo = self.lock()?;
        self.force(&mut memo, Some(index))?;
        Ok(memo.items.get(index).cloned())
    }

    /// Force the whole sequence and return its length
    pub fn len(&self) -> Result<usize> {
        let mut memo = self.lock()?;
        self.force(&mut memo, None)?;
        Ok(memo.items.len())
    }

    /// Forces at most the first element
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.try_get(0)?.is_none())
    }

    /// Number of elements computed so far; never forces
    pub fn forced_len(&self) -> usize {
        match self.memo.lock() {
            Ok(memo) => memo.items.len(),
            Err(poisoned) => poisoned.into_inner().items.len(),
        }
    }

    /// Whether the end has been observed; never forces
    pub fn is_exhausted(&self) -> bool {
        match self.memo.lock() {
            Ok(memo) => memo.exhausted,
            Err(poisoned) => poisoned.into_inner().exhausted,
        }
    }

    /// Force the whole sequence and return the state after its last element
    pub fn final_state(&self) -> Result<S>
    where
        S: Clone,
    {
        let mut memo = self.lock()?;
        self.force(&mut memo, None)?;
        Ok(memo.state.clone())
    }

    /// Iterate in order, forcing one element per step
    pub fn iter(&self) -> Iter<'_, S, T, F> {
        Iter {
            seq: self,
            next: 0,
            done: false,
        }
    }
}

impl<S, T, F> fmt::Debug for MemoLazySequence<S, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (forced, exhausted) = match self.memo.lock() {
            Ok(memo) => (memo.items.len(), memo.exhausted),
            Err(_) => return f.write_str("MemoLazySequence { <poisoned> }"),
        };
        f.debug_struct("MemoLazySequence")
            .field("forced", &forced)
            .field("exhausted", &exhausted)
            .finish()
    }
}

/// Forcing iterator over a [`MemoLazySequence`]; stops after the first error
pub struct Iter<'a, S, T, F> {
    seq: &'a MemoLazySequence<S, T, F>,
    next: usize,
    done: bool,
}

impl<'a, S, T, F> Iterator for Iter<'a, S, T, F>
where
    F: Step<S, T>,
{
    type Item = Result<Arc<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.seq.try_get(self.next) {
            Ok(Some(item)) => {
                self.next += 1;
                Some(Ok(item))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a, S, T, F> IntoIterator for &'a MemoLazySequence<S, T, F>
where
    F: Step<S, T>,
{
    type Item = Result<Arc<T>>;
    type IntoIter = Iter<'a, S, T, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts 0, 1, 2, ... below `limit`, recording every step call
    fn counting(limit: u32, calls: Arc<AtomicUsize>) -> impl Step<u32, u32> {
        move |state: &u32| -> Result<Option<(u32, u32)>> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(if *state < limit { Some((state + 1, state * 10)) } else { None })
        }
    }

    #[test]
    fn test_get_forces_prefix_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seq = MemoLazySequence::new(0u32, counting(5, calls.clone()));

        assert_eq!(*seq.get(3).unwrap(), 30);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(seq.forced_len(), 4);

        assert_eq!(*seq.get(1).unwrap(), 10);
        assert_eq!(*seq.get(3).unwrap(), 30);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(!seq.is_exhausted());
    }

    #[test]
    fn test_len_forces_to_end() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seq = MemoLazySequence::new(0u32, counting(5, calls.clone()));

        let first = seq.get(0).unwrap();
        assert_eq!(seq.len().unwrap(), 5);
        // five elements plus the call that reported the end
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert!(seq.is_exhausted());

        assert!(Arc::ptr_eq(&first, &seq.get(0).unwrap()));
        assert_eq!(seq.len().unwrap(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_out_of_range() {
        let seq = MemoLazySequence::new(0u32, counting(2, Arc::new(AtomicUsize::new(0))));
        assert!(matches!(seq.get(2), Err(Error::IndexOutOfRange { index: 2, len: 2 })));
        assert!(seq.try_get(7).unwrap().is_none());
    }

    #[test]
    fn test_empty_sequence() {
        let seq = MemoLazySequence::new(0u32, counting(0, Arc::new(AtomicUsize::new(0))));
        assert!(seq.is_empty().unwrap());
        assert_eq!(seq.len().unwrap(), 0);
        assert_eq!(seq.final_state().unwrap(), 0);
    }

    #[test]
    fn test_is_empty_forces_one() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seq = MemoLazySequence::new(0u32, counting(100, calls.clone()));
        assert!(!seq.is_empty().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_final_state_threads_through() {
        let seq = MemoLazySequence::new(10u32, |s: &u32| -> Result<Option<(u32, u32)>> {
            Ok(if *s < 13 { Some((s + 1, *s)) } else { None })
        });
        assert_eq!(seq.final_state().unwrap(), 13);
        let items: Vec<u32> = seq.iter().map(|r| *r.unwrap()).collect();
        assert_eq!(items, vec![10, 11, 12]);
    }

    #[test]
    fn test_failing_step_retries_from_same_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let seq = MemoLazySequence::new(0u32, move |s: &u32| -> Result<Option<(u32, u32)>> {
            counter.fetch_add(1, Ordering::SeqCst);
            if *s == 2 {
                Err(Error::PastStreamEnd { position: 2 })
            } else {
                Ok(Some((s + 1, *s)))
            }
        });

        assert_eq!(*seq.get(1).unwrap(), 1);
        assert!(seq.get(2).is_err());
        assert!(seq.len().is_err());
        assert_eq!(seq.forced_len(), 2);
        // each failed access re-ran only the failing step
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let results: Vec<_> = seq.iter().collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].is_err());
    }

    #[test]
    fn test_concurrent_first_access_steps_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seq = MemoLazySequence::new(0u32, counting(64, calls.clone()));

        let firsts: Vec<Arc<u32>> = (0..256usize)
            .into_par_iter()
            .map(|i| seq.get(i % 64).unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 64);
        for (i, item) in firsts.iter().enumerate() {
            assert!(Arc::ptr_eq(item, &seq.get(i % 64).unwrap()));
        }
    }
}
