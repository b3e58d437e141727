use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::ReplayError;

/// Fixed-capacity ring buffer of training transitions.
///
/// Pushes never fail: once the buffer is full the write cursor wraps and
/// the oldest entry is overwritten. Sampling draws without replacement,
/// uniformly over the current occupancy. Generic over the transition
/// record, so the tabular and approximator agents share it.
pub struct ReplayBuffer<T> {
    buffer: Vec<T>,
    capacity: usize,
    position: usize,
    rng: StdRng,
}

impl<T: Clone> ReplayBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be nonzero");
        ReplayBuffer {
            buffer: Vec::with_capacity(capacity),
            capacity,
            position: 0,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sampling for tests.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        ReplayBuffer {
            buffer: Vec::with_capacity(capacity),
            capacity,
            position: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Add a transition. O(1); overwrites the oldest entry when full.
    pub fn push(&mut self, transition: T) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// Sample `batch_size` transitions without replacement.
    pub fn sample(&mut self, batch_size: usize) -> Result<Vec<T>, ReplayError> {
        if batch_size > self.buffer.len() {
            return Err(ReplayError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        let indices = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        Ok(indices.iter().map(|i| self.buffer[i].clone()).collect())
    }

    /// Current occupancy, at most the capacity.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_len() {
        let mut buf = ReplayBuffer::with_seed(10, 0);
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());

        buf.push(1u64);
        assert_eq!(buf.len(), 1);

        for i in 2..=10 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_fifo_eviction_keeps_newest() {
        // Push capacity + m sequence-numbered entries; exactly the last
        // `capacity` must remain.
        let capacity = 5;
        let m = 7;
        let mut buf = ReplayBuffer::with_seed(capacity, 1);
        for i in 0..(capacity + m) as u64 {
            buf.push(i);
        }
        assert_eq!(buf.len(), capacity);

        let mut contents = buf.sample(capacity).unwrap();
        contents.sort_unstable();
        let expected: Vec<u64> = (m as u64..(capacity + m) as u64).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut buf = ReplayBuffer::with_seed(100, 2);
        for i in 0..50u64 {
            buf.push(i);
        }
        let batch = buf.sample(50).unwrap();
        let unique: std::collections::HashSet<u64> = batch.iter().copied().collect();
        assert_eq!(unique.len(), 50, "sampled the same entry twice");
    }

    #[test]
    fn test_sample_too_many_is_recoverable() {
        let mut buf = ReplayBuffer::with_seed(10, 3);
        buf.push(0u64);
        let err = buf.sample(5).unwrap_err();
        assert_eq!(
            err,
            crate::error::ReplayError::InsufficientData {
                requested: 5,
                available: 1
            }
        );
        // The buffer is still usable afterwards.
        for i in 1..5u64 {
            buf.push(i);
        }
        assert_eq!(buf.sample(5).unwrap().len(), 5);
    }
}
