// PCM sample ring shared by the decode thread and the output callback

use parking_lot::Mutex;
use std::sync::Arc;

/// Fixed-capacity ring of interleaved f32 samples
///
/// One slot is always left empty so that `read == write` means empty.
pub struct SampleRing {
    buffer: Vec<f32>,
    write_pos: usize,
    read_pos: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2)],
            write_pos: 0,
            read_pos: 0,
        }
    }

    fn slots(&self) -> usize {
        self.buffer.len()
    }

    /// Append as many samples as fit; returns how many were taken
    pub fn push(&mut self, data: &[f32]) -> usize {
        let count = data.len().min(self.free());
        let first = count.min(self.slots() - self.write_pos);
        self.buffer[self.write_pos..self.write_pos + first].copy_from_slice(&data[..first]);
        self.buffer[..count - first].copy_from_slice(&data[first..count]);
        self.write_pos = (self.write_pos + count) % self.slots();
        count
    }

    /// Drain up to `output.len()` samples; returns how many were written
    pub fn pop_into(&mut self, output: &mut [f32]) -> usize {
        let count = output.len().min(self.len());
        let first = count.min(self.slots() - self.read_pos);
        output[..first].copy_from_slice(&self.buffer[self.read_pos..self.read_pos + first]);
        output[first..count].copy_from_slice(&self.buffer[..count - first]);
        self.read_pos = (self.read_pos + count) % self.slots();
        count
    }

    /// Samples waiting to be read
    pub fn len(&self) -> usize {
        (self.write_pos + self.slots() - self.read_pos) % self.slots()
    }

    pub fn is_empty(&self) -> bool {
        self.write_pos == self.read_pos
    }

    /// Samples that can still be pushed
    pub fn free(&self) -> usize {
        self.slots() - 1 - self.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots() - 1
    }

    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
    }

    /// Replace the storage, dropping anything buffered
    pub fn resize(&mut self, capacity: usize) {
        self.buffer = vec![0.0; capacity.max(2)];
        self.clear();
    }

    /// Fill level from 0.0 to 1.0
    pub fn fullness(&self) -> f32 {
        self.len() as f32 / self.capacity() as f32
    }
}

/// Thread-safe wrapper for [`SampleRing`]
#[derive(Clone)]
pub struct SharedSampleRing {
    inner: Arc<Mutex<SampleRing>>,
}

impl SharedSampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SampleRing::new(capacity))),
        }
    }

    pub fn push(&self, data: &[f32]) -> usize {
        self.inner.lock().push(data)
    }

    pub fn pop_into(&self, output: &mut [f32]) -> usize {
        self.inner.lock().pop_into(output)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn resize(&self, capacity: usize) {
        self.inner.lock().resize(capacity)
    }

    pub fn fullness(&self) -> f32 {
        self.inner.lock().fullness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_bounded_by_capacity() {
        let mut ring = SampleRing::new(5);
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 4);
        assert_eq!(ring.free(), 0);
        assert_eq!(ring.fullness(), 1.0);
    }

    #[test]
    fn test_wraps_around() {
        let mut ring = SampleRing::new(5);
        let mut out = [0.0; 3];
        ring.push(&[1.0, 2.0, 3.0]);
        assert_eq!(ring.pop_into(&mut out), 3);

        // write position is now 3, so this push wraps
        assert_eq!(ring.push(&[4.0, 5.0, 6.0, 7.0]), 4);
        let mut out = [0.0; 6];
        assert_eq!(ring.pop_into(&mut out), 4);
        assert_eq!(&out[..4], &[4.0, 5.0, 6.0, 7.0]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_pop_from_empty() {
        let mut ring = SampleRing::new(8);
        let mut out = [9.0; 4];
        assert_eq!(ring.pop_into(&mut out), 0);
        assert_eq!(out, [9.0; 4]);
    }

    #[test]
    fn test_resize_drops_contents() {
        let ring = SharedSampleRing::new(8);
        ring.push(&[0.5; 6]);
        ring.resize(32);
        assert!(ring.is_empty());
        assert_eq!(ring.push(&[0.5; 40]), 31);
    }
}
