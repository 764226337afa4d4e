/// A fixed-capacity ring buffer that fills up before it starts overwriting its oldest element
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    i: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be positive");
        Self {
            buffer: Vec::with_capacity(capacity),
            i: 0,
            capacity,
        }
    }

    /// Number of elements currently held
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element once full
    pub fn push(&mut self, item: T) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(item);
        } else {
            self.buffer[self.i] = item;
        }
        self.i = (self.i + 1) % self.capacity;
    }

    /// Elements from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.buffer.split_at(self.i.min(self.buffer.len()));
        older.iter().chain(newer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.i = 0;
    }
}

impl<T: Copy + Into<f64>> RingBuffer<T> {
    /// Arithmetic mean of the held elements, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let sum: f64 = self.buffer.iter().map(|&x| x.into()).sum();
        Some(sum / self.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_then_overwrites_oldest() {
        let mut rb = RingBuffer::new(3);
        rb.push(1u32);
        rb.push(2);
        assert_eq!(rb.len(), 2, "Partially filled");
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), [1, 2]);

        rb.push(3);
        rb.push(4);
        assert_eq!(rb.len(), 3, "Length capped at capacity");
        assert_eq!(
            rb.iter().copied().collect::<Vec<_>>(),
            [2, 3, 4],
            "Oldest element overwritten, order preserved"
        );
    }

    #[test]
    fn mean_of_window() {
        let mut rb = RingBuffer::new(2);
        assert_eq!(rb.mean(), None);
        rb.push(2u32);
        rb.push(4);
        rb.push(8);
        assert_eq!(rb.mean(), Some(6.0));
        rb.clear();
        assert!(rb.is_empty());
    }
}
