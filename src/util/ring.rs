/// Fixed-capacity circular buffer. Pre-allocated, no heap allocs after init.
///
/// Holds the most recent `capacity` values; older ones are overwritten.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// A zero capacity buffer accepts pushes and stays empty.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = if self.len < self.capacity {
            0
        } else {
            self.head
        };
        let cap = self.capacity;
        let len = self.len;
        (0..len).map(move |i| &self.buf[(start + i) % cap])
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_newest() {
        let mut ring = RingBuffer::new(3);
        for v in 1..=5 {
            ring.push(v);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn partial_fill_and_clear() {
        let mut ring = RingBuffer::new(4);
        ring.push(10);
        ring.push(20);
        assert_eq!(ring.to_vec(), vec![10, 20]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.to_vec(), Vec::<i32>::new());
        ring.push(30);
        assert_eq!(ring.to_vec(), vec![30]);
    }

    #[test]
    fn zero_capacity() {
        let mut ring = RingBuffer::<u8>::new(0);
        ring.push(1);
        assert!(ring.is_empty());
        assert_eq!(ring.iter().count(), 0);
    }
}
