use std::collections::VecDeque;

/// A bucketed priority queue for small integer priorities.
///
/// Items of equal priority pop in insertion order, which keeps path searches
/// deterministic. Buckets grow on demand and `pop_min` never looks behind the
/// last popped priority, so priorities pushed after a pop must not be lower
/// than it (true for Dijkstra with non-negative weights).
pub struct PriorityQueue<T> {
    buckets: Vec<VecDeque<T>>,
    current: usize,
    len: usize,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            current: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, priority: usize, item: T) {
        assert!(
            priority >= self.current,
            "priority must be >= {}",
            self.current
        );
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, VecDeque::new);
        }
        self.buckets[priority].push_back(item);
        self.len += 1;
    }

    /// Removes the oldest item with the lowest priority.
    pub fn pop_min(&mut self) -> Option<(usize, T)> {
        if self.len == 0 {
            return None;
        }
        while self.current < self.buckets.len() {
            if let Some(item) = self.buckets[self.current].pop_front() {
                self.len -= 1;
                return Some((self.current, item));
            }
            self.current += 1;
        }
        None
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_single() {
        let mut pq = PriorityQueue::new();
        pq.push(10, "hello");
        assert_eq!(pq.pop_min(), Some((10, "hello")));
        assert_eq!(pq.pop_min(), None);
    }

    #[test]
    fn test_push_pop_ordered() {
        let mut pq = PriorityQueue::new();
        pq.push(10, "low");
        pq.push(5, "lower");
        pq.push(15, "high");

        assert_eq!(pq.pop_min(), Some((5, "lower")));
        assert_eq!(pq.pop_min(), Some((10, "low")));
        assert_eq!(pq.pop_min(), Some((15, "high")));
        assert_eq!(pq.pop_min(), None);
    }

    #[test]
    fn test_push_pop_same_priority() {
        let mut pq = PriorityQueue::new();
        pq.push(10, "first");
        pq.push(10, "second");
        pq.push(10, "third");
        assert_eq!(pq.len(), 3);

        assert_eq!(pq.pop_min(), Some((10, "first")));
        assert_eq!(pq.pop_min(), Some((10, "second")));
        assert_eq!(pq.pop_min(), Some((10, "third")));
        assert!(pq.is_empty());
    }

    #[test]
    fn test_push_after_pop() {
        let mut pq = PriorityQueue::new();
        pq.push(0, "a");
        pq.push(9, "b");
        assert_eq!(pq.pop_min(), Some((0, "a")));
        pq.push(1, "c");
        pq.push(9, "d");
        assert_eq!(pq.pop_min(), Some((1, "c")));
        assert_eq!(pq.pop_min(), Some((9, "b")));
        assert_eq!(pq.pop_min(), Some((9, "d")));
    }

    #[test]
    #[should_panic(expected = "priority must be >=")]
    fn test_priority_below_current() {
        let mut pq = PriorityQueue::new();
        pq.push(5, "a");
        pq.pop_min();
        pq.push(4, "b");
    }

    #[test]
    fn test_empty_queue() {
        let mut pq: PriorityQueue<i32> = PriorityQueue::default();
        assert_eq!(pq.pop_min(), None);
        assert_eq!(pq.len(), 0);
    }
}

