/*!
This priority queue uses a binary heap that allows removing and updating
arbitrary items. It keeps track of the position of every item in the heap,
indexed by the mesh element the item is keyed on, and uses sift-up and
sift-down operations to restore the heap after a change.
*/

use crate::element::Handle;
use std::{cmp::Ordering, ops::Range};

/// Items in a [`Queue`] are identified by a mesh element. The queue holds at
/// most one item per storage slot, so an element that reuses the slot of a
/// deleted one replaces its item.
pub trait Keyed {
    type Key: Handle;

    fn key(&self) -> Self::Key;
}

/// Priority queue of items keyed on mesh elements.
///
/// When you pop an item, the smallest one is removed from the queue and
/// returned.
pub struct Queue<T>
where
    T: Keyed + PartialOrd,
{
    items: Vec<T>,
    map: Vec<Option<usize>>,
}

/// Get the index of the parent in the binary heap.
const fn heap_parent(index: usize) -> Option<usize> {
    if index > 0 {
        Some((index - 1) >> 1)
    } else {
        None
    }
}

/// Get the indices of the children in the binary heap.
const fn heap_children(index: usize) -> Range<usize> {
    let off = index << 1;
    (off + 1)..(off + 3)
}

impl<T> Queue<T>
where
    T: Keyed + PartialOrd,
{
    /// Create a new queue with room for the given number of items.
    ///
    /// For example, if the queue is meant to hold edges of a mesh, provide
    /// the number of edges in that mesh.
    pub fn new(num_items: usize) -> Self {
        Queue {
            items: Vec::with_capacity(num_items),
            map: vec![None; num_items],
        }
    }

    /// Clear the queue.
    pub fn clear(&mut self) {
        self.items.clear();
        self.map.fill(None);
    }

    /// Number of items currently in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if this queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the items in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    // Low level functions for moving things around inside the heap.

    fn compare(&self, i: usize, j: usize) -> Option<Ordering> {
        self.items[i].partial_cmp(&self.items[j])
    }

    /// Position of the item stored in the slot of this key, whatever its
    /// generation.
    fn slot(&self, key: T::Key) -> Option<usize> {
        self.map.get(key.index() as usize).copied().flatten()
    }

    /// Position of the item with this key. A slot that was reused by another
    /// element with the same index does not match.
    fn position(&self, key: T::Key) -> Option<usize> {
        self.slot(key).filter(|i| self.items[*i].key() == key)
    }

    fn set_position(&mut self, key: T::Key, index: usize) {
        let ki = key.index() as usize;
        if ki >= self.map.len() {
            self.map.resize(ki + 1, None);
        }
        self.map[ki] = Some(index);
    }

    fn unset_position(&mut self, key: T::Key) {
        if let Some(i) = self.map.get_mut(key.index() as usize) {
            *i = None;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.set_position(self.items[i].key(), j);
        self.set_position(self.items[j].key(), i);
        self.items.swap(i, j);
    }

    fn remove_last(&mut self) -> Option<T> {
        self.items.pop().inspect(|last| {
            self.unset_position(last.key());
        })
    }

    fn sift_up(&mut self, index: usize) {
        let mut index = index;
        while let Some(pi) = heap_parent(index) {
            if let Some(Ordering::Less) = self.compare(index, pi) {
                self.swap(index, pi);
                index = pi;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, index: usize) {
        let mut index = index;
        while index < self.len() {
            match heap_children(index).fold(None, |prev: Option<usize>, ci| {
                if ci < self.len() {
                    match prev {
                        Some(prev) => match self.compare(ci, prev) {
                            Some(Ordering::Less) => Some(ci),
                            _ => Some(prev),
                        },
                        None => Some(ci),
                    }
                } else {
                    prev
                }
            }) {
                Some(child) => match self.compare(index, child) {
                    Some(Ordering::Less) => break,
                    _ => {
                        self.swap(index, child);
                        index = child;
                    }
                },
                None => break,
            }
        }
    }

    // High level functions to work with the queue.

    /// Insert the item into the queue.
    ///
    /// If an item with the same key, or with an older key in the same slot,
    /// is already present, it is replaced.
    pub fn insert(&mut self, item: T) {
        let key = item.key();
        match self.slot(key) {
            Some(index) => {
                // Update existing item.
                self.items[index] = item;
                self.sift_down(index);
                self.sift_up(index);
            }
            None => {
                // Push new item.
                self.set_position(key, self.items.len());
                self.items.push(item);
                self.sift_up(self.len() - 1)
            }
        }
    }

    /// Remove the item with the given key, if it is present.
    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let index = self.position(key)?;
        let last = self.len() - 1;
        if index == last {
            self.remove_last()
        } else {
            self.swap(index, last);
            let out = self.remove_last();
            self.sift_down(index);
            self.sift_up(index);
            out
        }
    }

    /// The item at the front of the queue.
    pub fn top(&self) -> Option<&T> {
        self.items.first()
    }

    /// Remove the item from the front of the queue and return it.
    pub fn pop(&mut self) -> Option<T> {
        if self.len() > 1 {
            self.swap(0, self.len() - 1);
            let out = self.remove_last();
            self.sift_down(0);
            out
        } else {
            self.remove_last()
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Keyed, Queue};
    use crate::element::{Handle, HandleParts, VH};
    use std::cmp::Ordering;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Item(VH, f64);

    impl Keyed for Item {
        type Key = VH;

        fn key(&self) -> VH {
            self.0
        }
    }

    impl PartialOrd for Item {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.1.total_cmp(&other.1).then(self.0.cmp(&other.0)))
        }
    }

    fn vh(i: u32) -> VH {
        VH::from_parts(i, 1)
    }

    fn item(i: u32, cost: f64) -> Item {
        Item(vh(i), cost)
    }

    fn drain_queue(mut queue: Queue<Item>) -> Vec<u32> {
        let mut out = Vec::with_capacity(queue.len());
        while let Some(item) = queue.pop() {
            out.push(item.0.index());
        }
        out
    }

    #[test]
    fn t_queue_push_two() {
        let mut queue: Queue<Item> = Queue::new(2);
        queue.insert(item(0, 5.0));
        queue.insert(item(1, 2.0));
        assert_eq!(
            vec![1, 0],
            queue
                .items
                .iter()
                .map(|item| item.0.index())
                .collect::<Vec<_>>()
        );
        assert_eq!(queue.top(), Some(&item(1, 2.0)));
    }

    #[test]
    fn t_queue_push_many() {
        let mut queue: Queue<Item> = Queue::new(10);
        for i in [8u32, 1, 5, 3, 9, 2, 6, 4, 0, 7] {
            queue.insert(item(i, i as f64));
        }
        // Push in a weird order, and expect them to come out sorted.
        assert_eq!(10, queue.len());
        assert_eq!((0..10).collect::<Vec<_>>(), drain_queue(queue));
    }

    #[test]
    fn t_queue_remove_two() {
        let mut queue: Queue<Item> = Queue::new(10);
        for i in [4u32, 3, 5, 8, 2, 9, 1, 7, 0, 6] {
            queue.insert(item(i, i as f64));
        }
        assert_eq!(queue.remove(vh(3)), Some(item(3, 3.0)));
        assert_eq!(queue.remove(vh(6)), Some(item(6, 6.0)));
        assert_eq!(queue.remove(vh(6)), None);
        assert_eq!(vec![0, 1, 2, 4, 5, 7, 8, 9], drain_queue(queue));
    }

    #[test]
    fn t_queue_update_two() {
        let mut queue: Queue<Item> = Queue::new(10);
        for i in [4u32, 3, 5, 8, 2, 9, 1, 7, 0, 6] {
            queue.insert(item(i, i as f64));
        }
        queue.insert(item(4, -1.0));
        queue.insert(item(2, 13.0));
        assert_eq!(10, queue.len());
        assert_eq!(vec![4, 0, 1, 3, 5, 6, 7, 8, 9, 2], drain_queue(queue));
    }

    #[test]
    fn t_queue_ties() {
        // Equal costs are ordered by the key.
        let mut queue: Queue<Item> = Queue::new(4);
        for i in [3u32, 0, 2, 1] {
            queue.insert(item(i, 1.0));
        }
        assert_eq!(vec![0, 1, 2, 3], drain_queue(queue));
    }

    #[test]
    fn t_queue_stale_key() {
        // A key from a reused slot does not match the item in the queue.
        let mut queue: Queue<Item> = Queue::new(2);
        queue.insert(item(1, 1.0));
        assert_eq!(queue.remove(VH::from_parts(1, 2)), None);
        assert_eq!(queue.len(), 1);
        // The newer generation takes over the slot.
        queue.insert(item(0, 2.0));
        queue.insert(Item(VH::from_parts(1, 2), 3.0));
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|item| item.0 != vh(1)));
        assert_eq!(queue.remove(vh(1)), None);
        let keys: Vec<VH> = queue.iter().map(|item| item.0).collect();
        for key in keys {
            assert_eq!(queue.remove(key).map(|item| item.0), Some(key));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn t_empty_queue() {
        let mut queue: Queue<Item> = Queue::new(0);
        assert_eq!(None, queue.pop());
        assert_eq!(None, queue.top());
        assert_eq!(None, queue.remove(vh(0)));
        assert!(queue.is_empty());
        // Large handle indices must not be used for memory arithmetic.
        queue.insert(item(1000, 1.0));
        queue.insert(item(2000, 2.0));
        assert_eq!(vec![1000, 2000], drain_queue(queue));
    }
}
