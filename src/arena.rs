use crate::element::{Handle, HandleParts};
use std::{
    marker::PhantomData,
    ops::{Index, IndexMut},
};

#[derive(Clone)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// Storage for one kind of mesh element. Removed slots are recycled, and every
/// time a slot is reused its generation is bumped so that handles to the
/// previous occupant no longer resolve.
#[derive(Clone)]
pub(crate) struct Arena<H, T> {
    slots: Vec<Slot<T>>,
    empties: Vec<u32>,
    len: usize,
    phantom: PhantomData<H>,
}

impl<H, T> Default for Arena<H, T> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            empties: Vec::new(),
            len: 0,
            phantom: PhantomData,
        }
    }
}

impl<H: HandleParts, T> Arena<H, T> {
    pub fn insert(&mut self, value: T) -> H {
        self.len += 1;
        match self.empties.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                slot.generation += 1;
                H::from_parts(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    value: Some(value),
                    generation: 1,
                });
                H::from_parts(index, 1)
            }
        }
    }

    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.value.take()?;
        self.empties.push(handle.index());
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Handles of all live elements, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|_| H::from_parts(i as u32, slot.generation))
        })
    }

    /// Drops every element but keeps the slots, so that all outstanding handles
    /// become stale. Subsequent insertions fill slots in ascending order.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.value = None;
        }
        self.empties = (0..self.slots.len() as u32).rev().collect();
        self.len = 0;
    }
}

impl<H: HandleParts, T> Index<H> for Arena<H, T> {
    type Output = T;

    fn index(&self, handle: H) -> &Self::Output {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("Stale or invalid handle {handle:?}"),
        }
    }
}

impl<H: HandleParts, T> IndexMut<H> for Arena<H, T> {
    fn index_mut(&mut self, handle: H) -> &mut Self::Output {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("Stale or invalid handle {handle:?}"),
        }
    }
}
