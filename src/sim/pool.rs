//! Reusable entity slots
//!
//! A released slot is handed out again by the next `acquire`. Handles carry
//! the slot generation, so a handle to a released (or reused) slot resolves
//! to nothing instead of aliasing the new occupant.

use serde::{Deserialize, Serialize};

/// Stable reference to a pooled entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    item: Option<T>,
}

/// Collection of entity slots, reused after release
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    /// Upper bound on slots (None = unbounded)
    max_size: Option<usize>,
    active: usize,
}

impl<T> Pool<T> {
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            max_size,
            active: 0,
        }
    }

    /// Place `item` in a free slot, growing the pool if none is free.
    /// Returns None when the pool is at its maximum size.
    pub fn acquire(&mut self, item: T) -> Option<Handle> {
        if let Some(index) = self.slots.iter().position(|s| s.item.is_none()) {
            let slot = &mut self.slots[index];
            slot.item = Some(item);
            self.active += 1;
            return Some(Handle {
                index: index as u32,
                generation: slot.generation,
            });
        }

        if self.max_size.is_some_and(|max| self.slots.len() >= max) {
            return None;
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            item: Some(item),
        });
        self.active += 1;
        log::debug!("Pool grew to {} slots", self.slots.len());
        Some(Handle {
            index: index as u32,
            generation: 0,
        })
    }

    /// Free the slot behind `handle`, returning its item if it was active
    pub fn release(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let item = slot.item.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.active -= 1;
        Some(item)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.item.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.item.as_mut())
    }

    /// Whether `handle` still refers to a live entity
    pub fn is_active(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn count_active(&self) -> usize {
        self.active
    }

    /// Number of slots ever allocated (active or free)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Active entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.item.as_ref().map(|item| {
                (
                    Handle {
                        index: i as u32,
                        generation: s.generation,
                    },
                    item,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.item.as_mut().map(|item| {
                (
                    Handle {
                        index: i as u32,
                        generation,
                    },
                    item,
                )
            })
        })
    }

    /// Snapshot of active handles (lets callers release while walking)
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(h, _)| h).collect()
    }

    /// Release every active entity
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.item.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.active = 0;
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new(None)
    }
}
