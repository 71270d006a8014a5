use delve_common::SectionCoord;
use std::collections::HashMap;

use crate::section::Section;

/// Generational index into a [`SectionArena`].
///
/// A handle stays cheap to copy and goes stale when its section is evicted:
/// the slot's generation moves on and lookups with the old handle miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionHandle {
    index: u32,
    generation: u32,
}

impl SectionHandle {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    section: Option<Section>,
}

/// Index-addressed storage of resident sections, with a coordinate index.
///
/// At most one section per coordinate. Freed slots are reused with a bumped
/// generation.
#[derive(Debug, Default)]
pub struct SectionArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_coord: HashMap<SectionCoord, SectionHandle>,
}

impl SectionArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_coord.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_coord.is_empty()
    }

    pub fn handle_of(&self, coord: SectionCoord) -> Option<SectionHandle> {
        self.by_coord.get(&coord).copied()
    }

    pub fn contains(&self, coord: SectionCoord) -> bool {
        self.by_coord.contains_key(&coord)
    }

    /// Handle of the section at `coord`, inserting `make()` if absent.
    pub fn get_or_insert_with(
        &mut self,
        coord: SectionCoord,
        make: impl FnOnce() -> Section,
    ) -> SectionHandle {
        if let Some(handle) = self.handle_of(coord) {
            return handle;
        }
        let section = make();
        debug_assert_eq!(section.coord(), coord);
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.section = Some(section);
                SectionHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    section: Some(section),
                });
                SectionHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.by_coord.insert(coord, handle);
        handle
    }

    pub fn get(&self, handle: SectionHandle) -> Option<&Section> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.section.as_ref()
    }

    pub fn get_mut(&mut self, handle: SectionHandle) -> Option<&mut Section> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.section.as_mut()
    }

    pub fn by_coord(&self, coord: SectionCoord) -> Option<&Section> {
        self.get(self.handle_of(coord)?)
    }

    pub fn by_coord_mut(&mut self, coord: SectionCoord) -> Option<&mut Section> {
        let handle = self.handle_of(coord)?;
        self.get_mut(handle)
    }

    /// Swap in a new section for a live handle, returning the old one.
    pub fn replace(&mut self, handle: SectionHandle, section: Section) -> Option<Section> {
        let current = self.get_mut(handle)?;
        if current.coord() != section.coord() {
            return None;
        }
        Some(std::mem::replace(current, section))
    }

    /// Evict a section. Its handle and any copies of it go stale.
    pub fn remove(&mut self, handle: SectionHandle) -> Option<Section> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let section = slot.section.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.by_coord.remove(&section.coord());
        Some(section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionHandle, &Section)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.section.as_ref().map(|s| {
                let handle = SectionHandle {
                    index: i as u32,
                    generation: slot.generation,
                };
                (handle, s)
            })
        })
    }

    pub fn coords(&self) -> impl Iterator<Item = SectionCoord> + '_ {
        self.by_coord.keys().copied()
    }
}
