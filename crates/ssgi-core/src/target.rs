use std::collections::HashMap;

// ---------------------------------------------------------------------------
// TargetId — integer identifier derived from a target name
// ---------------------------------------------------------------------------

/// Identifies a render target. Ids are derived from names so that every
/// party naming the same target agrees on the id without a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

impl TargetId {
    /// 32-bit FNV-1a hash of `name`.
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash: u32 = 0x811c_9dc5;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(0x0100_0193);
            i += 1;
        }
        Self(hash)
    }
}

/// The camera's color target, read and written by post-processing passes.
pub const CAMERA_COLOR_TARGET: TargetId = TargetId::from_name("_CameraColorTexture");
/// The camera's depth target, sampled by screen-space effects.
pub const CAMERA_DEPTH_TARGET: TargetId = TargetId::from_name("_CameraDepthTexture");

// ---------------------------------------------------------------------------
// TargetDescriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Point,
    Bilinear,
    Trilinear,
}

/// Color formats a temporary target may be allocated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// 8 bits per channel, 32 bits per texel.
    Argb32,
    /// 16-bit float per channel.
    ArgbHalf,
    /// 32-bit float per channel.
    ArgbFloat,
}

impl ColorFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            ColorFormat::Argb32 => 4,
            ColorFormat::ArgbHalf => 8,
            ColorFormat::ArgbFloat => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    /// 0 means the target carries no depth buffer.
    pub depth_bits: u32,
    pub filter: FilterMode,
    pub format: ColorFormat,
}

impl TargetDescriptor {
    /// A color-only bilinear 8-bit target of the given size.
    pub fn color(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_bits: 0,
            filter: FilterMode::Bilinear,
            format: ColorFormat::Argb32,
        }
    }

    pub fn with_depth_bits(mut self, bits: u32) -> Self {
        self.depth_bits = bits;
        self
    }
}

// ---------------------------------------------------------------------------
// TemporaryTargetPool
// ---------------------------------------------------------------------------

/// Outcome of [`TemporaryTargetPool::get_temporary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The id was unknown; storage must be created.
    Created,
    /// The descriptor changed (e.g. resize); storage must be recreated.
    Reallocated,
    /// Same descriptor as last time; existing storage is reused.
    Reused,
}

#[derive(Debug, Clone, Copy)]
struct PoolEntry {
    descriptor: TargetDescriptor,
    generation: u64,
}

/// Bookkeeping for temporary render targets keyed by [`TargetId`].
///
/// The pool only tracks descriptors; a backend owns the actual storage and
/// compares [`generation`](Self::generation) to know when to rebuild it.
#[derive(Debug, Default)]
pub struct TemporaryTargetPool {
    entries: HashMap<TargetId, PoolEntry>,
    next_generation: u64,
}

impl TemporaryTargetPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a temporary target. Storage is (re)allocated only when the id
    /// is new or the descriptor differs from the one it was allocated with.
    pub fn get_temporary(&mut self, id: TargetId, descriptor: TargetDescriptor) -> Allocation {
        let generation = self.next_generation;
        match self.entries.get_mut(&id) {
            Some(entry) if entry.descriptor == descriptor => Allocation::Reused,
            Some(entry) => {
                log::debug!(
                    "temporary target {:?} reallocated: {}×{} → {}×{}",
                    id,
                    entry.descriptor.width,
                    entry.descriptor.height,
                    descriptor.width,
                    descriptor.height
                );
                entry.descriptor = descriptor;
                entry.generation = generation;
                self.next_generation += 1;
                Allocation::Reallocated
            }
            None => {
                log::debug!(
                    "temporary target {:?} allocated: {}×{} {:?}",
                    id,
                    descriptor.width,
                    descriptor.height,
                    descriptor.format
                );
                self.entries.insert(id, PoolEntry { descriptor, generation });
                self.next_generation += 1;
                Allocation::Created
            }
        }
    }

    pub fn release(&mut self, id: TargetId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn descriptor(&self, id: TargetId) -> Option<&TargetDescriptor> {
        self.entries.get(&id).map(|e| &e.descriptor)
    }

    /// Changes every time the storage behind `id` must be rebuilt.
    pub fn generation(&self, id: TargetId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.generation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &TargetDescriptor)> {
        self.entries.iter().map(|(id, e)| (*id, &e.descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
