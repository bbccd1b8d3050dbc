//! Precomputed boundary responses per transform.
//!
//! Each [`BoundaryCacheEntry`] holds the all-minimum and all-maximum input
//! patterns of a transform's input format and the external transform's
//! response to each, computed once at registration with exactly two
//! single-pixel calls.
//!
//! [`CacheStore`] is a fixed-capacity table of entries keyed by
//! [`TransformId`]. When every slot is taken, slot 0 is overwritten no
//! matter how recently it was used.

use log::debug;

use crate::error::{Result, Side};
use crate::format::{PATTERN_BYTES, Pattern, PixelFormat};
use crate::transform::{ColorTransform, TransformId};

/// Number of slots in a [`CacheStore`].
pub const CACHE_CAPACITY: usize = 32;

/// Boundary references and responses for one transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryCacheEntry {
    transform_id: TransformId,
    input: PixelFormat,
    output: PixelFormat,
    minimum_input: Pattern,
    maximum_input: Pattern,
    minimum_output: Pattern,
    maximum_output: Pattern,
    valid: bool,
}

impl BoundaryCacheEntry {
    /// Build an entry by running `transform` once on each boundary pixel.
    pub fn compute<T: ColorTransform + ?Sized>(
        transform: &T,
        input: PixelFormat,
        output: PixelFormat,
    ) -> Self {
        let minimum_input = input.minimum_pattern();
        let maximum_input = input.maximum_pattern();
        let in_bpp = input.bytes_per_pixel();
        let out_bpp = output.bytes_per_pixel();

        let mut minimum_output = [0; PATTERN_BYTES];
        transform.do_transform(&minimum_input[..in_bpp], &mut minimum_output[..out_bpp], 1);

        let mut maximum_output = [0; PATTERN_BYTES];
        transform.do_transform(&maximum_input[..in_bpp], &mut maximum_output[..out_bpp], 1);

        Self {
            transform_id: transform.id(),
            input,
            output,
            minimum_input,
            maximum_input,
            minimum_output,
            maximum_output,
            valid: true,
        }
    }

    /// Transform this entry belongs to.
    #[inline]
    pub fn transform_id(&self) -> TransformId {
        self.transform_id
    }

    /// Input pixel format.
    #[inline]
    pub fn input_format(&self) -> PixelFormat {
        self.input
    }

    /// Output pixel format.
    #[inline]
    pub fn output_format(&self) -> PixelFormat {
        self.output
    }

    /// Input bytes per pixel.
    #[inline]
    pub fn input_bytes_per_pixel(&self) -> usize {
        self.input.bytes_per_pixel()
    }

    /// Output bytes per pixel.
    #[inline]
    pub fn output_bytes_per_pixel(&self) -> usize {
        self.output.bytes_per_pixel()
    }

    /// All-minimum input pixel.
    #[inline]
    pub fn minimum_input(&self) -> &[u8] {
        &self.minimum_input[..self.input.bytes_per_pixel()]
    }

    /// All-maximum input pixel.
    #[inline]
    pub fn maximum_input(&self) -> &[u8] {
        &self.maximum_input[..self.input.bytes_per_pixel()]
    }

    /// Transform output for the all-minimum pixel.
    #[inline]
    pub fn minimum_output(&self) -> &[u8] {
        &self.minimum_output[..self.output.bytes_per_pixel()]
    }

    /// Transform output for the all-maximum pixel.
    #[inline]
    pub fn maximum_output(&self) -> &[u8] {
        &self.maximum_output[..self.output.bytes_per_pixel()]
    }

    /// Whether the entry is live.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Fixed-capacity table of [`BoundaryCacheEntry`] values.
///
/// Owned by a [`GuardContext`](crate::GuardContext); mutation needs
/// `&mut self`, so sharing across threads requires the caller's own lock.
#[derive(Clone, Debug, Default)]
pub struct CacheStore {
    // Grows to CACHE_CAPACITY and never shrinks; cleared slots stay as
    // invalid entries and are reused first.
    slots: Vec<BoundaryCacheEntry>,
}

impl CacheStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(CACHE_CAPACITY),
        }
    }

    /// Register `transform`, taking channel counts (colour + extra) from its format words.
    ///
    /// Returns the slot index.
    pub fn register<T: ColorTransform + ?Sized>(&mut self, transform: &T) -> Result<usize> {
        let input = PixelFormat::from_word(Side::Input, transform.input_format())?;
        let output = PixelFormat::from_word(Side::Output, transform.output_format())?;
        Ok(self.insert(transform, input, output))
    }

    /// Register `transform` with explicit channel counts.
    ///
    /// Sample widths and the float flag still come from the format words.
    /// Formats are validated before a slot is claimed, so a failed call
    /// leaves the store untouched.
    pub fn init<T: ColorTransform + ?Sized>(
        &mut self,
        transform: &T,
        input_channels: u32,
        output_channels: u32,
    ) -> Result<usize> {
        let in_word = transform.input_format();
        let out_word = transform.output_format();
        let input = PixelFormat::describe(
            Side::Input,
            input_channels,
            in_word.bytes_code(),
            in_word.is_float(),
        )?;
        let output = PixelFormat::describe(
            Side::Output,
            output_channels,
            out_word.bytes_code(),
            out_word.is_float(),
        )?;
        Ok(self.insert(transform, input, output))
    }

    fn insert<T: ColorTransform + ?Sized>(
        &mut self,
        transform: &T,
        input: PixelFormat,
        output: PixelFormat,
    ) -> usize {
        let id = transform.id();
        let index = self.allocate(id);
        let entry = BoundaryCacheEntry::compute(transform, input, output);
        debug!(
            "boundary cache: registered {:?} in slot {} ({} -> {} bytes/pixel)",
            id,
            index,
            entry.input_bytes_per_pixel(),
            entry.output_bytes_per_pixel()
        );
        if index == self.slots.len() {
            self.slots.push(entry);
        } else {
            self.slots[index] = entry;
        }
        index
    }

    /// Slot for `id`: its existing slot, the first free one, or slot 0.
    fn allocate(&mut self, id: TransformId) -> usize {
        if let Some(index) = self.find(id) {
            return index;
        }
        if let Some(index) = self.slots.iter().position(|slot| !slot.valid) {
            return index;
        }
        if self.slots.len() < CACHE_CAPACITY {
            return self.slots.len();
        }
        debug!(
            "boundary cache: full, evicting {:?} from slot 0",
            self.slots[0].transform_id
        );
        self.slots[0].valid = false;
        0
    }

    fn find(&self, id: TransformId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.valid && slot.transform_id == id)
    }

    /// Live entry for `id`.
    pub fn lookup(&self, id: TransformId) -> Option<&BoundaryCacheEntry> {
        self.find(id).map(|index| &self.slots[index])
    }

    /// Cached output for the all-minimum input of `id`.
    pub fn minimum_output(&self, id: TransformId) -> Option<&[u8]> {
        self.lookup(id).map(BoundaryCacheEntry::minimum_output)
    }

    /// Cached output for the all-maximum input of `id`.
    pub fn maximum_output(&self, id: TransformId) -> Option<&[u8]> {
        self.lookup(id).map(BoundaryCacheEntry::maximum_output)
    }

    /// Invalidate the entry for `id`, if any.
    pub fn clear(&mut self, id: TransformId) {
        if let Some(index) = self.find(id) {
            debug!("boundary cache: cleared {:?} from slot {}", id, index);
            self.slots[index].valid = false;
        }
    }

    /// Invalidate every entry.
    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.valid).count()
    }

    /// True when no entry is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
