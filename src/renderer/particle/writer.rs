//! Scoped CPU write access to the particle position buffer.

use std::ops::Range;

use glam::Vec3;

use super::buffer::PositionBuffer;
use crate::error::ParticleError;

/// Write access to the particle positions, returned by
/// [`ParticleRenderer::bind_positions`](super::ParticleRenderer::bind_positions).
///
/// The writer sees the positions as last uploaded; slots it does not touch
/// keep their values. [`unbind`](Self::unbind), or dropping the writer,
/// uploads only the span of slots that was written. The writer borrows the
/// renderer mutably, so no draw can be recorded while it is alive.
pub struct PositionWriter<'a> {
    positions: &'a mut PositionBuffer,
    queue: &'a wgpu::Queue,
    dirty: Option<Range<usize>>,
}

impl<'a> PositionWriter<'a> {
    pub(crate) fn new(
        positions: &'a mut PositionBuffer,
        queue: &'a wgpu::Queue,
    ) -> Self {
        Self {
            positions,
            queue,
            dirty: None,
        }
    }

    /// Number of particle slots that can be written.
    pub fn capacity(&self) -> usize {
        self.positions.capacity()
    }

    /// Run `f` over every slot. The whole buffer is uploaded on unbind.
    pub fn with_positions<R>(&mut self, f: impl FnOnce(&mut [Vec3]) -> R) -> R {
        self.mark(0..self.capacity());
        f(self.positions.slots_mut().as_mut_slice())
    }

    /// Overwrite slots `start..start + positions.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::CapacityExceeded`] if the range runs past the
    /// buffer; nothing is written in that case.
    pub fn write(
        &mut self,
        start: usize,
        positions: &[Vec3],
    ) -> Result<(), ParticleError> {
        let range = self.positions.slots_mut().write(start, positions)?;
        self.mark(range);
        Ok(())
    }

    /// Slots written so far and not yet uploaded.
    pub fn dirty(&self) -> Option<Range<usize>> {
        self.dirty.clone()
    }

    /// Upload the written slots and release the renderer.
    pub fn unbind(mut self) {
        self.flush();
    }

    fn mark(&mut self, range: Range<usize>) {
        self.dirty = merge_dirty(self.dirty.take(), range);
    }

    fn flush(&mut self) {
        if let Some(range) = self.dirty.take() {
            self.positions.upload(self.queue, range);
        }
    }
}

impl Drop for PositionWriter<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Smallest range covering `dirty` and `range`. Empty ranges add nothing.
fn merge_dirty(
    dirty: Option<Range<usize>>,
    range: Range<usize>,
) -> Option<Range<usize>> {
    if range.is_empty() {
        return dirty;
    }
    Some(match dirty {
        Some(d) => d.start.min(range.start)..d.end.max(range.end),
        None => range,
    })
}
