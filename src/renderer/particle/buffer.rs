//! GPU-resident particle positions with an explicit capacity.

use std::ops::Range;

use glam::Vec3;

use crate::error::ParticleError;

/// Bytes per particle: one tightly packed `vec3<f32>`.
pub const POSITION_STRIDE: u64 = size_of::<Vec3>() as u64;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

/// Layout of a position buffer: one `vec3<f32>` per sprite instance.
///
/// External buffers passed to the `draw_external*` calls must follow it.
pub const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> =
    wgpu::VertexBufferLayout {
        array_stride: POSITION_STRIDE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &POSITION_ATTRIBUTES,
    };

/// Check that `len` positions starting at slot `start` fit in `capacity`.
///
/// # Errors
///
/// Returns [`ParticleError::CapacityExceeded`] with the end slot the range
/// would need.
pub fn check_capacity(
    start: usize,
    len: usize,
    capacity: usize,
) -> Result<(), ParticleError> {
    match start.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        end => Err(ParticleError::CapacityExceeded {
            requested: end.unwrap_or(usize::MAX),
            capacity,
        }),
    }
}

/// Byte size backing `capacity` particles. Never zero, so an empty set still
/// has a bindable buffer.
pub(crate) fn buffer_size(capacity: u32) -> u64 {
    u64::from(capacity.max(1)) * POSITION_STRIDE
}

/// CPU copy of every particle slot.
///
/// All bounds checks live here, so uploads and scoped writes agree on what
/// fits before anything reaches the GPU.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PositionSlots {
    slots: Vec<Vec3>,
}

impl PositionSlots {
    pub(crate) fn new(capacity: u32) -> Self {
        Self {
            slots: vec![Vec3::ZERO; capacity as usize],
        }
    }

    /// Overwrite slots `start..start + positions.len()` and return that
    /// range. Nothing changes when the range does not fit.
    pub(crate) fn write(
        &mut self,
        start: usize,
        positions: &[Vec3],
    ) -> Result<Range<usize>, ParticleError> {
        check_capacity(start, positions.len(), self.len())?;
        let range = start..start + positions.len();
        self.slots[range.clone()].copy_from_slice(positions);
        Ok(range)
    }

    pub(crate) fn as_slice(&self) -> &[Vec3] {
        &self.slots
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Vec3] {
        &mut self.slots
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// The renderer's own position buffer.
///
/// Fixed size: [`resize`](Self::resize) replaces the buffer and zeroes its
/// contents. The slots are mirrored on the CPU so scoped writers start from
/// the current positions and only upload what they touch.
pub(crate) struct PositionBuffer {
    buffer: wgpu::Buffer,
    slots: PositionSlots,
}

impl PositionBuffer {
    pub(crate) fn new(device: &wgpu::Device, capacity: u32) -> Self {
        Self {
            buffer: Self::create(device, capacity),
            slots: PositionSlots::new(capacity),
        }
    }

    fn create(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Positions"),
            size: buffer_size(capacity),
            usage: wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, capacity: u32) {
        log::debug!(
            "resizing particle buffer {} -> {capacity}",
            self.slots.len()
        );
        self.buffer = Self::create(device, capacity);
        self.slots = PositionSlots::new(capacity);
    }

    pub(crate) fn write(
        &mut self,
        queue: &wgpu::Queue,
        positions: &[Vec3],
    ) -> Result<(), ParticleError> {
        match self.slots.write(0, positions) {
            Ok(range) => {
                self.upload(queue, range);
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected position upload: {e}");
                Err(e)
            }
        }
    }

    /// Copy slots `range` to the GPU buffer.
    pub(crate) fn upload(&self, queue: &wgpu::Queue, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        queue.write_buffer(
            &self.buffer,
            range.start as u64 * POSITION_STRIDE,
            bytemuck::cast_slice(&self.slots.as_slice()[range]),
        );
    }

    pub(crate) fn slots_mut(&mut self) -> &mut PositionSlots {
        &mut self.slots
    }

    pub(crate) fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn count(&self) -> u32 {
        self.slots.len() as u32
    }
}
