//! Growable uniform buffer addressed through dynamic offsets.
//!
//! `queue.write_buffer` lands before the next submit, so two draws recorded
//! into one pass would both see the last value written to a single uniform
//! buffer. Each draw instead pushes its block into its own slot and binds
//! that slot's offset. Slots grow 2x when a frame runs out, up to
//! [`MAX_SLOTS`] (or the device's buffer size limit), and are recycled by
//! [`UniformRing::reset`]. Past the cap the cursor wraps and later draws
//! reuse earlier slots.

use std::{marker::PhantomData, num::NonZeroU64};

/// Slot count a new ring starts with.
const INITIAL_SLOTS: u64 = 4;

/// Most slots a ring ever allocates.
pub const MAX_SLOTS: u64 = 4096;

/// Which slot a push lands in, and whether the backing buffer must grow
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotClaim {
    slot: u64,
    grown: bool,
}

/// Slot bookkeeping, independent of the GPU buffer behind it.
#[derive(Debug, Clone)]
pub(crate) struct SlotCursor {
    slots: u64,
    max_slots: u64,
    next: u64,
    wrapped: bool,
}

impl SlotCursor {
    pub(crate) fn new(max_slots: u64) -> Self {
        let max_slots = max_slots.max(1);
        Self {
            slots: INITIAL_SLOTS.min(max_slots),
            max_slots,
            next: 0,
            wrapped: false,
        }
    }

    /// Take the next slot, growing while under the cap and wrapping after.
    pub(crate) fn claim(&mut self) -> SlotClaim {
        let mut grown = false;
        if self.next == self.slots {
            if self.slots < self.max_slots {
                self.slots = grown_slot_count(self.slots).min(self.max_slots);
                grown = true;
            } else if !self.wrapped {
                self.wrapped = true;
                log::warn!(
                    "uniform ring full at {} slots; reusing slots (missing \
                     begin_frame?)",
                    self.slots
                );
            }
            self.next = 0;
        }
        let slot = self.next;
        self.next += 1;
        SlotClaim { slot, grown }
    }

    pub(crate) fn reset(&mut self) {
        self.next = 0;
        self.wrapped = false;
    }

    pub(crate) fn slots(&self) -> u64 {
        self.slots
    }
}

/// A ring of equally-sized uniform slots behind one dynamic-offset bind
/// group.
pub struct UniformRing<T> {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
    stride: u64,
    cursor: SlotCursor,
    label: String,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> UniformRing<T> {
    /// Bind group layout with a single dynamic-offset uniform binding sized
    /// for `T`.
    pub fn create_layout(
        device: &wgpu::Device,
        label: &str,
    ) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX
                    | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(size_of::<T>() as u64),
                },
                count: None,
            }],
        })
    }

    /// Ring bound through `layout`, which must come from
    /// [`UniformRing::create_layout`].
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> Self {
        let stride = slot_stride(
            size_of::<T>() as u64,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let max_slots =
            (device.limits().max_buffer_size / stride).min(MAX_SLOTS);
        let cursor = SlotCursor::new(max_slots);
        let buffer =
            Self::create_buffer(device, label, stride * cursor.slots());
        let bind_group =
            Self::create_bind_group(device, layout, &buffer, label);

        Self {
            buffer,
            bind_group,
            layout: layout.clone(),
            stride,
            cursor,
            label: label.to_owned(),
            _marker: PhantomData,
        }
    }

    fn create_buffer(
        device: &wgpu::Device,
        label: &str,
        size: u64,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniforms")),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Bind Group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: NonZeroU64::new(size_of::<T>() as u64),
                }),
            }],
        })
    }

    /// Write `value` into the next free slot and return its dynamic offset.
    ///
    /// Grows the buffer (and recreates the bind group) when every slot is
    /// taken. Commands already recorded keep referencing the old buffer.
    pub fn push(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        value: &T,
    ) -> u32 {
        let claim = self.cursor.claim();
        if claim.grown {
            let slots = self.cursor.slots();
            log::debug!("{}: growing uniform ring to {slots} slots", self.label);
            self.buffer =
                Self::create_buffer(device, &self.label, self.stride * slots);
            self.bind_group = Self::create_bind_group(
                device,
                &self.layout,
                &self.buffer,
                &self.label,
            );
        }

        let offset = claim.slot * self.stride;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(value));
        // Bounded by MAX_SLOTS * stride, well inside u32.
        offset as u32
    }

    /// Recycle every slot. Call once per frame before recording draws.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Bind group to set alongside the offset returned by
    /// [`push`](Self::push).
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

}

/// Size of one slot: `size` rounded up to the dynamic-offset alignment.
pub fn slot_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

fn grown_slot_count(current: u64) -> u64 {
    (current * 2).max(INITIAL_SLOTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(slot_stride(224, 256), 256);
        assert_eq!(slot_stride(256, 256), 256);
        assert_eq!(slot_stride(257, 256), 512);
        assert_eq!(slot_stride(224, 0), 224);
    }

    #[test]
    fn cursor_grows_then_wraps_at_the_cap() {
        let mut cursor = SlotCursor::new(16);
        let grown: Vec<u64> = (0..1_000)
            .filter_map(|_| {
                let claim = cursor.claim();
                claim.grown.then_some(claim.slot)
            })
            .collect();
        // 4 -> 8 -> 16, each growth restarting at slot 0.
        assert_eq!(grown, vec![0, 0]);
        assert_eq!(cursor.slots(), 16);
    }

    #[test]
    fn slots_stay_bounded_without_reset() {
        let mut cursor = SlotCursor::new(MAX_SLOTS);
        for _ in 0..100_000 {
            let claim = cursor.claim();
            assert!(claim.slot < MAX_SLOTS);
        }
        assert_eq!(cursor.slots(), MAX_SLOTS);
    }

    #[test]
    fn reset_reuses_slots_without_growing() {
        let mut cursor = SlotCursor::new(MAX_SLOTS);
        for _ in 0..3 {
            for expected in 0..INITIAL_SLOTS {
                assert_eq!(
                    cursor.claim(),
                    SlotClaim {
                        slot: expected,
                        grown: false,
                    }
                );
            }
            cursor.reset();
        }
        assert_eq!(cursor.slots(), INITIAL_SLOTS);
    }

    #[test]
    fn tiny_caps_are_respected() {
        let mut cursor = SlotCursor::new(1);
        assert_eq!(cursor.slots(), 1);
        assert_eq!(cursor.claim().slot, 0);
        assert_eq!(cursor.claim().slot, 0);
        assert_eq!(cursor.slots(), 1);
    }

    #[test]
    fn growth_doubles() {
        assert_eq!(grown_slot_count(4), 8);
        assert_eq!(grown_slot_count(8), 16);
        assert_eq!(grown_slot_count(0), INITIAL_SLOTS);
    }
}
