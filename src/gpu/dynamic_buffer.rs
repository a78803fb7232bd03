//! Storage buffers that grow with the data uploaded into them.
//!
//! Point sets change size between scenes and, for the hierarchical level,
//! between timesteps. A [`TypedBuffer`] keeps one allocation and only
//! replaces it when an upload no longer fits.

use std::marker::PhantomData;

/// Smallest allocation in bytes, so empty data still yields a bindable
/// buffer.
const MIN_BYTES: u64 = 64;

/// Byte capacity after growing `current` to hold `needed`: at least double
/// the need, never less than `current + 1 KiB`.
pub fn grown_capacity(current: u64, needed: u64) -> u64 {
    if needed <= current {
        current
    } else {
        (needed * 2).max(current + 1024)
    }
}

/// A `T`-typed GPU buffer that reallocates on overflow and never shrinks.
///
/// Bind groups are built per frame, so a reallocation needs no
/// notification beyond the debug log.
pub struct TypedBuffer<T> {
    buffer: wgpu::Buffer,
    label: String,
    usage: wgpu::BufferUsages,
    bytes: u64,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// Buffer holding `data`. Empty slices still allocate [`MIN_BYTES`].
    pub fn from_slice(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[T],
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes = (std::mem::size_of_val(data) as u64).max(MIN_BYTES);
        let mut buffer = Self {
            buffer: allocate(device, label, bytes, usage),
            label: label.to_owned(),
            usage,
            bytes,
            _marker: PhantomData,
        };
        buffer.write(device, queue, data);
        buffer
    }

    /// Replace the contents with `data`, growing first if it does not fit.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) {
        let needed = std::mem::size_of_val(data) as u64;
        if needed > self.bytes {
            self.bytes = grown_capacity(self.bytes, needed);
            self.buffer = allocate(device, &self.label, self.bytes, self.usage);
            log::debug!("{} grown to {} bytes", self.label, self.bytes);
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
    }

    /// The underlying wgpu buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

fn allocate(
    device: &wgpu::Device,
    label: &str,
    bytes: u64,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitting_data_keeps_capacity() {
        assert_eq!(grown_capacity(4096, 4096), 4096);
        assert_eq!(grown_capacity(4096, 0), 4096);
    }

    #[test]
    fn growth_at_least_doubles_the_need() {
        assert_eq!(grown_capacity(64, 10_000), 20_000);
        // Tiny overflows still grow by a full kibibyte.
        assert_eq!(grown_capacity(4096, 4100), 8200);
        assert_eq!(grown_capacity(64, 80), 1088);
    }
}
