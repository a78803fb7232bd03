//! Ambient occlusion sample kernel and rotation noise.

use rand::Rng;

use crate::gpu::render_context::RenderContext;
use crate::renderer::uniforms::AO_KERNEL_SIZE;

/// Edge length of the tiled rotation noise texture.
pub const NOISE_SIZE: u32 = 4;

/// Hemisphere sample offsets (+Z), denser toward the origin.
pub fn generate_kernel<R: Rng + ?Sized>(rng: &mut R) -> [[f32; 4]; AO_KERNEL_SIZE] {
    let mut kernel = [[0.0f32; 4]; AO_KERNEL_SIZE];
    for (i, sample) in kernel.iter_mut().enumerate() {
        let direction = glam::Vec3::new(
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>(),
        )
        .try_normalize()
        .unwrap_or(glam::Vec3::Z);

        let t = i as f32 / AO_KERNEL_SIZE as f32;
        let scale = 0.1 + t * t * 0.9;
        *sample = (direction * scale).extend(0.0).to_array();
    }
    kernel
}

/// Random unit rotations in the XY plane, packed as RGBA8 (`z` = 0.5).
pub fn generate_noise<R: Rng + ?Sized>(rng: &mut R) -> Vec<u8> {
    let texels = (NOISE_SIZE * NOISE_SIZE) as usize;
    let mut data = Vec::with_capacity(texels * 4);
    for _ in 0..texels {
        let v = glam::Vec2::new(
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>() * 2.0 - 1.0,
        )
        .try_normalize()
        .unwrap_or(glam::Vec2::X);
        data.extend([
            ((v.x * 0.5 + 0.5) * 255.0) as u8,
            ((v.y * 0.5 + 0.5) * 255.0) as u8,
            128,
            255,
        ]);
    }
    data
}

/// Upload rotation noise as an `Rgba8Unorm` texture.
pub fn create_noise_texture(context: &RenderContext, data: &[u8]) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: NOISE_SIZE,
        height: NOISE_SIZE,
        depth_or_array_layers: 1,
    };
    let texture = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Ambient Noise"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    context.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(NOISE_SIZE * 4),
            rows_per_image: Some(NOISE_SIZE),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn kernel_stays_in_upper_hemisphere_and_grows() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let kernel = generate_kernel(&mut rng);
        for (i, sample) in kernel.iter().enumerate() {
            let v = glam::Vec3::new(sample[0], sample[1], sample[2]);
            let t = i as f32 / AO_KERNEL_SIZE as f32;
            assert!(v.z >= 0.0);
            assert!((v.length() - (0.1 + t * t * 0.9)).abs() < 1e-4, "sample {i}");
        }
    }

    #[test]
    fn noise_is_tightly_packed_rgba() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let noise = generate_noise(&mut rng);
        assert_eq!(noise.len(), 64);
        assert!(noise.chunks(4).all(|t| t[2] == 128 && t[3] == 255));
    }
}
