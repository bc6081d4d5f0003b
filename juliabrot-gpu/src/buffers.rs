//! Uniform layout shared with `shaders/escape_time.wgsl`.

use bytemuck::{Pod, Zeroable};
use juliabrot_core::{FractalParameters, Viewport};

/// Uniform block for the escape-time fragment shader.
///
/// Field order and padding mirror the WGSL `Uniforms` struct: vec4 members
/// first (16-byte aligned), then the vec2 pair, then scalars, padded to 96 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    /// x_min, x_max, y_min, y_max
    pub bounds: [f32; 4],
    /// rgb + unused
    pub color: [f32; 4],
    /// First four color basis weights
    pub weights: [f32; 4],
    pub julia_seed: [f32; 2],
    pub resolution: [f32; 2],
    /// Fifth color basis weight
    pub weight_inverse: f32,
    pub exponent: f32,
    pub escape_radius: f32,
    pub iteration_cap: u32,
    pub mode: u32,
    pub _pad: [u32; 3],
}

impl Uniforms {
    /// Snapshot the viewport and parameters for upload.
    pub fn new(viewport: &Viewport, params: &FractalParameters) -> Self {
        let w = &params.color_settings.0;
        Self {
            bounds: [
                viewport.x_min as f32,
                viewport.x_max as f32,
                viewport.y_min as f32,
                viewport.y_max as f32,
            ],
            color: [
                params.color[0] as f32,
                params.color[1] as f32,
                params.color[2] as f32,
                1.0,
            ],
            weights: [w[0] as f32, w[1] as f32, w[2] as f32, w[3] as f32],
            julia_seed: [params.julia_seed.0 as f32, params.julia_seed.1 as f32],
            resolution: [viewport.width as f32, viewport.height as f32],
            weight_inverse: w[4] as f32,
            exponent: params.exponent as f32,
            escape_radius: params.escape_radius as f32,
            iteration_cap: params.iteration_cap,
            mode: params.mode.as_u32(),
            _pad: [0; 3],
        }
    }
}

/// Bytes per row of a readback buffer for `width` RGBA8 pixels.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Uniform buffer plus the offscreen render target.
pub struct GpuBuffers {
    pub uniforms: wgpu::Buffer,
    pub target: wgpu::Texture,
    pub target_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Format of the offscreen target; readback assumes 4 bytes per pixel.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

impl GpuBuffers {
    /// Create buffers sized for a `width` x `height` surface.
    ///
    /// Textures cannot be empty, so a zero dimension allocates a 1-pixel
    /// target; the renderer skips drawing into it.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("escape_time_uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("escape_time_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            uniforms,
            target,
            target_view,
            width,
            height,
        }
    }
}
