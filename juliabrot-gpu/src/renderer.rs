//! Escape-time renderer: uniform upload, full-screen draw, optional readback.

use crate::buffers::{padded_bytes_per_row, GpuBuffers, Uniforms};
use crate::device::GpuContext;
use crate::error::GpuError;
use crate::pipeline::GpuPipeline;
use futures_channel::oneshot;
use juliabrot_compute::{now_ms, FractalParameters, PixelBuffer, Viewport};
use std::rc::Rc;

/// GPU renderer for one surface.
///
/// Draws into an offscreen RGBA8 texture sized to the surface. A draw is
/// submitted synchronously; only a [`PendingSnapshot`] waits on the GPU.
pub struct GpuRenderer {
    context: Rc<GpuContext>,
    pipeline: GpuPipeline,
    buffers: Option<GpuBuffers>,
    current_dimensions: Option<(u32, u32)>,
}

impl GpuRenderer {
    pub async fn new(context: GpuContext) -> Result<Self, GpuError> {
        let pipeline = GpuPipeline::new(&context.device).await?;
        Ok(Self {
            context: Rc::new(context),
            pipeline,
            buffers: None,
            current_dimensions: None,
        })
    }

    /// Initialize a device and build a renderer on it.
    pub async fn create() -> Result<Self, GpuError> {
        let context = GpuContext::init().await?;
        Self::new(context).await
    }

    /// Recreate the target if `width` x `height` differs from the current size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.current_dimensions == Some((width, height)) {
            return;
        }
        log::debug!("GPU target resized to {width}x{height}");
        self.buffers = Some(GpuBuffers::new(&self.context.device, width, height));
        self.current_dimensions = Some((width, height));
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.current_dimensions
    }

    /// Upload the snapshot and draw one frame into the offscreen target.
    pub fn render(&mut self, viewport: &Viewport, params: &FractalParameters) {
        let start = now_ms();
        self.resize(viewport.width, viewport.height);

        let Some(buffers) = self.buffers.as_ref() else {
            return;
        };
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }

        let uniforms = Uniforms::new(viewport, params);
        self.context
            .queue
            .write_buffer(&buffers.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = self
            .context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("escape_time_bind_group"),
                layout: &self.pipeline.bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.uniforms.as_entire_binding(),
                }],
            });

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("escape_time_encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("escape_time_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &buffers.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.pipeline.render_pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));

        log::trace!(
            "GPU frame {}x{} submitted in {:.2} ms",
            viewport.width,
            viewport.height,
            now_ms() - start
        );
    }

    /// The texture the last frame was drawn into.
    pub fn target_view(&self) -> Option<&wgpu::TextureView> {
        self.buffers.as_ref().map(|b| &b.target_view)
    }

    /// Read the last drawn frame back as tightly packed RGBA8 rows.
    pub async fn snapshot(&self) -> Result<PixelBuffer, GpuError> {
        self.begin_snapshot()?.finish().await
    }

    /// Submit a copy of the last frame into a fresh staging buffer.
    ///
    /// The returned handle owns everything the readback needs, so the
    /// renderer can be resized or drawn again before it is awaited. A
    /// zero-sized surface yields an empty buffer without touching the GPU.
    pub fn begin_snapshot(&self) -> Result<PendingSnapshot, GpuError> {
        let (width, height) = self
            .current_dimensions
            .ok_or_else(|| GpuError::Unavailable("Nothing rendered yet".into()))?;
        let buffers = self
            .buffers
            .as_ref()
            .ok_or_else(|| GpuError::Unavailable("Nothing rendered yet".into()))?;

        if width == 0 || height == 0 {
            return Ok(PendingSnapshot {
                context: Rc::clone(&self.context),
                width,
                height,
                copy: None,
            });
        }

        let padded = padded_bytes_per_row(width);
        let staging = self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("escape_time_staging"),
            size: padded as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("escape_time_readback"),
                });
        encoder.copy_texture_to_buffer(
            buffers.target.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = oneshot::channel();
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        Ok(PendingSnapshot {
            context: Rc::clone(&self.context),
            width,
            height,
            copy: Some(MappedCopy {
                staging,
                padded,
                mapped: rx,
            }),
        })
    }
}

struct MappedCopy {
    staging: wgpu::Buffer,
    padded: u32,
    mapped: oneshot::Receiver<Result<(), wgpu::BufferAsyncError>>,
}

/// A submitted readback that has not been mapped yet.
pub struct PendingSnapshot {
    // Keeps the device alive until the mapping resolves.
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    context: Rc<GpuContext>,
    width: u32,
    height: u32,
    copy: Option<MappedCopy>,
}

impl PendingSnapshot {
    /// Wait for the copy and strip the row padding.
    pub async fn finish(self) -> Result<PixelBuffer, GpuError> {
        let (width, height) = (self.width, self.height);
        let Some(copy) = self.copy else {
            return Ok(PixelBuffer::new(width, height));
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.context.device.poll(wgpu::Maintain::Wait);

        copy.mapped
            .await
            .map_err(|_| GpuError::Unavailable("Channel closed".into()))?
            .map_err(GpuError::BufferMap)?;

        let row_bytes = width as usize * 4;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        {
            let view = copy.staging.slice(..).get_mapped_range();
            for row in view.chunks(copy.padded as usize).take(height as usize) {
                data.extend_from_slice(&row[..row_bytes]);
            }
        }
        copy.staging.unmap();

        PixelBuffer::from_raw(width, height, data)
            .ok_or_else(|| GpuError::Unavailable("Readback size mismatch".into()))
    }
}
