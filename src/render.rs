use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use wgpu::{
    Adapter, CompositeAlphaMode, Device, DeviceDescriptor, Extent3d, ImageDataLayout, Instance,
    PresentMode, Queue, RequestAdapterOptions, Surface, SurfaceConfiguration, SurfaceError,
    TextureFormat, TextureUsages,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{canvas::Canvas, software::SoftwareCanvas};

// the canvas does all the drawing on the cpu, this just gets its pixels on screen:
// the framebuffer is written straight into the swapchain texture every frame.
pub struct Render {
    adapter: Adapter,
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

impl Render {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let instance = Instance::default();
        let size = window.inner_size();

        let surface = instance.create_surface(window)?;

        let (adapter, device, queue) = pollster::block_on(async {
            let adapter = instance
                .request_adapter(&RequestAdapterOptions {
                    compatible_surface: Some(&surface),
                    ..Default::default()
                })
                .await
                .ok_or(anyhow!("No suitable adapter found."))?;

            let (device, queue) = adapter
                .request_device(&DeviceDescriptor::default(), None)
                .await?;

            Ok::<(wgpu::Adapter, wgpu::Device, wgpu::Queue), anyhow::Error>((
                adapter, device, queue,
            ))
        })?;

        let capabilities = surface.get_capabilities(&adapter);
        ensure!(
            capabilities.usages.contains(TextureUsages::COPY_DST),
            "Surface can't be written to directly (usages {:?})",
            capabilities.usages
        );
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| swizzle_for(*format).is_some())
            .ok_or(anyhow!(
                "No 8-bit RGBA or BGRA surface format in {:?}",
                capabilities.formats
            ))?;
        log::info!("presenting through {:?} as {:?}", adapter.get_info().backend, format);

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_DST,
            format,
            width: size.width,
            height: size.height,
            present_mode: PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };

        let render = Self {
            adapter,
            device,
            queue,
            surface,
            config,
        };
        render.configure();
        Ok(render)
    }

    fn configure(&self) {
        // a minimized window has no surface to configure
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width;
        self.config.height = size.height;
        self.configure();
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Puts the canvas on screen. Frames are dropped while the window is
    /// minimized or the canvas hasn't caught up with a resize yet.
    pub fn present(&mut self, canvas: &SoftwareCanvas) -> Result<()> {
        let (width, height) = canvas.size();
        if width == 0 || height == 0 || (width, height) != (self.config.width, self.config.height)
        {
            return Ok(());
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.configure();
                return Ok(());
            }
            Err(SurfaceError::Timeout) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let pixels = match swizzle_for(self.config.format) {
            Some(true) => to_bgra(canvas.pixels()),
            _ => canvas.pixels().to_vec(),
        };

        self.queue.write_texture(
            frame.texture.as_image_copy(),
            &pixels,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::empty());
        frame.present();
        Ok(())
    }
}

/// `Some(true)` if the format wants blue first, `None` if we can't write it at all.
fn swizzle_for(format: TextureFormat) -> Option<bool> {
    match format {
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => Some(false),
        TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => Some(true),
        _ => None,
    }
}

fn to_bgra(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|p| [p[2], p[1], p[0], p[3]])
        .collect()
}
