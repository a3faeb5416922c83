use std::num::NonZeroU32;

use log::{debug, info};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use cpu_mandelbrot::{
    colour, command_encoder,
    command_encoder::CommandEncoderExt,
    field::SampleGrid,
    params::{IterParams, STEP_DOWN, STEP_UP},
    screen::Size,
    var::Var,
    viewport::Viewport,
};

/// Fixed pixel-grid dimensions. The window is created to match and is not
/// resizable, so the grid and pixel buffer are allocated exactly once.
const GRID_SIZE: Size = Size {
    width: 640,
    height: 480,
};

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Mandelbrot")
        .with_inner_size(PhysicalSize::new(GRID_SIZE.width, GRID_SIZE.height))
        .with_resizable(false)
        .build(&event_loop)
        .unwrap();

    let instance = wgpu::Instance::new(wgpu::Backends::all());

    let size = window.inner_size();
    let surface = unsafe { instance.create_surface(&window) };

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: Default::default(),
        force_fallback_adapter: false,
        compatible_surface: Some(&surface),
    }))
    .unwrap();
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("device"),
            features: wgpu::Features::empty(),
            limits: wgpu::Limits::default(),
        },
        None,
    ))
    .unwrap();

    let mut surface_configuration = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface.get_supported_formats(&adapter)[0],
        width: size.width,
        height: size.height,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
    };
    surface.configure(&device, &surface_configuration);

    // The CPU-rendered field is streamed into this texture once per pass and
    // stretched over the surface by the render pipeline.
    let field_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("field-texture"),
        size: wgpu::Extent3d {
            width: GRID_SIZE.width,
            height: GRID_SIZE.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    });
    let field_texture_view = field_texture.create_view(&wgpu::TextureViewDescriptor::default());

    let render_shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("render-shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });

    let render_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("render-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("render-pipeline-layout"),
        bind_group_layouts: &[&render_bind_group_layout],
        push_constant_ranges: &[],
    });

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("render-pipeline"),
        layout: Some(&render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &render_shader_module,
            entry_point: "vertex_main",
            buffers: &[],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &render_shader_module,
            entry_point: "fragment_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_configuration.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    });

    let screen_size_var = Var::init(
        &device,
        "screen-size",
        [size.width as f32, size.height as f32],
    );

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor::default());

    let render_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("render-bind-group"),
        layout: &render_pipeline.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&field_texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: screen_size_var.binding_resource(),
            },
        ],
    });

    // All generate/render passes run on this fixed pool; the event loop
    // thread mutates state strictly between passes.
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .build()
        .unwrap();
    info!("render pool: {} workers", workers.current_num_threads());

    let mut viewport = Viewport::default();
    let mut iter_params = IterParams::default();
    let mut grid = SampleGrid::new(GRID_SIZE);
    let mut pixel_buffer: Vec<u32> = vec![0; GRID_SIZE.pixel_count()];
    let mut field_dirty = true;

    let mut cursor = (0u32, 0u32);
    let mut drag_anchor: Option<(u32, u32)> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    debug!("resizing to {:?}", size);

                    surface_configuration.width = size.width;
                    surface_configuration.height = size.height;
                    surface.configure(&device, &surface_configuration);
                    screen_size_var.write(&queue, [size.width as f32, size.height as f32]);

                    window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = GRID_SIZE.clamp_cursor(position.x, position.y);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => {
                        drag_anchor = Some(cursor);
                    }
                    ElementState::Released => {
                        if let Some(anchor) = drag_anchor.take() {
                            if viewport.zoom_to_rect(anchor, cursor, GRID_SIZE) {
                                field_dirty = true;
                                window.request_redraw();
                            }
                        }
                    }
                },
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    let changed = match key {
                        VirtualKeyCode::Up => {
                            iter_params.scale_divergence_cap(STEP_UP);
                            true
                        }
                        VirtualKeyCode::Down => {
                            iter_params.scale_divergence_cap(STEP_DOWN);
                            true
                        }
                        VirtualKeyCode::Right => {
                            iter_params.scale_max_iters(STEP_UP);
                            true
                        }
                        VirtualKeyCode::Left => {
                            iter_params.scale_max_iters(STEP_DOWN);
                            true
                        }
                        VirtualKeyCode::Space => {
                            viewport.reset();
                            iter_params.reset();
                            info!("plot parameters reset");
                            true
                        }
                        _ => false,
                    };
                    if changed {
                        field_dirty = true;
                        window.request_redraw();
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                if field_dirty {
                    workers.install(|| {
                        grid.sync(&viewport);
                        colour::render(&grid, &iter_params, &mut pixel_buffer);
                    });

                    queue.write_texture(
                        wgpu::ImageCopyTexture {
                            texture: &field_texture,
                            mip_level: 0,
                            origin: wgpu::Origin3d::ZERO,
                            aspect: wgpu::TextureAspect::All,
                        },
                        bytemuck::cast_slice(&pixel_buffer),
                        wgpu::ImageDataLayout {
                            offset: 0,
                            bytes_per_row: NonZeroU32::new(4 * GRID_SIZE.width),
                            rows_per_image: NonZeroU32::new(GRID_SIZE.height),
                        },
                        wgpu::Extent3d {
                            width: GRID_SIZE.width,
                            height: GRID_SIZE.height,
                            depth_or_array_layers: 1,
                        },
                    );
                    field_dirty = false;
                }

                let surface_texture = surface.get_current_texture().unwrap();
                let surface_texture_view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let command_buffer = command_encoder::record(
                    &device,
                    &wgpu::CommandEncoderDescriptor::default(),
                    |command_encoder| {
                        command_encoder.with_render_pass(
                            &wgpu::RenderPassDescriptor {
                                label: Some("render-pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &surface_texture_view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                        store: true,
                                    },
                                })],
                                depth_stencil_attachment: None,
                            },
                            |render_pass| {
                                render_pass.set_pipeline(&render_pipeline);
                                render_pass.set_bind_group(0, &render_bind_group, &[]);
                                render_pass.draw(0..4, 0..1);
                            },
                        );
                    },
                );

                queue.submit([command_buffer]);
                surface_texture.present();
            }
            _ => {}
        }
    });
}
