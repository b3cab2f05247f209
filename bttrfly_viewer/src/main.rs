use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bttrfly_card::{CardParams, FloatingCard, FontSet, MarkdownTexture, MarkdownTextureCache};
use bttrfly_monitor::{AudioCue, GreetingSource, SilentAudioCue};
use clap::Parser;
use pollster::FutureExt;
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

mod audio;
mod cli;
mod monitor_demo;
mod texture;
mod viewer;

use audio::ClipAudioCue;
use cli::{Args, load_card_preset};
use texture::dump_texture_to_png;
use viewer::{PointerButton, ViewerState};

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    args.validate()?;

    let card_params = match args.card_preset.as_deref() {
        Some(path) => load_card_preset(path)?,
        None => CardParams::default(),
    };
    println!(
        "Card {:.2}x{:.2}, thickness {:.3}, radius {:.3}, texture {}x{}",
        card_params.width,
        card_params.height,
        card_params.thickness,
        card_params.radius,
        card_params.texture_width,
        card_params.texture_height
    );

    let fonts = load_fonts(&args)?;
    let mut textures = MarkdownTextureCache::new();
    let markdown_texture = fonts.as_ref().map(|fonts| {
        textures.get_or_render(
            &card_params.markdown,
            card_params.texture_width,
            card_params.texture_height,
            fonts,
        )
    });

    if let Some(output_path) = args.dump_texture.as_ref() {
        let Some(texture) = markdown_texture.as_ref() else {
            bail!("--dump-texture needs --font-regular to paint the markdown");
        };
        let stats = dump_texture_to_png(texture, output_path)
            .with_context(|| format!("writing PNG to {}", output_path.display()))?;
        println!(
            "Markdown texture exported to {} ({}x{})",
            output_path.display(),
            texture.width,
            texture.height
        );
        println!(
            "  luminance avg {:.2}, min {}, max {}, opaque pixels {} / {}",
            stats.mean_luma,
            stats.min_luma,
            stats.max_luma,
            stats.opaque_pixels,
            stats.total_pixels
        );
        println!(
            "  quadrant luma means (TL, TR, BL, BR): {:.2}, {:.2}, {:.2}, {:.2}",
            stats.quadrant_means[0],
            stats.quadrant_means[1],
            stats.quadrant_means[2],
            stats.quadrant_means[3]
        );
    }

    if args.monitor_demo {
        let audio: Box<dyn AudioCue> = match args.unlock_sound.as_ref() {
            Some(path) => Box::new(ClipAudioCue::new(path)),
            None => Box::new(SilentAudioCue),
        };
        let greeting = match args.greeting_hour {
            Some(hour) => GreetingSource::Fixed {
                hour,
                seed: args.greeting_seed,
            },
            None => GreetingSource::Clock,
        };
        let monitor = monitor_demo::run_monitor_demo(audio, greeting);
        monitor_demo::print_summary(&monitor);
        if let Some(path) = args.monitor_log_json.as_ref() {
            monitor_demo::write_event_log(&monitor, path)?;
            println!("Monitor event log written to {}", path.display());
        }
    }

    if args.headless {
        println!("Headless mode requested; viewer window bootstrap skipped.");
        return Ok(());
    }

    run_viewer(FloatingCard::new(card_params), markdown_texture)
}

fn load_fonts(args: &Args) -> Result<Option<FontSet>> {
    let Some(regular) = args.font_regular.as_deref() else {
        log::info!("no --font-regular given; markdown texture disabled");
        return Ok(None);
    };
    let fonts = FontSet::load(
        regular,
        args.font_bold.as_deref(),
        args.font_italic.as_deref(),
    )
    .with_context(|| format!("loading fonts from {}", regular.display()))?;
    Ok(Some(fonts))
}

fn run_viewer(card: FloatingCard, markdown: Option<Arc<MarkdownTexture>>) -> Result<()> {
    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Bttrfly Note")
            .with_inner_size(PhysicalSize::new(1280, 800))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let mut state = ViewerState::new(window, card, markdown).block_on()?;

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key: Key::Named(NamedKey::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => target.exit(),
                        WindowEvent::CursorMoved { position, .. } => {
                            state.cursor_moved(position.x as f32, position.y as f32)
                        }
                        WindowEvent::CursorLeft { .. } => state.cursor_left(),
                        WindowEvent::MouseInput {
                            state: button_state,
                            button,
                            ..
                        } => {
                            let button = match button {
                                MouseButton::Left => PointerButton::Primary,
                                MouseButton::Right => PointerButton::Secondary,
                                _ => return,
                            };
                            state.mouse_button(button, button_state == ElementState::Pressed);
                        }
                        WindowEvent::Resized(new_size) => state.resize(new_size),
                        WindowEvent::RedrawRequested => match state.render() {
                            Ok(_) => {}
                            Err(SurfaceError::Lost) => state.resize(state.size()),
                            Err(SurfaceError::OutOfMemory) => target.exit(),
                            Err(err) => eprintln!("[bttrfly_viewer] render error: {err:?}"),
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => state.window().request_redraw(),
                _ => {}
            }
        })
        .context("running viewer application")?;
    Ok(())
}
