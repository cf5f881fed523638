#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad window that draws a Plungers [`Scene`] and reports held keys and the pointer.
//!
//! Macroquad is built without its `audio` feature, so no sound libraries are needed.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};
use plunger_core::Direction;
use plunger_rendering::{
    FrameInput, FrameSimulationBreakdown, Presentation, RenderingBackend, Scene,
};
use std::time::{Duration, Instant};
use tracing::info;

const DEFAULT_WINDOW_WIDTH: i32 = 800;
const DEFAULT_WINDOW_HEIGHT: i32 = 600;

/// Keys that end the render loop.
const QUIT_KEYS: [KeyCode; 2] = [KeyCode::Escape, KeyCode::Q];

fn quit_requested() -> bool {
    QUIT_KEYS.into_iter().any(is_key_pressed)
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl MacroquadBackend {
    /// Backend with an 800x600 window and the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for vertical blank between frames when `enabled`, otherwise presents immediately.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }

    /// Logs averaged frame timings once a second when `show` is set.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Window size in pixels; values beyond `i32::MAX` saturate.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = i32::try_from(width).unwrap_or(i32::MAX);
        self.window_height = i32::try_from(height).unwrap_or(i32::MAX);
        self
    }
}

/// Wall-clock cost of one rendered frame, split by stage.
#[derive(Clone, Copy, Debug, Default)]
struct FrameSample {
    frame: Duration,
    simulation: Duration,
    scene_population: Duration,
    render: Duration,
}

/// Per-frame averages over one reporting period.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TimingReport {
    fps: f32,
    simulation: Duration,
    scene_population: Duration,
    render: Duration,
}

/// Sums frame samples and yields a [`TimingReport`] once a second of frames has accumulated.
#[derive(Debug, Default)]
struct FrameTimings {
    frames: u32,
    totals: FrameSample,
}

impl FrameTimings {
    const PERIOD: Duration = Duration::from_secs(1);

    fn record(&mut self, sample: FrameSample) -> Option<TimingReport> {
        self.frames = self.frames.saturating_add(1);
        self.totals.frame += sample.frame;
        self.totals.simulation += sample.simulation;
        self.totals.scene_population += sample.scene_population;
        self.totals.render += sample.render;

        if self.totals.frame < Self::PERIOD {
            return None;
        }

        let Self { frames, totals } = std::mem::take(self);
        Some(TimingReport {
            fps: frames as f32 / totals.frame.as_secs_f32(),
            simulation: totals.simulation / frames,
            scene_population: totals.scene_population / frames,
            render: totals.render / frames,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut timings = FrameTimings::default();

            loop {
                if quit_requested() {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input();

                let simulation_breakdown = update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                draw_tiles(&scene);
                let render_duration = render_start.elapsed();

                let sample = FrameSample {
                    frame: frame_dt,
                    simulation: simulation_breakdown.simulation,
                    scene_population: simulation_breakdown.scene_population,
                    render: render_duration,
                };
                if show_fps {
                    if let Some(report) = timings.record(sample) {
                        info!(
                            fps = report.fps,
                            sim_ms = report.simulation.as_secs_f64() * 1_000.0,
                            scene_ms = report.scene_population.as_secs_f64() * 1_000.0,
                            render_ms = report.render.as_secs_f64() * 1_000.0,
                            "frame timings"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn direction_key(direction: Direction) -> KeyCode {
    match direction {
        Direction::Up => KeyCode::Up,
        Direction::Down => KeyCode::Down,
        Direction::Left => KeyCode::Left,
        Direction::Right => KeyCode::Right,
    }
}

fn gather_frame_input() -> FrameInput {
    let mut held = [false; 4];
    for direction in Direction::ALL {
        held[direction.index()] = is_key_down(direction_key(direction));
    }
    let (cursor_x, cursor_y) = mouse_position();
    let inject = is_mouse_button_down(MouseButton::Left);

    gather_frame_input_from_observations(
        held,
        Vec2::new(cursor_x, cursor_y),
        inject,
        macroquad::window::screen_width(),
        macroquad::window::screen_height(),
    )
}

fn gather_frame_input_from_observations(
    held: [bool; 4],
    cursor_position: Vec2,
    inject: bool,
    screen_width: f32,
    screen_height: f32,
) -> FrameInput {
    let inside = cursor_position.x >= 0.0
        && cursor_position.y >= 0.0
        && cursor_position.x < screen_width
        && cursor_position.y < screen_height;

    FrameInput {
        held,
        pointer: inside.then_some(cursor_position),
        inject,
    }
}

fn draw_tiles(scene: &Scene) {
    let length = scene.grid.cell_length;
    for tile in &scene.tiles {
        let origin = scene.grid.cell_origin(tile.column, tile.row);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            length,
            length,
            to_macroquad_color(tile.color),
        );
    }
}

fn to_macroquad_color(color: plunger_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_keys_follow_arrow_layout() {
        let keys: Vec<_> = Direction::ALL.into_iter().map(direction_key).collect();

        assert_eq!(
            keys,
            vec![KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right]
        );
    }

    #[test]
    fn pointer_reported_only_inside_window() {
        let inside = gather_frame_input_from_observations(
            [true, false, false, true],
            Vec2::new(60.0, 25.0),
            true,
            800.0,
            600.0,
        );
        let outside = gather_frame_input_from_observations(
            [false; 4],
            Vec2::new(-1.0, 25.0),
            true,
            800.0,
            600.0,
        );

        assert_eq!(
            inside,
            FrameInput {
                held: [true, false, false, true],
                pointer: Some(Vec2::new(60.0, 25.0)),
                inject: true,
            }
        );
        assert_eq!(outside.pointer, None);
        assert!(outside.inject);
    }

    #[test]
    fn backend_builder_records_configuration() {
        let backend = MacroquadBackend::new()
            .with_vsync(false)
            .with_show_fps(true)
            .with_window_size(640, 480);

        assert_eq!(backend.swap_interval, Some(0));
        assert!(backend.show_fps);
        assert_eq!((backend.window_width, backend.window_height), (640, 480));
    }

    #[test]
    fn timings_report_once_per_second_of_frames() {
        let mut timings = FrameTimings::default();
        let sample = FrameSample {
            frame: Duration::from_millis(250),
            simulation: Duration::from_millis(4),
            scene_population: Duration::from_millis(2),
            render: Duration::from_millis(6),
        };

        for _ in 0..3 {
            assert_eq!(timings.record(sample), None);
        }
        let report = timings
            .record(FrameSample {
                simulation: Duration::from_millis(8),
                ..sample
            })
            .expect("a full second has elapsed");

        assert!((report.fps - 4.0).abs() <= 1e-3);
        assert_eq!(report.simulation, Duration::from_millis(5));
        assert_eq!(report.scene_population, Duration::from_millis(2));
        assert_eq!(report.render, Duration::from_millis(6));
        assert_eq!(timings.record(sample), None);
    }
}
