/// Terminal host for the robot scene: input, frame pacing and output
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use robo3d_core::{FrameStats, InputEvent, Scene, SetupError};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Approximate pixel size of a terminal cell, so drag sensitivity keeps its
/// degrees-per-pixel meaning.
const CELL_WIDTH_PX: f32 = 8.0;
const CELL_HEIGHT_PX: f32 = 16.0;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    renderer: AsciiRenderer,
    running: bool,
    frame_time: Duration,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    last_stats: FrameStats,
}

impl TerminalApp {
    pub fn new(scene: Scene, target_fps: u32) -> Result<Self, SetupError> {
        let (width, height) = terminal::size()?;

        let mut app = Self {
            scene,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            frame_time: Duration::from_millis(1000 / u64::from(target_fps.max(1))),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            last_stats: FrameStats::default(),
        };
        app.resize(width, height);
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        info!("terminal host started");

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        info!("terminal host stopped");

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Drain input so the whole queue lands before this frame's traversal
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Translate a terminal event into scene input. Returns whether the pose changed.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) => {
                if kind == KeyEventKind::Release {
                    return false;
                }
                match code {
                    KeyCode::Esc | KeyCode::Char('q') => {
                        self.running = false;
                        false
                    }
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        self.running = false;
                        false
                    }
                    KeyCode::Char(c) => self.scene.handle(InputEvent::Key(c)),
                    _ => false,
                }
            }
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => {
                let x = f32::from(column) * CELL_WIDTH_PX;
                let y = f32::from(row) * CELL_HEIGHT_PX;
                let input = match kind {
                    MouseEventKind::Down(MouseButton::Left) => InputEvent::MouseDown { x, y },
                    MouseEventKind::Up(MouseButton::Left) => InputEvent::MouseUp,
                    MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                        InputEvent::MouseMove { x, y }
                    }
                    _ => return false,
                };
                self.scene.handle(input)
            }
            Event::Resize(width, height) => {
                self.resize(width, height);
                false
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(width as usize, height as usize);
        // Cells are about twice as tall as they are wide.
        self.scene
            .set_viewport(u32::from(width), u32::from(height) * 2);
    }

    fn render(&mut self) -> io::Result<()> {
        let stats = self.scene.render_frame(&mut self.renderer);
        if stats != self.last_stats && (!stats.is_balanced() || stats.skipped > 0) {
            warn!(?stats, "frame finished with problems");
        }
        self.last_stats = stats;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let orbit = self.scene.pose().orbit();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::DarkYellow),
            Print(format!(
                "Robo3D | FPS: {:.1} | yaw {:.0} pitch {:.0} | t s a h l y u: joints (Shift reverses) m/M: brows | drag: orbit | q: quit",
                self.fps, orbit.yaw, orbit.pitch
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
