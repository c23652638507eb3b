/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use robo3d_core::lighting;
use robo3d_core::projection::project_to_screen;
use robo3d_core::{
    Color, CubeMesh, DrawCall, DrawError, FrameUniforms, RenderBackend, Transform, Triangle,
};
use std::io::Write;
use std::sync::Arc;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// A vertex after projection and lighting.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    color: Color,
    /// Light factor `diffuse + ambient`, drives the character choice.
    intensity: f32,
}

/// CPU backend that rasterizes the cube into character cells.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    mesh: Arc<CubeMesh>,
    frame: Option<FrameUniforms>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![[0.0; 4]; size],
            mesh: Arc::new(CubeMesh::unit()),
            frame: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            mesh: Arc::clone(&self.mesh),
            frame: self.frame.take(),
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill([0.0; 4]);
    }

    /// Character at a cell, `None` outside the buffer.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Number of cells covered by geometry.
    pub fn covered(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        mvp: &Matrix4<f32>,
        call: &DrawCall,
        frame: &FrameUniforms,
    ) {
        // Project and light vertices
        let mut screen = [None; 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            let Some((x, y, depth)) =
                project_to_screen(mvp, &vertex.position, self.width as u32, self.height as u32)
            else {
                return; // Triangle is clipped
            };
            let diffuse = lighting::diffuse(
                &vertex.position,
                &vertex.normal,
                &call.model,
                &frame.view,
                &call.normal_matrix,
                &frame.light_position,
            );
            *slot = Some(ScreenVertex {
                x,
                y,
                depth,
                color: lighting::shade(&call.color, diffuse, frame.ambient),
                intensity: diffuse + frame.ambient,
            });
        }

        if let [Some(v0), Some(v1), Some(v2)] = screen {
            self.rasterize_triangle(&[v0, v1, v2]);
        }
    }

    fn rasterize_triangle(&mut self, verts: &[ScreenVertex; 3]) {
        let [v0, v1, v2] = verts;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                // Gouraud: interpolate the lit vertex colors
                let mut color = [0.0; 4];
                for (c, channel) in color.iter_mut().enumerate() {
                    *channel = w0 * v0.color[c] + w1 * v1.color[c] + w2 * v2.color[c];
                }
                let intensity = w0 * v0.intensity + w1 * v1.intensity + w2 * v2.intensity;

                self.depth_buffer[idx] = depth;
                self.color_buffer[idx] = color;
                self.char_buffer[idx] = ramp(intensity);
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                let color = to_term_color(&self.color_buffer[idx]);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.clear();
        self.frame = Some(frame.clone());
    }

    fn draw_cube(&mut self, call: &DrawCall) -> Result<(), DrawError> {
        let frame = self.frame.clone().ok_or(DrawError::MissingUniform("view"))?;
        let mvp = Transform::mvp_matrix(&call.model, &frame.view, &frame.projection);

        let mesh = Arc::clone(&self.mesh);
        for triangle in mesh.triangles() {
            self.render_triangle(&triangle, &mvp, call, &frame);
        }
        Ok(())
    }
}

/// Map a light factor to a ramp character; anything lit is at least visible.
fn ramp(intensity: f32) -> char {
    let top = LUMINOSITY_RAMP.len() - 1;
    let index = (intensity.clamp(0.0, 1.0) * top as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, top)]
}

fn to_term_color(color: &Color) -> TermColor {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    TermColor::Rgb {
        r: channel(color[0]),
        g: channel(color[1]),
        b: channel(color[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use robo3d_core::{Scene, SceneConfig};

    fn scene_for(width: usize, height: usize) -> Scene {
        let mut scene = Scene::new(SceneConfig::default());
        scene.set_viewport(width as u32, height as u32 * 2);
        scene
    }

    #[test]
    fn test_draw_without_frame_is_rejected() {
        let mut renderer = AsciiRenderer::new(10, 10);
        let scene = Scene::default();
        let call = DrawCall {
            model: Matrix4::identity(),
            normal_matrix: nalgebra::Matrix3::identity(),
            color: scene.config().default_color,
        };
        assert_eq!(
            renderer.draw_cube(&call),
            Err(DrawError::MissingUniform("view"))
        );
    }

    #[test]
    fn test_robot_covers_the_center() {
        let scene = scene_for(80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        let stats = scene.render_frame(&mut renderer);

        assert_eq!(stats.skipped, 0);
        assert!(renderer.covered() > 0);
        assert_ne!(renderer.cell(40, 20), Some(' '));
    }

    #[test]
    fn test_begin_frame_clears() {
        let scene = scene_for(40, 20);
        let mut renderer = AsciiRenderer::new(40, 20);
        scene.render_frame(&mut renderer);
        renderer.begin_frame(&scene.frame_uniforms());
        assert_eq!(renderer.covered(), 0);
    }

    #[test]
    fn test_draw_writes_every_row() {
        let mut renderer = AsciiRenderer::new(4, 3);
        renderer.clear();
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 3);
    }

    #[test]
    fn test_ramp_bounds() {
        assert_eq!(ramp(-1.0), '.');
        assert_eq!(ramp(0.0), '.');
        assert_eq!(ramp(2.0), '@');
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }
}
