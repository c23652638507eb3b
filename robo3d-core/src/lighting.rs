/// Per-vertex lighting shared by the CPU rasterizer and the GLSL program
use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};

use crate::geometry::Color;

/// Ambient contribution added to every lit vertex.
pub const AMBIENT: f32 = 0.3;

/// Vertex program matching [`vertex_color`], for hosts with a GPU.
pub const VERTEX_SHADER: &str = r#"#version 300 es
uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;
uniform vec4 u_Color;
uniform mat3 normalMatrix;
uniform vec4 lightPosition;
uniform float ambientFactor;
in vec4 a_Position;
in vec3 a_Normal;
out vec4 color;
void main() {
    vec3 lightDirection = normalize((view * lightPosition - view * model * a_Position).xyz);
    vec3 normal = normalize(normalMatrix * a_Normal);
    float diffuseFactor = max(0.0, dot(lightDirection, normal));
    color = u_Color * diffuseFactor + u_Color * ambientFactor;
    color.a = 1.0;
    gl_Position = projection * view * model * a_Position;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec4 color;
out vec4 fragColor;
void main() {
    fragColor = color;
}
"#;

/// Diffuse factor of a single vertex, computed in eye space.
pub fn diffuse(
    position: &Point3<f32>,
    normal: &Vector3<f32>,
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    normal_matrix: &Matrix3<f32>,
    light_position: &Vector4<f32>,
) -> f32 {
    let eye_light = view * light_position;
    let eye_vertex = view * model * position.to_homogeneous();
    let to_light = (eye_light - eye_vertex).xyz();
    let n = normal_matrix * normal;

    match (to_light.try_normalize(f32::EPSILON), n.try_normalize(f32::EPSILON)) {
        (Some(l), Some(n)) => l.dot(&n).max(0.0),
        _ => 0.0,
    }
}

/// Lit color: `color * diffuse + color * ambient` with alpha forced to 1.
pub fn shade(color: &Color, diffuse: f32, ambient: f32) -> Color {
    let k = diffuse + ambient;
    [color[0] * k, color[1] * k, color[2] * k, 1.0]
}

/// Full per-vertex lighting as the vertex program does it.
#[allow(clippy::too_many_arguments)]
pub fn vertex_color(
    position: &Point3<f32>,
    normal: &Vector3<f32>,
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    normal_matrix: &Matrix3<f32>,
    light_position: &Vector4<f32>,
    color: &Color,
    ambient: f32,
) -> Color {
    let d = diffuse(position, normal, model, view, normal_matrix, light_position);
    shade(color, d, ambient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_light_is_fully_lit() {
        let light = Vector4::new(0.0, 10.0, 0.0, 1.0);
        let d = diffuse(
            &Point3::origin(),
            &Vector3::y(),
            &Matrix4::identity(),
            &Matrix4::identity(),
            &Matrix3::identity(),
            &light,
        );
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_facing_away_gets_ambient_only() {
        let light = Vector4::new(0.0, 10.0, 0.0, 1.0);
        let color = vertex_color(
            &Point3::origin(),
            &-Vector3::y(),
            &Matrix4::identity(),
            &Matrix4::identity(),
            &Matrix3::identity(),
            &light,
            &[0.0, 0.0, 1.0, 0.5],
            AMBIENT,
        );
        assert_eq!(color, [0.0, 0.0, AMBIENT, 1.0]);
    }
}
