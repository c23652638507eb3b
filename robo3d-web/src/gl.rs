/// WebGL2 implementation of the rendering backend
use nalgebra::{Matrix3, Matrix4};
use robo3d_core::lighting::{FRAGMENT_SHADER, VERTEX_SHADER};
use robo3d_core::{CubeMesh, DrawCall, DrawError, FrameUniforms, RenderBackend, SetupError};
use tracing::info;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation,
};

const POSITION_ATTRIBUTE: &str = "a_Position";
const NORMAL_ATTRIBUTE: &str = "a_Normal";

/// Compiled lighting program plus the cube's position and normal buffers.
pub struct WebGlBackend {
    gl: GL,
    program: WebGlProgram,
    position_buffer: WebGlBuffer,
    normal_buffer: WebGlBuffer,
    vertex_count: i32,
    frame: Option<FrameUniforms>,
}

impl WebGlBackend {
    /// Acquire a WebGL2 context on `canvas`, build the program and upload `mesh`.
    pub fn new(canvas: &HtmlCanvasElement, mesh: &CubeMesh) -> Result<Self, SetupError> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|e| SetupError::Context(format!("{e:?}")))?
            .ok_or_else(|| SetupError::Context("WebGL2 not supported".to_string()))?
            .dyn_into()
            .map_err(|_| SetupError::Context("context is not WebGL2".to_string()))?;

        let program = link_program(&gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        for attribute in [POSITION_ATTRIBUTE, NORMAL_ATTRIBUTE] {
            if gl.get_attrib_location(&program, attribute) < 0 {
                return Err(SetupError::MissingAttribute(attribute));
            }
        }

        let position_buffer = upload(&gl, &mesh.positions())?;
        let normal_buffer = upload(&gl, &mesh.normals())?;
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        gl.enable(GL::DEPTH_TEST);
        gl.viewport(0, 0, canvas.width() as i32, canvas.height() as i32);
        info!(vertices = mesh.vertex_count(), "WebGL2 backend ready");

        Ok(Self {
            gl,
            program,
            position_buffer,
            normal_buffer,
            vertex_count: mesh.vertex_count() as i32,
            frame: None,
        })
    }

    fn uniform(&self, name: &'static str) -> Result<WebGlUniformLocation, DrawError> {
        self.gl
            .get_uniform_location(&self.program, name)
            .ok_or(DrawError::MissingUniform(name))
    }

    fn set_matrix4(&self, name: &'static str, matrix: &Matrix4<f32>) -> Result<(), DrawError> {
        let location = self.uniform(name)?;
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(&location), false, matrix.as_slice());
        Ok(())
    }

    fn set_matrix3(&self, name: &'static str, matrix: &Matrix3<f32>) -> Result<(), DrawError> {
        let location = self.uniform(name)?;
        self.gl
            .uniform_matrix3fv_with_f32_array(Some(&location), false, matrix.as_slice());
        Ok(())
    }

    fn set_vec4(&self, name: &'static str, v: [f32; 4]) -> Result<(), DrawError> {
        let location = self.uniform(name)?;
        self.gl.uniform4f(Some(&location), v[0], v[1], v[2], v[3]);
        Ok(())
    }

    fn attribute(&self, name: &'static str) -> Result<u32, DrawError> {
        let location = self.gl.get_attrib_location(&self.program, name);
        u32::try_from(location).map_err(|_| DrawError::MissingAttribute(name))
    }

    fn bind_attribute(&self, location: u32, buffer: &WebGlBuffer) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl
            .vertex_attrib_pointer_with_i32(location, 3, GL::FLOAT, false, 0, 0);
    }

    fn draw(&self, frame: &FrameUniforms, call: &DrawCall) -> Result<(), DrawError> {
        let position = self.attribute(POSITION_ATTRIBUTE)?;
        let normal = self.attribute(NORMAL_ATTRIBUTE)?;
        self.bind_attribute(position, &self.position_buffer);
        self.bind_attribute(normal, &self.normal_buffer);

        self.set_matrix4("view", &frame.view)?;
        self.set_matrix4("projection", &frame.projection)?;
        let l = &frame.light_position;
        self.set_vec4("lightPosition", [l.x, l.y, l.z, l.w])?;
        let ambient = self.uniform("ambientFactor")?;
        self.gl.uniform1f(Some(&ambient), frame.ambient);

        self.set_vec4("u_Color", call.color)?;
        self.set_matrix4("model", &call.model)?;
        self.set_matrix3("normalMatrix", &call.normal_matrix)?;

        self.gl.draw_arrays(GL::TRIANGLES, 0, self.vertex_count);
        Ok(())
    }
}

impl RenderBackend for WebGlBackend {
    fn begin_frame(&mut self, frame: &FrameUniforms) {
        let [r, g, b, a] = frame.clear_color;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        self.frame = Some(frame.clone());
    }

    fn draw_cube(&mut self, call: &DrawCall) -> Result<(), DrawError> {
        let frame = self.frame.as_ref().ok_or(DrawError::MissingUniform("view"))?;

        self.gl.use_program(Some(&self.program));
        let result = self.draw(frame, call);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);
        self.gl.use_program(None);
        result
    }
}

fn compile_shader(gl: &GL, src: &str, shader_type: u32) -> Result<WebGlShader, SetupError> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| SetupError::ShaderCompile("could not create shader".to_string()))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if !gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(SetupError::ShaderCompile(log));
    }
    Ok(shader)
}

fn link_program(gl: &GL, vert_src: &str, frag_src: &str) -> Result<WebGlProgram, SetupError> {
    let vert = compile_shader(gl, vert_src, GL::VERTEX_SHADER)?;
    let frag = compile_shader(gl, frag_src, GL::FRAGMENT_SHADER)?;
    let program = gl
        .create_program()
        .ok_or_else(|| SetupError::ProgramLink("could not create program".to_string()))?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    gl.delete_shader(Some(&vert));
    gl.delete_shader(Some(&frag));
    if !gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        return Err(SetupError::ProgramLink(log));
    }
    Ok(program)
}

fn upload(gl: &GL, data: &[f32]) -> Result<WebGlBuffer, SetupError> {
    let buffer = gl.create_buffer().ok_or(SetupError::BufferAllocation)?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    let array = js_sys::Float32Array::from(data);
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
    Ok(buffer)
}
