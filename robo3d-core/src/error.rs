/// Error types shared by the core and the rendering hosts
use thiserror::Error;

/// Failures that abort start-up. The animation loop never starts after one.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to get the rendering context: {0}")]
    Context(String),

    #[error("failed to compile shader: {0}")]
    ShaderCompile(String),

    #[error("failed to link program: {0}")]
    ProgramLink(String),

    #[error("failed to create the buffer object")]
    BufferAllocation,

    #[error("failed to get the storage location of {0}")]
    MissingAttribute(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of a single draw call. The call is skipped, the frame goes on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    #[error("failed to get the storage location of {0}")]
    MissingAttribute(&'static str),

    #[error("failed to get the uniform location of {0}")]
    MissingUniform(&'static str),

    #[error("model-view matrix is singular, no normal matrix")]
    SingularNormalMatrix,
}
