/// LIFO stack of composed transformation matrices
use nalgebra::Matrix4;
use tracing::warn;

/// Holds the chain of ancestor transforms during one traversal.
///
/// Underflow is reported through `tracing` and answered with `None`;
/// the stack never invents a matrix to hand back.
#[derive(Debug, Default)]
pub struct TransformStack {
    elements: Vec<Matrix4<f32>>,
    pushes: usize,
    pops: usize,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a matrix as the new top. Any matrix is accepted, singular included.
    pub fn push(&mut self, matrix: Matrix4<f32>) {
        self.elements.push(matrix);
        self.pushes += 1;
    }

    /// Matrix at the top of the stack.
    pub fn top(&self) -> Option<&Matrix4<f32>> {
        let top = self.elements.last();
        if top.is_none() {
            warn!(depth = self.depth(), "Transform stack underflow on top");
        }
        top
    }

    /// Removes the top matrix. The vacated slot is released.
    pub fn pop(&mut self) -> Option<Matrix4<f32>> {
        match self.elements.pop() {
            Some(matrix) => {
                self.pops += 1;
                Some(matrix)
            }
            None => {
                warn!("Transform stack underflow on pop");
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    /// Successful pushes since creation.
    pub fn pushes(&self) -> usize {
        self.pushes
    }

    /// Successful pops since creation.
    pub fn pops(&self) -> usize {
        self.pops
    }
}
