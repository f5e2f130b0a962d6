use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal configuration errors.
///
/// These are precondition failures detected when scene content is built,
/// before any time step runs. Numerical degeneracies inside a step (parallel
/// segments, zero-length trajectories, coincident fluid particles) are
/// absorbed as "no intersection" / zero contribution and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Smoothing radius, rest density, volume or particle count of a fluid
    /// is not usable.
    #[error("invalid fluid parameter: {0}")]
    InvalidFluid(String),

    /// Mesh dimensions do not match its particle storage, or a dimension is
    /// too small to carry a spring.
    #[error("invalid mesh topology: {0}")]
    InvalidMesh(String),

    /// An emitter was configured with a direction that is not unit length,
    /// or an otherwise unusable parameter.
    #[error("invalid emitter parameter: {0}")]
    InvalidEmitter(String),

    /// Degenerate geometry: zero normal, non-coplanar rectangle vertex,
    /// triangle index out of range in a soup.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
