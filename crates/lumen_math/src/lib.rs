// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod basis;
mod ray;
pub use basis::Basis;
pub use ray::Ray;
