pub mod convert;
pub mod diagnostics;
pub mod formats;
pub mod geometry;
pub mod logger;
pub mod mesh;
pub mod pipeline;
