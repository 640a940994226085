//! Real-world scenario benchmarks.
//!
//! Complete note chains as the engine builds them, a scheduled sequence on
//! a timeline, and palette extraction from a photo-sized buffer.

mod chains;
mod palette;
mod timeline;

pub use chains::bench_chains;
pub use palette::bench_palette;
pub use timeline::bench_timeline;
