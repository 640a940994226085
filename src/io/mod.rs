// Purpose - external interfaces, format conversions

pub mod rgba;
pub mod svg;

pub use rgba::pixels_from_rgba;
pub use svg::{export_file_name, render_svg};
