pub mod convert_color;
pub mod dynamic;

pub use convert_color::{bgr_to_rgb_into, swap_red_blue};
pub use dynamic::{segment_image, SegmentedImage};
