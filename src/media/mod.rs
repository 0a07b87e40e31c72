pub mod detection;

pub use detection::{decode_frame_payload, detect_image_mime};
