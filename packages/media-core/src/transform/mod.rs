pub mod decode;
pub mod encode;
pub mod normalize;
pub mod params;
pub mod resize;

pub use decode::decode_image;
pub use encode::encode_jpeg;
pub use normalize::{ImageNormalizer, NormalizedImage};
pub use params::TransformParams;
pub use resize::resize_exact;
