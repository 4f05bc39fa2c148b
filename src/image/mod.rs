//! Image loading and preprocessing utilities.

mod load;
mod preprocess;

pub use load::load_image;
pub use preprocess::preprocess;

use ndarray::Array4;

/// Model input tensor in NHWC format (batch, height, width, channels).
/// Values are normalized to [0, 1]; the flat element order is row-major
/// pixels with interleaved R,G,B channels.
pub type InputTensor = Array4<f32>;

/// Input size the bundled cats-vs-dogs model was exported with. Used as a
/// fallback when the model declares a dynamic spatial shape.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;
