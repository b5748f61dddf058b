pub mod assembler;
pub mod clip;
pub mod convert;
pub mod decode;
pub mod encode;

pub use assembler::{AssemblyError, AudioAssembler, DEFAULT_PAUSE};
pub use clip::AudioClip;
pub use convert::{conform, ConvertError};
pub use decode::{decode_file, DecodeError};
pub use encode::{OutputFormat, DEFAULT_BITRATE_KBPS};
