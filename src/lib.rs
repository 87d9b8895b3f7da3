//! # lsb_seal 库
//!
//! 本库包含加密 LSB 隐写工具的核心逻辑：比特打包、长度头部、
//! 像素编解码器，以及围绕它们的加密、图像读写和命令处理。

// 声明库包含的所有模块。

pub mod bits;
pub mod cipher;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod header;
pub mod image_io;
pub mod pixels;
pub mod steganography;

pub use error::{CipherError, StegoError};
pub use pixels::{Pixel, PixelSink, PixelSource};
pub use steganography::{capacity_bits, embed, embed_in_place, extract, max_payload_len};
