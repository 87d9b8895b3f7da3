//! # 错误类型
//!
//! 库层面的类型化错误。命令处理层 (`handler`) 通过 `anyhow` 为它们附加上下文，
//! 但从不吞掉它们。

use thiserror::Error;

/// 隐写编解码过程中可能出现的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 载荷放不进目标图像；图像保持原样。
    #[error("insufficient capacity: need {needed_bits} bits, have {available_bits} bits")]
    InsufficientCapacity {
        needed_bits: u64,
        available_bits: u64,
    },

    /// 图像太小，连 32 位长度头部都放不下。
    #[error("image too small for a length header: {available_bits} bits available")]
    HeaderTooShort { available_bits: u64 },

    /// 头部声明的长度超出了图像实际承载的数据量。
    #[error("payload truncated: header declares {declared_length} bytes, have {available_bits} bits")]
    PayloadTruncated {
        declared_length: u32,
        available_bits: u64,
    },

    /// 载荷长度无法用 32 位无符号整数表示。
    #[error("payload of {len} bytes exceeds the 32-bit length header")]
    PayloadTooLarge { len: usize },

    /// 比特串长度不是 8 的倍数，无法无损地转换为字节。
    #[error("bit string of length {bits} is not byte aligned")]
    UnalignedBits { bits: usize },

    /// 内部不变量被破坏。
    #[error("internal invariant violated: {0}")]
    Corrupted(&'static str),
}

/// 加密协作方的错误。
#[derive(Debug, Error)]
pub enum CipherError {
    /// 密钥错误或密文被篡改。刻意不区分两者。
    #[error("authentication failed: wrong key or tampered ciphertext")]
    AuthenticationOrKey,

    /// 密文短于 nonce 与认证标签之和。
    #[error("ciphertext of {len} bytes is too short to be a sealed token")]
    TokenTooShort { len: usize },

    /// 密钥文件内容无法解析为 32 字节密钥。
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("key file I/O failed")]
    Io(#[from] std::io::Error),
}
