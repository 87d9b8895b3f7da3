//! # 长度头部
//!
//! 载荷前固定 32 位的大端长度前缀。用独立的定宽类型表示，
//! 而不是复用通用的比特串路径。

use crate::constants::{BITS_PER_BYTE, HEADER_BITS};
use crate::error::StegoError;

/// 载荷字节长度的 32 位大端编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthHeader(u32);

impl LengthHeader {
    pub fn new(len: u32) -> Self {
        Self(len)
    }

    /// 头部声明的载荷字节数。
    pub fn byte_len(self) -> u32 {
        self.0
    }

    /// 头部加载荷一共需要的比特数：`32 + 8 * len`。
    pub fn required_bits(self) -> u64 {
        HEADER_BITS as u64 + BITS_PER_BYTE as u64 * u64::from(self.0)
    }

    /// 按最高位优先展开为 32 个比特。
    pub fn to_bits(self) -> [bool; HEADER_BITS] {
        std::array::from_fn(|i| (self.0 >> (HEADER_BITS - 1 - i)) & 1 == 1)
    }

    pub fn from_bits(bits: &[bool; HEADER_BITS]) -> Self {
        let mut value = 0u32;
        for &bit in bits {
            value = (value << 1) | u32::from(bit);
        }
        Self(value)
    }
}

impl TryFrom<usize> for LengthHeader {
    type Error = StegoError;

    fn try_from(len: usize) -> Result<Self, Self::Error> {
        u32::try_from(len)
            .map(Self)
            .map_err(|_| StegoError::PayloadTooLarge { len })
    }
}
