//! # 比特打包/解包
//!
//! 字节序列与比特串之间的转换。每个字节内部按最高有效位优先 (大端) 展开。
//! 解包只接受长度为 8 的倍数的比特串，不存在补零路径。

use crate::constants::BITS_PER_BYTE;
use crate::error::StegoError;

/// 把字节序列展开为比特串，每个字节最高位在前。
///
/// 输出长度恒为 `8 * data.len()`，对任何输入都不会失败。
pub fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    data.iter()
        .flat_map(|&byte| {
            (0..BITS_PER_BYTE)
                .rev()
                .map(move |shift| (byte >> shift) & 1 == 1)
        })
        .collect()
}

/// 把比特串按 8 位一组还原为字节，每组最高位在前。
///
/// # Errors
///
/// 如果 `bits.len()` 不是 8 的倍数，返回 [`StegoError::UnalignedBits`]。
pub fn bits_to_bytes(bits: &[bool]) -> Result<Vec<u8>, StegoError> {
    if bits.len() % BITS_PER_BYTE != 0 {
        return Err(StegoError::UnalignedBits { bits: bits.len() });
    }

    Ok(bits
        .chunks_exact(BITS_PER_BYTE)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect())
}
