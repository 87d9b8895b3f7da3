use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::constants::{BITS_PER_BYTE, BITS_PER_PIXEL, HEADER_BITS};
use crate::error::StegoError;
use crate::header::LengthHeader;
use crate::pixels::{PixelSink, PixelSource};
use log::debug;

/// 图像可用于隐写的总比特数：每个像素 3 位 (R、G、B 的最低位)。
pub fn capacity_bits<P: PixelSource + ?Sized>(pixels: &P) -> u64 {
    pixels.pixel_count() as u64 * BITS_PER_PIXEL as u64
}

/// 扣除长度头部后，图像最多还能容纳的载荷字节数。
pub fn max_payload_len<P: PixelSource + ?Sized>(pixels: &P) -> u64 {
    let bytes = capacity_bits(pixels).saturating_sub(HEADER_BITS as u64) / BITS_PER_BYTE as u64;
    bytes.min(u64::from(u32::MAX))
}

/// 把带长度前缀的载荷写入像素副本，原始序列保持不变。
///
/// # Errors
///
/// * 载荷超过 `u32` 范围时返回 [`StegoError::PayloadTooLarge`]。
/// * 容量不足时返回 [`StegoError::InsufficientCapacity`]，此时不会复制或修改任何像素。
pub fn embed<P: PixelSink + Clone>(pixels: &P, payload: &[u8]) -> Result<P, StegoError> {
    let header = check_capacity(pixels, payload)?;
    let mut stego = pixels.clone();
    write_bits(&mut stego, header, payload)?;
    Ok(stego)
}

/// 与 [`embed`] 相同，但直接修改调用方交出的缓冲区。
///
/// 容量检查先于任何写入，失败时缓冲区原封不动。
pub fn embed_in_place<P: PixelSink + ?Sized>(
    pixels: &mut P,
    payload: &[u8],
) -> Result<(), StegoError> {
    let header = check_capacity(pixels, payload)?;
    write_bits(pixels, header, payload)
}

/// 从像素的 R、G、B 最低位中读出长度头部和载荷。
///
/// 只做结构上的逆变换，不解密也不校验载荷内容。
///
/// # Errors
///
/// * 可用比特少于 32 时返回 [`StegoError::HeaderTooShort`]。
/// * 头部声明的长度超出图像容量时返回 [`StegoError::PayloadTruncated`]，不会返回截断的数据。
pub fn extract<P: PixelSource + ?Sized>(pixels: &P) -> Result<Vec<u8>, StegoError> {
    let available_bits = capacity_bits(pixels);
    if available_bits < HEADER_BITS as u64 {
        return Err(StegoError::HeaderTooShort { available_bits });
    }

    let mut bits = lsb_bits(pixels);

    let mut header_bits = [false; HEADER_BITS];
    for slot in header_bits.iter_mut() {
        *slot = bits
            .next()
            .ok_or(StegoError::Corrupted("header bits shorter than reported capacity"))?;
    }
    let header = LengthHeader::from_bits(&header_bits);

    if header.required_bits() > available_bits {
        return Err(StegoError::PayloadTruncated {
            declared_length: header.byte_len(),
            available_bits,
        });
    }

    let payload_bit_len = usize::try_from(header.required_bits() - HEADER_BITS as u64)
        .map_err(|_| StegoError::Corrupted("payload bit count exceeds address space"))?;
    let payload_bits: Vec<bool> = bits.take(payload_bit_len).collect();
    if payload_bits.len() != payload_bit_len {
        return Err(StegoError::Corrupted("payload bits shorter than reported capacity"));
    }

    debug!(
        "Extracted header declaring {} bytes from {} available bits",
        header.byte_len(),
        available_bits
    );

    bits_to_bytes(&payload_bits)
}

fn check_capacity<P: PixelSource + ?Sized>(
    pixels: &P,
    payload: &[u8],
) -> Result<LengthHeader, StegoError> {
    let header = LengthHeader::try_from(payload.len())?;
    let needed_bits = header.required_bits();
    let available_bits = capacity_bits(pixels);

    if needed_bits > available_bits {
        return Err(StegoError::InsufficientCapacity {
            needed_bits,
            available_bits,
        });
    }

    debug!("Embedding {needed_bits} bits into {available_bits} available bits");
    Ok(header)
}

fn write_bits<P: PixelSink + ?Sized>(
    pixels: &mut P,
    header: LengthHeader,
    payload: &[u8],
) -> Result<(), StegoError> {
    let mut bits = header
        .to_bits()
        .into_iter()
        .chain(bytes_to_bits(payload))
        .peekable();

    let mut index = 0;
    while bits.peek().is_some() {
        if index >= pixels.pixel_count() {
            return Err(StegoError::Corrupted("ran out of pixels while embedding"));
        }

        let mut pixel = pixels.pixel(index);
        for (channel, bit) in pixel.iter_mut().take(BITS_PER_PIXEL).zip(bits.by_ref()) {
            *channel = (*channel & 0xFE) | bit as u8;
        }
        pixels.set_pixel(index, pixel);
        index += 1;
    }

    Ok(())
}

// 按像素顺序依次产出 R、G、B 的最低位。
fn lsb_bits<P: PixelSource + ?Sized>(pixels: &P) -> impl Iterator<Item = bool> + '_ {
    (0..pixels.pixel_count()).flat_map(move |index| {
        pixels
            .pixel(index)
            .into_iter()
            .take(BITS_PER_PIXEL)
            .map(|channel| channel & 1 == 1)
    })
}
