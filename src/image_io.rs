//! # 图像读写
//!
//! 基于 `image` 库的像素访问层。任何输入都会先转换为 RGBA8，
//! 像素按行优先顺序编号，多次读取顺序一致。

use crate::pixels::{Pixel, PixelSink, PixelSource};
use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;
use std::path::Path;

impl PixelSource for RgbaImage {
    fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    fn pixel(&self, index: usize) -> Pixel {
        let (x, y) = coordinates(self, index);
        self.get_pixel(x, y).0
    }
}

impl PixelSink for RgbaImage {
    fn set_pixel(&mut self, index: usize, pixel: Pixel) {
        let (x, y) = coordinates(self, index);
        self.put_pixel(x, y, Rgba(pixel));
    }
}

fn coordinates(image: &RgbaImage, index: usize) -> (u32, u32) {
    let width = image.width() as usize;
    ((index % width) as u32, (index / width) as u32)
}

/// 打开图像并统一转换为 RGBA8。
pub fn load_rgba(path: &Path) -> image::ImageResult<RgbaImage> {
    let image = image::open(path)?;
    debug!(
        "Loaded {}x{} image ({:?}) from {}",
        image.width(),
        image.height(),
        image.color(),
        path.display()
    );
    Ok(image.into_rgba8())
}

/// 以无损格式保存图像，格式由扩展名决定。
///
/// 只启用了无损编码器，写入有损格式 (如 JPEG) 会返回 `Unsupported` 错误，
/// 因为有损压缩会破坏最低有效位。
pub fn save_rgba(image: &RgbaImage, path: &Path) -> image::ImageResult<()> {
    let format = ImageFormat::from_path(path)?;
    image.save_with_format(path, format)?;
    debug!("Saved {:?} image to {}", format, path.display());
    Ok(())
}
