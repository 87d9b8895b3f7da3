//! # 像素访问抽象
//!
//! 编解码器只通过这两个 trait 访问像素，与具体的图像解码库解耦，
//! 因此可以直接在内存中的合成像素缓冲区上测试。

/// 一个像素的四个 8 位通道：R、G、B、A。
pub type Pixel = [u8; 4];

/// 可读的、定长且顺序稳定的像素序列。
pub trait PixelSource {
    fn pixel_count(&self) -> usize;

    /// 读取第 `index` 个像素。`index` 必须小于 [`pixel_count`](Self::pixel_count)。
    fn pixel(&self, index: usize) -> Pixel;
}

/// 可逐像素写入的像素序列。
pub trait PixelSink: PixelSource {
    fn set_pixel(&mut self, index: usize, pixel: Pixel);
}

impl PixelSource for [Pixel] {
    fn pixel_count(&self) -> usize {
        self.len()
    }

    fn pixel(&self, index: usize) -> Pixel {
        self[index]
    }
}

impl PixelSink for [Pixel] {
    fn set_pixel(&mut self, index: usize, pixel: Pixel) {
        self[index] = pixel;
    }
}

impl PixelSource for Vec<Pixel> {
    fn pixel_count(&self) -> usize {
        self.len()
    }

    fn pixel(&self, index: usize) -> Pixel {
        self[index]
    }
}

impl PixelSink for Vec<Pixel> {
    fn set_pixel(&mut self, index: usize, pixel: Pixel) {
        self[index] = pixel;
    }
}
