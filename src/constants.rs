/// 长度头部占用的比特数。
/// 头部是 `u32` 的大端编码，固定 32 bits，总是最先写入/读取。
pub const HEADER_BITS: usize = 32;

/// 每个像素可用于隐写的比特数。
/// 只使用 R、G、B 三个通道的最低有效位，Alpha 通道从不改动。
pub const BITS_PER_PIXEL: usize = 3;

/// 每个载荷字节需要的比特数。
pub const BITS_PER_BYTE: usize = 8;

/// 默认的密钥文件名 (相对于当前工作目录)。
pub const DEFAULT_KEY_FILE: &str = "lsb_seal.key";

/// 指定密钥文件路径的环境变量。
pub const KEY_FILE_ENV: &str = "LSB_SEAL_KEY";

/// 未指定输出路径时，隐写图像文件名的前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_TEXT_PREFIX: &str = "recovered_";

/// 加密文件的默认扩展名。
pub const ENCRYPTED_EXTENSION: &str = "enc";
