//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::{DEFAULT_KEY_FILE, KEY_FILE_ENV};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具：先用认证加密封装数据，再把密文隐藏到无损格式图像 (如 PNG, BMP) 的 RGB 通道中。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具：先用认证加密封装数据，再把密文隐藏到无损格式图像 (如 PNG, BMP) 的 RGB 通道中。"
)]
pub struct Cli {
    /// 提高日志详细程度 (-v 为 info，-vv 为 debug，-vvv 为 trace)。
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 加密文件内容并隐藏到无损格式图像中。
    Hide(HideArgs),

    /// 从经过隐写的图像中提取并解密隐藏的内容。
    Recover(RecoverArgs),

    /// 把文件加密保存为独立的密文文件。
    Encrypt(EncryptArgs),

    /// 解密由 `encrypt` 生成的密文文件。
    Decrypt(DecryptArgs),

    /// 生成新的密钥文件。
    Keygen(KeygenArgs),

    /// 报告图像的隐写容量。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的内容的文件路径。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 隐写完成后，保存结果图像的输出路径。默认为输入图像旁的 `doctored_<名称>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 密钥文件路径。文件不存在时会自动生成。
    #[arg(short, long, env = KEY_FILE_ENV, default_value = DEFAULT_KEY_FILE)]
    pub key: PathBuf,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复内容后的保存路径。默认为图像旁的 `recovered_<名称>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 隐藏数据时使用的密钥文件路径。
    #[arg(short, long, env = KEY_FILE_ENV, default_value = DEFAULT_KEY_FILE)]
    pub key: PathBuf,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'encrypt' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncryptArgs {
    /// 要加密的文件路径。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 密文输出路径。默认为 `<输入>.enc`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 密钥文件路径。文件不存在时会自动生成。
    #[arg(short, long, env = KEY_FILE_ENV, default_value = DEFAULT_KEY_FILE)]
    pub key: PathBuf,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decrypt' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecryptArgs {
    /// 密文文件路径。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 明文输出路径。省略时打印到标准输出。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 加密时使用的密钥文件路径。
    #[arg(short, long, env = KEY_FILE_ENV, default_value = DEFAULT_KEY_FILE)]
    pub key: PathBuf,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'keygen' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// 新密钥文件的保存路径。
    #[arg(short, long, env = KEY_FILE_ENV, default_value = DEFAULT_KEY_FILE)]
    pub key: PathBuf,

    /// 密钥文件已存在时强制覆盖。旧密钥封装的数据将无法再解密。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
