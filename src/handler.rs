//! # 命令处理逻辑模块
//!
//! 包含各个子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、加密、调用核心隐写算法以及向用户报告结果。

use crate::cipher::{NONCE_LEN, PayloadCipher, SealKey, TAG_LEN};
use crate::cli::{CapacityArgs, DecryptArgs, EncryptArgs, HideArgs, KeygenArgs, RecoverArgs};
use crate::constants::{ENCRYPTED_EXTENSION, HIDDEN_IMAGE_PREFIX, RECOVERED_TEXT_PREFIX};
use crate::error::StegoError;
use crate::image_io::{load_rgba, save_rgba};
use crate::steganography::{capacity_bits, embed, extract, max_payload_len};
use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和待隐藏文件、用密钥加密内容、检查隐写空间是否足够、
/// 调用隐写核心函数嵌入密文，最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、密钥路径及覆盖选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或文本文件，或无法读取/生成密钥文件。
/// * 图像没有足够的空间来隐藏密文。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| default_output_path(&args.image, HIDDEN_IMAGE_PREFIX, "png"));
    ensure_writable(&dest, args.force)?;

    let picture = load_rgba(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let key = load_or_generate_key(&args.key)?;
    let sealed = key
        .encrypt(&text)
        .context("Failed to encrypt the text before hiding it.")?;

    let stego = embed(&picture, &sealed).map_err(|e| {
        let context = match &e {
            StegoError::InsufficientCapacity {
                needed_bits,
                available_bits,
            } => format!(
                "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
                needed_bits.to_string().red().bold(),
                available_bits.to_string().green().bold()
            ),
            _ => format!(
                "Failed to embed {} sealed bytes into the image.",
                sealed.len().to_string().red().bold()
            ),
        };
        anyhow::Error::new(e).context(context)
    })?;

    save_rgba(&stego, &dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    info!(
        "Hid {} plaintext bytes ({} sealed) in {} available bits",
        text.len(),
        sealed.len(),
        capacity_bits(&stego)
    );
    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、提取长度头部和密文、用密钥解密，
/// 最后将恢复的内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、密钥路径及覆盖选项的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件或密钥文件。
/// * 图像中不包含完整的隐藏数据 (头部过短或数据被截断)。
/// * 密钥错误或数据被篡改，解密失败。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let text_path = args
        .text
        .unwrap_or_else(|| default_output_path(&args.image, RECOVERED_TEXT_PREFIX, "txt"));
    ensure_writable(&text_path, args.force)?;

    let picture = load_rgba(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let sealed = extract(&picture).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let key = load_key(&args.key)?;
    let text = key.decrypt(&sealed).with_context(|| {
        format!(
            "Could not decrypt the extracted bytes with key file '{}'. \nEnsure you are using the same key file that was used to hide the text.",
            args.key.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&text_path, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            text_path.to_string_lossy().red().bold()
        )
    })?;

    info!(
        "Recovered {} plaintext bytes from {} sealed bytes",
        text.len(),
        sealed.len()
    );
    println!(
        "The text has been successfully recovered and saved: {}",
        text_path.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Encrypt' 命令：把文件加密保存为独立的密文文件。
pub fn handle_encrypt(args: EncryptArgs) -> Result<()> {
    let output = args.output.unwrap_or_else(|| {
        let mut name = args.input.clone().into_os_string();
        name.push(".");
        name.push(ENCRYPTED_EXTENSION);
        PathBuf::from(name)
    });
    ensure_writable(&output, args.force)?;

    let plaintext = fs::read(&args.input).with_context(|| {
        format!(
            "Unable to read input file: {}",
            args.input.to_string_lossy().red().bold()
        )
    })?;

    let key = load_or_generate_key(&args.key)?;
    let token = key
        .encrypt(&plaintext)
        .context("Failed to encrypt the input file.")?;

    fs::write(&output, &token).with_context(|| {
        format!(
            "Unable to write to encrypted file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully encrypted and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Decrypt' 命令：解密密文文件，写入输出路径或打印到标准输出。
pub fn handle_decrypt(args: DecryptArgs) -> Result<()> {
    if let Some(output) = &args.output {
        ensure_writable(output, args.force)?;
    }

    let token = fs::read(&args.input).with_context(|| {
        format!(
            "Unable to read encrypted file: {}",
            args.input.to_string_lossy().red().bold()
        )
    })?;

    let key = load_key(&args.key)?;
    let plaintext = key.decrypt(&token).with_context(|| {
        format!(
            "Failed to decrypt '{}' with key file '{}'.",
            args.input.to_string_lossy().red().bold(),
            args.key.to_string_lossy().red().bold()
        )
    })?;

    match &args.output {
        Some(output) => {
            fs::write(output, &plaintext).with_context(|| {
                format!(
                    "Unable to write to decrypted file: {}",
                    output.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The file has been successfully decrypted and saved: {}",
                output.to_string_lossy().green().bold()
            );
        }
        None => {
            println!("{}", "--- Decrypted content ---".green().bold());
            println!("{}", String::from_utf8_lossy(&plaintext));
            println!("{}", "--- end ---".green().bold());
        }
    }
    Ok(())
}

/// 处理 'Keygen' 命令：生成并保存新的密钥文件。
pub fn handle_keygen(args: KeygenArgs) -> Result<()> {
    ensure_writable(&args.key, args.force)?;

    SealKey::generate().save(&args.key).with_context(|| {
        format!(
            "Unable to write key file: {}",
            args.key.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "A new key has been generated and saved: {} \nKeep this file secret; it is required to recover hidden data.",
        args.key.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 一张图像的隐写容量。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    /// R、G、B 最低位的总数。
    pub usable_bits: u64,
    /// 扣除长度头部后可嵌入的最大密文字节数。
    pub sealed_limit: u64,
    /// 扣除 nonce 与认证标签后可隐藏的最大明文字节数。
    pub plaintext_limit: u64,
}

/// 读取图像并计算其隐写容量。
pub fn capacity_report(image: &Path) -> Result<CapacityReport> {
    let picture = load_rgba(image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            image.to_string_lossy().red().bold()
        )
    })?;

    let sealed_limit = max_payload_len(&picture);
    Ok(CapacityReport {
        width: picture.width(),
        height: picture.height(),
        usable_bits: capacity_bits(&picture),
        sealed_limit,
        plaintext_limit: sealed_limit.saturating_sub((NONCE_LEN + TAG_LEN) as u64),
    })
}

/// 处理 'Capacity' 命令：报告图像可承载的比特数与最大密文长度。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let report = capacity_report(&args.image)?;

    println!(
        "{}x{} pixels: {} usable bits, up to {} sealed bytes ({} bytes of plaintext)",
        report.width,
        report.height,
        report.usable_bits.to_string().green().bold(),
        report.sealed_limit.to_string().green().bold(),
        report.plaintext_limit.to_string().green().bold()
    );
    Ok(())
}

fn load_key(path: &Path) -> Result<SealKey> {
    SealKey::load(path).with_context(|| {
        format!(
            "Unable to load key file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

fn load_or_generate_key(path: &Path) -> Result<SealKey> {
    SealKey::load_or_generate(path).with_context(|| {
        format!(
            "Unable to load or create key file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

// 输出文件已存在时，除非指定 --force，否则拒绝覆盖。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 在输入文件旁生成 `<前缀><文件名>.<扩展名>` 形式的默认输出路径。
fn default_output_path(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}
