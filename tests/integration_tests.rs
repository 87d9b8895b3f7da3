use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use lsb_seal::{
    StegoError,
    cipher::SealKey,
    cli::{CapacityArgs, DecryptArgs, EncryptArgs, HideArgs, KeygenArgs, RecoverArgs},
    handler::{
        CapacityReport, capacity_report, handle_capacity, handle_decrypt, handle_encrypt,
        handle_hide, handle_keygen, handle_recover,
    },
};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 随机噪声掩体图像，alpha 固定为不透明
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut rng = rand::rng();
    let cover = RgbaImage::from_fn(width, height, |_, _| {
        let mut rgb = [0u8; 3];
        rng.fill_bytes(&mut rgb);
        Rgba([rgb[0], rgb[1], rgb[2], u8::MAX])
    });
    cover.save(path).expect("cover image should be writable");
}

/// 在 `dir` 中准备掩体和待隐藏文本，返回 (掩体路径, 文本路径)
fn prepare_inputs(dir: &Path, cover_name: &str, text: &str) -> (PathBuf, PathBuf) {
    let cover = dir.join(cover_name);
    let source = dir.join("source.txt");
    fs::write(&source, text).expect("source text should be writable");
    (cover, source)
}

/// hide 写出图像并在首次使用时生成密钥，recover 用同一密钥取回原文
#[test]
fn test_hide_then_recover_restores_text() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let message = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    let (cover, source) = prepare_inputs(dir.path(), "original.png", message);
    create_test_image(&cover, 100, 100);

    let key_path = dir.path().join("seal.key");
    let stego_path = dir.path().join("hidden.png");
    let recovered_path = dir.path().join("recovered.txt");

    handle_hide(HideArgs {
        image: cover,
        text: source,
        dest: Some(stego_path.clone()),
        key: key_path.clone(),
        force: false,
    })?;
    assert!(stego_path.exists(), "stego image was not written");
    assert!(key_path.exists(), "key file was not generated on first use");

    handle_recover(RecoverArgs {
        image: stego_path,
        text: Some(recovered_path.clone()),
        key: key_path,
        force: false,
    })?;
    assert_eq!(fs::read_to_string(&recovered_path)?, message);

    Ok(())
}

/// 省略输出路径时，结果写到输入文件旁的 doctored_/recovered_ 文件
#[test]
fn test_default_output_paths() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let message = "Testing default path generation. 测试默认路径生成。";
    let (cover, source) = prepare_inputs(dir.path(), "original.png", message);
    create_test_image(&cover, 100, 100);
    let key_path = dir.path().join("seal.key");

    handle_hide(HideArgs {
        image: cover,
        text: source,
        dest: None,
        key: key_path.clone(),
        force: false,
    })?;
    let stego_path = dir.path().join("doctored_original.png");
    assert!(stego_path.exists(), "missing {stego_path:?}");

    handle_recover(RecoverArgs {
        image: stego_path,
        text: None,
        key: key_path,
        force: false,
    })?;
    let recovered_path = dir.path().join("recovered_doctored_original.txt");
    assert_eq!(fs::read_to_string(&recovered_path)?, message);

    Ok(())
}

/// 已存在的输出文件只有在 --force 时才会被覆盖
#[test]
fn test_existing_destination_needs_force() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let (cover, source) = prepare_inputs(dir.path(), "image.png", "some text");
    create_test_image(&cover, 50, 50);

    let dest_path = dir.path().join("dest.png");
    let placeholder = b"placeholder that must survive without --force";
    fs::write(&dest_path, placeholder)?;

    let args = |force| HideArgs {
        image: cover.clone(),
        text: source.clone(),
        dest: Some(dest_path.clone()),
        key: dir.path().join("seal.key"),
        force,
    };

    let err = handle_hide(args(false)).expect_err("existing destination must be refused");
    assert!(err.to_string().contains("Output file already exists"));
    assert_eq!(fs::read(&dest_path)?, placeholder);

    handle_hide(args(true))?;
    assert_ne!(fs::read(&dest_path)?, placeholder);

    Ok(())
}

/// 容量不足时报告类型化的 InsufficientCapacity，且不写出任何图像
#[test]
fn test_hide_reports_insufficient_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let (cover, source) = prepare_inputs(dir.path(), "small.png", &"a".repeat(5000));
    create_test_image(&cover, 10, 10);
    let dest_path = dir.path().join("dest.png");

    let err = handle_hide(HideArgs {
        image: cover,
        text: source,
        dest: Some(dest_path.clone()),
        key: dir.path().join("seal.key"),
        force: false,
    })
    .expect_err("5000 bytes cannot fit into 100 pixels");

    assert!(err.to_string().contains("Not enough space"));
    // 5000 字节明文 + 28 字节 nonce/tag，再加 32 位头部
    assert_eq!(
        err.root_cause().downcast_ref::<StegoError>(),
        Some(&StegoError::InsufficientCapacity {
            needed_bits: 32 + 8 * 5028,
            available_bits: 300,
        })
    );
    assert!(!dest_path.exists(), "no image may be written on failure");

    Ok(())
}

/// 非 RGBA 的掩体 (RGB8、灰度) 先转换为 RGBA8，hide/recover 照常往返
#[test]
fn test_non_rgba_covers_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let key_path = dir.path().join("seal.key");
    let message = "grayscale and rgb covers 灰度与 RGB 掩体";

    let base = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
        Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, u8::MAX])
    }));
    let covers = [
        ("rgb8.png", DynamicImage::ImageRgb8(base.to_rgb8())),
        ("luma8.png", DynamicImage::ImageLuma8(base.to_luma8())),
    ];

    for (name, cover_image) in covers {
        let (cover, source) = prepare_inputs(dir.path(), name, message);
        cover_image.save(&cover)?;

        let stego_path = dir.path().join(format!("stego_{name}"));
        let recovered_path = dir.path().join(format!("{name}.txt"));

        handle_hide(HideArgs {
            image: cover,
            text: source,
            dest: Some(stego_path.clone()),
            key: key_path.clone(),
            force: false,
        })?;
        handle_recover(RecoverArgs {
            image: stego_path,
            text: Some(recovered_path.clone()),
            key: key_path.clone(),
            force: false,
        })?;

        assert_eq!(fs::read_to_string(&recovered_path)?, message, "cover {name}");
    }

    Ok(())
}

/// 验证使用错误的密钥无法恢复内容
#[test]
fn test_recover_with_wrong_key_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let hidden_path = dir.path().join("hidden.png");
    let text_path = dir.path().join("text.txt");
    let recovered_path = dir.path().join("recovered.txt");
    let right_key = dir.path().join("right.key");
    let wrong_key = dir.path().join("wrong.key");

    create_test_image(&image_path, 40, 40);
    fs::write(&text_path, "only for the right key")?;
    SealKey::generate().save(&wrong_key)?;

    handle_hide(HideArgs {
        image: image_path,
        text: text_path,
        dest: Some(hidden_path.clone()),
        key: right_key,
        force: false,
    })?;

    let result = handle_recover(RecoverArgs {
        image: hidden_path,
        text: Some(recovered_path.clone()),
        key: wrong_key,
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Could not decrypt"));
    }
    assert!(!recovered_path.exists());

    Ok(())
}

/// 验证头部声明的长度超出图像容量时报告截断，而不是返回残缺数据
#[test]
fn test_recover_reports_truncated_payload() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("saturated.png");
    let key_path = dir.path().join("seal.key");
    SealKey::generate().save(&key_path)?;

    // 所有最低位都是 1，头部解析为 u32::MAX
    let image = ImageBuffer::from_pixel(20, 20, Rgba([255u8, 255, 255, 255]));
    image.save(&image_path)?;

    let result = handle_recover(RecoverArgs {
        image: image_path,
        text: Some(dir.path().join("out.txt")),
        key: key_path,
        force: false,
    });

    let err = result.expect_err("a saturated header must not decode");
    assert_eq!(
        err.root_cause().downcast_ref::<StegoError>(),
        Some(&StegoError::PayloadTruncated {
            declared_length: u32::MAX,
            available_bits: 1200,
        })
    );

    Ok(())
}

/// 验证独立的加密/解密命令
#[test]
fn test_encrypt_and_decrypt_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let input_path = dir.path().join("notes.log");
    let decrypted_path = dir.path().join("notes.out");
    let key_path = dir.path().join("seal.key");
    fs::write(&input_path, "--- Recording started ---\nCHAR a\n")?;

    handle_encrypt(EncryptArgs {
        input: input_path.clone(),
        output: None,
        key: key_path.clone(),
        force: false,
    })?;

    let encrypted_path = dir.path().join("notes.log.enc");
    assert!(encrypted_path.exists());
    assert_ne!(fs::read(&encrypted_path)?, fs::read(&input_path)?);

    handle_decrypt(DecryptArgs {
        input: encrypted_path,
        output: Some(decrypted_path.clone()),
        key: key_path,
        force: false,
    })?;

    assert_eq!(fs::read(&decrypted_path)?, fs::read(&input_path)?);

    Ok(())
}

/// 验证密钥生成不会静默覆盖已有密钥
#[test]
fn test_keygen_protects_existing_key() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let key_path = dir.path().join("seal.key");

    handle_keygen(KeygenArgs {
        key: key_path.clone(),
        force: false,
    })?;
    let first = fs::read_to_string(&key_path)?;

    let result = handle_keygen(KeygenArgs {
        key: key_path.clone(),
        force: false,
    });
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&key_path)?, first);

    handle_keygen(KeygenArgs {
        key: key_path.clone(),
        force: true,
    })?;
    assert_ne!(fs::read_to_string(&key_path)?, first);

    Ok(())
}

/// 容量报告：20x20 像素 = 1200 bits，(1200 - 32) / 8 = 146 字节密文，减去 28 字节开销
#[test]
fn test_capacity_report() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    create_test_image(&image_path, 20, 20);

    assert_eq!(
        capacity_report(&image_path)?,
        CapacityReport {
            width: 20,
            height: 20,
            usable_bits: 1200,
            sealed_limit: 146,
            plaintext_limit: 118,
        }
    );
    handle_capacity(CapacityArgs { image: image_path })?;

    // 小图放不下 nonce 和认证标签
    let tiny_path = dir.path().join("tiny.png");
    create_test_image(&tiny_path, 4, 4);
    let tiny = capacity_report(&tiny_path)?;
    assert_eq!(tiny.sealed_limit, 2);
    assert_eq!(tiny.plaintext_limit, 0);

    assert!(capacity_report(&dir.path().join("missing.png")).is_err());

    Ok(())
}
