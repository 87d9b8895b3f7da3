//! # 加密协作方
//!
//! 隐写编解码器只搬运不透明的密文字节。本模块提供这些密文：
//! ChaCha20-Poly1305 认证加密，每次加密使用新的随机 nonce。
//!
//! 密文格式：
//!
//! ```text
//! [12 bytes] nonce
//! [N  bytes] ciphertext
//! [16 bytes] Poly1305 tag
//! ```
//!
//! 密钥文件保存 32 字节密钥的 URL-safe base64 编码。

use crate::error::CipherError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use zeroize::Zeroizing;

/// nonce 长度 (字节)。
pub const NONCE_LEN: usize = 12;

/// Poly1305 认证标签长度 (字节)。
pub const TAG_LEN: usize = 16;

/// 密钥长度 (字节)。
pub const KEY_LEN: usize = 32;

/// 不透明的字节到字节认证加密。
pub trait PayloadCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// 密钥错误或密文被篡改时返回 [`CipherError::AuthenticationOrKey`]。
    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// 封装载荷用的对称密钥，离开作用域时清零。
pub struct SealKey {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl SealKey {
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&ChaCha20Poly1305::generate_key(&mut OsRng));
        Self { key }
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(bytes),
        }
    }

    /// 解析密钥文件内容，忽略首尾空白。
    pub fn from_encoded(encoded: &str) -> Result<Self, CipherError> {
        let decoded = Zeroizing::new(
            URL_SAFE
                .decode(encoded.trim())
                .map_err(|e| CipherError::InvalidKey(e.to_string()))?,
        );
        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            CipherError::InvalidKey(format!(
                "expected {KEY_LEN} key bytes, found {}",
                decoded.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn encoded(&self) -> String {
        URL_SAFE.encode(self.key.as_slice())
    }

    pub fn load(path: &Path) -> Result<Self, CipherError> {
        let contents = Zeroizing::new(fs::read_to_string(path)?);
        let key = Self::from_encoded(&contents)?;
        debug!("Loaded key from {}", path.display());
        Ok(key)
    }

    /// 写入密钥文件。在 unix 上文件权限为 0600，只有所有者可读写。
    pub fn save(&self, path: &Path) -> Result<(), CipherError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path)?;
        // mode 只在创建时生效，覆盖已有文件时需要单独收紧权限。
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))?;

        let encoded = Zeroizing::new(self.encoded());
        file.write_all(encoded.as_bytes())?;
        Ok(())
    }

    /// 读取密钥文件；文件不存在时生成新密钥并写入该路径。
    pub fn load_or_generate(path: &Path) -> Result<Self, CipherError> {
        if path.exists() {
            return Self::load(path);
        }

        let key = Self::generate();
        key.save(path)?;
        info!("Generated new key file at {}", path.display());
        Ok(key)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.key.as_slice()))
    }
}

impl PayloadCipher for SealKey {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher()
            .encrypt(&nonce, plaintext)
            .map_err(|_| CipherError::AuthenticationOrKey)?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, CipherError> {
        if token.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::TokenTooShort { len: token.len() });
        }

        let (nonce, ciphertext) = token.split_at(NONCE_LEN);
        self.cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::AuthenticationOrKey)
    }
}
