//! 远程文件元数据：大小与内容校验和，来自一次 HEAD 请求。

use std::fmt;

use base64::Engine;

/// 远程提供的内容校验和（原始摘要字节）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChecksum {
    Md5(Vec<u8>),
    Sha256(Vec<u8>),
}

const MD5_LEN: usize = 16;
const SHA256_LEN: usize = 32;

impl ContentChecksum {
    /// 解析 `Content-MD5` 头：RFC 1864 规定为 base64，部分服务器直接给十六进制。
    pub fn from_content_md5(value: &str) -> Option<Self> {
        decode_digest(value, MD5_LEN).map(ContentChecksum::Md5)
    }

    /// 解析 RFC 3230 的 `Digest` 头，如 `sha-256=<base64>, md5=<base64>`。
    ///
    /// 同时出现时优先 sha-256。
    pub fn from_digest_header(value: &str) -> Option<Self> {
        let mut md5 = None;
        for part in value.split(',') {
            let Some((alg, digest)) = part.trim().split_once('=') else {
                continue;
            };
            match alg.trim().to_ascii_lowercase().as_str() {
                "sha-256" => {
                    if let Some(bytes) = decode_digest(digest, SHA256_LEN) {
                        return Some(ContentChecksum::Sha256(bytes));
                    }
                }
                "md5" => {
                    if md5.is_none() {
                        md5 = decode_digest(digest, MD5_LEN).map(ContentChecksum::Md5);
                    }
                }
                _ => {}
            }
        }
        md5
    }

    pub fn digest(&self) -> &[u8] {
        match self {
            ContentChecksum::Md5(d) | ContentChecksum::Sha256(d) => d,
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            ContentChecksum::Md5(_) => "md5",
            ContentChecksum::Sha256(_) => "sha-256",
        }
    }
}

impl fmt::Display for ContentChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm(), hex::encode(self.digest()))
    }
}

/// base64 或十六进制都接受，长度必须与算法摘要长度一致。
fn decode_digest(value: &str, expected_len: usize) -> Option<Vec<u8>> {
    let value = value.trim().trim_matches('"');
    if value.len() == expected_len * 2 {
        if let Ok(bytes) = hex::decode(value) {
            return Some(bytes);
        }
    }
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .ok()
        .filter(|bytes| bytes.len() == expected_len)
}

/// HEAD 请求得到的远程文件信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMetadata {
    /// 文件总大小（字节），总是大于 0
    pub total_size: u64,
    pub checksum: Option<ContentChecksum>,
    /// 服务器是否声明 `Accept-Ranges: bytes`；未声明时为 `None`
    pub accepts_ranges: Option<bool>,
}
