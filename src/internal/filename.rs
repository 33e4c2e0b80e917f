//! 从 URL 推导本地文件名。

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    #[error("URL 无效: {0}")]
    InvalidUrl(String),

    #[error("URL 中没有可用的文件名: {0}")]
    NoFileName(String),
}

/// 文件名中不允许出现的字符（取 Windows 与 Unix 的并集）。
fn is_illegal(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// 取 URL 路径最后一个非空段，百分号解码后把非法字符替换为 `_`，去掉末尾的点和空格。
///
/// ```text
/// https://host/files/report%202024.pdf?x=1  ->  report 2024.pdf
/// https://host/a/b%3Ac.txt                  ->  b_c.txt
/// ```
pub fn derive_filename(url: &str) -> Result<String, FilenameError> {
    let parsed = Url::parse(url).map_err(|e| FilenameError::InvalidUrl(format!("{url}: {e}")))?;

    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .ok_or_else(|| FilenameError::NoFileName(url.to_string()))?;

    let decoded = percent_decode_str(last).decode_utf8_lossy();
    let sanitized: String = decoded
        .chars()
        .map(|c| if is_illegal(c) { '_' } else { c })
        .collect();
    let name = sanitized.trim_start().trim_end_matches(['.', ' ']);

    if name.is_empty() {
        return Err(FilenameError::NoFileName(url.to_string()));
    }
    Ok(name.to_string())
}
