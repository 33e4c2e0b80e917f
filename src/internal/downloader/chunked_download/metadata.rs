//! 远程元数据：一次 HEAD 请求，只读响应头，不传输响应体。

use reqwest::Client;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap};
use tracing::debug;

use crate::internal::downloader::structs::{ContentChecksum, DownloadError, RemoteMetadata};

const CONTENT_MD5: &str = "content-md5";
const DIGEST: &str = "digest";

fn header_str<'a>(headers: &'a HeaderMap, name: impl reqwest::header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// 发起 HEAD 请求，读取大小、校验和与 Range 支持情况。
///
/// 非 2xx 返回 [`DownloadError::UnexpectedStatus`]；`Content-Length` 缺失或为 0 返回
/// [`DownloadError::UnknownFileSize`]。
pub async fn fetch_remote_metadata(
    client: &Client,
    url: &str,
) -> Result<RemoteMetadata, DownloadError> {
    let resp = client.head(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::UnexpectedStatus { status });
    }

    // HEAD 响应没有响应体，`content_length()` 不可靠，直接读头
    let headers = resp.headers();
    let total_size = header_str(headers, CONTENT_LENGTH)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);
    if total_size == 0 {
        return Err(DownloadError::UnknownFileSize);
    }

    let checksum = header_str(headers, CONTENT_MD5)
        .and_then(ContentChecksum::from_content_md5)
        .or_else(|| header_str(headers, DIGEST).and_then(ContentChecksum::from_digest_header));

    let accepts_ranges =
        header_str(headers, ACCEPT_RANGES).map(|v| v.trim().eq_ignore_ascii_case("bytes"));

    debug!(
        url,
        total_size,
        checksum = checksum.as_ref().map(|c| c.to_string()),
        ?accepts_ranges,
        "已获取远程元数据"
    );

    Ok(RemoteMetadata {
        total_size,
        checksum,
        accepts_ranges,
    })
}
