//! 分片下载：发起单段 Range 请求并校验响应状态，返回响应供流式读取。

use reqwest::header::RANGE;
use reqwest::{Client, Response, StatusCode};

use crate::internal::downloader::structs::{DownloadError, Segment};

/// 发起 Range 请求时的参数（形参超过 3 个时用 struct 承载）。
pub struct FetchRangeParams<'a> {
    pub client: &'a Client,
    pub url: &'a str,
    pub segment: &'a Segment,
    /// 本次请求的起点，重试时为分片内已写入位置
    pub offset: u64,
    pub total: u64,
}

/// 请求 `bytes=offset-end`。
///
/// `206` 正常返回；`200` 只有在请求恰好覆盖整个文件时才接受，
/// 否则返回 [`DownloadError::RangeNotSupported`]，避免把整份文件写进分片区间。
pub async fn fetch_range_response(
    params: FetchRangeParams<'_>,
) -> Result<Response, DownloadError> {
    let range = params.segment.range_header_from(params.offset);
    let resp = params
        .client
        .get(params.url)
        .header(RANGE, range)
        .send()
        .await?;

    match resp.status() {
        StatusCode::PARTIAL_CONTENT => Ok(resp),
        StatusCode::OK if params.offset == 0 && params.segment.end + 1 == params.total => Ok(resp),
        StatusCode::OK => Err(DownloadError::RangeNotSupported),
        status => Err(DownloadError::UnexpectedStatus { status }),
    }
}
