//! 地址解析测试：内嵌 base64 地址、跟随跳转、原样返回。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::resolver::{PassthroughResolver, RedirectResolver, ResolveError, UrlResolver};
use crate::tests::{MockBehavior, MockServer};

#[test]
fn decodes_embedded_base64_url() {
    let target = "https://cdn.example.com/files/a.zip";
    let wrapped = format!(
        "https://example.com/out?url={}",
        urlencode(&STANDARD.encode(target))
    );
    assert_eq!(
        RedirectResolver::decode_embedded_url(&wrapped).unwrap().as_deref(),
        Some(target)
    );
}

#[test]
fn no_embedded_url_is_none() {
    assert_eq!(
        RedirectResolver::decode_embedded_url("https://example.com/a.zip?x=1").unwrap(),
        None
    );
}

#[test]
fn garbage_embedded_url_is_an_error() {
    assert!(matches!(
        RedirectResolver::decode_embedded_url("https://example.com/out?url=%%%%"),
        Err(ResolveError::Decode(_))
    ));
    // 能解码但不是 URL
    let not_url = STANDARD.encode("just text");
    assert!(matches!(
        RedirectResolver::decode_embedded_url(&format!(
            "https://example.com/out?url={}",
            urlencode(&not_url)
        )),
        Err(ResolveError::Decode(_))
    ));
}

#[tokio::test]
async fn passthrough_returns_input() {
    let url = "https://example.com/a.zip";
    assert_eq!(PassthroughResolver.resolve(url).await.unwrap(), url);
}

#[tokio::test]
async fn follows_redirects_to_final_url() {
    let server = MockServer::start(vec![1, 2, 3], MockBehavior::default()).await;
    let resolver = RedirectResolver::new(reqwest::Client::new());

    let resolved = resolver.resolve(&server.redirect_url("a.bin")).await.unwrap();
    assert_eq!(resolved, server.url("a.bin"));
}

#[tokio::test]
async fn follows_embedded_then_redirect() {
    let server = MockServer::start(vec![1, 2, 3], MockBehavior::default()).await;
    let resolver = RedirectResolver::new(reqwest::Client::new());

    let wrapped = format!(
        "http://{}/out?url={}",
        server.addr,
        urlencode(&STANDARD.encode(server.redirect_url("b.bin")))
    );
    let resolved = resolver.resolve(&wrapped).await.unwrap();
    assert_eq!(resolved, server.url("b.bin"));
}

fn urlencode(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, percent_encoding::NON_ALPHANUMERIC).to_string()
}
