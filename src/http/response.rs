//! HTTP response building module
//!
//! Builders for the status codes the server emits, decoupled from the
//! handler logic. Builders never panic: a header assembly error is logged
//! and degrades to an empty response.

use crate::http::conditional;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::time::SystemTime;

/// Build 200 OK response for a file's contents
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    mtime: Option<SystemTime>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length);

    if let Some(mtime) = mtime {
        builder = builder.header("Last-Modified", conditional::format_http_date(mtime));
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 200 OK response for generated HTML (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 301 redirect response (directory requested without trailing slash)
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(301)
        .header("Location", target)
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(304)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(403)
        .header("Content-Type", "text/plain")
        .header("Content-Length", "403 Forbidden".len())
        .body(Full::new(Bytes::from("403 Forbidden")))
        .unwrap_or_else(|e| {
            log_build_error("403", &e);
            Response::new(Full::new(Bytes::from("403 Forbidden")))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .header("Content-Length", "404 Not Found".len())
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Content-Length", "405 Method Not Allowed".len())
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(resp: &'a Response<Full<Bytes>>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_file_response_headers() {
        let resp = build_file_response(Bytes::from_static(b"hello"), "text/plain", None, false);
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-type"), Some("text/plain"));
        assert_eq!(header(&resp, "content-length"), Some("5"));
        assert!(header(&resp, "last-modified").is_none());
    }

    #[test]
    fn test_file_response_last_modified() {
        let resp = build_file_response(
            Bytes::from_static(b"x"),
            "text/plain",
            Some(SystemTime::UNIX_EPOCH),
            false,
        );
        assert_eq!(
            header(&resp, "last-modified"),
            Some("Thu, 01 Jan 1970 00:00:00 GMT")
        );
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        use http_body_util::BodyExt;

        let resp = build_file_response(Bytes::from_static(b"hello"), "text/plain", None, true);
        assert_eq!(header(&resp, "content-length"), Some("5"));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_redirect_response() {
        let resp = build_redirect_response("/docs/");
        assert_eq!(resp.status(), 301);
        assert_eq!(header(&resp, "location"), Some("/docs/"));
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(build_304_response().status(), 304);
        assert_eq!(build_403_response().status(), 403);
        assert_eq!(build_404_response().status(), 404);

        let resp = build_405_response();
        assert_eq!(resp.status(), 405);
        assert_eq!(header(&resp, "allow"), Some("GET, HEAD"));
    }
}
