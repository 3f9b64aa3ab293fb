//! Request handler module
//!
//! Entry point for HTTP request processing: method validation, access
//! logging and dispatch to static file serving.

pub mod listing;
pub mod static_files;

use crate::http::{self, path};
use crate::logger::{self, AccessLogEntry};
use crate::server::ServerState;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Request path, still percent-encoded, without the query string
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (path, query) = path::split_query(req.uri().path_and_query().map_or("/", |pq| pq.as_str()));

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        path.to_string(),
    );
    entry.query = query.map(ToString::to_string);
    entry.http_version = version_str(req.version()).to_string();
    entry.referer = header_value(&req, "referer");
    entry.user_agent = header_value(&req, "user-agent");

    let response = dispatch(&req, path, query, &state).await;

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes_sent(&response);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch based on HTTP method: GET and HEAD are served, everything else
/// is refused without touching the filesystem. Generic over the body type,
/// which is never read.
async fn dispatch<B>(
    req: &Request<B>,
    path: &str,
    query: Option<&str>,
    state: &Arc<ServerState>,
) -> Response<Full<Bytes>> {
    match *req.method() {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext {
                path,
                query,
                is_head: *req.method() == Method::HEAD,
                if_modified_since: header_value(req, "if-modified-since"),
            };
            static_files::serve(&ctx, state).await
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", req.method()));
            http::build_405_response()
        }
    }
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Content-Length of the response, as reported in the access log.
/// HEAD responses carry the header but no body, same as the log convention
/// this server replaces.
fn body_bytes_sent(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}
