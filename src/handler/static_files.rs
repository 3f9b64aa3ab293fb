//! Static file serving module
//!
//! Resolves request paths against the document root and builds file,
//! directory listing and error responses.

use crate::handler::{listing, RequestContext};
use crate::http::{self, conditional, mime, path};
use crate::logger;
use crate::server::ServerState;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Index files tried before falling back to a generated directory listing
const INDEX_FILES: &[&str] = &["index.html", "index.htm"];

/// Serve a GET or HEAD request for `ctx.path` under the document root.
pub async fn serve(ctx: &RequestContext<'_>, state: &ServerState) -> Response<Full<Bytes>> {
    let decoded = path::percent_decode(ctx.path);
    let Some(fs_path) = resolve(&state.root, &decoded) else {
        logger::log_warning(&format!("Path escaped document root: {}", ctx.path));
        return http::build_404_response();
    };

    let meta = match fs::metadata(&fs_path).await {
        Ok(m) => m,
        Err(e) => return error_response(&e, &fs_path),
    };

    if meta.is_dir() {
        // Redirect so relative hrefs in the listing resolve correctly
        if !ctx.path.ends_with('/') {
            let target = match ctx.query {
                Some(q) => format!("{}/?{q}", ctx.path),
                None => format!("{}/", ctx.path),
            };
            return http::build_redirect_response(&target);
        }

        for index in INDEX_FILES {
            let candidate = fs_path.join(index);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                return serve_file(ctx, &candidate).await;
            }
        }

        return serve_listing(ctx, &fs_path, &decoded).await;
    }

    serve_file(ctx, &fs_path).await
}

/// Resolve a decoded request path to a filesystem path under `root`.
///
/// Resolution is purely lexical: `.` and empty segments are dropped and `..`
/// never pops above the root, so the result cannot escape it. Returns `None`
/// only if that invariant is somehow violated.
fn resolve(root: &Path, decoded: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if resolved != root {
                    resolved.pop();
                }
            }
            name => resolved.push(name),
        }
    }

    resolved.starts_with(root).then_some(resolved)
}

/// Serve a regular file, honoring If-Modified-Since and HEAD.
async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path) -> Response<Full<Bytes>> {
    let meta = match fs::metadata(file_path).await {
        Ok(m) => m,
        Err(e) => return error_response(&e, file_path),
    };

    // Sockets, FIFOs and other non-regular files are treated as absent
    if !meta.is_file() {
        return http::build_404_response();
    }

    let mtime = meta.modified().ok();

    if let (Some(mtime), Some(ims)) = (mtime, ctx.if_modified_since.as_deref()) {
        if conditional::not_modified(ims, mtime) {
            return http::build_304_response();
        }
    }

    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => return error_response(&e, file_path),
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    http::build_file_response(Bytes::from(content), content_type, mtime, ctx.is_head)
}

/// Serve a generated HTML listing of a directory's immediate children.
async fn serve_listing(
    ctx: &RequestContext<'_>,
    dir: &Path,
    request_path: &str,
) -> Response<Full<Bytes>> {
    match listing::render(dir, request_path).await {
        Ok(html) => http::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list directory '{}': {}",
                dir.display(),
                e
            ));
            error_response(&e, dir)
        }
    }
}

/// Map a filesystem error to the corresponding HTTP error response.
/// Permission failures become 403; everything else is reported as absent.
fn error_response(err: &io::Error, fs_path: &Path) -> Response<Full<Bytes>> {
    if err.kind() == io::ErrorKind::PermissionDenied {
        logger::log_warning(&format!("Permission denied: {}", fs_path.display()));
        http::build_403_response()
    } else {
        http::build_404_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve(root, "/a/b.txt"),
            Some(PathBuf::from("/srv/site/a/b.txt"))
        );
        assert_eq!(resolve(root, "/"), Some(PathBuf::from("/srv/site")));
    }

    #[test]
    fn test_resolve_drops_dot_segments() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve(root, "/a/./b//c"),
            Some(PathBuf::from("/srv/site/a/b/c"))
        );
    }

    #[test]
    fn test_resolve_cannot_escape_root() {
        let root = Path::new("/srv/site");
        // Parent segments at the root level are dropped, not followed
        assert_eq!(
            resolve(root, "/../../etc/passwd"),
            Some(PathBuf::from("/srv/site/etc/passwd"))
        );
        assert_eq!(
            resolve(root, "/a/../../b"),
            Some(PathBuf::from("/srv/site/b"))
        );
    }

    fn request(path: &'static str) -> RequestContext<'static> {
        RequestContext {
            path,
            query: None,
            is_head: false,
            if_modified_since: None,
        }
    }

    #[tokio::test]
    async fn test_serve_returns_exact_file_bytes() {
        use http_body_util::BodyExt;

        let root = std::env::temp_dir().join(format!("staticd-serve-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"exact bytes\n").unwrap();

        let state = ServerState {
            root: root.canonicalize().unwrap(),
            config: crate::config::Config::load().unwrap(),
        };

        let resp = serve(&request("/hello.txt"), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/plain"
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"exact bytes\n");

        let resp = serve(&request("/no-such-file.txt"), &state).await;
        assert_eq!(resp.status(), 404);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_error_response_status() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(error_response(&not_found, Path::new("/x")).status(), 404);

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "no");
        assert_eq!(error_response(&denied, Path::new("/x")).status(), 403);
    }
}
