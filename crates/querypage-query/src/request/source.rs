//! The two request shapes list parameters are read from.

/// Read access to the parts of a request that carry list parameters.
pub trait RequestSource {
    /// HTTP method. An empty method is treated as `GET`.
    fn method(&self) -> &str;

    /// Raw query string without the leading `?`.
    fn query(&self) -> &[u8];

    /// Buffered request body.
    fn body(&self) -> &[u8];

    /// Whether parameters come from the body rather than the query string.
    fn reads_body(&self) -> bool {
        self.method().eq_ignore_ascii_case("POST")
    }
}

/// Fully buffered request, as produced by axum/hyper after body collection.
impl<B: AsRef<[u8]>> RequestSource for http::Request<B> {
    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn query(&self) -> &[u8] {
        self.uri().query().unwrap_or_default().as_bytes()
    }

    fn body(&self) -> &[u8] {
        http::Request::body(self).as_ref()
    }
}

/// Borrowed view over a request whose buffers are owned and reused by a
/// server loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawRequest<'a> {
    pub method: &'a str,
    pub query: &'a [u8],
    pub body: &'a [u8],
}

impl<'a> RawRequest<'a> {
    /// A read request over a raw query string.
    pub fn get(query: &'a [u8]) -> Self {
        Self {
            method: "GET",
            query,
            body: &[],
        }
    }

    /// A body-bearing request.
    pub fn post(body: &'a [u8]) -> Self {
        Self {
            method: "POST",
            query: &[],
            body,
        }
    }
}

impl RequestSource for RawRequest<'_> {
    fn method(&self) -> &str {
        if self.method.is_empty() {
            "GET"
        } else {
            self.method
        }
    }

    fn query(&self) -> &[u8] {
        self.query
    }

    fn body(&self) -> &[u8] {
        self.body
    }
}
