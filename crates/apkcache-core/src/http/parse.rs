//! Parse HTTP response header lines into a ResponseHead.

/// Status and size of the final response in a (possibly redirected) exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status code from the last `HTTP/...` status line.
    pub status: Option<u32>,
    /// `Content-Length` of the last response, if present and numeric.
    pub content_length: Option<u64>,
}

impl ResponseHead {
    /// Parse collected header lines. Each status line starts a new response,
    /// so headers of earlier redirect hops are discarded.
    pub fn parse(lines: &[String]) -> Self {
        let mut head = ResponseHead::default();

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("HTTP/") {
                head = ResponseHead {
                    status: line
                        .split_whitespace()
                        .nth(1)
                        .and_then(|code| code.parse().ok()),
                    content_length: None,
                };
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    if let Ok(n) = value.trim().parse::<u64>() {
                        head.content_length = Some(n);
                    }
                }
            }
        }

        head
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }
}
