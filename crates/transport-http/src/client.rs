// HTTP agent configuration

use std::time::Duration;

const USER_AGENT: &str = concat!("earshot/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP agent with proper timeouts and settings
pub fn create_http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(30))
        .timeout_read(Duration::from_secs(60))
        .timeout_write(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirects(10)
        .build()
}

/// Total resource size from a `Content-Range: bytes a-b/total` header
pub fn parse_total_from_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse::<u64>().ok()
}

/// Format a `Range` header value for an inclusive byte span
pub fn range_header(start: u64, end: Option<u64>) -> String {
    match end {
        Some(end) => format!("bytes={}-{}", start, end),
        None => format!("bytes={}-", start),
    }
}
