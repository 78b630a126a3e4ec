// HTTP transport for streaming a single remote media file

pub mod client;
pub mod range_source;

pub use client::create_http_agent;
pub use range_source::HttpRangeSource;
