// HTTP Range-based media source for on-demand streaming

use crate::client::{create_http_agent, parse_total_from_content_range, range_header};
use earshot_core::{AudioError, Result};
use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Chunk size for Range requests (256KB)
const CHUNK_SIZE: usize = 256 * 1024;

/// Maximum cache size (10MB)
const MAX_CACHE_SIZE: usize = 10 * 1024 * 1024;

/// Byte-range access to a remote resource
pub trait RangeFetcher: Send + Sync {
    /// Total size of the resource, if the server reports it
    fn content_length(&self, url: &str) -> Result<Option<u64>>;

    /// Fetch the inclusive byte span `start..=end`
    fn fetch(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>>;
}

/// [`RangeFetcher`] over a ureq agent
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new() -> Self {
        Self {
            agent: create_http_agent(),
        }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeFetcher for UreqFetcher {
    fn content_length(&self, url: &str) -> Result<Option<u64>> {
        if let Ok(response) = self.agent.head(url).call() {
            let length = response
                .header("Content-Length")
                .and_then(|s| s.parse::<u64>().ok());
            if length.is_some() {
                return Ok(length);
            }
        }

        // Some CDNs refuse HEAD; a one-byte range answers the same question
        let response = self
            .agent
            .get(url)
            .set("Range", &range_header(0, Some(0)))
            .call()
            .map_err(|e| AudioError::Network(format!("Range probe failed: {}", e)))?;

        if let Some(total) = response
            .header("Content-Range")
            .and_then(parse_total_from_content_range)
        {
            return Ok(Some(total));
        }
        Ok(response
            .header("Content-Length")
            .and_then(|s| s.parse::<u64>().ok()))
    }

    fn fetch(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        log::debug!("Fetching range: bytes={}-{}", start, end);

        let response = self
            .agent
            .get(url)
            .set("Range", &range_header(start, Some(end)))
            .call()
            .map_err(|e| AudioError::Network(format!("Range request failed: {}", e)))?;

        if response.status() != 206 && start > 0 {
            return Err(AudioError::Network(format!(
                "server answered {} to a Range request at byte {}",
                response.status(),
                start
            )));
        }

        let mut data = Vec::new();
        response
            .into_reader()
            .take(end - start + 1)
            .read_to_end(&mut data)
            .map_err(|e| AudioError::Network(format!("Failed to read response: {}", e)))?;
        Ok(data)
    }
}

struct CachedChunk {
    offset: u64,
    data: Vec<u8>,
}

impl CachedChunk {
    fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }
}

/// Seekable byte stream over a remote file, fetched in Range chunks
pub struct HttpRangeSource {
    url: String,
    fetcher: Box<dyn RangeFetcher>,
    total_size: Option<u64>,
    position: u64,
    cache: VecDeque<CachedChunk>,
    cached_bytes: usize,
    abort: Arc<AtomicBool>,
}

impl HttpRangeSource {
    /// Open `url`, asking the server for its size up front
    pub fn open(url: &str, abort: Arc<AtomicBool>) -> Result<Self> {
        Self::with_fetcher(url, Box::new(UreqFetcher::new()), abort)
    }

    pub fn with_fetcher(
        url: &str,
        fetcher: Box<dyn RangeFetcher>,
        abort: Arc<AtomicBool>,
    ) -> Result<Self> {
        let total_size = fetcher.content_length(url)?;
        match total_size {
            Some(size) => log::info!(
                "HTTP Range source initialized: {} bytes ({:.2} MB)",
                size,
                size as f64 / 1024.0 / 1024.0
            ),
            None => log::warn!("HTTP Range source initialized without a known size"),
        }

        Ok(Self {
            url: url.to_string(),
            fetcher,
            total_size,
            position: 0,
            cache: VecDeque::new(),
            cached_bytes: 0,
            abort,
        })
    }

    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    fn cached_slice(&self, offset: u64, len: usize) -> Option<&[u8]> {
        self.cache
            .iter()
            .find(|chunk| offset >= chunk.offset && offset < chunk.end())
            .map(|chunk| {
                let start = (offset - chunk.offset) as usize;
                let end = (start + len).min(chunk.data.len());
                &chunk.data[start..end]
            })
    }

    fn fill_cache(&mut self, offset: u64, len: usize) -> Result<bool> {
        let chunk_len = len.max(CHUNK_SIZE) as u64;
        let mut end = offset + chunk_len - 1;
        if let Some(total) = self.total_size {
            if offset >= total {
                return Ok(false);
            }
            end = end.min(total - 1);
        }

        let data = self.fetcher.fetch(&self.url, offset, end)?;
        if data.is_empty() {
            return Ok(false);
        }

        self.cached_bytes += data.len();
        self.cache.push_back(CachedChunk { offset, data });
        while self.cached_bytes > MAX_CACHE_SIZE && self.cache.len() > 1 {
            if let Some(evicted) = self.cache.pop_front() {
                self.cached_bytes -= evicted.data.len();
            }
        }
        Ok(true)
    }
}

impl Read for HttpRangeSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.abort.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "source closed",
            ));
        }
        if matches!(self.total_size, Some(total) if self.position >= total) {
            return Ok(0);
        }

        if self.cached_slice(self.position, buf.len()).is_none() {
            let filled = self
                .fill_cache(self.position, buf.len())
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            if !filled {
                return Ok(0);
            }
        }

        let read = match self.cached_slice(self.position, buf.len()) {
            Some(slice) => {
                buf[..slice.len()].copy_from_slice(slice);
                slice.len()
            }
            None => 0,
        };
        self.position += read as u64;
        Ok(read)
    }
}

impl Seek for HttpRangeSource {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(pos) => Some(pos),
            SeekFrom::Current(offset) => self.position.checked_add_signed(offset),
            SeekFrom::End(offset) => match self.total_size {
                Some(total) => total.checked_add_signed(offset),
                None => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        "Cannot seek from end: total size unknown",
                    ))
                }
            },
        };

        let new_pos = new_pos.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "seek before start")
        })?;
        self.position = new_pos;
        Ok(new_pos)
    }
}

impl symphonia::core::io::MediaSource for HttpRangeSource {
    fn is_seekable(&self) -> bool {
        self.total_size.is_some()
    }

    fn byte_len(&self) -> Option<u64> {
        self.total_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct MemoryFetcher {
        data: Vec<u8>,
        report_size: bool,
        requests: Arc<Mutex<Vec<(u64, u64)>>>,
    }

    impl RangeFetcher for MemoryFetcher {
        fn content_length(&self, _url: &str) -> Result<Option<u64>> {
            Ok(self.report_size.then_some(self.data.len() as u64))
        }

        fn fetch(&self, _url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
            self.requests.lock().push((start, end));
            let start = (start as usize).min(self.data.len());
            let end = (end as usize + 1).min(self.data.len());
            Ok(self.data[start..end].to_vec())
        }
    }

    fn source(len: usize, report_size: bool) -> (HttpRangeSource, Arc<Mutex<Vec<(u64, u64)>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let fetcher = MemoryFetcher {
            data: (0..len).map(|i| (i % 251) as u8).collect(),
            report_size,
            requests: requests.clone(),
        };
        let source = HttpRangeSource::with_fetcher(
            "https://example.com/a.mp3",
            Box::new(fetcher),
            Arc::new(AtomicBool::new(false)),
        )
        .unwrap();
        (source, requests)
    }

    #[test]
    fn test_small_reads_share_one_request() {
        let (mut src, requests) = source(CHUNK_SIZE * 2, true);
        let mut buf = [0u8; 100];
        src.read_exact(&mut buf).unwrap();
        src.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], (100 % 251) as u8);
        assert_eq!(requests.lock().as_slice(), &[(0, CHUNK_SIZE as u64 - 1)]);
    }

    #[test]
    fn test_last_chunk_is_clipped_to_size() {
        let (mut src, requests) = source(1000, true);
        let mut all = Vec::new();
        src.read_to_end(&mut all).unwrap();
        assert_eq!(all.len(), 1000);
        assert_eq!(requests.lock().as_slice(), &[(0, 999)]);
    }

    #[test]
    fn test_seek_variants() {
        let (mut src, _) = source(5000, true);
        assert_eq!(src.seek(SeekFrom::Start(10)).unwrap(), 10);
        assert_eq!(src.seek(SeekFrom::Current(-4)).unwrap(), 6);
        assert_eq!(src.seek(SeekFrom::End(-1)).unwrap(), 4999);
        assert!(src.seek(SeekFrom::Current(-10_000)).is_err());

        let mut byte = [0u8; 1];
        src.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], (4999 % 251) as u8);
    }

    #[test]
    fn test_seek_from_end_needs_size() {
        let (mut src, _) = source(5000, false);
        assert!(src.seek(SeekFrom::End(0)).is_err());
    }

    #[test]
    fn test_read_past_end_is_eof() {
        let (mut src, requests) = source(5000, true);
        src.seek(SeekFrom::Start(6000)).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(src.read(&mut buf).unwrap(), 0);
        assert!(requests.lock().is_empty());
    }

    #[test]
    fn test_abort_interrupts_reads() {
        let (mut src, _) = source(5000, true);
        src.abort.store(true, Ordering::SeqCst);
        let mut buf = [0u8; 16];
        let err = src.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionAborted);
    }
}
