//! Single-stream HTTP GET of a source recording to a local file.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::retry::FetchError;

/// Downloads one source recording. Implementations must write the body
/// verbatim to `dest` and report a zero-byte body as [`FetchError::Empty`].
pub trait Fetch: Send + Sync {
    /// Returns the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// libcurl-backed fetcher; one Easy handle per call.
#[derive(Debug, Clone, Copy)]
pub struct CurlFetcher {
    pub connect_timeout: Duration,
    /// Hard limit on a single transfer.
    pub timeout: Duration,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
        }
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut file = File::create(dest)?;
        let mut written = 0u64;
        let mut storage_error: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(FetchError::Curl)?;
        easy.follow_location(true).map_err(FetchError::Curl)?;
        easy.max_redirections(10).map_err(FetchError::Curl)?;
        easy.fail_on_error(false).map_err(FetchError::Curl)?;
        easy.connect_timeout(self.connect_timeout)
            .map_err(FetchError::Curl)?;
        easy.low_speed_limit(1024).map_err(FetchError::Curl)?;
        easy.low_speed_time(Duration::from_secs(60))
            .map_err(FetchError::Curl)?;
        easy.timeout(self.timeout).map_err(FetchError::Curl)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match file.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        storage_error = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(FetchError::Curl)?;
            if let Err(e) = transfer.perform() {
                drop(transfer);
                if let Some(io_err) = storage_error.take() {
                    return Err(FetchError::Storage(io_err));
                }
                return Err(FetchError::Curl(e));
            }
        }

        let code = easy.response_code().map_err(FetchError::Curl)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        file.sync_all()?;
        if written == 0 {
            return Err(FetchError::Empty);
        }
        Ok(written)
    }
}
