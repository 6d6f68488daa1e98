//! One HTTP GET of a whole resource into the workspace.

use std::io;
use std::path::Path;

use super::CurlOptions;
use crate::retry::FetchError;
use crate::storage::PartFile;

/// Downloads `url` to `dest` via `<dest>.part`. Returns `FetchError` so
/// callers can classify and retry.
pub(super) fn download_one(url: &str, dest: &Path, opts: CurlOptions) -> Result<(), FetchError> {
    let mut part = PartFile::create(dest).map_err(FetchError::Storage)?;
    match perform_get(url, &mut part, opts) {
        Ok(()) => {
            tracing::trace!(url, bytes = part.written(), "fetched");
            part.finalize(dest).map_err(FetchError::Storage)
        }
        Err(e) => {
            part.discard();
            Err(e)
        }
    }
}

fn perform_get(url: &str, part: &mut PartFile, opts: CurlOptions) -> Result<(), FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.transfer_timeout)?;

    let mut storage_error: Option<io::Error> = None;
    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match part.write_chunk(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                storage_error = Some(e);
                // Returning a short count makes curl abort with a write error.
                Ok(0)
            }
        })?;
        transfer.perform()
    };
    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(io_err) = storage_error.take() {
                return Err(FetchError::Storage(io_err));
            }
        }
        return Err(FetchError::Transport(e));
    }

    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        return Err(FetchError::Http { status });
    }
    Ok(())
}
