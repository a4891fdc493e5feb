use std::io;
use std::path::Path;

use dlpro_core::FetchError;
use futures_util::StreamExt;
use reqwest::Url;
use reqwest::header::LOCATION;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::HttpFetcher;
use crate::cleanup::{TempPathGuard, replace_file, temp_sibling};

impl HttpFetcher {
    /// One fetch attempt: follow redirects, stream to `<dest>.tmp`, rename.
    ///
    /// On any failure the temp file is removed and `dest` is left untouched.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = temp_sibling(dest);
        remove_if_present(&tmp).await?;
        let guard = TempPathGuard::new(tmp);

        let written = tokio::time::timeout(self.settings.timeout, self.download_to(url, guard.path()))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                secs: self.settings.timeout.as_secs(),
            })??;

        if written == 0 {
            return Err(FetchError::EmptyArtifact {
                path: dest.display().to_string(),
            });
        }

        install(guard.path(), dest).await?;
        guard.disarm();
        debug!(url = %url, dest = %dest.display(), bytes = written, "artifact installed");
        Ok(())
    }

    async fn download_to(&self, url: &str, tmp: &Path) -> Result<u64, FetchError> {
        let mut current =
            Url::parse(url).map_err(|e| FetchError::invalid_url(url, e.to_string()))?;
        let mut hops = 0u32;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| FetchError::network(e.to_string()))?;
            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = response.headers().get(LOCATION) {
                    if hops >= self.settings.max_redirects {
                        return Err(FetchError::RedirectLoop {
                            url: url.to_string(),
                            limit: self.settings.max_redirects,
                        });
                    }
                    hops += 1;

                    let location = location
                        .to_str()
                        .map_err(|e| FetchError::invalid_url(current.as_str(), e.to_string()))?;
                    let next = current
                        .join(location)
                        .map_err(|e| FetchError::invalid_url(location, e.to_string()))?;
                    debug!(from = %current, to = %next, status = status.as_u16(), "following redirect");
                    current = next;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(FetchError::http_status(current.as_str(), status.as_u16()));
            }

            return write_body(response, tmp).await;
        }
    }
}

async fn write_body(response: reqwest::Response, tmp: &Path) -> Result<u64, FetchError> {
    let mut file = fs::File::create(tmp).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::network(e.to_string()))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

/// Rename `tmp` over `dest` off the async runtime.
async fn install(tmp: &Path, dest: &Path) -> Result<(), FetchError> {
    let (tmp, dest) = (tmp.to_path_buf(), dest.to_path_buf());
    tokio::task::spawn_blocking(move || replace_file(&tmp, &dest))
        .await
        .map_err(|e| FetchError::from(io::Error::other(e)))??;
    Ok(())
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
