//! Object readability checks and local persistence

use crate::probe::{ProbeClient, ProbeMethod, ProbeStream};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// What happened to one listed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOutcome {
    /// Readable and written to the given path
    Downloaded(PathBuf),
    /// Readable; nothing was written
    Public,
    /// Not readable anonymously (or the request failed)
    Private,
    /// Readable, but writing it locally failed
    NotSaved { reason: String },
}

/// Issues a HEAD request and reports whether the object is readable
pub async fn check_readable(client: &dyn ProbeClient, url: &str) -> ObjectOutcome {
    match client.fetch(url, ProbeMethod::Head).await {
        Ok(response) if response.is_ok() => ObjectOutcome::Public,
        Ok(response) => {
            tracing::trace!(%url, status = response.status, "object not readable");
            ObjectOutcome::Private
        }
        Err(e) => {
            tracing::debug!(%url, "readability check failed: {}", e);
            ObjectOutcome::Private
        }
    }
}

/// Downloads an object to `destination`, streaming the body to disk
///
/// A failed GET or a non-200 status means the object is private. Once a 200
/// has arrived the object is readable, so any later failure (a local write
/// or the body breaking off) is reported as [`ObjectOutcome::NotSaved`],
/// never as private.
pub async fn download_object(
    client: &dyn ProbeClient,
    url: &str,
    destination: Option<PathBuf>,
) -> ObjectOutcome {
    let mut stream = match client.fetch_stream(url).await {
        Ok(stream) if stream.status() == 200 => stream,
        Ok(stream) => {
            tracing::trace!(%url, status = stream.status(), "object not readable");
            return ObjectOutcome::Private;
        }
        Err(e) => {
            tracing::debug!(%url, "download failed: {}", e);
            return ObjectOutcome::Private;
        }
    };

    let Some(path) = destination else {
        return ObjectOutcome::NotSaved {
            reason: "key has no usable file name".to_string(),
        };
    };

    match write_object(&path, stream.as_mut()).await {
        Ok(bytes) => {
            tracing::debug!(path = %path.display(), bytes, "object saved");
            ObjectOutcome::Downloaded(path)
        }
        Err(reason) => {
            tracing::warn!(path = %path.display(), "failed to save object: {}", reason);
            ObjectOutcome::NotSaved { reason }
        }
    }
}

/// Writes the body to `path`, removing the partial file on failure
async fn write_object(path: &Path, stream: &mut dyn ProbeStream) -> Result<u64, String> {
    if let Some(parent) = path.parent() {
        // create_dir_all treats a directory created concurrently by another worker as success
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| e.to_string())?;

    let result = copy_chunks(&mut file, stream).await;
    if result.is_err() {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn copy_chunks(file: &mut tokio::fs::File, stream: &mut dyn ProbeStream) -> Result<u64, String> {
    let mut written = 0u64;
    while let Some(chunk) = stream.next_chunk().await.map_err(|e| e.to_string())? {
        file.write_all(&chunk).await.map_err(|e| e.to_string())?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| e.to_string())?;
    Ok(written)
}

/// Maps an object key to a local file path under `output_dir/bucket`
///
/// The layout mirrors the object URL's path, bucket first, whether the
/// object was reached path-style or through a virtual-host redirect. Empty,
/// `.` and `..` segments are dropped so a key can never climb out of
/// `output_dir`.
///
/// # Returns
///
/// `None` if nothing usable remains of the key
pub fn local_path(output_dir: &Path, bucket: &str, key: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = key
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if segments.is_empty() {
        return None;
    }

    let mut path = output_dir.join(bucket);
    path.extend(segments);

    Some(path)
}
