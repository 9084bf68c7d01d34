use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes any report-shaped value as pretty JSON.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub async fn export_json<T>(path: &str, value: &T) -> Result<(), std::io::Error>
where
    T: Serialize + Sync,
{
    let json = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
