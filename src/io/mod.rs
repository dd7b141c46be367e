mod local;

pub use local::LocalFileReader;

use anyhow::Result;

/// Random access reads from an archive source.
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill the whole buffer or fail.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_at(offset + filled as u64, &mut buf[filled..])?;
            if n == 0 {
                anyhow::bail!(
                    "unexpected end of archive at offset {}",
                    offset + filled as u64
                );
            }
            filled += n;
        }
        Ok(())
    }
}
