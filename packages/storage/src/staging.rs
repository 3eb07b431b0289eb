//! Buffers an inbound write stream to a sized, seekable temporary file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use crate::mimetype;

/// How many leading bytes the mime sniffer gets to look at.
const SNIFF_LEN: usize = 512;

/// An inbound stream materialized to an anonymous temporary file.
///
/// The transport requires the content length declared up front and mime
/// detection needs the leading bytes, so writes are staged here before
/// upload. The backing file is unlinked from creation, so it is removed
/// when the last handle closes - on every exit path, including upload
/// failure.
pub struct StagedContent {
    file: File,
    size: u64,
    mime_type: &'static str,
}

impl StagedContent {
    /// Drain `source` completely into a temporary file.
    ///
    /// The source is consumed; dropping it afterwards is the caller's
    /// release of the inbound stream.
    pub fn from_reader(mut source: impl Read) -> io::Result<StagedContent> {
        let mut file = tempfile::tempfile()?;
        let size = io::copy(&mut source, &mut file)?;

        file.seek(SeekFrom::Start(0))?;
        let mut head = [0u8; SNIFF_LEN];
        let filled = read_fully(&mut file, &mut head)?;
        let mime_type = mimetype::detect_mime(&head[..filled]);

        log::debug!("staged {} bytes ({})", size, mime_type);

        Ok(StagedContent {
            file,
            size,
            mime_type,
        })
    }

    /// Byte length of the staged content.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Mime type detected from the leading bytes.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Consume the staging buffer, returning a reader positioned at the
    /// start. The file stays unlinked, so whoever ends up owning the
    /// handle cannot leak it.
    pub fn into_reader(mut self) -> io::Result<File> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(self.file)
    }
}

/// Read until `buffer` is full or the source is exhausted.
fn read_fully(source: &mut impl Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = source.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn records_size_and_detects_mime() {
        let png_head = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let mut content = png_head.to_vec();
        content.extend_from_slice(&[0u8; 100]);

        let staged = StagedContent::from_reader(Cursor::new(content.clone())).unwrap();
        assert_eq!(staged.size(), content.len() as u64);
        assert_eq!(staged.mime_type(), "image/png");
    }

    #[test]
    fn empty_stream_stages_zero_bytes() {
        let staged = StagedContent::from_reader(Cursor::new(Vec::new())).unwrap();
        assert_eq!(staged.size(), 0);
        assert_eq!(staged.mime_type(), mimetype::OCTET_STREAM);
    }

    #[test]
    fn reader_reproduces_the_content() {
        let content = b"42 bytes of text content".to_vec();
        let staged = StagedContent::from_reader(Cursor::new(content.clone())).unwrap();

        let mut reader = staged.into_reader().unwrap();
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, content);
    }

    #[test]
    fn content_larger_than_sniff_window_round_trips() {
        let content = vec![7u8; SNIFF_LEN * 3];
        let staged = StagedContent::from_reader(Cursor::new(content.clone())).unwrap();
        assert_eq!(staged.size(), content.len() as u64);

        let mut reader = staged.into_reader().unwrap();
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, content);
    }
}
