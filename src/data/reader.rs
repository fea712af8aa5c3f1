// reader.rs - Streaming MAF block reader

use std::io::BufRead;

use tracing::{debug, warn};

use crate::data::block::{Block, SequenceRecord};
use crate::data::identity::IdentityRegistry;
use crate::error::{MafError, Result};

/// Literal every MAF stream must start with
pub const HEADER_MARKER: &[u8] = b"##maf";

const BLOCK_MARKER: u8 = b'a';
const RECORD_MARKER: u8 = b's';
const COMMENT_MARKER: u8 = b'#';

/// Position of the scanner in the stream grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Header,
    BetweenBlocks,
    InBlockHeader,
    InBlockRecords,
    Done,
}

/// Lazily yields the blocks of one MAF stream.
///
/// The reader owns the identity registry of the stream: every record name is
/// registered as it is parsed, so ids follow first-seen order. The iterator is
/// single-pass and fuses after the first error.
pub struct BlockReader<R> {
    input: R,
    source: String,
    state: ReaderState,
    registry: IdentityRegistry,
    pending: Option<Vec<u8>>,
    line_no: usize,
    current: Option<Block>,
    blocks_read: usize,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_source(input, "<stream>")
    }

    /// Create a reader whose I/O errors mention `source` (usually a path)
    pub fn with_source(input: R, source: impl Into<String>) -> Self {
        Self {
            input,
            source: source.into(),
            state: ReaderState::Header,
            registry: IdentityRegistry::new(),
            pending: None,
            line_no: 0,
            current: None,
            blocks_read: 0,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> IdentityRegistry {
        self.registry
    }

    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    /// Read one physical line without its terminator
    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let n = self
            .input
            .read_until(b'\n', &mut buf)
            .map_err(|e| MafError::io(self.source.clone(), e))?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Look at the next line without consuming it
    fn peek_line(&mut self) -> Result<Option<&[u8]>> {
        if self.pending.is_none() {
            self.pending = self.read_line()?;
        }
        Ok(self.pending.as_deref())
    }

    /// Consume the next line, returning it with its 1-based line number
    fn take_line(&mut self) -> Result<Option<(usize, Vec<u8>)>> {
        let line = match self.pending.take() {
            Some(line) => Some(line),
            None => self.read_line()?,
        };
        Ok(line.map(|l| {
            self.line_no += 1;
            (self.line_no, l)
        }))
    }

    fn read_header(&mut self) -> Result<()> {
        match self.take_line()? {
            Some((_, line)) if line.starts_with(HEADER_MARKER) => Ok(()),
            Some((_, line)) => Err(MafError::MissingHeader {
                found: String::from_utf8_lossy(&line).chars().take(40).collect(),
            }),
            None => Err(MafError::MissingHeader {
                found: String::new(),
            }),
        }
    }

    /// Skip blank and comment lines; decide whether another block follows
    fn seek_block(&mut self) -> Result<ReaderState> {
        loop {
            let marker = match self.peek_line()? {
                None => return Ok(ReaderState::Done),
                Some(line) => line.iter().copied().find(|b| !b.is_ascii_whitespace()),
            };
            match marker {
                None => {
                    self.take_line()?;
                }
                Some(COMMENT_MARKER) if self.peek_starts_with(COMMENT_MARKER) => {
                    self.take_line()?;
                }
                Some(_) if self.peek_starts_with(BLOCK_MARKER) => {
                    return Ok(ReaderState::InBlockHeader);
                }
                Some(other) => {
                    warn!(
                        "{}: line {}: stopping at line starting with '{}', remaining input ignored",
                        self.source,
                        self.line_no + 1,
                        other as char
                    );
                    return Ok(ReaderState::Done);
                }
            }
        }
    }

    fn peek_starts_with(&self, marker: u8) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|line| line.first() == Some(&marker))
    }

    /// Parse `s <name> <start> <size> <strand> <srcSize> <text>`, ignoring anything after
    fn parse_record(&mut self, line_no: usize, line: &[u8]) -> Result<SequenceRecord> {
        let malformed = |reason: String| MafError::MalformedRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&[u8]> = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() < 7 {
            return Err(malformed(format!(
                "expected 7 fields, found {}",
                fields.len()
            )));
        }
        if fields[0] != [RECORD_MARKER].as_slice() {
            return Err(malformed("line does not start with 's'".to_string()));
        }

        let name = std::str::from_utf8(fields[1])
            .map_err(|_| malformed("source name is not valid UTF-8".to_string()))?;
        for (label, field) in [("start", fields[2]), ("size", fields[3]), ("source size", fields[5])] {
            parse_number(field).ok_or_else(|| {
                malformed(format!(
                    "{} '{}' is not a number",
                    label,
                    String::from_utf8_lossy(field)
                ))
            })?;
        }
        if fields[4].len() != 1 {
            return Err(malformed(format!(
                "strand '{}' is not a single character",
                String::from_utf8_lossy(fields[4])
            )));
        }

        let identity = self.registry.register(name);
        Ok(SequenceRecord::new(identity, fields[6]))
    }

    fn push_record(&mut self, line_no: usize, record: SequenceRecord) -> Result<()> {
        let block = self.current.get_or_insert_with(|| Block::new(line_no));
        if let Some(expected) = block.aligned_length() {
            if record.len() != expected {
                return Err(MafError::LengthMismatch {
                    line: line_no,
                    identity: self.registry.name(record.identity).unwrap_or("?").to_string(),
                    expected,
                    found: record.len(),
                });
            }
        }
        block.records.push(record);
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Block>> {
        loop {
            match self.state {
                ReaderState::Header => {
                    self.read_header()?;
                    self.state = ReaderState::BetweenBlocks;
                }
                ReaderState::BetweenBlocks => {
                    self.state = self.seek_block()?;
                }
                ReaderState::InBlockHeader => {
                    if let Some((line_no, _)) = self.take_line()? {
                        self.current = Some(Block::new(line_no));
                    }
                    self.state = ReaderState::InBlockRecords;
                }
                ReaderState::InBlockRecords => {
                    if self.peek_line()?.is_some() && self.peek_starts_with(RECORD_MARKER) {
                        if let Some((line_no, line)) = self.take_line()? {
                            let record = self.parse_record(line_no, &line)?;
                            self.push_record(line_no, record)?;
                        }
                        continue;
                    }
                    self.state = ReaderState::BetweenBlocks;
                    let block = self.current.take().unwrap_or_default();
                    self.blocks_read += 1;
                    debug!(
                        "block {} (line {}): {} records, {} columns",
                        self.blocks_read,
                        block.line,
                        block.len(),
                        block.aligned_length().unwrap_or(0)
                    );
                    return Ok(Some(block));
                }
                ReaderState::Done => return Ok(None),
            }
        }
    }
}

fn parse_number(field: &[u8]) -> Option<u64> {
    std::str::from_utf8(field).ok()?.parse().ok()
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(block) => block.map(Ok),
            Err(e) => {
                self.state = ReaderState::Done;
                self.current = None;
                Some(Err(e))
            }
        }
    }
}
