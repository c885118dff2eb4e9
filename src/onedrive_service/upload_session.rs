use crate::error::{BridgeError, Result};

/// Lifecycle of one chunked write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// Waiting for the service to hand out a session URL
    Created,
    Uploading,
    Completed,
    Failed,
}

/// Inclusive byte range of one chunk write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Call-scoped state of a resumable upload session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    session_url: Option<String>,
    total_size: u64,
    next_offset: u64,
    state: UploadState,
}

impl UploadSession {
    pub fn new(total_size: u64) -> Self {
        Self {
            session_url: None,
            total_size,
            next_offset: 0,
            state: UploadState::Created,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn session_url(&self) -> Option<&str> {
        self.session_url.as_deref()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Created -> Uploading once the service allocated a session URL
    pub fn start(&mut self, session_url: String) -> Result<()> {
        if self.state != UploadState::Created {
            return Err(BridgeError::Protocol(format!(
                "cannot start an upload session in state {:?}",
                self.state
            )));
        }
        self.session_url = Some(session_url);
        self.state = if self.total_size == 0 {
            UploadState::Completed
        } else {
            UploadState::Uploading
        };
        Ok(())
    }

    /// Range of the next chunk write, `None` when nothing is left to send
    pub fn next_range(&self, chunk_size: u64) -> Option<ChunkRange> {
        if self.state != UploadState::Uploading || chunk_size == 0 {
            return None;
        }
        if self.next_offset >= self.total_size {
            return None;
        }
        let len = chunk_size.min(self.total_size - self.next_offset);
        Some(ChunkRange {
            start: self.next_offset,
            end: self.next_offset + len - 1,
        })
    }

    /// `Content-Range` header value for a chunk
    pub fn content_range(&self, range: &ChunkRange) -> String {
        format!("bytes {}-{}/{}", range.start, range.end, self.total_size)
    }

    /// Record a sent chunk. The offset moves by the chunk length; the accepted byte count
    /// reported by the service is not reconciled.
    pub fn advance(&mut self, len: u64) {
        if self.state != UploadState::Uploading {
            return;
        }
        self.next_offset += len;
        if self.next_offset >= self.total_size {
            self.state = UploadState::Completed;
        }
    }

    pub fn fail(&mut self) {
        self.state = UploadState::Failed;
    }

    pub fn is_complete(&self) -> bool {
        self.state == UploadState::Completed
    }
}
