//! Raw RGB-D log reader with frame navigation
//!
//! Reads a log record by record from a seekable stream. Every forward read
//! records the offset it started at, which is what [`RawLogReader::back`] uses
//! to redo a frame.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rawlog::{RawLogReader, ReaderConfig, Resolution};
//!
//! fn read_frames() -> rawlog::Result<()> {
//!     let config = ReaderConfig::new(Resolution::VGA).with_flipped_colors(true);
//!     let mut reader = RawLogReader::open("capture.klg", config)?;
//!     println!("Log contains {} frames", reader.num_frames());
//!
//!     while let Some(frame) = reader.try_next_frame()? {
//!         println!("Frame {} at {}", frame.index, frame.timestamp);
//!     }
//!
//!     reader.rewind()?;
//!     reader.fast_forward(100)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! A failed decode or skip leaves the stream wherever the failure happened and
//! faults the reader: `next_frame`, `back` and `fast_forward` return
//! [`LogError::State`] until [`RawLogReader::rewind`] succeeds.

use super::format::{LogHeader, RECORD_HEADER_SIZE, RecordHeader, min_log_length, read_up_to};
use super::navigation::NavigationStack;
use crate::codec::PayloadCodec;
use crate::error::RecordField;
use crate::types::{DecodedFrame, PayloadEncoding, Resolution};
use crate::{LogError, ReaderConfig, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

const MEMORY_PATH: &str = "<memory>";

trait LogStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> LogStream for T {}

/// Where the stream comes from, so it can be reopened on rewind.
enum Origin {
    File,
    Memory(Arc<[u8]>),
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Ready,
    Faulted,
    Closed,
}

/// Sequential reader over a raw depth + color log
pub struct RawLogReader {
    stream: Option<Box<dyn LogStream>>,
    origin: Origin,
    path: PathBuf,
    config: ReaderConfig,
    state: ReaderState,
    total_frames: usize,
    current_frame: usize,
    position: u64,
    stream_len: u64,
    navigation: NavigationStack,
    frame: DecodedFrame,
    decoded: bool,
    depth_scratch: Vec<u8>,
    color_scratch: Vec<u8>,
    inflate_scratch: Vec<u8>,
}

impl RawLogReader {
    /// Open a log file and read its frame-count header
    pub fn open<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (stream, stream_len) = open_file(&path)?;
        Self::from_stream(stream, stream_len, Origin::File, path, config)
    }

    /// Create a reader over an in-memory log
    pub fn from_bytes(data: impl Into<Arc<[u8]>>, config: ReaderConfig) -> Result<Self> {
        let data: Arc<[u8]> = data.into();
        let stream_len = data.len() as u64;
        let stream = Box::new(std::io::Cursor::new(Arc::clone(&data)));
        Self::from_stream(stream, stream_len, Origin::Memory(data), PathBuf::from(MEMORY_PATH), config)
    }

    fn from_stream(
        mut stream: Box<dyn LogStream>,
        stream_len: u64,
        origin: Origin,
        path: PathBuf,
        config: ReaderConfig,
    ) -> Result<Self> {
        let resolution = config.resolution;
        if resolution.is_empty() {
            return Err(LogError::format(
                "Reader configuration",
                format!("Resolution {} has no pixels", resolution),
            ));
        }
        if resolution.checked_depth_bytes().is_none() || resolution.checked_color_bytes().is_none() {
            return Err(LogError::format(
                "Reader configuration",
                format!("Resolution {} is too large to buffer", resolution),
            ));
        }

        let header = LogHeader::parse_from_reader(&mut stream).map_err(|e| e.with_path(&path))?;
        check_declared_length(&path, stream_len, header.total_frames);

        let frame = DecodedFrame::try_with_resolution(resolution).map_err(|source| {
            LogError::Allocation {
                field: RecordField::ColorPayload,
                frame: 0,
                requested: resolution.color_bytes(),
                source,
            }
        })?;

        info!(
            "Opened raw log {}: {} frames, {} pixels ({})",
            path.display(),
            header.total_frames,
            resolution.pixel_count(),
            resolution
        );

        Ok(Self {
            stream: Some(stream),
            origin,
            path,
            config,
            state: ReaderState::Ready,
            total_frames: header.total_frames,
            current_frame: 0,
            position: super::format::LOG_HEADER_SIZE as u64,
            stream_len,
            navigation: NavigationStack::new(),
            frame,
            decoded: false,
            depth_scratch: Vec::new(),
            color_scratch: Vec::new(),
            inflate_scratch: Vec::new(),
        })
    }

    /// Get the number of frames declared in the header
    pub fn num_frames(&self) -> usize {
        self.total_frames
    }

    /// Get the number of records consumed since the start of the log
    ///
    /// `next_frame` and `fast_forward` add to it, `back` takes one away.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Whether more than one frame remains after the current one
    pub fn has_more(&self) -> bool {
        self.state != ReaderState::Closed && self.current_frame + 1 < self.total_frames
    }

    /// Whether there is no history to step back through
    pub fn rewound(&self) -> bool {
        self.navigation.is_empty()
    }

    /// Get the path this reader was opened from (`<memory>` for in-memory logs)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the configuration the reader was built with
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn resolution(&self) -> Resolution {
        self.config.resolution
    }

    /// Byte offset of the next record to be read
    pub fn offset(&self) -> u64 {
        self.position
    }

    /// Number of offsets on the navigation stack
    pub fn history_len(&self) -> usize {
        self.navigation.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state == ReaderState::Closed
    }

    /// Whether a failed read requires a rewind before further navigation
    pub fn is_faulted(&self) -> bool {
        self.state == ReaderState::Faulted
    }

    /// Most recently decoded frame, if the last decode succeeded
    pub fn frame(&self) -> Option<&DecodedFrame> {
        if self.decoded && self.state != ReaderState::Closed { Some(&self.frame) } else { None }
    }

    /// Decode the next frame and advance
    pub fn next_frame(&mut self) -> Result<&DecodedFrame> {
        self.ensure_ready()?;
        if self.current_frame >= self.total_frames {
            return Err(LogError::NoMoreFrames { total: self.total_frames });
        }

        trace!("Pushing offset {:#x} for frame {}", self.position, self.current_frame);
        self.navigation.push(self.position);

        let index = self.current_frame;
        self.guarded(|reader| reader.decode_record(index))?;
        self.current_frame += 1;
        Ok(&self.frame)
    }

    /// Like [`next_frame`](Self::next_frame), but returns `None` at the end of the log
    pub fn try_next_frame(&mut self) -> Result<Option<&DecodedFrame>> {
        self.ensure_ready()?;
        if self.current_frame >= self.total_frames {
            return Ok(None);
        }
        self.next_frame().map(Some)
    }

    /// Step back to the current frame's record and decode it again
    ///
    /// The popped record is re-decoded into the frame buffers and the stream is
    /// left at its start, so the following [`next_frame`](Self::next_frame)
    /// yields the same frame.
    pub fn back(&mut self) -> Result<&DecodedFrame> {
        self.ensure_ready()?;
        let offset =
            self.navigation.pop().ok_or_else(|| LogError::state("no prior frame to return to"))?;
        trace!("Popped offset {:#x}", offset);

        self.current_frame = self.current_frame.saturating_sub(1);
        let index = self.current_frame;
        self.guarded(|reader| {
            reader.seek_to(offset)?;
            reader.decode_record(index)?;
            reader.seek_to(offset)
        })?;
        Ok(&self.frame)
    }

    /// Skip records without decoding them until `target` records have been consumed
    ///
    /// Stops early without error when the log would run out; at least one
    /// frame is always left for `next_frame`. Returns the resulting
    /// [`current_frame`](Self::current_frame).
    pub fn fast_forward(&mut self, target: usize) -> Result<usize> {
        self.ensure_ready()?;
        let start = self.current_frame;

        while self.current_frame < target && self.has_more() {
            trace!("Pushing offset {:#x} for skipped frame {}", self.position, self.current_frame);
            self.navigation.push(self.position);

            let index = self.current_frame;
            self.guarded(|reader| reader.skip_record(index))?;
            self.current_frame += 1;
        }

        debug!("Fast-forwarded from frame {} to {} (target {})", start, self.current_frame, target);
        Ok(self.current_frame)
    }

    /// Reopen the stream and return to the first frame
    pub fn rewind(&mut self) -> Result<()> {
        if self.state == ReaderState::Closed {
            return Err(LogError::state("cannot rewind a closed reader"));
        }

        self.navigation.clear();
        self.stream = None;
        self.state = ReaderState::Faulted;

        let (mut stream, stream_len) = match &self.origin {
            Origin::File => open_file(&self.path)?,
            Origin::Memory(data) => {
                let stream: Box<dyn LogStream> = Box::new(std::io::Cursor::new(Arc::clone(data)));
                (stream, data.len() as u64)
            }
            Origin::Released => return Err(LogError::state("log source has been released")),
        };
        let header = LogHeader::parse_from_reader(&mut stream).map_err(|e| e.with_path(&self.path))?;
        check_declared_length(&self.path, stream_len, header.total_frames);

        self.stream = Some(stream);
        self.stream_len = stream_len;
        self.total_frames = header.total_frames;
        self.current_frame = 0;
        self.position = super::format::LOG_HEADER_SIZE as u64;
        self.state = ReaderState::Ready;

        info!("Rewound raw log {} ({} frames)", self.path.display(), self.total_frames);
        Ok(())
    }

    /// Release the stream and all frame buffers
    pub fn close(&mut self) -> Result<()> {
        if self.state == ReaderState::Closed {
            return Err(LogError::state("reader is already closed"));
        }

        self.stream = None;
        self.origin = Origin::Released;
        self.navigation.clear();
        self.frame = DecodedFrame::default();
        self.depth_scratch = Vec::new();
        self.color_scratch = Vec::new();
        self.inflate_scratch = Vec::new();
        self.decoded = false;
        self.state = ReaderState::Closed;

        debug!("Closed raw log {}", self.path.display());
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            ReaderState::Ready => Ok(()),
            ReaderState::Faulted => {
                Err(LogError::state("a previous read failed; rewind before navigating"))
            }
            ReaderState::Closed => Err(LogError::state("reader is closed")),
        }
    }

    /// Run a stream operation, faulting the reader if it fails
    fn guarded<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        match op(self) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Read failed in {}: {}", self.path.display(), e);
                self.state = ReaderState::Faulted;
                self.decoded = false;
                Err(e.with_path(&self.path))
            }
        }
    }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| LogError::state("reader is closed"))?;
        stream.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    fn decode_record(&mut self, index: usize) -> Result<()> {
        let record_offset = self.position;
        let resolution = self.config.resolution;
        let stream = self.stream.as_mut().ok_or_else(|| LogError::state("reader is closed"))?;

        let header = RecordHeader::parse_from_reader(stream, index, record_offset)?;
        self.position = record_offset + RECORD_HEADER_SIZE as u64;
        let (depth_size, color_size) = header.payload_sizes(index, self.config.max_payload_bytes)?;
        debug!(
            "Frame {} at {:#x}: timestamp={}, depth_size={}, color_size={}",
            index, record_offset, header.timestamp, depth_size, color_size
        );
        check_payloads_available(self.stream_len, self.position, depth_size, color_size, index)?;

        let depth_offset = self.position;
        read_payload(
            stream,
            &mut self.depth_scratch,
            depth_size,
            RecordField::DepthPayload,
            index,
            depth_offset,
        )?;
        self.position = depth_offset + depth_size as u64;

        if color_size > 0 {
            let color_offset = self.position;
            read_payload(
                stream,
                &mut self.color_scratch,
                color_size,
                RecordField::ColorPayload,
                index,
                color_offset,
            )?;
            self.position = color_offset + color_size as u64;
        }

        self.frame.timestamp = header.timestamp;
        self.frame.index = index;

        let depth_payload = &self.depth_scratch[..depth_size];
        self.frame.depth_encoding = if depth_size == resolution.depth_bytes() {
            debug!("Frame {} depth: raw copy of {} bytes", index, depth_size);
            self.frame.fill_depth_le(depth_payload);
            PayloadEncoding::Raw
        } else {
            let codec = required_codec(
                self.config.depth_codec.as_deref(),
                RecordField::DepthPayload,
                index,
                depth_size,
                resolution.depth_bytes(),
            )?;
            let canonical = grow_scratch(
                &mut self.inflate_scratch,
                resolution.depth_bytes(),
                RecordField::DepthPayload,
                index,
            )?;
            run_codec(codec, depth_payload, canonical, RecordField::DepthPayload, index)?;
            self.frame.fill_depth_le(canonical);
            PayloadEncoding::Compressed
        };

        self.frame.color_encoding = if color_size == 0 {
            debug!("Frame {} color: absent, buffer cleared", index);
            self.frame.color.fill(0);
            PayloadEncoding::Absent
        } else if color_size == resolution.color_bytes() {
            debug!("Frame {} color: raw copy of {} bytes", index, color_size);
            self.frame.color.copy_from_slice(&self.color_scratch[..color_size]);
            PayloadEncoding::Raw
        } else {
            let codec = required_codec(
                self.config.color_codec.as_deref(),
                RecordField::ColorPayload,
                index,
                color_size,
                resolution.color_bytes(),
            )?;
            run_codec(
                codec,
                &self.color_scratch[..color_size],
                &mut self.frame.color,
                RecordField::ColorPayload,
                index,
            )?;
            PayloadEncoding::Compressed
        };

        self.config.color_policy.apply(&mut self.frame.color);
        self.decoded = true;
        Ok(())
    }

    /// Advance past one record reading only its header
    fn skip_record(&mut self, index: usize) -> Result<()> {
        let record_offset = self.position;
        let stream = self.stream.as_mut().ok_or_else(|| LogError::state("reader is closed"))?;

        let header = RecordHeader::parse_from_reader(stream, index, record_offset)?;
        self.position = record_offset + RECORD_HEADER_SIZE as u64;
        let (depth_size, color_size) = header.payload_sizes(index, self.config.max_payload_bytes)?;

        let payload_start = self.position;
        check_payloads_available(self.stream_len, payload_start, depth_size, color_size, index)?;

        let (depth_len, color_len) = (depth_size as u64, color_size as u64);
        let next = payload_start + depth_len + color_len;
        stream.seek(SeekFrom::Start(next))?;
        self.position = next;
        trace!("Skipped frame {} ({} payload bytes)", index, depth_len + color_len);
        Ok(())
    }
}

fn open_file(path: &Path) -> Result<(Box<dyn LogStream>, u64)> {
    let file = File::open(path).map_err(|e| LogError::io_error(path.to_path_buf(), e))?;
    let stream_len =
        file.metadata().map_err(|e| LogError::io_error(path.to_path_buf(), e))?.len();
    Ok((Box::new(BufReader::new(file)), stream_len))
}

fn check_declared_length(path: &Path, stream_len: u64, total_frames: usize) {
    let required = min_log_length(total_frames);
    if stream_len < required {
        warn!(
            "Log {} declares {} frames but is only {} bytes (at least {} needed)",
            path.display(),
            total_frames,
            stream_len,
            required
        );
    }
}

/// Fail with `TruncatedRecord` if the stream cannot hold the declared payloads,
/// before any scratch space is reserved for them.
fn check_payloads_available(
    stream_len: u64,
    payload_start: u64,
    depth_size: usize,
    color_size: usize,
    frame: usize,
) -> Result<()> {
    let available = stream_len.saturating_sub(payload_start);
    let (depth_len, color_len) = (depth_size as u64, color_size as u64);
    if available < depth_len {
        return Err(LogError::TruncatedRecord {
            field: RecordField::DepthPayload,
            frame,
            offset: payload_start,
            expected: depth_len,
            available,
        });
    }
    if available - depth_len < color_len {
        return Err(LogError::TruncatedRecord {
            field: RecordField::ColorPayload,
            frame,
            offset: payload_start + depth_len,
            expected: color_len,
            available: available - depth_len,
        });
    }
    Ok(())
}

fn grow_scratch<'a>(
    buf: &'a mut Vec<u8>,
    size: usize,
    field: RecordField,
    frame: usize,
) -> Result<&'a mut [u8]> {
    if buf.len() < size {
        buf.try_reserve_exact(size - buf.len()).map_err(|source| LogError::Allocation {
            field,
            frame,
            requested: size,
            source,
        })?;
        buf.resize(size, 0);
    }
    Ok(&mut buf[..size])
}

fn read_payload<R: Read>(
    stream: &mut R,
    buf: &mut Vec<u8>,
    size: usize,
    field: RecordField,
    frame: usize,
    offset: u64,
) -> Result<()> {
    let target = grow_scratch(buf, size, field, frame)?;
    let read = read_up_to(stream, target)?;
    if read < size {
        return Err(LogError::TruncatedRecord {
            field,
            frame,
            offset,
            expected: size as u64,
            available: read as u64,
        });
    }
    Ok(())
}

fn required_codec(
    codec: Option<&dyn PayloadCodec>,
    field: RecordField,
    frame: usize,
    size: usize,
    canonical: usize,
) -> Result<&dyn PayloadCodec> {
    codec.ok_or_else(|| {
        LogError::format(
            format!("Frame {} {}", frame, field),
            format!(
                "{} bytes does not match the canonical {} bytes and no codec is configured",
                size, canonical
            ),
        )
    })
}

fn run_codec(
    codec: &dyn PayloadCodec,
    payload: &[u8],
    output: &mut [u8],
    field: RecordField,
    frame: usize,
) -> Result<()> {
    let written =
        codec.decode(payload, output).map_err(|source| LogError::Codec { field, frame, source })?;
    if written != output.len() {
        return Err(LogError::format(
            format!("Frame {} {}", frame, field),
            format!("Codec produced {} bytes, expected {}", written, output.len()),
        ));
    }
    debug!("Frame {} {}: decompressed {} -> {} bytes", frame, field, payload.len(), written);
    Ok(())
}
