//! Minimal Motion-JPEG AVI (RIFF) writer.
//!
//! Layout written by [`MjpegAvi::finish`]:
//!
//! ```text
//! RIFF 'AVI '
//!   LIST 'hdrl'
//!     'avih'            main header (56 bytes)
//!     LIST 'strl'
//!       'strh'          video stream header (56 bytes)
//!       'strf'          BITMAPINFOHEADER (40 bytes)
//!   LIST 'INFO'         optional, 'ISRC' source tag
//!   LIST 'movi'
//!     '00dc' × frames   one JPEG per chunk, padded to even length
//!   'idx1'              one 16-byte entry per frame
//! ```
//!
//! All integers are little-endian. Index offsets are relative to the
//! `movi` fourcc.

use std::fs;
use std::path::Path;

use crate::domain::error::{TrainError, TrainResult};

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;

/// Frames collected in memory and written as one file on finish.
#[derive(Debug, Clone)]
pub struct MjpegAvi {
    width:  u32,
    height: u32,
    fps:    u32,
    source: Option<String>,
    frames: Vec<Vec<u8>>,
}

impl MjpegAvi {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps: fps.max(1), source: None, frames: Vec::new() }
    }

    /// Tag the file with the clip it was rendered from (INFO/ISRC).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Append one JPEG-encoded frame.
    pub fn push_frame(&mut self, jpeg: Vec<u8>) {
        self.frames.push(jpeg);
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Serialise the container to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let max_frame = self.frames.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let total     = self.frames.len() as u32;

        // ── hdrl ─────────────────────────────────────────────────────────────
        let mut avih = Vec::with_capacity(56);
        put_u32(&mut avih, 1_000_000 / self.fps);          // µs per frame
        put_u32(&mut avih, max_frame.saturating_mul(self.fps));
        put_u32(&mut avih, 0);                             // padding granularity
        put_u32(&mut avih, AVIF_HASINDEX);
        put_u32(&mut avih, total);
        put_u32(&mut avih, 0);                             // initial frames
        put_u32(&mut avih, 1);                             // streams
        put_u32(&mut avih, max_frame);
        put_u32(&mut avih, self.width);
        put_u32(&mut avih, self.height);
        avih.extend_from_slice(&[0u8; 16]);                // reserved

        let mut strh = Vec::with_capacity(56);
        strh.extend_from_slice(b"vids");
        strh.extend_from_slice(b"MJPG");
        put_u32(&mut strh, 0);                             // flags
        put_u16(&mut strh, 0);                             // priority
        put_u16(&mut strh, 0);                             // language
        put_u32(&mut strh, 0);                             // initial frames
        put_u32(&mut strh, 1);                             // scale
        put_u32(&mut strh, self.fps);                      // rate
        put_u32(&mut strh, 0);                             // start
        put_u32(&mut strh, total);                         // length
        put_u32(&mut strh, max_frame);
        put_u32(&mut strh, u32::MAX);                      // quality: default
        put_u32(&mut strh, 0);                             // sample size
        put_u16(&mut strh, 0);
        put_u16(&mut strh, 0);
        put_u16(&mut strh, self.width as u16);
        put_u16(&mut strh, self.height as u16);

        let mut strf = Vec::with_capacity(40);
        put_u32(&mut strf, 40);
        put_u32(&mut strf, self.width);
        put_u32(&mut strf, self.height);
        put_u16(&mut strf, 1);                             // planes
        put_u16(&mut strf, 24);                            // bit count
        strf.extend_from_slice(b"MJPG");
        put_u32(&mut strf, self.width * self.height * 3);
        strf.extend_from_slice(&[0u8; 16]);                // ppm x/y, colours

        let mut strl = b"strl".to_vec();
        put_chunk(&mut strl, b"strh", &strh);
        put_chunk(&mut strl, b"strf", &strf);

        let mut hdrl = b"hdrl".to_vec();
        put_chunk(&mut hdrl, b"avih", &avih);
        put_chunk(&mut hdrl, b"LIST", &strl);

        // ── movi + idx1 ──────────────────────────────────────────────────────
        let mut movi = b"movi".to_vec();
        let mut idx1 = Vec::with_capacity(self.frames.len() * 16);
        for frame in &self.frames {
            idx1.extend_from_slice(b"00dc");
            put_u32(&mut idx1, AVIIF_KEYFRAME);
            put_u32(&mut idx1, movi.len() as u32);
            put_u32(&mut idx1, frame.len() as u32);
            put_chunk(&mut movi, b"00dc", frame);
        }

        let mut body = b"AVI ".to_vec();
        put_chunk(&mut body, b"LIST", &hdrl);
        if let Some(source) = &self.source {
            let mut text = source.as_bytes().to_vec();
            text.push(0);
            let mut info = b"INFO".to_vec();
            put_chunk(&mut info, b"ISRC", &text);
            put_chunk(&mut body, b"LIST", &info);
        }
        put_chunk(&mut body, b"LIST", &movi);
        put_chunk(&mut body, b"idx1", &idx1);

        let mut out = Vec::with_capacity(body.len() + 8);
        put_chunk(&mut out, b"RIFF", &body);
        out
    }

    /// Write the container to `path`.
    pub fn finish(&self, path: &Path) -> TrainResult<()> {
        fs::write(path, self.to_bytes()).map_err(TrainError::io(path))
    }
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// fourcc + size + data, padded to an even length.
fn put_chunk(buf: &mut Vec<u8>, fourcc: &[u8; 4], data: &[u8]) {
    buf.extend_from_slice(fourcc);
    put_u32(buf, data.len() as u32);
    buf.extend_from_slice(data);
    if data.len() % 2 == 1 {
        buf.push(0);
    }
}
