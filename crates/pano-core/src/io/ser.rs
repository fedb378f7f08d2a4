use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::{PanoError, Result};
use crate::frame::{ColorMode, Frame, FrameMetadata};

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Fixed-size SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
}

impl SerHeader {
    /// Bytes per sample plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per stored frame.
    pub fn frame_byte_size(&self) -> usize {
        let pixels = (self.width as usize)
            .checked_mul(self.height as usize)
            .expect("Image dimensions too large");
        pixels
            .checked_mul(self.bytes_per_sample() * self.planes_per_pixel())
            .expect("Frame size calculation overflow")
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.color_id {
            8 => ColorMode::BayerRGGB,
            9 => ColorMode::BayerGRBG,
            10 => ColorMode::BayerGBRG,
            11 => ColorMode::BayerBGGR,
            100 => ColorMode::RGB,
            101 => ColorMode::BGR,
            _ => ColorMode::Mono,
        }
    }
}

/// Memory-mapped SER file reader.
///
/// Each reader owns its own mapping, so concurrent readers over the same
/// file never share decode state.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and validate its header against the file length.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(PanoError::InvalidSer("File too small for SER header".into()));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(PanoError::InvalidSer("Missing LUCAM-RECORDER magic".into()));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let expected = SER_HEADER_SIZE + header.frame_byte_size() * header.frame_count as usize;
        if mmap.len() < expected {
            return Err(PanoError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Raw bytes of a single stored frame (zero-copy from the mapping).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let total = self.frame_count();
        if index >= total {
            return Err(PanoError::FrameIndexOutOfRange { index, total });
        }
        let offset = SER_HEADER_SIZE + index * self.header.frame_byte_size();
        Ok(&self.mmap[offset..offset + self.header.frame_byte_size()])
    }

    /// Decode a single frame to a grayscale f32 plane in [0.0, 1.0].
    ///
    /// RGB/BGR sources are reduced to BT.601 luminance; Bayer sources are
    /// treated as a raw mono plane.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let bps = self.header.bytes_per_sample();
        let planes = self.header.planes_per_pixel();
        let max_val = ((1u32 << self.header.pixel_depth) - 1) as f32;

        let sample = |offset: usize| -> f32 {
            if bps == 1 {
                raw[offset] as f32
            } else if self.header.little_endian {
                u16::from_le_bytes([raw[offset], raw[offset + 1]]) as f32
            } else {
                u16::from_be_bytes([raw[offset], raw[offset + 1]]) as f32
            }
        };

        let mut data = Array2::<f32>::zeros((h, w));
        for row in 0..h {
            for col in 0..w {
                let pixel = (row * w + col) * planes * bps;
                let val = if planes == 1 {
                    sample(pixel)
                } else {
                    let (c0, c1, c2) = (sample(pixel), sample(pixel + bps), sample(pixel + 2 * bps));
                    let (r, g, b) = match self.header.color_mode() {
                        ColorMode::BGR => (c2, c1, c0),
                        _ => (c0, c1, c2),
                    };
                    LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b
                };
                data[[row, col]] = val / max_val;
            }
        }

        let mut frame = Frame::new(data, (bps * 8) as u8);
        frame.metadata = FrameMetadata {
            source_index: 0,
            frame_index: index,
            timestamp_us: self.read_timestamp(index),
        };
        Ok(frame)
    }

    /// Per-frame timestamp from the optional trailer, if present.
    fn read_timestamp(&self, index: usize) -> Option<u64> {
        let trailer = SER_HEADER_SIZE + self.header.frame_byte_size() * self.frame_count();
        let at = trailer + index * 8;
        if at + 8 <= self.mmap.len() {
            let bytes = &self.mmap[at..at + 8];
            Some(u64::from_le_bytes(bytes.try_into().ok()?))
        } else {
            None
        }
    }

    /// Iterator over all frames in stored order.
    pub fn frames(&self) -> impl Iterator<Item = Result<Frame>> + '_ {
        (0..self.frame_count()).map(move |i| self.read_frame(i))
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;
    // Observer/instrument/telescope strings (120 bytes) and capture
    // timestamps are not used by the panorama pipeline.

    if width == 0 || height == 0 {
        return Err(PanoError::InvalidDimensions { width, height });
    }
    // Anything outside 1..=16 cannot come from a valid writer and would
    // break the sample normalization below.
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(PanoError::InvalidSer(format!(
            "Unsupported pixel depth: {pixel_depth}"
        )));
    }

    // SER spec: LittleEndian field = 0 means big-endian pixel data,
    // but most writers use 0 for little-endian. Follow Siril's convention
    // and treat anything but 1 as little-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
    })
}
