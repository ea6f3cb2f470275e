//! In-memory images and EXIF blobs for unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::png::{Png, PngChunk};
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;

pub(crate) const TYPE_BYTE: u16 = 1;
pub(crate) const TYPE_ASCII: u16 = 2;
pub(crate) const TYPE_SHORT: u16 = 3;
pub(crate) const TYPE_LONG: u16 = 4;
pub(crate) const TYPE_RATIONAL: u16 = 5;
pub(crate) const TYPE_UNDEFINED: u16 = 7;
pub(crate) const TYPE_SRATIONAL: u16 = 10;
pub(crate) const TYPE_DOUBLE: u16 = 12;

/// One IFD entry, payload already encoded little-endian.
#[derive(Clone)]
pub(crate) struct Entry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

impl Entry {
    pub(crate) fn raw(tag: u16, kind: u16, count: u32, data: Vec<u8>) -> Self {
        Self { tag, kind, count, data }
    }

    pub(crate) fn ascii(tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self::raw(tag, TYPE_ASCII, data.len() as u32, data)
    }

    pub(crate) fn short(tag: u16, value: u16) -> Self {
        Self::raw(tag, TYPE_SHORT, 1, value.to_le_bytes().to_vec())
    }

    pub(crate) fn long(tag: u16, value: u32) -> Self {
        Self::raw(tag, TYPE_LONG, 1, value.to_le_bytes().to_vec())
    }

    pub(crate) fn bytes(tag: u16, values: &[u8]) -> Self {
        Self::raw(tag, TYPE_BYTE, values.len() as u32, values.to_vec())
    }

    pub(crate) fn undefined(tag: u16, values: &[u8]) -> Self {
        Self::raw(tag, TYPE_UNDEFINED, values.len() as u32, values.to_vec())
    }

    pub(crate) fn rationals(tag: u16, values: &[(u32, u32)]) -> Self {
        let data = values
            .iter()
            .flat_map(|(n, d)| n.to_le_bytes().into_iter().chain(d.to_le_bytes()))
            .collect();
        Self::raw(tag, TYPE_RATIONAL, values.len() as u32, data)
    }

    pub(crate) fn srationals(tag: u16, values: &[(i32, i32)]) -> Self {
        let data = values
            .iter()
            .flat_map(|(n, d)| n.to_le_bytes().into_iter().chain(d.to_le_bytes()))
            .collect();
        Self::raw(tag, TYPE_SRATIONAL, values.len() as u32, data)
    }

    pub(crate) fn double(tag: u16, value: f64) -> Self {
        Self::raw(tag, TYPE_DOUBLE, 1, value.to_le_bytes().to_vec())
    }
}

/// Builds a little-endian TIFF blob the way cameras lay out EXIF:
/// IFD0 → Exif IFD → GPS IFD → Interop IFD, then IFD1 and its thumbnail.
#[derive(Default, Clone)]
pub(crate) struct ExifBuilder {
    pub(crate) ifd0: Vec<Entry>,
    pub(crate) exif: Vec<Entry>,
    pub(crate) gps: Vec<Entry>,
    pub(crate) interop: Vec<Entry>,
    pub(crate) ifd1: Vec<Entry>,
    pub(crate) thumbnail: Option<Vec<u8>>,
}

fn ifd_len(entries: &[Entry]) -> usize {
    let extra: usize = entries
        .iter()
        .filter(|e| e.data.len() > 4)
        .map(|e| e.data.len() + e.data.len() % 2)
        .sum();
    2 + entries.len() * 12 + 4 + extra
}

fn patch(entries: &mut [Entry], tag: u16, value: u32) {
    if let Some(entry) = entries.iter_mut().find(|e| e.tag == tag) {
        entry.data = value.to_le_bytes().to_vec();
    }
}

fn write_ifd(out: &mut Vec<u8>, entries: &[Entry], next: u32) {
    let start = out.len();
    let mut data_at = start + 2 + entries.len() * 12 + 4;
    let mut blobs = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..entry.data.len()].copy_from_slice(&entry.data);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(data_at as u32).to_le_bytes());
            let mut blob = entry.data.clone();
            if blob.len() % 2 != 0 {
                blob.push(0);
            }
            data_at += blob.len();
            blobs.push(blob);
        }
    }
    out.extend_from_slice(&next.to_le_bytes());
    for blob in blobs {
        out.extend_from_slice(&blob);
    }
}

impl ExifBuilder {
    pub(crate) fn build(mut self) -> Vec<u8> {
        let has_interop = !self.interop.is_empty();
        let has_exif = !self.exif.is_empty() || has_interop;
        let has_gps = !self.gps.is_empty();
        if has_interop {
            self.exif.push(Entry::long(0xA005, 0));
        }
        if has_exif {
            self.ifd0.push(Entry::long(0x8769, 0));
        }
        if has_gps {
            self.ifd0.push(Entry::long(0x8825, 0));
        }
        if let Some(thumb) = &self.thumbnail {
            self.ifd1.push(Entry::long(0x0201, 0));
            self.ifd1.push(Entry::long(0x0202, thumb.len() as u32));
        }
        let has_ifd1 = !self.ifd1.is_empty();

        let len_if = |present: bool, entries: &[Entry]| if present { ifd_len(entries) } else { 0 };
        let ifd0_at = 8;
        let exif_at = ifd0_at + ifd_len(&self.ifd0);
        let interop_at = exif_at + len_if(has_exif, &self.exif);
        let gps_at = interop_at + len_if(has_interop, &self.interop);
        let ifd1_at = gps_at + len_if(has_gps, &self.gps);
        let thumb_at = ifd1_at + len_if(has_ifd1, &self.ifd1);

        patch(&mut self.ifd0, 0x8769, exif_at as u32);
        patch(&mut self.ifd0, 0x8825, gps_at as u32);
        patch(&mut self.exif, 0xA005, interop_at as u32);
        patch(&mut self.ifd1, 0x0201, thumb_at as u32);

        let mut out = b"II".to_vec();
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&(ifd0_at as u32).to_le_bytes());

        let next = if has_ifd1 { ifd1_at as u32 } else { 0 };
        write_ifd(&mut out, &self.ifd0, next);
        if has_exif {
            write_ifd(&mut out, &self.exif, 0);
        }
        if has_interop {
            write_ifd(&mut out, &self.interop, 0);
        }
        if has_gps {
            write_ifd(&mut out, &self.gps, 0);
        }
        if has_ifd1 {
            write_ifd(&mut out, &self.ifd1, 0);
        }
        if let Some(thumb) = &self.thumbnail {
            out.extend_from_slice(thumb);
        }
        out
    }
}

/// A camera-like EXIF blob: make, resolution, capture date, a binary maker
/// note, GPS coordinates and an IFD1 thumbnail.
pub(crate) fn camera_exif() -> Vec<u8> {
    ExifBuilder {
        ifd0: vec![
            Entry::ascii(0x010F, "Canon"),
            Entry::ascii(0x0110, "EOS 5D"),
            Entry::rationals(0x011A, &[(72, 1)]),
            Entry::short(0x0112, 1),
        ],
        exif: vec![
            Entry::ascii(0x9003, "2024:05:01 10:30:00"),
            Entry::undefined(0x927C, &[0xFF, 0xFE, 0x00, 0x80, 0x81, 0x82, 0xC3, 0x28, 0xA0, 0xA1, 0xE2, 0x28]),
        ],
        gps: vec![
            Entry::ascii(0x0001, "N"),
            Entry::rationals(0x0002, &[(10, 1), (30, 1), (15, 100)]),
            Entry::ascii(0x0003, "E"),
            Entry::rationals(0x0004, &[(4, 1), (20, 1), (0, 0)]),
        ],
        interop: vec![Entry::ascii(0x0001, "R98")],
        ifd1: vec![Entry::short(0x0103, 6)],
        thumbnail: Some(vec![0xFF, 0xD8, 0xFF, 0xD9]),
    }
    .build()
}

pub(crate) fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
    }))
}

pub(crate) fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub(crate) fn jpeg_with_exif(exif: Vec<u8>) -> Vec<u8> {
    let plain = encode(&gradient(16, 16), ImageFormat::Jpeg);
    let mut jpeg = Jpeg::from_bytes(Bytes::from(plain)).unwrap();
    jpeg.set_exif(Some(Bytes::from(exif)));
    jpeg.encoder().bytes().to_vec()
}

pub(crate) fn png_with_exif(exif: Vec<u8>) -> Vec<u8> {
    let plain = encode(&gradient(16, 16), ImageFormat::Png);
    let mut png = Png::from_bytes(Bytes::from(plain)).unwrap();
    png.set_exif(Some(Bytes::from(exif)));
    png.encoder().bytes().to_vec()
}

pub(crate) fn webp_with_exif(exif: Vec<u8>) -> Vec<u8> {
    let plain = encode(&gradient(16, 16), ImageFormat::WebP);
    let mut webp = WebP::from_bytes(Bytes::from(plain)).unwrap();
    webp.set_exif(Some(Bytes::from(exif)));
    webp.encoder().bytes().to_vec()
}

/// A 4x4 RGB PNG written by the `png` encoder after `configure` has added
/// whatever ancillary chunks a test needs.
pub(crate) fn png_with(configure: impl FnOnce(&mut png::Encoder<&mut Vec<u8>>)) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 4, 4);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        configure(&mut encoder);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0x40; 4 * 4 * 3]).unwrap();
        writer.finish().unwrap();
    }
    out
}

/// A 4x4 RGB PNG carrying the given tEXt chunks (and zTXt ones, if any).
pub(crate) fn png_with_text(text: &[(&str, &str)], ztxt: &[(&str, &str)]) -> Vec<u8> {
    png_with(|encoder| {
        for (key, value) in text {
            encoder.add_text_chunk(key.to_string(), value.to_string()).unwrap();
        }
        for (key, value) in ztxt {
            encoder.add_ztxt_chunk(key.to_string(), value.to_string()).unwrap();
        }
    })
}

/// A plain PNG with one tEXt chunk placed after the image data, just
/// before IEND.
pub(crate) fn png_with_trailing_text(key: &str, value: &str) -> Vec<u8> {
    let plain = encode(&gradient(4, 4), ImageFormat::Png);
    let mut png = Png::from_bytes(Bytes::from(plain)).unwrap();

    let mut data = key.as_bytes().to_vec();
    data.push(0);
    data.extend_from_slice(value.as_bytes());

    let chunks = png.chunks_mut();
    let iend = chunks.len() - 1;
    chunks.insert(iend, PngChunk::new(*b"tEXt", Bytes::from(data)));
    png.encoder().bytes().to_vec()
}
