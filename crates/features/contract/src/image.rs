//! Signature images: decoded just far enough to embed them as PDF image objects.
//!
//! JPEG data is embedded as-is (`DCTDecode`), only its frame header is read. PNG data is
//! inflated, unfiltered and split into colour samples plus an optional soft mask, then
//! deflated again for `FlateDecode`. Only 8-bit, non-interlaced PNGs are accepted, which
//! is what browser canvases and image editors export.

use crate::error::{ContractError, ContractErrorExt};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest decoded image accepted, in pixels. Signature pads export far less.
const MAX_PIXELS: u64 = 4096 * 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace {
    pub(crate) const fn pdf_name(self) -> &'static str {
        match self {
            Self::Gray => "DeviceGray",
            Self::Rgb => "DeviceRGB",
            Self::Cmyk => "DeviceCMYK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Flate,
    Dct,
}

/// An image ready to be written into the PDF.
#[derive(Debug, Clone)]
pub struct SignatureImage {
    width: u32,
    height: u32,
    color: ColorSpace,
    encoding: Encoding,
    data: Vec<u8>,
    /// Deflated 8-bit alpha channel, absent when the image is fully opaque.
    alpha: Option<Vec<u8>>,
}

impl SignatureImage {
    /// Decodes a `data:image/png;base64,...` or `data:image/jpeg;base64,...` URL, as
    /// produced by the browser signature pad.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Image`] for other URL shapes or image formats and
    /// [`ContractError::Base64`] when the payload is not valid base64.
    pub fn from_data_url(url: &str) -> Result<Self, ContractError> {
        let rest = url.trim().strip_prefix("data:").ok_or_else(|| image_error("not a data URL"))?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| image_error("data URL has no payload"))?;

        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| image_error("data URL is not base64 encoded"))?;
        if !matches!(mime.to_ascii_lowercase().as_str(), "image/png" | "image/jpeg" | "image/jpg") {
            return Err(image_error(format!("unsupported media type {mime}")));
        }

        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact).context("signature data URL")?;
        Self::from_bytes(&bytes)
    }

    /// Decodes raw PNG or JPEG file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Image`] when the bytes are neither a supported PNG nor a
    /// JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContractError> {
        if bytes.starts_with(&PNG_SIGNATURE) {
            decode_png(bytes)
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            decode_jpeg(bytes)
        } else {
            Err(image_error("expected PNG or JPEG data"))
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn color_space(&self) -> ColorSpace {
        self.color
    }

    #[must_use]
    pub const fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    pub(crate) const fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }
}

fn image_error(message: impl Into<std::borrow::Cow<'static, str>>) -> ContractError {
    ContractError::Image { message: message.into(), context: None }
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let chunk = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let chunk = bytes.get(at..at.checked_add(2)?)?;
    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
}

// --- PNG ---

struct PngHeader {
    width: u32,
    height: u32,
    color_type: u8,
}

impl PngHeader {
    const fn channels(&self) -> usize {
        match self.color_type {
            2 => 3,
            4 => 2,
            6 => 4,
            _ => 1,
        }
    }
}

fn decode_png(bytes: &[u8]) -> Result<SignatureImage, ContractError> {
    let mut header = None;
    let mut palette: &[u8] = &[];
    let mut transparency: &[u8] = &[];
    let mut compressed = Vec::new();

    let mut pos = PNG_SIGNATURE.len();
    while pos < bytes.len() {
        let length = be_u32(bytes, pos).ok_or_else(|| image_error("truncated PNG chunk"))?;
        let start = pos + 8;
        let end = usize::try_from(length)
            .ok()
            .and_then(|len| start.checked_add(len))
            .filter(|end| end.saturating_add(4) <= bytes.len())
            .ok_or_else(|| image_error("truncated PNG chunk"))?;
        let kind = &bytes[pos + 4..start];
        let body = &bytes[start..end];

        match kind {
            b"IHDR" => header = Some(parse_ihdr(body)?),
            b"PLTE" => palette = body,
            b"tRNS" => transparency = body,
            b"IDAT" => compressed.extend_from_slice(body),
            b"IEND" => break,
            _ => {},
        }
        pos = end + 4;
    }

    let header = header.ok_or_else(|| image_error("PNG has no IHDR chunk"))?;
    if compressed.is_empty() {
        return Err(image_error("PNG has no image data"));
    }

    let width = usize::try_from(header.width).map_err(|_| image_error("PNG too large"))?;
    let height = usize::try_from(header.height).map_err(|_| image_error("PNG too large"))?;
    let channels = header.channels();
    let stride = width.checked_mul(channels).ok_or_else(|| image_error("PNG too large"))?;
    let expected = stride
        .checked_add(1)
        .and_then(|row| row.checked_mul(height))
        .ok_or_else(|| image_error("PNG too large"))?;

    let mut raw = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(u64::try_from(expected).unwrap_or(u64::MAX))
        .read_to_end(&mut raw)
        .context("PNG image data")?;
    if raw.len() < expected {
        return Err(image_error("PNG image data is truncated"));
    }

    let pixels = unfilter(&raw, stride, height, channels)?;
    let (color, samples, alpha) = split_channels(&header, &pixels, palette, transparency)?;

    let alpha = match alpha {
        Some(alpha) if alpha.iter().any(|&a| a != u8::MAX) => Some(deflate(&alpha)?),
        _ => None,
    };

    Ok(SignatureImage {
        width: header.width,
        height: header.height,
        color,
        encoding: Encoding::Flate,
        data: deflate(&samples)?,
        alpha,
    })
}

fn parse_ihdr(body: &[u8]) -> Result<PngHeader, ContractError> {
    if body.len() < 13 {
        return Err(image_error("PNG header is truncated"));
    }
    let width = be_u32(body, 0).unwrap_or_default();
    let height = be_u32(body, 4).unwrap_or_default();
    let (depth, color_type, interlace) = (body[8], body[9], body[12]);

    if width == 0 || height == 0 {
        return Err(image_error("PNG has no pixels"));
    }
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(image_error(format!("PNG of {width}x{height} pixels is too large")));
    }
    if depth != 8 {
        return Err(image_error(format!("PNG bit depth {depth} is not supported")));
    }
    if !matches!(color_type, 0 | 2 | 3 | 4 | 6) {
        return Err(image_error(format!("PNG colour type {color_type} is not supported")));
    }
    if interlace != 0 {
        return Err(image_error("interlaced PNG is not supported"));
    }

    Ok(PngHeader { width, height, color_type })
}

/// Reverses the per-scanline PNG filters.
#[allow(clippy::cast_possible_truncation)]
fn unfilter(raw: &[u8], stride: usize, height: usize, bpp: usize) -> Result<Vec<u8>, ContractError> {
    let mut out = vec![0_u8; stride * height];

    for row in 0..height {
        let line = &raw[row * (stride + 1)..(row + 1) * (stride + 1)];
        let (filter, src) = (line[0], &line[1..]);
        let (done, rest) = out.split_at_mut(row * stride);
        let prev = row.checked_sub(1).map(|p| &done[p * stride..]);
        let cur = &mut rest[..stride];

        for i in 0..stride {
            let a = if i >= bpp { cur[i - bpp] } else { 0 };
            let b = prev.map_or(0, |p| p[i]);
            let c = if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };
            cur[i] = match filter {
                0 => src[i],
                1 => src[i].wrapping_add(a),
                2 => src[i].wrapping_add(b),
                3 => src[i].wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8),
                4 => src[i].wrapping_add(paeth(a, b, c)),
                other => return Err(image_error(format!("unknown PNG filter {other}"))),
            };
        }
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

type Channels = (ColorSpace, Vec<u8>, Option<Vec<u8>>);

fn split_channels(
    header: &PngHeader,
    pixels: &[u8],
    palette: &[u8],
    transparency: &[u8],
) -> Result<Channels, ContractError> {
    match header.color_type {
        0 => Ok((ColorSpace::Gray, pixels.to_vec(), None)),
        2 => Ok((ColorSpace::Rgb, pixels.to_vec(), None)),
        3 => {
            if palette.is_empty() {
                return Err(image_error("indexed PNG has no palette"));
            }
            let mut rgb = Vec::with_capacity(pixels.len() * 3);
            let mut alpha = Vec::with_capacity(pixels.len());
            for &index in pixels {
                let i = usize::from(index);
                let entry = palette.get(i * 3..i * 3 + 3).ok_or_else(|| image_error("PNG palette index out of range"))?;
                rgb.extend_from_slice(entry);
                alpha.push(transparency.get(i).copied().unwrap_or(u8::MAX));
            }
            let alpha = (!transparency.is_empty()).then_some(alpha);
            Ok((ColorSpace::Rgb, rgb, alpha))
        },
        4 => {
            let (gray, alpha): (Vec<u8>, Vec<u8>) = pixels.chunks_exact(2).map(|px| (px[0], px[1])).unzip();
            Ok((ColorSpace::Gray, gray, Some(alpha)))
        },
        _ => {
            let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
            let mut alpha = Vec::with_capacity(pixels.len() / 4);
            for px in pixels.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
            Ok((ColorSpace::Rgb, rgb, Some(alpha)))
        },
    }
}

pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>, ContractError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).context("deflate")?;
    encoder.finish().context("deflate")
}

// --- JPEG ---

fn decode_jpeg(bytes: &[u8]) -> Result<SignatureImage, ContractError> {
    let mut pos = 2;

    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            return Err(image_error("malformed JPEG marker"));
        }
        let marker = bytes[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        if marker == 0xDA || marker == 0xD9 {
            break;
        }

        let length = usize::from(be_u16(bytes, pos + 2).ok_or_else(|| image_error("truncated JPEG"))?);
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let height = be_u16(bytes, pos + 5).ok_or_else(|| image_error("truncated JPEG"))?;
            let width = be_u16(bytes, pos + 7).ok_or_else(|| image_error("truncated JPEG"))?;
            let components = *bytes.get(pos + 9).ok_or_else(|| image_error("truncated JPEG"))?;
            let color = match components {
                1 => ColorSpace::Gray,
                3 => ColorSpace::Rgb,
                4 => ColorSpace::Cmyk,
                n => return Err(image_error(format!("JPEG with {n} components is not supported"))),
            };
            if width == 0 || height == 0 {
                return Err(image_error("JPEG has no pixels"));
            }

            return Ok(SignatureImage {
                width: u32::from(width),
                height: u32::from(height),
                color,
                encoding: Encoding::Dct,
                data: bytes.to_vec(),
                alpha: None,
            });
        }
        pos += 2 + length;
    }

    Err(image_error("JPEG has no frame header"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = u32::try_from(body.len()).unwrap().to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        // CRC is not checked by the decoder.
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    /// Builds a PNG with the given colour type from unfiltered rows.
    pub(crate) fn png(width: u32, height: u32, color_type: u8, rows: &[Vec<u8>], extra: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut ihdr = width.to_be_bytes().to_vec();
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

        let mut scanlines = Vec::new();
        for row in rows {
            scanlines.push(0);
            scanlines.extend_from_slice(row);
        }

        let mut out = PNG_SIGNATURE.to_vec();
        out.extend(chunk(b"IHDR", &ihdr));
        for (kind, body) in extra {
            out.extend(chunk(kind, body));
        }
        out.extend(chunk(b"IDAT", &deflate(&scanlines).unwrap()));
        out.extend(chunk(b"IEND", &[]));
        out
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn oversized_png_header_is_rejected() {
        let mut bytes = png(1, 1, 6, &[vec![0, 0, 0, 255]], &[]);
        // IHDR body starts after the signature, length and chunk type.
        bytes[16..20].copy_from_slice(&100_000_u32.to_be_bytes());
        bytes[20..24].copy_from_slice(&100_000_u32.to_be_bytes());

        let err = SignatureImage::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, ContractError::Image { .. }), "{err}");
        assert!(err.to_string().contains("too large"), "{err}");
    }

    #[test]
    fn truncated_image_data_is_rejected() {
        let mut bytes = png(1, 1, 6, &[vec![0, 0, 0, 255]], &[]);
        bytes[16..20].copy_from_slice(&64_u32.to_be_bytes());
        bytes[20..24].copy_from_slice(&64_u32.to_be_bytes());

        let err = SignatureImage::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }

    #[test]
    fn rgba_png_splits_alpha() {
        let bytes = png(2, 1, 6, &[vec![255, 0, 0, 255, 0, 0, 255, 0]], &[]);
        let image = SignatureImage::from_bytes(&bytes).unwrap();

        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.color_space(), ColorSpace::Rgb);
        assert_eq!(inflate(image.data()), vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(inflate(image.alpha().unwrap()), vec![255, 0]);
    }

    #[test]
    fn opaque_alpha_is_dropped() {
        let bytes = png(1, 1, 4, &[vec![17, 255]], &[]);
        let image = SignatureImage::from_bytes(&bytes).unwrap();
        assert_eq!(image.color_space(), ColorSpace::Gray);
        assert!(!image.has_alpha());
    }

    #[test]
    fn palette_png_expands_with_transparency() {
        let palette = vec![0, 0, 0, 255, 255, 255];
        let bytes = png(2, 1, 3, &[vec![1, 0]], &[(b"PLTE", palette), (b"tRNS", vec![255, 0])]);
        let image = SignatureImage::from_bytes(&bytes).unwrap();

        assert_eq!(inflate(image.data()), vec![255, 255, 255, 0, 0, 0]);
        assert_eq!(inflate(image.alpha().unwrap()), vec![0, 255]);
    }

    #[test]
    fn filters_are_reversed() {
        // Two gray rows: Sub filter then Up filter.
        let raw = [1, 10, 5, 2, 1, 1];
        let out = unfilter(&raw, 2, 2, 1).unwrap();
        assert_eq!(out, vec![10, 15, 11, 16]);
    }

    #[test]
    fn jpeg_frame_header_is_read() {
        let bytes = [
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x20, 0x00, 0x40, 0x03, 0, 0, 0, // SOF0 64x32
            0xFF, 0xD9,
        ];
        let image = SignatureImage::from_bytes(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (64, 32));
        assert_eq!(image.color_space(), ColorSpace::Rgb);
        assert_eq!(image.encoding(), Encoding::Dct);
        assert_eq!(image.data(), &bytes);
    }

    #[test]
    fn data_urls_are_decoded() {
        let bytes = png(1, 1, 0, &[vec![0]], &[]);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        assert!(SignatureImage::from_data_url(&url).is_ok());

        let err = SignatureImage::from_data_url("data:image/gif;base64,R0lGOD").unwrap_err();
        assert_eq!(err.status_code(), 400);
        let err = SignatureImage::from_data_url("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, ContractError::Base64 { .. }));
        assert!(SignatureImage::from_data_url("hello").is_err());
    }
}
