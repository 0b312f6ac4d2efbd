/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Shared utilities: fixed-point conversion and CPU-side decoding of the
//! compressed texture formats the host can't take directly.

use super::gles20_raw as gles20; // constants only
use super::gles20_raw::types::{GLenum, GLfixed, GLfloat, GLint, GLsizei};

/// Convert a fixed-point scalar to a floating-point scalar.
///
/// Beware: Rust's type checker won't complain if you mix up [GLfixed] with
/// [GLint], but they have very different meanings.
pub fn fixed_to_float(fixed: GLfixed) -> GLfloat {
    ((fixed as f64) / ((1 << 16) as f64)) as f32
}

/// Everything `glGetIntegerv(GL_COMPRESSED_TEXTURE_FORMATS)` reports.
pub const COMPRESSED_TEXTURE_FORMATS: &[GLenum] = &[
    gles20::PALETTE4_RGBA8_OES,
    gles20::PALETTE4_RGBA4_OES,
    gles20::PALETTE8_RGBA8_OES,
    gles20::PALETTE8_RGBA4_OES,
    gles20::PALETTE4_RGB8_OES,
    gles20::PALETTE8_RGB8_OES,
    gles20::PALETTE4_RGB5_A1_OES,
    gles20::PALETTE8_RGB5_A1_OES,
    gles20::PALETTE4_R5_G6_B5_OES,
    gles20::PALETTE8_R5_G6_B5_OES,
    gles20::ETC1_RGB8_OES,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PaletteEntry {
    Rgb8,
    Rgba8,
    R5G6B5,
    Rgba4,
    Rgb5A1,
}

impl PaletteEntry {
    fn size(self) -> usize {
        match self {
            PaletteEntry::Rgb8 => 3,
            PaletteEntry::Rgba8 => 4,
            _ => 2,
        }
    }

    fn has_alpha(self) -> bool {
        !matches!(self, PaletteEntry::Rgb8 | PaletteEntry::R5G6B5)
    }

    /// Expand one palette entry to 8-bit RGBA.
    fn read(self, entry: &[u8]) -> [u8; 4] {
        let expand = |value: u16, max: u16| (u32::from(value) * 255 / u32::from(max)) as u8;
        match self {
            PaletteEntry::Rgb8 => [entry[0], entry[1], entry[2], 255],
            PaletteEntry::Rgba8 => [entry[0], entry[1], entry[2], entry[3]],
            PaletteEntry::R5G6B5 => {
                let s = u16::from_le_bytes([entry[0], entry[1]]);
                [
                    expand(s >> 11, 31),
                    expand((s >> 5) & 0x3f, 63),
                    expand(s & 0x1f, 31),
                    255,
                ]
            }
            PaletteEntry::Rgba4 => {
                let s = u16::from_le_bytes([entry[0], entry[1]]);
                [
                    expand((s >> 12) & 0xf, 15),
                    expand((s >> 8) & 0xf, 15),
                    expand((s >> 4) & 0xf, 15),
                    expand(s & 0xf, 15),
                ]
            }
            PaletteEntry::Rgb5A1 => {
                let s = u16::from_le_bytes([entry[0], entry[1]]);
                [
                    expand((s >> 11) & 0x1f, 31),
                    expand((s >> 6) & 0x1f, 31),
                    expand((s >> 1) & 0x1f, 31),
                    (s & 1) as u8 * 255,
                ]
            }
        }
    }
}

pub struct PalettedTextureFormat {
    /// * `true` for 4-bit (nibble) index, 16-color palette.
    /// * `false` for 8-bit (byte) index, 256-color palette.
    pub index_is_nibble: bool,
    entry: PaletteEntry,
}
impl PalettedTextureFormat {
    /// If the provided format is from `OES_compressed_paletted_texture`,
    /// return [Some] with information about it, or [None] otherwise.
    pub fn get_info(internalformat: GLenum) -> Option<Self> {
        let (index_is_nibble, entry) = match internalformat {
            gles20::PALETTE4_RGB8_OES => (true, PaletteEntry::Rgb8),
            gles20::PALETTE4_RGBA8_OES => (true, PaletteEntry::Rgba8),
            gles20::PALETTE4_R5_G6_B5_OES => (true, PaletteEntry::R5G6B5),
            gles20::PALETTE4_RGBA4_OES => (true, PaletteEntry::Rgba4),
            gles20::PALETTE4_RGB5_A1_OES => (true, PaletteEntry::Rgb5A1),
            gles20::PALETTE8_RGB8_OES => (false, PaletteEntry::Rgb8),
            gles20::PALETTE8_RGBA8_OES => (false, PaletteEntry::Rgba8),
            gles20::PALETTE8_R5_G6_B5_OES => (false, PaletteEntry::R5G6B5),
            gles20::PALETTE8_RGBA4_OES => (false, PaletteEntry::Rgba4),
            gles20::PALETTE8_RGB5_A1_OES => (false, PaletteEntry::Rgb5A1),
            _ => return None,
        };
        Some(Self {
            index_is_nibble,
            entry,
        })
    }

    /// `glTexImage2D`-style format of the decoded pixels: `GL_RGB` or
    /// `GL_RGBA`, always with `GL_UNSIGNED_BYTE` components.
    pub fn decoded_format(&self) -> GLenum {
        if self.entry.has_alpha() {
            gles20::RGBA
        } else {
            gles20::RGB
        }
    }

    fn palette_size(&self) -> usize {
        let colors = if self.index_is_nibble { 16 } else { 256 };
        colors * self.entry.size()
    }

    /// Decode mip level `level` of the image. `width` and `height` are the
    /// dimensions of level 0. Indices missing from the end of `data` leave
    /// their pixels zeroed. Returns [None] if the palette itself is
    /// truncated.
    pub fn decode(&self, data: &[u8], width: GLsizei, height: GLsizei, level: GLint) -> Option<Vec<u8>> {
        let palette_size = self.palette_size();
        if data.len() < palette_size {
            return None;
        }
        let (palette, mut indices) = data.split_at(palette_size);
        let index_bits = if self.index_is_nibble { 4 } else { 8 };

        let mut width = width.max(0) as usize;
        let mut height = height.max(0) as usize;
        for _ in 0..level {
            let skip = (width * height * index_bits) / 8;
            indices = &indices[skip.min(indices.len())..];
            width >>= 1;
            height >>= 1;
        }

        let out_components = if self.entry.has_alpha() { 4 } else { 3 };
        let pixel_count = width * height;
        let mut pixels = vec![0u8; pixel_count * out_components];
        let available = (indices.len() * 8) / index_bits;

        for i in 0..pixel_count.min(available) {
            let index = if self.index_is_nibble {
                let byte = indices[i / 2];
                if i % 2 == 0 {
                    byte >> 4
                } else {
                    byte & 0xf
                }
            } else {
                indices[i]
            };
            let offset = usize::from(index) * self.entry.size();
            let color = self.entry.read(&palette[offset..offset + self.entry.size()]);
            pixels[i * out_components..(i + 1) * out_components]
                .copy_from_slice(&color[..out_components]);
        }
        Some(pixels)
    }
}

/// Size in bytes of an ETC1-compressed image of the given dimensions.
pub fn etc1_encoded_size(width: GLsizei, height: GLsizei) -> usize {
    let width = width.max(0) as usize;
    let height = height.max(0) as usize;
    ((width + 3) / 4) * ((height + 3) / 4) * 8
}

const ETC1_MODIFIERS: [[i32; 2]; 8] = [
    [2, 8],
    [5, 17],
    [9, 29],
    [13, 42],
    [18, 60],
    [24, 80],
    [33, 106],
    [47, 183],
];

fn etc1_decode_block(block: u64, out: &mut [[u8; 3]; 16]) {
    let diff = block & (1 << 33) != 0;
    let flip = block & (1 << 32) != 0;
    let channel = |shift: u32| ((block >> shift) & 0xff) as i32;

    let (base1, base2): ([i32; 3], [i32; 3]) = if diff {
        let mut b1 = [0; 3];
        let mut b2 = [0; 3];
        for (c, shift) in [56u32, 48, 40].into_iter().enumerate() {
            let byte = channel(shift);
            let value = byte >> 3;
            // 3-bit two's complement
            let delta = match byte & 0x7 {
                d if d >= 4 => d - 8,
                d => d,
            };
            let second = value + delta;
            b1[c] = (value << 3) | (value >> 2);
            b2[c] = ((second << 3) | (second >> 2)) & 0xff;
        }
        (b1, b2)
    } else {
        let mut b1 = [0; 3];
        let mut b2 = [0; 3];
        for (c, shift) in [56u32, 48, 40].into_iter().enumerate() {
            let byte = channel(shift);
            b1[c] = (byte >> 4) * 17;
            b2[c] = (byte & 0xf) * 17;
        }
        (b1, b2)
    };

    let table1 = ETC1_MODIFIERS[((block >> 37) & 7) as usize];
    let table2 = ETC1_MODIFIERS[((block >> 34) & 7) as usize];

    for x in 0..4 {
        for y in 0..4 {
            let i = x * 4 + y;
            let first_subblock = if flip { y < 2 } else { x < 2 };
            let (base, table) = if first_subblock {
                (base1, table1)
            } else {
                (base2, table2)
            };
            let msb = (block >> (16 + i)) & 1;
            let lsb = (block >> i) & 1;
            let modifier = match (msb << 1) | lsb {
                0 => table[0],
                1 => table[1],
                2 => -table[0],
                _ => -table[1],
            };
            let pixel = &mut out[y * 4 + x];
            for c in 0..3 {
                pixel[c] = (base[c] + modifier).clamp(0, 255) as u8;
            }
        }
    }
}

/// Decode an ETC1 image to tightly packed RGB rows, each `stride` bytes
/// long. Returns [None] if `data` is too short.
pub fn etc1_decode_image(data: &[u8], width: GLsizei, height: GLsizei, stride: usize) -> Option<Vec<u8>> {
    if data.len() < etc1_encoded_size(width, height) {
        return None;
    }
    let width = width.max(0) as usize;
    let height = height.max(0) as usize;
    assert!(stride >= width * 3);

    let mut pixels = vec![0u8; stride * height];
    let mut blocks = data.chunks_exact(8);
    let mut decoded = [[0u8; 3]; 16];
    for block_y in (0..height).step_by(4) {
        for block_x in (0..width).step_by(4) {
            let block = u64::from_be_bytes(blocks.next()?.try_into().ok()?);
            etc1_decode_block(block, &mut decoded);
            for y in 0..4.min(height - block_y) {
                let row = (block_y + y) * stride;
                for x in 0..4.min(width - block_x) {
                    let offset = row + (block_x + x) * 3;
                    pixels[offset..offset + 3].copy_from_slice(&decoded[y * 4 + x]);
                }
            }
        }
    }
    Some(pixels)
}

/// Row pitch of a `GL_RGB`/`GL_UNSIGNED_BYTE` image under `alignment`.
pub fn aligned_rgb_pitch(width: GLsizei, alignment: GLint) -> usize {
    let align = alignment.max(1) as usize - 1;
    ((width.max(0) as usize * 3) + align) & !align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point() {
        assert_eq!(fixed_to_float(0x10000), 1.0);
        assert_eq!(fixed_to_float(0x8000), 0.5);
        assert_eq!(fixed_to_float(-0x18000), -1.5);
    }

    #[test]
    fn palette4_rgb8() {
        let format = PalettedTextureFormat::get_info(gles20::PALETTE4_RGB8_OES).unwrap();
        assert_eq!(format.decoded_format(), gles20::RGB);
        let mut data = vec![0u8; 16 * 3];
        data[3..6].copy_from_slice(&[10, 20, 30]);
        data[6..9].copy_from_slice(&[40, 50, 60]);
        // 2x1 image: indices 1 and 2
        data.push(0x12);
        let pixels = format.decode(&data, 2, 1, 0).unwrap();
        assert_eq!(pixels, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn palette8_rgba4_second_level() {
        let format = PalettedTextureFormat::get_info(gles20::PALETTE8_RGBA4_OES).unwrap();
        assert_eq!(format.decoded_format(), gles20::RGBA);
        let mut data = vec![0u8; 256 * 2];
        data[2..4].copy_from_slice(&0xf00fu16.to_le_bytes());
        // 2x2 level 0, then the 1x1 level 1 uses index 1
        data.extend_from_slice(&[0, 0, 0, 0, 1]);
        let pixels = format.decode(&data, 2, 2, 1).unwrap();
        assert_eq!(pixels, vec![255, 0, 0, 255]);
    }

    #[test]
    fn palette_short_indices() {
        let format = PalettedTextureFormat::get_info(gles20::PALETTE8_R5_G6_B5_OES).unwrap();
        let mut data = vec![0u8; 256 * 2];
        data[0..2].copy_from_slice(&0xffffu16.to_le_bytes());
        data.push(0);
        let pixels = format.decode(&data, 2, 1, 0).unwrap();
        assert_eq!(pixels, vec![255, 255, 255, 0, 0, 0]);
        assert!(format.decode(&data[..10], 2, 1, 0).is_none());
    }

    #[test]
    fn not_paletted() {
        assert!(PalettedTextureFormat::get_info(gles20::ETC1_RGB8_OES).is_none());
    }

    #[test]
    fn etc1_sizes() {
        assert_eq!(etc1_encoded_size(4, 4), 8);
        assert_eq!(etc1_encoded_size(5, 4), 16);
        assert_eq!(etc1_encoded_size(1, 1), 8);
        assert_eq!(etc1_encoded_size(0, 8), 0);
    }

    #[test]
    fn etc1_individual_mode() {
        // Base colors 0x8 and 0x4 per channel, table 0, flip off, all pixel
        // indices 0 (+2).
        let block: u64 = (0x84 << 56) | (0x84 << 48) | (0x84 << 40);
        let pixels = etc1_decode_image(&block.to_be_bytes(), 4, 4, 12).unwrap();
        // left half (x < 2) uses the first base color
        assert_eq!(&pixels[0..3], &[138, 138, 138]);
        assert_eq!(&pixels[3..6], &[138, 138, 138]);
        assert_eq!(&pixels[6..9], &[70, 70, 70]);
        assert_eq!(&pixels[45..48], &[70, 70, 70]);
    }

    #[test]
    fn etc1_differential_mode_with_flip() {
        // Base 0x10 (5-bit) with delta -1, diff and flip bits set, every
        // pixel index 3 (-8).
        let channel: u64 = (0x10 << 3) | 0x7;
        let block: u64 = (channel << 56)
            | (channel << 48)
            | (channel << 40)
            | (1 << 33)
            | (1 << 32)
            | 0xffff_ffff;
        let pixels = etc1_decode_image(&block.to_be_bytes(), 4, 4, 12).unwrap();
        // top half (y < 2): (0x10 << 3) | (0x10 >> 2) = 132
        assert_eq!(&pixels[0..3], &[124, 124, 124]);
        // bottom half: 0x0f -> 123
        assert_eq!(&pixels[24..27], &[115, 115, 115]);
    }

    #[test]
    fn etc1_partial_block_and_padding() {
        let pixels = etc1_decode_image(&[0u8; 8], 3, 2, aligned_rgb_pitch(3, 4)).unwrap();
        assert_eq!(pixels.len(), 24);
        assert!(etc1_decode_image(&[0u8; 7], 3, 2, 12).is_none());
    }

    #[test]
    fn rgb_pitch() {
        assert_eq!(aligned_rgb_pitch(3, 4), 12);
        assert_eq!(aligned_rgb_pitch(5, 4), 16);
        assert_eq!(aligned_rgb_pitch(5, 1), 15);
    }
}
