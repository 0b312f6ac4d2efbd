/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! `GL_FIXED` to `GL_FLOAT` conversion of vertex attribute arrays.
//!
//! Desktop GL has no fixed-point vertex type. Client arrays are converted
//! into fresh float arrays owned by a [ConversionArena] for one draw call;
//! arrays in buffer objects are converted in place (see
//! [super::pointer::GLESBuffer]). Converted element `i` is always at index
//! `i` of the output, so the draw's `first` and indices work unchanged.

use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::pointer::{Range, RangeList};
use super::util::fixed_to_float;

/// Element indices of a `glDrawElements` call, in guest memory layout.
#[derive(Copy, Clone)]
pub struct Indices<'a> {
    type_: GLenum,
    bytes: &'a [u8],
}

impl<'a> Indices<'a> {
    /// Returns [None] for types other than `GL_UNSIGNED_BYTE`,
    /// `GL_UNSIGNED_SHORT` and `GL_UNSIGNED_INT`.
    pub fn new(type_: GLenum, bytes: &'a [u8]) -> Option<Self> {
        Self::size_of(type_)?;
        Some(Indices { type_, bytes })
    }

    pub fn size_of(type_: GLenum) -> Option<usize> {
        match type_ {
            gles20::UNSIGNED_BYTE => Some(1),
            gles20::UNSIGNED_SHORT => Some(2),
            gles20::UNSIGNED_INT => Some(4),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / Self::size_of(self.type_).unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> u32 {
        let b = self.bytes;
        match self.type_ {
            gles20::UNSIGNED_BYTE => u32::from(b[i]),
            gles20::UNSIGNED_SHORT => u32::from(u16::from_ne_bytes([b[i * 2], b[i * 2 + 1]])),
            _ => u32::from_ne_bytes([b[i * 4], b[i * 4 + 1], b[i * 4 + 2], b[i * 4 + 3]]),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn max_index(&self) -> u32 {
        self.iter().max().unwrap_or(0)
    }
}

fn read_fixed(data: &[u8], offset: usize) -> Option<GLfixed> {
    let bytes = data.get(offset..offset + 4)?;
    Some(GLfixed::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Convert elements `first..first + count` of a client array. Components
/// that fall outside `data` are left as zero.
pub fn convert_fixed_direct(
    data: &[u8],
    stride: usize,
    attrib_size: usize,
    first: usize,
    count: usize,
) -> Vec<GLfloat> {
    let mut out = vec![0.0; (first + count) * attrib_size];
    for element in first..first + count {
        for j in 0..attrib_size {
            if let Some(fixed) = read_fixed(data, element * stride + j * 4) {
                out[element * attrib_size + j] = fixed_to_float(fixed);
            }
        }
    }
    out
}

/// Convert the elements of a client array referenced by `indices`.
pub fn convert_fixed_indirect(
    data: &[u8],
    stride: usize,
    attrib_size: usize,
    indices: &Indices,
) -> Vec<GLfloat> {
    let elements = indices.max_index() as usize + 1;
    let mut out = vec![0.0; elements * attrib_size];
    for index in indices.iter() {
        let index = index as usize;
        for j in 0..attrib_size {
            if let Some(fixed) = read_fixed(data, index * stride + j * 4) {
                out[index * attrib_size + j] = fixed_to_float(fixed);
            }
        }
    }
    out
}

/// Rewrite the given elements of buffer data from fixed to float. The layout
/// is unchanged since both types are 4 bytes wide.
pub fn convert_fixed_in_place(data: &mut [u8], stride: usize, attrib_size: usize, elements: &[u32]) {
    for &element in elements {
        for j in 0..attrib_size {
            let offset = element as usize * stride + j * 4;
            if let Some(fixed) = read_fixed(data, offset) {
                data[offset..offset + 4].copy_from_slice(&fixed_to_float(fixed).to_ne_bytes());
            }
        }
    }
}

/// Buffer byte ranges touched by a `glDrawArrays(first, count)` on an array
/// at `offset` with the given attribute size and stride (0 for packed).
pub fn direct_to_byte_ranges(
    first: usize,
    count: usize,
    attrib_size: usize,
    stride: usize,
    offset: usize,
) -> RangeList {
    let attrib_bytes = attrib_size * 4;
    let mut list = RangeList::default();
    if stride == 0 {
        list.add_range(Range::new(offset + first * attrib_bytes, count * attrib_bytes));
    } else {
        let mut start = offset + first * stride;
        for _ in 0..count {
            list.add_range(Range::new(start, attrib_bytes));
            start += stride;
        }
    }
    list
}

/// Buffer byte ranges touched by a `glDrawElements` with `indices`.
pub fn indirect_to_byte_ranges(
    indices: &Indices,
    attrib_size: usize,
    stride: usize,
    offset: usize,
) -> RangeList {
    let attrib_bytes = attrib_size * 4;
    let stride = if stride != 0 { stride } else { attrib_bytes };
    let mut list = RangeList::default();
    for index in indices.iter() {
        list.add_range(Range::new(offset + index as usize * stride, attrib_bytes));
    }
    list
}

/// Inverse of the above: which elements do the byte ranges cover.
pub fn byte_ranges_to_indices(
    ranges: &RangeList,
    attrib_size: usize,
    stride: usize,
    offset: usize,
) -> Vec<u32> {
    let attrib_bytes = attrib_size * 4;
    let stride = if stride != 0 { stride } else { attrib_bytes };
    let mut indices = Vec::new();
    if attrib_bytes == 0 {
        return indices;
    }
    for range in ranges.iter() {
        let start = (range.start.saturating_sub(offset) / stride) as u32;
        let elements = range.size / attrib_bytes;
        indices.extend((0..elements as u32).map(|i| start + i));
    }
    indices
}

/// Float arrays made for one draw call. The host reads them during the draw,
/// so the arena must outlive it.
#[derive(Default)]
pub struct ConversionArena {
    arrays: Vec<Vec<GLfloat>>,
}

impl ConversionArena {
    /// Keep `array` alive and return a pointer to its data. The pointer stays
    /// valid until the arena is dropped.
    pub fn push(&mut self, array: Vec<GLfloat>) -> *const GLfloat {
        self.arrays.push(array);
        self.arrays.last().map_or(std::ptr::null(), |a| a.as_ptr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_bytes(values: &[GLfixed]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn direct_packed() {
        let data = fixed_bytes(&[0x10000, 0x8000]);
        assert_eq!(convert_fixed_direct(&data, 8, 2, 0, 1), vec![1.0, 0.5]);
    }

    #[test]
    fn direct_keeps_element_positions() {
        let data = fixed_bytes(&[0x10000, 0x20000, 0x30000]);
        assert_eq!(
            convert_fixed_direct(&data, 4, 1, 1, 2),
            vec![0.0, 2.0, 3.0]
        );
    }

    #[test]
    fn direct_strided() {
        // size 1, stride 8: every other value is padding
        let data = fixed_bytes(&[0x10000, 0x7fff_ffff, -0x10000, 0x7fff_ffff]);
        assert_eq!(convert_fixed_direct(&data, 8, 1, 0, 2), vec![1.0, -1.0]);
    }

    #[test]
    fn indirect_converts_referenced_elements() {
        let data = fixed_bytes(&[0x10000, 0x20000, 0x30000, 0x40000]);
        let index_bytes: Vec<u8> = [3u16, 1].iter().flat_map(|i| i.to_ne_bytes()).collect();
        let indices = Indices::new(gles20::UNSIGNED_SHORT, &index_bytes).unwrap();
        assert_eq!(indices.len(), 2);
        assert_eq!(indices.max_index(), 3);
        assert_eq!(
            convert_fixed_indirect(&data, 4, 1, &indices),
            vec![0.0, 2.0, 0.0, 4.0]
        );
    }

    #[test]
    fn index_types() {
        assert!(Indices::new(gles20::FLOAT, &[]).is_none());
        let bytes = 70000u32.to_ne_bytes();
        let indices = Indices::new(gles20::UNSIGNED_INT, &bytes).unwrap();
        assert_eq!(indices.get(0), 70000);
        let indices = Indices::new(gles20::UNSIGNED_BYTE, &bytes).unwrap();
        assert_eq!(indices.len(), 4);
        assert!(Indices::new(gles20::UNSIGNED_BYTE, &[]).unwrap().is_empty());
    }

    #[test]
    fn in_place() {
        let mut data = fixed_bytes(&[0x10000, 0x8000, 0x20000, 0x4000]);
        convert_fixed_in_place(&mut data, 8, 2, &[1, 7]);
        assert_eq!(&data[..8], &fixed_bytes(&[0x10000, 0x8000])[..]);
        assert_eq!(f32::from_ne_bytes(data[8..12].try_into().unwrap()), 2.0);
        assert_eq!(f32::from_ne_bytes(data[12..16].try_into().unwrap()), 0.25);
    }

    #[test]
    fn byte_ranges() {
        let packed = direct_to_byte_ranges(2, 3, 2, 0, 16);
        assert_eq!(packed.iter().copied().collect::<Vec<_>>(), vec![Range::new(32, 24)]);
        assert_eq!(byte_ranges_to_indices(&packed, 2, 0, 16), vec![2, 3, 4]);

        let strided = direct_to_byte_ranges(1, 2, 1, 12, 0);
        assert_eq!(
            strided.iter().copied().collect::<Vec<_>>(),
            vec![Range::new(12, 4), Range::new(24, 4)]
        );
        assert_eq!(byte_ranges_to_indices(&strided, 1, 12, 0), vec![1, 2]);

        let index_bytes = [4u8, 0];
        let indices = Indices::new(gles20::UNSIGNED_BYTE, &index_bytes).unwrap();
        let indirect = indirect_to_byte_ranges(&indices, 3, 0, 8);
        assert_eq!(
            indirect.iter().copied().collect::<Vec<_>>(),
            vec![Range::new(56, 12), Range::new(8, 12)]
        );
    }

    #[test]
    fn arena_pointers_stay_valid() {
        let mut arena = ConversionArena::default();
        let first = arena.push(vec![1.0, 0.5]);
        for _ in 0..32 {
            arena.push(vec![0.0; 4]);
        }
        assert_eq!(arena.arrays.len(), 33);
        assert_eq!(unsafe { *first.add(1) }, 0.5);
    }
}
