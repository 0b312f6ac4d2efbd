/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Vertex attribute pointers and the client-side buffer objects behind them.
//!
//! Buffer objects never reach the host: the data lives here, and draws pass
//! the host a client pointer into it. This lets `GL_FIXED` data in a buffer
//! be rewritten as `GL_FLOAT` in place, which is tracked per byte range so
//! that each range is only converted once per upload.

use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::object_names::ObjectLocalName;
use std::ffi::c_void;

/// Half-open byte range `start..start + size`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub size: usize,
}

impl Range {
    pub fn new(start: usize, size: usize) -> Range {
        Range { start, size }
    }

    pub fn end(&self) -> usize {
        self.start + self.size
    }

    fn intersection(&self, other: &Range) -> Option<Range> {
        if self.start > other.end() || other.start > self.end() {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        (end > start).then(|| Range::new(start, end - start))
    }

    /// Union of overlapping or touching ranges.
    fn union(&self, other: &Range) -> Option<Range> {
        if self.start > other.end() || other.start > self.end() {
            return None;
        }
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        (end > start).then(|| Range::new(start, end - start))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeList {
    list: Vec<Range>,
}

impl RangeList {
    /// Empty ranges are dropped.
    pub fn add_range(&mut self, range: Range) {
        if range.size != 0 {
            self.list.push(range);
        }
    }

    /// Remove `range` from every range in the list, splitting where needed.
    /// The parts that were removed are added to `deleted`.
    pub fn del_range(&mut self, range: Range, deleted: &mut RangeList) {
        if range.size == 0 {
            return;
        }
        let mut kept = Vec::with_capacity(self.list.len() + 1);
        for old in self.list.drain(..) {
            let Some(intersection) = range.intersection(&old) else {
                kept.push(old);
                continue;
            };
            if intersection != old {
                if old.start != intersection.start {
                    kept.push(Range::new(old.start, intersection.start - old.start));
                }
                if old.end() != intersection.end() {
                    kept.push(Range::new(
                        intersection.end(),
                        old.end() - intersection.end(),
                    ));
                }
            }
            deleted.add_range(intersection);
        }
        self.list = kept;
    }

    pub fn del_ranges(&mut self, ranges: &RangeList, deleted: &mut RangeList) {
        for &range in &ranges.list {
            self.del_range(range, deleted);
        }
    }

    /// Combine overlapping and adjacent ranges until none remain.
    pub fn merge(&mut self) {
        'restart: loop {
            for i in 0..self.list.len() {
                for j in (i + 1)..self.list.len() {
                    if let Some(union) = self.list[i].union(&self.list[j]) {
                        self.list[i] = union;
                        self.list.remove(j);
                        continue 'restart;
                    }
                }
            }
            break;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn clear(&mut self) {
        self.list.clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Range> {
        self.list.iter()
    }
}

/// A buffer object's storage.
pub struct GLESBuffer {
    usage: GLenum,
    data: Vec<u8>,
    pub was_bound: bool,
    /// Byte ranges that may hold `GL_FIXED` data not yet converted.
    pending_conversion: RangeList,
}

impl Default for GLESBuffer {
    fn default() -> Self {
        GLESBuffer {
            usage: gles20::STATIC_DRAW,
            data: Vec::new(),
            was_bound: false,
            pending_conversion: RangeList::default(),
        }
    }
}

impl GLESBuffer {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn usage(&self) -> GLenum {
        self.usage
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// `glBufferData`. A missing `data` leaves the contents zeroed.
    pub fn set_buffer(&mut self, size: usize, usage: GLenum, data: Option<&[u8]>) {
        self.usage = usage;
        self.data = match data {
            Some(data) => data[..size].to_vec(),
            None => vec![0; size],
        };
        self.pending_conversion.clear();
        self.pending_conversion.add_range(Range::new(0, size));
    }

    /// `glBufferSubData`. Returns `false` if the range is out of bounds.
    pub fn set_sub_buffer(&mut self, offset: usize, data: &[u8]) -> bool {
        let Some(end) = offset.checked_add(data.len()) else {
            return false;
        };
        if end > self.data.len() {
            return false;
        }
        self.data[offset..end].copy_from_slice(data);
        self.pending_conversion
            .add_range(Range::new(offset, data.len()));
        self.pending_conversion.merge();
        true
    }

    pub fn needs_conversion(&self) -> bool {
        !self.pending_conversion.is_empty()
    }

    /// Take the parts of `ranges` that still need converting. They are
    /// considered converted once this returns.
    pub fn get_conversions(&mut self, ranges: &RangeList) -> RangeList {
        let mut conversions = RangeList::default();
        self.pending_conversion.del_ranges(ranges, &mut conversions);
        conversions.merge();
        conversions
    }
}

/// State of one generic vertex attribute array.
#[derive(Debug, Clone)]
pub struct GLESPointer {
    pub size: GLint,
    pub type_: GLenum,
    pub stride: GLsizei,
    pub enabled: bool,
    pub normalized: bool,
    /// Client memory pointer, when not sourced from a buffer.
    pub data: *const c_void,
    /// Buffer object the array is sourced from, 0 if none.
    pub buffer: ObjectLocalName,
    pub buffer_offset: usize,
}

impl Default for GLESPointer {
    fn default() -> Self {
        GLESPointer {
            size: 4,
            type_: gles20::FLOAT,
            stride: 0,
            enabled: false,
            normalized: false,
            data: std::ptr::null(),
            buffer: 0,
            buffer_offset: 0,
        }
    }
}

impl GLESPointer {
    pub fn set_array(
        &mut self,
        size: GLint,
        type_: GLenum,
        stride: GLsizei,
        data: *const c_void,
        normalized: bool,
    ) {
        self.size = size;
        self.type_ = type_;
        self.stride = stride;
        self.data = data;
        self.buffer = 0;
        self.buffer_offset = 0;
        self.normalized = normalized;
    }

    pub fn set_buffer(
        &mut self,
        size: GLint,
        type_: GLenum,
        stride: GLsizei,
        buffer: ObjectLocalName,
        offset: usize,
        normalized: bool,
    ) {
        self.size = size;
        self.type_ = type_;
        self.stride = stride;
        self.data = std::ptr::null();
        self.buffer = buffer;
        self.buffer_offset = offset;
        self.normalized = normalized;
    }

    pub fn is_vbo(&self) -> bool {
        self.buffer != 0
    }

    /// Stride in bytes with the tightly-packed default filled in, for
    /// 4-byte components.
    pub fn effective_stride(&self) -> usize {
        if self.stride != 0 {
            self.stride as usize
        } else {
            self.size.max(0) as usize * 4
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(list: &RangeList) -> Vec<(usize, usize)> {
        let mut v: Vec<_> = list.iter().map(|r| (r.start, r.size)).collect();
        v.sort();
        v
    }

    #[test]
    fn empty_ranges_ignored() {
        let mut list = RangeList::default();
        list.add_range(Range::new(5, 0));
        assert!(list.is_empty());
    }

    #[test]
    fn del_range_splits() {
        let mut list = RangeList::default();
        list.add_range(Range::new(0, 100));
        let mut deleted = RangeList::default();
        list.del_range(Range::new(40, 20), &mut deleted);
        assert_eq!(ranges(&list), vec![(0, 40), (60, 40)]);
        assert_eq!(ranges(&deleted), vec![(40, 20)]);
    }

    #[test]
    fn del_range_whole_and_outside() {
        let mut list = RangeList::default();
        list.add_range(Range::new(10, 10));
        list.add_range(Range::new(50, 10));
        let mut deleted = RangeList::default();
        list.del_range(Range::new(0, 30), &mut deleted);
        assert_eq!(ranges(&list), vec![(50, 10)]);
        assert_eq!(ranges(&deleted), vec![(10, 10)]);
    }

    #[test]
    fn merge_adjacent_and_overlapping() {
        let mut list = RangeList::default();
        list.add_range(Range::new(20, 10));
        list.add_range(Range::new(0, 10));
        list.add_range(Range::new(10, 10));
        list.add_range(Range::new(100, 4));
        list.add_range(Range::new(102, 4));
        list.merge();
        assert_eq!(ranges(&list), vec![(0, 30), (100, 6)]);
    }

    #[test]
    fn buffer_converts_each_range_once() {
        let mut buffer = GLESBuffer::default();
        buffer.set_buffer(32, gles20::STATIC_DRAW, None);
        assert!(buffer.needs_conversion());

        let mut wanted = RangeList::default();
        wanted.add_range(Range::new(0, 16));
        assert_eq!(ranges(&buffer.get_conversions(&wanted)), vec![(0, 16)]);
        assert!(buffer.get_conversions(&wanted).is_empty());

        assert!(buffer.set_sub_buffer(8, &[1, 2, 3, 4]));
        assert_eq!(ranges(&buffer.get_conversions(&wanted)), vec![(8, 4)]);
    }

    #[test]
    fn sub_buffer_bounds() {
        let mut buffer = GLESBuffer::default();
        buffer.set_buffer(4, gles20::DYNAMIC_DRAW, Some(&[9, 9, 9, 9]));
        assert_eq!(buffer.usage(), gles20::DYNAMIC_DRAW);
        assert!(!buffer.set_sub_buffer(2, &[0, 0, 0]));
        assert!(buffer.set_sub_buffer(2, &[1, 2]));
        assert_eq!(buffer.data(), &[9, 9, 1, 2]);
        assert!(!buffer.set_sub_buffer(usize::MAX, &[1]));
    }

    #[test]
    fn pointer_stride() {
        let mut pointer = GLESPointer::default();
        assert_eq!(pointer.effective_stride(), 16);
        pointer.set_buffer(2, gles20::FIXED, 20, 3, 8, false);
        assert!(pointer.is_vbo());
        assert_eq!(pointer.effective_stride(), 20);
        pointer.set_array(3, gles20::FLOAT, 0, std::ptr::null(), false);
        assert!(!pointer.is_vbo());
        assert_eq!(pointer.effective_stride(), 12);
    }
}
