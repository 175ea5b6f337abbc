use crate::prefix_sum::PrefixSums;
use crate::str_utils;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Buffer {
    Added,
    Original,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Piece {
    /// Associated PieceTable buffer.
    pub buffer: Buffer,
    /// Byte index of piece start within buffer.
    pub start: usize,
    /// Length (in bytes, from start index) of piece within buffer.
    pub length: usize,
    /// Number of line feeds within the buffer region spanned by this piece.
    pub line_feed_count: usize,
    /// Lengths of the segments between consecutive line feeds within the
    /// region, ordered; `line_feed_count + 1` entries summing to `length`.
    pub line_starts: PrefixSums,
}

impl Piece {
    /// Scan `contents` (the buffer region this piece will span) and build
    /// the record with its line index.
    pub fn new(buffer: Buffer, start: usize, contents: &str) -> Piece {
        let segments = str_utils::line_segment_lengths(contents);

        Piece {
            buffer,
            start,
            length: contents.len(),
            line_feed_count: segments.len() - 1,
            line_starts: PrefixSums::new(segments),
        }
    }

    /// Split into `[..at)` and `[at..)` halves, each with an independent
    /// line index. Either half may come out empty when `at` is 0 or
    /// `length`; callers drop empty halves before publishing.
    pub fn split_at(&self, at: usize) -> (Piece, Piece) {
        debug_assert!(at <= self.length);
        let (split_line, split_remainder) = self.line_starts.index_of(at);

        let mut left_starts = self.line_starts.clone();
        left_starts.remove_values(split_line + 1, left_starts.len() - split_line - 1);
        left_starts.set_value(split_line, split_remainder);
        let left = Piece {
            buffer: self.buffer,
            start: self.start,
            length: at,
            line_feed_count: split_line,
            line_starts: left_starts,
        };

        let mut right_starts = self.line_starts.clone();
        right_starts.set_value(split_line, right_starts.value(split_line) - split_remainder);
        right_starts.remove_values(0, split_line);
        let right = Piece {
            buffer: self.buffer,
            start: self.start + at,
            length: self.length - at,
            line_feed_count: self.line_feed_count - split_line,
            line_starts: right_starts,
        };

        (left, right)
    }

    /// Drop `count` bytes from the front, in place. `count` must leave the
    /// piece non-empty.
    pub fn trim_start(&mut self, count: usize) {
        debug_assert!(count < self.length);
        let (dropped_lines, dropped_remainder) = self.line_starts.index_of(count);

        self.start += count;
        self.length -= count;
        self.line_feed_count -= dropped_lines;
        let partial = self.line_starts.value(dropped_lines) - dropped_remainder;
        self.line_starts.set_value(dropped_lines, partial);
        self.line_starts.remove_values(0, dropped_lines);
    }

    /// Drop `count` bytes from the back, in place. `count` must leave the
    /// piece non-empty.
    pub fn trim_end(&mut self, count: usize) {
        debug_assert!(count < self.length);
        let keep = self.length - count;
        let (last_line, last_remainder) = self.line_starts.index_of(keep);

        self.length = keep;
        self.line_feed_count = last_line;
        self.line_starts
            .remove_values(last_line + 1, self.line_starts.len() - last_line - 1);
        self.line_starts.set_value(last_line, last_remainder);
    }
}
