use crate::position::{Position, Range};
use crate::text_buffer::piece::{Buffer, Piece};
use crate::text_buffer::TextBuffer;
use crate::{BufferError, BufferResult};
use std::iter::Iterator;

/// A located position within the piece sequence.
#[derive(Clone, Copy, Debug)]
struct PieceCursor {
    index: usize,
    remainder: usize,
}

pub struct PieceTable {
    original: String,
    added: String,
    pieces: Vec<Piece>,
    length: usize,
}

impl PieceTable {
    pub fn new(content: String) -> Self {
        let mut table = Self {
            length: content.len(),
            pieces: Vec::new(),
            original: content,
            added: String::new(),
        };
        if !table.original.is_empty() {
            let piece = Piece::new(Buffer::Original, 0, &table.original);
            table.pieces.push(piece);
        }

        table
    }

    fn buffer_contents(&self, buffer: Buffer) -> &str {
        match buffer {
            Buffer::Added => &self.added,
            Buffer::Original => &self.original,
        }
    }

    fn piece_slice(&self, piece: &Piece) -> &str {
        &self.buffer_contents(piece.buffer)[piece.start..piece.start + piece.length]
    }

    /// Locate `offset` at the first piece whose running length sum reaches
    /// it, so an offset on a piece boundary resolves to the earlier piece
    /// with `remainder == length`. `None` when the offset lies beyond the
    /// document or the document is empty.
    fn cursor_at(&self, offset: usize) -> Option<PieceCursor> {
        let mut remainder = offset;
        for (index, piece) in self.pieces.iter().enumerate() {
            if remainder <= piece.length {
                return Some(PieceCursor { index, remainder });
            }
            remainder -= piece.length;
        }

        None
    }

    fn iter(&self) -> PieceTableIter {
        PieceTableIter {
            inner: self,
            piece_index: 0,
            piece_offset: 0,
            end_piece_index: self.pieces.len(),
            end_piece_offset: 0,
        }
    }

    fn iter_range(&self, range: std::ops::Range<usize>) -> PieceTableIter {
        let end_offset = range.end.min(self.length);
        if range.start >= end_offset {
            return PieceTableIter {
                inner: self,
                piece_index: 0,
                piece_offset: 0,
                end_piece_index: 0,
                end_piece_offset: 0,
            };
        }

        let start = self
            .cursor_at(range.start)
            .expect("range start is inside the document");
        let end = self
            .cursor_at(end_offset)
            .expect("clamped range end is inside the document");

        PieceTableIter {
            inner: self,
            piece_index: start.index,
            piece_offset: start.remainder,
            end_piece_index: end.index,
            end_piece_offset: end.remainder,
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        let mut total = 0;
        for piece in &self.pieces {
            assert!(piece.length > 0, "zero-length piece published");
            assert_eq!(piece.line_starts.len(), piece.line_feed_count + 1);
            assert_eq!(piece.line_starts.total(), piece.length);
            total += piece.length;
        }
        assert_eq!(total, self.length);
    }
}

impl TextBuffer for PieceTable {
    fn insert(&mut self, value: &str, offset: usize) -> BufferResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        if !self.pieces.is_empty() && offset > self.length {
            return Err(BufferError::OffsetOutOfBounds {
                offset,
                length: self.length,
            });
        }

        let start = self.added.len();
        self.added.push_str(value);
        let new_piece = Piece::new(Buffer::Added, start, value);

        match self.cursor_at(offset) {
            None => self.pieces.push(new_piece),
            Some(cursor) => {
                let (left, right) = self.pieces[cursor.index].split_at(cursor.remainder);
                let replacements = [left, new_piece, right]
                    .into_iter()
                    .filter(|piece| piece.length > 0);
                self.pieces.splice(cursor.index..=cursor.index, replacements);
            }
        }

        self.length += value.len();
        Ok(())
    }

    fn delete(&mut self, offset: usize, count: usize) {
        if count == 0 || offset >= self.length {
            return;
        }
        let count = count.min(self.length - offset);

        let first = self
            .cursor_at(offset)
            .expect("delete start is inside the document");
        let last = self
            .cursor_at(offset + count)
            .expect("clamped delete end is inside the document");

        if first.index == last.index {
            let piece_length = self.pieces[first.index].length;
            if first.remainder == 0 && count == piece_length {
                self.pieces.remove(first.index);
            } else if first.remainder == 0 {
                self.pieces[first.index].trim_start(count);
            } else if last.remainder == piece_length {
                self.pieces[first.index].trim_end(count);
            } else {
                let (prefix, _) = self.pieces[first.index].split_at(first.remainder);
                let (_, suffix) = self.pieces[first.index].split_at(last.remainder);
                self.pieces
                    .splice(first.index..=first.index, [prefix, suffix]);
            }
        } else {
            let (prefix, _) = self.pieces[first.index].split_at(first.remainder);
            let (_, suffix) = self.pieces[last.index].split_at(last.remainder);
            let replacements = [prefix, suffix]
                .into_iter()
                .filter(|piece| piece.length > 0);
            self.pieces.splice(first.index..=last.index, replacements);
        }

        self.length -= count;
    }

    fn substr(&self, offset: usize, count: usize) -> String {
        if count == 0 || offset >= self.length {
            return String::new();
        }
        let count = count.min(self.length - offset);

        self.iter_range(offset..offset + count).collect()
    }

    fn line_content(&self, line: usize) -> String {
        let mut preceding_line_feeds = 0;
        for (index, piece) in self.pieces.iter().enumerate() {
            if preceding_line_feeds + piece.line_feed_count + 1 >= line {
                let line_in_piece = line - 1 - preceding_line_feeds;
                let base = piece.line_starts.sum_to(line_in_piece);
                let slice = self.piece_slice(piece);

                if line_in_piece < piece.line_feed_count {
                    // Line terminates inside this piece; its segment carries
                    // the line feed, which the caller never sees.
                    let end = piece.line_starts.sum_to(line_in_piece + 1);
                    return slice[base..end - 1].to_string();
                }

                // Trailing segment: the line runs to the end of this piece
                // and continues until some later piece supplies a line feed.
                let mut content = String::from(&slice[base..]);
                for next in &self.pieces[index + 1..] {
                    let next_slice = self.piece_slice(next);
                    if next.line_feed_count == 0 {
                        content.push_str(next_slice);
                    } else {
                        content.push_str(&next_slice[..next.line_starts.sum_to(1) - 1]);
                        break;
                    }
                }
                return content;
            }
            preceding_line_feeds += piece.line_feed_count;
        }

        String::new()
    }

    fn line_count(&self) -> usize {
        self.pieces
            .iter()
            .fold(1, |count, piece| count + piece.line_feed_count)
    }

    fn lines_content(&self) -> String {
        self.iter().collect()
    }

    fn offset_at(&self, position: Position) -> usize {
        let mut left_bytes = 0;
        let mut preceding_line_feeds = 0;
        for piece in &self.pieces {
            if preceding_line_feeds + piece.line_feed_count + 1 >= position.line {
                let line_in_piece = position.line - 1 - preceding_line_feeds;
                let base = piece.line_starts.sum_to(line_in_piece);
                return left_bytes + base + position.column - 1;
            }
            preceding_line_feeds += piece.line_feed_count;
            left_bytes += piece.length;
        }

        self.length
    }

    fn position_at(&self, offset: usize) -> Position {
        let mut remainder = offset.min(self.length);
        let mut preceding_line_feeds = 0;
        // Bytes of the current line contributed by earlier pieces; only
        // meaningful while the line continues into the piece under the
        // cursor, i.e. when the offset falls in its first segment.
        let mut column_carry = 0;
        for piece in &self.pieces {
            if remainder <= piece.length {
                let (line_in_piece, column) = piece.line_starts.index_of(remainder);
                let line = preceding_line_feeds + line_in_piece + 1;
                if line_in_piece == 0 {
                    return Position::new(line, column_carry + column + 1);
                }
                return Position::new(line, column + 1);
            }
            remainder -= piece.length;
            preceding_line_feeds += piece.line_feed_count;
            column_carry = if piece.line_feed_count == 0 {
                column_carry + piece.length
            } else {
                piece.line_starts.value(piece.line_feed_count)
            };
        }

        Position::new(1, 1)
    }

    fn value_in_range(&self, range: Range) -> String {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);

        self.substr(start, end.saturating_sub(start))
    }

    fn len(&self) -> usize {
        self.length
    }
}

struct PieceTableIter<'a> {
    inner: &'a PieceTable,
    piece_index: usize,
    piece_offset: usize,
    end_piece_index: usize,
    end_piece_offset: usize,
}

impl<'a> Iterator for PieceTableIter<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.piece_index == self.end_piece_index
                && self.piece_offset >= self.end_piece_offset
            {
                return None;
            }

            let piece = self.inner.pieces.get(self.piece_index)?;
            if self.piece_offset >= piece.length {
                self.piece_index += 1;
                self.piece_offset = 0;
                continue;
            }

            let slice = self.inner.piece_slice(piece);
            let character = slice[self.piece_offset..].chars().next()?;
            self.piece_offset += character.len_utf8();
            return Some(character);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_single_line() {
        let pt = PieceTable::new(String::from("abc"));
        assert_eq!(pt.lines_content(), "abc");
        assert_eq!(pt.line_count(), 1);
        assert_eq!(pt.len(), 3);
        pt.assert_invariants();
    }

    #[test]
    fn construct_two_lines() {
        let pt = PieceTable::new(String::from("abc\ndef"));
        assert_eq!(pt.line_count(), 2);
        assert_eq!(pt.line_content(1), "abc");
        assert_eq!(pt.line_content(2), "def");
        assert_eq!(pt.offset_at(Position::new(2, 1)), 4);
        assert_eq!(pt.position_at(4), Position::new(2, 1));
    }

    #[test]
    fn construct_empty() {
        let pt = PieceTable::new(String::new());
        assert_eq!(pt.lines_content(), "");
        assert_eq!(pt.line_count(), 1);
        assert!(pt.is_empty());
        assert_eq!(pt.position_at(0), Position::new(1, 1));
        assert_eq!(pt.offset_at(Position::new(1, 1)), 0);
    }

    #[test]
    fn insert_into_empty() {
        let pt = &mut PieceTable::new(String::new());
        pt.insert("hello", 0).unwrap();
        pt.insert(" world", 5).unwrap();

        assert_eq!(pt.lines_content(), "hello world");
        assert_eq!(pt.line_count(), 1);
        pt.assert_invariants();
    }

    #[test]
    fn insert_head() {
        let pt = &mut PieceTable::new(String::from("abcd"));

        pt.insert("0", 0).unwrap();
        assert_eq!(pt.lines_content(), "0abcd");

        pt.insert("1", 1).unwrap();
        assert_eq!(pt.lines_content(), "01abcd");

        pt.insert("2", 0).unwrap();
        assert_eq!(pt.lines_content(), "201abcd");
        pt.assert_invariants();
    }

    #[test]
    fn insert_at_start_of_leading_blank_line() {
        let pt = &mut PieceTable::new(String::from("\nabc"));
        pt.insert("X", 0).unwrap();

        assert_eq!(pt.lines_content(), "X\nabc");
        assert_eq!(pt.line_count(), 2);
        assert_eq!(pt.line_content(1), "X");
        assert_eq!(pt.line_content(2), "abc");
        pt.assert_invariants();
    }

    #[test]
    fn insert_body() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.insert("012", 2).unwrap();
        assert_eq!(pt.lines_content(), "ab012cd");

        pt.insert("3", 4).unwrap();
        assert_eq!(pt.lines_content(), "ab0132cd");
        pt.assert_invariants();
    }

    #[test]
    fn insert_end() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.insert("012", 4).unwrap();
        assert_eq!(pt.lines_content(), "abcd012");

        pt.insert("3", 7).unwrap();
        assert_eq!(pt.lines_content(), "abcd0123");
        pt.assert_invariants();
    }

    #[test]
    fn insert_before_line_feed() {
        let pt = &mut PieceTable::new(String::from("line1\nline2"));
        pt.insert("X", 5).unwrap();

        assert_eq!(pt.line_content(1), "line1X");
        assert_eq!(pt.line_content(2), "line2");
        assert_eq!(pt.line_count(), 2);
        pt.assert_invariants();
    }

    #[test]
    fn insert_line_feed_mid_piece() {
        let pt = &mut PieceTable::new(String::from("ab"));
        pt.insert("\n", 1).unwrap();

        assert_eq!(pt.line_count(), 2);
        assert_eq!(pt.line_content(1), "a");
        assert_eq!(pt.line_content(2), "b");
        pt.assert_invariants();
    }

    #[test]
    fn insert_empty_value_is_noop() {
        let pt = &mut PieceTable::new(String::from("abc"));
        pt.insert("", 1).unwrap();

        assert_eq!(pt.lines_content(), "abc");
        assert_eq!(pt.len(), 3);
        pt.assert_invariants();
    }

    #[test]
    fn insert_past_end_fails_without_mutating() {
        let pt = &mut PieceTable::new(String::from("abc"));
        assert!(pt.insert("x", 4).is_err());

        assert_eq!(pt.lines_content(), "abc");
        assert_eq!(pt.len(), 3);
        pt.assert_invariants();
    }

    #[test]
    fn delete_removes_middle_line() {
        let pt = &mut PieceTable::new(String::from("abc\ndef\nghi"));
        pt.delete(4, 4);

        assert_eq!(pt.lines_content(), "abc\nghi");
        assert_eq!(pt.line_count(), 2);
        assert_eq!(pt.line_content(2), "ghi");
        pt.assert_invariants();
    }

    #[test]
    fn delete_head() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.delete(0, 1);
        assert_eq!(pt.lines_content(), "bcd");

        pt.delete(0, 2);
        assert_eq!(pt.lines_content(), "d");
        pt.assert_invariants();
    }

    #[test]
    fn delete_body() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.insert("012", 2).unwrap();
        assert_eq!(pt.lines_content(), "ab012cd");

        pt.delete(3, 1);
        assert_eq!(pt.lines_content(), "ab02cd");

        pt.delete(1, 4);
        assert_eq!(pt.lines_content(), "ad");
        pt.assert_invariants();
    }

    #[test]
    fn delete_tail() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.delete(3, 1);
        assert_eq!(pt.lines_content(), "abc");
        pt.assert_invariants();
    }

    #[test]
    fn delete_across_pieces() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.insert("012", 2).unwrap();
        pt.insert("xyz", 7).unwrap();
        assert_eq!(pt.lines_content(), "ab012cdxyz");

        pt.delete(1, 8);
        assert_eq!(pt.lines_content(), "az");
        pt.assert_invariants();
    }

    #[test]
    fn delete_whole_document() {
        let pt = &mut PieceTable::new(String::from("abc\ndef"));
        pt.delete(0, 7);

        assert_eq!(pt.lines_content(), "");
        assert_eq!(pt.line_count(), 1);
        assert!(pt.is_empty());
        pt.assert_invariants();
    }

    #[test]
    fn delete_clamps_past_end() {
        let pt = &mut PieceTable::new(String::from("abcdef"));
        pt.delete(4, 100);

        assert_eq!(pt.lines_content(), "abcd");
        pt.assert_invariants();
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let pt = &mut PieceTable::new(String::from("abc"));
        pt.delete(3, 5);
        pt.delete(10, 1);
        pt.delete(1, 0);

        assert_eq!(pt.lines_content(), "abc");
        pt.assert_invariants();
    }

    #[test]
    fn substr_within_and_across_pieces() {
        let pt = &mut PieceTable::new(String::from("abcd"));
        pt.insert("012", 2).unwrap();
        assert_eq!(pt.lines_content(), "ab012cd");

        assert_eq!(pt.substr(1, 3), "b01");
        assert_eq!(pt.substr(0, 5), "ab012");
        assert_eq!(pt.substr(4, 23), "2cd");
        assert_eq!(pt.substr(7, 1), "");
        assert_eq!(pt.substr(3, 0), "");
    }

    #[test]
    fn line_content_spanning_pieces() {
        let pt = &mut PieceTable::new(String::from("ab"));
        pt.insert("\nd0\n234567\n89", 2).unwrap();
        assert_eq!(pt.lines_content(), "ab\nd0\n234567\n89");

        assert_eq!(pt.line_content(1), "ab");
        assert_eq!(pt.line_content(2), "d0");
        assert_eq!(pt.line_content(3), "234567");
        assert_eq!(pt.line_content(4), "89");

        pt.insert("\n", 14).unwrap();
        assert_eq!(pt.line_content(4), "8");
        assert_eq!(pt.line_content(5), "9");
        pt.assert_invariants();
    }

    #[test]
    fn line_content_line_built_from_many_pieces() {
        let pt = &mut PieceTable::new(String::from("ad"));
        pt.insert("b", 1).unwrap();
        pt.insert("c", 2).unwrap();
        pt.insert("\ntail", 4).unwrap();

        assert_eq!(pt.lines_content(), "abcd\ntail");
        assert_eq!(pt.line_content(1), "abcd");
        assert_eq!(pt.line_content(2), "tail");
        pt.assert_invariants();
    }

    #[test]
    fn line_content_after_trailing_line_feed() {
        let pt = PieceTable::new(String::from("abc\n"));
        assert_eq!(pt.line_count(), 2);
        assert_eq!(pt.line_content(1), "abc");
        assert_eq!(pt.line_content(2), "");
    }

    #[test]
    fn offset_position_round_trip_across_pieces() {
        let pt = &mut PieceTable::new(String::from("x\nab"));
        pt.insert("cd", 4).unwrap();
        pt.insert("ef\ny", 6).unwrap();
        // Document: "x\nabcdef\ny" — line 2 spans three pieces.
        assert_eq!(pt.lines_content(), "x\nabcdef\ny");

        for offset in 0..=pt.len() {
            assert_eq!(pt.offset_at(pt.position_at(offset)), offset);
        }
        assert_eq!(pt.position_at(6), Position::new(2, 5));
        assert_eq!(pt.position_at(9), Position::new(3, 1));
    }

    #[test]
    fn value_in_range_extracts_between_positions() {
        let pt = PieceTable::new(String::from("abc\ndef\nghi"));
        let range = Range::new(Position::new(1, 2), Position::new(2, 3));
        assert_eq!(pt.value_in_range(range), "bc\nde");

        let line2 = Range::new(Position::new(2, 1), Position::new(3, 1));
        assert_eq!(pt.value_in_range(line2), "def\n");
    }

    #[test]
    fn interleaved_pieces() {
        let mut pt = PieceTable::new(String::from("abcd"));
        pt.added = String::from("0123");
        pt.pieces = vec![
            Piece::new(Buffer::Original, 0, "ab"),
            Piece::new(Buffer::Added, 0, "012"),
            Piece::new(Buffer::Original, 2, "cd"),
            Piece::new(Buffer::Added, 3, "3"),
        ];
        pt.length = 8;

        assert_eq!(pt.lines_content(), "ab012cd3");
        assert_eq!(pt.substr(1, 4), "b012");
        pt.assert_invariants();
    }
}
