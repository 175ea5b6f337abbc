/// A 1-based (line, column) pair addressing a point in a document. Columns
/// count bytes from the start of the line; a line feed belongs to the line it
/// terminates.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }
}

/// A span between two positions: start inclusive, end exclusive.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Range {
        Range { start, end }
    }
}
