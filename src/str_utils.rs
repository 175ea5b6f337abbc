/// Lengths of the segments between consecutive line feeds in `s`, in order.
/// Every segment except the last includes its terminating line feed; the
/// last is the trailing text after the final line feed (the whole string
/// when there is none). The lengths always sum to `s.len()`.
pub fn line_segment_lengths(s: &str) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut segment_start = 0;
    for (i, b) in s.bytes().enumerate() {
        if b == 0x0A {
            lengths.push(i + 1 - segment_start);
            segment_start = i + 1;
        }
    }
    lengths.push(s.len() - segment_start);

    lengths
}
