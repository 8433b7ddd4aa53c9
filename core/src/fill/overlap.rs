use std::ops::Range;

/// 兩個半開區間交集的長度，不相交時為 0
///
/// 任何輸入都有定義：反向區間不會 panic，只會讓結果變小。
pub fn overlap_length(a: Range<usize>, b: Range<usize>) -> usize {
    let span = a.end.max(b.end) as i128 - a.start.min(b.start) as i128;
    let lengths = (a.end as i128 - a.start as i128) + (b.end as i128 - b.start as i128);
    (lengths - span).max(0) as usize
}
