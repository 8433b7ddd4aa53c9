use std::ops::Range;

use super::overlap::overlap_length;
use crate::model::{Mutation, Replacement};

/// 與 run `span` 重疊的替換，換算成相對於 run 起點的座標
///
/// `replacements` 必須依 index 排序，輸出維持相同順序。
pub fn run_mutations<'a>(span: Range<usize>, replacements: &'a [Replacement]) -> Vec<Mutation<'a>> {
    // 在 run 起點之前（含）結束的替換不可能重疊
    let first = replacements.partition_point(|rep| rep.end() <= span.start);
    replacements[first..]
        .iter()
        .take_while(|rep| rep.index < span.end)
        .filter(|rep| overlap_length(span.clone(), rep.index..rep.end()) > 0)
        .map(|rep| move_to_run_space(span.clone(), rep))
        .collect()
}

/// 把一個替換投影到單一 run
///
/// 只有包含佔位符結尾的 run 會帶替換值，前面的 run 只刪掉自己持有的那段佔位符。
pub fn move_to_run_space(span: Range<usize>, rep: &Replacement) -> Mutation<'_> {
    let run_length = span.end.saturating_sub(span.start);
    let holds_end = (span.start..=span.end).contains(&rep.end());
    Mutation {
        index: rep.index.saturating_sub(span.start),
        length: overlap_length(span, rep.index..rep.end()).min(run_length),
        value: if holds_end { rep.value.as_str() } else { "" },
    }
}
