use crate::config::SeamSpaces;
use crate::model::Mutation;

const NON_BREAKING_SPACE: char = '\u{a0}';

/// 由原始文字與 run 內的 mutation 重建 run 的文字
///
/// mutation 必須依 index 排序且不重疊。mutation 以外的文字原樣複製；沒有 mutation 時原文不變。
pub fn build_text_from_mutations(origin: &str, mutations: &[Mutation<'_>], seams: SeamSpaces) -> String {
    if mutations.is_empty() {
        return origin.to_owned();
    }

    let fragments = split_fragments(origin, mutations);
    let last = fragments.len().saturating_sub(1);
    let mut out = String::with_capacity(origin.len());
    for (i, fragment) in fragments.into_iter().enumerate() {
        match seams {
            SeamSpaces::Keep => out.push_str(fragment),
            SeamSpaces::NonBreaking => push_untrimmed(&mut out, fragment, i > 0, i < last),
        }
    }
    out
}

/// 以讀取位置走過文字，交替輸出原文片段與 mutation 的值
fn split_fragments<'a>(origin: &'a str, mutations: &[Mutation<'a>]) -> Vec<&'a str> {
    let mut fragments = Vec::with_capacity(mutations.len() * 2 + 1);
    let mut pos = 0;
    let mut pending = mutations.iter().peekable();

    while let Some(mutation) = pending.peek() {
        if mutation.index <= pos {
            fragments.push(mutation.value);
            pos = pos.max(mutation.index + mutation.length);
            pending.next();
        } else {
            fragments.push(origin.get(pos..mutation.index).unwrap_or_default());
            pos = mutation.index;
        }
    }

    let rest = origin.get(pos..).unwrap_or_default();
    if !rest.is_empty() {
        fragments.push(rest);
    }
    fragments
}

fn push_untrimmed(out: &mut String, fragment: &str, seam_before: bool, seam_after: bool) {
    let body = if seam_before { fragment.trim_start_matches(' ') } else { fragment };
    let leading = fragment.len() - body.len();
    let core = if seam_after { body.trim_end_matches(' ') } else { body };
    let trailing = body.len() - core.len();

    out.extend(std::iter::repeat_n(NON_BREAKING_SPACE, leading));
    out.push_str(core);
    out.extend(std::iter::repeat_n(NON_BREAKING_SPACE, trailing));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation(index: usize, length: usize, value: &str) -> Mutation<'_> {
        Mutation {
            index,
            length,
            value,
        }
    }

    #[test]
    fn test_no_mutations_is_verbatim() {
        let text = "  keep  my spaces  ";
        assert_eq!(
            build_text_from_mutations(text, &[], SeamSpaces::NonBreaking),
            text
        );
    }

    #[test]
    fn test_single_substitution() {
        let mutations = [mutation(6, 7, "World")];
        assert_eq!(
            build_text_from_mutations("Hello $(name)!", &mutations, SeamSpaces::Keep),
            "Hello World!"
        );
        assert_eq!(
            build_text_from_mutations("Hello $(name)!", &mutations, SeamSpaces::NonBreaking),
            "Hello\u{a0}World!"
        );
    }

    #[test]
    fn test_prefix_fragment_is_dropped() {
        let mutations = [mutation(1, 4, "")];
        assert_eq!(
            build_text_from_mutations("A$(na", &mutations, SeamSpaces::Keep),
            "A"
        );
    }

    #[test]
    fn test_suffix_fragment_carries_value() {
        let mutations = [mutation(0, 3, "X")];
        assert_eq!(
            build_text_from_mutations("me) B", &mutations, SeamSpaces::Keep),
            "X B"
        );
        assert_eq!(
            build_text_from_mutations("me) B", &mutations, SeamSpaces::NonBreaking),
            "X\u{a0}B"
        );
    }

    #[test]
    fn test_adjacent_and_separated_mutations() {
        let text = "$(a)$(b) and $(c).";
        let mutations = [
            mutation(0, 4, "1"),
            mutation(4, 4, "2"),
            mutation(13, 4, "3"),
        ];
        assert_eq!(
            build_text_from_mutations(text, &mutations, SeamSpaces::Keep),
            "12 and 3."
        );
        assert_eq!(
            build_text_from_mutations(text, &mutations, SeamSpaces::NonBreaking),
            "12\u{a0}and\u{a0}3."
        );
    }

    #[test]
    fn test_spaces_away_from_seams_are_kept() {
        let mutations = [mutation(4, 4, "x")];
        assert_eq!(
            build_text_from_mutations(" a b$(v)c d ", &mutations, SeamSpaces::NonBreaking),
            " a bxc d "
        );
    }

    #[test]
    fn test_value_spaces_at_seams() {
        let mutations = [mutation(1, 4, " v ")];
        assert_eq!(
            build_text_from_mutations("a$(v)b", &mutations, SeamSpaces::NonBreaking),
            "a\u{a0}v\u{a0}b"
        );
    }

    #[test]
    fn test_mutation_running_past_run_end() {
        let mutations = [mutation(2, 9, "")];
        assert_eq!(
            build_text_from_mutations("ab$(", &mutations, SeamSpaces::Keep),
            "ab"
        );
    }

    #[test]
    fn test_overlapping_mutations_do_not_panic() {
        let mutations = [mutation(2, 4, "x"), mutation(1, 2, "y")];
        let out = build_text_from_mutations("abcdefgh", &mutations, SeamSpaces::Keep);
        assert_eq!(out, "abxygh");
    }
}
