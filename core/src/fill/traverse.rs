use super::projector::run_mutations;
use super::rebuild::build_text_from_mutations;
use super::scanner::scan;
use crate::config::{FillOptions, ScanScope};
use crate::document::RunDocument;
use crate::error::Result;
use crate::model::{FillReport, Lookup, Mutation, Replacement, RunEdit, RunId};

/// 串接後一起掃描的 run
type ScanUnit = Vec<(RunId, String)>;

/// 下一個 run 在掃描單位文字中的位移
struct RunCursor<'a> {
    offset: usize,
    replacements: &'a [Replacement],
}

impl<'a> RunCursor<'a> {
    fn new(replacements: &'a [Replacement]) -> Self {
        Self {
            offset: 0,
            replacements,
        }
    }

    /// 取得下一個 run 的 mutation，並把游標移過它
    fn advance(&mut self, run_length: usize) -> Vec<Mutation<'a>> {
        let span = self.offset..self.offset + run_length;
        self.offset = span.end;
        run_mutations(span, self.replacements)
    }
}

/// 文檔中所有佔位符名稱，依順序，保留重複
pub fn collect_variables<D: RunDocument + ?Sized>(doc: &D, scope: ScanScope) -> Vec<String> {
    scan_units(doc.paragraphs(), scope)
        .iter()
        .flat_map(|unit| scan(&unit_text(unit), None, Default::default()).variables)
        .collect()
}

/// 就地替換 `doc` 中所有可解析的佔位符
///
/// run 嚴格依文檔順序走訪；只有文字真的改變的 run 會一次整批交回文檔。
pub fn fill_document<D: RunDocument + ?Sized>(
    doc: &mut D,
    lookup: &Lookup,
    options: &FillOptions,
) -> Result<FillReport> {
    let mut report = FillReport::default();
    let mut edits = Vec::new();

    for unit in scan_units(doc.paragraphs(), options.scope) {
        let found = scan(&unit_text(&unit), Some(lookup), options.empty_values);
        for name in found.unresolved(Some(lookup), options.empty_values) {
            tracing::debug!(variable = %name, "no value for placeholder, leaving it as is");
            report.unresolved.push(name);
        }
        if found.replacements.is_empty() {
            continue;
        }
        report.replaced += found.replacements.len();

        let mut cursor = RunCursor::new(&found.replacements);
        for (run, text) in unit {
            let mutations = cursor.advance(text.len());
            if mutations.is_empty() {
                continue;
            }
            let rebuilt = build_text_from_mutations(&text, &mutations, options.seam_spaces);
            if rebuilt != text {
                edits.push(RunEdit { run, text: rebuilt });
            }
        }
    }

    report.runs_rewritten = edits.len();
    if !edits.is_empty() {
        doc.rewrite_runs(edits)?;
    }
    Ok(report)
}

fn scan_units(paragraphs: Vec<Vec<String>>, scope: ScanScope) -> Vec<ScanUnit> {
    let units = paragraphs.into_iter().enumerate().map(|(paragraph, runs)| {
        runs.into_iter()
            .enumerate()
            .map(|(run, text)| (RunId { paragraph, run }, text))
            .collect::<ScanUnit>()
    });
    match scope {
        ScanScope::Paragraph => units.collect(),
        ScanScope::Document => vec![units.flatten().collect()],
    }
}

fn unit_text(unit: &ScanUnit) -> String {
    unit.iter().map(|(_, text)| text.as_str()).collect()
}
