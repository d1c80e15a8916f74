//! Prompt construction and response parsing for legislative analysis

use domain::{
    AnalysisContext, AnalysisKind, AnalysisPayload, AnalysisResult, DiffAnalysisResult,
    DiffResult, truncate_chars,
};

use crate::error::ApplicationError;

const SUMMARY_SYSTEM_PROMPT: &str = "Jesteś asystentem, który objaśnia obywatelom zmiany w projektach ustaw. \
Odpowiadasz wyłącznie jednym obiektem JSON o polach: \
\"summary\" (string), \"changes\" (tablica stringów), \"effects\" (tablica stringów), \
\"simplifiedExplanation\" (string). Nie dodawaj żadnego tekstu poza JSON.";

const DIFF_SYSTEM_PROMPT: &str = "Jesteś asystentem, który objaśnia obywatelom różnice między wersjami projektu ustawy. \
Odpowiadasz wyłącznie jednym obiektem JSON o polach: \
\"explanation\" (string), \"keyChanges\" (tablica stringów), \"impact\" (string). \
Nie dodawaj żadnego tekstu poza JSON.";

/// System prompt fixing the response schema for `kind`
pub const fn system_prompt(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Summary => SUMMARY_SYSTEM_PROMPT,
        AnalysisKind::DiffExplanation => DIFF_SYSTEM_PROMPT,
    }
}

/// User prompt carrying the legislative context and the unified diff
///
/// Diffs longer than `max_diff_chars` are cut and marked as shortened.
pub fn build_prompt(
    diff: &DiffResult,
    context: &AnalysisContext,
    kind: AnalysisKind,
    max_diff_chars: usize,
) -> String {
    let mut prompt = format!(
        "Ustawa: {}\nFaza procesu: {}\n",
        context.law_title.trim(),
        context.phase_name.trim()
    );
    if let Some(label) = &context.stage_label {
        prompt.push_str(&format!("Etap: {}\n", label.trim()));
    }
    prompt.push_str(&format!(
        "Porównanie etapu {} (kolejność {}) z etapem {} (kolejność {}): {} linii dodanych, {} usuniętych.\n\n",
        diff.source_version.stage_id,
        diff.source_version.order,
        diff.target_version.stage_id,
        diff.target_version.order,
        diff.additions,
        diff.deletions,
    ));

    let body = truncate_chars(&diff.unified_diff, max_diff_chars);
    let shortened = body.len() < diff.unified_diff.len();
    prompt.push_str("Zmiany (format unified diff):\n");
    prompt.push_str(&body);
    if shortened {
        prompt.push_str("\n[... diff skrócony ...]");
    }
    prompt.push_str("\n\n");

    prompt.push_str(match kind {
        AnalysisKind::Summary => {
            "Podsumuj nową wersję tekstu, wypisz zmiany i ich skutki oraz wyjaśnij je prostym językiem."
        },
        AnalysisKind::DiffExplanation => {
            "Wyjaśnij, co zmieniono, wypisz najważniejsze zmiany i oceń ich wpływ na obywateli."
        },
    });
    prompt
}

/// Parse and validate a summarizer answer against the schema for `kind`
pub fn parse_payload(raw: &str, kind: AnalysisKind) -> Result<AnalysisPayload, ApplicationError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| ApplicationError::AnalysisFormat("response contains no JSON object".into()))?;

    let format_error = |e: &dyn std::fmt::Display| ApplicationError::AnalysisFormat(e.to_string());

    match kind {
        AnalysisKind::Summary => serde_json::from_str::<AnalysisResult>(json)
            .map_err(|e| format_error(&e))?
            .normalized()
            .map(AnalysisPayload::Summary)
            .map_err(|e| format_error(&e)),
        AnalysisKind::DiffExplanation => serde_json::from_str::<DiffAnalysisResult>(json)
            .map_err(|e| format_error(&e))?
            .normalized()
            .map(AnalysisPayload::DiffExplanation)
            .map_err(|e| format_error(&e)),
    }
}

/// Outermost `{...}` span, tolerating code fences and chatter around it
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}
