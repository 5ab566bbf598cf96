//! Best-effort extraction of a narrative from free-form model output.
//!
//! A JSON object anywhere in the reply wins. Otherwise the reply is scanned for
//! markdown sections (insights, risks, opportunities) with bullet lists.

use regex::Regex;
use shared_types::PredictionNarrative;

use super::types::NarrativeResponse;

pub fn parse_narrative(text: &str) -> Option<PredictionNarrative> {
    parse_json_object(text).or_else(|| parse_markdown_sections(text))
}

fn parse_json_object(text: &str) -> Option<PredictionNarrative> {
    let object = Regex::new(r"(?s)\{.*\}").ok()?.find(text)?;

    match serde_json::from_str::<NarrativeResponse>(object.as_str()) {
        Ok(response) => {
            let narrative = PredictionNarrative::from(response);
            (!narrative.is_empty()).then_some(narrative)
        }
        Err(e) => {
            tracing::debug!("Narrative reply contained invalid JSON: {}", e);
            None
        }
    }
}

#[derive(Clone, Copy)]
enum Section {
    Insights,
    Risks,
    Opportunities,
}

fn parse_markdown_sections(text: &str) -> Option<PredictionNarrative> {
    let bullet = Regex::new(r"^(?:[-*•+]|\d+[.)])\s+(.+)$").ok()?;

    let mut narrative = PredictionNarrative::default();
    let mut section = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = bullet.captures(line) {
            let item = caps[1].trim().trim_matches('*').trim().to_string();
            if item.is_empty() {
                continue;
            }
            match section {
                Some(Section::Insights) => narrative.ai_insights.push(item),
                Some(Section::Risks) => narrative.risk_factors.push(item),
                Some(Section::Opportunities) => narrative.opportunities.push(item),
                None => {}
            }
            continue;
        }

        if is_heading(line) {
            section = section_for_heading(line);
        }
    }

    (!narrative.is_empty()).then_some(narrative)
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#') || line.ends_with(':') || (line.starts_with("**") && line.ends_with("**"))
}

fn section_for_heading(line: &str) -> Option<Section> {
    let heading = line.to_lowercase();
    if heading.contains("insight") {
        Some(Section::Insights)
    } else if heading.contains("risk") {
        Some(Section::Risks)
    } else if heading.contains("opportunit") {
        Some(Section::Opportunities)
    } else {
        None
    }
}
