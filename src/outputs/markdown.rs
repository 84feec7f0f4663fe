//! Markdown rendering of an insight report.

use crate::models::InsightReport;

/// Render `report` as a Markdown document.
pub fn report_to_markdown(report: &InsightReport) -> String {
    let tally = &report.sentiment_summary;
    let mut md = format!("# News insights: {}\n\n", report.company);

    md.push_str(&format!(
        "**Sentiment:** {} positive, {} negative, {} neutral across {} articles\n",
        tally.positive,
        tally.negative,
        tally.neutral,
        report.articles.len()
    ));
    if let Some(totals) = &report.sentence_totals {
        md.push_str(&format!(
            "\n**Sentences:** {} positive, {} negative, {} neutral\n",
            totals.positive, totals.negative, totals.neutral
        ));
    }

    md.push_str("\n## Articles\n");
    for (i, article) in report.articles.iter().enumerate() {
        let source_tag = article
            .source_tag()
            .map(|tag| format!(" <small>`{tag}`</small>"))
            .unwrap_or_default();
        md.push_str(&format!(
            "\n### {}. {}{}\n\n- **Sentiment:** {}\n- **Link:** <{}>\n\n{}\n",
            i + 1,
            article.title,
            source_tag,
            article.sentiment,
            article.url,
            article.summary
        ));
    }

    if !report.comparative_analysis.is_empty() {
        md.push_str("\n## Comparative analysis\n\n");
        for entry in &report.comparative_analysis {
            md.push_str(&format!("- {}\n", entry.comparison));
        }
    }

    md.push_str("\n## Audio digest\n\n");
    match &report.tts_audio {
        Some(file) => md.push_str(&format!("`{file}`\n")),
        None => md.push_str("_Not available_\n"),
    }

    md
}
