//! Output formatters: console, JSON, Markdown and HTML

use crate::config::OutputFormat;
use crate::error::{Result, ResumeMatcherError};
use crate::output::report::{MatchReport, ResumeMatch, SkippedDocument};
use crate::processing::text_processor::TextProcessor;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

const BAR_WIDTH: usize = 30;
const ANALYSIS_PREVIEW_CHARS: usize = 600;

pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Coloured terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Picks the formatter for a requested output format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Match Report</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 20px;
        }
        .section { margin: 25px 0; }
        .section h2 {
            color: #007acc;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        blockquote {
            background: #f8f9fa;
            border-left: 4px solid #007acc;
            margin: 10px 0;
            padding: 10px 15px;
            white-space: pre-wrap;
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 8px; text-align: left; border-bottom: 1px solid #e9ecef; }
        .bar-track { background: #e9ecef; border-radius: 4px; height: 14px; width: 100%; }
        .bar { height: 14px; border-radius: 4px; }
        .fit { color: #28a745; font-weight: bold; }
        .not-fit { color: #dc3545; font-weight: bold; }
        .bar.fit { background: #28a745; }
        .bar.not-fit { background: #dc3545; }
        .assessment {
            background: #f8f9fa;
            padding: 15px;
            margin: 10px 0;
            border-radius: 6px;
            border-left: 4px solid #17a2b8;
        }
        .error { border-left-color: #ffc107; }
        .metadata {
            background: #e9ecef;
            padding: 15px;
            border-radius: 6px;
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>📊 Resume Match Report</h1>
            <p>Generated: {{ generated_at }} | Processing time: {{ processing_time }}ms</p>
        </div>

        <div class="section">
            <h2>💼 Job Description</h2>
            <blockquote>{{ job_preview }}</blockquote>
        </div>

        <div class="section">
            <h2>Summary</h2>
            <p><strong>{{ fit_count }}</strong> of <strong>{{ total }}</strong> resume(s) meet the fit threshold of <strong>{{ threshold }}</strong>.</p>
        </div>

        <div class="section">
            <h2>🎯 Similarity Scores</h2>
            <table>
                <tr><th>#</th><th>Resume</th><th>Score</th><th></th><th>Fit</th>{% if has_llm %}<th>LLM</th>{% endif %}</tr>
                {% for row in rows %}
                <tr>
                    <td>{{ row.rank }}</td>
                    <td>{{ row.source }}</td>
                    <td>{{ row.score }}</td>
                    <td style="width: 40%"><div class="bar-track"><div class="bar {{ row.fit_class }}" style="width: {{ row.percentage }}%"></div></div></td>
                    <td class="{{ row.fit_class }}">{{ row.fit }}</td>
                    {% if has_llm %}<td>{{ row.recommendation }}</td>{% endif %}
                </tr>
                {% endfor %}
            </table>
        </div>

        {% if has_llm %}
        <div class="section">
            <h2>🤖 LLM Assessments</h2>
            {% for item in assessments %}
            <div class="assessment{% if item.is_error %} error{% endif %}">
                <h3>{{ item.source }}</h3>
                <blockquote>{{ item.text }}</blockquote>
            </div>
            {% endfor %}
        </div>
        {% endif %}

        {% if has_skipped %}
        <div class="section">
            <h2>⚠️ Skipped Documents</h2>
            <ul>
            {% for doc in skipped %}
                <li><strong>{{ doc.source }}</strong>: {{ doc.reason }}</li>
            {% endfor %}
            </ul>
        </div>
        {% endif %}

        <div class="metadata">
            <p><strong>ℹ️ Generated by Resume Matcher v{{ version }}</strong></p>
            <p><strong>Models:</strong> {{ embedding_model }} + {{ llm_model }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    processing_time: u64,
    job_preview: String,
    fit_count: usize,
    total: usize,
    threshold: String,
    rows: Vec<HtmlRow>,
    has_llm: bool,
    assessments: Vec<HtmlAssessment>,
    has_skipped: bool,
    skipped: Vec<SkippedDocument>,
    version: String,
    embedding_model: String,
    llm_model: String,
}

struct HtmlRow {
    rank: usize,
    source: String,
    score: String,
    percentage: u8,
    fit: String,
    fit_class: &'static str,
    recommendation: String,
}

struct HtmlAssessment {
    source: String,
    text: String,
    is_error: bool,
}

fn recommendation_label(entry: &ResumeMatch) -> &'static str {
    match (&entry.assessment, &entry.llm_error) {
        (Some(a), _) => match a.recommended {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "Unclear",
        },
        (None, Some(_)) => "Failed",
        (None, None) => "-",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    /// Padding happens before colouring so escape codes don't skew columns.
    fn format_fit(&self, entry: &ResumeMatch, width: usize) -> String {
        let label = format!("{:<width$}", entry.fit.to_string(), width = width);
        let color = if entry.fit.is_fit() { Color::Green } else { Color::Red };
        if self.use_colors {
            label.color(color).bold().to_string()
        } else {
            label
        }
    }

    fn format_bar(&self, entry: &ResumeMatch) -> String {
        let filled = (entry.score.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
        let bar = "█".repeat(filled);
        let rest = "░".repeat(BAR_WIDTH - filled);
        let color = if entry.fit.is_fit() { Color::Green } else { Color::Red };
        format!("{}{}", self.colorize(&bar, color), rest)
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME MATCH REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));
        output.push_str(&format!(
            "Embedding model: {} | Fit threshold: {:.2}\n",
            report.metadata.embedding_model, report.threshold
        ));

        output.push_str(&self.format_header("Job Description", 2));
        let preview = if self.detailed {
            report.job_preview.clone()
        } else {
            TextProcessor::preview(&report.job_preview, 160)
        };
        output.push_str(&format!("{}\n", self.colorize(&preview, Color::Cyan)));

        let ranked = report.ranked();
        let name_width = ranked
            .iter()
            .map(|e| e.source.chars().count())
            .max()
            .unwrap_or(6)
            .max(6);
        let show_llm = report.has_assessments();

        output.push_str(&self.format_header("Results", 2));
        if ranked.is_empty() {
            output.push_str("No resumes could be scored.\n");
        } else {
            let mut heading = format!(
                "{:>3}  {:<name_width$}  {:>5}  {:<7}",
                "#",
                "Resume",
                "Score",
                "Fit",
                name_width = name_width
            );
            if show_llm {
                heading.push_str("  LLM");
            }
            output.push_str(&format!("{}\n", heading.trim_end()));

            for (index, entry) in ranked.iter().enumerate() {
                let mut line = format!(
                    "{:>3}  {:<name_width$}  {:>5.2}  {}",
                    index + 1,
                    entry.source,
                    entry.score,
                    self.format_fit(entry, 7),
                    name_width = name_width
                );
                if show_llm {
                    line.push_str(&format!("  {}", recommendation_label(entry)));
                }
                output.push_str(&format!("{}\n", line.trim_end()));
            }

            output.push_str(&self.format_header("Score Chart", 3));
            for entry in &ranked {
                output.push_str(&format!(
                    "{:<name_width$} {} {:.2}\n",
                    entry.source,
                    self.format_bar(entry),
                    entry.score,
                    name_width = name_width
                ));
            }
        }

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "{} of {} resume(s) meet the fit threshold\n",
            report.fit_count(),
            report.entries.len()
        ));
        if let Some(best) = report.best_match() {
            output.push_str(&format!(
                "Best match: {} ({:.2}, {})\n",
                self.colorize(&best.source, Color::Cyan),
                best.score,
                best.fit
            ));
        }

        if show_llm {
            output.push_str(&self.format_header("🤖 LLM Assessments", 2));
            for entry in &ranked {
                output.push_str(&self.format_header(&entry.source, 3));
                if let Some(assessment) = &entry.assessment {
                    let text = if self.detailed {
                        assessment.analysis.clone()
                    } else {
                        TextProcessor::preview(&assessment.analysis, ANALYSIS_PREVIEW_CHARS)
                    };
                    output.push_str(&format!("{}\n", text));
                    if self.detailed {
                        output.push_str(&format!(
                            "({} in {}ms)\n",
                            assessment.model_used, assessment.processing_time_ms
                        ));
                    }
                } else if let Some(error) = &entry.llm_error {
                    output.push_str(&format!(
                        "{} {}\n",
                        self.colorize("Assessment failed:", Color::Yellow),
                        error
                    ));
                }
            }
        }

        if !report.skipped.is_empty() {
            output.push_str(&self.format_header("⚠️  Skipped Documents", 2));
            for doc in &report.skipped {
                output.push_str(&format!(
                    "• {}: {}\n",
                    self.colorize(&doc.source, Color::Yellow),
                    doc.reason
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 Resume Match Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            output.push_str(&format!(
                "**Embedding Model:** `{}` | **Fit Threshold:** {:.2}\n\n",
                report.metadata.embedding_model, report.threshold
            ));
        }

        output.push_str("## Job Description\n\n");
        for line in report.job_preview.lines() {
            output.push_str(&format!("> {}\n", line));
        }
        output.push('\n');

        output.push_str("## Results\n\n");
        let show_llm = report.has_assessments();
        if show_llm {
            output.push_str("| # | Resume | Score | Fit | LLM |\n");
            output.push_str("|---|--------|-------|-----|-----|\n");
        } else {
            output.push_str("| # | Resume | Score | Fit |\n");
            output.push_str("|---|--------|-------|-----|\n");
        }
        for (index, entry) in report.ranked().iter().enumerate() {
            let fit = if entry.fit.is_fit() { "✅ Fit" } else { "❌ Not Fit" };
            output.push_str(&format!(
                "| {} | {} | {:.2} | {} |",
                index + 1,
                Self::escape_cell(&entry.source),
                entry.score,
                fit
            ));
            if show_llm {
                output.push_str(&format!(" {} |", recommendation_label(entry)));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "\n**{} of {} resume(s) meet the fit threshold.**\n\n",
            report.fit_count(),
            report.entries.len()
        ));

        if show_llm {
            output.push_str("## 🤖 LLM Assessments\n\n");
            for entry in report.ranked() {
                output.push_str(&format!("### {}\n\n", entry.source));
                if let Some(assessment) = &entry.assessment {
                    output.push_str(&format!("{}\n\n", assessment.analysis));
                    output.push_str(&format!("*Model: {}*\n\n", assessment.model_used));
                } else if let Some(error) = &entry.llm_error {
                    output.push_str(&format!("⚠️ Assessment failed: {}\n\n", error));
                }
            }
        }

        if !report.skipped.is_empty() {
            output.push_str("## Skipped Documents\n\n");
            for doc in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", doc.source, doc.reason));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by Resume Matcher v{}*\n",
                report.metadata.version
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &MatchReport) -> HtmlTemplate {
        let rows = report
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| HtmlRow {
                rank: index + 1,
                source: entry.source.clone(),
                score: format!("{:.2}", entry.score),
                percentage: entry.percentage(),
                fit: entry.fit.to_string(),
                fit_class: if entry.fit.is_fit() { "fit" } else { "not-fit" },
                recommendation: recommendation_label(entry).to_string(),
            })
            .collect();

        let assessments = report
            .ranked()
            .into_iter()
            .filter_map(|entry| match (&entry.assessment, &entry.llm_error) {
                (Some(a), _) => Some(HtmlAssessment {
                    source: entry.source.clone(),
                    text: a.analysis.clone(),
                    is_error: false,
                }),
                (None, Some(error)) => Some(HtmlAssessment {
                    source: entry.source.clone(),
                    text: format!("Assessment failed: {}", error),
                    is_error: true,
                }),
                (None, None) => None,
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report
                .metadata
                .generated_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            processing_time: report.metadata.processing_time_ms,
            job_preview: report.job_preview.clone(),
            fit_count: report.fit_count(),
            total: report.entries.len(),
            threshold: format!("{:.2}", report.threshold),
            rows,
            has_llm: report.has_assessments(),
            assessments,
            has_skipped: !report.skipped.is_empty(),
            skipped: report.skipped.clone(),
            version: report.metadata.version.clone(),
            embedding_model: report.metadata.embedding_model.clone(),
            llm_model: report
                .metadata
                .llm_model
                .clone()
                .unwrap_or_else(|| "no LLM".to_string()),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ResumeMatcherError::OutputFormatting(format!("HTML template error: {}", e)))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, base_name: &str, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };

    format!("{}{}.{}", base_name, timestamp_suffix, extension)
}
