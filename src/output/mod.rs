use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::{LanguageSummary, TranscriptResult};

/// Render a transcript for the chosen output format
pub fn format_transcript(result: &TranscriptResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let body = result
                .segments
                .iter()
                .map(|segment| segment.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(format!("{}\n\n{}", result.title, body))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}

/// Render a language listing for the chosen output format
pub fn format_languages(summary: &LanguageSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut lines = Vec::with_capacity(summary.languages.len() + 1);
            if summary.default_lang.is_empty() {
                lines.push("Default language: (none)".to_string());
            } else {
                lines.push(format!("Default language: {}", summary.default_lang));
            }
            for option in &summary.languages {
                let marker = if option.is_auto { " (auto-generated)" } else { "" };
                lines.push(format!("  {} - {}{}", option.code, option.name, marker));
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
    }
}

/// Save rendered output to a file
pub async fn save_to_file(content: &str, path: &Path) -> Result<()> {
    fs_err::write(path, content)?;
    Ok(())
}

/// Print rendered output to the console
pub fn print_to_console(content: &str) {
    println!("{}", content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageOption;
    use crate::subtitles::SubtitleCue;

    #[test]
    fn test_format_transcript_text_joins_segments() {
        let result = TranscriptResult {
            title: "My Video".to_string(),
            segments: vec![
                SubtitleCue::text_only("Hello world."),
                SubtitleCue::text_only("Second segment."),
            ],
        };
        let text = format_transcript(&result, OutputFormat::Text).unwrap();
        assert_eq!(text, "My Video\n\nHello world. Second segment.");
    }

    #[test]
    fn test_format_transcript_json() {
        let result = TranscriptResult {
            title: "T".to_string(),
            segments: vec![SubtitleCue::text_only("hi")],
        };
        let json = format_transcript(&result, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "T");
        assert_eq!(value["segments"][0]["text"], "hi");
    }

    #[test]
    fn test_format_languages_text() {
        let summary = LanguageSummary {
            default_lang: "en".to_string(),
            languages: vec![
                LanguageOption {
                    code: "en".to_string(),
                    name: "English".to_string(),
                    is_auto: false,
                },
                LanguageOption {
                    code: "es".to_string(),
                    name: "Spanish".to_string(),
                    is_auto: true,
                },
            ],
        };
        let text = format_languages(&summary, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Default language: en\n  en - English\n  es - Spanish (auto-generated)"
        );
    }
}
