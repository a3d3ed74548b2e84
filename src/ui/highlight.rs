use colored::*;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use terminal_size::{terminal_size, Width};

const THEME: &str = "Solarized (dark)";
const DEFAULT_RULE_WIDTH: usize = 60;

/// Renders markdown-ish assistant text, boxing and highlighting fenced code blocks.
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let Some(theme) = self.theme_set.themes.get(THEME) else {
            return code.to_string();
        };

        let syntax = lang
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let ranges: Vec<(Style, &str)> = ranges;
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(line),
            }
        }
        output.push_str("\x1b[0m");

        output
    }

    /// Render a complete message. Text outside fences passes through unchanged;
    /// an unterminated fence is closed at the end of the text.
    pub fn render(&self, text: &str) -> String {
        let width = rule_width();
        let mut output = String::new();
        let mut code: Option<(Option<String>, String)> = None;

        for line in LinesWithEndings::from(text) {
            let fence = line.trim_start().strip_prefix("```");
            match (fence, code.take()) {
                (Some(lang), None) => {
                    let lang = lang.trim();
                    let lang = (!lang.is_empty()).then(|| lang.to_string());
                    output.push_str(&header(lang.as_deref(), width));
                    code = Some((lang, String::new()));
                }
                (Some(_), Some((lang, content))) => {
                    output.push_str(&self.highlight_code(&content, lang.as_deref()));
                    output.push_str(&footer(width));
                }
                (None, Some((lang, mut content))) => {
                    content.push_str(line);
                    code = Some((lang, content));
                }
                (None, None) => output.push_str(line),
            }
        }

        if let Some((lang, content)) = code {
            let mut content = content;
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            output.push_str(&self.highlight_code(&content, lang.as_deref()));
            output.push_str(&footer(width));
        }

        output
    }
}

fn rule_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_RULE_WIDTH)
        .clamp(20, 100)
}

fn header(lang: Option<&str>, width: usize) -> String {
    let label = lang.unwrap_or("code");
    let fill = width.saturating_sub(label.chars().count() + 4);
    format!(
        "{}[{}]{}\n",
        "┌─".dimmed(),
        label.cyan(),
        "─".repeat(fill).dimmed()
    )
}

fn footer(width: usize) -> String {
    format!("{}{}\n", "└".dimmed(), "─".repeat(width.saturating_sub(1)).dimmed())
}
