/*
 * parser.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Gemlet, a Gemini protocol client.
 *
 * Gemlet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Gemlet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Gemlet.  If not, see <http://www.gnu.org/licenses/>.
 */

//! GemText line classifier.
//!
//! Stateless per line except for one bit: whether we are inside a preformatted block.
//! Prefixes are tested longest first so `### ` is never read as `## `.

const PREFORMATTED_TOGGLE: &str = "```";

/// One classified line of a GemText document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GemTextLine {
    Heading1(String),
    Heading2(String),
    Heading3(String),
    Text(String),
    Quote(String),
    ListItem(String),
    Link { url: String, description: String },
    PreformattedStart(String),
    Preformatted(String),
    PreformattedEnd,
}

#[derive(Debug, Default)]
pub struct GemTextParser {
    preformatted: bool,
}

impl GemTextParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any open preformatted block (call before each new document).
    pub fn reset(&mut self) {
        self.preformatted = false;
    }

    pub fn in_preformatted_block(&self) -> bool {
        self.preformatted
    }

    pub fn parse_line(&mut self, line: &str) -> GemTextLine {
        if self.preformatted {
            if line.starts_with(PREFORMATTED_TOGGLE) {
                self.preformatted = false;
                return GemTextLine::PreformattedEnd;
            }
            return GemTextLine::Preformatted(line.to_string());
        }
        if let Some(alt) = line.strip_prefix(PREFORMATTED_TOGGLE) {
            self.preformatted = true;
            return GemTextLine::PreformattedStart(alt.to_string());
        }
        if let Some(rest) = line.strip_prefix("### ") {
            return GemTextLine::Heading3(rest.to_string());
        }
        if let Some(rest) = line.strip_prefix("## ") {
            return GemTextLine::Heading2(rest.to_string());
        }
        if let Some(rest) = line.strip_prefix("# ") {
            return GemTextLine::Heading1(rest.to_string());
        }
        if let Some(rest) = line.strip_prefix("* ") {
            return GemTextLine::ListItem(rest.to_string());
        }
        if let Some(rest) = line.strip_prefix('>') {
            return GemTextLine::Quote(rest.to_string());
        }
        if let Some(rest) = line.strip_prefix("=>") {
            return parse_link(rest);
        }
        GemTextLine::Text(line.to_string())
    }

    /// Parse a whole document, starting from a clean state.
    pub fn parse_document<'a, I>(&mut self, lines: I) -> Vec<GemTextLine>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.reset();
        lines.into_iter().map(|l| self.parse_line(l)).collect()
    }
}

fn parse_link(rest: &str) -> GemTextLine {
    let rest = rest.trim();
    let (url, description) = match rest.split_once(char::is_whitespace) {
        Some((url, description)) => (url, description.trim_start()),
        None => (rest, ""),
    };
    GemTextLine::Link {
        url: url.to_string(),
        description: description.to_string(),
    }
}

/// Parse a complete GemText string (LF or CRLF line endings).
pub fn parse(text: &str) -> Vec<GemTextLine> {
    GemTextParser::new().parse_document(text.lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, description: &str) -> GemTextLine {
        GemTextLine::Link {
            url: url.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn headings_need_space() {
        let mut p = GemTextParser::new();
        assert_eq!(p.parse_line("# h"), GemTextLine::Heading1("h".into()));
        assert_eq!(p.parse_line("## h"), GemTextLine::Heading2("h".into()));
        assert_eq!(p.parse_line("### h"), GemTextLine::Heading3("h".into()));
        assert_eq!(p.parse_line("#h"), GemTextLine::Text("#h".into()));
        assert_eq!(p.parse_line("###h"), GemTextLine::Text("###h".into()));
        assert_eq!(p.parse_line("#### h"), GemTextLine::Text("#### h".into()));
    }

    #[test]
    fn list_and_quote() {
        let mut p = GemTextParser::new();
        assert_eq!(p.parse_line("* item"), GemTextLine::ListItem("item".into()));
        assert_eq!(p.parse_line("*item"), GemTextLine::Text("*item".into()));
        assert_eq!(p.parse_line(">quoted"), GemTextLine::Quote("quoted".into()));
        assert_eq!(p.parse_line("> quoted"), GemTextLine::Quote(" quoted".into()));
    }

    #[test]
    fn links() {
        let mut p = GemTextParser::new();
        assert_eq!(p.parse_line("=> url desc"), link("url", "desc"));
        assert_eq!(p.parse_line("=>url"), link("url", ""));
        assert_eq!(p.parse_line("=>  gemini://a.b/c \t a  long description "), link("gemini://a.b/c", "a  long description"));
        assert_eq!(p.parse_line("=>"), link("", ""));
    }

    #[test]
    fn preformatted_block() {
        let lines = parse("```\ntext\n```");
        assert_eq!(
            lines,
            vec![
                GemTextLine::PreformattedStart(String::new()),
                GemTextLine::Preformatted("text".into()),
                GemTextLine::PreformattedEnd,
            ]
        );
    }

    #[test]
    fn markup_inside_block_is_verbatim() {
        let lines = parse("```rust alt\n# not a heading\n=> not a link\n``` trailing\n# heading");
        assert_eq!(
            lines,
            vec![
                GemTextLine::PreformattedStart("rust alt".into()),
                GemTextLine::Preformatted("# not a heading".into()),
                GemTextLine::Preformatted("=> not a link".into()),
                GemTextLine::PreformattedEnd,
                GemTextLine::Heading1("heading".into()),
            ]
        );
    }

    #[test]
    fn reset_clears_block_state() {
        let mut p = GemTextParser::new();
        p.parse_line("```");
        assert!(p.in_preformatted_block());
        let lines = p.parse_document(["# h"]);
        assert_eq!(lines, vec![GemTextLine::Heading1("h".into())]);
    }
}
