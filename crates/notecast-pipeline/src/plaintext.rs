//! Plain-text serialization for social destinations.
//!
//! Structure is expressed through the destination's glyph table (emoji
//! bullets, circled numbering, heading prefixes). The pass ends with a
//! defensive cleanup that strips any residual markup and collapses runs of
//! blank lines.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::extension::RenderContext;
use crate::html::ExtRender;
use crate::placeholder::RemoteOutcome;
use crate::tree::{Token, TokenKind};

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>\n]*>").unwrap());
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

pub(crate) fn render_document(root: &Token, ctx: &RenderContext<'_>, ext: &ExtRender<'_>) -> String {
    let mut out = String::new();
    for child in &root.children {
        out.push_str(&render_token(child, ctx, ext, 0));
    }
    out
}

/// Strip residual markup and collapse blank-line runs.
///
/// Raw HTML fragments in the source pass through the tree untouched; plain
/// destinations drop the tags and keep the text.
#[must_use]
pub fn cleanup(text: &str) -> String {
    let stripped = TAG_PATTERN.replace_all(text, "");
    let unescaped = stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let collapsed = BLANK_RUN.replace_all(&unescaped, "\n\n");
    collapsed.trim().to_owned()
}

pub(crate) fn render_children(
    token: &Token,
    ctx: &RenderContext<'_>,
    ext: &ExtRender<'_>,
    depth: usize,
) -> String {
    let mut out = String::new();
    for child in &token.children {
        out.push_str(&render_token(child, ctx, ext, depth));
    }
    out
}

#[allow(clippy::too_many_lines)]
pub(crate) fn render_token(
    token: &Token,
    ctx: &RenderContext<'_>,
    ext: &ExtRender<'_>,
    depth: usize,
) -> String {
    let inner = render_children(token, ctx, ext, depth);
    if let Some(text) = ext(token, &inner, ctx) {
        return text;
    }
    match &token.kind {
        TokenKind::Document => inner,
        TokenKind::Paragraph => format!("{}\n\n", inner.trim_end()),
        TokenKind::Heading { level, number, .. } => {
            let prefix = ctx.style.heading_prefix(*level);
            match number {
                Some(number) => format!("{prefix}{number} {}\n\n", inner.trim()),
                None => format!("{prefix}{}\n\n", inner.trim()),
            }
        }
        TokenKind::Quote | TokenKind::Callout { .. } => {
            let mut out = String::new();
            for line in inner.trim_end().lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    writeln!(out, "▎{line}").unwrap();
                }
            }
            out.push('\n');
            out
        }
        TokenKind::Widget { source, .. } => format!("{source}\n\n"),
        TokenKind::CodeBlock { source, .. } => {
            format!("{}\n\n", source.trim_end())
        }
        TokenKind::List { start } => {
            let mut out = String::new();
            let indent = "  ".repeat(depth);
            let mut ordinal = *start;
            for item in &token.children {
                let marker = match &mut ordinal {
                    Some(n) => {
                        let marker = ctx.style.ordered_marker(*n);
                        *n += 1;
                        marker
                    }
                    None => ctx.style.bullet.clone(),
                };
                let task = match &item.kind {
                    TokenKind::Item { task } => *task,
                    _ => None,
                };
                let glyph = match task {
                    Some(true) => format!("{} ", ctx.style.task_checked),
                    Some(false) => format!("{} ", ctx.style.task_unchecked),
                    None => String::new(),
                };
                let body = render_children(item, ctx, ext, depth + 1);
                let body = body.trim_end();
                writeln!(out, "{indent}{marker} {glyph}{}", body.trim_start()).unwrap();
            }
            if depth == 0 {
                out.push('\n');
            }
            out
        }
        TokenKind::Item { .. } => inner,
        TokenKind::Table { .. } => format!("{}\n", inner.trim_end()),
        TokenKind::TableHead | TokenKind::TableRow => {
            let cells: Vec<String> = token
                .children
                .iter()
                .map(|cell| render_children(cell, ctx, ext, depth).trim().to_owned())
                .collect();
            format!("{}\n", cells.join(" | "))
        }
        TokenKind::TableCell => inner,
        TokenKind::Emphasis | TokenKind::Strong | TokenKind::Strikethrough | TokenKind::Mark => {
            inner
        }
        TokenKind::Link { .. } => inner,
        TokenKind::Image { url, .. } => {
            let alt = token.plain_text();
            if alt.is_empty() {
                format!("[image: {url}]")
            } else {
                format!("[image: {alt}]")
            }
        }
        TokenKind::LocalImage { origin, .. } => {
            let alt = token.plain_text();
            if alt.is_empty() {
                format!("[image: {origin}]")
            } else {
                format!("[image: {alt}]")
            }
        }
        TokenKind::Text(text) => text.clone(),
        TokenKind::InlineCode(code) => format!("`{code}`"),
        TokenKind::Html(_) => String::new(),
        TokenKind::Icon { .. } => String::new(),
        TokenKind::FootnoteRef { label, index } => {
            index.map_or_else(|| format!("[{label}]"), |i| format!("[{i}]"))
        }
        TokenKind::FootnoteSection => format!("{inner}\n"),
        TokenKind::FootnoteDef { index, label } => {
            let marker = index.map_or_else(|| format!("[{label}]"), |i| format!("[{i}]"));
            format!("{marker} {}\n", inner.trim())
        }
        TokenKind::MathInline {
            source,
            placeholder,
        }
        | TokenKind::MathBlock {
            source,
            placeholder,
        } => match placeholder.and_then(|id| ctx.placeholders.get(id)) {
            Some(RemoteOutcome::Rendered(text)) => text.clone(),
            _ => format!("${source}$"),
        },
        TokenKind::Rule => "————————\n\n".to_owned(),
        TokenKind::HardBreak | TokenKind::SoftBreak => "\n".to_owned(),
    }
}
