//! Rich-HTML serialization.
//!
//! Produces markup for the rich-HTML destination: structural elements only,
//! no scripts, suitable for strict downstream sanitization. Extension-claimed
//! kinds are dispatched out; every kind also has a base default so an
//! unclaimed node renders instead of aborting the parse.

use std::fmt::Write;

use crate::extension::RenderContext;
use crate::placeholder::RemoteOutcome;
use crate::tree::{Token, TokenKind};

/// Render dispatch callback: `Some(html)` when an extension claims the kind.
pub(crate) type ExtRender<'a> =
    dyn Fn(&Token, &str, &RenderContext<'_>) -> Option<String> + 'a;

/// Escape text for HTML contexts (element content and attribute values).
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn render_document(root: &Token, ctx: &RenderContext<'_>, ext: &ExtRender<'_>) -> String {
    render_children(root, ctx, ext)
}

pub(crate) fn render_children(token: &Token, ctx: &RenderContext<'_>, ext: &ExtRender<'_>) -> String {
    let mut out = String::new();
    for child in &token.children {
        out.push_str(&render_token(child, ctx, ext));
    }
    out
}

pub(crate) fn render_token(token: &Token, ctx: &RenderContext<'_>, ext: &ExtRender<'_>) -> String {
    let inner = render_children(token, ctx, ext);
    if let Some(html) = ext(token, &inner, ctx) {
        return html;
    }
    default_render(token, &inner, ctx, ext)
}

/// Wrap resolved async content in its placeholder element so late callers can
/// still patch it by id.
#[must_use]
pub fn async_span(
    id: Option<crate::placeholder::PlaceholderId>,
    ctx: &RenderContext<'_>,
    fallback: &str,
) -> String {
    match id {
        Some(id) => {
            let content = match ctx.placeholders.get(id) {
                Some(RemoteOutcome::Rendered(markup)) => markup.clone(),
                Some(RemoteOutcome::Failed(reason)) => {
                    format!(r#"<code class="nc-failed">{}</code>"#, escape_html(reason))
                }
                None => fallback.to_owned(),
            };
            format!(r#"<span id="{}">{content}</span>"#, id.element_id())
        }
        None => fallback.to_owned(),
    }
}

#[allow(clippy::too_many_lines)]
fn default_render(token: &Token, inner: &str, ctx: &RenderContext<'_>, ext: &ExtRender<'_>) -> String {
    match &token.kind {
        TokenKind::Document => inner.to_owned(),
        TokenKind::Paragraph => format!("<p>{inner}</p>"),
        TokenKind::Heading { level, anchor, .. } => match anchor {
            Some(id) => format!(r#"<h{level} id="{}">{inner}</h{level}>"#, escape_html(id)),
            None => format!("<h{level}>{inner}</h{level}>"),
        },
        TokenKind::Quote | TokenKind::Callout { .. } => {
            format!("<blockquote>{inner}</blockquote>")
        }
        TokenKind::Widget { source, .. } => {
            format!("<pre>{}</pre>", escape_html(source))
        }
        TokenKind::CodeBlock {
            lang,
            source,
            rendered,
        } => match rendered {
            Some(markup) => markup.clone(),
            None => match lang {
                Some(lang) => format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(lang),
                    escape_html(source)
                ),
                None => format!("<pre><code>{}</code></pre>", escape_html(source)),
            },
        },
        TokenKind::List { start } => match start {
            Some(1) => format!("<ol>{inner}</ol>"),
            Some(n) => format!(r#"<ol start="{n}">{inner}</ol>"#),
            None => format!("<ul>{inner}</ul>"),
        },
        TokenKind::Item { task } => match task {
            Some(true) => {
                format!(r#"<li><input type="checkbox" checked disabled> {inner}</li>"#)
            }
            Some(false) => format!(r#"<li><input type="checkbox" disabled> {inner}</li>"#),
            None => format!("<li>{inner}</li>"),
        },
        TokenKind::Table { .. } => format!("<table>{inner}</table>"),
        TokenKind::TableHead => {
            // Head children are cells; they render as <th> instead of <td>.
            let mut out = String::from("<thead><tr>");
            for cell in &token.children {
                let cell_inner = render_children(cell, ctx, ext);
                write!(out, "<th>{cell_inner}</th>").unwrap();
            }
            out.push_str("</tr></thead>");
            out
        }
        TokenKind::TableRow => format!("<tr>{inner}</tr>"),
        TokenKind::TableCell => format!("<td>{inner}</td>"),
        TokenKind::Emphasis => format!("<em>{inner}</em>"),
        TokenKind::Strong => format!("<strong>{inner}</strong>"),
        TokenKind::Strikethrough => format!("<s>{inner}</s>"),
        TokenKind::Link { url, title, .. } => {
            if title.is_empty() {
                format!(r#"<a href="{}">{inner}</a>"#, escape_html(url))
            } else {
                format!(
                    r#"<a href="{}" title="{}">{inner}</a>"#,
                    escape_html(url),
                    escape_html(title)
                )
            }
        }
        TokenKind::Image { url, title } => {
            let alt = token.plain_text();
            if title.is_empty() {
                format!(
                    r#"<img src="{}" alt="{}">"#,
                    escape_html(url),
                    escape_html(&alt)
                )
            } else {
                format!(
                    r#"<img src="{}" title="{}" alt="{}">"#,
                    escape_html(url),
                    escape_html(title),
                    escape_html(&alt)
                )
            }
        }
        TokenKind::LocalImage { origin, key } => {
            let src = key.as_deref().unwrap_or(origin);
            format!(
                r#"<img src="{}" alt="{}">"#,
                escape_html(src),
                escape_html(&token.plain_text())
            )
        }
        TokenKind::Text(text) => escape_html(text),
        TokenKind::InlineCode(code) => format!("<code>{}</code>", escape_html(code)),
        TokenKind::Html(html) => html.clone(),
        TokenKind::Mark => format!("<mark>{inner}</mark>"),
        TokenKind::Icon { name } => {
            format!(r#"<span class="nc-icon nc-icon-{}"></span>"#, escape_html(name))
        }
        TokenKind::FootnoteRef { label, index } => {
            let text = index.map_or_else(|| label.clone(), |i| i.to_string());
            format!("<sup>{}</sup>", escape_html(&text))
        }
        TokenKind::FootnoteSection => {
            format!(r#"<section class="footnotes"><ol>{inner}</ol></section>"#)
        }
        TokenKind::FootnoteDef { .. } => format!("<li>{inner}</li>"),
        TokenKind::MathInline {
            source,
            placeholder,
        } => async_span(
            *placeholder,
            ctx,
            &format!("<code>{}</code>", escape_html(source)),
        ),
        TokenKind::MathBlock {
            source,
            placeholder,
        } => async_span(
            *placeholder,
            ctx,
            &format!("<pre><code>{}</code></pre>", escape_html(source)),
        ),
        TokenKind::Rule => "<hr>".to_owned(),
        TokenKind::HardBreak => "<br>".to_owned(),
        TokenKind::SoftBreak => "\n".to_owned(),
    }
}
