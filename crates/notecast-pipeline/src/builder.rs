//! Tree building over the pulldown-cmark event stream.
//!
//! pulldown-cmark is the token-producing primitive; the builder folds its
//! event stream into an owned [`Token`] tree, applies extension inline rules
//! to text segments, classifies blockquotes, and hoists footnote definitions
//! into a trailing section.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::extension::InlineRule;
use crate::tree::{QuoteClass, Token, TokenKind, classify_quote};

/// Parser options used for every parse.
///
/// GitHub alert parsing stays off: blockquote markers are classified by
/// [`classify_quote`] instead, which also covers non-GFM marker names.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH
}

/// How a parser-event container maps into the tree.
enum FrameMode {
    /// Becomes a token owning its children.
    Keep(TokenKind),
    /// Children splice into the parent (unsupported container markup).
    Splice,
    /// Children are dropped (metadata blocks).
    Discard,
}

struct Frame {
    mode: FrameMode,
    children: Vec<Token>,
}

impl Frame {
    fn new(mode: FrameMode) -> Self {
        Self {
            mode,
            children: Vec::new(),
        }
    }
}

/// Builds a [`Token`] tree from markdown source.
pub struct TreeBuilder<'r> {
    rules: &'r [InlineRule],
}

impl<'r> TreeBuilder<'r> {
    #[must_use]
    pub fn new(rules: &'r [InlineRule]) -> Self {
        Self { rules }
    }

    /// Parse `text` into a document tree.
    #[must_use]
    pub fn build(&self, text: &str) -> Token {
        let parser = Parser::new_ext(text, parser_options());
        let mut stack = vec![Frame::new(FrameMode::Keep(TokenKind::Document))];
        let mut footnotes: Vec<Token> = Vec::new();

        for event in parser {
            match event {
                Event::Start(tag) => stack.push(Frame::new(frame_mode_for(&tag))),
                Event::End(tag) => self.end_frame(&mut stack, &mut footnotes, tag),
                Event::Text(text) => self.text(&mut stack, &text),
                Event::Code(code) => {
                    push_token(&mut stack, Token::new(TokenKind::InlineCode(code.to_string())));
                }
                Event::InlineMath(math) => push_token(
                    &mut stack,
                    Token::new(TokenKind::MathInline {
                        source: math.to_string(),
                        placeholder: None,
                    }),
                ),
                Event::DisplayMath(math) => push_token(
                    &mut stack,
                    Token::new(TokenKind::MathBlock {
                        source: math.to_string(),
                        placeholder: None,
                    }),
                ),
                Event::Html(html) | Event::InlineHtml(html) => {
                    if let Some(Frame {
                        mode: FrameMode::Keep(TokenKind::Html(buffer)),
                        ..
                    }) = stack.last_mut()
                    {
                        buffer.push_str(&html);
                    } else {
                        push_token(&mut stack, Token::new(TokenKind::Html(html.to_string())));
                    }
                }
                Event::FootnoteReference(label) => push_token(
                    &mut stack,
                    Token::new(TokenKind::FootnoteRef {
                        label: label.to_string(),
                        index: None,
                    }),
                ),
                Event::SoftBreak => {
                    if let Some(source) = code_source(&mut stack) {
                        source.push('\n');
                    } else {
                        push_token(&mut stack, Token::new(TokenKind::SoftBreak));
                    }
                }
                Event::HardBreak => push_token(&mut stack, Token::new(TokenKind::HardBreak)),
                Event::Rule => push_token(&mut stack, Token::new(TokenKind::Rule)),
                Event::TaskListMarker(checked) => {
                    // The marker arrives inside the item it belongs to.
                    for frame in stack.iter_mut().rev() {
                        if let FrameMode::Keep(TokenKind::Item { task }) = &mut frame.mode {
                            *task = Some(checked);
                            break;
                        }
                    }
                }
            }
        }

        let mut root = stack
            .pop()
            .unwrap_or_else(|| Frame::new(FrameMode::Keep(TokenKind::Document)));
        if !footnotes.is_empty() {
            root.children
                .push(Token::with_children(TokenKind::FootnoteSection, footnotes));
        }
        Token::with_children(TokenKind::Document, root.children)
    }

    fn text(&self, stack: &mut Vec<Frame>, text: &str) {
        if let Some(source) = code_source(stack) {
            source.push_str(text);
            return;
        }
        let Some(frame) = stack.last_mut() else {
            return;
        };
        self.apply_inline_rules(text, &mut frame.children);
    }

    /// Split a text segment on inline-rule matches; leftmost match wins,
    /// ties go to the earlier-registered rule.
    fn apply_inline_rules(&self, text: &str, out: &mut Vec<Token>) {
        let mut rest = text;
        while !rest.is_empty() {
            let mut best: Option<(usize, usize, usize)> = None;
            for (index, rule) in self.rules.iter().enumerate() {
                if let Some(found) = rule.find(rest) {
                    let earlier = best.is_none_or(|(start, _, _)| found.start() < start);
                    if earlier {
                        best = Some((found.start(), found.end(), index));
                    }
                }
            }
            let Some((start, end, index)) = best else {
                out.push(Token::new(TokenKind::Text(rest.to_owned())));
                return;
            };
            if start > 0 {
                out.push(Token::new(TokenKind::Text(rest[..start].to_owned())));
            }
            if let Some(token) = self.rules[index].build_token(&rest[start..end]) {
                out.push(token);
            }
            rest = &rest[end..];
        }
    }

    fn end_frame(&self, stack: &mut Vec<Frame>, footnotes: &mut Vec<Token>, _tag: TagEnd) {
        let Some(frame) = stack.pop() else {
            return;
        };
        match frame.mode {
            FrameMode::Splice => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.extend(frame.children);
                }
            }
            FrameMode::Discard => {}
            FrameMode::Keep(kind) => {
                let token = finish_token(kind, frame.children);
                if matches!(token.kind, TokenKind::FootnoteDef { .. }) {
                    footnotes.push(token);
                } else {
                    push_token(stack, token);
                }
            }
        }
    }
}

/// Mutable access to the source buffer of an open code block frame.
fn code_source(stack: &mut [Frame]) -> Option<&mut String> {
    match stack.last_mut() {
        Some(Frame {
            mode: FrameMode::Keep(TokenKind::CodeBlock { source, .. }),
            ..
        }) => Some(source),
        _ => None,
    }
}

fn push_token(stack: &mut [Frame], token: Token) {
    if let Some(frame) = stack.last_mut() {
        frame.children.push(token);
    }
}

fn frame_mode_for(tag: &Tag<'_>) -> FrameMode {
    match tag {
        Tag::Paragraph => FrameMode::Keep(TokenKind::Paragraph),
        Tag::Heading { level, .. } => FrameMode::Keep(TokenKind::Heading {
            level: heading_level_to_num(*level),
            number: None,
            anchor: None,
        }),
        Tag::BlockQuote(_) => FrameMode::Keep(TokenKind::Quote),
        Tag::CodeBlock(kind) => {
            let lang = match kind {
                CodeBlockKind::Fenced(info) if !info.is_empty() => {
                    info.split_whitespace().next().map(str::to_owned)
                }
                _ => None,
            };
            FrameMode::Keep(TokenKind::CodeBlock {
                lang,
                source: String::new(),
                rendered: None,
            })
        }
        Tag::HtmlBlock => FrameMode::Keep(TokenKind::Html(String::new())),
        Tag::List(start) => FrameMode::Keep(TokenKind::List { start: *start }),
        Tag::Item => FrameMode::Keep(TokenKind::Item { task: None }),
        Tag::FootnoteDefinition(label) => FrameMode::Keep(TokenKind::FootnoteDef {
            label: label.to_string(),
            index: None,
        }),
        Tag::Table(alignments) => FrameMode::Keep(TokenKind::Table {
            columns: alignments.len(),
        }),
        Tag::TableHead => FrameMode::Keep(TokenKind::TableHead),
        Tag::TableRow => FrameMode::Keep(TokenKind::TableRow),
        Tag::TableCell => FrameMode::Keep(TokenKind::TableCell),
        Tag::Emphasis => FrameMode::Keep(TokenKind::Emphasis),
        Tag::Strong => FrameMode::Keep(TokenKind::Strong),
        Tag::Strikethrough => FrameMode::Keep(TokenKind::Strikethrough),
        Tag::Link {
            dest_url, title, ..
        } => FrameMode::Keep(TokenKind::Link {
            url: dest_url.to_string(),
            title: title.to_string(),
            reference: None,
        }),
        Tag::Image {
            dest_url, title, ..
        } => {
            if is_local_url(dest_url) {
                FrameMode::Keep(TokenKind::LocalImage {
                    origin: dest_url.to_string(),
                    key: None,
                })
            } else {
                FrameMode::Keep(TokenKind::Image {
                    url: dest_url.to_string(),
                    title: title.to_string(),
                })
            }
        }
        Tag::MetadataBlock(_) => FrameMode::Discard,
        Tag::DefinitionList
        | Tag::DefinitionListTitle
        | Tag::DefinitionListDefinition
        | Tag::Superscript
        | Tag::Subscript => FrameMode::Splice,
    }
}

/// Finish a popped frame into a token, classifying quotes.
fn finish_token(kind: TokenKind, children: Vec<Token>) -> Token {
    match kind {
        TokenKind::Quote => classify_quote_token(children),
        other => Token::with_children(other, children),
    }
}

/// Turn a finished blockquote into its classified variant.
///
/// The classification inspects the first text line of the first paragraph;
/// the marker line is consumed by callout and widget variants.
fn classify_quote_token(mut children: Vec<Token>) -> Token {
    let first_line = children
        .first()
        .filter(|child| child.kind == TokenKind::Paragraph)
        .and_then(|paragraph| paragraph.children.first())
        .and_then(|token| match &token.kind {
            TokenKind::Text(text) => Some(text.clone()),
            _ => None,
        });

    let Some(line) = first_line else {
        return Token::with_children(TokenKind::Quote, children);
    };

    match classify_quote(&line) {
        QuoteClass::Plain => Token::with_children(TokenKind::Quote, children),
        QuoteClass::Callout { kind, title } => {
            strip_marker_line(&mut children);
            Token::with_children(TokenKind::Callout { kind, title }, children)
        }
        QuoteClass::Widget => {
            strip_marker_line(&mut children);
            let source = Token::with_children(TokenKind::Quote, children)
                .plain_text()
                .trim()
                .to_owned();
            Token::new(TokenKind::Widget {
                source,
                placeholder: None,
            })
        }
    }
}

/// Remove the `[!...]` marker line from the first paragraph of a classified
/// quote: the leading text token and, when present, the break after it.
fn strip_marker_line(children: &mut Vec<Token>) {
    let Some(paragraph) = children.first_mut() else {
        return;
    };
    if !paragraph.children.is_empty() {
        paragraph.children.remove(0);
    }
    if matches!(
        paragraph.children.first().map(|t| &t.kind),
        Some(TokenKind::SoftBreak | TokenKind::HardBreak)
    ) {
        paragraph.children.remove(0);
    }
    if paragraph.children.is_empty() {
        children.remove(0);
    }
}

fn is_local_url(url: &str) -> bool {
    !(url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("data:")
        || url.starts_with("mailto:"))
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
