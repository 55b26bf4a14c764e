//! # Style Sheet Rewriting Module / 样式表重写模块
//!
//! Parses a style sheet into a [`StyleDocument`], rewrites the hex color
//! literals found in declaration values through the deficiency simulation,
//! and serializes the document back to text.
//!
//! Tokenization is done by `cssparser`. Every token keeps its exact source
//! text, so serialization reproduces the input byte for byte except for the
//! color literals that were rewritten.
//!
//! 将样式表解析为 [`StyleDocument`]，通过缺陷模拟重写声明值中的十六进制颜色字面量，
//! 然后将文档序列化回文本。
//! 分词由 `cssparser` 完成。每个 token 都保留其精确的源文本，
//! 因此序列化结果除被重写的颜色字面量外与输入逐字节一致。
//!
//! ## Limitations / 限制
//!
//! Only `#`-prefixed literals at the top level of a declaration value are
//! treated as colors. Named colors, `rgb()`/`hsl()` and anything inside a
//! function (gradients, `var()` fallbacks) pass through unchanged, as do
//! `#id` selectors.

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token};
use std::fmt;

use crate::core::color::HexColor;
use crate::core::error::{CvdError, CvdResult};
use crate::core::models::Deficiency;

/// Structural representation of a parsed style sheet.
/// 已解析样式表的结构化表示。
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDocument {
    pub items: Vec<Item>,
}

/// One entry in a rule list or declaration block.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Whitespace and comments between entries.
    Trivia(String),
    Rule(Rule),
    Declaration(Declaration),
    /// A statement that is neither a rule nor a declaration; kept verbatim.
    Other { nodes: Vec<Node>, terminator: String },
}

/// A qualified rule or an at-rule. Statement at-rules (`@import ...;`) have no block.
/// 限定规则或 at 规则。语句型 at 规则（`@import ...;`）没有块。
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub prelude: Vec<Node>,
    pub block: Option<Block>,
    pub terminator: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub open: String,
    pub items: Vec<Item>,
    pub close: String,
}

/// `name:` followed by a value, up to the `;` (or the end of the block).
/// `name:` 后跟值，直到 `;`（或块结束）。
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name tokens, including the colon.
    pub name: Vec<Node>,
    pub value: Vec<Node>,
    pub terminator: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Color(ColorLiteral),
    /// A function or bracketed group with its own children.
    Group {
        open: String,
        children: Vec<Node>,
        close: String,
    },
}

/// A `#`-prefixed token in a declaration value.
///
/// The text only becomes a color if it matches the hex color grammar;
/// anything else (`#12345`, `#zz`) is left as written.
///
/// 声明值中以 `#` 开头的 token。
/// 只有匹配十六进制颜色语法时才被视为颜色；其他内容（`#12345`、`#zz`）保持原样。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLiteral {
    text: String,
}

impl ColorLiteral {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_hex(&self) -> Option<HexColor> {
        if self.text.starts_with('#') {
            HexColor::parse(&self.text)
        } else {
            None
        }
    }

    /// Replaces the literal with its simulated value. Returns `false` when the
    /// text is not a hex color and was left untouched.
    pub fn simulate(&mut self, deficiency: Deficiency) -> bool {
        match self.as_hex() {
            Some(color) => {
                self.text = color.simulate(deficiency).to_hex();
                true
            }
            None => false,
        }
    }
}

/// Output of [`rewrite_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub css: String,
    /// Number of literals replaced by their simulated color.
    pub rewritten: usize,
    /// `#` literals that did not match the hex grammar.
    pub passed_through: usize,
}

/// Rewrites every hex color literal of `style_text` through the `deficiency` simulation.
///
/// Fails with [`CvdError::MalformedStyleSheet`] when the text cannot be parsed.
/// The output is deterministic for a given input and deficiency.
///
/// 通过 `deficiency` 模拟重写 `style_text` 中的每个十六进制颜色字面量。
/// 文本无法解析时返回 [`CvdError::MalformedStyleSheet`]。
/// 对于给定的输入和缺陷类型，输出是确定的。
pub fn rewrite(style_text: &str, deficiency: Deficiency) -> CvdResult<String> {
    rewrite_detailed(style_text, deficiency).map(|r| r.css)
}

pub fn rewrite_detailed(style_text: &str, deficiency: Deficiency) -> CvdResult<Rewrite> {
    let mut document = StyleDocument::parse(style_text)?;
    let mut rewritten = 0;
    let mut passed_through = 0;

    document.for_each_color(|literal| {
        if literal.simulate(deficiency) {
            rewritten += 1;
        } else {
            passed_through += 1;
        }
    });

    Ok(Rewrite {
        css: document.to_css(),
        rewritten,
        passed_through,
    })
}

impl StyleDocument {
    pub fn parse(css: &str) -> CvdResult<Self> {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let tokens = tokenize(&mut parser).map_err(into_malformed)?;
        Ok(Self {
            items: structure(tokens),
        })
    }

    /// Visits every color literal in document order.
    /// 按文档顺序访问每个颜色字面量。
    pub fn for_each_color<F: FnMut(&mut ColorLiteral)>(&mut self, mut f: F) {
        visit_items(&mut self.items, &mut f);
    }

    pub fn colors(&self) -> Vec<&ColorLiteral> {
        let mut out = Vec::new();
        collect_items(&self.items, &mut out);
        out
    }

    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_items(&self.items, &mut out);
        out
    }
}

impl fmt::Display for StyleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Curly,
    Parenthesis,
    Square,
    Function,
}

impl BlockKind {
    fn closing(self) -> char {
        match self {
            BlockKind::Curly => '}',
            BlockKind::Parenthesis | BlockKind::Function => ')',
            BlockKind::Square => ']',
        }
    }
}

/// Flat-or-nested token with its source text.
#[derive(Debug)]
enum Tok {
    Trivia(String),
    Colon(String),
    Semicolon(String),
    AtKeyword(String),
    Hash(String),
    Text(String),
    Block {
        kind: BlockKind,
        open: String,
        children: Vec<Tok>,
        close: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum SyntaxError {
    BadString,
    BadUrl,
    UnbalancedClose(String),
    UnclosedBlock(char),
    UnterminatedComment,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::BadString => f.write_str("unterminated string"),
            SyntaxError::BadUrl => f.write_str("invalid url()"),
            SyntaxError::UnbalancedClose(text) => write!(f, "unexpected '{text}'"),
            SyntaxError::UnclosedBlock(close) => write!(f, "block is never closed, expected '{close}'"),
            SyntaxError::UnterminatedComment => f.write_str("unterminated comment"),
        }
    }
}

fn into_malformed(error: ParseError<'_, SyntaxError>) -> CvdError {
    let reason = match error.kind {
        ParseErrorKind::Custom(e) => e.to_string(),
        ParseErrorKind::Basic(kind) => format!("{kind:?}"),
    };
    CvdError::MalformedStyleSheet {
        line: error.location.line + 1,
        column: error.location.column,
        reason,
    }
}

fn tokenize<'i, 't>(parser: &mut Parser<'i, 't>) -> Result<Vec<Tok>, ParseError<'i, SyntaxError>> {
    let mut out = Vec::new();
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let text = parser.slice_from(start).to_string();

        let tok = match token {
            Token::WhiteSpace(_) => Tok::Trivia(text),
            Token::Comment(_) => {
                if text.len() < 4 || !text.ends_with("*/") {
                    return Err(parser.new_custom_error(SyntaxError::UnterminatedComment));
                }
                Tok::Trivia(text)
            }
            Token::Colon => Tok::Colon(text),
            Token::Semicolon => Tok::Semicolon(text),
            Token::AtKeyword(_) => Tok::AtKeyword(text),
            Token::Hash(_) | Token::IDHash(_) => Tok::Hash(text),
            Token::BadString(_) => return Err(parser.new_custom_error(SyntaxError::BadString)),
            Token::BadUrl(_) => return Err(parser.new_custom_error(SyntaxError::BadUrl)),
            Token::CloseCurlyBracket | Token::CloseParenthesis | Token::CloseSquareBracket => {
                return Err(parser.new_custom_error(SyntaxError::UnbalancedClose(text)));
            }
            Token::CurlyBracketBlock => nested(parser, BlockKind::Curly, text)?,
            Token::ParenthesisBlock => nested(parser, BlockKind::Parenthesis, text)?,
            Token::SquareBracketBlock => nested(parser, BlockKind::Square, text)?,
            Token::Function(_) => nested(parser, BlockKind::Function, text)?,
            _ => Tok::Text(text),
        };
        out.push(tok);
    }
    Ok(out)
}

fn nested<'i, 't>(
    parser: &mut Parser<'i, 't>,
    kind: BlockKind,
    open: String,
) -> Result<Tok, ParseError<'i, SyntaxError>> {
    let (children, content_end) = parser.parse_nested_block(
        |inner| -> Result<(Vec<Tok>, SourcePosition), ParseError<'i, SyntaxError>> {
            let children = tokenize(inner)?;
            Ok((children, inner.position()))
        },
    )?;

    let close = parser.slice_from(content_end).to_string();
    if close.is_empty() {
        return Err(parser.new_custom_error(SyntaxError::UnclosedBlock(kind.closing())));
    }

    Ok(Tok::Block {
        kind,
        open,
        children,
        close,
    })
}

/// Groups a token list into rules, declarations and trivia.
fn structure(tokens: Vec<Tok>) -> Vec<Item> {
    let mut items = Vec::new();
    let mut pending: Vec<Tok> = Vec::new();

    for tok in tokens {
        match tok {
            Tok::Trivia(text) if pending.is_empty() => items.push(Item::Trivia(text)),
            Tok::Semicolon(text) => items.push(statement(std::mem::take(&mut pending), text)),
            Tok::Block {
                kind: BlockKind::Curly,
                open,
                children,
                close,
            } if !is_custom_property(&pending) => {
                items.push(Item::Rule(Rule {
                    prelude: to_nodes(std::mem::take(&mut pending), false),
                    block: Some(Block {
                        open,
                        items: structure(children),
                        close,
                    }),
                    terminator: String::new(),
                }));
            }
            other => pending.push(other),
        }
    }

    if !pending.is_empty() {
        items.push(statement(pending, String::new()));
    }
    items
}

fn statement(mut tokens: Vec<Tok>, terminator: String) -> Item {
    let first = tokens.iter().find(|t| !matches!(t, Tok::Trivia(_)));
    if matches!(first, Some(Tok::AtKeyword(_))) {
        return Item::Rule(Rule {
            prelude: to_nodes(tokens, false),
            block: None,
            terminator,
        });
    }

    match tokens.iter().position(|t| matches!(t, Tok::Colon(_))) {
        Some(colon) => {
            let value = tokens.split_off(colon + 1);
            Item::Declaration(Declaration {
                name: to_nodes(tokens, false),
                value: to_nodes(value, true),
                terminator,
            })
        }
        None => Item::Other {
            nodes: to_nodes(tokens, false),
            terminator,
        },
    }
}

// `--x: { ... }` is a custom property value, not a nested rule.
fn is_custom_property(pending: &[Tok]) -> bool {
    let mut significant = pending.iter().filter(|t| !matches!(t, Tok::Trivia(_)));
    matches!(significant.next(), Some(Tok::Text(name)) if name.starts_with("--"))
        && pending.iter().any(|t| matches!(t, Tok::Colon(_)))
}

fn to_nodes(tokens: Vec<Tok>, colors: bool) -> Vec<Node> {
    tokens
        .into_iter()
        .map(|tok| match tok {
            Tok::Hash(text) if colors => Node::Color(ColorLiteral::new(text)),
            Tok::Block {
                open,
                children,
                close,
                ..
            } => Node::Group {
                open,
                children: to_nodes(children, false),
                close,
            },
            Tok::Trivia(text)
            | Tok::Colon(text)
            | Tok::Semicolon(text)
            | Tok::AtKeyword(text)
            | Tok::Hash(text)
            | Tok::Text(text) => Node::Text(text),
        })
        .collect()
}

fn visit_items<F: FnMut(&mut ColorLiteral)>(items: &mut [Item], f: &mut F) {
    for item in items {
        match item {
            Item::Trivia(_) => {}
            Item::Rule(rule) => {
                visit_nodes(&mut rule.prelude, f);
                if let Some(block) = &mut rule.block {
                    visit_items(&mut block.items, f);
                }
            }
            Item::Declaration(decl) => {
                visit_nodes(&mut decl.name, f);
                visit_nodes(&mut decl.value, f);
            }
            Item::Other { nodes, .. } => visit_nodes(nodes, f),
        }
    }
}

fn visit_nodes<F: FnMut(&mut ColorLiteral)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Color(literal) => f(literal),
            Node::Group { children, .. } => visit_nodes(children, f),
        }
    }
}

fn collect_items<'a>(items: &'a [Item], out: &mut Vec<&'a ColorLiteral>) {
    for item in items {
        match item {
            Item::Trivia(_) => {}
            Item::Rule(rule) => {
                collect_nodes(&rule.prelude, out);
                if let Some(block) = &rule.block {
                    collect_items(&block.items, out);
                }
            }
            Item::Declaration(decl) => {
                collect_nodes(&decl.name, out);
                collect_nodes(&decl.value, out);
            }
            Item::Other { nodes, .. } => collect_nodes(nodes, out),
        }
    }
}

fn collect_nodes<'a>(nodes: &'a [Node], out: &mut Vec<&'a ColorLiteral>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Color(literal) => out.push(literal),
            Node::Group { children, .. } => collect_nodes(children, out),
        }
    }
}

fn write_items(items: &[Item], out: &mut String) {
    for item in items {
        match item {
            Item::Trivia(text) => out.push_str(text),
            Item::Rule(rule) => {
                write_nodes(&rule.prelude, out);
                if let Some(block) = &rule.block {
                    out.push_str(&block.open);
                    write_items(&block.items, out);
                    out.push_str(&block.close);
                }
                out.push_str(&rule.terminator);
            }
            Item::Declaration(decl) => {
                write_nodes(&decl.name, out);
                write_nodes(&decl.value, out);
                out.push_str(&decl.terminator);
            }
            Item::Other { nodes, terminator } => {
                write_nodes(nodes, out);
                out.push_str(terminator);
            }
        }
    }
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Color(literal) => out.push_str(literal.text()),
            Node::Group {
                open,
                children,
                close,
            } => {
                out.push_str(open);
                write_nodes(children, out);
                out.push_str(close);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_serialize_is_byte_identical() {
        let css = "/* head */\n@import url(x.css);\nbody { color: #123; background: linear-gradient(#fff, #000) }\n@media (min-width: 10px) { a:hover { color: red } }\n";
        let document = StyleDocument::parse(css).unwrap();
        assert_eq!(document.to_css(), css);
    }

    #[test]
    fn selectors_are_not_colors() {
        let document = StyleDocument::parse("#abc { color: #def; }").unwrap();
        let colors: Vec<_> = document.colors().iter().map(|c| c.text().to_string()).collect();
        assert_eq!(colors, vec!["#def".to_string()]);
    }

    #[test]
    fn custom_property_block_value_stays_a_declaration() {
        let document = StyleDocument::parse(":root { --x: { a: b }; --y: #fff; }").unwrap();
        assert_eq!(document.colors().len(), 1);
    }
}
