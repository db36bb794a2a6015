//! 清单文本读写
//!
//! One node per line:
//!
//! ```text
//! # comment
//! .align 4
//! .loop:
//!     btiz t0, -1, .done
//!     loadp 8[cfr], t1
//! ```
//!
//! `%t<N>` / `%f<N>` name temporaries so a printed listing can be read back.
//!
//! Label operands must start with `.` or `_`; any other bare name reads as a machine
//! register. A label built in code as `L` prints as `L` and comes back as a register.

use crate::middle::ir::{Instruction, Node, Opcode, Operand, Origin, RegClass, Tmp, TmpId};
use crate::util::span::Span;
use std::sync::Arc;
use thiserror::Error;

/// Parsed listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub nodes: Vec<Node>,
    /// Highest temporary id in the text, so fresh ids can start above it
    pub max_tmp: Option<TmpId>,
}

/// Listing syntax error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{origin}: empty operand")]
    EmptyOperand { origin: Origin },

    #[error("{origin}: unbalanced brackets in `{text}`")]
    UnbalancedBrackets { text: String, origin: Origin },

    #[error("{origin}: integer literal `{text}` out of range")]
    BadInteger { text: String, origin: Origin },

    #[error("{origin}: bad temporary `{text}`")]
    BadTemporary { text: String, origin: Origin },

    #[error("{origin}: empty label")]
    EmptyLabel { origin: Origin },
}

/// Parse `text`; origins name `file`
pub fn parse_listing(
    file: &str,
    text: &str,
) -> Result<Listing, ParseError> {
    let file: Arc<str> = Arc::from(file);
    let mut listing = Listing::default();

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        let content = trimmed.trim_end();
        if content.is_empty() {
            continue;
        }
        let column = line.len() - trimmed.len() + 1;
        let origin = Origin::new(file.clone(), Span::on_line(idx + 1, column, content.len()));

        let comment = content
            .strip_prefix('#')
            .or_else(|| content.strip_prefix("//"));
        let node = if let Some(comment) = comment {
            Node::Comment {
                text: comment.trim().to_string(),
                origin,
            }
        } else if let Some(name) = content.strip_suffix(':') {
            let name = name.trim();
            if name.is_empty() {
                return Err(ParseError::EmptyLabel { origin });
            }
            Node::Label {
                name: name.to_string(),
                origin,
            }
        } else if content.starts_with('.') {
            Node::Directive {
                text: content.to_string(),
                origin,
            }
        } else {
            Node::Instruction(parse_instruction(content, origin, &mut listing.max_tmp)?)
        };
        listing.nodes.push(node);
    }

    Ok(listing)
}

fn parse_instruction(
    content: &str,
    origin: Origin,
    max_tmp: &mut Option<TmpId>,
) -> Result<Instruction, ParseError> {
    let body = match content.split_once('#') {
        Some((body, _comment)) => body.trim_end(),
        None => content,
    };
    let (mnemonic, rest) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));

    let mut operands = Vec::new();
    for token in split_operands(rest.trim(), &origin)? {
        let operand = parse_operand(token, &origin)?;
        if let Some(tmp) = operand.as_tmp() {
            *max_tmp = (*max_tmp).max(Some(tmp.id));
        }
        operands.push(operand);
    }

    Ok(Instruction::new(origin, Opcode::parse(mnemonic), operands))
}

/// Split on commas outside brackets
fn split_operands<'a>(
    text: &'a str,
    origin: &Origin,
) -> Result<Vec<&'a str>, ParseError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let unbalanced = || ParseError::UnbalancedBrackets {
        text: text.to_string(),
        origin: origin.clone(),
    };

    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            ',' if depth == 0 => {
                pieces.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    pieces.push(text[start..].trim());

    if pieces.iter().any(|p| p.is_empty()) {
        return Err(ParseError::EmptyOperand {
            origin: origin.clone(),
        });
    }
    Ok(pieces)
}

fn parse_operand(
    token: &str,
    origin: &Origin,
) -> Result<Operand, ParseError> {
    if let Some(rest) = token.strip_prefix('%') {
        return parse_tmp(token, rest, origin).map(Operand::tmp);
    }
    if token.contains(['[', ']', '(', ')']) {
        return Ok(Operand::Address(token.to_string()));
    }
    if token.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        return parse_integer(token).map(Operand::Immediate).ok_or_else(|| {
            ParseError::BadInteger {
                text: token.to_string(),
                origin: origin.clone(),
            }
        });
    }
    if token.starts_with(['.', '_']) {
        return Ok(Operand::label(token));
    }
    Ok(Operand::reg(token))
}

fn parse_tmp(
    token: &str,
    rest: &str,
    origin: &Origin,
) -> Result<Tmp, ParseError> {
    let bad = || ParseError::BadTemporary {
        text: token.to_string(),
        origin: origin.clone(),
    };
    let (class, digits) = if let Some(digits) = rest.strip_prefix('t') {
        (RegClass::Gpr, digits)
    } else if let Some(digits) = rest.strip_prefix('f') {
        (RegClass::Fpr, digits)
    } else {
        return Err(bad());
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let id = digits.parse::<u32>().map_err(|_| bad())?;
    Ok(Tmp {
        id: TmpId(id),
        class,
        origin: origin.clone(),
    })
}

/// Decimal or `0x` hex, optionally negated. Hex literals may use all 64 bits.
fn parse_integer(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    match digits.strip_prefix("0x") {
        Some(hex) if !hex.starts_with('+') => {
            let value = u64::from_str_radix(hex, 16).ok()? as i64;
            Some(if negative { value.wrapping_neg() } else { value })
        }
        Some(_) => None,
        None => token.parse().ok(),
    }
}

/// Render nodes back to listing text, one per line
pub fn print_listing(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node.to_string());
        out.push('\n');
    }
    out
}
