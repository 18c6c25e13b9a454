//! Single-pass tokenizer for filter query strings.
//!
//! The tokenizer walks the input one character at a time and yields
//! [`RawDescriptor`]s: the header of each clause already resolved against
//! the registries and the whitelist, and the value text still untyped.
//!
//! ```text
//! AwaitType --':'--> AwaitField --':'--> AwaitOperator --':'--> AwaitValue
//!                                                                  |  '[' / '('
//!                                                                  v
//!         <-- ',' / '|' / end (scalar) ----------------------  InGroup
//!         <-- ']' / ')' (group) ---------------------------------'
//! ```
//!
//! All state lives in the [`Tokenizer`] value, which is created per input.

use std::iter::Enumerate;
use std::str::Chars;

use tracing::{debug, trace};

use crate::declared_type::DeclaredType;
use crate::error::{FilterError, Result};
use crate::filter::GroupDelimiter;
use crate::op::Op;
use crate::options::{AllowedKeys, ExtractOptions};

/// Untyped value text of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Plain value text, unescaped.
    Scalar(String),
    /// Group elements in input order, unescaped and already split on the
    /// delimiter chosen by the closing bracket.
    Group {
        elements: Vec<String>,
        delimiter: GroupDelimiter,
    },
}

impl RawValue {
    /// Returns `true` for a bracketed group.
    pub fn is_multi(&self) -> bool {
        matches!(self, RawValue::Group { .. })
    }

    /// Returns the delimiter of a group.
    pub fn group_delimiter(&self) -> Option<GroupDelimiter> {
        match self {
            RawValue::Scalar(_) => None,
            RawValue::Group { delimiter, .. } => Some(*delimiter),
        }
    }
}

/// One clause as found by the tokenizer, before value coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDescriptor {
    pub declared_type: DeclaredType,
    pub field: String,
    pub op: Op,
    pub value: RawValue,
}

impl RawDescriptor {
    /// Returns `true` when the value came from a bracketed group.
    pub fn is_multi(&self) -> bool {
        self.value.is_multi()
    }

    /// Returns the group delimiter, if any.
    pub fn group_delimiter(&self) -> Option<GroupDelimiter> {
        self.value.group_delimiter()
    }
}

/// Fully resolved clause header.
#[derive(Debug)]
struct Header {
    declared_type: DeclaredType,
    field: String,
    op: Op,
}

/// Text of an open group.
///
/// Each segment remembers the unescaped separator that preceded it, so the
/// split can wait until the closing bracket names the delimiter.
#[derive(Debug)]
struct GroupText {
    opened_at: usize,
    segments: Vec<(Option<char>, String)>,
}

impl GroupText {
    fn new(opened_at: usize) -> Self {
        GroupText {
            opened_at,
            segments: vec![(None, String::new())],
        }
    }

    fn push(&mut self, ch: char) {
        if let Some((_, text)) = self.segments.last_mut() {
            text.push(ch);
        }
    }

    fn separate(&mut self, separator: char) {
        self.segments.push((Some(separator), String::new()));
    }

    /// Splits on `delimiter`; the other separator is kept as literal text.
    fn split(self, delimiter: GroupDelimiter) -> Vec<String> {
        let mut elements = Vec::new();
        let mut current = String::new();
        for (separator, text) in self.segments {
            match separator {
                Some(sep) if sep == delimiter.as_char() => {
                    elements.push(std::mem::take(&mut current));
                }
                Some(sep) => current.push(sep),
                None => {}
            }
            current.push_str(&text);
        }
        elements.push(current);
        elements
    }
}

#[derive(Debug)]
enum State {
    AwaitType,
    AwaitField {
        declared_type: DeclaredType,
    },
    AwaitOperator {
        declared_type: DeclaredType,
        field: String,
    },
    AwaitValue(Header),
    InGroup {
        header: Header,
        group: GroupText,
    },
}

impl State {
    /// The first header part not yet set, if any.
    fn missing_part(&self) -> Option<&'static str> {
        match self {
            State::AwaitType => Some("type"),
            State::AwaitField { .. } => Some("field"),
            State::AwaitOperator { .. } => Some("operator"),
            State::AwaitValue(_) | State::InGroup { .. } => None,
        }
    }
}

/// Character-driven state machine over one input string.
///
/// A `Tokenizer` is an iterator of `Result<RawDescriptor>`. It yields
/// descriptors in input order and stops after the first error.
///
/// # Example
///
/// ```
/// use filter_query::{ExtractOptions, RawValue, Tokenizer};
///
/// let options = ExtractOptions::default();
/// let raw: Vec<_> = Tokenizer::new("s:tag:<>:(a|b)", &options)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(raw.len(), 1);
/// assert!(matches!(&raw[0].value, RawValue::Group { elements, .. } if elements == &["a", "b"]));
/// ```
pub struct Tokenizer<'a> {
    chars: Enumerate<Chars<'a>>,
    allowed_keys: &'a AllowedKeys,
    state: State,
    buffer: String,
    escaped: bool,
    consumed: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over `input`.
    pub fn new(input: &'a str, options: &'a ExtractOptions) -> Self {
        Tokenizer {
            chars: input.chars().enumerate(),
            allowed_keys: &options.allowed_keys,
            state: State::AwaitType,
            buffer: String::new(),
            escaped: false,
            consumed: 0,
            finished: false,
        }
    }

    fn step(&mut self, position: usize, ch: char) -> Result<Option<RawDescriptor>> {
        if self.escaped {
            self.escaped = false;
            return self.escaped_char(position, ch).map(|()| None);
        }
        match ch {
            '\\' => {
                self.escaped = true;
                Ok(None)
            }
            ':' => self.colon(position).map(|()| None),
            ',' | '|' => self.separator(position, ch),
            '[' | '(' => self.open_group(position).map(|()| None),
            ']' | ')' => self.close_group(position, ch).map(Some),
            _ => {
                self.push(ch);
                Ok(None)
            }
        }
    }

    fn escaped_char(&mut self, position: usize, ch: char) -> Result<()> {
        match ch {
            ',' | '|' if !matches!(self.state, State::InGroup { .. }) => {
                Err(FilterError::InvalidEscape { ch, position })
            }
            ']' | ')' => Err(FilterError::InvalidEscape { ch, position }),
            _ => {
                self.push(ch);
                Ok(())
            }
        }
    }

    fn push(&mut self, ch: char) {
        match &mut self.state {
            State::InGroup { group, .. } => group.push(ch),
            _ => self.buffer.push(ch),
        }
    }

    fn colon(&mut self, position: usize) -> Result<()> {
        let token = std::mem::take(&mut self.buffer);
        self.state = match std::mem::replace(&mut self.state, State::AwaitType) {
            State::AwaitType => {
                let declared_type = DeclaredType::from_token(&token)
                    .ok_or_else(|| FilterError::UnknownType(token.clone()))?;
                trace!(declared_type = %declared_type, "type resolved");
                State::AwaitField { declared_type }
            }
            State::AwaitField { declared_type } => {
                if token.is_empty() {
                    return Err(FilterError::EmptyField { position });
                }
                if !self.allowed_keys.allows(&token) {
                    return Err(FilterError::UnknownField(token));
                }
                trace!(field = %token, "field resolved");
                State::AwaitOperator {
                    declared_type,
                    field: token,
                }
            }
            State::AwaitOperator {
                declared_type,
                field,
            } => {
                let op = Op::from_token(&token)
                    .ok_or_else(|| FilterError::UnknownOperator(token.clone()))?;
                trace!(op = %op, "operator resolved");
                State::AwaitValue(Header {
                    declared_type,
                    field,
                    op,
                })
            }
            State::AwaitValue(_) => {
                return Err(FilterError::UnexpectedCharacter { ch: ':', position });
            }
            State::InGroup { .. } => return Err(FilterError::ColonInGroup { position }),
        };
        Ok(())
    }

    fn separator(&mut self, position: usize, ch: char) -> Result<Option<RawDescriptor>> {
        if let State::InGroup { group, .. } = &mut self.state {
            group.separate(ch);
            return Ok(None);
        }
        if self.buffer.is_empty() {
            return Ok(None);
        }
        self.finish_scalar(position)
    }

    fn open_group(&mut self, position: usize) -> Result<()> {
        match std::mem::replace(&mut self.state, State::AwaitType) {
            State::AwaitValue(header) => {
                if !self.buffer.is_empty() {
                    trace!(discarded = %self.buffer, "text before group dropped");
                    self.buffer.clear();
                }
                trace!(position, "group opened");
                self.state = State::InGroup {
                    header,
                    group: GroupText::new(position),
                };
                Ok(())
            }
            State::InGroup { .. } => Err(FilterError::NestedGroup { position }),
            other => Err(FilterError::MissingHeader {
                part: other.missing_part().unwrap_or("operator"),
                position,
            }),
        }
    }

    fn close_group(&mut self, position: usize, ch: char) -> Result<RawDescriptor> {
        let delimiter = GroupDelimiter::from_closing(ch)
            .ok_or(FilterError::UnexpectedCharacter { ch, position })?;
        match std::mem::replace(&mut self.state, State::AwaitType) {
            State::InGroup { header, group } => {
                trace!(position, delimiter = %delimiter.as_char(), "group closed");
                let elements = group.split(delimiter);
                Ok(self.emit(
                    header,
                    RawValue::Group {
                        elements,
                        delimiter,
                    },
                ))
            }
            _ => Err(FilterError::UnopenedGroup { ch, position }),
        }
    }

    /// Ends an unbracketed clause once its value text is non-empty.
    ///
    /// Text seen before a field was set belongs to no clause and is dropped.
    fn finish_scalar(&mut self, position: usize) -> Result<Option<RawDescriptor>> {
        match std::mem::replace(&mut self.state, State::AwaitType) {
            State::AwaitValue(header) => {
                let text = std::mem::take(&mut self.buffer);
                Ok(Some(self.emit(header, RawValue::Scalar(text))))
            }
            State::AwaitOperator { .. } => Err(FilterError::MissingHeader {
                part: "operator",
                position,
            }),
            _ => {
                trace!(discarded = %self.buffer, "text without field dropped");
                self.buffer.clear();
                Ok(None)
            }
        }
    }

    fn emit(&mut self, header: Header, value: RawValue) -> RawDescriptor {
        self.buffer.clear();
        debug!(
            declared_type = %header.declared_type,
            field = %header.field,
            op = %header.op,
            multi = value.is_multi(),
            "clause tokenized"
        );
        RawDescriptor {
            declared_type: header.declared_type,
            field: header.field,
            op: header.op,
            value,
        }
    }

    fn finish(&mut self) -> Result<Option<RawDescriptor>> {
        if self.escaped {
            return Err(FilterError::DanglingEscape);
        }
        if let State::InGroup { group, .. } = &self.state {
            return Err(FilterError::UnclosedGroup {
                position: group.opened_at,
            });
        }
        if self.buffer.is_empty() {
            return Ok(None);
        }
        self.finish_scalar(self.consumed)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<RawDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        while let Some((position, ch)) = self.chars.next() {
            self.consumed = position + 1;
            match self.step(position, ch) {
                Ok(None) => {}
                Ok(Some(raw)) => return Some(Ok(raw)),
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        self.finished = true;
        self.finish().transpose()
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

/// Tokenizes `input` completely, without value coercion.
pub fn tokenize(input: &str, options: &ExtractOptions) -> Result<Vec<RawDescriptor>> {
    Tokenizer::new(input, options).collect()
}
