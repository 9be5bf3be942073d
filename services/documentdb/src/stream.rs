//! Pass query responses through without buffering them.
//!
//! [`reemit`] tokenizes the source incrementally and writes every JSON event
//! to the sink before the next chunk is read, optionally injecting one
//! leading member into a top-level object. [`inject_prefix`] is the cheaper
//! byte copy that only patches the first `{`.

use crate::constants::{CONTINUATION_KEY, X_MS_CONTINUATION};
use azrest_core::{Body, Error, Result};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::debug;
use std::pin::pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Re-emit the JSON document read from `source` into `sink`.
///
/// When `injection` is set and the document is an object, the pair is
/// written as its first member. Other documents are copied unchanged.
/// Numbers keep their source lexeme, whitespace is not preserved.
///
/// Malformed input fails with [`ErrorKind::StreamFailed`](azrest_core::ErrorKind::StreamFailed).
/// Output already written to the sink is not rolled back.
pub async fn reemit<S, W>(source: S, sink: &mut W, injection: Option<(&str, &str)>) -> Result<()>
where
    S: Stream<Item = Result<Bytes>>,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut source = pin!(source);
    let mut lexer = Lexer::default();
    let mut parser = Parser::default();
    let mut writer = Writer::new(injection);
    let mut tokens = Vec::new();

    while let Some(chunk) = source.next().await {
        let chunk =
            chunk.map_err(|e| Error::stream_failed("failed to read source").with_source(e))?;
        lexer.feed(&chunk, &mut tokens)?;
        let out = writer.write_tokens(&mut parser, tokens.drain(..))?;
        write_all(sink, &out).await?;
    }

    lexer.finish(&mut tokens)?;
    let out = writer.write_tokens(&mut parser, tokens.drain(..))?;
    parser.finish()?;
    write_all(sink, &out).await?;

    sink.flush()
        .await
        .map_err(|e| Error::stream_failed("failed to flush sink").with_source(e))
}

/// Copy `source` into `sink`, inserting `"key":"value",` after a leading `{`.
///
/// This is not JSON aware: `key` and `value` are written without escaping,
/// and an empty source object (`{}`) yields invalid output because of the
/// trailing comma. Sources that do not start with `{` are copied untouched.
pub async fn inject_prefix<S, W>(source: S, sink: &mut W, key: &str, value: &str) -> Result<()>
where
    S: Stream<Item = Result<Bytes>>,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut source = pin!(source);
    let mut decided = false;

    while let Some(chunk) = source.next().await {
        let chunk =
            chunk.map_err(|e| Error::stream_failed("failed to read source").with_source(e))?;
        if decided {
            write_all(sink, &chunk).await?;
            continue;
        }

        match chunk.iter().position(|b| !b.is_ascii_whitespace()) {
            None => write_all(sink, &chunk).await?,
            Some(pos) if chunk[pos] == b'{' => {
                write_all(sink, &chunk[..=pos]).await?;
                write_all(sink, format!("\"{key}\":\"{value}\",").as_bytes()).await?;
                write_all(sink, &chunk[pos + 1..]).await?;
                decided = true;
            }
            Some(_) => {
                write_all(sink, &chunk).await?;
                decided = true;
            }
        }
    }

    sink.flush()
        .await
        .map_err(|e| Error::stream_failed("failed to flush sink").with_source(e))
}

/// Re-emit a raw query response, injecting `x-ms-continuation` as `_continuation`.
pub async fn stream_response<W>(resp: http::Response<Body>, sink: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let (parts, body) = resp.into_parts();
    let continuation = continuation(&parts.headers);
    debug!("streaming response with continuation: {continuation:?}");

    reemit(
        body,
        sink,
        continuation.as_deref().map(|v| (CONTINUATION_KEY, v)),
    )
    .await
}

/// Like [`stream_response`] but copies bytes with [`inject_prefix`].
pub async fn stream_response_raw<W>(resp: http::Response<Body>, sink: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let (parts, body) = resp.into_parts();
    let Some(token) = continuation(&parts.headers) else {
        let mut body = pin!(body);
        while let Some(chunk) = body.next().await {
            let chunk =
                chunk.map_err(|e| Error::stream_failed("failed to read source").with_source(e))?;
            write_all(sink, &chunk).await?;
        }
        return sink
            .flush()
            .await
            .map_err(|e| Error::stream_failed("failed to flush sink").with_source(e));
    };

    inject_prefix(body, sink, CONTINUATION_KEY, &token).await
}

fn continuation(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(X_MS_CONTINUATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

async fn write_all<W: AsyncWrite + Unpin + ?Sized>(sink: &mut W, bs: &[u8]) -> Result<()> {
    if bs.is_empty() {
        return Ok(());
    }
    sink.write_all(bs)
        .await
        .map_err(|e| Error::stream_failed("failed to write sink").with_source(e))
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::stream_failed(format!("malformed json: {}", msg.into()))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String(String),
    Number(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Default)]
enum LexState {
    #[default]
    Idle,
    /// Raw bytes of a string including the opening quote.
    String { raw: Vec<u8>, escaped: bool },
    Number(Vec<u8>),
    Literal(Vec<u8>),
}

/// Splits chunks into tokens, keeping a partial token across chunk boundaries.
#[derive(Debug, Default)]
struct Lexer {
    state: LexState,
}

impl Lexer {
    fn feed(&mut self, chunk: &[u8], tokens: &mut Vec<Token>) -> Result<()> {
        for &b in chunk {
            self.push(b, tokens)?;
        }
        Ok(())
    }

    fn push(&mut self, b: u8, tokens: &mut Vec<Token>) -> Result<()> {
        match &mut self.state {
            LexState::String { raw, escaped } => {
                raw.push(b);
                if *escaped {
                    *escaped = false;
                } else if b == b'\\' {
                    *escaped = true;
                } else if b == b'"' {
                    // serde_json resolves escapes, surrogate pairs and utf-8.
                    let s: String = serde_json::from_slice(raw)
                        .map_err(|e| malformed("invalid string").with_source(e))?;
                    tokens.push(Token::String(s));
                    self.state = LexState::Idle;
                }
                return Ok(());
            }
            LexState::Number(raw) => {
                if matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                    raw.push(b);
                    return Ok(());
                }
                self.finish(tokens)?;
            }
            LexState::Literal(raw) => {
                if b.is_ascii_alphabetic() {
                    raw.push(b);
                    return Ok(());
                }
                self.finish(tokens)?;
            }
            LexState::Idle => {}
        }

        match b {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            b'{' => tokens.push(Token::BeginObject),
            b'}' => tokens.push(Token::EndObject),
            b'[' => tokens.push(Token::BeginArray),
            b']' => tokens.push(Token::EndArray),
            b':' => tokens.push(Token::Colon),
            b',' => tokens.push(Token::Comma),
            b'"' => {
                self.state = LexState::String {
                    raw: vec![b'"'],
                    escaped: false,
                }
            }
            b'-' | b'0'..=b'9' => self.state = LexState::Number(vec![b]),
            b't' | b'f' | b'n' => self.state = LexState::Literal(vec![b]),
            _ => return Err(malformed(format!("unexpected byte 0x{b:02x}"))),
        }
        Ok(())
    }

    /// Complete the pending token at the end of input or at a delimiter.
    fn finish(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        match std::mem::take(&mut self.state) {
            LexState::Idle => Ok(()),
            LexState::String { .. } => Err(malformed("unterminated string")),
            LexState::Number(raw) => {
                let s = String::from_utf8(raw).map_err(|e| malformed("number").with_source(e))?;
                if !is_valid_number(&s) {
                    return Err(malformed(format!("invalid number {s}")));
                }
                tokens.push(Token::Number(s));
                Ok(())
            }
            LexState::Literal(raw) => {
                let token = match raw.as_slice() {
                    b"true" => Token::Bool(true),
                    b"false" => Token::Bool(false),
                    b"null" => Token::Null,
                    v => {
                        return Err(malformed(format!(
                            "invalid literal {}",
                            String::from_utf8_lossy(v)
                        )))
                    }
                };
                tokens.push(token);
                Ok(())
            }
        }
    }
}

/// `-? (0 | [1-9][0-9]*) (.[0-9]+)? ([eE][+-]?[0-9]+)?`
fn is_valid_number(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < b.len() && b[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if b.get(i) == Some(&b'-') {
        i += 1;
    }
    match b.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            digits(&mut i);
        }
        _ => return false,
    }
    if b.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if matches!(b.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == b.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParseState {
    /// Before the document.
    #[default]
    Start,
    /// After `{`: a key or `}`.
    ObjectFirst,
    /// After `,` in an object: a key.
    ObjectKey,
    /// After a key: `:`.
    AfterKey,
    /// After `:` or `,` in an array: a value.
    Value,
    /// After `[`: a value or `]`.
    ArrayFirst,
    /// After a value: `,` or the closing bracket.
    AfterValue,
    /// After the document.
    End,
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key(String),
    String(String),
    Number(String),
    Bool(bool),
    Null,
}

/// Validates the token order and turns tokens into events.
#[derive(Debug, Default)]
struct Parser {
    state: ParseState,
    stack: Vec<Container>,
}

impl Parser {
    fn push(&mut self, token: Token) -> Result<Option<Event>> {
        use ParseState::*;

        let event = match (self.state, token) {
            (Start | Value | ArrayFirst, Token::BeginObject) => {
                self.stack.push(Container::Object);
                self.state = ObjectFirst;
                Event::StartObject
            }
            (Start | Value | ArrayFirst, Token::BeginArray) => {
                self.stack.push(Container::Array);
                self.state = ArrayFirst;
                Event::StartArray
            }
            (Start | Value | ArrayFirst, Token::String(s)) => self.scalar(Event::String(s)),
            (Start | Value | ArrayFirst, Token::Number(s)) => self.scalar(Event::Number(s)),
            (Start | Value | ArrayFirst, Token::Bool(v)) => self.scalar(Event::Bool(v)),
            (Start | Value | ArrayFirst, Token::Null) => self.scalar(Event::Null),
            (ObjectFirst | ObjectKey, Token::String(s)) => {
                self.state = AfterKey;
                Event::Key(s)
            }
            (AfterKey, Token::Colon) => {
                self.state = Value;
                return Ok(None);
            }
            (AfterValue, Token::Comma) => {
                self.state = match self.stack.last() {
                    Some(Container::Object) => ObjectKey,
                    _ => Value,
                };
                return Ok(None);
            }
            (ObjectFirst | AfterValue, Token::EndObject)
                if self.stack.last() == Some(&Container::Object) =>
            {
                self.stack.pop();
                self.state = self.after_value();
                Event::EndObject
            }
            (ArrayFirst | AfterValue, Token::EndArray)
                if self.stack.last() == Some(&Container::Array) =>
            {
                self.stack.pop();
                self.state = self.after_value();
                Event::EndArray
            }
            (state, token) => {
                return Err(malformed(format!("unexpected {token:?} in state {state:?}")))
            }
        };

        Ok(Some(event))
    }

    fn scalar(&mut self, event: Event) -> Event {
        self.state = self.after_value();
        event
    }

    fn after_value(&self) -> ParseState {
        if self.stack.is_empty() {
            ParseState::End
        } else {
            ParseState::AfterValue
        }
    }

    /// An empty source is accepted and produces no output.
    fn finish(&self) -> Result<()> {
        match self.state {
            ParseState::Start | ParseState::End => Ok(()),
            state => Err(malformed(format!("unexpected end of input in state {state:?}"))),
        }
    }
}

/// Serializes events, inserting separators and the optional injected member.
#[derive(Debug)]
struct Writer<'a> {
    injection: Option<(&'a str, &'a str)>,
    started: bool,
    /// Per open container: true until its first member is written.
    first: Vec<bool>,
    after_key: bool,
}

impl<'a> Writer<'a> {
    fn new(injection: Option<(&'a str, &'a str)>) -> Self {
        Self {
            injection,
            started: false,
            first: Vec::new(),
            after_key: false,
        }
    }

    fn write_tokens(
        &mut self,
        parser: &mut Parser,
        tokens: impl Iterator<Item = Token>,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for token in tokens {
            if let Some(event) = parser.push(token)? {
                self.write_event(&mut out, event)?;
            }
        }
        Ok(out)
    }

    fn write_event(&mut self, out: &mut Vec<u8>, event: Event) -> Result<()> {
        let first_event = !self.started;
        self.started = true;

        match event {
            Event::StartObject => {
                self.separator(out);
                out.push(b'{');
                self.first.push(true);
                if first_event {
                    if let Some((key, value)) = self.injection.take() {
                        self.write_event(out, Event::Key(key.to_string()))?;
                        self.write_event(out, Event::String(value.to_string()))?;
                    }
                }
            }
            Event::StartArray => {
                self.separator(out);
                out.push(b'[');
                self.first.push(true);
            }
            Event::EndObject => {
                self.first.pop();
                out.push(b'}');
            }
            Event::EndArray => {
                self.first.pop();
                out.push(b']');
            }
            Event::Key(key) => {
                self.separator(out);
                write_string(out, &key)?;
                out.push(b':');
                self.after_key = true;
            }
            Event::String(s) => {
                self.separator(out);
                write_string(out, &s)?;
            }
            Event::Number(n) => {
                self.separator(out);
                out.extend_from_slice(n.as_bytes());
            }
            Event::Bool(v) => {
                self.separator(out);
                out.extend_from_slice(if v { b"true" } else { b"false" });
            }
            Event::Null => {
                self.separator(out);
                out.extend_from_slice(b"null");
            }
        }
        Ok(())
    }

    fn separator(&mut self, out: &mut Vec<u8>) {
        if self.after_key {
            self.after_key = false;
            return;
        }
        if let Some(first) = self.first.last_mut() {
            if !*first {
                out.push(b',');
            }
            *first = false;
        }
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    serde_json::to_writer(out, s)
        .map_err(|e| Error::stream_failed("failed to write string").with_source(e))
}
