//! Wisdom entries and their printable form.
//!
//! ```text
//! (spectra-wisdom-1
//!   (dft_r2hc_1 #x40 #x1a2b3c4d #x0 #xff #x10)
//! )
//! ```
//!
//! Each record is a solver name followed by the planner flags and the
//! four problem-hash words, all in `#x` hex. Whitespace between tokens is
//! free-form on input. A document ends at the closing parenthesis of the
//! top-level form; nothing after it is read.

use std::fmt;

/// Tag opening every wisdom document.
pub const DOCUMENT_TAG: &str = "spectra-wisdom-1";

/// Longest accepted solver name.
pub const MAX_SOLVER_LEN: usize = 128;

/// Lookup key of an entry: the problem hash and the planner flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WisdomKey {
    /// Hash of the transform problem.
    pub problem: [u32; 4],
    /// Planner flags the solution was found under.
    pub flags: u32,
}

/// One remembered planning decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WisdomEntry {
    solver: String,
    flags: u32,
    problem: [u32; 4],
}

impl WisdomEntry {
    /// Build an entry. The solver name must be a non-empty run of ASCII
    /// alphanumerics and `_-.+:`.
    pub fn new(solver: impl Into<String>, flags: u32, problem: [u32; 4]) -> Result<Self, ParseError> {
        let solver = solver.into();
        if solver.is_empty() || solver.len() > MAX_SOLVER_LEN {
            return Err(ParseError::new(format!(
                "solver name must be 1..={MAX_SOLVER_LEN} bytes, got {}",
                solver.len()
            )));
        }
        if let Some(bad) = solver.bytes().find(|&b| !is_name_byte(b)) {
            return Err(ParseError::new(format!(
                "invalid byte {bad:#04x} in solver name {solver:?}"
            )));
        }
        Ok(Self {
            solver,
            flags,
            problem,
        })
    }

    /// Name of the solver the planner picked.
    pub fn solver(&self) -> &str {
        &self.solver
    }

    /// Planner flags.
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Problem hash.
    pub fn problem(&self) -> [u32; 4] {
        self.problem
    }

    /// Merge key.
    pub fn key(&self) -> WisdomKey {
        WisdomKey {
            problem: self.problem,
            flags: self.flags,
        }
    }
}

impl fmt::Display for WisdomEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [h0, h1, h2, h3] = self.problem;
        write!(
            f,
            "({} #x{:x} #x{h0:x} #x{h1:x} #x{h2:x} #x{h3:x})",
            self.solver, self.flags
        )
    }
}

/// Malformed wisdom text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub detail: String,
}

impl ParseError {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed wisdom: {}", self.detail)
    }
}

impl std::error::Error for ParseError {}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'+' | b':')
}

/// Render a complete document.
pub fn format_document<'a>(entries: impl IntoIterator<Item = &'a WisdomEntry>) -> String {
    let mut out = format!("({DOCUMENT_TAG}\n");
    for entry in entries {
        out.push_str("  ");
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out.push_str(")\n");
    out
}

/// Parse one document from a byte source that returns `None` at end of input.
///
/// Reads exactly up to the closing parenthesis of the top-level form.
pub fn parse_document(next: impl FnMut() -> Option<u8>) -> Result<Vec<WisdomEntry>, ParseError> {
    Parser {
        next,
        peeked: None,
        offset: 0,
    }
    .document()
}

/// Parse one document from text.
pub fn parse_str(text: &str) -> Result<Vec<WisdomEntry>, ParseError> {
    let mut bytes = text.bytes();
    parse_document(move || bytes.next())
}

struct Parser<F> {
    next: F,
    peeked: Option<u8>,
    offset: usize,
}

impl<F: FnMut() -> Option<u8>> Parser<F> {
    fn peek(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            self.peeked = (self.next)();
        }
        self.peeked
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.peeked = None;
            self.offset += 1;
        }
        b
    }

    fn error(&self, what: &str) -> ParseError {
        ParseError::new(format!("{what} at byte {}", self.offset))
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, want: u8) -> Result<(), ParseError> {
        self.skip_ws();
        match self.bump() {
            Some(b) if b == want => Ok(()),
            Some(b) => Err(self.error(&format!(
                "expected {:?}, found {:?}",
                want as char, b as char
            ))),
            None => Err(self.error(&format!("expected {:?}, found end of input", want as char))),
        }
    }

    fn name(&mut self) -> Result<String, ParseError> {
        self.skip_ws();
        let mut name = String::new();
        while let Some(b) = self.peek().filter(|&b| is_name_byte(b)) {
            if name.len() == MAX_SOLVER_LEN {
                return Err(self.error("name too long"));
            }
            name.push(b as char);
            self.bump();
        }
        if name.is_empty() {
            return Err(self.error("expected a name"));
        }
        Ok(name)
    }

    fn hex(&mut self) -> Result<u32, ParseError> {
        self.expect(b'#')?;
        if self.bump() != Some(b'x') {
            return Err(self.error("expected 'x' after '#'"));
        }
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(d) = self.peek().and_then(|b| (b as char).to_digit(16)) {
            value = value
                .checked_mul(16)
                .map(|v| v | d)
                .ok_or_else(|| self.error("hex value exceeds 32 bits"))?;
            digits += 1;
            self.bump();
        }
        if digits == 0 {
            return Err(self.error("expected hex digits"));
        }
        Ok(value)
    }

    fn entry(&mut self) -> Result<WisdomEntry, ParseError> {
        self.expect(b'(')?;
        let solver = self.name()?;
        let flags = self.hex()?;
        let problem = [self.hex()?, self.hex()?, self.hex()?, self.hex()?];
        self.expect(b')')?;
        WisdomEntry::new(solver, flags, problem)
    }

    fn document(&mut self) -> Result<Vec<WisdomEntry>, ParseError> {
        self.expect(b'(')?;
        let tag = self.name()?;
        if tag != DOCUMENT_TAG {
            return Err(ParseError::new(format!("unknown document tag {tag:?}")));
        }
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'(') => entries.push(self.entry()?),
                Some(b')') => {
                    self.bump();
                    return Ok(entries);
                }
                Some(b) => {
                    return Err(self.error(&format!("unexpected {:?}", b as char)));
                }
                None => return Err(self.error("unterminated document")),
            }
        }
    }
}
