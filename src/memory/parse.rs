//! Loads LS-8 programs written one byte per line:
//!
//! ```text
//! # print 8 * 9
//! 10011001 # LDI R0,8
//! 00000000
//! 00001000
//! LDI 1 9
//! MUL 0 1
//! PRN 0
//! 0x20:
//!     HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::{fmt, str::Lines};

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use crate::processor::Instruction;

use super::{Byte, Memory, Word};

macro_rules! propagate {
    ( $res:expr ) => {
        match $res {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidByte { radix: u32 },
    InvalidInstruction,
    InvalidAddressLabel,
    OperandMismatch { expected: Byte, found: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidByte { radix } => {
                write!(f, "failed to parse byte with radix `{}`", radix)
            }
            ParseErrorKind::InvalidInstruction => f.write_str("failed to resolve instruction"),
            ParseErrorKind::InvalidAddressLabel => f.write_str("invalid address label"),
            ParseErrorKind::OperandMismatch { expected, found } => {
                write!(f, "expected {} operands, found {}", expected, found)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

/// Every error found while parsing a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) while parsing program", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  {}", err)?;
        }
        Ok(())
    }
}

impl error::Error for ParseErrors {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Parses a byte. Exactly eight binary digits are read as binary, otherwise
/// `0b`, `0o` and `0x` prefixes select the radix and the default is decimal.
fn parse_number<T>(
    token: &str,
    from_str_radix: fn(&str, u32) -> std::result::Result<T, std::num::ParseIntError>,
) -> std::result::Result<T, u32> {
    if token.len() == 8 && token.bytes().all(|b| b == b'0' || b == b'1') {
        return from_str_radix(token, 2).map_err(|_| 2);
    }

    let (radix, offset) = match token.as_bytes() {
        [b'0', b'b', ..] => (2, 2),
        [b'0', b'o', ..] => (8, 2),
        [b'0', b'x', ..] => (16, 2),
        _ => (10, 0),
    };

    from_str_radix(&token[offset..], radix).map_err(|_| radix)
}

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: Word,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parse for `data` which will try to populate `memory`.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all `self.data` into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, ParseErrors> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(self.memory)
        } else {
            Err(ParseErrors(errors))
        }
    }

    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        // Everything after `#` is a comment
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        }
        .trim();

        if line.is_empty() {
            Some(Ok(()))
        } else if line.ends_with(':') {
            self.parse_address_label(line)
        } else if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.parse_instruction(line)
        } else {
            self.parse_bytes(line)
        }
    }

    /// Tries to parse line as an address label.
    ///
    /// # Examples
    ///
    /// - `0x22:`
    /// - `0o44:`
    fn parse_address_label(&mut self, line: &str) -> Option<Result<()>> {
        let line = line.strip_suffix(':').unwrap_or(line).trim();

        log::debug!("[{}] Found address label", self.line_nr);

        if line.is_empty() {
            return Some(Err(ParseError::new(
                ParseErrorKind::InvalidAddressLabel,
                "an address label needs to have an address set",
                self.line_nr,
            )));
        }

        let address = propagate!(parse_number(line, u16::from_str_radix).map_err(|radix| {
            ParseError::new(
                ParseErrorKind::InvalidAddressLabel,
                format!("failed to parse the address with radix `{}`", radix),
                self.line_nr,
            )
        }));

        if address as usize >= S {
            return Some(Err(ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: address as usize,
                },
                "address label is past the end of memory",
                self.line_nr,
            )));
        }

        log::debug!("[{}] Address label `0x{:x}`", self.line_nr, address);

        self.position = address;

        Some(Ok(()))
    }

    /// Tries to parse line as an instruction, optionally followed by all of
    /// its operands.
    ///
    /// # Examples
    ///
    /// - `HLT`
    /// - `LDI 0 0b1000`
    fn parse_instruction(&mut self, line: &str) -> Option<Result<()>> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().unwrap_or_default();

        let instruction = *propagate!(Instruction::ALL
            .iter()
            .find(|instruction| name.eq_ignore_ascii_case(instruction.name()))
            .ok_or_else(|| ParseError::new(
                ParseErrorKind::InvalidInstruction,
                format!("no instruction named `{}`", name),
                self.line_nr
            )));

        log::debug!("[{}] Found instruction {}", self.line_nr, instruction);

        let operands = propagate!(tokens
            .map(|token| self.parse_byte(token))
            .collect::<Result<Vec<_>>>());

        let expected = instruction.operand_count();
        if !operands.is_empty() && operands.len() != expected as usize {
            return Some(Err(ParseError::new(
                ParseErrorKind::OperandMismatch {
                    expected,
                    found: operands.len(),
                },
                format!("`{}`", line),
                self.line_nr,
            )));
        }

        propagate!(self.write_byte(instruction.into()));
        for operand in operands {
            propagate!(self.write_byte(operand));
        }

        Some(Ok(()))
    }

    /// Tries to parse line as one or more whitespace separated bytes.
    ///
    /// # Examples
    ///
    /// - `10011001`
    /// - `0x2A 7`
    fn parse_bytes(&mut self, line: &str) -> Option<Result<()>> {
        log::debug!("[{}] Found byte literal", self.line_nr);

        for token in line.split_whitespace() {
            let byte = propagate!(self.parse_byte(token));
            propagate!(self.write_byte(byte));
        }

        Some(Ok(()))
    }

    fn parse_byte(&self, token: &str) -> Result<Byte> {
        parse_number(token, u8::from_str_radix).map_err(|radix| {
            ParseError::new(
                ParseErrorKind::InvalidByte { radix },
                format!("`{}`", token),
                self.line_nr,
            )
        })
    }

    /// Writes `byte` into memory at [self.position](`Parser::position`),
    /// then moves the position forward by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the position is outside of memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        let (address, line_nr) = (self.position as usize, self.line_nr);
        let out_of_memory = || {
            ParseError::new(
                ParseErrorKind::InvalidAddress { address },
                "program does not fit into memory",
                line_nr,
            )
        };

        self.memory
            .write_byte(self.position, byte)
            .map_err(|_| out_of_memory())?;
        self.position = self.position.checked_add(1).ok_or_else(out_of_memory)?;
        Ok(())
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = ParseErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s, Memory::default()).parse()
    }
}

impl<const S: usize> Memory<S> {
    /// Reads and parses a program file
    pub fn from_file<P: AsRef<Path>>(path: P) -> EyreResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read `{}`", path.display()))?;
        let memory = data
            .parse::<Self>()
            .wrap_err_with(|| format!("Failed to parse `{}`", path.display()))?;
        Ok(memory)
    }
}
