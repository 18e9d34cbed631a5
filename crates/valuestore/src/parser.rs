//! Append-log record codec using nom
//!
//! File format:
//! ```text
//! VSTORE1\n
//! +<key_len> <value_len>\n<key><value>\n     put record
//! -<key_len>\n<key>\n                        delete record (tombstone)
//! ...
//! ```
//!
//! Lengths are decimal byte counts, so keys and values may contain any bytes,
//! including spaces and newlines.

use nom::{
    branch::alt,
    bytes::complete::take,
    character::complete::{char, digit1},
    combinator::map_res,
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::error::{Error, Result};

/// Magic header for store log files
pub const STORE_MAGIC: &[u8] = b"VSTORE1\n";

/// A single decoded log record, borrowing from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    /// Key was set to value
    Put {
        /// Raw key bytes
        key: &'a [u8],
        /// Raw value bytes
        value: &'a [u8],
    },
    /// Key was deleted
    Delete {
        /// Raw key bytes
        key: &'a [u8],
    },
}

/// Validate the magic header and return the bytes that follow it
pub fn parse_header(input: &[u8]) -> Result<&[u8]> {
    if input.len() < STORE_MAGIC.len() {
        return Err(Error::Parse("Input too short for header".to_string()));
    }

    if &input[0..STORE_MAGIC.len()] != STORE_MAGIC {
        return Err(Error::Parse("Invalid store magic header".to_string()));
    }

    Ok(&input[STORE_MAGIC.len()..])
}

/// Parse one record from the front of `input`
pub fn parse_record(input: &[u8]) -> IResult<&[u8], Record<'_>> {
    alt((put_record, delete_record))(input)
}

/// Encode a put record
pub fn encode_put(key: &str, value: &str) -> Vec<u8> {
    let prefix = format!("+{} {}\n", key.len(), value.len());
    let mut record = Vec::with_capacity(prefix.len() + key.len() + value.len() + 1);
    record.extend_from_slice(prefix.as_bytes());
    record.extend_from_slice(key.as_bytes());
    record.extend_from_slice(value.as_bytes());
    record.push(b'\n');
    record
}

/// Encode a delete record
pub fn encode_delete(key: &str) -> Vec<u8> {
    let prefix = format!("-{}\n", key.len());
    let mut record = Vec::with_capacity(prefix.len() + key.len() + 1);
    record.extend_from_slice(prefix.as_bytes());
    record.extend_from_slice(key.as_bytes());
    record.push(b'\n');
    record
}

fn put_record(input: &[u8]) -> IResult<&[u8], Record<'_>> {
    let (input, (key_len, value_len)) =
        delimited(char('+'), separated_pair(length, char(' '), length), newline)(input)?;
    let (input, key) = take_bytes(input, key_len)?;
    let (input, value) = take_bytes(input, value_len)?;
    let (input, _) = newline(input)?;
    Ok((input, Record::Put { key, value }))
}

fn delete_record(input: &[u8]) -> IResult<&[u8], Record<'_>> {
    let (input, key_len) = delimited(char('-'), length, newline)(input)?;
    let (input, key) = take_bytes(input, key_len)?;
    let (input, _) = newline(input)?;
    Ok((input, Record::Delete { key }))
}

fn length(input: &[u8]) -> IResult<&[u8], usize> {
    map_res(map_res(digit1, std::str::from_utf8), |s: &str| s.parse::<usize>())(input)
}

fn take_bytes(input: &[u8], count: usize) -> IResult<&[u8], &[u8]> {
    take(count)(input)
}

fn newline(input: &[u8]) -> IResult<&[u8], char> {
    char('\n')(input)
}
