//! Just enough of the contract ABI for the registry and reverse contracts:
//! string / uint arguments in, string, string[], address and (string[], address) out.

use crate::domain::Address;
use primitive_types::U256;

const WORD: usize = 32;

// Function selectors: first 4 bytes of keccak256 of the signature.
/// getId(string)
pub const GET_ID: [u8; 4] = [0xbe, 0xe5, 0x1f, 0x3b];
/// getRecords(string) -> (string[], address)
pub const GET_RECORDS: [u8; 4] = [0x86, 0xe8, 0x0b, 0x71];
/// getRecord(string,uint8) -> string
pub const GET_RECORD: [u8; 4] = [0x97, 0x51, 0xe9, 0xf1];
/// getAddress(string) -> address
pub const GET_ADDRESS: [u8; 4] = [0xbf, 0x40, 0xfa, 0xc1];
/// getAllNames() -> string[]
pub const GET_ALL_NAMES: [u8; 4] = [0xfb, 0x82, 0x5e, 0x5f];
/// register(string), payable
pub const REGISTER: [u8; 4] = [0xf2, 0xc2, 0x98, 0xbe];
/// setRecords(string,string,string,string,string,string)
pub const SET_RECORDS: [u8; 4] = [0xf0, 0xf1, 0x93, 0x46];
/// setReverse(string), on the reverse contract
pub const SET_REVERSE: [u8; 4] = [0x9c, 0xbf, 0x52, 0x9d];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("return data too short: need {needed} bytes at offset {offset}, have {len}")]
    OutOfBounds { offset: usize, needed: usize, len: usize },
    #[error("offset or length does not fit in usize")]
    Overflow,
    #[error("string is not valid utf-8")]
    InvalidUtf8,
}

/// A call argument.
#[derive(Debug, Clone)]
pub enum Token<'a> {
    Str(&'a str),
    Uint(U256),
}

fn uint_word(v: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    v.to_big_endian(&mut word);
    word
}

/// Builds calldata: selector, head (static values and offsets), then tail (dynamic values).
pub fn encode_call(selector: [u8; 4], args: &[Token<'_>]) -> Vec<u8> {
    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Str(s) => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                tail.extend_from_slice(&uint_word(U256::from(s.len())));
                tail.extend_from_slice(s.as_bytes());
                let pad = (WORD - s.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(pad));
            }
        }
    }

    let mut data = Vec::with_capacity(4 + head.len() + tail.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&head);
    data.extend_from_slice(&tail);
    data
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset.checked_add(WORD).ok_or(AbiError::Overflow)?;
    data.get(offset..end).ok_or(AbiError::OutOfBounds {
        offset,
        needed: WORD,
        len: data.len(),
    })
}

fn usize_at(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let word = word_at(data, offset)?;
    // Anything above 8 bytes cannot be a real offset or length.
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(buf)).map_err(|_| AbiError::Overflow)
}

/// Reads a string whose length word sits at `offset`.
fn string_at(data: &[u8], offset: usize) -> Result<String, AbiError> {
    let len = usize_at(data, offset)?;
    let start = offset + WORD;
    let end = start.checked_add(len).ok_or(AbiError::Overflow)?;
    let bytes = data.get(start..end).ok_or(AbiError::OutOfBounds {
        offset: start,
        needed: len,
        len: data.len(),
    })?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

/// Reads a string[] whose element count sits at `offset`.
fn string_array_at(data: &[u8], offset: usize) -> Result<Vec<String>, AbiError> {
    let count = usize_at(data, offset)?;
    let base = offset + WORD;
    let mut out = Vec::with_capacity(count.min(1024));
    for i in 0..count {
        let rel = usize_at(data, base + i * WORD)?;
        out.push(string_at(data, base.checked_add(rel).ok_or(AbiError::Overflow)?)?);
    }
    Ok(out)
}

fn address_word(data: &[u8], offset: usize) -> Result<Address, AbiError> {
    let word = word_at(data, offset)?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address::from_bytes(bytes))
}

pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    string_at(data, usize_at(data, 0)?)
}

pub fn decode_string_array(data: &[u8]) -> Result<Vec<String>, AbiError> {
    string_array_at(data, usize_at(data, 0)?)
}

pub fn decode_address(data: &[u8]) -> Result<Address, AbiError> {
    address_word(data, 0)
}

/// Decodes `(string[], address)`.
pub fn decode_records(data: &[u8]) -> Result<(Vec<String>, Address), AbiError> {
    let values = string_array_at(data, usize_at(data, 0)?)?;
    let owner = address_word(data, WORD)?;
    Ok((values, owner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(v: usize) -> Vec<u8> {
        uint_word(U256::from(v)).to_vec()
    }

    fn padded(s: &str) -> Vec<u8> {
        let mut out = word(s.len());
        out.extend_from_slice(s.as_bytes());
        while out.len() % WORD != 0 {
            out.push(0);
        }
        out
    }

    #[test]
    fn encodes_single_string_argument() {
        let data = encode_call(REGISTER, &[Token::Str("brock")]);
        assert_eq!(&data[..4], &REGISTER);
        assert_eq!(&data[4..36], word(32).as_slice());
        assert_eq!(&data[36..68], word(5).as_slice());
        assert_eq!(&data[68..73], b"brock");
        assert_eq!(data.len(), 4 + 3 * WORD);
    }

    #[test]
    fn encodes_string_then_uint() {
        let data = encode_call(GET_RECORD, &[Token::Str("abc"), Token::Uint(U256::from(4))]);
        // Head: offset of the string (two head words), then the selector value.
        assert_eq!(&data[4..36], word(64).as_slice());
        assert_eq!(&data[36..68], word(4).as_slice());
        assert_eq!(&data[68..100], word(3).as_slice());
        assert_eq!(&data[100..103], b"abc");
    }

    #[test]
    fn decodes_records_tuple() {
        // (string[] ["a", "hello"], address)
        let mut data = word(64);
        let mut owner = vec![0u8; 12];
        owner.extend_from_slice(&[0xab; 20]);
        data.extend_from_slice(&owner);
        data.extend_from_slice(&word(2));
        data.extend_from_slice(&word(64));
        data.extend_from_slice(&word(128));
        data.extend_from_slice(&padded("a"));
        data.extend_from_slice(&padded("hello"));

        let (values, addr) = decode_records(&data).unwrap();
        assert_eq!(values, vec!["a".to_string(), "hello".to_string()]);
        assert_eq!(addr, Address::from_bytes([0xab; 20]));
    }

    #[test]
    fn truncated_return_data_is_an_error() {
        let mut data = word(32);
        data.extend_from_slice(&word(10));
        data.extend_from_slice(b"short");
        assert!(matches!(decode_string(&data), Err(AbiError::OutOfBounds { .. })));
    }
}
