//! Compact base64 path encoding.
//!
//! Each instruction starts with a header character. Bits 3..5 select the
//! operation, bit 2 selects the parameter width (2 or 3 characters) and bits
//! 0..1 must be zero. Parameters are signed tenths of a pixel: bit 5 of the
//! first character is the sign, the remaining bits are the magnitude. Every
//! coordinate is a delta from the previous one, and a move resets the
//! running position to the origin first.

use crate::error::DecodeError;

use super::command::Command;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Parameter count per operation, indexed by the header's operation bits.
const PARAM_COUNTS: [usize; 5] = [2, 2, 4, 6, 0];

fn digit(token: u8) -> Option<u32> {
    BASE64.iter().position(|&c| c == token).map(|i| i as u32)
}

/// Decode an encoded path into primitive commands.
///
/// Fails on the first malformed character; nothing decoded up to that point
/// is returned.
pub fn decode_path(encoded: &str) -> Result<Vec<Command>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut commands = Vec::new();
    let (mut x, mut y) = (0.0_f64, 0.0_f64);
    let mut i = 0;

    while i < bytes.len() {
        let token = bytes[i];
        let header = digit(token).ok_or(DecodeError::InvalidHeader {
            offset: i,
            token: char_at(encoded, i),
        })?;
        let op = (header >> 3) as usize;
        if op >= PARAM_COUNTS.len() || header & 3 != 0 {
            return Err(DecodeError::InvalidHeader {
                offset: i,
                token: char_at(encoded, i),
            });
        }
        let width = (((header >> 2) & 1) + 2) as usize;
        i += 1;

        if op == 0 {
            x = 0.0;
            y = 0.0;
        }

        let mut params = [0.0_f64; 6];
        for (p, param) in params.iter_mut().take(PARAM_COUNTS[op]).enumerate() {
            let value = read_number(encoded, i, width)?;
            i += width;
            *param = if p % 2 == 0 {
                x += value;
                x
            } else {
                y += value;
                y
            };
        }

        commands.push(match op {
            0 => Command::MoveTo {
                x: params[0],
                y: params[1],
            },
            1 => Command::LineTo {
                x: params[0],
                y: params[1],
            },
            2 => Command::QuadraticCurveTo {
                cpx: params[0],
                cpy: params[1],
                x: params[2],
                y: params[3],
            },
            3 => Command::BezierCurveTo {
                cp1x: params[0],
                cp1y: params[1],
                cp2x: params[2],
                cp2y: params[3],
                x: params[4],
                y: params[5],
            },
            _ => Command::ClosePath,
        });
    }

    Ok(commands)
}

fn read_number(encoded: &str, offset: usize, width: usize) -> Result<f64, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut value = 0u32;
    let mut negative = false;
    for k in 0..width {
        let at = offset + k;
        let token = *bytes.get(at).ok_or(DecodeError::UnexpectedEnd { offset: at })?;
        let d = digit(token).ok_or(DecodeError::InvalidCharacter {
            offset: at,
            token: char_at(encoded, at),
        })?;
        if k == 0 {
            negative = d & 32 != 0;
            value = d & 31;
        } else {
            value = (value << 6) | d;
        }
    }
    let value = f64::from(value) / 10.0;
    Ok(if negative { -value } else { value })
}

/// The character starting at byte `offset`. Every byte before a rejected
/// one is an ASCII digit, so `offset` is always on a character boundary.
fn char_at(encoded: &str, offset: usize) -> char {
    encoded
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_move_and_line() {
        let commands = decode_path("A3cAAMAu4AAA").unwrap();
        assert_eq!(
            commands,
            vec![
                Command::MoveTo { x: -150.0, y: 0.0 },
                Command::LineTo { x: 150.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn test_move_resets_accumulator() {
        // Two moves of +10,+10 land on the same point.
        let commands = decode_path("ABkBkABkBk").unwrap();
        assert_eq!(commands[0], Command::MoveTo { x: 10.0, y: 10.0 });
        assert_eq!(commands[1], Command::MoveTo { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_close_takes_no_parameters() {
        let commands = decode_path("ABkBkgIAAAA").unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[1], Command::ClosePath);
        assert!(matches!(commands[2], Command::LineTo { .. }));
    }

    #[test]
    fn test_invalid_header() {
        // 'B' sets one of the reserved low bits.
        assert_eq!(
            decode_path("AAAAB"),
            Err(DecodeError::InvalidHeader {
                offset: 4,
                token: 'B'
            })
        );
        // Operation index 5 does not exist.
        assert!(matches!(
            decode_path("o"),
            Err(DecodeError::InvalidHeader { offset: 0, .. })
        ));
        assert!(matches!(
            decode_path("*"),
            Err(DecodeError::InvalidHeader { offset: 0, token: '*' })
        ));
    }

    #[test]
    fn test_invalid_parameter_character() {
        assert_eq!(
            decode_path("AA!AA"),
            Err(DecodeError::InvalidCharacter {
                offset: 2,
                token: '!'
            })
        );
    }

    #[test]
    fn test_non_ascii_character_is_reported_whole() {
        assert_eq!(
            decode_path("AAé"),
            Err(DecodeError::InvalidCharacter {
                offset: 2,
                token: 'é'
            })
        );
        assert_eq!(
            decode_path("ü"),
            Err(DecodeError::InvalidHeader {
                offset: 0,
                token: 'ü'
            })
        );
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(
            decode_path("AAAA"),
            Err(DecodeError::UnexpectedEnd { offset: 4 })
        );
    }
}
