/// Encode a u32 as an unsigned LEB128 variable-length integer
pub fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        if value < 0x80 {
            buf.push(value as u8);
            break;
        }
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
}

/// Decode a variable-length integer from a slice
/// Returns (value, bytes_consumed)
///
/// Encodings that do not fit in a u32 are rejected: the fifth byte may only
/// carry the top four bits and cannot continue.
pub fn decode_varint(buf: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate().take(5) {
        if i == 4 && byte > 0x0F {
            return None; // Overflow
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    None // Incomplete
}

/// Encode an ascending id list as posting deltas, terminated by a zero delta.
///
/// The first delta is relative to -1, so id 0 is stored as 1 and a zero can
/// only ever mean "end of list".
pub fn encode_postings(ids: &[u32], buf: &mut Vec<u8>) {
    let mut prev: i64 = -1;
    for &id in ids {
        let delta = (id as i64 - prev) as u32;
        encode_varint(delta, buf);
        prev = id as i64;
    }
    encode_varint(0, buf);
}

/// Read a big-endian u32 at `offset`, if the slice is long enough
#[inline]
pub fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Append a big-endian u32
#[inline]
pub fn put_u32_be(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_is_leb128() {
        let mut buf = Vec::new();
        encode_varint(300, &mut buf);
        assert_eq!(buf, vec![0xAC, 0x02]);
        assert_eq!(decode_varint(&buf), Some((300, 2)));
    }

    #[test]
    fn test_varint_incomplete() {
        assert_eq!(decode_varint(&[0x80, 0x80]), None);
        assert_eq!(decode_varint(&[]), None);
    }

    #[test]
    fn test_varint_rejects_overflow() {
        assert_eq!(decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]), Some((u32::MAX, 5)));
        assert_eq!(decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x10]), None);
        assert_eq!(decode_varint(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]), None);

        let mut buf = Vec::new();
        encode_varint(u32::MAX, &mut buf);
        assert_eq!(decode_varint(&buf), Some((u32::MAX, 5)));
    }

    #[test]
    fn test_postings_start_at_minus_one() {
        let mut buf = Vec::new();
        encode_postings(&[0, 1, 5], &mut buf);
        assert_eq!(buf, vec![1, 1, 4, 0]);
    }

    #[test]
    fn test_read_u32_be_bounds() {
        let data = [0, 0, 1, 2, 9];
        assert_eq!(read_u32_be(&data, 0), Some(0x0102));
        assert_eq!(read_u32_be(&data, 2), None);
        assert_eq!(read_u32_be(&data, usize::MAX), None);
    }
}
