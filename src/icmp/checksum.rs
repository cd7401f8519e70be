/// Internet checksum (RFC 1071) over `data`.
///
/// The buffer is summed as big-endian 16-bit words. An odd trailing byte is
/// treated as the high byte of a final word whose low byte is zero. Callers
/// zero the checksum field before calling and store the result big-endian.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let [last] = words.remainder() {
        sum += u32::from(*last) << 8;
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

/// Returns true when `data` carries a valid embedded checksum.
pub fn verify(data: &[u8]) -> bool {
    checksum(data) == 0
}
