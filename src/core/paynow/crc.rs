/// CRC-16/CCITT-FALSE: polynomial 0x1021, initial value 0xFFFF, no reflection, no final xor.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

/// Checksum formatted the way the `63` field carries it.
pub fn crc16_hex(data: &str) -> String {
    format!("{:04X}", crc16_ccitt(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // Standard check input for the CRC catalogue
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_input_is_initial_value() {
        assert_eq!(crc16_ccitt(b""), 0xFFFF);
        assert_eq!(crc16_hex(""), "FFFF");
    }
}
