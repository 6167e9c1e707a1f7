//! BCH(63,45) parity used to protect the EOT data block.

/// Number of data bits covered by the parity.
pub const DATA_LEN: usize = 45;
/// Number of parity bits.
pub const PARITY_LEN: usize = 18;

/// Generator polynomial of the triple-error-correcting BCH(63,45) code, x^18 included.
pub const GENERATOR: u32 = 0o1_701_317;

const MASK: u32 = (1 << PARITY_LEN) - 1;

/// Compute the parity for `data`, the remainder of `data(x) * x^18` modulo
/// [GENERATOR]. The first element of `data` is the highest order coefficient.
pub fn parity(data: &[bool]) -> u32 {
    let mut reg: u32 = 0;
    for &bit in data {
        let feedback = ((reg >> (PARITY_LEN - 1)) & 1 == 1) ^ bit;
        reg = (reg << 1) & MASK;
        if feedback {
            reg ^= GENERATOR & MASK;
        }
    }
    reg
}

/// Parity as transmitted, most significant bit first.
pub fn parity_bits(data: &[bool]) -> [bool; PARITY_LEN] {
    let p = parity(data);
    let mut out = [false; PARITY_LEN];
    for (i, bit) in out.iter_mut().enumerate() {
        *bit = (p >> (PARITY_LEN - 1 - i)) & 1 == 1;
    }
    out
}

/// Returns true if `codeword` is [DATA_LEN] data bits followed by their matching
/// [PARITY_LEN] parity bits. Anything beyond that is ignored.
pub fn check(codeword: &[bool]) -> bool {
    if codeword.len() < DATA_LEN + PARITY_LEN {
        return false;
    }
    let (data, rest) = codeword.split_at(DATA_LEN);
    parity_bits(data)[..] == rest[..PARITY_LEN]
}
