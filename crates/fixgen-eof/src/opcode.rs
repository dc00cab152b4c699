//! Instruction table for EOF code sections

/// Static properties of one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    /// Stack items consumed
    pub inputs: u8,
    /// Stack items produced
    pub outputs: u8,
    /// Immediate bytes following the opcode. RJUMPV has a variable tail on top of this.
    pub immediate: u8,
    /// Ends the basic block with no fall-through
    pub terminating: bool,
}

#[allow(missing_docs)]
pub mod op {
    pub const STOP: u8 = 0x00;
    pub const PUSH0: u8 = 0x5F;
    pub const PUSH1: u8 = 0x60;
    pub const PUSH32: u8 = 0x7F;
    pub const DATALOADN: u8 = 0xD1;
    pub const RJUMP: u8 = 0xE0;
    pub const RJUMPI: u8 = 0xE1;
    pub const RJUMPV: u8 = 0xE2;
    pub const CALLF: u8 = 0xE3;
    pub const RETF: u8 = 0xE4;
    pub const JUMPF: u8 = 0xE5;
    pub const DUPN: u8 = 0xE6;
    pub const SWAPN: u8 = 0xE7;
    pub const EXCHANGE: u8 = 0xE8;
    pub const EOFCREATE: u8 = 0xEC;
    pub const RETURNCODE: u8 = 0xEE;
    pub const RETURN: u8 = 0xF3;
    pub const REVERT: u8 = 0xFD;
    pub const INVALID: u8 = 0xFE;
}

const fn plain(inputs: u8, outputs: u8) -> Option<OpInfo> {
    Some(OpInfo {
        inputs,
        outputs,
        immediate: 0,
        terminating: false,
    })
}

const fn with_imm(inputs: u8, outputs: u8, immediate: u8) -> Option<OpInfo> {
    Some(OpInfo {
        inputs,
        outputs,
        immediate,
        terminating: false,
    })
}

const fn terminating(inputs: u8, immediate: u8) -> Option<OpInfo> {
    Some(OpInfo {
        inputs,
        outputs: 0,
        immediate,
        terminating: true,
    })
}

static TABLE: [Option<OpInfo>; 256] = build_table();

// Legacy-only instructions (JUMP, PC, GAS, CODECOPY, CALL, CREATE, SELFDESTRUCT, ...)
// are left undefined.
const fn build_table() -> [Option<OpInfo>; 256] {
    let mut t: [Option<OpInfo>; 256] = [None; 256];

    t[0x00] = terminating(0, 0);
    t[0x01] = plain(2, 1);
    t[0x02] = plain(2, 1);
    t[0x03] = plain(2, 1);
    t[0x04] = plain(2, 1);
    t[0x05] = plain(2, 1);
    t[0x06] = plain(2, 1);
    t[0x07] = plain(2, 1);
    t[0x08] = plain(3, 1);
    t[0x09] = plain(3, 1);
    t[0x0A] = plain(2, 1);
    t[0x0B] = plain(2, 1);

    t[0x10] = plain(2, 1);
    t[0x11] = plain(2, 1);
    t[0x12] = plain(2, 1);
    t[0x13] = plain(2, 1);
    t[0x14] = plain(2, 1);
    t[0x15] = plain(1, 1);
    t[0x16] = plain(2, 1);
    t[0x17] = plain(2, 1);
    t[0x18] = plain(2, 1);
    t[0x19] = plain(1, 1);
    t[0x1A] = plain(2, 1);
    t[0x1B] = plain(2, 1);
    t[0x1C] = plain(2, 1);
    t[0x1D] = plain(2, 1);

    t[0x20] = plain(2, 1);

    t[0x30] = plain(0, 1);
    t[0x31] = plain(1, 1);
    t[0x32] = plain(0, 1);
    t[0x33] = plain(0, 1);
    t[0x34] = plain(0, 1);
    t[0x35] = plain(1, 1);
    t[0x36] = plain(0, 1);
    t[0x37] = plain(3, 0);
    t[0x3A] = plain(0, 1);
    t[0x3D] = plain(0, 1);
    t[0x3E] = plain(3, 0);

    t[0x40] = plain(1, 1);
    t[0x41] = plain(0, 1);
    t[0x42] = plain(0, 1);
    t[0x43] = plain(0, 1);
    t[0x44] = plain(0, 1);
    t[0x45] = plain(0, 1);
    t[0x46] = plain(0, 1);
    t[0x47] = plain(0, 1);
    t[0x48] = plain(0, 1);
    t[0x49] = plain(1, 1);
    t[0x4A] = plain(0, 1);

    t[0x50] = plain(1, 0);
    t[0x51] = plain(1, 1);
    t[0x52] = plain(2, 0);
    t[0x53] = plain(2, 0);
    t[0x54] = plain(1, 1);
    t[0x55] = plain(2, 0);
    t[0x59] = plain(0, 1);
    t[0x5B] = plain(0, 0);
    t[0x5C] = plain(1, 1);
    t[0x5D] = plain(2, 0);
    t[0x5E] = plain(3, 0);
    t[0x5F] = plain(0, 1);

    let mut i = 0;
    while i < 32 {
        t[0x60 + i] = with_imm(0, 1, (i + 1) as u8);
        i += 1;
    }
    let mut n = 0;
    while n < 16 {
        t[0x80 + n] = plain((n + 1) as u8, (n + 2) as u8);
        t[0x90 + n] = plain((n + 2) as u8, (n + 2) as u8);
        n += 1;
    }
    let mut topics = 0;
    while topics < 5 {
        t[0xA0 + topics] = plain((topics + 2) as u8, 0);
        topics += 1;
    }

    t[0xD0] = plain(1, 1);
    t[0xD1] = with_imm(0, 1, 2);
    t[0xD2] = plain(0, 1);
    t[0xD3] = plain(3, 0);

    t[0xE0] = terminating(0, 2);
    t[0xE1] = with_imm(1, 0, 2);
    t[0xE2] = with_imm(1, 0, 1);
    t[0xE3] = with_imm(0, 0, 2);
    t[0xE4] = terminating(0, 0);
    t[0xE5] = terminating(0, 2);
    t[0xE6] = with_imm(0, 1, 1);
    t[0xE7] = with_imm(0, 0, 1);
    t[0xE8] = with_imm(0, 0, 1);
    t[0xEC] = with_imm(4, 1, 1);
    t[0xEE] = terminating(2, 1);

    t[0xF3] = terminating(2, 0);
    t[0xF7] = plain(1, 1);
    t[0xF8] = plain(4, 1);
    t[0xF9] = plain(3, 1);
    t[0xFB] = plain(3, 1);
    t[0xFD] = terminating(2, 0);
    t[0xFE] = terminating(0, 0);

    t
}

/// Properties of `opcode`, `None` when it is undefined in EOF code
pub fn info(opcode: u8) -> Option<OpInfo> {
    TABLE[opcode as usize]
}

/// Total immediate length of the instruction at `pos`, including the RJUMPV table.
/// Returns `None` when the code ends inside the immediates.
pub fn immediate_len(code: &[u8], pos: usize) -> Option<usize> {
    let opcode = *code.get(pos)?;
    let base = info(opcode)?.immediate as usize;
    let len = if opcode == op::RJUMPV {
        let max_index = *code.get(pos + 1)? as usize;
        1 + 2 * (max_index + 1)
    } else {
        base
    };
    (pos + 1 + len <= code.len()).then_some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_only_undefined() {
        for byte in [0x38u8, 0x39, 0x3B, 0x3C, 0x3F, 0x56, 0x57, 0x58, 0x5A, 0xF0, 0xF1, 0xF2, 0xF4, 0xF5, 0xFA, 0xFF] {
            assert_eq!(info(byte), None, "0x{:02x} must be undefined", byte);
        }
    }

    #[test]
    fn test_stack_effects() {
        assert_eq!(info(0x80).map(|i| (i.inputs, i.outputs)), Some((1, 2)));
        assert_eq!(info(0x9F).map(|i| (i.inputs, i.outputs)), Some((17, 17)));
        assert_eq!(info(0xA4).map(|i| i.inputs), Some(6));
        assert_eq!(info(op::PUSH32).map(|i| i.immediate), Some(32));
    }

    #[test]
    fn test_terminating() {
        for byte in [op::STOP, op::RETURN, op::REVERT, op::INVALID, op::RETF, op::JUMPF, op::RETURNCODE, op::RJUMP] {
            assert!(info(byte).map_or(false, |i| i.terminating));
        }
        assert!(!info(op::RJUMPI).map_or(true, |i| i.terminating));
    }

    #[test]
    fn test_immediate_len() {
        assert_eq!(immediate_len(&[op::PUSH1, 0x01], 0), Some(1));
        assert_eq!(immediate_len(&[op::PUSH1], 0), None);
        assert_eq!(immediate_len(&[op::RJUMPV, 0x01, 0, 0, 0, 0], 0), Some(5));
        assert_eq!(immediate_len(&[op::RJUMPV, 0x01, 0, 0, 0], 0), None);
        assert_eq!(immediate_len(&[op::RJUMPV], 0), None);
    }
}
