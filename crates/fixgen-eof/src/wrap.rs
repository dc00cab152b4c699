//! Embedding plain bytecode in a single-section container

use crate::container::{CodeSection, Container, MAX_CONTAINER_SIZE};
use crate::error::{EofError, EofResult};
use crate::opcode::{immediate_len, info, op};
use crate::validate::{scan_instructions, stack_pass, validate, ContainerKind};
use fixgen_primitives::Bytes;

/// Wrap `code` as the only code section of a runtime container.
///
/// A STOP is appended when the code falls off its end. The section's
/// max stack increase is computed from the code.
pub fn wrap_code(code: &[u8]) -> EofResult<Bytes> {
    if code.is_empty() {
        return Err(EofError::Unwrappable("empty code".into()));
    }

    let mut last = 0;
    let mut pos = 0;
    while pos < code.len() {
        if info(code[pos]).is_none() {
            return Err(EofError::Unwrappable(format!(
                "undefined instruction 0x{:02x} at offset {}",
                code[pos], pos
            )));
        }
        let imm = immediate_len(code, pos).ok_or_else(|| {
            EofError::Unwrappable(format!("truncated immediate at offset {}", pos))
        })?;
        last = pos;
        pos += 1 + imm;
    }

    let mut body = code.to_vec();
    if !info(code[last]).map_or(false, |i| i.terminating) {
        body.push(op::STOP);
    }

    let instrs = scan_instructions(&body).map_err(|e| EofError::Unwrappable(e.to_string()))?;
    let mut container = Container::single(CodeSection::new(body, 0));
    let max = stack_pass(&container, 0, &instrs).map_err(|e| EofError::Unwrappable(e.to_string()))?;
    container.sections[0].max_stack_increase = max;

    let bytes = container.encode()?;
    if bytes.len() > MAX_CONTAINER_SIZE {
        return Err(EofError::Unwrappable(format!(
            "wrapped container is {} bytes",
            bytes.len()
        )));
    }
    validate(&bytes, ContainerKind::Runtime)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_stop() {
        // PUSH1 1 PUSH1 0 SSTORE
        let wrapped = wrap_code(&[0x60, 0x01, 0x60, 0x00, 0x55]).unwrap();
        let c = Container::decode(&wrapped).unwrap();
        assert_eq!(c.sections[0].code.last(), Some(&op::STOP));
        assert_eq!(c.sections[0].max_stack_increase, 2);
    }

    #[test]
    fn test_keeps_terminating_tail() {
        let wrapped = wrap_code(&[0x5f, 0x5f, op::REVERT]).unwrap();
        let c = Container::decode(&wrapped).unwrap();
        assert_eq!(&c.sections[0].code[..], &[0x5f, 0x5f, op::REVERT]);
    }

    #[test]
    fn test_rejects_legacy_only_code() {
        // PUSH1 0 JUMP
        assert!(matches!(wrap_code(&[0x60, 0x00, 0x56]), Err(EofError::Unwrappable(_))));
        assert!(matches!(wrap_code(&[]), Err(EofError::Unwrappable(_))));
        assert!(matches!(wrap_code(&[0x61, 0x00]), Err(EofError::Unwrappable(_))));
    }

    #[test]
    fn test_stack_underflow_is_unwrappable() {
        assert!(matches!(wrap_code(&[0x01]), Err(EofError::Unwrappable(_))));
    }
}
