//! Container validation
//!
//! Checks run in a fixed order and the first failure wins:
//! size limit, header, body sizes, type entries, then for each code section
//! its instructions, references, non-returning flag and stack heights,
//! then section reachability and finally every subcontainer recursively.

use crate::container::{
    Container, CodeSection, MAX_CONTAINER_SIZE, MAX_IO, MAX_STACK_HEIGHT, NON_RETURNING,
};
use crate::error::EofResult;
use crate::opcode::{immediate_len, info, op};
use fixgen_exceptions::EofException;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Operand stack limit that calls must stay under
const STACK_LIMIT: i32 = 1024;

/// How a container is going to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerKind {
    /// Deployed code, may not contain RETURNCODE
    #[default]
    Runtime,
    /// Creation code, may not contain STOP or RETURN
    Initcode,
}

/// Validate a top-level container and return its decoded form
pub fn validate(bytes: &[u8], kind: ContainerKind) -> EofResult<Container> {
    if bytes.len() > MAX_CONTAINER_SIZE {
        return Err(EofException::ContainerSizeAboveLimit.into());
    }
    let result = validate_container(bytes, kind, true);
    match &result {
        Ok(c) => tracing::debug!(sections = c.sections.len(), containers = c.containers.len(), ?kind, "container valid"),
        Err(e) => tracing::debug!(exception = %e, ?kind, "container invalid"),
    }
    result.map_err(Into::into)
}

fn validate_container(
    bytes: &[u8],
    kind: ContainerKind,
    toplevel: bool,
) -> Result<Container, EofException> {
    let c = Container::decode(bytes)?;
    if toplevel && c.is_truncated() {
        return Err(EofException::ToplevelContainerTruncated);
    }
    validate_types(&c)?;

    let mut calls = Vec::with_capacity(c.sections.len());
    let mut eofcreate = vec![false; c.containers.len()];
    let mut returncode = vec![false; c.containers.len()];

    for (idx, section) in c.sections.iter().enumerate() {
        let instrs = scan_instructions(&section.code)?;
        let refs = check_references(&c, idx, &instrs, kind)?;

        let returning = refs.has_retf || refs.jumpf_to_returning;
        if returning != section.is_returning() {
            return Err(EofException::InvalidNonReturningFlag);
        }

        let max = stack_pass(&c, idx, &instrs)?;
        if max > MAX_STACK_HEIGHT {
            return Err(EofException::MaxStackHeightAboveLimit);
        }
        if max as u32 != section.inputs as u32 + section.max_stack_increase as u32 {
            return Err(EofException::InvalidMaxStackHeight);
        }

        for i in refs.eofcreate {
            eofcreate[i] = true;
        }
        for i in refs.returncode {
            returncode[i] = true;
        }
        calls.push(refs.calls);
    }

    check_reachable(&calls)?;

    for (i, sub) in c.containers.iter().enumerate() {
        let sub_kind = match (eofcreate[i], returncode[i]) {
            (false, false) => return Err(EofException::OrphanSubcontainer),
            (true, true) => return Err(EofException::IncompatibleContainerKind),
            (true, false) => ContainerKind::Initcode,
            (false, true) => ContainerKind::Runtime,
        };
        let decoded = validate_container(sub, sub_kind, false)?;
        if sub_kind == ContainerKind::Initcode && decoded.is_truncated() {
            return Err(EofException::EofcreateWithTruncatedContainer);
        }
    }

    Ok(c)
}

fn validate_types(c: &Container) -> Result<(), EofException> {
    if let Some(first) = c.sections.first() {
        if first.inputs != 0 || first.outputs != NON_RETURNING {
            return Err(EofException::InvalidFirstSectionType);
        }
    }
    for section in &c.sections {
        if section.inputs > MAX_IO || (section.outputs > MAX_IO && section.outputs != NON_RETURNING) {
            return Err(EofException::InputsOutputsNumAboveLimit);
        }
        if section.inputs as u32 + section.max_stack_increase as u32 > MAX_STACK_HEIGHT as u32 {
            return Err(EofException::MaxStackHeightAboveLimit);
        }
    }
    Ok(())
}

/// Start offsets of every instruction in `code`
pub(crate) fn scan_instructions(code: &[u8]) -> Result<Vec<usize>, EofException> {
    let mut positions = Vec::new();
    let mut pos = 0;
    while pos < code.len() {
        if info(code[pos]).is_none() {
            return Err(EofException::UndefinedInstruction);
        }
        let imm = immediate_len(code, pos).ok_or(EofException::TruncatedInstruction)?;
        positions.push(pos);
        pos += 1 + imm;
    }
    let terminated = positions
        .last()
        .and_then(|&last| info(code[last]))
        .map_or(false, |i| i.terminating);
    if !terminated {
        return Err(EofException::MissingStopOpcode);
    }
    Ok(positions)
}

#[derive(Default)]
struct SectionRefs {
    calls: Vec<usize>,
    eofcreate: Vec<usize>,
    returncode: Vec<usize>,
    has_retf: bool,
    jumpf_to_returning: bool,
}

fn read_u16(code: &[u8], pos: usize) -> usize {
    u16::from_be_bytes([code[pos], code[pos + 1]]) as usize
}

fn read_i16(code: &[u8], pos: usize) -> isize {
    i16::from_be_bytes([code[pos], code[pos + 1]]) as isize
}

/// Relative jump targets of the instruction at `pos`, resolved to absolute offsets
fn jump_targets(code: &[u8], pos: usize) -> Vec<isize> {
    let opcode = code[pos];
    match opcode {
        op::RJUMP | op::RJUMPI => vec![pos as isize + 3 + read_i16(code, pos + 1)],
        op::RJUMPV => {
            let count = code[pos + 1] as usize + 1;
            let next = (pos + 2 + 2 * count) as isize;
            (0..count)
                .map(|k| next + read_i16(code, pos + 2 + 2 * k))
                .collect()
        }
        _ => Vec::new(),
    }
}

fn check_references(
    c: &Container,
    idx: usize,
    instrs: &[usize],
    kind: ContainerKind,
) -> Result<SectionRefs, EofException> {
    let section = &c.sections[idx];
    let code = &section.code;
    let mut is_start = vec![false; code.len()];
    for &pos in instrs {
        is_start[pos] = true;
    }

    let mut refs = SectionRefs::default();
    for &pos in instrs {
        match code[pos] {
            op::RJUMP | op::RJUMPI | op::RJUMPV => {
                for target in jump_targets(code, pos) {
                    let valid = usize::try_from(target)
                        .ok()
                        .and_then(|t| is_start.get(t).copied())
                        .unwrap_or(false);
                    if !valid {
                        return Err(EofException::InvalidRjumpDestination);
                    }
                }
            }
            op::CALLF => {
                let target = read_u16(code, pos + 1);
                let callee = c.sections.get(target).ok_or(EofException::InvalidCodeSectionIndex)?;
                if !callee.is_returning() {
                    return Err(EofException::CallfToNonReturning);
                }
                refs.calls.push(target);
            }
            op::JUMPF => {
                let target = read_u16(code, pos + 1);
                let callee = c.sections.get(target).ok_or(EofException::InvalidCodeSectionIndex)?;
                if callee.is_returning() {
                    if section.is_returning() && callee.outputs > section.outputs {
                        return Err(EofException::JumpfDestinationIncompatibleOutputs);
                    }
                    refs.jumpf_to_returning = true;
                }
                refs.calls.push(target);
            }
            op::RETF => refs.has_retf = true,
            op::DATALOADN => {
                if read_u16(code, pos + 1) + 32 > c.data_size() {
                    return Err(EofException::InvalidDataloadnIndex);
                }
            }
            op::EOFCREATE => {
                let target = code[pos + 1] as usize;
                if target >= c.containers.len() {
                    return Err(EofException::InvalidContainerSectionIndex);
                }
                refs.eofcreate.push(target);
            }
            op::RETURNCODE => {
                let target = code[pos + 1] as usize;
                if target >= c.containers.len() {
                    return Err(EofException::InvalidContainerSectionIndex);
                }
                if kind == ContainerKind::Runtime {
                    return Err(EofException::IncompatibleContainerKind);
                }
                refs.returncode.push(target);
            }
            op::STOP | op::RETURN if kind == ContainerKind::Initcode => {
                return Err(EofException::IncompatibleContainerKind);
            }
            _ => {}
        }
    }
    Ok(refs)
}

/// Walk the section in code order tracking a `(min, max)` stack height range
/// per instruction and return the maximum height reached.
pub(crate) fn stack_pass(c: &Container, idx: usize, instrs: &[usize]) -> Result<u16, EofException> {
    let section = &c.sections[idx];
    let code = &section.code;
    let inputs = section.inputs as i32;

    let mut heights: Vec<Option<(i32, i32)>> = vec![None; code.len()];
    heights[0] = Some((inputs, inputs));
    let mut max_height = inputs;

    for &pos in instrs {
        let (lo, hi) = heights[pos].ok_or(EofException::UnreachableInstructions)?;
        let opcode = code[pos];
        let meta = info(opcode).ok_or(EofException::UndefinedInstruction)?;

        let (required, change) = match opcode {
            op::CALLF => {
                let callee = callee(c, code, pos)?;
                if hi + callee.max_stack_increase as i32 > STACK_LIMIT {
                    return Err(EofException::StackOverflow);
                }
                let ins = callee.inputs as i32;
                (ins, callee.outputs as i32 - ins)
            }
            op::JUMPF => {
                let callee = callee(c, code, pos)?;
                if hi + callee.max_stack_increase as i32 > STACK_LIMIT {
                    return Err(EofException::StackOverflow);
                }
                if callee.is_returning() {
                    let required = section.outputs as i32 + callee.inputs as i32 - callee.outputs as i32;
                    if hi > required {
                        return Err(EofException::StackHigherThanOutputs);
                    }
                    (required, 0)
                } else {
                    (callee.inputs as i32, 0)
                }
            }
            op::RETF => {
                let required = section.outputs as i32;
                if hi > required {
                    return Err(EofException::StackHigherThanOutputs);
                }
                (required, 0)
            }
            op::DUPN => (code[pos + 1] as i32 + 1, 1),
            op::SWAPN => (code[pos + 1] as i32 + 2, 0),
            op::EXCHANGE => {
                let imm = code[pos + 1] as i32;
                ((imm >> 4) + (imm & 0x0f) + 3, 0)
            }
            _ => (meta.inputs as i32, meta.outputs as i32 - meta.inputs as i32),
        };
        if lo < required {
            return Err(EofException::StackUnderflow);
        }

        let next = (lo + change, hi + change);
        max_height = max_height.max(next.1);

        let imm = immediate_len(code, pos).ok_or(EofException::TruncatedInstruction)?;
        let mut successors = jump_targets(code, pos);
        if !meta.terminating {
            successors.push((pos + 1 + imm) as isize);
        }
        for target in successors {
            let target = usize::try_from(target).map_err(|_| EofException::InvalidRjumpDestination)?;
            if target <= pos {
                if heights.get(target).copied().flatten() != Some(next) {
                    return Err(EofException::StackHeightMismatch);
                }
                continue;
            }
            let slot = heights.get_mut(target).ok_or(EofException::InvalidRjumpDestination)?;
            *slot = Some(match *slot {
                Some((l, h)) => (l.min(next.0), h.max(next.1)),
                None => next,
            });
        }
    }

    Ok(max_height.max(0) as u16)
}

fn callee<'a>(c: &'a Container, code: &[u8], pos: usize) -> Result<&'a CodeSection, EofException> {
    c.sections
        .get(read_u16(code, pos + 1))
        .ok_or(EofException::InvalidCodeSectionIndex)
}

fn check_reachable(calls: &[Vec<usize>]) -> Result<(), EofException> {
    let mut seen = vec![false; calls.len()];
    let mut queue = VecDeque::from([0usize]);
    seen[0] = true;
    while let Some(idx) = queue.pop_front() {
        for &next in &calls[idx] {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    if seen.iter().all(|s| *s) {
        Ok(())
    } else {
        Err(EofException::UnreachableCodeSections)
    }
}
