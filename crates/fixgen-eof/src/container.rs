//! Container layout: header, type entries and section bodies

use crate::error::{EofError, EofResult};
use fixgen_exceptions::EofException;
use fixgen_primitives::Bytes;

/// Leading bytes of every container
pub const MAGIC: [u8; 2] = [0xEF, 0x00];
/// Supported version
pub const VERSION: u8 = 0x01;
/// Header kind of the type section
pub const KIND_TYPE: u8 = 0x01;
/// Header kind of the code sections
pub const KIND_CODE: u8 = 0x02;
/// Header kind of the subcontainer sections
pub const KIND_CONTAINER: u8 = 0x03;
/// Header kind of the data section
pub const KIND_DATA: u8 = 0xFF;
/// Header terminator
pub const TERMINATOR: u8 = 0x00;

/// Maximum number of code sections
pub const MAX_CODE_SECTIONS: usize = 1024;
/// Maximum number of subcontainers
pub const MAX_CONTAINERS: usize = 256;
/// Maximum stack height of a code section
pub const MAX_STACK_HEIGHT: u16 = 1023;
/// Maximum inputs or outputs of a code section
pub const MAX_IO: u8 = 127;
/// Output marker of a section that never returns
pub const NON_RETURNING: u8 = 0x80;
/// Maximum size of a top-level container
pub const MAX_CONTAINER_SIZE: usize = 49152;

const TYPE_ENTRY_SIZE: usize = 4;

/// One code section with its type entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSection {
    /// Stack items taken on entry
    pub inputs: u8,
    /// Stack items left on return, [`NON_RETURNING`] for none
    pub outputs: u8,
    /// Maximum growth of the stack above `inputs`
    pub max_stack_increase: u16,
    /// Instructions
    pub code: Bytes,
}

impl CodeSection {
    /// Non-returning section without inputs
    pub fn new(code: impl Into<Bytes>, max_stack_increase: u16) -> Self {
        Self {
            inputs: 0,
            outputs: NON_RETURNING,
            max_stack_increase,
            code: code.into(),
        }
    }

    /// Whether the section returns to its caller
    pub fn is_returning(&self) -> bool {
        self.outputs != NON_RETURNING
    }
}

/// A decoded container. Subcontainers stay encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Code sections, the first one is the entry point
    pub sections: Vec<CodeSection>,
    /// Encoded subcontainers
    pub containers: Vec<Bytes>,
    /// Data section contents
    pub data: Bytes,
    /// Data size written in the header, when it differs from `data.len()`
    pub declared_data_size: Option<u16>,
}

impl Container {
    /// Container with a single code section and no data
    pub fn single(section: CodeSection) -> Self {
        Self {
            sections: vec![section],
            containers: Vec::new(),
            data: Bytes::new(),
            declared_data_size: None,
        }
    }

    /// Data size as written in the header
    pub fn data_size(&self) -> usize {
        self.declared_data_size
            .map(usize::from)
            .unwrap_or(self.data.len())
    }

    /// Whether the header announces more data than the body holds
    pub fn is_truncated(&self) -> bool {
        self.data_size() > self.data.len()
    }

    /// Serialize header and bodies
    pub fn encode(&self) -> EofResult<Bytes> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);

        out.push(KIND_TYPE);
        push_u16(&mut out, "type", self.sections.len() * TYPE_ENTRY_SIZE)?;
        out.push(KIND_CODE);
        push_u16(&mut out, "code", self.sections.len())?;
        for section in &self.sections {
            push_u16(&mut out, "code", section.code.len())?;
        }
        if !self.containers.is_empty() {
            out.push(KIND_CONTAINER);
            push_u16(&mut out, "container", self.containers.len())?;
            for container in &self.containers {
                let size = u32::try_from(container.len()).map_err(|_| EofError::SectionTooLarge {
                    section: "container",
                    size: container.len(),
                })?;
                out.extend_from_slice(&size.to_be_bytes());
            }
        }
        out.push(KIND_DATA);
        push_u16(&mut out, "data", self.data_size())?;
        out.push(TERMINATOR);

        for section in &self.sections {
            out.push(section.inputs);
            out.push(section.outputs);
            out.extend_from_slice(&section.max_stack_increase.to_be_bytes());
        }
        for section in &self.sections {
            out.extend_from_slice(&section.code);
        }
        for container in &self.containers {
            out.extend_from_slice(container);
        }
        out.extend_from_slice(&self.data);
        Ok(Bytes::from(out))
    }

    /// Parse the header and split the bodies.
    ///
    /// Only structure is checked here: magic, version, header entries and body
    /// sizes. A data section shorter than announced is accepted and reported
    /// by [`Container::is_truncated`].
    pub fn decode(bytes: &[u8]) -> Result<Container, EofException> {
        if bytes.len() < MAGIC.len() {
            return Err(if MAGIC.starts_with(bytes) {
                EofException::IncompleteMagic
            } else {
                EofException::InvalidMagic
            });
        }
        if bytes[..2] != MAGIC {
            return Err(EofException::InvalidMagic);
        }
        if bytes.get(2) != Some(&VERSION) {
            return Err(EofException::InvalidVersion);
        }

        let mut r = Reader { bytes, pos: 3 };
        if r.u8() != Some(KIND_TYPE) {
            return Err(EofException::MissingTypeHeader);
        }
        let type_size = r.u16().ok_or(EofException::IncompleteSectionSize)? as usize;

        if r.u8() != Some(KIND_CODE) {
            return Err(EofException::MissingCodeHeader);
        }
        let num_code = r.u16().ok_or(EofException::IncompleteSectionNumber)? as usize;
        if num_code == 0 {
            return Err(EofException::ZeroSectionSize);
        }
        if num_code > MAX_CODE_SECTIONS {
            return Err(EofException::TooManyCodeSections);
        }
        let mut code_sizes = Vec::with_capacity(num_code);
        for _ in 0..num_code {
            let size = r.u16().ok_or(EofException::IncompleteSectionSize)? as usize;
            if size == 0 {
                return Err(EofException::ZeroSectionSize);
            }
            code_sizes.push(size);
        }

        let mut container_sizes = Vec::new();
        let mut kind = r.u8().ok_or(EofException::MissingDataSection)?;
        if kind == KIND_CONTAINER {
            let num = r.u16().ok_or(EofException::IncompleteSectionNumber)? as usize;
            if num == 0 {
                return Err(EofException::ZeroSectionSize);
            }
            if num > MAX_CONTAINERS {
                return Err(EofException::TooManyContainers);
            }
            for _ in 0..num {
                let size = r.u32().ok_or(EofException::IncompleteSectionSize)? as usize;
                if size == 0 {
                    return Err(EofException::ZeroSectionSize);
                }
                container_sizes.push(size);
            }
            kind = r.u8().ok_or(EofException::MissingDataSection)?;
        }
        match kind {
            KIND_DATA => {}
            TERMINATOR => return Err(EofException::MissingDataSection),
            _ => return Err(EofException::UnexpectedHeaderKind),
        }
        let data_size = r.u16().ok_or(EofException::IncompleteSectionSize)?;
        if r.u8() != Some(TERMINATOR) {
            return Err(EofException::MissingTerminator);
        }
        if type_size != num_code * TYPE_ENTRY_SIZE {
            return Err(EofException::InvalidTypeSectionSize);
        }

        let fixed: usize = type_size + code_sizes.iter().sum::<usize>() + container_sizes.iter().sum::<usize>();
        let remaining = bytes.len() - r.pos;
        if remaining < fixed || remaining > fixed + data_size as usize {
            return Err(EofException::InvalidSectionBodiesSize);
        }

        let types = r.take(type_size);
        let mut sections = Vec::with_capacity(num_code);
        for (i, size) in code_sizes.into_iter().enumerate() {
            let entry = &types[i * TYPE_ENTRY_SIZE..(i + 1) * TYPE_ENTRY_SIZE];
            sections.push(CodeSection {
                inputs: entry[0],
                outputs: entry[1],
                max_stack_increase: u16::from_be_bytes([entry[2], entry[3]]),
                code: Bytes::from(r.take(size)),
            });
        }
        let containers = container_sizes
            .into_iter()
            .map(|size| Bytes::from(r.take(size)))
            .collect();
        let data = Bytes::from(r.take(remaining - fixed));

        Ok(Container {
            declared_data_size: (data.len() != data_size as usize).then_some(data_size),
            sections,
            containers,
            data,
        })
    }
}

fn push_u16(out: &mut Vec<u8>, section: &'static str, value: usize) -> EofResult<()> {
    let v = u16::try_from(value).map_err(|_| EofError::SectionTooLarge { section, size: value })?;
    out.extend_from_slice(&v.to_be_bytes());
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn u8(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn u16(&mut self) -> Option<u16> {
        let s = self.bytes.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_be_bytes([s[0], s[1]]))
    }

    fn u32(&mut self) -> Option<u32> {
        let s = self.bytes.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    // callers check the length first
    fn take(&mut self, n: usize) -> &'a [u8] {
        let s = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        s
    }
}
