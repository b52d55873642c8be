use crate::cursor::TokenCursor;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::types::OperandType;

// Operand token layout.
const COMPONENTS_MASK: u32 = 0x3;
const SELECTION_SHIFT: u32 = 2;
const SELECTION_MASK: u32 = 0x3;
const SELECTOR_SHIFT: u32 = 4;
const TYPE_SHIFT: u32 = 12;
const TYPE_MASK: u32 = 0xFF;
const INDEX_DIM_SHIFT: u32 = 20;
const INDEX_DIM_MASK: u32 = 0x3;
const INDEX_REP_SHIFT: u32 = 22;
const INDEX_REP_BITS: u32 = 3;
const INDEX_REP_MASK: u32 = 0x7;
const EXTENDED_BIT: u32 = 1 << 31;

// Extended operand token layout.
const EXT_TYPE_MASK: u32 = 0x3F;
const EXT_TYPE_EMPTY: u32 = 0;
const EXT_TYPE_MODIFIER: u32 = 1;
const EXT_NEGATE_BIT: u32 = 1 << 6;
const EXT_ABSOLUTE_BIT: u32 = 1 << 7;

/// Number of components an operand carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentCount {
    Zero,
    /// A scalar, broadcast to all channels when read.
    One,
    Four,
}

impl ComponentCount {
    pub const fn len(self) -> usize {
        match self {
            ComponentCount::Zero => 0,
            ComponentCount::One => 1,
            ComponentCount::Four => 4,
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, ComponentCount::Zero)
    }
}

/// Component selection of a four-component operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSelection {
    /// Write mask (bit 0 = x .. bit 3 = w).
    Mask(u8),
    /// Source lane for each of x, y, z, w.
    Swizzle([u8; 4]),
    /// One lane broadcast to every channel.
    Scalar(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRepresentation {
    Immediate32,
    Immediate64,
    Relative,
    Immediate32PlusRelative,
    Immediate64PlusRelative,
}

impl IndexRepresentation {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => IndexRepresentation::Immediate32,
            1 => IndexRepresentation::Immediate64,
            2 => IndexRepresentation::Relative,
            3 => IndexRepresentation::Immediate32PlusRelative,
            4 => IndexRepresentation::Immediate64PlusRelative,
            _ => return None,
        })
    }

    pub const fn raw(self) -> u32 {
        match self {
            IndexRepresentation::Immediate32 => 0,
            IndexRepresentation::Immediate64 => 1,
            IndexRepresentation::Relative => 2,
            IndexRepresentation::Immediate32PlusRelative => 3,
            IndexRepresentation::Immediate64PlusRelative => 4,
        }
    }

    pub const fn has_relative(self) -> bool {
        matches!(
            self,
            IndexRepresentation::Relative
                | IndexRepresentation::Immediate32PlusRelative
                | IndexRepresentation::Immediate64PlusRelative
        )
    }
}

/// One dimension of an operand's register index.
///
/// The effective index is `displacement + value(relative)`. 32-bit displacements
/// are sign-extended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandIndex {
    pub representation: IndexRepresentation,
    pub displacement: i64,
    pub relative: Option<Box<Operand>>,
}

impl OperandIndex {
    /// A plain 32-bit immediate index.
    pub fn immediate(value: u32) -> Self {
        Self {
            representation: IndexRepresentation::Immediate32,
            displacement: i64::from(value as i32),
            relative: None,
        }
    }
}

/// Inline values of an immediate operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImmediateValues {
    Bits32(Vec<u32>),
    Bits64(Vec<u64>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub ty: OperandType,
    pub components: ComponentCount,
    /// Present only for four-component operands.
    pub selection: Option<ComponentSelection>,
    /// Up to three index dimensions, outermost first.
    pub indices: Vec<OperandIndex>,
    pub negate: bool,
    pub absolute: bool,
    /// Present only for `Immediate32`/`Immediate64` operands.
    pub immediate: Option<ImmediateValues>,
}

impl Operand {
    /// An operand of `ty` with no components or indices.
    pub fn new(ty: OperandType) -> Self {
        Self {
            ty,
            components: ComponentCount::Zero,
            selection: None,
            indices: Vec::new(),
            negate: false,
            absolute: false,
            immediate: None,
        }
    }

    /// Displacement of index dimension `dim`, when it is a plain immediate.
    pub fn immediate_index(&self, dim: usize) -> Option<i64> {
        self.indices
            .get(dim)
            .filter(|index| index.relative.is_none())
            .map(|index| index.displacement)
    }

    /// Appends the token encoding of this operand to `out`.
    pub fn encode(&self, out: &mut Vec<u32>) {
        let components = match self.components {
            ComponentCount::Zero => 0,
            ComponentCount::One => 1,
            ComponentCount::Four => 2,
        };
        let selection = match self.selection {
            None => 0,
            Some(ComponentSelection::Mask(mask)) => u32::from(mask & 0xF) << SELECTOR_SHIFT,
            Some(ComponentSelection::Swizzle(lanes)) => {
                let packed = lanes
                    .iter()
                    .enumerate()
                    .fold(0u32, |acc, (i, &lane)| acc | (u32::from(lane & 3) << (2 * i)));
                (1 << SELECTION_SHIFT) | (packed << SELECTOR_SHIFT)
            }
            Some(ComponentSelection::Scalar(lane)) => {
                (2 << SELECTION_SHIFT) | (u32::from(lane & 3) << SELECTOR_SHIFT)
            }
        };
        let extended = self.negate || self.absolute;

        let mut token = components
            | selection
            | (self.ty.raw() << TYPE_SHIFT)
            | ((self.indices.len() as u32 & INDEX_DIM_MASK) << INDEX_DIM_SHIFT);
        for (i, index) in self.indices.iter().enumerate() {
            token |= index.representation.raw() << (INDEX_REP_SHIFT + INDEX_REP_BITS * i as u32);
        }
        if extended {
            token |= EXTENDED_BIT;
        }
        out.push(token);

        if extended {
            let mut ext = EXT_TYPE_MODIFIER;
            if self.negate {
                ext |= EXT_NEGATE_BIT;
            }
            if self.absolute {
                ext |= EXT_ABSOLUTE_BIT;
            }
            out.push(ext);
        }

        for index in &self.indices {
            match index.representation {
                IndexRepresentation::Immediate32 | IndexRepresentation::Immediate32PlusRelative => {
                    out.push(index.displacement as u32);
                }
                IndexRepresentation::Immediate64 | IndexRepresentation::Immediate64PlusRelative => {
                    out.push(index.displacement as u32);
                    out.push(((index.displacement as u64) >> 32) as u32);
                }
                IndexRepresentation::Relative => {}
            }
            if let Some(relative) = &index.relative {
                relative.encode(out);
            }
        }

        match &self.immediate {
            Some(ImmediateValues::Bits32(values)) => out.extend_from_slice(values),
            Some(ImmediateValues::Bits64(values)) => {
                for v in values {
                    out.push(*v as u32);
                    out.push((*v >> 32) as u32);
                }
            }
            None => {}
        }
    }
}

/// Decodes operands, bounding how deeply relative addressing may nest.
#[derive(Debug, Clone, Copy)]
pub struct OperandDecoder {
    max_relative_depth: usize,
}

impl OperandDecoder {
    pub fn new(max_relative_depth: usize) -> Self {
        Self { max_relative_depth }
    }

    /// Decodes one operand starting at the cursor position.
    pub fn decode(&self, cursor: &mut TokenCursor<'_>) -> Result<Operand, DecodeError> {
        self.decode_at_depth(cursor, 0)
    }

    fn decode_at_depth(
        &self,
        cursor: &mut TokenCursor<'_>,
        depth: usize,
    ) -> Result<Operand, DecodeError> {
        if depth > self.max_relative_depth {
            return Err(cursor.error(DecodeErrorKind::RelativeAddressingTooDeep {
                max: self.max_relative_depth,
            }));
        }

        let token_at = cursor.position();
        let token = cursor.read_u32()?;
        let err = |kind| DecodeError::new(token_at, kind);

        let raw_type = (token >> TYPE_SHIFT) & TYPE_MASK;
        let ty = OperandType::from_raw(raw_type)
            .ok_or_else(|| err(DecodeErrorKind::UnknownOperandType(raw_type)))?;

        let raw_components = token & COMPONENTS_MASK;
        let mode = (token >> SELECTION_SHIFT) & SELECTION_MASK;
        let selector = token >> SELECTOR_SHIFT;
        let (components, selection) = match raw_components {
            0 => (ComponentCount::Zero, None),
            1 => (ComponentCount::One, None),
            2 => {
                let selection = match mode {
                    0 => ComponentSelection::Mask((selector & 0xF) as u8),
                    1 => ComponentSelection::Swizzle([
                        (selector & 3) as u8,
                        ((selector >> 2) & 3) as u8,
                        ((selector >> 4) & 3) as u8,
                        ((selector >> 6) & 3) as u8,
                    ]),
                    2 => ComponentSelection::Scalar((selector & 3) as u8),
                    _ => {
                        return Err(err(DecodeErrorKind::UnknownOperandComponentMode {
                            components: raw_components,
                            mode,
                        }))
                    }
                };
                (ComponentCount::Four, Some(selection))
            }
            _ => {
                return Err(err(DecodeErrorKind::UnknownOperandComponentMode {
                    components: raw_components,
                    mode,
                }))
            }
        };

        let mut operand = Operand {
            components,
            selection,
            ..Operand::new(ty)
        };

        if token & EXTENDED_BIT != 0 {
            let ext_at = cursor.position();
            let ext = cursor.read_u32()?;
            match ext & EXT_TYPE_MASK {
                EXT_TYPE_EMPTY => {}
                EXT_TYPE_MODIFIER => {
                    operand.negate = ext & EXT_NEGATE_BIT != 0;
                    operand.absolute = ext & EXT_ABSOLUTE_BIT != 0;
                }
                other => {
                    return Err(DecodeError::new(
                        ext_at,
                        DecodeErrorKind::UnknownExtendedTokenKind(other),
                    ))
                }
            }
        }

        let dims = (token >> INDEX_DIM_SHIFT) & INDEX_DIM_MASK;
        for dim in 0..dims {
            let raw_rep = (token >> (INDEX_REP_SHIFT + INDEX_REP_BITS * dim)) & INDEX_REP_MASK;
            let representation = IndexRepresentation::from_raw(raw_rep)
                .ok_or_else(|| err(DecodeErrorKind::UnknownIndexRepresentation(raw_rep)))?;
            operand
                .indices
                .push(self.decode_index(cursor, representation, depth)?);
        }

        let count = components.len();
        operand.immediate = match ty {
            OperandType::Immediate32 => Some(ImmediateValues::Bits32(cursor.read_vec(count)?)),
            OperandType::Immediate64 => Some(ImmediateValues::Bits64(
                (0..count)
                    .map(|_| cursor.read_u64())
                    .collect::<Result<_, _>>()?,
            )),
            _ => None,
        };

        Ok(operand)
    }

    fn decode_index(
        &self,
        cursor: &mut TokenCursor<'_>,
        representation: IndexRepresentation,
        depth: usize,
    ) -> Result<OperandIndex, DecodeError> {
        // TODO: confirm against reference bytecode whether 32-bit displacements are
        // ever meant to be unsigned; they are sign-extended here.
        let displacement = match representation {
            IndexRepresentation::Immediate32 | IndexRepresentation::Immediate32PlusRelative => {
                i64::from(cursor.read_u32()? as i32)
            }
            IndexRepresentation::Immediate64 | IndexRepresentation::Immediate64PlusRelative => {
                cursor.read_u64()? as i64
            }
            IndexRepresentation::Relative => 0,
        };
        let relative = if representation.has_relative() {
            Some(Box::new(self.decode_at_depth(cursor, depth + 1)?))
        } else {
            None
        };
        Ok(OperandIndex {
            representation,
            displacement,
            relative,
        })
    }
}
