//! Stream header types.

/// Which particle record a stream carries.
///
/// # Examples
///
/// ```
/// use advect_codec::RecordKind;
///
/// assert_eq!(RecordKind::from_tag(1), Some(RecordKind::Charged));
/// assert_eq!(RecordKind::Tracer.tag(), 0);
/// assert_eq!(RecordKind::from_tag(7), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// [`advect_core::Particle`] records.
    Tracer,
    /// [`advect_core::ChargedParticle`] records.
    Charged,
}

impl RecordKind {
    /// Header tag byte.
    pub fn tag(self) -> u8 {
        match self {
            Self::Tracer => 0,
            Self::Charged => 1,
        }
    }

    /// Parse a header tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Tracer),
            1 => Some(Self::Charged),
            _ => None,
        }
    }
}

/// Stream header: format version and record kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Binary format version.
    pub version: u8,
    /// Record kind that follows the header.
    pub kind: RecordKind,
}
