use crate::core::types::OutputShape;

/// How the shared tree walk lays out a document.
///
/// Null optional reads fields are omitted under every policy; `R1` is always
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapePolicy {
    /// Emit `id` before the child collection (and before `reads`)
    pub id_first: bool,

    /// Drop the library level, keeping its id on every readgroup as `lib_id`
    /// and placing the reads fields directly on the readgroup record
    pub flatten_libraries: bool,
}

impl ShapePolicy {
    pub const CURRENT_NESTED: Self = Self {
        id_first: true,
        flatten_libraries: false,
    };

    pub const LEGACY_NESTED: Self = Self {
        id_first: false,
        flatten_libraries: false,
    };

    pub const LEGACY_FLATTENED: Self = Self {
        id_first: false,
        flatten_libraries: true,
    };

    #[must_use]
    pub fn for_shape(shape: OutputShape) -> Self {
        match shape {
            OutputShape::CurrentNested => Self::CURRENT_NESTED,
            OutputShape::LegacyNested => Self::LEGACY_NESTED,
            OutputShape::LegacyFlattened => Self::LEGACY_FLATTENED,
        }
    }
}

impl From<OutputShape> for ShapePolicy {
    fn from(shape: OutputShape) -> Self {
        Self::for_shape(shape)
    }
}
