//! Closed value kind enumeration.
//!
//! Every operation on a value dispatches on this tag with an exhaustive
//! `match`, so adding a kind does not compile until every operation handles
//! it.

/// Discriminant tag selecting the payload interpretation of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    /// Borrowed string literal from the flow definition.
    Str,
    /// Read-only string view into static asset data. Never freed.
    StrAsset,
    /// Arena-allocated, reference-counted string.
    StrRef,
    /// Engine-owned array storage shared without arena accounting.
    Arr,
    /// Read-only array view into static asset data. Never freed.
    ArrAsset,
    /// Arena-allocated, reference-counted array.
    ArrRef,
    BlobRef,
    Stream,
    Date,
    /// Opaque handle into an external JSON document store.
    Json,
    /// Indirection: the named member of a JSON document.
    JsonMemberRef,
    /// Indirection: the value at an index of an array.
    ArrayElementRef,
    VersionedStr,
    /// Indirection: a shared slot holding another value.
    ValuePtr,
    FlowOutput,
    /// Indirection: a value read through the native-variable source.
    NativeVariable,
    Error,
    Range,
    Pointer,
    Enum,
    IpAddress,
    TimeZone,
    FunctionPointer,
}

impl ValueKind {
    /// Proxy kinds that denote another value rather than holding data.
    #[inline]
    pub fn is_indirect(self) -> bool {
        matches!(
            self,
            Self::ValuePtr | Self::ArrayElementRef | Self::JsonMemberRef | Self::NativeVariable
        )
    }

    /// The string family: compared by content, rendered as-is.
    #[inline]
    pub fn is_string(self) -> bool {
        matches!(self, Self::Str | Self::StrAsset | Self::StrRef)
    }

    /// The array family: compared by storage identity.
    #[inline]
    pub fn is_array(self) -> bool {
        matches!(self, Self::Arr | Self::ArrAsset | Self::ArrRef)
    }

    /// Kinds whose payload shares a reference-counted heap object.
    #[inline]
    pub fn is_ref_counted(self) -> bool {
        matches!(
            self,
            Self::StrRef | Self::ArrRef | Self::BlobRef | Self::ArrayElementRef | Self::JsonMemberRef
        )
    }

    /// The coercion class assigned through `to_int32` (boolean plus every
    /// integer of 32 bits or less).
    #[inline]
    pub fn is_int32_or_less(self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Int8
                | Self::Uint8
                | Self::Int16
                | Self::Uint16
                | Self::Int32
                | Self::Uint32
        )
    }
}
