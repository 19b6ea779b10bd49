// Licensed under the Apache-2.0 license

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodingOptions(u32);

bitflags! {
    impl EncodingOptions: u32 {
        /// Encode unrecognised (blob) attributes instead of dropping them
        const SIGN_UNRECOGNISED = 0b0000_0001;
        /// Decode unrecognised extensions even when they are marked critical
        const ALLOW_UNKNOWN_CRITICAL = 0b0000_0010;
    }
}

/// How much of the PKIX profile is enforced. An attribute whose table entry
/// requires a higher level than the configured one is carried as a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ComplianceLevel {
    Oblivious,
    Reduced,
    #[default]
    Standard,
    PkixPartial,
    PkixFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeConfig {
    pub options: EncodingOptions,
    pub compliance: ComplianceLevel,
}

impl AttributeConfig {
    pub const fn new(options: EncodingOptions, compliance: ComplianceLevel) -> Self {
        Self {
            options,
            compliance,
        }
    }

    pub fn sign_unrecognised(&self) -> bool {
        self.options.contains(EncodingOptions::SIGN_UNRECOGNISED)
    }
}
