/// Object store layout
pub mod storage {
    /// Prefix for uploaded token images
    pub const IMAGE_PREFIX: &str = "token_images";
    /// Prefix for published metadata documents
    pub const METADATA_PREFIX: &str = "token-metadata";
    /// Content type of metadata documents
    pub const METADATA_CONTENT_TYPE: &str = "application/json";
    /// File type recorded in `properties.files` of the metadata document
    pub const METADATA_IMAGE_TYPE: &str = "image/png";
    /// Default Firebase Storage REST endpoint
    pub const FIREBASE_API_BASE: &str = "https://firebasestorage.googleapis.com";
}

/// Image upload limits
pub mod image {
    /// Maximum image size in bytes (5 MiB)
    pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
    /// Accepted extensions and their content types
    pub const ACCEPTED_TYPES: &[(&str, &str)] = &[
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
    ];
}

/// Token form limits
pub mod token {
    /// Largest allowed decimal count
    pub const MAX_DECIMALS: u8 = 9;
    /// Decimal count used when none is given
    pub const DEFAULT_DECIMALS: u8 = 9;
}

/// Launch fee schedule (SOL, displayed only)
pub mod fees {
    use rust_decimal::Decimal;

    /// Base fee: 0.10 SOL
    pub const BASE_FEE_SOL: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
    /// Added per enabled revoke toggle: 0.05 SOL
    pub const REVOKE_FEE_SOL: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
}

/// Token-2022 TLV header sizes for variable-length extensions
pub mod tlv {
    /// Extension type discriminator size
    pub const TYPE_SIZE: usize = 2;
    /// Extension length prefix size
    pub const LENGTH_SIZE: usize = 2;
}
