//! Admission Errors
//!
//! Error types for transaction admission. Each variant encodes a single rule
//! violation; the first violation wins and nothing is recovered internally.

use thiserror::Error;

/// A single admission rule violation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    // =========================================================================
    // Pipeline Errors
    // =========================================================================
    #[error("Coinbase transactions are not admitted to the pool")]
    CoinbaseTransaction,

    #[error("Transaction is not standard")]
    IsNotStandard,

    #[error("Transaction already known to pool or chain")]
    Duplicate,

    #[error("An input is already spent in pool or chain")]
    DoubleSpend,

    #[error("Previous transaction of an input was not found")]
    InputNotFound,

    #[error("Connecting an input against its previous output failed")]
    ValidateInputsFailed,

    #[error("Fee below minimum or outside the money range")]
    FeesOutOfRange,

    // =========================================================================
    // Structure Errors
    // =========================================================================
    #[error("Transaction has no inputs or no outputs")]
    EmptyTransaction,

    #[error("Serialized transaction exceeds the size limit")]
    SizeLimits,

    #[error("Output value overflows the money range")]
    OutputValueOverflow,

    #[error("Unknown or disallowed transaction version")]
    TransactionVersionError,

    #[error("Nova-version transaction before nova activation")]
    NovaFeatureNotActivated,

    #[error("Output script pattern is not standard")]
    ScriptNotStandard,

    #[error("Coinbase script size out of bounds")]
    InvalidCoinbaseScriptSize,

    #[error("Non-coinbase input references the null outpoint")]
    PreviousOutputNull,

    #[error("Input lock height exceeds the confirmed depth of its source")]
    InvalidInputScriptLockHeight,

    #[error("Output lock height is not an allowed deposit period")]
    InvalidOutputScriptLockHeight,

    #[error("Attenuation model parameters are invalid")]
    AttenuationModelParamError,

    #[error("Output attachment is invalid")]
    AttachmentInvalid,

    // =========================================================================
    // Symbol Errors
    // =========================================================================
    #[error("Asset symbol violates the symbol rules")]
    AssetSymbolInvalid,

    #[error("DID symbol violates the symbol rules")]
    DidSymbolInvalid,

    #[error("MIT symbol violates the symbol rules")]
    MitSymbolInvalid,

    // =========================================================================
    // Registry Errors
    // =========================================================================
    #[error("Asset symbol already exists on the chain")]
    AssetExist,

    #[error("Certificate (symbol, type) already exists on the chain")]
    AssetCertExist,

    #[error("MIT symbol already exists on the chain")]
    MitExist,

    #[error("DID symbol already exists on the chain")]
    DidExist,

    #[error("DID symbol does not exist on the chain")]
    DidNotExist,

    #[error("Address already has a registered DID")]
    AddressRegisteredDid,

    #[error("Certificate owner DID is not registered")]
    DidAddressNeeded,

    // =========================================================================
    // DID Errors
    // =========================================================================
    #[error("More than one DID operation in a single transaction")]
    DidMultiTypeExist,

    #[error("DID operation inputs have the wrong shape")]
    DidInputError,

    #[error("Attachment DID does not match the bound address")]
    DidAddressNotMatch,

    #[error("DID symbols of inputs and outputs do not match")]
    DidSymbolNotMatch,

    // =========================================================================
    // Asset Conservation Errors
    // =========================================================================
    #[error("Asset amounts of inputs and outputs are not equal")]
    AssetAmountNotEqual,

    #[error("Asset symbols of inputs and outputs do not match")]
    AssetSymbolNotMatch,

    // =========================================================================
    // Feature Errors
    // =========================================================================
    #[error("Certificate conservation violated")]
    AssetCertError,

    #[error("Required domain or naming certificate not provided")]
    AssetCertNotProvided,

    #[error("Certificate issuance rule violated")]
    AssetCertIssueError,

    #[error("Asset issuance rule violated")]
    AssetIssueError,

    #[error("Secondary issuance rule violated")]
    AssetSecondaryIssueError,

    #[error("Secondary issuance threshold value invalid")]
    AssetSecondaryIssueThresholdInvalid,

    #[error("Held volume below the secondary issuance threshold")]
    AssetSecondaryIssueShareNotEnough,

    #[error("Asset issuer or certificate owner does not match the attachment DID")]
    AssetDidRegisterrNotMatch,

    #[error("MIT conservation violated")]
    MitError,

    #[error("MIT registration rule violated")]
    MitRegisterError,

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for admission rules
pub type ValidateResult<T> = Result<T, ValidateError>;

/// Error during a chain store read
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for chain store reads
pub type ChainResult<T> = Result<T, ChainError>;

impl From<ChainError> for ValidateError {
    fn from(err: ChainError) -> Self {
        ValidateError::Storage(err.to_string())
    }
}

/// Final negative verdict: the violated rule plus the offending inputs.
///
/// `input_indices` is non-empty only for errors attributable to a specific
/// input ([`ValidateError::InputNotFound`],
/// [`ValidateError::ValidateInputsFailed`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct Rejection {
    pub error: ValidateError,
    pub input_indices: Vec<u32>,
}

impl Rejection {
    pub fn new(error: ValidateError) -> Self {
        Self {
            error,
            input_indices: Vec::new(),
        }
    }

    pub fn at_input(error: ValidateError, index: u32) -> Self {
        Self {
            error,
            input_indices: vec![index],
        }
    }
}

impl From<ValidateError> for Rejection {
    fn from(error: ValidateError) -> Self {
        Self::new(error)
    }
}
