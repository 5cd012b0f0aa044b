// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Well-known keys of the collected session data.
//!
//! Keys are camelCase because the wizard front-end reads them verbatim.

pub const WALLET_ADDRESS: &str = "walletAddress";
pub const CAPTCHA_COMPLETED: &str = "captchaCompleted";

pub const IMAGE_DATA: &str = "imageData";
pub const IPFS_URL: &str = "ipfsUrl";
pub const IPFS_HASH: &str = "ipfsHash";
pub const FILE_NAME: &str = "fileName";
pub const FILE_TYPE: &str = "fileType";
pub const FILE_SIZE: &str = "fileSize";

pub const LIVENESS_IMAGE: &str = "livenessImage";
pub const LIVENESS_VERIFIED: &str = "livenessVerified";
pub const LIVENESS_TIMESTAMP: &str = "livenessTimestamp";

pub const EXTRACTED_INFO: &str = "extractedInfo";
pub const FULL_NAME: &str = "fullName";
pub const DOCUMENT_NUMBER: &str = "documentNumber";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";
pub const DOCUMENT_TYPE: &str = "documentType";
pub const DOCUMENT_DETAILS: &str = "documentDetails";
pub const RAW_EXTRACTION_TEXT: &str = "rawExtractionText";
pub const EXTRACTION_FALLBACK: &str = "extractionFallback";
pub const EXTRACTION_ERROR: &str = "extractionError";

pub const VERIFIED_INFO: &str = "verifiedInfo";
pub const VERIFIED_DETAILS: &str = "verifiedDetails";
pub const VERIFICATION_TIMESTAMP: &str = "verificationTimestamp";

pub const METADATA_URI: &str = "metadataUri";
pub const DID_IDENTIFIER: &str = "didIdentifier";
pub const TOKEN_ID: &str = "tokenId";
pub const MINTING_COMPLETE: &str = "mintingComplete";
pub const MINTING_IN_PROGRESS: &str = "mintingInProgress";
pub const MINTING_TIMESTAMP: &str = "mintingTimestamp";
pub const TRANSACTION_HASH: &str = "transactionHash";

pub const IS_DEMO: &str = "isDemo";
pub const DEMO_DATA: &str = "demoData";

/// Keys only the step workflow may write. The raw data endpoint refuses them
/// so a client cannot claim a wallet, an identity or a mint it never proved.
pub const WORKFLOW_OWNED: [&str; 12] = [
    WALLET_ADDRESS,
    EXTRACTED_INFO,
    DOCUMENT_DETAILS,
    VERIFIED_INFO,
    VERIFIED_DETAILS,
    METADATA_URI,
    DID_IDENTIFIER,
    TOKEN_ID,
    MINTING_COMPLETE,
    MINTING_IN_PROGRESS,
    MINTING_TIMESTAMP,
    TRANSACTION_HASH,
];
