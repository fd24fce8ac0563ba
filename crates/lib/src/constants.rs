//! # Shared Constants
//!
//! Defaults shared by the library and the server configuration layer. Each
//! of these can be overridden through `HandlerConfig`.

/// The inference model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "global.anthropic.claude-sonnet-4-20250514-v1:0";

/// The table that receives extraction records.
pub const DEFAULT_TABLE_NAME: &str = "product-specifications";

/// Upper bound on the length of the model's answer.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// The `anthropic_version` sent in the body of Bedrock-style requests.
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// The default path for the SQLite record database.
pub const DEFAULT_DB_FILE: &str = "db/prodspec.db";
