// Tunable defaults. Every value here can be overridden through `Config`;
// nothing in the crate reads the process environment outside of `main`.

use std::time::Duration;

/// Base URL of the Replicate HTTP API.
pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";
pub const DEFAULT_AUTH_SCHEME: &str = "Bearer";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Delay before each status read of a running prediction.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1200);
/// Status reads allowed before a prediction is reported as timed out.
pub const MAX_POLL_ATTEMPTS: u32 = 30;
/// Whole-call timeout for the prediction creation request.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);
/// Whole-call timeout for a single status read.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(30);

pub const MAX_NEW_TOKENS: u32 = 256;
pub const TEMPERATURE: f32 = 0.2;

/// Separator used when the model output arrives as a list of chunks.
pub const REPLY_SEPARATOR: &str = "\n";

pub const REFUSAL_REPLY: &str = "Kechirasiz — men faqat Turon O'quv Markazi bilan bog'liq savollarga javob bera olaman. Iltimos, kurslar, jadval, manzil yoki aloqa haqida so'rang.";

pub const ALIVE_TEXT: &str = "Turon proxy alive";
