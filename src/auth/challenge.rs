//! One-time login password derivation.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{FreeboxError, FreeboxResult};

type HmacSha1 = Hmac<Sha1>;

/// Derive the login password for `challenge`.
///
/// The password is the lowercase hex HMAC-SHA1 of the challenge, keyed with
/// the pairing token.
pub fn compute_password(app_token: &str, challenge: &str) -> FreeboxResult<String> {
    let mut mac = HmacSha1::new_from_slice(app_token.as_bytes())
        .map_err(|e| FreeboxError::Config(format!("unusable pairing token: {}", e)))?;
    mac.update(challenge.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
