//! Seal command.
//!
//! Seals a value to a repository public key without contacting GitHub.

use std::io::Read;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::core::cipher::{self, RepositoryPublicKey};
use crate::error::Result;

/// Seal `value` (or stdin) and print the base64 ciphertext.
pub fn execute(key: &str, value: Option<String>) -> Result<()> {
    let value = match value {
        Some(value) => Zeroizing::new(value),
        None => {
            let mut buf = Zeroizing::new(String::new());
            std::io::stdin().read_to_string(&mut buf)?;
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }
            buf
        }
    };

    let key = RepositoryPublicKey::new("", key);
    output::data(&cipher::seal(&value, &key)?);
    Ok(())
}
