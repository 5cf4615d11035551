// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sha2::{Digest, Sha512};

/// The signature Midtrans attaches to a notification:
/// hex `SHA-512(order_id + status_code + gross_amount + server_key)`.
#[must_use]
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares a received signature with the expected one.
///
/// Runs in time independent of where the strings first differ.
#[must_use]
pub fn signature_matches(expected: &str, received: &str) -> bool {
    let expected = expected.as_bytes();
    let received = received.trim().to_ascii_lowercase();
    let received = received.as_bytes();
    if expected.len() != received.len() {
        return false;
    }
    expected
        .iter()
        .zip(received)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
