//! Identifier generation for new requests

use bech32::Bech32m;
use uuid7::uuid7;

/// A fresh request code: a UUIDv7 encoded as bech32m under `hrp`, so codes sort by
/// creation time and a mistyped code fails its checksum.
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}
