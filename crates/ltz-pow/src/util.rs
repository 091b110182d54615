use bitcoin::hashes::Hash;
use bitcoin::BlockHash;
use hex::FromHex;

use crate::pow::Target;

/// Convert a hex string to a BlockHash.
/// The bytes are taken in internal order, the reverse of how block explorers
/// display hashes.
pub fn hex_to_blockhash(hex: &str) -> Result<BlockHash, hex::FromHexError> {
    let bytes = <[u8; 32]>::from_hex(hex)?;
    Ok(BlockHash::from_byte_array(bytes))
}

/// Interprets a block hash as the 256-bit integer compared against targets.
pub fn blockhash_to_target(hash: &BlockHash) -> Target {
    Target::from_le_bytes(&hash.to_byte_array())
}
