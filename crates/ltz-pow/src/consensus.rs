mod params;

pub use bitcoin::consensus::{Decodable, Encodable};
pub use params::Params;

/// Consensus serialization helpers shared with the Bitcoin wire format.
pub mod encode {
    pub use bitcoin::consensus::encode::{deserialize, serialize, Error};
}
