use alloy_primitives::Address;
use rand::{rngs::OsRng, CryptoRng, RngCore};

use crate::private_key::PrivateKey;

/// Produces throwaway destination addresses. The backing keys are dropped right away,
/// so funds sent to them cannot be recovered.
pub struct ReceiverGenerator<R> {
    rng: R,
}

impl ReceiverGenerator<OsRng> {
    pub fn from_os_rng() -> Self {
        Self::new(OsRng)
    }
}

impl<R: RngCore + CryptoRng> ReceiverGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate_address(&mut self) -> Address {
        let (address, _key) = PrivateKey::random(&mut self.rng);
        address
    }
}
