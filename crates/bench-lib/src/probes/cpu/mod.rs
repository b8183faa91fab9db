//! CPU probes: hashing and elliptic-curve workloads of a node client

mod bls;
mod bn256;
mod ecdsa;
mod keccak;

pub use bls::BlsProbe;
pub use bn256::Bn256Probe;
pub use ecdsa::EcdsaProbe;
pub use keccak::KeccakProbe;
