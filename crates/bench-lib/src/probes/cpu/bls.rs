//! BLS12-381 signature workload: scalar multiplication, pairings and aggregation

use crate::budget::{allocate, Share};
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop};
use crate::models::{BlsResult, Rating};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use ark_bls12_381::{Bls12_381, Fr, G1Affine, G2Affine, G2Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_std::{UniformRand, Zero};
use std::hint::black_box;
use std::time::Duration;

/// sign, verify, aggregate, batch verify
const PHASES: [Share; 4] = [Share::new(1, 4); 4];

/// Signatures folded into one aggregate, a typical attestation committee
pub const AGGREGATE_SIZE: usize = 64;

/// Signatures checked by one multi-pairing
pub const BATCH_SIZE: usize = 4;

/// BLS12-381 curve operations behind consensus-layer signatures
#[derive(Debug, Clone, Copy, Default)]
pub struct BlsProbe;

impl Probe for BlsProbe {
    type Output = BlsResult;

    fn name(&self) -> &'static str {
        "bls"
    }

    fn label(&self) -> &'static str {
        "BLS12-381 signatures"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<BlsResult, ProbeError> {
        let mut rng = fixture_rng();
        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();

        let [sign_budget, verify_budget, aggregate_budget, batch_budget] =
            allocate(budget, &PHASES);

        // Signing is a scalar multiplication in G1
        let sign = TimedLoop::new(sign_budget).cancel_on(cancel).run(|| {
            let secret = Fr::rand(&mut rng);
            black_box((g1 * secret).into_affine());
            Outcome::op()
        });

        let signature = (g1 * Fr::rand(&mut rng)).into_affine();
        let verify = TimedLoop::new(verify_budget).cancel_on(cancel).run(|| {
            black_box(Bls12_381::pairing(black_box(signature), g2));
            Outcome::op()
        });

        let signatures: Vec<G2Affine> = (0..AGGREGATE_SIZE)
            .map(|_| (g2 * Fr::rand(&mut rng)).into_affine())
            .collect();
        let aggregate = TimedLoop::new(aggregate_budget).cancel_on(cancel).run(|| {
            let mut acc = G2Projective::zero();
            for sig in &signatures {
                acc += sig;
            }
            black_box(acc);
            Outcome::op()
        });

        let batch_g1: [G1Affine; BATCH_SIZE] =
            std::array::from_fn(|_| (g1 * Fr::rand(&mut rng)).into_affine());
        let batch_g2: [G2Affine; BATCH_SIZE] =
            std::array::from_fn(|_| (g2 * Fr::rand(&mut rng)).into_affine());
        let batch = TimedLoop::new(batch_budget).cancel_on(cancel).run(|| {
            black_box(Bls12_381::multi_pairing(batch_g1, batch_g2));
            Outcome::op()
        });

        let verifications_per_second = verify.rate();
        let rating = Rating::classify(verifications_per_second, MetricId::BlsVerify.curve());

        Ok(BlsResult {
            signatures_per_second: sign.rate(),
            verifications_per_second,
            aggregations_per_second: aggregate.rate(),
            batch_verifications_per_second: batch.rate(),
            meta: finish(&[sign, verify, aggregate, batch], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_phases_run() {
        let result = BlsProbe
            .run(Duration::from_millis(200), &CancelToken::new())
            .unwrap();

        assert!(result.signatures_per_second > 0.0);
        assert!(result.verifications_per_second > 0.0);
        assert!(result.aggregations_per_second > 0.0);
        assert!(result.batch_verifications_per_second > 0.0);
        assert!(result.meta.duration >= Duration::from_millis(200));
    }

    #[test]
    fn test_pairing_is_bilinear() {
        let mut rng = fixture_rng();
        let a = Fr::rand(&mut rng);
        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();

        let lhs = Bls12_381::pairing((g1 * a).into_affine(), g2);
        let rhs = Bls12_381::pairing(g1, (g2 * a).into_affine());
        assert_eq!(lhs, rhs);
    }
}
