//! BN254 precompile workload: G1 addition, scalar multiplication and pairing

use crate::budget::{allocate, Share};
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop};
use crate::models::{Bn256Result, Rating};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use ark_bn254::{Bn254, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{pairing::Pairing, CurveGroup};
use ark_std::UniformRand;
use std::hint::black_box;
use std::time::Duration;

/// add, scalar mul, pairing
const PHASES: [Share; 3] = [Share::new(3, 10), Share::new(3, 10), Share::new(4, 10)];

/// alt_bn128 operations exposed to contracts as precompiles (add, mul,
/// pairing check)
#[derive(Debug, Clone, Copy, Default)]
pub struct Bn256Probe;

impl Probe for Bn256Probe {
    type Output = Bn256Result;

    fn name(&self) -> &'static str {
        "bn256"
    }

    fn label(&self) -> &'static str {
        "BN256 precompiles"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<Bn256Result, ProbeError> {
        let mut rng = fixture_rng();
        let a: G1Affine = G1Projective::rand(&mut rng).into_affine();
        let b: G1Affine = G1Projective::rand(&mut rng).into_affine();
        let q: G2Affine = G2Projective::rand(&mut rng).into_affine();
        let scalar = Fr::rand(&mut rng);

        let [add_budget, mul_budget, pair_budget] = allocate(budget, &PHASES);

        // Precompiles return affine points, so each unit pays the conversion
        let add = TimedLoop::new(add_budget).cancel_on(cancel).run(|| {
            black_box((G1Projective::from(black_box(a)) + b).into_affine());
            Outcome::op()
        });

        let mul = TimedLoop::new(mul_budget).cancel_on(cancel).run(|| {
            black_box((black_box(a) * scalar).into_affine());
            Outcome::op()
        });

        let pair = TimedLoop::new(pair_budget).cancel_on(cancel).run(|| {
            black_box(Bn254::pairing(black_box(a), q));
            Outcome::op()
        });

        let pairings_per_second = pair.rate();
        let rating = Rating::classify(pairings_per_second, MetricId::Bn256Pair.curve());

        Ok(Bn256Result {
            g1_adds_per_second: add.rate(),
            g1_scalar_muls_per_second: mul.rate(),
            pairings_per_second,
            meta: finish(&[add, mul, pair], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_phases_run() {
        let result = Bn256Probe
            .run(Duration::from_millis(100), &CancelToken::new())
            .unwrap();

        assert!(result.g1_adds_per_second > 0.0);
        assert!(result.g1_scalar_muls_per_second > 0.0);
        assert!(result.pairings_per_second > 0.0);
        // Additions are orders of magnitude cheaper than pairings
        assert!(result.g1_adds_per_second > result.pairings_per_second);
    }
}
