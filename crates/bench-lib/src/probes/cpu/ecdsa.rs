//! secp256k1 ECDSA sign, verify and public key recovery

use crate::budget::{allocate, Share};
use crate::error::ProbeError;
use crate::kernel::{CancelToken, Outcome, TimedLoop};
use crate::models::{EcdsaResult, Rating};
use crate::probes::{finish, fixture_rng, Probe};
use crate::scoring::MetricId;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::RngCore;
use std::hint::black_box;
use std::time::Duration;

/// sign, verify, recover
const PHASES: [Share; 3] = [Share::new(1, 3); 3];

/// secp256k1 signing, verification and public key recovery over a
/// transaction-sized prehash
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaProbe;

impl EcdsaProbe {
    /// Verification dominates transaction validation, recovery backs ecrecover
    pub fn rating_input(verify_rate: f64, recover_rate: f64) -> f64 {
        0.6 * verify_rate + 0.4 * recover_rate
    }
}

impl Probe for EcdsaProbe {
    type Output = EcdsaResult;

    fn name(&self) -> &'static str {
        "ecdsa"
    }

    fn label(&self) -> &'static str {
        "ECDSA secp256k1"
    }

    fn run(&self, budget: Duration, cancel: &CancelToken) -> Result<EcdsaResult, ProbeError> {
        let mut rng = fixture_rng();
        let signing_key = SigningKey::random(&mut rng);
        let verifying_key = signing_key.verifying_key();
        let mut prehash = [0u8; 32];
        rng.fill_bytes(&mut prehash);

        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| ProbeError::Crypto(format!("signing fixture: {e}")))?;

        let [sign_budget, verify_budget, recover_budget] = allocate(budget, &PHASES);

        let sign = TimedLoop::new(sign_budget).cancel_on(cancel).run(|| {
            Outcome::from_result(signing_key.sign_prehash_recoverable(black_box(&prehash)))
        });

        let verify = TimedLoop::new(verify_budget).cancel_on(cancel).run(|| {
            Outcome::from_result(verifying_key.verify_prehash(black_box(&prehash), &signature))
        });

        let recover = TimedLoop::new(recover_budget).cancel_on(cancel).run(|| {
            match VerifyingKey::recover_from_prehash(black_box(&prehash), &signature, recovery_id) {
                Ok(key) if key == *verifying_key => Outcome::op(),
                _ => Outcome::Failed,
            }
        });

        let verifications_per_second = verify.rate();
        let recoveries_per_second = recover.rate();
        let rating = Rating::classify(
            Self::rating_input(verifications_per_second, recoveries_per_second),
            MetricId::EcdsaVerify.curve(),
        );

        Ok(EcdsaResult {
            signatures_per_second: sign.rate(),
            verifications_per_second,
            recoveries_per_second,
            meta: finish(&[sign, verify, recover], rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_phases_run() {
        let result = EcdsaProbe
            .run(Duration::from_millis(60), &CancelToken::new())
            .unwrap();

        assert!(result.signatures_per_second > 0.0);
        assert!(result.verifications_per_second > 0.0);
        assert!(result.recoveries_per_second > 0.0);
        assert!(result.meta.error.is_none());
    }

    #[test]
    fn test_cancelled_probe_reports_zero() {
        let token = CancelToken::new();
        token.cancel();

        let result = EcdsaProbe.run(Duration::from_secs(5), &token).unwrap();
        assert_eq!(result.verifications_per_second, 0.0);
        assert!(result.meta.duration < Duration::from_secs(1));
    }

    #[test]
    fn test_rating_input_weights() {
        assert!((EcdsaProbe::rating_input(1000.0, 500.0) - 800.0).abs() < 1e-9);
    }
}
