//! V3 `BasePoolMath`. The Vault computes liquidity operations generically
//! from two pool callbacks, modelled here by [`PoolInvariant`]. Balances
//! and amounts are scaled to 18 decimals with rates applied.

use {
    super::{Error, Rounding, fixed_point::Bfp, mul_div_up, stable, weighted},
    alloy::primitives::U256,
};

const ONE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// The callbacks a V3 pool exposes to the Vault.
pub trait PoolInvariant {
    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> Result<U256, Error>;

    /// New balance of `token_index` such that the invariant changes by
    /// `invariant_ratio`.
    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: Bfp,
    ) -> Result<U256, Error>;

    fn minimum_invariant_ratio(&self) -> Bfp;

    fn maximum_invariant_ratio(&self) -> Bfp;
}

/// 60%, shared lower invariant ratio bound of the V3 weighted and stable
/// pools.
const MIN_INVARIANT_RATIO: Bfp =
    Bfp::from_wei(U256::from_limbs([600_000_000_000_000_000, 0, 0, 0]));
/// 500%, shared upper invariant ratio bound.
const MAX_INVARIANT_RATIO: Bfp =
    Bfp::from_wei(U256::from_limbs([5_000_000_000_000_000_000, 0, 0, 0]));

#[derive(Clone, Debug)]
pub struct WeightedInvariant {
    pub normalized_weights: Vec<Bfp>,
}

impl PoolInvariant for WeightedInvariant {
    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> Result<U256, Error> {
        let balances = balances.iter().copied().map(Bfp::from_wei).collect::<Vec<_>>();
        let invariant =
            weighted::calculate_invariant(&self.normalized_weights, &balances, rounding)?;
        Ok(invariant.as_uint256())
    }

    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: Bfp,
    ) -> Result<U256, Error> {
        let balance = balances.get(token_index).ok_or(Error::InvalidToken(token_index))?;
        let weight = self
            .normalized_weights
            .get(token_index)
            .ok_or(Error::InvalidToken(token_index))?;
        Ok(weighted::compute_balance_out_given_invariant(
            Bfp::from_wei(*balance),
            *weight,
            invariant_ratio,
        )?
        .as_uint256())
    }

    fn minimum_invariant_ratio(&self) -> Bfp {
        MIN_INVARIANT_RATIO
    }

    fn maximum_invariant_ratio(&self) -> Bfp {
        MAX_INVARIANT_RATIO
    }
}

#[derive(Clone, Debug)]
pub struct StableInvariant {
    /// Amplification parameter times [`stable::AMP_PRECISION`].
    pub amplification: U256,
}

impl PoolInvariant for StableInvariant {
    fn compute_invariant(&self, balances: &[U256], rounding: Rounding) -> Result<U256, Error> {
        let invariant = stable::calculate_invariant(self.amplification, balances)?;
        match rounding {
            Rounding::RoundUp if !invariant.is_zero() => super::add(invariant, ONE),
            _ => Ok(invariant),
        }
    }

    fn compute_balance(
        &self,
        balances: &[U256],
        token_index: usize,
        invariant_ratio: Bfp,
    ) -> Result<U256, Error> {
        let invariant = Bfp::from_wei(self.compute_invariant(balances, Rounding::RoundUp)?)
            .mul_up(invariant_ratio)?;
        stable::get_token_balance_given_invariant_and_all_other_balances(
            self.amplification,
            balances,
            invariant.as_uint256(),
            token_index,
        )
    }

    fn minimum_invariant_ratio(&self) -> Bfp {
        MIN_INVARIANT_RATIO
    }

    fn maximum_invariant_ratio(&self) -> Bfp {
        MAX_INVARIANT_RATIO
    }
}

fn ensure_below_maximum(pool: &impl PoolInvariant, ratio: Bfp) -> Result<(), Error> {
    if ratio > pool.maximum_invariant_ratio() {
        return Err(Error::InvariantRatioAboveMax(ratio.as_uint256()));
    }
    Ok(())
}

fn ensure_above_minimum(pool: &impl PoolInvariant, ratio: Bfp) -> Result<(), Error> {
    if ratio < pool.minimum_invariant_ratio() {
        return Err(Error::InvariantRatioBelowMin(ratio.as_uint256()));
    }
    Ok(())
}

/// `ceil(balance * bpt_out / total_supply)` per token.
pub fn compute_proportional_amounts_in(
    balances: &[U256],
    bpt_total_supply: U256,
    bpt_amount_out: U256,
) -> Result<Vec<U256>, Error> {
    balances
        .iter()
        .map(|balance| mul_div_up(*balance, bpt_amount_out, bpt_total_supply))
        .collect()
}

/// `floor(balance * bpt_in / total_supply)` per token.
pub fn compute_proportional_amounts_out(
    balances: &[U256],
    bpt_total_supply: U256,
    bpt_amount_in: U256,
) -> Result<Vec<U256>, Error> {
    balances
        .iter()
        .map(|balance| super::div_down(super::mul(*balance, bpt_amount_in)?, bpt_total_supply))
        .collect()
}

/// Returns the BPT minted for exact amounts in.
pub fn compute_add_liquidity_unbalanced(
    current_balances: &[U256],
    exact_amounts: &[U256],
    total_supply: U256,
    swap_fee: Bfp,
    pool: &impl PoolInvariant,
) -> Result<U256, Error> {
    // One wei less per token keeps the new invariant rounding in the
    // Vault's favour.
    let mut new_balances = current_balances
        .iter()
        .zip(exact_amounts)
        .map(|(balance, amount)| super::sub(super::add(*balance, *amount)?, ONE))
        .collect::<Result<Vec<_>, _>>()?;

    let current_invariant = pool.compute_invariant(current_balances, Rounding::RoundUp)?;
    let new_invariant = pool.compute_invariant(&new_balances, Rounding::RoundDown)?;
    let invariant_ratio = Bfp::from_wei(new_invariant).div_down(Bfp::from_wei(current_invariant))?;
    ensure_below_maximum(pool, invariant_ratio)?;

    for (new_balance, current_balance) in new_balances.iter_mut().zip(current_balances) {
        let proportional_balance = invariant_ratio
            .mul_down(Bfp::from_wei(*current_balance))?
            .as_uint256();
        if *new_balance > proportional_balance {
            let fee = Bfp::from_wei(*new_balance - proportional_balance)
                .mul_up(swap_fee)?
                .as_uint256();
            *new_balance = super::sub(*new_balance, fee)?;
        }
    }

    let invariant_with_fees = pool.compute_invariant(&new_balances, Rounding::RoundDown)?;
    super::div_down(
        super::mul(total_supply, super::sub(invariant_with_fees, current_invariant)?)?,
        current_invariant,
    )
}

/// Returns the amount of `token_in_index` (fees included) needed to mint
/// exactly `exact_bpt_amount_out`.
pub fn compute_add_liquidity_single_token_exact_out(
    current_balances: &[U256],
    token_in_index: usize,
    exact_bpt_amount_out: U256,
    total_supply: U256,
    swap_fee: Bfp,
    pool: &impl PoolInvariant,
) -> Result<U256, Error> {
    let current_balance = *current_balances
        .get(token_in_index)
        .ok_or(Error::InvalidToken(token_in_index))?;
    let new_supply = super::add(exact_bpt_amount_out, total_supply)?;
    let invariant_ratio = Bfp::from_wei(new_supply).div_up(Bfp::from_wei(total_supply))?;
    ensure_below_maximum(pool, invariant_ratio)?;

    let new_balance = pool.compute_balance(current_balances, token_in_index, invariant_ratio)?;
    let amount_in = super::sub(new_balance, current_balance)?;

    let non_taxable_balance = mul_div_up(new_supply, current_balance, total_supply)?;
    let taxable_amount = Bfp::from_wei(super::sub(new_balance, non_taxable_balance)?);
    let fee = taxable_amount.div_up(swap_fee.complement())?.sub(taxable_amount)?;

    super::add(amount_in, fee.as_uint256())
}

/// Returns the amount of `token_out_index` (fees deducted) received for
/// burning exactly `exact_bpt_amount_in`.
pub fn compute_remove_liquidity_single_token_exact_in(
    current_balances: &[U256],
    token_out_index: usize,
    exact_bpt_amount_in: U256,
    total_supply: U256,
    swap_fee: Bfp,
    pool: &impl PoolInvariant,
) -> Result<U256, Error> {
    let current_balance = *current_balances
        .get(token_out_index)
        .ok_or(Error::InvalidToken(token_out_index))?;
    let new_supply = super::sub(total_supply, exact_bpt_amount_in)?;
    let invariant_ratio = Bfp::from_wei(new_supply).div_up(Bfp::from_wei(total_supply))?;
    ensure_above_minimum(pool, invariant_ratio)?;

    let new_balance = pool.compute_balance(current_balances, token_out_index, invariant_ratio)?;
    let amount_out = super::sub(current_balance, new_balance)?;

    let new_balance_before_tax = mul_div_up(new_supply, current_balance, total_supply)?;
    let taxable_amount = Bfp::from_wei(super::sub(new_balance_before_tax, new_balance)?);
    let fee = taxable_amount.mul_up(swap_fee)?;

    super::sub(amount_out, fee.as_uint256())
}

/// Returns the BPT that must be burnt to receive exactly
/// `exact_amount_out` of `token_out_index`.
pub fn compute_remove_liquidity_single_token_exact_out(
    current_balances: &[U256],
    token_out_index: usize,
    exact_amount_out: U256,
    total_supply: U256,
    swap_fee: Bfp,
    pool: &impl PoolInvariant,
) -> Result<U256, Error> {
    let current_balance = *current_balances
        .get(token_out_index)
        .ok_or(Error::InvalidToken(token_out_index))?;
    let mut new_balances = current_balances
        .iter()
        .map(|balance| super::sub(*balance, ONE))
        .collect::<Result<Vec<_>, _>>()?;
    new_balances[token_out_index] = super::sub(new_balances[token_out_index], exact_amount_out)?;

    let current_invariant = pool.compute_invariant(current_balances, Rounding::RoundUp)?;
    let invariant_ratio = Bfp::from_wei(pool.compute_invariant(&new_balances, Rounding::RoundUp)?)
        .div_up(Bfp::from_wei(current_invariant))?;
    ensure_above_minimum(pool, invariant_ratio)?;

    let taxable_amount = super::sub(
        invariant_ratio.mul_up(Bfp::from_wei(current_balance))?.as_uint256(),
        new_balances[token_out_index],
    )?;
    let taxable_amount = Bfp::from_wei(taxable_amount);
    let fee = taxable_amount.div_up(swap_fee.complement())?.sub(taxable_amount)?;
    new_balances[token_out_index] = super::sub(new_balances[token_out_index], fee.as_uint256())?;

    let invariant_with_fees = pool.compute_invariant(&new_balances, Rounding::RoundDown)?;
    mul_div_up(
        total_supply,
        super::sub(current_invariant, invariant_with_fees)?,
        current_invariant,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e18(units: u64) -> U256 {
        U256::from(units) * U256::from(1_000_000_000_000_000_000u64)
    }

    fn bfp(s: &str) -> Bfp {
        s.parse().unwrap()
    }

    fn weighted() -> WeightedInvariant {
        WeightedInvariant {
            normalized_weights: vec![bfp("0.5"), bfp("0.5")],
        }
    }

    fn stable() -> StableInvariant {
        StableInvariant {
            amplification: U256::from(100) * stable::AMP_PRECISION,
        }
    }

    #[test]
    fn proportional_amounts_round_in_vault_favour() {
        let balances = [U256::from(10), U256::from(7)];
        assert_eq!(
            compute_proportional_amounts_in(&balances, U256::from(3), U256::from(1)).unwrap(),
            vec![U256::from(4), U256::from(3)]
        );
        assert_eq!(
            compute_proportional_amounts_out(&balances, U256::from(3), U256::from(1)).unwrap(),
            vec![U256::from(3), U256::from(2)]
        );
        assert_eq!(
            compute_proportional_amounts_out(&balances, U256::ZERO, U256::from(1)),
            Err(Error::ZeroDivision)
        );
    }

    #[test]
    fn stable_invariant_rounds_up_by_one() {
        let balances = [e18(100), e18(100)];
        let down = stable().compute_invariant(&balances, Rounding::RoundDown).unwrap();
        let up = stable().compute_invariant(&balances, Rounding::RoundUp).unwrap();
        assert_eq!(up, down + ONE);
    }

    #[test]
    fn unbalanced_add_mints_less_than_proportional_share() {
        let balances = [e18(1_000), e18(1_000)];
        let weighted_bpt = compute_add_liquidity_unbalanced(
            &balances,
            &[e18(100), U256::ZERO],
            e18(1_000),
            bfp("0.01"),
            &weighted(),
        )
        .unwrap();
        let stable_bpt = compute_add_liquidity_unbalanced(
            &balances,
            &[e18(100), U256::ZERO],
            e18(2_000),
            bfp("0.01"),
            &stable(),
        )
        .unwrap();
        // A balanced add of 100 would mint 5% of the supply.
        assert!(weighted_bpt > U256::ZERO && weighted_bpt < e18(50));
        assert!(stable_bpt > U256::ZERO && stable_bpt < e18(100));
    }

    #[test]
    fn unbalanced_add_above_maximum_ratio() {
        let balances = [e18(10), e18(10)];
        assert!(matches!(
            compute_add_liquidity_unbalanced(
                &balances,
                &[e18(1_000), e18(1_000)],
                e18(10),
                bfp("0.01"),
                &weighted(),
            ),
            Err(Error::InvariantRatioAboveMax(_))
        ));
    }

    #[test]
    fn single_token_round_trip_costs_fees() {
        let balances = [e18(1_000), e18(1_000)];
        let supply = e18(1_000);
        let amount_in = compute_add_liquidity_single_token_exact_out(
            &balances,
            0,
            e18(10),
            supply,
            bfp("0.01"),
            &weighted(),
        )
        .unwrap();
        let amount_out = compute_remove_liquidity_single_token_exact_in(
            &balances,
            0,
            e18(10),
            supply,
            bfp("0.01"),
            &weighted(),
        )
        .unwrap();
        // 1000 * (1.01^2 - 1) = 20.1 before fees.
        assert!(amount_in > bfp("20.1").as_uint256());
        assert!(amount_out < bfp("19.9").as_uint256());
    }

    #[test]
    fn single_token_exact_out_burns_more_than_proportional() {
        let balances = [e18(1_000), e18(1_000)];
        let bpt_in = compute_remove_liquidity_single_token_exact_out(
            &balances,
            1,
            e18(10),
            e18(2_000),
            bfp("0.01"),
            &stable(),
        )
        .unwrap();
        assert!(bpt_in > e18(10));
        assert!(bpt_in < e18(11));
    }

    #[test]
    fn single_token_exit_below_minimum_ratio() {
        let balances = [e18(1_000), e18(1_000)];
        assert!(matches!(
            compute_remove_liquidity_single_token_exact_in(
                &balances,
                0,
                e18(500),
                e18(1_000),
                bfp("0.01"),
                &weighted(),
            ),
            Err(Error::InvariantRatioBelowMin(_))
        ));
    }
}
