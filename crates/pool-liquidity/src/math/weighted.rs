//! Weighted pool math. The V2 functions follow `WeightedMath.sol` of the V2
//! monorepo, the invariant helpers are shared with the V3 weighted pool.

use {
    super::{Error, Rounding, fixed_point::Bfp},
    alloy::primitives::U256,
};

/// Largest supply growth a single token join may cause (3x).
const MAX_INVARIANT_RATIO: Bfp =
    Bfp::from_wei(U256::from_limbs([3_000_000_000_000_000_000, 0, 0, 0]));
/// Smallest supply a single token exit may leave (0.7x).
const MIN_INVARIANT_RATIO: Bfp =
    Bfp::from_wei(U256::from_limbs([700_000_000_000_000_000, 0, 0, 0]));

/// `prod(balance_i ^ weight_i)` rounded in the requested direction.
pub fn calculate_invariant(
    normalized_weights: &[Bfp],
    balances: &[Bfp],
    rounding: Rounding,
) -> Result<Bfp, Error> {
    let mut invariant = Bfp::one();
    for (weight, balance) in normalized_weights.iter().zip(balances) {
        invariant = match rounding {
            Rounding::RoundDown => invariant.mul_down(balance.pow_down(*weight)?)?,
            Rounding::RoundUp => invariant.mul_up(balance.pow_up(*weight)?)?,
        };
    }
    if invariant.is_zero() {
        return Err(Error::ZeroInvariant);
    }
    Ok(invariant)
}

/// Balance a token must reach for the invariant to grow by
/// `invariant_ratio`, all other balances unchanged.
pub fn compute_balance_out_given_invariant(
    current_balance: Bfp,
    weight: Bfp,
    invariant_ratio: Bfp,
) -> Result<Bfp, Error> {
    let balance_ratio = invariant_ratio.pow_up(Bfp::one().div_up(weight)?)?;
    current_balance.mul_up(balance_ratio)
}

pub fn calc_bpt_out_given_exact_tokens_in(
    balances: &[Bfp],
    normalized_weights: &[Bfp],
    amounts_in: &[Bfp],
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = Bfp::zero();
    for ((balance, weight), amount_in) in balances.iter().zip(normalized_weights).zip(amounts_in) {
        let ratio = balance.add(*amount_in)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.add(ratio.mul_down(*weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut invariant_ratio = Bfp::one();
    for i in 0..balances.len() {
        let amount_in_without_fee = if balance_ratios_with_fee[i] > invariant_ratio_with_fees {
            // Only the part above the proportional amount pays swap fees.
            let non_taxable_amount = if invariant_ratio_with_fees > Bfp::one() {
                balances[i].mul_down(invariant_ratio_with_fees.sub(Bfp::one())?)?
            } else {
                Bfp::zero()
            };
            let swap_fee_amount = amounts_in[i].sub(non_taxable_amount)?.mul_up(swap_fee)?;
            amounts_in[i].sub(swap_fee_amount)?
        } else {
            amounts_in[i]
        };
        if amount_in_without_fee.is_zero() {
            continue;
        }
        let balance_ratio = balances[i].add(amount_in_without_fee)?.div_down(balances[i])?;
        invariant_ratio = invariant_ratio.mul_down(balance_ratio.pow_down(normalized_weights[i])?)?;
    }

    if invariant_ratio > Bfp::one() {
        bpt_total_supply.mul_down(invariant_ratio.sub(Bfp::one())?)
    } else {
        Ok(Bfp::zero())
    }
}

pub fn calc_token_in_given_exact_bpt_out(
    balance: Bfp,
    normalized_weight: Bfp,
    bpt_amount_out: Bfp,
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let invariant_ratio = bpt_total_supply.add(bpt_amount_out)?.div_up(bpt_total_supply)?;
    if invariant_ratio > MAX_INVARIANT_RATIO {
        return Err(Error::MaxOutBptForTokenIn);
    }
    let balance_ratio = invariant_ratio.pow_up(Bfp::one().div_up(normalized_weight)?)?;
    let amount_in_without_fee = balance.mul_up(balance_ratio.sub(Bfp::one())?)?;

    let taxable_amount = amount_in_without_fee.mul_up(normalized_weight.complement())?;
    let non_taxable_amount = amount_in_without_fee.sub(taxable_amount)?;
    let taxable_amount_plus_fees = taxable_amount.div_up(swap_fee.complement())?;
    non_taxable_amount.add(taxable_amount_plus_fees)
}

pub fn calc_bpt_in_given_exact_tokens_out(
    balances: &[Bfp],
    normalized_weights: &[Bfp],
    amounts_out: &[Bfp],
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let mut balance_ratios_without_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_without_fees = Bfp::zero();
    for ((balance, weight), amount_out) in
        balances.iter().zip(normalized_weights).zip(amounts_out)
    {
        let ratio = balance.sub(*amount_out)?.div_up(*balance)?;
        invariant_ratio_without_fees = invariant_ratio_without_fees.add(ratio.mul_up(*weight)?)?;
        balance_ratios_without_fee.push(ratio);
    }

    let mut invariant_ratio = Bfp::one();
    for i in 0..balances.len() {
        let amount_out_with_fee = if invariant_ratio_without_fees > balance_ratios_without_fee[i] {
            let non_taxable_amount =
                balances[i].mul_down(invariant_ratio_without_fees.complement())?;
            let taxable_amount = amounts_out[i].sub(non_taxable_amount)?;
            let taxable_amount_plus_fees = taxable_amount.div_up(swap_fee.complement())?;
            non_taxable_amount.add(taxable_amount_plus_fees)?
        } else {
            amounts_out[i]
        };
        if amount_out_with_fee.is_zero() {
            continue;
        }
        let balance_ratio = balances[i].sub(amount_out_with_fee)?.div_down(balances[i])?;
        invariant_ratio = invariant_ratio.mul_down(balance_ratio.pow_down(normalized_weights[i])?)?;
    }

    bpt_total_supply.mul_up(invariant_ratio.complement())
}

pub fn calc_token_out_given_exact_bpt_in(
    balance: Bfp,
    normalized_weight: Bfp,
    bpt_amount_in: Bfp,
    bpt_total_supply: Bfp,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let invariant_ratio = bpt_total_supply.sub(bpt_amount_in)?.div_up(bpt_total_supply)?;
    if invariant_ratio < MIN_INVARIANT_RATIO {
        return Err(Error::MinBptInForTokenOut);
    }
    let balance_ratio = invariant_ratio.pow_up(Bfp::one().div_down(normalized_weight)?)?;
    let amount_out_without_fee = balance.mul_down(balance_ratio.complement())?;

    let taxable_amount = amount_out_without_fee.mul_up(normalized_weight.complement())?;
    let non_taxable_amount = amount_out_without_fee.sub(taxable_amount)?;
    let taxable_amount_minus_fees = taxable_amount.mul_down(swap_fee.complement())?;
    non_taxable_amount.add(taxable_amount_minus_fees)
}
