//! Stable pool math following `StableMath.sol`. The invariant and the
//! balance solver are shared by V2 and V3; the closed form join and exit
//! functions are the V2 ones.

use {
    super::{Error, add, div_down, div_up, fixed_point::Bfp, mul, sub},
    alloy::primitives::U256,
};

/// Precision of the amplification parameter as stored by the contracts.
pub const AMP_PRECISION: U256 = U256::from_limbs([1_000, 0, 0, 0]);

const MAX_ITERATIONS: usize = 255;

fn converged(a: U256, b: U256) -> bool {
    if a > b { a - b <= U256::from(1) } else { b - a <= U256::from(1) }
}

fn sum(balances: &[U256]) -> Result<U256, Error> {
    balances.iter().try_fold(U256::ZERO, |acc, balance| add(acc, *balance))
}

/// Newton iteration for the StableSwap invariant. `amplification` is the
/// amplification parameter multiplied by [`AMP_PRECISION`]. Rounds down.
pub fn calculate_invariant(amplification: U256, balances: &[U256]) -> Result<U256, Error> {
    let sum = sum(balances)?;
    if sum.is_zero() {
        return Ok(U256::ZERO);
    }
    let num_tokens = U256::from(balances.len());
    let amp_times_total = mul(amplification, num_tokens)?;

    let mut invariant = sum;
    for _ in 0..MAX_ITERATIONS {
        let mut d_p = invariant;
        for balance in balances {
            d_p = div_down(mul(d_p, invariant)?, mul(*balance, num_tokens)?)?;
        }
        let prev_invariant = invariant;

        let numerator = mul(
            add(
                div_down(mul(amp_times_total, sum)?, AMP_PRECISION)?,
                mul(d_p, num_tokens)?,
            )?,
            invariant,
        )?;
        let denominator = add(
            div_down(
                mul(sub(amp_times_total, AMP_PRECISION)?, invariant)?,
                AMP_PRECISION,
            )?,
            mul(add(num_tokens, U256::from(1))?, d_p)?,
        )?;
        invariant = div_down(numerator, denominator)?;

        if converged(invariant, prev_invariant) {
            return Ok(invariant);
        }
    }
    Err(Error::StableInvariantDidntConverge)
}

/// Balance of `token_index` that keeps `invariant` given every other
/// balance. Rounds up.
pub fn get_token_balance_given_invariant_and_all_other_balances(
    amplification: U256,
    balances: &[U256],
    invariant: U256,
    token_index: usize,
) -> Result<U256, Error> {
    let current = *balances.get(token_index).ok_or(Error::InvalidToken(token_index))?;
    let num_tokens = U256::from(balances.len());
    let amp_times_total = mul(amplification, num_tokens)?;

    let mut sum = balances[0];
    let mut p_d = mul(balances[0], num_tokens)?;
    for balance in &balances[1..] {
        p_d = div_down(mul(mul(p_d, *balance)?, num_tokens)?, invariant)?;
        sum = add(sum, *balance)?;
    }
    let sum = sub(sum, current)?;

    let inv2 = mul(invariant, invariant)?;
    // c = inv^2 / (ampTimesTotal * P_D) * AMP_PRECISION * balance_i
    let c = mul(
        mul(div_up(inv2, mul(amp_times_total, p_d)?)?, AMP_PRECISION)?,
        current,
    )?;
    // b = sum + inv / ampTimesTotal * AMP_PRECISION
    let b = add(sum, mul(div_down(invariant, amp_times_total)?, AMP_PRECISION)?)?;

    let mut token_balance = div_up(add(inv2, c)?, add(invariant, b)?)?;
    for _ in 0..MAX_ITERATIONS {
        let prev_token_balance = token_balance;
        token_balance = div_up(
            add(mul(token_balance, token_balance)?, c)?,
            sub(add(mul(token_balance, U256::from(2))?, b)?, invariant)?,
        )?;
        if converged(token_balance, prev_token_balance) {
            return Ok(token_balance);
        }
    }
    Err(Error::StableGetBalanceDidntConverge)
}

fn raw(values: &[Bfp]) -> Vec<U256> {
    values.iter().map(|value| value.as_uint256()).collect()
}

fn sum_fp(balances: &[Bfp]) -> Result<Bfp, Error> {
    balances.iter().try_fold(Bfp::zero(), |acc, balance| acc.add(*balance))
}

pub fn calc_bpt_out_given_exact_tokens_in(
    amplification: U256,
    balances: &[Bfp],
    amounts_in: &[Bfp],
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let sum_balances = sum_fp(balances)?;

    let mut balance_ratios_with_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = Bfp::zero();
    for (balance, amount_in) in balances.iter().zip(amounts_in) {
        let current_weight = balance.div_down(sum_balances)?;
        let ratio = balance.add(*amount_in)?.div_down(*balance)?;
        invariant_ratio_with_fees = invariant_ratio_with_fees.add(ratio.mul_down(current_weight)?)?;
        balance_ratios_with_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for i in 0..balances.len() {
        let amount_in_without_fee = if balance_ratios_with_fee[i] > invariant_ratio_with_fees {
            let non_taxable_amount =
                balances[i].mul_down(invariant_ratio_with_fees.sub(Bfp::one())?)?;
            let taxable_amount = amounts_in[i].sub(non_taxable_amount)?;
            non_taxable_amount.add(taxable_amount.mul_down(swap_fee.complement())?)?
        } else {
            amounts_in[i]
        };
        new_balances.push(balances[i].add(amount_in_without_fee)?);
    }

    let new_invariant = Bfp::from_wei(calculate_invariant(amplification, &raw(&new_balances))?);
    let invariant_ratio = new_invariant.div_down(Bfp::from_wei(current_invariant))?;
    if invariant_ratio > Bfp::one() {
        bpt_total_supply.mul_down(invariant_ratio.sub(Bfp::one())?)
    } else {
        Ok(Bfp::zero())
    }
}

pub fn calc_token_in_given_exact_bpt_out(
    amplification: U256,
    balances: &[Bfp],
    token_index: usize,
    bpt_amount_out: Bfp,
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let new_invariant = bpt_total_supply
        .add(bpt_amount_out)?
        .div_up(bpt_total_supply)?
        .mul_up(Bfp::from_wei(current_invariant))?;
    let new_balance = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &raw(balances),
        new_invariant.as_uint256(),
        token_index,
    )?;
    let amount_in_without_fee = Bfp::from_wei(new_balance).sub(balances[token_index])?;

    let current_weight = balances[token_index].div_down(sum_fp(balances)?)?;
    let taxable_amount = amount_in_without_fee.mul_up(current_weight.complement())?;
    let non_taxable_amount = amount_in_without_fee.sub(taxable_amount)?;
    non_taxable_amount.add(taxable_amount.div_up(swap_fee.complement())?)
}

pub fn calc_bpt_in_given_exact_tokens_out(
    amplification: U256,
    balances: &[Bfp],
    amounts_out: &[Bfp],
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let sum_balances = sum_fp(balances)?;

    let mut balance_ratios_without_fee = Vec::with_capacity(balances.len());
    let mut invariant_ratio_without_fees = Bfp::zero();
    for (balance, amount_out) in balances.iter().zip(amounts_out) {
        let current_weight = balance.div_up(sum_balances)?;
        let ratio = balance.sub(*amount_out)?.div_up(*balance)?;
        invariant_ratio_without_fees =
            invariant_ratio_without_fees.add(ratio.mul_up(current_weight)?)?;
        balance_ratios_without_fee.push(ratio);
    }

    let mut new_balances = Vec::with_capacity(balances.len());
    for i in 0..balances.len() {
        let amount_out_with_fee = if invariant_ratio_without_fees > balance_ratios_without_fee[i] {
            let non_taxable_amount =
                balances[i].mul_down(invariant_ratio_without_fees.complement())?;
            let taxable_amount = amounts_out[i].sub(non_taxable_amount)?;
            non_taxable_amount.add(taxable_amount.div_up(swap_fee.complement())?)?
        } else {
            amounts_out[i]
        };
        new_balances.push(balances[i].sub(amount_out_with_fee)?);
    }

    let new_invariant = Bfp::from_wei(calculate_invariant(amplification, &raw(&new_balances))?);
    let invariant_ratio = new_invariant.div_down(Bfp::from_wei(current_invariant))?;
    bpt_total_supply.mul_up(invariant_ratio.complement())
}

pub fn calc_token_out_given_exact_bpt_in(
    amplification: U256,
    balances: &[Bfp],
    token_index: usize,
    bpt_amount_in: Bfp,
    bpt_total_supply: Bfp,
    current_invariant: U256,
    swap_fee: Bfp,
) -> Result<Bfp, Error> {
    let new_invariant = bpt_total_supply
        .sub(bpt_amount_in)?
        .div_up(bpt_total_supply)?
        .mul_up(Bfp::from_wei(current_invariant))?;
    let new_balance = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &raw(balances),
        new_invariant.as_uint256(),
        token_index,
    )?;
    let amount_out_without_fee = balances[token_index].sub(Bfp::from_wei(new_balance))?;

    let current_weight = balances[token_index].div_down(sum_fp(balances)?)?;
    let taxable_amount = amount_out_without_fee.mul_up(current_weight.complement())?;
    let non_taxable_amount = amount_out_without_fee.sub(taxable_amount)?;
    non_taxable_amount.add(taxable_amount.mul_down(swap_fee.complement())?)
}
