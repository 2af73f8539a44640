//! Native asset handling. The pools hold the wrapped native token; calls
//! that pay or receive the native asset refer to it by the zero address.

use {
    super::BuildError,
    crate::domain::TokenAmount,
    alloy::primitives::{Address, U256},
};

pub fn ensure_in_pool(amounts: &[TokenAmount], wrapped: Address) -> Result<(), BuildError> {
    if amounts.iter().any(|amount| amount.token.address == wrapped) {
        Ok(())
    } else {
        Err(BuildError::NativeAssetNotInPool(wrapped))
    }
}

/// Replaces the wrapped native token by the zero address.
pub fn substitute(amounts: &[TokenAmount], wrapped: Address) -> Vec<TokenAmount> {
    amounts
        .iter()
        .map(|amount| {
            let mut amount = *amount;
            if amount.token.address == wrapped {
                amount.token.address = Address::ZERO;
            }
            amount
        })
        .collect()
}

pub fn substitute_address(address: Address, wrapped: Address) -> Address {
    if address == wrapped { Address::ZERO } else { address }
}

/// Native value to attach to the call.
pub fn value(amounts: &[TokenAmount], wrapped: Address) -> U256 {
    amounts
        .iter()
        .find(|amount| amount.token.address == wrapped)
        .map(|amount| amount.amount)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use {super::*, crate::domain::Token};

    fn amount(byte: u8, amount: u64) -> TokenAmount {
        TokenAmount::new(
            Token {
                address: Address::repeat_byte(byte),
                decimals: 18,
                chain_id: 1,
            },
            U256::from(amount),
        )
    }

    #[test]
    fn substitutes_wrapped_native() {
        let wrapped = Address::repeat_byte(0xee);
        let amounts = [amount(1, 10), amount(0xee, 20)];

        assert!(ensure_in_pool(&amounts, wrapped).is_ok());
        assert_eq!(value(&amounts, wrapped), U256::from(20));
        let substituted = substitute(&amounts, wrapped);
        assert_eq!(substituted[0], amounts[0]);
        assert_eq!(substituted[1].token.address, Address::ZERO);
        assert_eq!(substituted[1].amount, U256::from(20));

        let other = Address::repeat_byte(0xdd);
        assert_eq!(
            ensure_in_pool(&amounts, other),
            Err(BuildError::NativeAssetNotInPool(other))
        );
        assert_eq!(value(&amounts, other), U256::ZERO);
    }
}
