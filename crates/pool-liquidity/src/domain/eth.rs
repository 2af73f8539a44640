use {
    alloy::primitives::{Address, U256},
    bigdecimal::BigDecimal,
};

/// An ERC20 token on a specific chain.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub chain_id: u64,
}

/// A raw amount (base units) of a token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TokenAmount {
    pub token: Token,
    pub amount: U256,
}

impl TokenAmount {
    pub fn new(token: Token, amount: U256) -> Self {
        Self { token, amount }
    }

    pub fn zero(token: Token) -> Self {
        Self::new(token, U256::ZERO)
    }

    /// Human readable amount. Informational only, calls are built from the
    /// raw amount.
    pub fn to_decimal(&self) -> BigDecimal {
        number::units::from_raw(&self.amount, self.token.decimals)
    }
}

/// An amount as supplied by a caller of the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InputAmount {
    pub address: Address,
    pub decimals: u8,
    pub raw_amount: U256,
}

impl InputAmount {
    pub fn new(address: Address, decimals: u8, raw_amount: U256) -> Self {
        Self {
            address,
            decimals,
            raw_amount,
        }
    }
}
