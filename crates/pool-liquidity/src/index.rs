//! Pools listing their own share token (BPT) have two index spaces: the
//! protocol facing one used by the Vault and the user facing one without
//! the share token. This module translates between them.

use {
    crate::{
        domain::{PoolState, PoolToken, ProtocolTokenList, UserFacingTokenList},
        math::fixed_point::Bfp,
    },
    alloy::primitives::{Address, U256},
    itertools::Itertools,
    tracing::warn,
};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvalidPoolState {
    #[error("pool has no tokens")]
    NoTokens,
    #[error("token {0} is listed more than once")]
    DuplicateToken(Address),
    #[error("token indices {0:?} are not contiguous from zero")]
    NonContiguousIndices(Vec<usize>),
    #[error("token {0} has no weight")]
    MissingWeight(Address),
    #[error("stable pool without amplification parameter")]
    MissingAmplification,
}

/// Protocol facing position of the pool's own share token, `None` for pools
/// that do not list it.
pub fn share_token_index(pool: &PoolState) -> Option<usize> {
    pool.tokens
        .iter()
        .position(|token| token.address == pool.address)
}

/// The pool's tokens without the share token, renumbered from zero.
pub fn user_facing_tokens(pool: &PoolState) -> UserFacingTokenList {
    UserFacingTokenList(
        pool.tokens
            .iter()
            .filter(|token| token.address != pool.address)
            .enumerate()
            .map(|(index, token)| PoolToken {
                index,
                ..token.clone()
            })
            .collect(),
    )
}

impl UserFacingTokenList {
    /// Reinserts the share token at its protocol index. Inverse of
    /// [`user_facing_tokens`].
    pub fn with_share_token(&self, share_token: PoolToken) -> ProtocolTokenList {
        let mut tokens = self.0.clone();
        let position = share_token.index.min(tokens.len());
        tokens.insert(position, share_token);
        ProtocolTokenList::new(renumber(tokens))
    }
}

fn renumber(tokens: Vec<PoolToken>) -> Vec<PoolToken> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(index, token)| PoolToken { index, ..token })
        .collect()
}

/// Maps a user facing index to the protocol facing one.
pub fn to_protocol_index(user_index: usize, share_token_index: Option<usize>) -> usize {
    match share_token_index {
        Some(share) if share <= user_index => user_index + 1,
        _ => user_index,
    }
}

/// Maps a protocol facing index to the user facing one. `None` for the
/// share token itself.
pub fn to_user_facing_index(
    protocol_index: usize,
    share_token_index: Option<usize>,
) -> Option<usize> {
    match share_token_index {
        Some(share) if share == protocol_index => None,
        Some(share) if share < protocol_index => Some(protocol_index - 1),
        _ => Some(protocol_index),
    }
}

/// Brings a freshly fetched or constructed pool into canonical form: tokens
/// sorted by index, indices contiguous from zero and, for pools that list
/// their share token, the share token present. A missing share token is
/// synthesised at the first gap in the indices (or after the last one).
pub fn normalize(pool: PoolState) -> Result<PoolState, InvalidPoolState> {
    let PoolState { tokens, .. } = &pool;
    if tokens.is_empty() {
        return Err(InvalidPoolState::NoTokens);
    }
    if let Some(duplicate) = tokens.iter().map(|token| token.address).duplicates().next() {
        return Err(InvalidPoolState::DuplicateToken(duplicate));
    }

    let mut tokens = tokens
        .iter()
        .cloned()
        .sorted_by_key(|token| token.index)
        .collect::<Vec<_>>();

    if pool.pool_type.has_share_token() && !tokens.iter().any(|token| token.address == pool.address)
    {
        let gap = tokens
            .iter()
            .enumerate()
            .find(|(position, token)| token.index != *position)
            .map(|(position, _)| position)
            .unwrap_or(tokens.len());
        warn!(
            pool = %pool.address,
            index = gap,
            "share token missing from pool tokens, inserting it"
        );
        tokens.insert(
            gap,
            PoolToken {
                address: pool.address,
                decimals: 18,
                index: gap,
                balance: U256::ZERO,
                weight: None,
                price_rate: Bfp::one(),
            },
        );
    }

    if tokens.iter().enumerate().any(|(position, token)| token.index != position) {
        return Err(InvalidPoolState::NonContiguousIndices(
            tokens.iter().map(|token| token.index).collect(),
        ));
    }

    Ok(PoolState {
        tokens: ProtocolTokenList::new(tokens),
        ..pool
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{PoolId, PoolType, ProtocolVersion},
    };

    fn token(byte: u8, index: usize) -> PoolToken {
        PoolToken {
            address: Address::repeat_byte(byte),
            decimals: 18,
            index,
            balance: U256::from(1_000u64),
            weight: None,
            price_rate: Bfp::one(),
        }
    }

    fn pool(pool_type: PoolType, tokens: Vec<PoolToken>) -> PoolState {
        let address = Address::repeat_byte(0xbb);
        PoolState {
            id: PoolId::from_address(address),
            address,
            pool_type,
            protocol_version: ProtocolVersion::V2,
            tokens: ProtocolTokenList::new(tokens),
            total_shares: U256::from(1_000u64),
            swap_fee: Bfp::zero(),
            amplification: None,
        }
    }

    #[test]
    fn composable_index_spaces() {
        let bpt = token(0xbb, 1);
        let pool = pool(
            PoolType::ComposableStable,
            vec![token(0xa0, 0), bpt.clone(), token(0xa2, 2)],
        );
        assert_eq!(share_token_index(&pool), Some(1));

        let user = user_facing_tokens(&pool);
        assert_eq!(user.len(), pool.tokens.len() - 1);
        assert_eq!(
            user.iter().map(|t| (t.address, t.index)).collect::<Vec<_>>(),
            vec![
                (Address::repeat_byte(0xa0), 0),
                (Address::repeat_byte(0xa2), 1)
            ]
        );
        assert_eq!(user.with_share_token(bpt), pool.tokens);
    }

    #[test]
    fn pools_without_share_token() {
        let pool = pool(PoolType::Weighted, vec![token(0xa0, 0), token(0xa1, 1)]);
        assert_eq!(share_token_index(&pool), None);
        assert_eq!(*user_facing_tokens(&pool), *pool.tokens);
    }

    #[test]
    fn index_translation() {
        assert_eq!(to_protocol_index(0, Some(0)), 1);
        assert_eq!(to_protocol_index(0, Some(1)), 0);
        assert_eq!(to_protocol_index(1, Some(1)), 2);
        assert_eq!(to_protocol_index(1, None), 1);

        assert_eq!(to_user_facing_index(0, Some(0)), None);
        assert_eq!(to_user_facing_index(2, Some(0)), Some(1));
        assert_eq!(to_user_facing_index(0, Some(2)), Some(0));
        for user in 0..3 {
            assert_eq!(
                to_user_facing_index(to_protocol_index(user, Some(1)), Some(1)),
                Some(user)
            );
        }
    }

    #[test]
    fn normalize_sorts_tokens() {
        let normalized =
            normalize(pool(PoolType::Weighted, vec![token(0xa1, 1), token(0xa0, 0)])).unwrap();
        assert_eq!(normalized.tokens[0].address, Address::repeat_byte(0xa0));
        assert_eq!(normalized.tokens[1].address, Address::repeat_byte(0xa1));
    }

    #[test]
    fn normalize_synthesises_share_token_at_gap() {
        let normalized = normalize(pool(
            PoolType::ComposableStable,
            vec![token(0xa2, 2), token(0xa1, 1)],
        ))
        .unwrap();
        assert_eq!(share_token_index(&normalized), Some(0));
        assert_eq!(normalized.tokens[0].decimals, 18);
        assert_eq!(normalized.tokens.len(), 3);

        let normalized = normalize(pool(
            PoolType::ComposableStable,
            vec![token(0xa0, 0), token(0xa1, 1)],
        ))
        .unwrap();
        assert_eq!(share_token_index(&normalized), Some(2));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(pool(
            PoolType::ComposableStable,
            vec![token(0xa0, 0), token(0xa2, 2)],
        ))
        .unwrap();
        assert_eq!(normalize(once.clone()).unwrap(), once);
    }

    #[test]
    fn normalize_rejects_invalid_pools() {
        assert_eq!(
            normalize(pool(PoolType::Weighted, vec![])),
            Err(InvalidPoolState::NoTokens)
        );
        assert_eq!(
            normalize(pool(PoolType::Weighted, vec![token(0xa0, 0), token(0xa0, 1)])),
            Err(InvalidPoolState::DuplicateToken(Address::repeat_byte(0xa0)))
        );
        assert_eq!(
            normalize(pool(PoolType::Weighted, vec![token(0xa0, 0), token(0xa1, 2)])),
            Err(InvalidPoolState::NonContiguousIndices(vec![0, 2]))
        );
    }
}
