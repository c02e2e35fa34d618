//! Policy-change records and the in-force management policy.
//!
//! A policy payload occupies the shared 64-bit value word with the top
//! two bits set to `11`, a one-bit permanence flag, the change type, and
//! a 32-bit parameter. The change type is logically a 31-bit enum (so
//! that `Noop` is all-ones), stored in the 29 bits left over after the
//! mode and permanence bits; `Noop` is mapped to and from the stored
//! all-ones pattern on the way through.

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::amount::{Amount, COIN};
use crate::role::{RoleSet, MODE_MASK};
use crate::serialization::SerializationError;

/// Mode bits of a policy payload.
const MODE_POLICY: u64 = 0b11 << 62;
/// Bit holding the permanence flag.
const PERMANENT_BIT: u64 = 1 << 61;
/// Width mask of the stored change-type field (bits 60..=32).
const STORED_TYPE_MASK: u32 = (1 << 29) - 1;

/// The kinds of policy change a policy transaction may carry.
///
/// Values are consensus critical and consumed by peers.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyChangeType {
    ActivateRoleM = 0,
    ActivateRoleC = 1,
    ActivateRoleL = 2,
    ActivateRoleU = 3,
    ActivateRoleA = 4,
    ActivateRoleLTransfer = 5,
    SetRoleCCreationLimit = 6,
    SetBlockRewardMode = 7,
    SetCurBlockReward = 8,
    SetMinBlockReward = 9,
    SetCurBlockRewardDecay = 10,
    SetMaxBlockRewardDecay = 11,
    SetMinTxFee = 12,
    SetMngTxPeriodicity = 13,
    SetMngTxMinPerPeriod = 14,
    /// All ones in the logical 31-bit field.
    Noop = 0x7fff_ffff,
}

impl PolicyChangeType {
    /// The 29-bit pattern this type occupies inside the value word.
    fn stored(self) -> u32 {
        match self {
            PolicyChangeType::Noop => STORED_TYPE_MASK,
            other => other as u32,
        }
    }

    /// Recover a type from its stored 29-bit pattern.
    fn from_stored(raw: u32) -> Result<Self, SerializationError> {
        if raw == STORED_TYPE_MASK {
            return Ok(PolicyChangeType::Noop);
        }
        PolicyChangeType::try_from(raw)
    }
}

impl TryFrom<u32> for PolicyChangeType {
    type Error = SerializationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        use PolicyChangeType::*;
        Ok(match value {
            0 => ActivateRoleM,
            1 => ActivateRoleC,
            2 => ActivateRoleL,
            3 => ActivateRoleU,
            4 => ActivateRoleA,
            5 => ActivateRoleLTransfer,
            6 => SetRoleCCreationLimit,
            7 => SetBlockRewardMode,
            8 => SetCurBlockReward,
            9 => SetMinBlockReward,
            10 => SetCurBlockRewardDecay,
            11 => SetMaxBlockRewardDecay,
            12 => SetMinTxFee,
            13 => SetMngTxPeriodicity,
            14 => SetMngTxMinPerPeriod,
            0x7fff_ffff => Noop,
            _ => return Err(SerializationError::Parse("unknown policy change type")),
        })
    }
}

/// One requested change to the management policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Whether the change is permanent or provisional.
    pub permanent: bool,
    /// Which policy parameter changes.
    pub change_type: PolicyChangeType,
    /// The new parameter value, interpreted per change type.
    pub param: u32,
}

impl PolicyRecord {
    /// The wire form of this record.
    pub fn to_word(self) -> u64 {
        let mut word = MODE_POLICY;
        if self.permanent {
            word |= PERMANENT_BIT;
        }
        word |= (self.change_type.stored() as u64) << 32;
        word |= self.param as u64;
        word
    }

    /// Reads a policy record out of a value word, requiring policy mode
    /// bits and a known change type.
    pub fn from_word(word: u64) -> Result<PolicyRecord, SerializationError> {
        if word & MODE_MASK != MODE_POLICY {
            return Err(SerializationError::Parse(
                "policy word has wrong mode bits",
            ));
        }
        let stored = ((word >> 32) as u32) & STORED_TYPE_MASK;
        Ok(PolicyRecord {
            permanent: word & PERMANENT_BIT != 0,
            change_type: PolicyChangeType::from_stored(stored)?,
            param: word as u32,
        })
    }
}

/// The policy parameters currently in force.
///
/// Defaults are the chain's launch parameters; policy-change transactions
/// adjust them at a higher layer once finalized.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivePolicy {
    pub role_m_active: bool,
    pub role_c_active: bool,
    pub role_l_active: bool,
    pub role_u_active: bool,
    pub role_a_active: bool,
    pub role_l_can_move_coin: bool,
    /// Upper bound on the coins minted by a single coin-creation
    /// transaction. Zero until raised by policy.
    pub coin_creation_limit: Amount,
    pub block_reward_auto: bool,
    pub cur_block_reward: Amount,
    pub min_block_reward: Amount,
    pub cur_block_reward_decay: f32,
    pub max_block_reward_decay: f32,
    pub min_tx_fee: Amount,
    pub management_tx_periodicity: i32,
    pub management_tx_min_per_period: i32,
}

impl Default for ActivePolicy {
    fn default() -> Self {
        ActivePolicy {
            role_m_active: true,
            role_c_active: true,
            role_l_active: true,
            role_u_active: true,
            role_a_active: true,
            role_l_can_move_coin: true,
            coin_creation_limit: Amount::zero(),
            block_reward_auto: true,
            cur_block_reward: Amount::from_sat(50 * COIN.as_sat()),
            min_block_reward: Amount::zero(),
            cur_block_reward_decay: 0.5,
            max_block_reward_decay: 1.0,
            min_tx_fee: Amount::from_sat(3000),
            management_tx_periodicity: 0,
            management_tx_min_per_period: 0,
        }
    }
}

impl ActivePolicy {
    /// The roles currently activated by policy, as a role set.
    ///
    /// The historical `U` activation flag maps onto the registered (`R`)
    /// flag of the final role alphabet.
    pub fn active_roles(&self) -> RoleSet {
        let mut roles = RoleSet::empty();
        if self.role_m_active {
            roles.insert(RoleSet::MANAGER);
        }
        if self.role_c_active {
            roles.insert(RoleSet::CREATOR);
        }
        if self.role_l_active {
            roles.insert(RoleSet::LAW_ENFORCEMENT);
        }
        if self.role_u_active {
            roles.insert(RoleSet::REGISTERED);
        }
        if self.role_a_active {
            roles.insert(RoleSet::ACCOUNT_MANAGER);
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_roundtrip() {
        let record = PolicyRecord {
            permanent: true,
            change_type: PolicyChangeType::SetMinTxFee,
            param: 4500,
        };
        let word = record.to_word();
        assert_eq!(word >> 62, 0b11);
        assert_eq!(PolicyRecord::from_word(word).unwrap(), record);
    }

    #[test]
    fn noop_roundtrip() {
        let record = PolicyRecord {
            permanent: false,
            change_type: PolicyChangeType::Noop,
            param: 0,
        };
        let recovered = PolicyRecord::from_word(record.to_word()).unwrap();
        assert_eq!(recovered.change_type, PolicyChangeType::Noop);
        assert_eq!(recovered.change_type as u32, 0x7fff_ffff);
    }

    #[test]
    fn unknown_type_rejected() {
        let word = (0b11u64 << 62) | (100u64 << 32);
        assert!(PolicyRecord::from_word(word).is_err());
    }

    #[test]
    fn wrong_mode_rejected() {
        assert!(PolicyRecord::from_word(0).is_err());
        assert!(PolicyRecord::from_word(0b10 << 62).is_err());
    }

    #[test]
    fn default_policy_activates_all_roles() {
        let policy = ActivePolicy::default();
        assert_eq!(
            policy.active_roles(),
            RoleSet::MANAGER
                | RoleSet::CREATOR
                | RoleSet::LAW_ENFORCEMENT
                | RoleSet::REGISTERED
                | RoleSet::ACCOUNT_MANAGER
        );
        assert_eq!(policy.coin_creation_limit, Amount::zero());
    }
}
