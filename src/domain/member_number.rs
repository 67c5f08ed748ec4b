use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::Id;

/// 会員番号
///
/// 1から始まる連番で、全顧客の間で一意となる。
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Deref,
    Default,
)]
pub struct MemberNumber(u64);

impl Id for MemberNumber {
    type Inner = u64;
}

impl MemberNumber {
    pub const FIRST: MemberNumber = MemberNumber(1);

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }

    pub fn successor(self) -> Option<MemberNumber> {
        self.0.checked_add(1).map(MemberNumber)
    }
}

/// 会員番号の採番方式
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// 最大値 + 1 を採番する
    Append,
    /// 削除で空いた番号を小さい順に再利用する
    #[default]
    FillGaps,
}

impl AllocationPolicy {
    /// 既存の会員番号から次に割り当てる番号を決める
    ///
    /// 割り当てられる番号が残っていなければ `None`。
    pub fn allocate<I>(self, existing: I) -> Option<MemberNumber>
    where
        I: IntoIterator<Item = MemberNumber>,
    {
        match self {
            AllocationPolicy::Append => append(existing),
            AllocationPolicy::FillGaps => fill_gaps(existing),
        }
    }
}

pub fn append<I>(existing: I) -> Option<MemberNumber>
where
    I: IntoIterator<Item = MemberNumber>,
{
    match existing.into_iter().max() {
        Some(max) => max.successor(),
        None => Some(MemberNumber::FIRST),
    }
}

pub fn fill_gaps<I>(existing: I) -> Option<MemberNumber>
where
    I: IntoIterator<Item = MemberNumber>,
{
    let mut numbers = existing.into_iter().collect::<Vec<_>>();
    numbers.sort_unstable();
    let mut candidate = MemberNumber::FIRST;
    for number in numbers {
        if number == candidate {
            candidate = candidate.successor()?;
        } else if number > candidate {
            break;
        }
        // 重複や0は候補より小さいので読み飛ばす
    }
    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[u64]) -> Vec<MemberNumber> {
        values.iter().copied().map(MemberNumber::from).collect()
    }

    #[test]
    fn test_fill_gaps() {
        assert_eq!(fill_gaps(numbers(&[])), Some(MemberNumber(1)));
        assert_eq!(fill_gaps(numbers(&[1, 2, 3])), Some(MemberNumber(4)));
        assert_eq!(fill_gaps(numbers(&[1, 2, 4])), Some(MemberNumber(3)));
        assert_eq!(fill_gaps(numbers(&[2, 3])), Some(MemberNumber(1)));
    }

    #[test]
    fn test_fill_gaps_unsorted_with_duplicates() {
        assert_eq!(fill_gaps(numbers(&[3, 1, 1, 2, 5])), Some(MemberNumber(4)));
        assert_eq!(fill_gaps(numbers(&[0, 1])), Some(MemberNumber(2)));
    }

    #[test]
    fn test_append() {
        assert_eq!(append(numbers(&[])), Some(MemberNumber(1)));
        assert_eq!(append(numbers(&[1, 2, 4])), Some(MemberNumber(5)));
        assert_eq!(append(numbers(&[2, 3])), Some(MemberNumber(4)));
    }

    #[test]
    fn test_allocate_never_returns_existing_number() {
        // {1..10} の全部分集合で検証する
        for mask in 0u32..(1 << 10) {
            let existing = (1..=10u64)
                .filter(|n| mask & (1 << (n - 1)) != 0)
                .map(MemberNumber::from)
                .collect::<Vec<_>>();
            for policy in [AllocationPolicy::FillGaps, AllocationPolicy::Append] {
                let allocated = policy.allocate(existing.iter().copied()).unwrap();
                assert!(allocated.is_valid());
                assert!(
                    !existing.contains(&allocated),
                    "{:?} allocated {} from {:?}",
                    policy,
                    allocated,
                    existing
                );
            }
        }
    }

    #[test]
    fn test_reallocate_after_deleting_highest() {
        let mut existing = numbers(&[1, 2, 3, 4]);
        let highest = existing.pop().unwrap();
        assert_eq!(fill_gaps(existing.clone()), Some(highest));
        assert_eq!(append(existing), Some(highest));
    }

    #[test]
    fn test_allocate_at_upper_bound() {
        let max = MemberNumber::from(u64::MAX);
        assert_eq!(append(vec![max]), None);
        assert_eq!(append(numbers(&[1, 2])), Some(MemberNumber(3)));
        assert_eq!(fill_gaps(vec![MemberNumber::FIRST, max]), Some(MemberNumber(2)));
        assert_eq!(MemberNumber::from(u64::MAX - 1).successor(), Some(max));
        assert_eq!(max.successor(), None);
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: AllocationPolicy = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(policy, AllocationPolicy::Append);
        let policy: AllocationPolicy = serde_json::from_str("\"fill_gaps\"").unwrap();
        assert_eq!(policy, AllocationPolicy::FillGaps);
        assert_eq!(AllocationPolicy::default(), AllocationPolicy::FillGaps);
    }
}
