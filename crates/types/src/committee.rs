use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::chain::{CommitteeRow, ProducerRow};

/// A sub-chain committee member.
///
/// Identity is the account name only: two members with the same account are
/// equal even if their key material differs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub account: String,
    #[serde(rename = "public_key")]
    pub producer_public_key: String,
    #[serde(rename = "bls_key")]
    pub bls_public_key: String,
    pub url: String,
    pub location: u64,
}

impl CommitteeMember {
    pub fn new(account: impl Into<String>) -> Self {
        CommitteeMember {
            account: account.into(),
            ..Default::default()
        }
    }

    fn full_key(&self) -> (&str, &str, &str, &str, u64) {
        (
            &self.account,
            &self.producer_public_key,
            &self.bls_public_key,
            &self.url,
            self.location,
        )
    }
}

impl PartialEq for CommitteeMember {
    fn eq(&self, other: &Self) -> bool {
        self.account == other.account
    }
}

impl Eq for CommitteeMember {}

impl Hash for CommitteeMember {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.account.hash(state);
    }
}

impl From<ProducerRow> for CommitteeMember {
    fn from(row: ProducerRow) -> Self {
        let detail = row.prod_detail;
        CommitteeMember {
            account: detail.owner,
            producer_public_key: detail.producer_key,
            bls_public_key: detail.bls_key,
            url: detail.url,
            location: detail.location,
        }
    }
}

impl From<CommitteeRow> for CommitteeMember {
    fn from(row: CommitteeRow) -> Self {
        CommitteeMember {
            account: row.owner,
            producer_public_key: row.miner_pk,
            bls_public_key: row.bls_pk,
            url: row.url,
            location: row.location,
        }
    }
}

/// One membership change as carried by the vote-committee action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeChange {
    #[serde(flatten)]
    pub member: CommitteeMember,
    #[serde(rename = "adddel_miner")]
    pub is_addition: bool,
}

/// Membership difference between the committee recorded on the main chain
/// and the local producer set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitteeDiff {
    pub additions: Vec<CommitteeMember>,
    pub removals: Vec<CommitteeMember>,
}

/// Index members by account. When an account appears more than once the
/// smallest entry wins, so the result does not depend on input order.
fn index_by_account(members: &[CommitteeMember]) -> BTreeMap<&str, &CommitteeMember> {
    let mut index: BTreeMap<&str, &CommitteeMember> = BTreeMap::new();
    for member in members {
        let entry = index.entry(member.account.as_str()).or_insert(member);
        if member.full_key() < entry.full_key() {
            *entry = member;
        }
    }
    index
}

impl CommitteeDiff {
    /// Members of `local` missing from `recorded` become additions, members of
    /// `recorded` missing from `local` become removals. Both lists are sorted
    /// by account.
    pub fn build(recorded: &[CommitteeMember], local: &[CommitteeMember]) -> Self {
        let recorded = index_by_account(recorded);
        let local = index_by_account(local);

        let additions = local
            .iter()
            .filter(|(account, _)| !recorded.contains_key(*account))
            .map(|(_, member)| (*member).clone())
            .collect();
        let removals = recorded
            .iter()
            .filter(|(account, _)| !local.contains_key(*account))
            .map(|(_, member)| (*member).clone())
            .collect();

        CommitteeDiff {
            additions,
            removals,
        }
    }

    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All changes, additions first.
    pub fn changes(&self) -> impl Iterator<Item = CommitteeChange> + '_ {
        let additions = self.additions.iter().map(|member| CommitteeChange {
            member: member.clone(),
            is_addition: true,
        });
        let removals = self.removals.iter().map(|member| CommitteeChange {
            member: member.clone(),
            is_addition: false,
        });
        additions.chain(removals)
    }

    /// The only change, if the diff holds exactly one.
    pub fn single_change(&self) -> Option<CommitteeChange> {
        if self.len() != 1 {
            return None;
        }
        self.changes().next()
    }
}
