use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    customer::{
        Customer, CustomerError, CustomerFilter, CustomerId, CustomerKey, CustomerPatch,
        CustomerRepository, CustomerSort, NewCustomer,
    },
    member_number::{AllocationPolicy, MemberNumber},
    DataAccessError,
};

pub const DEFAULT_MAX_ATTEMPTS: usize = 16;

/// 顧客サービス
///
/// 会員番号の採番は読み取りと書き込みが分かれているため、登録時に
/// 一意制約違反が起きた場合は番号を取り直して再試行する。
pub struct CustomerService {
    repository: Arc<dyn CustomerRepository>,
    policy: AllocationPolicy,
    max_attempts: usize,
}

#[derive(Error, Debug)]
pub enum CustomerServiceError {
    #[error("Customer not found")]
    NotFound,
    #[error("Member number already exists")]
    Conflict,
    #[error("No member number available")]
    Exhausted,
    #[error("Invalid customer: {0}")]
    Validation(#[from] CustomerError),
    #[error(transparent)]
    DataAccess(DataAccessError),
}

impl From<DataAccessError> for CustomerServiceError {
    fn from(value: DataAccessError) -> Self {
        match value {
            DataAccessError::DuplicateKey(_) => Self::Conflict,
            e => Self::DataAccess(e),
        }
    }
}

/// 興味ごとの集計
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestSummary {
    pub interest: String,
    pub count: usize,
    pub member_numbers: Vec<MemberNumber>,
}

/// 会員モデルごとの集計
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub model: String,
    pub count: usize,
    pub average_member_number: f64,
}

impl CustomerService {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self {
            repository,
            policy: AllocationPolicy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 登録の最大試行回数（1未満は1とみなす）
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub async fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
    ) -> Result<Vec<Customer>, CustomerServiceError> {
        Ok(self.repository.find_all(filter, sort).await?)
    }

    pub async fn count(&self, filter: &CustomerFilter) -> Result<usize, CustomerServiceError> {
        Ok(self.list(filter, CustomerSort::default()).await?.len())
    }

    /// 顧客を登録する
    ///
    /// 競合した番号は一覧に現れなくても以降の試行で候補から外す。
    pub async fn create(&self, new: NewCustomer) -> Result<Customer, CustomerServiceError> {
        let mut conflicted = BTreeSet::new();
        for attempt in 1..=self.max_attempts {
            let existing = self.repository.member_numbers().await?;
            let member_number = self
                .policy
                .allocate(existing.into_iter().chain(conflicted.iter().copied()))
                .ok_or(CustomerServiceError::Exhausted)?;
            let customer = Customer::register(
                CustomerId::generate(),
                member_number,
                new.name.clone(),
                new.date_of_birth,
                new.interest.clone(),
                new.model.clone(),
            )?;
            match self.repository.insert(customer).await {
                Ok(customer) => {
                    info!("顧客を登録しました: 会員番号 {}", member_number);
                    return Ok(customer);
                }
                Err(e) if e.is_duplicate_key() => {
                    debug!(
                        "会員番号 {} は使用済みのため再採番します ({}/{})",
                        member_number, attempt, self.max_attempts
                    );
                    conflicted.insert(member_number);
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(CustomerServiceError::DataAccess(e)),
            }
        }
        warn!("会員番号の採番が {} 回競合しました", self.max_attempts);
        Err(CustomerServiceError::Conflict)
    }

    pub async fn find(&self, key: CustomerKey) -> Result<Customer, CustomerServiceError> {
        self.repository
            .find_one(&key.into())
            .await?
            .ok_or(CustomerServiceError::NotFound)
    }

    pub async fn update(
        &self,
        key: CustomerKey,
        patch: CustomerPatch,
    ) -> Result<Customer, CustomerServiceError> {
        patch.validate()?;
        let customer = self
            .repository
            .update_one(&key.into(), &patch)
            .await?
            .ok_or(CustomerServiceError::NotFound)?;
        info!("顧客を更新しました: 会員番号 {}", customer.member_number());
        Ok(customer)
    }

    pub async fn delete(&self, key: CustomerKey) -> Result<Customer, CustomerServiceError> {
        let customer = self
            .repository
            .delete_one(&key.into())
            .await?
            .ok_or(CustomerServiceError::NotFound)?;
        info!("顧客を削除しました: 会員番号 {}", customer.member_number());
        Ok(customer)
    }

    /// 興味ごとの人数を多い順に返す（同数は興味名の昇順）
    pub async fn interest_summary(&self) -> Result<Vec<InterestSummary>, CustomerServiceError> {
        let mut summary = self
            .group_by(|customer| customer.interest())
            .await?
            .into_iter()
            .map(|(interest, member_numbers)| InterestSummary {
                interest,
                count: member_numbers.len(),
                member_numbers,
            })
            .collect::<Vec<_>>();
        summary.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(summary)
    }

    /// 会員モデルごとの人数と会員番号の平均を人数の多い順に返す（同数はモデル名の昇順）
    pub async fn model_summary(&self) -> Result<Vec<ModelSummary>, CustomerServiceError> {
        let mut summary = self
            .group_by(|customer| customer.model())
            .await?
            .into_iter()
            .map(|(model, member_numbers)| {
                let total = member_numbers.iter().map(|n| **n as f64).sum::<f64>();
                ModelSummary {
                    model,
                    count: member_numbers.len(),
                    average_member_number: total / member_numbers.len() as f64,
                }
            })
            .collect::<Vec<_>>();
        summary.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(summary)
    }

    /// 会員番号を昇順のままキーごとにまとめる
    async fn group_by<F>(
        &self,
        key: F,
    ) -> Result<BTreeMap<String, Vec<MemberNumber>>, CustomerServiceError>
    where
        F: Fn(&Customer) -> &str,
    {
        let mut groups: BTreeMap<String, Vec<MemberNumber>> = BTreeMap::new();
        for customer in self.list(&CustomerFilter::all(), CustomerSort::default()).await? {
            groups
                .entry(key(&customer).to_owned())
                .or_default()
                .push(customer.member_number());
        }
        Ok(groups)
    }
}
