use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    customer::{
        Customer, CustomerFilter, CustomerId, CustomerPatch, CustomerRepository, CustomerSort,
    },
    member_number::MemberNumber,
    DataAccessError, Entity,
};

/// メモリ上の顧客リポジトリ
///
/// 会員番号の一意性は書き込みロックの中で検査する。
#[derive(Clone, Default)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(member_number: MemberNumber) -> DataAccessError {
    DataAccessError::DuplicateKey(format!("member_number {}", member_number))
}

fn first_match<'a>(
    customers: &'a HashMap<CustomerId, Customer>,
    filter: &CustomerFilter,
) -> Option<&'a Customer> {
    customers
        .values()
        .filter(|c| filter.matches(c))
        .min_by_key(|c| c.member_number())
}

fn is_taken(
    customers: &HashMap<CustomerId, Customer>,
    member_number: MemberNumber,
    except: Option<CustomerId>,
) -> bool {
    customers
        .values()
        .any(|c| c.member_number() == member_number && Some(c.id()) != except)
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_all(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
    ) -> Result<Vec<Customer>, DataAccessError> {
        let customers = self.customers.read().await;
        let mut found = customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect::<Vec<_>>();
        sort.sort(&mut found);
        Ok(found)
    }

    async fn find_one(&self, filter: &CustomerFilter) -> Result<Option<Customer>, DataAccessError> {
        let customers = self.customers.read().await;
        Ok(first_match(&customers, filter).cloned())
    }

    async fn insert(&self, mut customer: Customer) -> Result<Customer, DataAccessError> {
        let mut customers = self.customers.write().await;
        if is_taken(&customers, customer.member_number(), None) {
            return Err(duplicate(customer.member_number()));
        }
        if customers.contains_key(&customer.id()) {
            return Err(DataAccessError::DuplicateKey(format!("id {}", customer.id())));
        }
        customer.clear();
        customers.insert(customer.id(), customer.clone());
        Ok(customer)
    }

    async fn update_one(
        &self,
        filter: &CustomerFilter,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, DataAccessError> {
        let mut customers = self.customers.write().await;
        let mut customer = match first_match(&customers, filter) {
            Some(customer) => customer.clone(),
            None => return Ok(None),
        };
        if let Some(member_number) = patch.member_number {
            if is_taken(&customers, member_number, Some(customer.id())) {
                return Err(duplicate(member_number));
            }
        }
        customer
            .apply_patch(patch)
            .map_err(|e| DataAccessError::ClientSideError(Box::new(e)))?;
        customer.clear();
        customers.insert(customer.id(), customer.clone());
        Ok(Some(customer))
    }

    async fn delete_one(
        &self,
        filter: &CustomerFilter,
    ) -> Result<Option<Customer>, DataAccessError> {
        let mut customers = self.customers.write().await;
        let id = match first_match(&customers, filter) {
            Some(customer) => customer.id(),
            None => return Ok(None),
        };
        Ok(customers.remove(&id))
    }
}
