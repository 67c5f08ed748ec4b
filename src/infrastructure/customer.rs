use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use eventstore::{AppendToStreamOptions, Client, EventData, ExpectedRevision};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::customer::{
    Customer, CustomerEvent, CustomerFilter, CustomerId, CustomerPatch, CustomerRepository,
    CustomerSort,
};
use crate::domain::member_number::MemberNumber;
use crate::domain::{DataAccessError, Entity, Event};
use crate::infrastructure::{
    decode_customer_event, decode_event, from_event, read_events, stream_name, EventConvertError,
};

const MEMBER_NUMBER_STREAM: &str = "member_number";

/// 会員番号の予約イベント
///
/// `member_number-<番号>` ストリームに記録し、期待リビジョン付きの追記で
/// 番号の一意性を保証する。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberNumberEvent {
    Reserved {
        id: MemberNumber,
        customer_id: CustomerId,
    },
    Released {
        id: MemberNumber,
        customer_id: CustomerId,
    },
}

impl Event for MemberNumberEvent {
    type Id = MemberNumber;
}

fn member_number_stream(member_number: MemberNumber) -> String {
    format!("{}-{}", MEMBER_NUMBER_STREAM, member_number)
}

fn duplicate(member_number: MemberNumber) -> DataAccessError {
    DataAccessError::DuplicateKey(format!("member_number {}", member_number))
}

/// 予約ストリームの最新イベントから予約時の期待リビジョンを決める
fn reserve_revision(
    member_number: MemberNumber,
    latest: Option<(u64, MemberNumberEvent)>,
) -> Result<ExpectedRevision, DataAccessError> {
    match latest {
        None => Ok(ExpectedRevision::NoStream),
        Some((revision, MemberNumberEvent::Released { .. })) => {
            Ok(ExpectedRevision::Exact(revision))
        }
        Some((_, MemberNumberEvent::Reserved { .. })) => Err(duplicate(member_number)),
    }
}

/// 予約を保持しているのが `customer_id` であれば解放時の期待リビジョンを返す
fn release_revision(
    customer_id: CustomerId,
    latest: Option<(u64, MemberNumberEvent)>,
) -> Option<u64> {
    match latest {
        Some((revision, MemberNumberEvent::Reserved { customer_id: holder, .. }))
            if holder == customer_id =>
        {
            Some(revision)
        }
        _ => None,
    }
}

/// 予約イベントを順に畳み込み、予約中の番号を返す
fn reserved_numbers<I>(events: I) -> BTreeSet<MemberNumber>
where
    I: IntoIterator<Item = MemberNumberEvent>,
{
    let mut reserved = BTreeSet::new();
    for event in events {
        match event {
            MemberNumberEvent::Reserved { id, .. } => reserved.insert(id),
            MemberNumberEvent::Released { id, .. } => reserved.remove(&id),
        };
    }
    reserved
}

/// `$all` を読み込んだ結果
struct Scan {
    customers: Vec<Customer>,
    reserved: BTreeSet<MemberNumber>,
}

/// EventStoreDB 上の顧客リポジトリ
#[derive(Clone)]
pub struct EventStoreCustomerRepository {
    client: Client,
}

impl EventStoreCustomerRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 顧客を最新リビジョンとともに読み込む
    async fn load(&self, id: CustomerId) -> Result<Option<(u64, Customer)>, DataAccessError> {
        let events =
            match read_events::<CustomerEvent, _>(&self.client, stream_name::<Customer>(id)).await? {
                Some(events) => events,
                None => return Ok(None),
            };
        let mut entity = Customer::default();
        let mut revision = 0;
        for (rev, event) in events {
            if let CustomerEvent::Deleted { .. } = event {
                return Ok(None);
            }
            entity.apply(event);
            revision = rev;
        }
        if entity.id() != id {
            return Ok(None);
        }
        entity.clear();
        Ok(Some((revision, entity)))
    }

    /// 会員番号ストリームの最新イベント
    async fn holder(
        &self,
        member_number: MemberNumber,
    ) -> Result<Option<(u64, MemberNumberEvent)>, DataAccessError> {
        Ok(read_events::<MemberNumberEvent, _>(
            &self.client,
            member_number_stream(member_number),
        )
        .await?
        .and_then(|events| events.into_iter().last()))
    }

    async fn reserve(
        &self,
        member_number: MemberNumber,
        customer_id: CustomerId,
    ) -> Result<(), DataAccessError> {
        let rev = reserve_revision(member_number, self.holder(member_number).await?)?;
        let event = from_event(MemberNumberEvent::Reserved {
            id: member_number,
            customer_id,
        })?;
        match self
            .client
            .append_to_stream(
                &member_number_stream(member_number),
                &AppendToStreamOptions::default().expected_revision(rev),
                event,
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(eventstore::Error::WrongExpectedVersion { .. }) => Err(duplicate(member_number)),
            Err(e) => Err(e.into()),
        }
    }

    async fn release(
        &self,
        member_number: MemberNumber,
        customer_id: CustomerId,
    ) -> Result<(), DataAccessError> {
        let revision = match release_revision(customer_id, self.holder(member_number).await?) {
            Some(revision) => revision,
            None => {
                warn!(
                    "会員番号 {} は顧客 {} に予約されていません",
                    member_number, customer_id
                );
                return Ok(());
            }
        };
        let event = from_event(MemberNumberEvent::Released {
            id: member_number,
            customer_id,
        })?;
        self.client
            .append_to_stream(
                &member_number_stream(member_number),
                &AppendToStreamOptions::default()
                    .expected_revision(ExpectedRevision::Exact(revision)),
                event,
            )
            .await?;
        Ok(())
    }

    /// 予約を解放する。失敗はログに残すのみ。
    ///
    /// 解放できなかった番号は予約中として [`CustomerRepository::member_numbers`] に残る。
    async fn release_quietly(&self, member_number: MemberNumber, customer_id: CustomerId) {
        if let Err(e) = self.release(member_number, customer_id).await {
            error!("会員番号 {} の予約解放に失敗: {}", member_number, e);
        }
    }

    async fn append(
        &self,
        entity: &mut Customer,
        rev: ExpectedRevision,
    ) -> Result<(), DataAccessError> {
        let stream_name = stream_name::<Customer>(entity.id());
        let events = entity
            .pop_all()
            .into_iter()
            .map(from_event)
            .collect::<Result<Vec<EventData>, EventConvertError>>()?;
        self.client
            .append_to_stream(
                &stream_name,
                &AppendToStreamOptions::default().expected_revision(rev),
                events,
            )
            .await?;
        Ok(())
    }

    /// フィルタに一致する顧客をリビジョン付きで探す
    async fn locate(
        &self,
        filter: &CustomerFilter,
    ) -> Result<Option<(u64, Customer)>, DataAccessError> {
        let id = match (filter.id, filter.member_number) {
            (Some(id), _) => id,
            (None, Some(member_number)) => match self.holder(member_number).await? {
                Some((_, MemberNumberEvent::Reserved { customer_id, .. })) => customer_id,
                _ => return Ok(None),
            },
            (None, None) => {
                match self
                    .find_all(filter, CustomerSort::MemberNumberAsc)
                    .await?
                    .into_iter()
                    .next()
                {
                    Some(customer) => customer.id(),
                    None => return Ok(None),
                }
            }
        };
        Ok(self
            .load(id)
            .await?
            .filter(|(_, customer)| filter.matches(customer)))
    }

    /// `$all` から顧客イベントと予約イベントを畳み込む
    async fn scan_all(&self) -> Result<Scan, DataAccessError> {
        let mut stream = self.client.read_all(&Default::default()).await?;
        let mut customers: HashMap<CustomerId, Customer> = HashMap::new();
        let mut reservations = Vec::new();
        loop {
            match stream.next().await {
                Ok(Some(resolved)) => {
                    if let Some(event) = decode_event::<MemberNumberEvent, _>(
                        &resolved,
                        MEMBER_NUMBER_STREAM,
                    ) {
                        reservations.push(event?);
                        continue;
                    }
                    let event = match decode_customer_event(&resolved) {
                        Some(event) => event?,
                        None => continue,
                    };
                    match event {
                        CustomerEvent::Deleted { id } => {
                            customers.remove(&id);
                        }
                        event => customers.entry(event.id()).or_default().apply(event),
                    }
                }
                Ok(_) => break,
                Err(e) => return Err(e.into()),
            }
        }
        let customers = customers
            .into_iter()
            .filter(|(id, customer)| customer.id() == *id)
            .map(|(_, mut customer)| {
                customer.clear();
                customer
            })
            .collect();
        Ok(Scan {
            customers,
            reserved: reserved_numbers(reservations),
        })
    }
}

#[async_trait]
impl CustomerRepository for EventStoreCustomerRepository {
    async fn find_all(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
    ) -> Result<Vec<Customer>, DataAccessError> {
        let mut customers = self
            .scan_all()
            .await?
            .customers
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect::<Vec<_>>();
        sort.sort(&mut customers);
        Ok(customers)
    }

    async fn find_one(&self, filter: &CustomerFilter) -> Result<Option<Customer>, DataAccessError> {
        Ok(self.locate(filter).await?.map(|(_, customer)| customer))
    }

    async fn insert(&self, mut customer: Customer) -> Result<Customer, DataAccessError> {
        if !matches!(customer.peek(), Some(CustomerEvent::Registered { .. })) {
            return Err(DataAccessError::ClientSideError(
                "customer has no registration event".into(),
            ));
        }
        let id = customer.id();
        let member_number = customer.member_number();
        self.reserve(member_number, id).await?;
        if let Err(e) = self.append(&mut customer, ExpectedRevision::NoStream).await {
            self.release_quietly(member_number, id).await;
            return Err(e);
        }
        Ok(customer)
    }

    async fn update_one(
        &self,
        filter: &CustomerFilter,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, DataAccessError> {
        let (revision, mut customer) = match self.locate(filter).await? {
            Some(found) => found,
            None => return Ok(None),
        };
        let id = customer.id();
        let old = customer.member_number();
        customer
            .apply_patch(patch)
            .map_err(|e| DataAccessError::ClientSideError(Box::new(e)))?;
        if customer.peek().is_none() {
            return Ok(Some(customer));
        }
        let new = customer.member_number();
        if new != old {
            self.reserve(new, id).await?;
        }
        if let Err(e) = self
            .append(&mut customer, ExpectedRevision::Exact(revision))
            .await
        {
            if new != old {
                self.release_quietly(new, id).await;
            }
            return Err(e);
        }
        if new != old {
            self.release_quietly(old, id).await;
        }
        Ok(Some(customer))
    }

    async fn delete_one(
        &self,
        filter: &CustomerFilter,
    ) -> Result<Option<Customer>, DataAccessError> {
        let (revision, mut customer) = match self.locate(filter).await? {
            Some(found) => found,
            None => return Ok(None),
        };
        customer.delete();
        self.append(&mut customer, ExpectedRevision::Exact(revision))
            .await?;
        if let Err(e) = self
            .client
            .delete_stream(&stream_name::<Customer>(customer.id()), &Default::default())
            .await
        {
            warn!("顧客ストリーム {} の削除に失敗: {}", customer.id(), e);
        }
        self.release_quietly(customer.member_number(), customer.id())
            .await;
        Ok(Some(customer))
    }

    /// 顧客の会員番号に加え、解放されていない予約の番号も使用中とみなす
    async fn member_numbers(&self) -> Result<Vec<MemberNumber>, DataAccessError> {
        let Scan {
            customers,
            mut reserved,
        } = self.scan_all().await?;
        reserved.extend(customers.iter().map(Customer::member_number));
        Ok(reserved.into_iter().collect())
    }
}
