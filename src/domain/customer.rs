use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    member_number::MemberNumber, DataAccessError, Entity, Event, EventQueue, EventQueueIntoIter,
    Id,
};

/// 顧客リポジトリ
///
/// ドキュメントストアと同じくフィルタ単位で検索・更新・削除を行う。
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// フィルタに一致する顧客を並び順どおりに返す
    async fn find_all(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
    ) -> Result<Vec<Customer>, DataAccessError>;
    /// フィルタに一致する最初の顧客を返す
    async fn find_one(&self, filter: &CustomerFilter) -> Result<Option<Customer>, DataAccessError>;
    /// 顧客を登録する
    ///
    /// 会員番号が使用済みの場合は [`DataAccessError::DuplicateKey`] を返す。
    async fn insert(&self, customer: Customer) -> Result<Customer, DataAccessError>;
    /// フィルタに一致する最初の顧客を更新する
    async fn update_one(
        &self,
        filter: &CustomerFilter,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, DataAccessError>;
    /// フィルタに一致する最初の顧客を削除する
    async fn delete_one(&self, filter: &CustomerFilter)
        -> Result<Option<Customer>, DataAccessError>;

    /// 使用中の会員番号を昇順で返す
    async fn member_numbers(&self) -> Result<Vec<MemberNumber>, DataAccessError> {
        Ok(self
            .find_all(&CustomerFilter::all(), CustomerSort::MemberNumberAsc)
            .await?
            .iter()
            .map(Customer::member_number)
            .collect())
    }
}

/// 顧客ID
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct CustomerId(Uuid);

impl Id for CustomerId {
    type Inner = Uuid;
}

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// パスで渡される顧客の識別子
///
/// 数値であれば会員番号、それ以外は顧客IDとして解釈する。
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CustomerKey {
    MemberNumber(MemberNumber),
    Id(CustomerId),
}

impl CustomerKey {
    pub fn parse(value: &str) -> Option<Self> {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            return value
                .parse::<u64>()
                .ok()
                .map(|number| Self::MemberNumber(number.into()));
        }
        value
            .parse::<Uuid>()
            .ok()
            .map(|id| Self::Id(CustomerId::from(id)))
    }
}

/// 顧客イベント
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerEvent {
    /// 顧客が登録された
    Registered {
        id: CustomerId,
        member_number: MemberNumber,
        name: String,
        date_of_birth: DateTime<Utc>,
        interest: String,
        #[serde(default)]
        model: String,
    },
    /// 名前が変更された
    NameChanged { id: CustomerId, name: String },
    /// 生年月日が変更された
    DateOfBirthChanged {
        id: CustomerId,
        date_of_birth: DateTime<Utc>,
    },
    /// 興味が変更された
    InterestChanged { id: CustomerId, interest: String },
    /// 会員モデルが変更された
    ModelChanged { id: CustomerId, model: String },
    /// 会員番号が変更された
    MemberNumberChanged {
        id: CustomerId,
        member_number: MemberNumber,
    },
    /// 顧客が削除された
    Deleted { id: CustomerId },
}

impl Event for CustomerEvent {
    type Id = CustomerId;
}

impl CustomerEvent {
    pub fn id(&self) -> CustomerId {
        match self {
            CustomerEvent::Registered { id, .. }
            | CustomerEvent::NameChanged { id, .. }
            | CustomerEvent::DateOfBirthChanged { id, .. }
            | CustomerEvent::InterestChanged { id, .. }
            | CustomerEvent::ModelChanged { id, .. }
            | CustomerEvent::MemberNumberChanged { id, .. }
            | CustomerEvent::Deleted { id } => *id,
        }
    }
}

/// 顧客エンティティ
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    id: CustomerId,
    member_number: MemberNumber,
    name: String,
    date_of_birth: DateTime<Utc>,
    interest: String,
    model: String,
    #[serde(skip)]
    events: EventQueue<CustomerEvent>,
}

impl Customer {
    pub fn register(
        id: CustomerId,
        member_number: MemberNumber,
        name: String,
        date_of_birth: DateTime<Utc>,
        interest: String,
        model: String,
    ) -> Result<Self, CustomerError> {
        let mut entity = Customer::default();
        let event = CustomerEvent::Registered {
            id,
            member_number,
            name,
            date_of_birth,
            interest,
            model,
        };
        entity.validate(&event)?;
        entity.apply(event);
        Ok(entity)
    }

    pub fn change_name(&mut self, name: String) -> Result<(), CustomerError> {
        self.record(CustomerEvent::NameChanged { id: self.id, name })
    }

    pub fn change_date_of_birth(&mut self, date_of_birth: DateTime<Utc>) -> Result<(), CustomerError> {
        self.record(CustomerEvent::DateOfBirthChanged {
            id: self.id,
            date_of_birth,
        })
    }

    pub fn change_interest(&mut self, interest: String) -> Result<(), CustomerError> {
        self.record(CustomerEvent::InterestChanged {
            id: self.id,
            interest,
        })
    }

    pub fn change_model(&mut self, model: String) -> Result<(), CustomerError> {
        self.record(CustomerEvent::ModelChanged { id: self.id, model })
    }

    pub fn change_member_number(&mut self, member_number: MemberNumber) -> Result<(), CustomerError> {
        self.record(CustomerEvent::MemberNumberChanged {
            id: self.id,
            member_number,
        })
    }

    pub fn delete(&mut self) {
        self.events.push(CustomerEvent::Deleted { id: self.id });
    }

    /// 差分を適用する
    ///
    /// 全項目を検証してから適用するため、検証エラー時は何も変更されない。
    /// 値が変わった項目のみイベントを発行する。
    pub fn apply_patch(&mut self, patch: &CustomerPatch) -> Result<(), CustomerError> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            if *name != self.name {
                self.change_name(name.clone())?;
            }
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            if date_of_birth != self.date_of_birth {
                self.change_date_of_birth(date_of_birth)?;
            }
        }
        if let Some(interest) = &patch.interest {
            if *interest != self.interest {
                self.change_interest(interest.clone())?;
            }
        }
        if let Some(model) = &patch.model {
            if *model != self.model {
                self.change_model(model.clone())?;
            }
        }
        if let Some(member_number) = patch.member_number {
            if member_number != self.member_number {
                self.change_member_number(member_number)?;
            }
        }
        Ok(())
    }

    pub fn member_number(&self) -> MemberNumber {
        self.member_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date_of_birth(&self) -> DateTime<Utc> {
        self.date_of_birth
    }

    pub fn interest(&self) -> &str {
        &self.interest
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn record(&mut self, event: CustomerEvent) -> Result<(), CustomerError> {
        self.validate(&event)?;
        self.apply(event);
        Ok(())
    }

    fn validate_id(&self, id: &CustomerId) -> Result<(), CustomerError> {
        match self.id == *id {
            true => Ok(()),
            false => Err(CustomerError::MismatchedId),
        }
    }

    fn validate_name(name: &str) -> Result<(), CustomerError> {
        match name.trim().is_empty() {
            true => Err(CustomerError::NameIsBlank),
            false => Ok(()),
        }
    }

    fn validate_member_number(member_number: &MemberNumber) -> Result<(), CustomerError> {
        match member_number.is_valid() {
            true => Ok(()),
            false => Err(CustomerError::MemberNumberIsZero),
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    type Event = CustomerEvent;
    type Error = CustomerError;

    fn id(&self) -> CustomerId {
        self.id
    }

    fn validate(&self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            CustomerEvent::Registered {
                name,
                member_number,
                ..
            } => {
                Self::validate_name(name)?;
                Self::validate_member_number(member_number)
            }
            CustomerEvent::NameChanged { id, name } => {
                self.validate_id(id)?;
                Self::validate_name(name)
            }
            CustomerEvent::MemberNumberChanged { id, member_number } => {
                self.validate_id(id)?;
                Self::validate_member_number(member_number)
            }
            CustomerEvent::DateOfBirthChanged { id, .. }
            | CustomerEvent::InterestChanged { id, .. }
            | CustomerEvent::ModelChanged { id, .. }
            | CustomerEvent::Deleted { id } => self.validate_id(id),
        }
    }

    fn apply(&mut self, event: Self::Event) {
        if self.validate(&event).is_err() {
            return;
        }
        match &event {
            CustomerEvent::Registered {
                id,
                member_number,
                name,
                date_of_birth,
                interest,
                model,
            } => {
                if self.id == *id {
                    return;
                }
                self.id = *id;
                self.member_number = *member_number;
                self.name = name.clone();
                self.date_of_birth = *date_of_birth;
                self.interest = interest.clone();
                self.model = model.clone();
            }
            CustomerEvent::NameChanged { name, .. } => self.name = name.clone(),
            CustomerEvent::DateOfBirthChanged { date_of_birth, .. } => {
                self.date_of_birth = *date_of_birth
            }
            CustomerEvent::InterestChanged { interest, .. } => self.interest = interest.clone(),
            CustomerEvent::ModelChanged { model, .. } => self.model = model.clone(),
            CustomerEvent::MemberNumberChanged { member_number, .. } => {
                self.member_number = *member_number
            }
            CustomerEvent::Deleted { .. } => {}
        }
        self.events.push(event);
    }

    fn entity_name() -> &'static str {
        "customer"
    }

    fn events(&self) -> &EventQueue<Self::Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<Self::Event> {
        &mut self.events
    }
}

impl IntoIterator for Customer {
    type Item = CustomerEvent;
    type IntoIter = EventQueueIntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl PartialEq for Customer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.member_number == other.member_number
            && self.name == other.name
            && self.date_of_birth == other.date_of_birth
            && self.interest == other.interest
            && self.model == other.model
    }
}

impl Eq for Customer {}

/// 顧客エラー
#[derive(Error, Display, Debug, PartialEq, Eq)]
pub enum CustomerError {
    /// IDが一致しません
    #[display(fmt = "ID does not match")]
    MismatchedId,
    /// 名前が空欄です
    #[display(fmt = "Name cannot be blank")]
    NameIsBlank,
    /// 会員番号は1以上です
    #[display(fmt = "Member number must be positive")]
    MemberNumberIsZero,
}

/// 新規登録の入力
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    #[serde(default)]
    pub interest: String,
    #[serde(default)]
    pub model: String,
}

/// 更新の入力
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub interest: Option<String>,
    pub model: Option<String>,
    pub member_number: Option<MemberNumber>,
}

impl CustomerPatch {
    pub fn validate(&self) -> Result<(), CustomerError> {
        if let Some(name) = &self.name {
            Customer::validate_name(name)?;
        }
        if let Some(member_number) = &self.member_number {
            Customer::validate_member_number(member_number)?;
        }
        Ok(())
    }
}

/// 検索条件
///
/// 指定された条件はすべて AND で評価される。生年月日は `[born_from, born_to)`。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub id: Option<CustomerId>,
    pub member_number: Option<MemberNumber>,
    pub interest: Option<String>,
    pub model: Option<String>,
    pub born_from: Option<DateTime<Utc>>,
    pub born_to: Option<DateTime<Utc>>,
}

impl CustomerFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: CustomerId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_member_number(member_number: MemberNumber) -> Self {
        Self {
            member_number: Some(member_number),
            ..Default::default()
        }
    }

    pub fn with_interest(mut self, interest: impl Into<String>) -> Self {
        self.interest = Some(interest.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn born_between(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.born_from = from;
        self.born_to = to;
        self
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        self.id.map_or(true, |id| customer.id == id)
            && self
                .member_number
                .map_or(true, |number| customer.member_number == number)
            && self
                .interest
                .as_ref()
                .map_or(true, |interest| customer.interest == *interest)
            && self
                .model
                .as_ref()
                .map_or(true, |model| customer.model == *model)
            && self
                .born_from
                .map_or(true, |from| customer.date_of_birth >= from)
            && self.born_to.map_or(true, |to| customer.date_of_birth < to)
    }
}

impl From<CustomerKey> for CustomerFilter {
    fn from(value: CustomerKey) -> Self {
        match value {
            CustomerKey::MemberNumber(number) => Self::by_member_number(number),
            CustomerKey::Id(id) => Self::by_id(id),
        }
    }
}

/// 並び順
///
/// クエリでは `memberNumber`、`-memberNumber`、`name`、`dateOfBirth` で指定する。
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum CustomerSort {
    #[default]
    #[serde(rename = "memberNumber")]
    MemberNumberAsc,
    #[serde(rename = "-memberNumber")]
    MemberNumberDesc,
    #[serde(rename = "name")]
    NameAsc,
    #[serde(rename = "dateOfBirth")]
    DateOfBirthAsc,
}

impl CustomerSort {
    pub fn sort(self, customers: &mut [Customer]) {
        customers.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(self, a: &Customer, b: &Customer) -> Ordering {
        let by_number = a.member_number.cmp(&b.member_number);
        match self {
            CustomerSort::MemberNumberAsc => by_number,
            CustomerSort::MemberNumberDesc => by_number.reverse(),
            CustomerSort::NameAsc => a.name.cmp(&b.name).then(by_number),
            CustomerSort::DateOfBirthAsc => a.date_of_birth.cmp(&b.date_of_birth).then(by_number),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    pub(crate) fn customer(number: u64, name: &str, year: i32, interest: &str) -> Customer {
        let mut customer = Customer::register(
            CustomerId::generate(),
            number.into(),
            name.to_owned(),
            Utc.with_ymd_and_hms(year, 5, 15, 0, 0, 0).unwrap(),
            interest.to_owned(),
            "Standard".to_owned(),
        )
        .unwrap();
        customer.clear();
        customer
    }

    #[test]
    fn test_customer_register() {
        let id = CustomerId::generate();
        let date_of_birth = Utc.with_ymd_and_hms(1990, 5, 15, 0, 0, 0).unwrap();
        let mut customer = Customer::register(
            id,
            MemberNumber::from(1),
            "NUt".to_owned(),
            date_of_birth,
            "movies".to_owned(),
            "Premium".to_owned(),
        )
        .unwrap();
        assert_eq!(customer.id(), id);
        assert_eq!(customer.member_number(), MemberNumber::from(1));
        assert_eq!(customer.name(), "NUt");
        assert_eq!(customer.date_of_birth(), date_of_birth);
        assert_eq!(customer.interest(), "movies");
        assert_eq!(customer.model(), "Premium");
        assert_eq!(
            customer.pop_all(),
            vec![CustomerEvent::Registered {
                id,
                member_number: 1.into(),
                name: "NUt".to_owned(),
                date_of_birth,
                interest: "movies".to_owned(),
                model: "Premium".to_owned(),
            }]
        );
    }

    #[test]
    fn test_customer_register_invalid() {
        let date_of_birth = Utc.with_ymd_and_hms(1990, 5, 15, 0, 0, 0).unwrap();
        assert_eq!(
            Customer::register(
                CustomerId::generate(),
                1.into(),
                "  ".to_owned(),
                date_of_birth,
                String::new(),
                String::new()
            )
            .unwrap_err(),
            CustomerError::NameIsBlank
        );
        assert_eq!(
            Customer::register(
                CustomerId::generate(),
                0.into(),
                "Oud".to_owned(),
                date_of_birth,
                String::new(),
                String::new()
            )
            .unwrap_err(),
            CustomerError::MemberNumberIsZero
        );
    }

    #[test]
    fn test_apply_patch_records_changed_fields_only() {
        let mut customer = customer(2, "Oud", 1985, "football");
        let id = customer.id();
        customer
            .apply_patch(&CustomerPatch {
                name: Some("Oud".to_owned()),
                interest: Some("gym".to_owned()),
                model: Some("Premium".to_owned()),
                member_number: Some(7.into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(customer.interest(), "gym");
        assert_eq!(customer.model(), "Premium");
        assert_eq!(customer.member_number(), MemberNumber::from(7));
        assert_eq!(
            customer.pop_all(),
            vec![
                CustomerEvent::InterestChanged {
                    id,
                    interest: "gym".to_owned()
                },
                CustomerEvent::ModelChanged {
                    id,
                    model: "Premium".to_owned()
                },
                CustomerEvent::MemberNumberChanged {
                    id,
                    member_number: 7.into()
                },
            ]
        );
    }

    #[test]
    fn test_apply_patch_invalid_leaves_customer_untouched() {
        let mut customer = customer(3, "INchy", 1992, "gym");
        let before = customer.clone();
        let result = customer.apply_patch(&CustomerPatch {
            interest: Some("movies".to_owned()),
            name: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(result, Err(CustomerError::NameIsBlank));
        assert_eq!(customer, before);
        assert!(customer.peek().is_none());
    }

    #[test]
    fn test_replay_events() {
        let mut original = customer(4, "Krit", 1988, "gaming");
        original.change_name("Krit2".to_owned()).unwrap();
        original.change_model("Basic".to_owned()).unwrap();
        original.delete();
        let mut replayed = Customer::default();
        let registered = CustomerEvent::Registered {
            id: original.id(),
            member_number: 4.into(),
            name: "Krit".to_owned(),
            date_of_birth: original.date_of_birth(),
            interest: "gaming".to_owned(),
            model: "Standard".to_owned(),
        };
        replayed.apply(registered);
        for event in original.clone() {
            replayed.apply(event);
        }
        assert_eq!(replayed, original);
    }

    #[test]
    fn test_customer_key_parse() {
        assert_eq!(
            CustomerKey::parse("12"),
            Some(CustomerKey::MemberNumber(12.into()))
        );
        let id = CustomerId::generate();
        assert_eq!(CustomerKey::parse(&id.to_string()), Some(CustomerKey::Id(id)));
        assert_eq!(CustomerKey::parse("mock1"), None);
        assert_eq!(CustomerKey::parse("-1"), None);
        assert_eq!(CustomerKey::parse("+5"), None);
        assert_eq!(CustomerKey::parse("12abc"), None);
    }

    #[test]
    fn test_filter_matches() {
        let customer = customer(5, "Aum", 1995, "movies");
        assert!(CustomerFilter::all().matches(&customer));
        assert!(CustomerFilter::by_member_number(5.into()).matches(&customer));
        assert!(!CustomerFilter::by_member_number(6.into()).matches(&customer));
        assert!(CustomerFilter::by_id(customer.id()).matches(&customer));
        assert!(!CustomerFilter::all().with_interest("gym").matches(&customer));
        assert!(CustomerFilter::all().with_model("Standard").matches(&customer));
        assert!(!CustomerFilter::all().with_model("Premium").matches(&customer));
        let nineties = CustomerFilter::all().born_between(
            Some(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()),
        );
        assert!(nineties.matches(&customer));
        let eighties = CustomerFilter::all()
            .born_between(None, Some(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()));
        assert!(!eighties.matches(&customer));
    }

    #[test]
    fn test_sort() {
        let mut customers = vec![
            customer(3, "b", 1990, ""),
            customer(1, "c", 1980, ""),
            customer(2, "a", 2000, ""),
        ];
        let numbers = |customers: &[Customer]| {
            customers
                .iter()
                .map(|c| *c.member_number())
                .collect::<Vec<_>>()
        };
        CustomerSort::MemberNumberAsc.sort(&mut customers);
        assert_eq!(numbers(&customers), vec![1, 2, 3]);
        CustomerSort::MemberNumberDesc.sort(&mut customers);
        assert_eq!(numbers(&customers), vec![3, 2, 1]);
        CustomerSort::NameAsc.sort(&mut customers);
        assert_eq!(numbers(&customers), vec![2, 3, 1]);
        CustomerSort::DateOfBirthAsc.sort(&mut customers);
        assert_eq!(numbers(&customers), vec![1, 3, 2]);
    }

    #[test]
    fn test_customer_serialize() {
        let customer = customer(1, "NUt", 1990, "movies");
        assert_eq!(
            serde_json::to_value(&customer).unwrap(),
            json!({
                "id": customer.id().to_string(),
                "memberNumber": 1,
                "name": "NUt",
                "dateOfBirth": "1990-05-15T00:00:00Z",
                "interest": "movies",
                "model": "Standard",
            })
        );
    }

    #[test]
    fn test_patch_deserialize() {
        let patch: CustomerPatch =
            serde_json::from_value(json!({"interest": "gym", "memberNumber": 9})).unwrap();
        assert_eq!(
            patch,
            CustomerPatch {
                interest: Some("gym".to_owned()),
                member_number: Some(9.into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_registered_without_model() {
        let id = CustomerId::generate();
        let event: CustomerEvent = serde_json::from_value(json!({
            "Registered": {
                "id": id,
                "member_number": 1,
                "name": "NUt",
                "date_of_birth": "1990-05-15T00:00:00Z",
                "interest": "movies",
            }
        }))
        .unwrap();
        let mut customer = Customer::default();
        customer.apply(event);
        assert_eq!(customer.id(), id);
        assert_eq!(customer.model(), "");
    }

    #[test]
    fn test_new_customer_deserialize() {
        let new: NewCustomer = serde_json::from_value(json!({
            "name": "NUt",
            "dateOfBirth": "1990-05-15T00:00:00Z",
            "model": "Premium",
        }))
        .unwrap();
        assert_eq!(new.interest, "");
        assert_eq!(new.model, "Premium");
    }

    #[test]
    fn test_sort_deserialize() {
        let sort = |value: &str| serde_json::from_value::<CustomerSort>(json!(value)).ok();
        assert_eq!(sort("memberNumber"), Some(CustomerSort::MemberNumberAsc));
        assert_eq!(sort("-memberNumber"), Some(CustomerSort::MemberNumberDesc));
        assert_eq!(sort("name"), Some(CustomerSort::NameAsc));
        assert_eq!(sort("dateOfBirth"), Some(CustomerSort::DateOfBirthAsc));
        assert_eq!(sort("age"), None);
    }
}
