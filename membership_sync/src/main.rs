use std::error::Error;

use eventstore::{ClientSettings, Position, StreamPosition, SubscribeToAllOptions};
use membership::{
    domain::{
        customer::{Customer, CustomerEvent, CustomerId},
        Entity,
    },
    infrastructure::decode_customer_event,
    MembershipConfig,
};
use meilisearch_sdk::{task_info::TaskInfo, tasks::Task};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn, Level};
use uuid::Uuid;

static VERSION_UID: &str = "eventstore_version";

#[tokio::main]
async fn main() {
    match MembershipConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = subscribe(&config).await {
                error!("アプリケーションエラー: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("アプリケーションエラー: {}", error)
        }
    }
}

#[derive(Serialize, Deserialize)]
struct EventstoreVersion {
    id: u64,
    event_id: Uuid,
    position: Position,
}

async fn subscribe(config: &MembershipConfig) -> Result<(), Box<dyn Error>> {
    let settings = config.eventstore.url.parse::<ClientSettings>()?;
    let mut client = Client {
        eventstore: eventstore::Client::new(settings)?,
        meilisearch: meilisearch_sdk::Client::new(
            &config.meilisearch.url,
            &config.meilisearch.api_key,
        ),
        task_info: None,
    };
    let start = match client
        .meilisearch
        .index(VERSION_UID)
        .get_document::<EventstoreVersion>("1")
        .await
    {
        Ok(version) => {
            info!("位置 {:?} から同期を再開します", version.position);
            StreamPosition::Position(version.position)
        }
        Err(e) => {
            warn!("同期位置を取得できないため先頭から同期します: {}", e);
            StreamPosition::Start
        }
    };
    let mut sub = client
        .eventstore
        .subscribe_to_all(&SubscribeToAllOptions::default().position(start))
        .await;
    loop {
        match sub.next().await {
            Ok(resolved) => {
                match decode_customer_event(&resolved) {
                    Some(Ok(event)) => {
                        info!("顧客イベントを受信: {:?}", event);
                        if let Err(e) = client.execute(event).await {
                            error!("イベント実行エラー: {}", e);
                            continue;
                        }
                    }
                    Some(Err(e)) => warn!("顧客イベントを変換できません: {}", e),
                    None => continue,
                }
                // インデックスへの反映が終わるまで同期位置を進めない
                match client.wait_for_completion().await {
                    Ok(Some(Task::Failed { content })) => {
                        error!("インデックス更新失敗: {:?}", content.error);
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("タスク待機エラー: {}", e);
                        continue;
                    }
                }
                let event = resolved.get_original_event();
                if let Err(e) = client
                    .meilisearch
                    .index(VERSION_UID)
                    .add_documents(
                        &[EventstoreVersion {
                            id: 1,
                            event_id: event.id,
                            position: event.position,
                        }],
                        Some("id"),
                    )
                    .await
                {
                    error!("バージョン情報保存失敗: {}", e);
                }
            }
            Err(e) => return Err(Box::new(e)),
        }
    }
}

struct Client {
    eventstore: eventstore::Client,
    meilisearch: meilisearch_sdk::Client,
    task_info: Option<TaskInfo>,
}

impl Client {
    async fn wait_for_completion(&self) -> Result<Option<Task>, meilisearch_sdk::errors::Error> {
        if let Some(task_info) = &self.task_info {
            loop {
                match self.meilisearch.wait_for_task(task_info, None, None).await {
                    Ok(task) => match task {
                        Task::Succeeded { .. } | Task::Failed { .. } => return Ok(Some(task)),
                        _ => continue,
                    },
                    Err(meilisearch_sdk::errors::Error::Timeout) => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(None)
    }

    async fn execute(
        &mut self,
        event: CustomerEvent,
    ) -> Result<(), meilisearch_sdk::errors::Error> {
        let index = self.meilisearch.index(Customer::entity_name());
        let task = match operation(event) {
            Operation::Add(document) => index.add_documents(&[document], Some("id")).await?,
            Operation::Update(document) => index.add_or_update(&[document], Some("id")).await?,
            Operation::Delete(id) => index.delete_document(id).await?,
            Operation::Skip => {
                warn!("不正なエンティティの登録をスキップしました");
                return Ok(());
            }
        };
        self.task_info = Some(task);
        Ok(())
    }
}

/// インデックスへの操作
#[derive(Debug, PartialEq)]
enum Operation {
    /// ドキュメント全体を登録する
    Add(Value),
    /// 指定フィールドのみ更新する
    Update(Value),
    Delete(CustomerId),
    Skip,
}

/// 顧客イベントをインデックスの操作に変換する
///
/// ドキュメントのフィールド名は API のレスポンスと同じ camelCase。
fn operation(event: CustomerEvent) -> Operation {
    match event {
        CustomerEvent::Registered {
            id,
            member_number,
            name,
            date_of_birth,
            interest,
            model,
        } => Customer::register(id, member_number, name, date_of_birth, interest, model)
            .ok()
            .and_then(|entity| serde_json::to_value(entity).ok())
            .map_or(Operation::Skip, Operation::Add),
        CustomerEvent::NameChanged { id, name } => {
            Operation::Update(json!({ "id": id, "name": name }))
        }
        CustomerEvent::DateOfBirthChanged { id, date_of_birth } => {
            Operation::Update(json!({ "id": id, "dateOfBirth": date_of_birth }))
        }
        CustomerEvent::InterestChanged { id, interest } => {
            Operation::Update(json!({ "id": id, "interest": interest }))
        }
        CustomerEvent::ModelChanged { id, model } => {
            Operation::Update(json!({ "id": id, "model": model }))
        }
        CustomerEvent::MemberNumberChanged { id, member_number } => {
            Operation::Update(json!({ "id": id, "memberNumber": member_number }))
        }
        CustomerEvent::Deleted { id } => Operation::Delete(id),
    }
}
