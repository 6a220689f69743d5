use kitchen_actor::{spawn_sharded, ActorEntity, FrameworkError, ResourceActor};
use async_trait::async_trait;
use std::sync::Arc;

// --- Test Entity ---

/// A bounded shelf: holds at most `limit` plates.
#[derive(Clone, Debug, PartialEq)]
struct Shelf {
    name: String,
    limit: u32,
    plates: u32,
    label: String,
}

#[derive(Debug)]
struct ShelfCreate {
    name: String,
    limit: u32,
}

#[derive(Debug)]
struct ShelfUpdate {
    label: Option<String>,
}

#[derive(Debug)]
enum ShelfAction {
    Put,
    Take,
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum ShelfError {
    #[error("shelf is full")]
    Full,
    #[error("shelf is empty")]
    Empty,
    #[error("limit must be positive")]
    ZeroLimit,
}

#[async_trait]
impl ActorEntity for Shelf {
    type Id = String;
    type Create = ShelfCreate;
    type Update = ShelfUpdate;
    type Action = ShelfAction;
    type ActionResult = u32;
    type Context = ();
    type Error = ShelfError;

    fn key(params: &ShelfCreate) -> String {
        params.name.clone()
    }

    fn from_create_params(name: String, params: ShelfCreate) -> Result<Self, Self::Error> {
        if params.limit == 0 {
            return Err(ShelfError::ZeroLimit);
        }
        Ok(Self {
            name,
            limit: params.limit,
            plates: 0,
            label: String::new(),
        })
    }

    async fn on_update(&mut self, update: ShelfUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(label) = update.label {
            self.label = label;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: ShelfAction, _ctx: &()) -> Result<u32, Self::Error> {
        match action {
            ShelfAction::Put => {
                if self.plates >= self.limit {
                    return Err(ShelfError::Full);
                }
                self.plates += 1;
            }
            ShelfAction::Take => {
                if self.plates == 0 {
                    return Err(ShelfError::Empty);
                }
                self.plates -= 1;
            }
        }
        Ok(self.plates)
    }
}

fn shelf(name: &str, limit: u32) -> ShelfCreate {
    ShelfCreate {
        name: name.into(),
        limit,
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));

    // 1. Create under the payload key
    let id: String = client.create(shelf("pass", 2)).await.unwrap();
    assert_eq!(id, "pass");

    // 2. Actions
    assert_eq!(client.perform_action(id.clone(), ShelfAction::Put).await.unwrap(), 1);
    assert_eq!(client.perform_action(id.clone(), ShelfAction::Put).await.unwrap(), 2);

    // 3. A failing action leaves the state untouched
    let err = client
        .perform_action(id.clone(), ShelfAction::Put)
        .await
        .unwrap_err();
    assert_eq!(err.entity_error::<ShelfError>(), Some(&ShelfError::Full));
    let current: Shelf = client.get(id.clone()).await.unwrap().unwrap();
    assert_eq!(current.plates, 2);

    // 4. Update
    let updated = client
        .update(
            id.clone(),
            ShelfUpdate {
                label: Some("hot".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.label, "hot");
    assert_eq!(updated.plates, 2);
}

#[tokio::test]
async fn test_create_rejects_taken_key() {
    let (actor, client) = ResourceActor::<Shelf>::new(10);
    tokio::spawn(actor.run(()));

    client.create(shelf("cold", 1)).await.unwrap();
    let err = client.create(shelf("cold", 5)).await.unwrap_err();
    assert!(matches!(err, FrameworkError::AlreadyExists(ref key) if key == "cold"));

    // The original survives unchanged
    let kept = client.get("cold".to_string()).await.unwrap().unwrap();
    assert_eq!(kept.limit, 1);
}

#[tokio::test]
async fn test_invalid_create_stores_nothing() {
    let (actor, client) = ResourceActor::<Shelf>::new(10);
    tokio::spawn(actor.run(()));

    let err = client.create(shelf("broken", 0)).await.unwrap_err();
    assert_eq!(err.entity_error::<ShelfError>(), Some(&ShelfError::ZeroLimit));
    assert!(client.get("broken".to_string()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_ensure_is_idempotent() {
    let (actor, client) = ResourceActor::<Shelf>::new(10);
    tokio::spawn(actor.run(()));

    let first = client.ensure(shelf("grill", 3)).await.unwrap();
    assert!(first.created);
    client
        .perform_action("grill".to_string(), ShelfAction::Put)
        .await
        .unwrap();

    let second = client.ensure(shelf("grill", 9)).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.id, "grill");

    let kept = client.get("grill".to_string()).await.unwrap().unwrap();
    assert_eq!(kept.limit, 3);
    assert_eq!(kept.plates, 1);
}

#[tokio::test]
async fn test_missing_key_reports_not_found() {
    let (actor, client) = ResourceActor::<Shelf>::new(10);
    tokio::spawn(actor.run(()));

    let err = client
        .perform_action("ghost".to_string(), ShelfAction::Take)
        .await
        .unwrap_err();
    assert!(matches!(err, FrameworkError::NotFound(_)));

    let err = client
        .update("ghost".to_string(), ShelfUpdate { label: None })
        .await
        .unwrap_err();
    assert!(matches!(err, FrameworkError::NotFound(_)));
}

#[tokio::test]
async fn test_list_spans_all_shards() {
    let (client, _handles) = spawn_sharded::<Shelf>(4, 16, ());
    assert_eq!(client.shard_count(), 4);

    for n in 0..20 {
        client.create(shelf(&format!("shelf-{n}"), 1)).await.unwrap();
    }

    let mut names: Vec<String> = client.list().await.unwrap().into_iter().map(|s| s.name).collect();
    names.sort();
    assert_eq!(names.len(), 20);
    assert!(names.contains(&"shelf-7".to_string()));

    // Each key always lands on the same shard
    let id = "shelf-3".to_string();
    assert_eq!(client.shard_of(&id), client.shard_of(&id.clone()));
}

#[tokio::test]
async fn test_concurrent_ensure_action_never_exceeds_limit() {
    let (client, _handles) = spawn_sharded::<Shelf>(3, 64, ());
    let client = Arc::new(client);

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.ensure_action(shelf("window", 7), ShelfAction::Put).await
        }));
    }

    let mut admitted = 0;
    let mut full = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => {
                assert_eq!(e.entity_error::<ShelfError>(), Some(&ShelfError::Full));
                full += 1;
            }
        }
    }

    assert_eq!(admitted, 7);
    assert_eq!(full, 43);
    let window = client.get("window".to_string()).await.unwrap().unwrap();
    assert_eq!(window.plates, 7);
}

#[tokio::test]
async fn test_dropped_actor_reports_closed() {
    let (actor, client) = ResourceActor::<Shelf>::new(1);
    drop(actor);

    let err = client.get("any".to_string()).await.unwrap_err();
    assert!(err.is_transport());
}
