use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use watchcord_catalog::{CatalogCache, ResourceProber};
use watchcord_core::{
    ActivityEnricher, BridgeConfig, BridgeError, ChannelRecord, EntityRecord, HostBus, Registry,
    StateRefresh, Synchronizer,
};
use watchcord_gateway::{event_channel, EventSender, GatewayClient, RestClient};
use watchcord_models::{
    Activity, ChannelRef, CustomStatus, GatewayEvent, Member, OnlineStatus, PlayingActivity,
    ReactionAdd, Role, User, VoiceState,
};

// ── Test context ────────────────────────────────────────────────────────────

struct TestContext {
    registry: Arc<Registry>,
    client: Arc<GatewayClient>,
    sender: EventSender,
    refreshes: mpsc::UnboundedReceiver<StateRefresh>,
    task: JoinHandle<Result<(), BridgeError>>,
}

impl TestContext {
    /// Synchronizer over a prebuilt registry, with empty catalogs so no
    /// enrichment probe ever leaves the process.
    fn new(members: Vec<EntityRecord>, channels: Vec<ChannelRecord>) -> anyhow::Result<Self> {
        let config = BridgeConfig::from_toml_str(r#"access_token = "test-token""#)?;
        let registry = Arc::new(Registry::from_records(members, channels));
        let client = Arc::new(GatewayClient::new(RestClient::new(
            "http://127.0.0.1:9",
            "test-token",
        )?));
        let catalog = Arc::new(CatalogCache::new(config.catalog_config())?);
        let enricher = ActivityEnricher::new(catalog, ResourceProber::new()?, &config);
        let (host, refreshes) = HostBus::channel();
        let (sender, events) = event_channel();
        let synchronizer =
            Synchronizer::new(registry.clone(), client.clone(), enricher, host, &config);
        let task = tokio::spawn(synchronizer.run(events));
        Ok(Self {
            registry,
            client,
            sender,
            refreshes,
            task,
        })
    }

    async fn emit(&self, event: GatewayEvent) {
        assert!(self.sender.emit(event).await, "synchronizer went away");
    }

    /// Close the stream, wait for the loop to drain, and collect every
    /// refresh request it issued.
    async fn finish(self) -> anyhow::Result<(Vec<StateRefresh>, Result<(), BridgeError>)> {
        let TestContext {
            sender,
            mut refreshes,
            task,
            ..
        } = self;
        drop(sender);
        let outcome = task.await?;
        let mut collected = Vec::new();
        while let Ok(refresh) = refreshes.try_recv() {
            collected.push(refresh);
        }
        Ok((collected, outcome))
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        global_name: None,
        discriminator: Some("0".to_string()),
        avatar: None,
        bot: false,
    }
}

fn member(id: i64, username: &str) -> Member {
    Member {
        user: user(id, username),
        nick: None,
        roles: vec![Role {
            id: 1,
            name: "regulars".to_string(),
        }],
        status: OnlineStatus::Online,
        activities: Vec::new(),
        voice: None,
    }
}

fn playing(name: &str) -> Activity {
    Activity::Playing(PlayingActivity {
        name: name.to_string(),
        state: None,
        details: None,
        application_id: None,
        assets: None,
    })
}

fn tracked(id: i64, key: &str) -> EntityRecord {
    EntityRecord::new(format!("watchcord_user_{id}"), key.to_string())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ready_issues_one_refresh_per_identity_and_is_idempotent() -> anyhow::Result<()> {
    let ctx = TestContext::new(vec![tracked(1, "nelly"), tracked(2, "rigby")], Vec::new())?;
    for (id, name) in [(1, "nelly"), (2, "rigby")] {
        ctx.client.cache().insert_user(user(id, name));
        let mut m = member(id, name);
        m.activities = vec![playing("Factorio")];
        ctx.client.cache().insert_member(m);
    }

    ctx.emit(GatewayEvent::Ready).await;
    ctx.emit(GatewayEvent::Ready).await;

    let registry = ctx.registry.clone();
    let (refreshes, outcome) = ctx.finish().await?;
    assert!(outcome.is_ok());
    // two identities, two ready events, one coalesced refresh each
    assert_eq!(refreshes.len(), 4);

    let record = registry.member("nelly").unwrap();
    let record = record.read().await;
    assert_eq!(record.user_id, Some(1));
    assert_eq!(record.status, OnlineStatus::Online);
    assert_eq!(record.game.as_deref(), Some("Factorio"));
    assert_eq!(record.roles.as_deref(), Some(&["regulars".to_string()][..]));
    Ok(())
}

#[tokio::test]
async fn events_for_untracked_identities_are_no_ops() -> anyhow::Result<()> {
    let ctx = TestContext::new(vec![tracked(1, "nelly")], Vec::new())?;

    let stranger = member(99, "stranger");
    ctx.emit(GatewayEvent::MemberUpdate {
        before: None,
        after: stranger.clone(),
    })
    .await;
    ctx.emit(GatewayEvent::PresenceUpdate {
        before: None,
        after: stranger.clone(),
    })
    .await;
    ctx.emit(GatewayEvent::UserUpdate {
        before: None,
        after: user(99, "stranger"),
    })
    .await;
    ctx.emit(GatewayEvent::VoiceStateUpdate {
        member: stranger,
        before: None,
        after: VoiceState::default(),
    })
    .await;
    ctx.emit(GatewayEvent::ReactionAdd(ReactionAdd {
        channel_id: 999,
        message_id: 1,
        user_id: 99,
        emoji: None,
        member: None,
    }))
    .await;

    let (refreshes, outcome) = ctx.finish().await?;
    assert!(outcome.is_ok());
    assert!(refreshes.is_empty());
    Ok(())
}

#[tokio::test]
async fn presence_update_recomputes_status_and_activity_slots() -> anyhow::Result<()> {
    let ctx = TestContext::new(vec![tracked(1, "nelly")], Vec::new())?;

    let mut busy = member(1, "nelly");
    busy.status = OnlineStatus::Dnd;
    busy.activities = vec![
        playing("Factorio"),
        Activity::Custom(CustomStatus {
            text: Some("heads down".to_string()),
            emoji: Some("tools".to_string()),
            state: Some("heads down".to_string()),
        }),
    ];
    ctx.emit(GatewayEvent::PresenceUpdate {
        before: None,
        after: busy,
    })
    .await;

    // a later presence with no activities clears every slot again
    let mut idle = member(1, "nelly");
    idle.status = OnlineStatus::Idle;
    ctx.emit(GatewayEvent::PresenceUpdate {
        before: None,
        after: idle,
    })
    .await;

    let registry = ctx.registry.clone();
    let (refreshes, _) = ctx.finish().await?;
    assert_eq!(refreshes.len(), 2);

    let record = registry.member("nelly").unwrap();
    let record = record.read().await;
    assert_eq!(record.status, OnlineStatus::Idle);
    assert!(record.game.is_none());
    assert!(record.custom_status.is_none());
    assert!(record.activity_state.is_none());
    Ok(())
}

#[tokio::test]
async fn voice_update_touches_only_the_voice_block() -> anyhow::Result<()> {
    let ctx = TestContext::new(vec![tracked(1, "nelly")], Vec::new())?;

    let mut gaming = member(1, "nelly");
    gaming.activities = vec![playing("Factorio")];
    gaming.voice = Some(VoiceState {
        channel: Some(ChannelRef {
            id: 5,
            name: "General".to_string(),
        }),
        ..VoiceState::default()
    });
    ctx.emit(GatewayEvent::PresenceUpdate {
        before: None,
        after: gaming,
    })
    .await;

    // disconnect: channel goes away, the game being played does not
    ctx.emit(GatewayEvent::VoiceStateUpdate {
        member: member(1, "nelly"),
        before: None,
        after: VoiceState {
            channel: None,
            self_mute: true,
            ..VoiceState::default()
        },
    })
    .await;

    let registry = ctx.registry.clone();
    let (refreshes, _) = ctx.finish().await?;
    assert_eq!(refreshes.len(), 2);

    let record = registry.member("nelly").unwrap();
    let record = record.read().await;
    assert!(record.voice_channel.is_none());
    assert_eq!(record.voice_self_mute, Some(true));
    assert_eq!(record.game.as_deref(), Some("Factorio"));
    Ok(())
}

#[tokio::test]
async fn user_update_touches_identity_fields_only() -> anyhow::Result<()> {
    let ctx = TestContext::new(vec![tracked(1, "nelly")], Vec::new())?;

    let mut gaming = member(1, "nelly");
    gaming.activities = vec![playing("Factorio")];
    ctx.emit(GatewayEvent::PresenceUpdate {
        before: None,
        after: gaming,
    })
    .await;

    let mut renamed = user(1, "nelly");
    renamed.global_name = Some("Nelly".to_string());
    renamed.avatar = Some("abc123".to_string());
    ctx.emit(GatewayEvent::UserUpdate {
        before: None,
        after: renamed,
    })
    .await;

    let registry = ctx.registry.clone();
    let (refreshes, _) = ctx.finish().await?;
    assert_eq!(refreshes.len(), 2);

    let record = registry.member("nelly").unwrap();
    let record = record.read().await;
    assert_eq!(record.user_name.as_deref(), Some("Nelly"));
    assert!(record.avatar_url.as_deref().unwrap().contains("abc123"));
    assert_eq!(record.game.as_deref(), Some("Factorio"));
    Ok(())
}

#[tokio::test]
async fn reactions_update_tracked_channels_only() -> anyhow::Result<()> {
    let ctx = TestContext::new(
        Vec::new(),
        vec![ChannelRecord::new(
            "watchcord_channel_9".to_string(),
            9,
            "general".to_string(),
        )],
    )?;

    let mut reactor = member(7, "rigby");
    reactor.nick = Some("Rigby".to_string());

    // untracked channel: no record, no refresh
    ctx.emit(GatewayEvent::ReactionAdd(ReactionAdd {
        channel_id: 10,
        message_id: 1,
        user_id: 7,
        emoji: Some("thumbsup".to_string()),
        member: Some(reactor.clone()),
    }))
    .await;
    ctx.emit(GatewayEvent::ReactionAdd(ReactionAdd {
        channel_id: 9,
        message_id: 2,
        user_id: 7,
        emoji: Some("thumbsup".to_string()),
        member: Some(reactor),
    }))
    .await;

    let registry = ctx.registry.clone();
    let (refreshes, _) = ctx.finish().await?;
    assert_eq!(refreshes.len(), 1);
    assert_eq!(refreshes[0].entity_id, "watchcord_channel_9");

    let record = registry.channel(9).unwrap();
    let record = record.read().await;
    assert_eq!(record.last_user.as_deref(), Some("Rigby"));
    assert_eq!(record.state(), "Rigby");
    Ok(())
}

#[tokio::test]
async fn reaction_member_falls_back_to_the_client_cache() -> anyhow::Result<()> {
    let ctx = TestContext::new(
        Vec::new(),
        vec![ChannelRecord::new(
            "watchcord_channel_9".to_string(),
            9,
            "general".to_string(),
        )],
    )?;
    ctx.client.cache().insert_member(member(7, "rigby"));

    ctx.emit(GatewayEvent::ReactionAdd(ReactionAdd {
        channel_id: 9,
        message_id: 1,
        user_id: 7,
        emoji: None,
        member: None,
    }))
    .await;

    let registry = ctx.registry.clone();
    let (refreshes, _) = ctx.finish().await?;
    assert_eq!(refreshes.len(), 1);
    let record = registry.channel(9).unwrap();
    assert_eq!(record.read().await.last_user.as_deref(), Some("rigby"));
    Ok(())
}

#[tokio::test]
async fn client_error_event_ends_the_loop_with_an_error() -> anyhow::Result<()> {
    let ctx = TestContext::new(vec![tracked(1, "nelly")], Vec::new())?;

    ctx.emit(GatewayEvent::Error("gateway exploded".to_string()))
        .await;

    let (refreshes, outcome) = ctx.finish().await?;
    assert!(refreshes.is_empty());
    match outcome {
        Err(BridgeError::Connection(message)) => assert_eq!(message, "gateway exploded"),
        other => panic!("expected connection error, got {other:?}"),
    }
    Ok(())
}
