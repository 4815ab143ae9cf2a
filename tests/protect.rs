//! Integration tests for topic and purpose protection.

mod common;

use chanserv::handlers::DispatchStatus;
use common::harness::{ADMIN, BOT, CHANNEL, MEMBER, OP};
use common::{Call, TestBot};

#[tokio::test]
async fn operator_topic_change_is_persisted() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;

    let outcomes = t.change_topic(OP, "Release day").await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].name, "Protect Topic");
    assert_eq!(outcomes[0].status, DispatchStatus::Matched);

    assert_eq!(t.channel().await?.unwrap().topic, "Release day");
    assert!(t.platform.mutations().is_empty());
    Ok(())
}

#[tokio::test]
async fn unauthorized_topic_change_is_reverted() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;

    t.change_topic(MEMBER, "free crypto here").await;

    let channel = t.channel().await?.unwrap();
    assert_eq!(channel.topic, "Company-wide announcements");
    assert!(t.platform.calls().contains(&Call::SetTopic {
        channel: CHANNEL.to_string(),
        topic: "Company-wide announcements".to_string(),
    }));

    let reply = &t.replies()[0];
    assert!(reply.contains("Sorry, but we were unable to keep the topic."));
    assert!(reply.contains("You may not change the channel topic!"));
    Ok(())
}

#[tokio::test]
async fn exclamation_in_topic_does_not_bypass_protection() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;

    let outcomes = t.change_topic(MEMBER, "free crypto here!").await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].name, "Protect Topic");
    assert_eq!(outcomes[0].status, DispatchStatus::Matched);

    assert_eq!(t.channel().await?.unwrap().topic, "Company-wide announcements");
    assert!(t.platform.calls().contains(&Call::SetTopic {
        channel: CHANNEL.to_string(),
        topic: "Company-wide announcements".to_string(),
    }));
    assert!(t.replies()[0].contains("Sorry, but we were unable to keep the topic."));

    t.change_topic(OP, "Release day!").await;
    assert_eq!(t.channel().await?.unwrap().topic, "Release day!");
    Ok(())
}

#[tokio::test]
async fn purpose_follows_the_same_rules() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;

    t.change_purpose(ADMIN, "Rust and friends").await;
    assert_eq!(t.channel().await?.unwrap().purpose, "Rust and friends");

    t.change_purpose(MEMBER, "nothing to see").await;
    assert_eq!(t.channel().await?.unwrap().purpose, "Rust and friends");
    assert!(t.platform.calls().contains(&Call::SetPurpose {
        channel: CHANNEL.to_string(),
        purpose: "Rust and friends".to_string(),
    }));
    Ok(())
}

#[tokio::test]
async fn bot_changes_are_ratified() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;
    t.change_topic(BOT, "Set by the bot").await;
    assert_eq!(t.channel().await?.unwrap().topic, "Set by the bot");
    Ok(())
}

#[tokio::test]
async fn unregistered_channels_are_left_alone() -> anyhow::Result<()> {
    let t = TestBot::new().await?;
    let outcomes = t.change_topic(MEMBER, "anything goes").await;
    assert_eq!(outcomes[0].status, DispatchStatus::Matched);
    assert!(t.platform.mutations().is_empty());
    Ok(())
}

#[tokio::test]
async fn topic_subtype_does_not_run_purpose_protection() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;
    let outcomes = t.change_topic(MEMBER, "new topic").await;
    let names: Vec<_> = outcomes.iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["Protect Topic"]);
    Ok(())
}
