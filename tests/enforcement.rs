//! Integration tests for join enforcement.

mod common;

use chanserv::db::{NewSanction, RecordFilter, SanctionPatch};
use chanserv::handlers::JoinOutcome;
use common::TestBot;
use common::harness::{BOT, CHANNEL, MEMBER, OP, SUPPORT, TARGET};

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[tokio::test]
async fn non_public_channels_are_skipped() -> anyhow::Result<()> {
    let t = TestBot::new().await?;
    let outcome = t.join(MEMBER, "GPRIVATE", "G").await;
    assert_eq!(outcome, JoinOutcome::Skipped);
    assert!(t.platform.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn banned_user_is_removed_on_join() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;
    t.db
        .bans()
        .create(NewSanction::new(CHANNEL, TARGET, "spam", now() + 3600))
        .await?;

    let outcome = t.join(TARGET, CHANNEL, "C").await;
    assert_eq!(outcome, JoinOutcome::Handled);

    assert_eq!(
        t.platform.kicks(),
        vec![(TARGET.to_string(), CHANNEL.to_string(), "spam".to_string())]
    );
    let replies = t.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Automatically removed <@UTARGET>!\n*Banned*: spam"));
    Ok(())
}

#[tokio::test]
async fn latest_ban_reason_is_reported() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;
    t.say(OP, "!ban <@UTARGET> 1h first offence").await;
    t.say(OP, "!ban <@UTARGET> 2h second offence").await;
    t.platform.clear();

    t.join(TARGET, CHANNEL, "C").await;
    let kicks = t.platform.kicks();
    assert_eq!(kicks.len(), 1);
    assert_eq!(kicks[0].2, "second offence");
    Ok(())
}

#[tokio::test]
async fn expired_ban_is_not_enforced() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;
    t.db
        .bans()
        .create(NewSanction::new(CHANNEL, TARGET, "spam", now() + 3600))
        .await?;
    t.db
        .bans()
        .update(&RecordFilter::pair(CHANNEL, TARGET), &SanctionPatch::expire_now())
        .await?;

    let outcome = t.join(TARGET, CHANNEL, "C").await;
    assert_eq!(outcome, JoinOutcome::Handled);
    assert!(t.platform.kicks().is_empty());
    assert!(t.replies().is_empty());
    Ok(())
}

#[tokio::test]
async fn members_of_registered_channels_stay() -> anyhow::Result<()> {
    let t = TestBot::registered().await?;
    let outcome = t.join(MEMBER, CHANNEL, "C").await;
    assert_eq!(outcome, JoinOutcome::Handled);
    assert!(t.platform.kicks().is_empty());
    Ok(())
}

#[tokio::test]
async fn unregistered_channel_is_kept_empty() -> anyhow::Result<()> {
    let t = TestBot::new().await?;
    let outcome = t.join(MEMBER, CHANNEL, "C").await;
    assert_eq!(outcome, JoinOutcome::Handled);

    let kicks = t.platform.kicks();
    assert_eq!(kicks.len(), 1);
    assert_eq!(kicks[0].0, MEMBER);
    assert_eq!(
        kicks[0].2,
        format!("Please register this channel with <#{SUPPORT}>")
    );
    Ok(())
}

#[tokio::test]
async fn bot_may_join_unregistered_channel() -> anyhow::Result<()> {
    let t = TestBot::new().await?;
    let outcome = t.join(BOT, CHANNEL, "C").await;
    assert_eq!(outcome, JoinOutcome::Handled);
    assert!(t.platform.kicks().is_empty());
    assert!(t.replies().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_ban_enforcement_does_not_stop_registration_check() -> anyhow::Result<()> {
    let t = TestBot::new().await?;
    t.platform.fail("users.info");

    // Ban enforcement cannot read the profile; registration enforcement
    // still removes the user.
    let outcome = t.join(MEMBER, CHANNEL, "C").await;
    assert_eq!(outcome, JoinOutcome::Failed);

    let replies = t.replies();
    assert_eq!(replies.len(), 2);
    assert!(replies[0].contains("Sorry, but we were unable to automatically remove <@UMEMBER>"));
    assert!(replies[1].contains("Automatically removed <@UMEMBER>!"));
    assert_eq!(t.platform.kicks().len(), 1);
    Ok(())
}
