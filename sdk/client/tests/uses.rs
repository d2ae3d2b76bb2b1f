use {
  common::Harness,
  crowdfund_devnode::LedgerRules,
  crowdfund_sdk::{primitives::Vote, ClientConfig, Error, VotePolicy},
};

mod common;

#[tokio::test]
async fn only_initiator_of_funded_campaign_proposes() -> anyhow::Result<()> {
  let h = Harness::new();
  let unfunded = h.create(1, "10", 3600).await?;
  h.contribute(2, unfunded, "1").await?;
  assert!(matches!(
    h.propose(1, unfunded, "1").await,
    Err(Error::PreconditionFailed(_))
  ));

  let funded = h.create(1, "10", 3600).await?;
  h.contribute(2, funded, "10").await?;
  assert!(matches!(
    h.propose(2, funded, "1").await,
    Err(Error::PreconditionFailed(_))
  ));
  assert!(matches!(
    h.propose(1, funded, "10.5").await,
    Err(Error::PreconditionFailed(_))
  ));

  h.propose(1, funded, "4").await?;
  assert_eq!(h.client.uses.use_count(funded).await?, 1);
  assert_eq!(h.client.campaigns.get_campaign(funded).await?.num_uses, 1);
  Ok(())
}

#[tokio::test]
async fn weighted_approval_releases_funds() -> anyhow::Result<()> {
  let h = Harness::new();
  let index = h.funded().await?;
  h.propose(1, index, "4").await?;

  // 4 of 10 raised is not a majority
  h.vote(3, index, 1, true).await?;
  let request = h
    .client
    .uses
    .get_use_request(&h.client.identity, index, 1)
    .await?;
  assert_eq!(request.agree, Vote::Approved);
  assert!(!request.over);
  assert_eq!(request.agree_amount.to_string(), "4");

  h.act_as(2);
  let unseen = h
    .client
    .uses
    .get_use_request(&h.client.identity, index, 1)
    .await?;
  assert_eq!(unseen.agree, Vote::Unset);

  h.vote(2, index, 1, true).await?;
  let request = h
    .client
    .uses
    .get_use_request(&h.client.identity, index, 1)
    .await?;
  assert!(request.over);
  assert_eq!(request.agree_amount.to_string(), "10");
  assert_eq!(request.disagree.to_string(), "0");
  assert_eq!(h.balance(1), "104");

  // resolved requests take no more votes
  assert!(matches!(
    h.vote(3, index, 1, false).await,
    Err(Error::PreconditionFailed(_))
  ));
  Ok(())
}

#[tokio::test]
async fn majority_disagreement_keeps_funds() -> anyhow::Result<()> {
  let h = Harness::new();
  let index = h.funded().await?;
  h.propose(1, index, "4").await?;

  h.vote(2, index, 1, false).await?;
  h.act_as(1);
  let request = h
    .client
    .uses
    .get_use_request(&h.client.identity, index, 1)
    .await?;
  assert!(request.over);
  assert_eq!(request.disagree.to_string(), "6");
  assert_eq!(request.agree, Vote::Unset);
  assert_eq!(h.balance(1), "100");
  Ok(())
}

#[tokio::test]
async fn outsiders_cannot_vote() -> anyhow::Result<()> {
  let h = Harness::new();
  let index = h.funded().await?;
  h.propose(1, index, "1").await?;
  assert!(matches!(
    h.vote(5, index, 1, true).await,
    Err(Error::PreconditionFailed(_))
  ));
  Ok(())
}

#[tokio::test]
async fn repeated_vote_refused_locally() -> anyhow::Result<()> {
  let h = Harness::new();
  let index = h.funded().await?;
  h.propose(1, index, "1").await?;
  h.vote(3, index, 1, false).await?;

  let again = h
    .client
    .voting
    .cast_vote(&h.client.identity, index, 1, true)
    .await;
  assert!(matches!(again, Err(Error::PreconditionFailed(_))));
  assert_eq!(h.node.pending(), 0);
  Ok(())
}

#[tokio::test]
async fn repeated_vote_overwritten_by_ledger() -> anyhow::Result<()> {
  let h = Harness::with(
    ClientConfig {
      vote_policy: VotePolicy::Overwrite,
      ..Default::default()
    },
    LedgerRules {
      vote_policy: VotePolicy::Overwrite,
      ..Default::default()
    },
  );
  let index = h.funded().await?;
  h.propose(1, index, "1").await?;

  h.vote(3, index, 1, false).await?;
  h.vote(3, index, 1, true).await?;
  let request = h
    .client
    .uses
    .get_use_request(&h.client.identity, index, 1)
    .await?;
  assert_eq!(request.agree, Vote::Approved);
  assert_eq!(request.agree_amount.to_string(), "4");
  assert_eq!(request.disagree.to_string(), "0");
  assert!(!request.over);
  Ok(())
}

#[tokio::test]
async fn repeated_vote_refused_by_ledger() -> anyhow::Result<()> {
  let h = Harness::with(
    ClientConfig {
      vote_policy: VotePolicy::Overwrite,
      ..Default::default()
    },
    LedgerRules::default(),
  );
  let index = h.funded().await?;
  h.propose(1, index, "1").await?;

  h.vote(3, index, 1, false).await?;
  assert!(matches!(
    h.vote(3, index, 1, true).await,
    Err(Error::PreconditionFailed(_))
  ));
  let request = h
    .client
    .uses
    .get_use_request(&h.client.identity, index, 1)
    .await?;
  assert_eq!(request.agree, Vote::Rejected);
  assert_eq!(request.disagree.to_string(), "4");
  Ok(())
}

#[tokio::test]
async fn use_request_bounds_and_listing() -> anyhow::Result<()> {
  let h = Harness::new();
  let index = h.funded().await?;
  h.propose(1, index, "1").await?;
  h.propose(1, index, "2.5").await?;

  let identity = &h.client.identity;
  assert_eq!(
    h.client.uses.get_use_request(identity, index, 3).await,
    Err(Error::NotFound {
      kind: "use request",
      index: 3,
      count: 2
    })
  );
  assert!(matches!(
    h.client.uses.get_use_request(identity, index, 0).await,
    Err(Error::NotFound { .. })
  ));
  assert!(matches!(
    h.client.voting.cast_vote(identity, index, 0, true).await,
    Err(Error::NotFound { .. })
  ));

  let all = h.client.uses.get_all_use_requests(identity, index).await?;
  let goals: Vec<_> =
    all.iter().map(|u| (u.index, u.goal.to_string())).collect();
  assert_eq!(goals, vec![(1, "1".to_string()), (2, "2.5".to_string())]);
  assert!(all.iter().all(|u| u.agree == Vote::Unset && !u.over));

  assert_eq!(
    h.client.uses.get_use_request(identity, index + 1, 1).await,
    Err(Error::NotFound {
      kind: "campaign",
      index: index + 1,
      count: index
    })
  );
  assert!(matches!(
    h.client.uses.get_all_use_requests(identity, 0).await,
    Err(Error::NotFound {
      kind: "campaign",
      ..
    })
  ));
  assert!(matches!(
    h.client.uses.get_all_use_requests(identity, index + 1).await,
    Err(Error::NotFound {
      kind: "campaign",
      ..
    })
  ));

  let empty = h.create(4, "1", 60).await?;
  assert!(h
    .client
    .uses
    .get_all_use_requests(identity, empty)
    .await?
    .is_empty());
  Ok(())
}
