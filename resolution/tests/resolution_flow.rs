//! Resolution scenarios, including a tied escalation decided by vote.

use bond_escalation::{BondEscalationEngine, EscalationStatus};
use bond_ledger::Ledger;
use bond_nullables::{NullClock, NullOracle, NullTokens};
use bond_resolution::{CommitRevealEngine, OpenVoteEngine, ResolutionError, ResolutionModule};
use bond_types::{
    AccountId, AssetId, BondEscalationParams, CommitRevealParams, Dispute, DisputeId,
    DisputeStatus, Hash, Oracle, RequestId, Timestamp, TokenTransfer, VotingParams,
};

const WINDOW: u64 = 3_600;

fn acct(name: &str) -> AccountId {
    AccountId::from(name)
}

fn vote() -> AssetId {
    AssetId::from("VOTE")
}

fn escalated_dispute(oracle: &mut NullOracle, request: RequestId) -> DisputeId {
    oracle.record_dispute(Dispute {
        disputer: acct("disputer"),
        proposer: acct("proposer"),
        response_id: Hash::new([0x10; 32]),
        request_id: request,
        status: DisputeStatus::Escalated,
        created_at: Timestamp::new(1),
    })
}

fn minted(voters: &[&str]) -> NullTokens {
    let mut tokens = NullTokens::new();
    for v in voters {
        tokens.mint(&acct(v), &vote(), 1_000);
    }
    tokens
}

fn open_vote(quorum: u128) -> (OpenVoteEngine, NullOracle, DisputeId) {
    let request = Hash::new([0x20; 32]);
    let mut oracle = NullOracle::new(acct("oracle"));
    oracle.allow_module(request, acct("voting"));
    let id = escalated_dispute(&mut oracle, request);

    let mut engine = OpenVoteEngine::new(acct("voting"), acct("oracle"));
    engine
        .configure_request(
            &acct("oracle"),
            request,
            VotingParams {
                vote_asset: vote(),
                min_votes_for_quorum: quorum,
                voting_window_secs: WINDOW,
            },
        )
        .unwrap();
    (engine, oracle, id)
}

fn run_open_vote(votes: &[(&str, u128)]) -> (DisputeStatus, NullTokens, NullOracle) {
    let (mut engine, mut oracle, id) = open_vote(100);
    let names: Vec<&str> = votes.iter().map(|(v, _)| *v).collect();
    let mut tokens = minted(&names);
    let clock = NullClock::new(5_000);

    engine
        .start_resolution(&acct("oracle"), &oracle, &id, clock.now())
        .unwrap();
    clock.advance(10);
    for (voter, amount) in votes {
        engine
            .cast_vote(&acct(voter), &oracle, &mut tokens, &id, *amount, clock.now())
            .unwrap();
    }
    assert_eq!(
        tokens.balance_of(engine.address(), &vote()),
        votes.iter().map(|(_, a)| a).sum::<u128>()
    );

    clock.advance(WINDOW);
    let status = engine
        .resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now())
        .unwrap();
    assert_eq!(
        engine.resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now()),
        Err(ResolutionError::AlreadyResolved)
    );
    (status, tokens, oracle)
}

#[test]
fn quorum_reached_means_won() {
    let (status, tokens, _) = run_open_vote(&[("v1", 100), ("v2", 50)]);
    assert_eq!(status, DisputeStatus::Won);
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 1_000);
    assert_eq!(tokens.balance_of(&acct("v2"), &vote()), 1_000);
    assert_eq!(tokens.balance_of(&acct("voting"), &vote()), 0);
}

#[test]
fn quorum_missed_means_lost() {
    let (status, tokens, oracle) = run_open_vote(&[("v1", 80)]);
    assert_eq!(status, DisputeStatus::Lost);
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 1_000);
    assert_eq!(oracle.status_updates().len(), 1);
}

#[test]
fn resolve_is_coordinator_only_and_needs_a_start() {
    let (mut engine, mut oracle, id) = open_vote(100);
    let mut tokens = NullTokens::new();
    let now = Timestamp::new(10_000);
    assert!(matches!(
        engine.resolve_dispute(&acct("v1"), &mut oracle, &mut tokens, &id, now),
        Err(ResolutionError::Unauthorized { .. })
    ));
    assert_eq!(
        engine.resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, now),
        Err(ResolutionError::DisputeNotEscalated)
    );
    assert_eq!(
        engine.resolve_dispute(
            &acct("oracle"),
            &mut oracle,
            &mut tokens,
            &Hash::new([1; 32]),
            now
        ),
        Err(ResolutionError::NonExistentDispute)
    );
}

#[test]
fn commit_reveal_integrity() {
    let request = Hash::new([0x30; 32]);
    let mut oracle = NullOracle::new(acct("oracle"));
    oracle.allow_module(request, acct("commit-reveal"));
    let id = escalated_dispute(&mut oracle, request);
    let mut tokens = minted(&["v1", "v2"]);

    let mut engine = CommitRevealEngine::new(acct("commit-reveal"), acct("oracle"));
    engine
        .configure_request(
            &acct("oracle"),
            request,
            CommitRevealParams {
                vote_asset: vote(),
                min_votes_for_quorum: 100,
                commit_window_secs: WINDOW,
                reveal_window_secs: WINDOW,
            },
        )
        .unwrap();

    let clock = NullClock::new(5_000);
    let modules: Vec<&dyn ResolutionModule> = vec![&engine];
    assert_eq!(modules[0].name(), "commit-reveal");
    engine
        .start_resolution(&acct("oracle"), &oracle, &id, clock.now())
        .unwrap();

    let salt1 = Hash::new([0xaa; 32]);
    let salt2 = Hash::new([0xbb; 32]);
    let c1 = engine.compute_commitment(&acct("v1"), &id, 70, &salt1);
    let c2 = engine.compute_commitment(&acct("v2"), &id, 40, &salt2);
    engine
        .commit_vote(&acct("v1"), &oracle, &id, c1, clock.now())
        .unwrap();
    engine
        .commit_vote(&acct("v2"), &oracle, &id, c2, clock.now())
        .unwrap();
    // nothing moves on commit
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 1_000);

    clock.advance(WINDOW);
    let now = clock.now();
    // wrong amount, wrong salt, someone else's commitment
    for (voter, amount, salt) in [("v1", 71, salt1), ("v1", 70, salt2), ("v2", 70, salt1)] {
        assert_eq!(
            engine.reveal_vote(&acct(voter), &oracle, &mut tokens, &id, amount, &salt, now),
            Err(ResolutionError::WrongRevealData)
        );
    }
    engine
        .reveal_vote(&acct("v1"), &oracle, &mut tokens, &id, 70, &salt1, now)
        .unwrap();
    assert!(engine
        .reveal_vote(&acct("v1"), &oracle, &mut tokens, &id, 70, &salt1, now)
        .is_err());
    engine
        .reveal_vote(&acct("v2"), &oracle, &mut tokens, &id, 40, &salt2, now)
        .unwrap();
    assert_eq!(engine.total_votes(&id), 110);
    assert_eq!(engine.get_voters(&id), &[acct("v1"), acct("v2")]);

    clock.advance(WINDOW);
    let status = engine
        .resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now())
        .unwrap();
    assert_eq!(status, DisputeStatus::Won);
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 1_000);
    assert_eq!(tokens.balance_of(&acct("v2"), &vote()), 1_000);
    assert_eq!(
        engine.resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now()),
        Err(ResolutionError::AlreadyResolved)
    );
}

#[test]
fn tied_escalation_is_decided_by_vote() {
    let bond_asset = AssetId::from("USDC");
    let request = Hash::new([0x40; 32]);
    let coordinator = acct("oracle");
    let mut oracle = NullOracle::new(coordinator.clone());
    oracle.allow_module(request, acct("escalation"));
    oracle.allow_module(request, acct("responses"));
    oracle.allow_module(request, acct("voting"));
    let clock = NullClock::new(1_000);

    let mut tokens = minted(&["v1"]);
    let mut ledger = Ledger::new(acct("custody"));
    for who in ["proposer", "disputer", "p1", "a1"] {
        tokens.mint(&acct(who), &bond_asset, 500);
        ledger
            .deposit(&mut tokens, &acct(who), &bond_asset, 500)
            .unwrap();
    }

    let mut escalation = BondEscalationEngine::new(acct("escalation"), coordinator.clone());
    escalation
        .configure_request(
            &coordinator,
            request,
            BondEscalationParams {
                bond_asset: bond_asset.clone(),
                bond_size: 50,
                max_pledges_per_side: 3,
                escalation_deadline: Timestamp::new(2_000),
                tying_buffer_secs: 100,
                dispute_window_secs: 5_000,
            },
        )
        .unwrap();
    let mut voting = OpenVoteEngine::new(acct("voting"), coordinator.clone());
    voting
        .configure_request(
            &coordinator,
            request,
            VotingParams {
                vote_asset: vote(),
                min_votes_for_quorum: 100,
                voting_window_secs: WINDOW,
            },
        )
        .unwrap();

    // respond, dispute, pledge to a tie
    let response = oracle.insert_response(request, acct("proposer"), clock.now());
    ledger
        .bond(&oracle, &acct("responses"), &acct("proposer"), &request, &bond_asset, 50)
        .unwrap();
    let dispute = escalation
        .dispute_response(
            &coordinator,
            &oracle,
            &mut ledger,
            &request,
            &response,
            &acct("disputer"),
            &acct("proposer"),
            clock.now(),
        )
        .unwrap();
    let id = oracle.record_dispute(dispute);
    escalation
        .pledge_for_dispute(&acct("p1"), &oracle, &mut ledger, &id, clock.now())
        .unwrap();
    escalation
        .pledge_against_dispute(&acct("a1"), &oracle, &mut ledger, &id, clock.now())
        .unwrap();

    // escalate and vote
    clock.pass(Timestamp::new(2_000));
    escalation
        .dispute_escalated(&coordinator, &oracle, &id, clock.now())
        .unwrap();
    oracle.set_dispute_status(&id, DisputeStatus::Escalated);
    voting
        .start_resolution(&coordinator, &oracle, &id, clock.now())
        .unwrap();
    voting
        .cast_vote(&acct("v1"), &oracle, &mut tokens, &id, 120, clock.now())
        .unwrap();

    clock.advance(WINDOW);
    let verdict = voting
        .resolve_dispute(&coordinator, &mut oracle, &mut tokens, &id, clock.now())
        .unwrap();
    assert_eq!(verdict, DisputeStatus::Won);
    assert_eq!(oracle.get_dispute(&id).status, DisputeStatus::Won);

    // coordinator forwards the verdict to the escalation module
    escalation
        .on_dispute_status_change(&coordinator, &oracle, &mut ledger, &id)
        .unwrap();
    assert_eq!(
        escalation.get_escalation_data(&request).status,
        EscalationStatus::DisputerWon
    );
    assert_eq!(ledger.balance_of(&acct("p1"), &bond_asset), 450 + 100);
    assert_eq!(ledger.balance_of(&acct("a1"), &bond_asset), 450);
    assert_eq!(ledger.balance_of(&acct("disputer"), &bond_asset), 550);
    assert_eq!(ledger.balance_of(&acct("proposer"), &bond_asset), 450);
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 1_000);
    assert_eq!(
        ledger.total_held(&bond_asset),
        tokens.balance_of(ledger.custody(), &bond_asset)
    );
}

#[test]
fn rejected_verdict_pulls_refunds_back_into_custody() {
    // the coordinator never registered the module, so the verdict bounces
    let request = Hash::new([0x50; 32]);
    let mut oracle = NullOracle::new(acct("oracle"));
    let id = escalated_dispute(&mut oracle, request);
    let mut tokens = minted(&["v1", "v2"]);

    let mut engine = OpenVoteEngine::new(acct("voting"), acct("oracle"));
    engine
        .configure_request(
            &acct("oracle"),
            request,
            VotingParams {
                vote_asset: vote(),
                min_votes_for_quorum: 100,
                voting_window_secs: WINDOW,
            },
        )
        .unwrap();
    let clock = NullClock::new(5_000);
    engine
        .start_resolution(&acct("oracle"), &oracle, &id, clock.now())
        .unwrap();
    for (voter, amount) in [("v1", 100), ("v2", 50)] {
        engine
            .cast_vote(&acct(voter), &oracle, &mut tokens, &id, amount, clock.now())
            .unwrap();
    }

    clock.advance(WINDOW);
    let err = engine
        .resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now())
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Oracle(_)));
    assert_eq!(oracle.get_dispute(&id).status, DisputeStatus::Escalated);
    assert!(!engine.voting_record(&id).unwrap().resolved);
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 900);
    assert_eq!(tokens.balance_of(&acct("v2"), &vote()), 950);
    assert_eq!(tokens.balance_of(engine.address(), &vote()), 150);

    oracle.allow_module(request, acct("voting"));
    assert_eq!(
        engine.resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now()),
        Ok(DisputeStatus::Won)
    );
    assert_eq!(tokens.balance_of(engine.address(), &vote()), 0);
}

#[test]
fn frozen_voter_blocks_resolution_until_refundable() {
    let (mut engine, mut oracle, id) = open_vote(100);
    let mut tokens = minted(&["v1", "v2"]);
    let clock = NullClock::new(5_000);
    engine
        .start_resolution(&acct("oracle"), &oracle, &id, clock.now())
        .unwrap();
    for (voter, amount) in [("v1", 100), ("v2", 50)] {
        engine
            .cast_vote(&acct(voter), &oracle, &mut tokens, &id, amount, clock.now())
            .unwrap();
    }

    clock.advance(WINDOW);
    tokens.freeze(&acct("v2"));
    assert!(matches!(
        engine.resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now()),
        Err(ResolutionError::Transfer(_))
    ));
    assert_eq!(oracle.get_dispute(&id).status, DisputeStatus::Escalated);
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 900);
    assert_eq!(tokens.balance_of(&acct("v2"), &vote()), 950);
    assert_eq!(tokens.balance_of(engine.address(), &vote()), 150);

    tokens.unfreeze(&acct("v2"));
    assert_eq!(
        engine.resolve_dispute(&acct("oracle"), &mut oracle, &mut tokens, &id, clock.now()),
        Ok(DisputeStatus::Won)
    );
    assert_eq!(tokens.balance_of(&acct("v1"), &vote()), 1_000);
    assert_eq!(tokens.balance_of(&acct("v2"), &vote()), 1_000);
    assert_eq!(tokens.balance_of(engine.address(), &vote()), 0);
}
