//! End-to-end tests of a wired federation node.

use std::sync::Arc;

use bitcoin::{absolute, transaction, Amount, ScriptBuf, Transaction, TxOut};
use warden_collateral::{
    commitment_script, decode_from_coinbase, CollateralConfig, CounterChainSnapshot, DropReason,
    FillOutcome,
};
use warden_core::{
    Block, BlockHeader, CollateralRequirement, FederationMember, ManualClock, MemberKey,
};
use warden_liveness::{LivenessConfig, VotingData};
use warden_node::{FederationNode, NodeConfig, NodeError};

const MAGIC: u32 = 0x0A0B_0C0D;
const NOW: i64 = 1_700_000_000;
const SPACING: u32 = 16;
const MAX_IDLE: u32 = 1_000;

fn member(n: u8) -> FederationMember {
    FederationMember::new(MemberKey::from_secret_bytes(&[n; 32]).unwrap())
        .with_collateral(CollateralRequirement::new(1_000, format!("addr-{}", n)))
}

fn members() -> Vec<FederationMember> {
    vec![member(1), member(2), member(3)]
}

fn coinbase(outputs: Vec<ScriptBuf>) -> Transaction {
    let mut output = vec![TxOut {
        value: Amount::from_sat(50_000),
        script_pubkey: ScriptBuf::from_bytes(vec![0x51]),
    }];
    output.extend(outputs.into_iter().map(|script_pubkey| TxOut {
        value: Amount::ZERO,
        script_pubkey,
    }));
    Transaction {
        version: transaction::Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: vec![],
        output,
    }
}

/// First slot strictly after `after` that belongs to `key`.
fn next_slot(key: &MemberKey, after: u32) -> u32 {
    let roster = members();
    let mut time = (after / SPACING + 1) * SPACING;
    loop {
        let slot = (time / SPACING) as usize;
        if &roster[slot % roster.len()].key == key {
            return time;
        }
        time += SPACING;
    }
}

fn synced_counter_chain() -> Arc<CounterChainSnapshot> {
    let view = Arc::new(CounterChainSnapshot::new());
    view.set_tip(100);
    for n in 1..=3 {
        view.set_balance(format!("addr-{}", n), 0, 1_000);
    }
    view
}

fn mining_config() -> NodeConfig {
    NodeConfig::new(MAGIC)
        .with_mining(true)
        .with_target_spacing(SPACING)
        .with_liveness(LivenessConfig::new(MAX_IDLE))
        .with_collateral(
            CollateralConfig::new(MAGIC)
                .with_max_reorg_length(50)
                .with_sync_buffer(10),
        )
}

fn start(
    config: NodeConfig,
    view: Arc<CounterChainSnapshot>,
    clock: Arc<ManualClock>,
) -> FederationNode {
    FederationNode::start(config, members(), Some(member(1).key), view, clock).unwrap()
}

/// Block produced by another member, carrying a valid commitment.
fn foreign_block(node: &FederationNode, time: u32) -> Block {
    let tip = node.tip();
    let header = BlockHeader::new(tip.height + 1, tip.hash(), time);
    Block::new(
        header,
        vec![coinbase(vec![commitment_script(40, MAGIC).unwrap()])],
    )
}

#[test]
fn test_mined_block_carries_commitment() {
    let clock = Arc::new(ManualClock::new(NOW));
    let node = start(mining_config(), synced_counter_chain(), clock);
    assert_eq!(node.pipeline().stage_names(), vec!["collateral"]);

    let own = member(1).key;
    let time = next_slot(&own, NOW as u32);
    let mut template = node.new_template(time, vec![coinbase(vec![])]);

    assert_eq!(node.fill_template(&mut template), FillOutcome::Proceed);
    let commitment = decode_from_coinbase(&template.block.transactions[0]);
    assert_eq!(commitment.height, Some(40));
    assert_eq!(commitment.magic, Some(MAGIC));

    let connected = node.connect_block(template.block).unwrap();
    assert_eq!(connected.height(), 1);
    assert_eq!(node.tip().time, time);
    assert_eq!(node.tracker().unwrap().last_active(&own), Some(time));
}

#[test]
fn test_short_counter_chain_drops_template() {
    let clock = Arc::new(ManualClock::new(NOW));
    let view = synced_counter_chain();
    view.set_tip(55);
    let node = start(mining_config(), view, clock);

    let mut template = node.new_template(next_slot(&member(1).key, NOW as u32), vec![coinbase(vec![])]);
    assert_eq!(
        node.fill_template(&mut template),
        FillOutcome::Drop(DropReason::LowCommitmentHeight {
            commitment_height: -5,
            required_depth: 60
        })
    );
    assert_eq!(template.block.transactions[0].output.len(), 1);
}

#[test]
fn test_offline_member_is_voted_out_once() {
    let clock = Arc::new(ManualClock::new(NOW));
    let node = start(mining_config(), synced_counter_chain(), clock);
    let offline = member(3);

    // Members 1 and 2 keep producing; member 3 misses every slot.
    let mut time = NOW as u32;
    while time <= NOW as u32 + MAX_IDLE + 200 {
        time += SPACING;
        let slot = (time / SPACING) as usize % 3;
        if members()[slot].key == offline.key {
            continue;
        }
        node.connect_block(foreign_block(&node, time)).unwrap();
    }

    let expected = VotingData::kick(&offline).unwrap();
    assert_eq!(node.votes().pending(), vec![expected]);

    let tracker = node.tracker().unwrap();
    assert_eq!(tracker.last_active(&offline.key), Some(NOW as u32));
    assert!(tracker.last_active(&member(2).key).unwrap() > NOW as u32 + MAX_IDLE);
}

#[test]
fn test_membership_changes_reach_tracker() {
    let clock = Arc::new(ManualClock::new(NOW));
    let node = start(mining_config(), synced_counter_chain(), clock);
    let tracker = node.tracker().unwrap();

    let time = next_slot(&member(2).key, NOW as u32);
    node.connect_block(foreign_block(&node, time)).unwrap();

    assert!(node.kick_member(&member(3).key).is_some());
    assert_eq!(tracker.last_active(&member(3).key), None);

    let newcomer = member(4);
    assert!(node.add_member(newcomer.clone()));
    assert_eq!(tracker.last_active(&newcomer.key), Some(time));
}

#[test]
fn test_non_mining_node_without_kicking() {
    let clock = Arc::new(ManualClock::new(NOW));
    let config = NodeConfig::new(MAGIC)
        .with_target_spacing(SPACING)
        .with_liveness(LivenessConfig::default().with_auto_kick(false))
        .with_collateral(CollateralConfig::new(MAGIC).with_check_collateral(false));

    // Counter chain never synced: only commitment data is checked.
    let node = start(config, Arc::new(CounterChainSnapshot::new()), clock);
    assert!(node.tracker().is_none());
    assert!(node.pipeline().stage_names().is_empty());

    let time = next_slot(&member(2).key, NOW as u32);
    let mut template = node.new_template(time, vec![coinbase(vec![])]);
    assert!(node.fill_template(&mut template).is_proceed());
    assert_eq!(template.block.transactions[0].output.len(), 1);

    // Without a commitment the block is rejected
    assert!(matches!(
        node.connect_block(template.block),
        Err(NodeError::BlockRejected { height: 1, .. })
    ));

    node.connect_block(foreign_block(&node, time)).unwrap();
    assert_eq!(node.tip().height, 1);
}

#[test]
fn test_rejects_invalid_blocks() {
    let clock = Arc::new(ManualClock::new(NOW));
    let node = start(mining_config(), synced_counter_chain(), clock);
    let time = next_slot(&member(2).key, NOW as u32);

    // Wrong counter chain
    let tip = node.tip();
    let block = Block::new(
        BlockHeader::new(1, tip.hash(), time),
        vec![coinbase(vec![commitment_script(40, 0xDEAD_BEEF).unwrap()])],
    );
    assert!(matches!(
        node.connect_block(block),
        Err(NodeError::BlockRejected { .. })
    ));

    // Does not extend the tip
    let mut orphan = foreign_block(&node, time);
    orphan.header.height = 5;
    assert!(matches!(
        node.connect_block(orphan),
        Err(NodeError::BlockRejected { .. })
    ));

    // Off-slot timestamp
    assert!(matches!(
        node.connect_block(foreign_block(&node, time + 1)),
        Err(NodeError::Core(_))
    ));

    assert_eq!(node.tip().height, 0);
}

#[test]
fn test_liveness_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = mining_config().with_data_dir(dir.path().join("node"));
    let own = member(1).key;

    let time = {
        let clock = Arc::new(ManualClock::new(NOW));
        let node = start(config.clone(), synced_counter_chain(), clock);
        let time = next_slot(&own, NOW as u32);
        let mut template = node.new_template(time, vec![coinbase(vec![])]);
        assert!(node.fill_template(&mut template).is_proceed());
        node.connect_block(template.block).unwrap();
        time
    };

    // Later restart must load the records, not reseed them.
    let clock = Arc::new(ManualClock::new(NOW + 50_000));
    let node = start(config, synced_counter_chain(), clock);
    let tracker = node.tracker().unwrap();
    assert_eq!(tracker.last_active(&own), Some(time));
    assert_eq!(tracker.last_active(&member(2).key), Some(NOW as u32));
}
