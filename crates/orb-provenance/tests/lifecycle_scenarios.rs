//! # Lifecycle Scenarios
//!
//! End-to-end runs of the engine through its public API.
//!
//! ## Test Categories
//!
//! 1. **Identity** - fixed identifier, validation at every entry point
//! 2. **Supply** - cap enforcement, open minting
//! 3. **Terms** - vault exclusivity, closure rules, fork, forfeit
//! 4. **Funds** - exact funding, withdraw
//! 5. **Transfers** - approvals, batch atomicity
//! 6. **Events** - one event per successful call, none on failure

use orb_provenance::prelude::*;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// TEST HELPERS
// =============================================================================

const NOW: Timestamp = 1_700_000_000;
const THIRTY_DAYS: u64 = 30 * 24 * 60 * 60;

type Engine = LifecycleEngine<Arc<FixedClock>, Arc<InMemoryEventBus>>;

struct Harness {
    engine: Engine,
    clock: Arc<FixedClock>,
    bus: Arc<InMemoryEventBus>,
}

fn harness() -> Harness {
    let clock = Arc::new(FixedClock::new(NOW));
    let bus = Arc::new(InMemoryEventBus::new());
    let engine = LifecycleEngine::new(clock.clone(), bus.clone(), EngineConfig::default());
    Harness { engine, clock, bus }
}

fn deployer() -> Address {
    Address::repeat_byte(0xd0)
}

fn other_account() -> Address {
    Address::repeat_byte(0x0a)
}

fn collector() -> Address {
    Address::repeat_byte(0xc0)
}

fn default_map() -> ColorMap {
    let mut skipped = ColorEntry::new(40, 255, 255, 255);
    skipped.empty = true;
    ColorMap {
        x: 1,
        y: 35,
        speed: 2,
        color_count: 6,
        bg_transparent: false,
        bg_scalar: 255,
        colors: [
            ColorEntry::new(10, 255, 0, 255),
            ColorEntry::new(20, 255, 255, 255),
            ColorEntry::new(30, 255, 0, 255),
            skipped,
            ColorEntry::new(50, 255, 255, 255),
            ColorEntry::new(60, 255, 255, 255),
            ColorEntry::new(70, 0, 0, 0),
        ],
    }
}

fn default_id() -> TokenId {
    encode(&default_map()).unwrap()
}

fn variant_id(red: u8) -> TokenId {
    let mut map = default_map();
    map.colors[0].r = red;
    encode(&map).unwrap()
}

fn capped(supply: u64) -> Provenance {
    Provenance {
        max_supply: pack_max_supply(supply, 0),
        vault: deployer(),
        ..Provenance::default()
    }
}

fn priced(supply: u64, price: U256) -> Provenance {
    Provenance {
        price,
        ..capped(supply)
    }
}

// =============================================================================
// CATEGORY 1: IDENTITY
// =============================================================================

#[test]
fn scenario_a_fixed_identifier_round_trips() {
    let id = default_id();

    assert_eq!(
        id.to_string(),
        "115523543251412541691882880952758861938005352939587502706659441376872229699839"
    );
    assert_eq!(decode(id), default_map());
    assert_eq!(is_valid(id), Ok(default_map()));
}

const ZERO_DOMAIN: OrbError = OrbError::InvalidColorDomain { slot: 0 };

#[test]
fn invalid_identifier_rejected_everywhere() {
    let mut h = harness();
    let bad = TokenId::from(999_999u64);

    assert_eq!(
        h.engine.load(bad, capped(2), U256::zero(), deployer()),
        Err(ZERO_DOMAIN)
    );
    assert_eq!(
        h.engine
            .mint(collector(), bad, 1, &[], U256::zero(), collector()),
        Err(ZERO_DOMAIN)
    );
    assert_eq!(h.engine.forfeit(bad, deployer()), Err(ZERO_DOMAIN));
    assert_eq!(h.engine.burn(bad, 1, collector()), Err(ZERO_DOMAIN));
    assert_eq!(h.engine.metadata(bad), Err(ZERO_DOMAIN));
    assert!(h.engine.store().is_empty());
}

#[test]
fn only_the_zero_identifier_has_no_colors() {
    let mut h = harness();

    assert_eq!(h.engine.metadata(TokenId::ZERO), Err(OrbError::NoColors));
    assert_eq!(
        h.engine
            .fork(TokenId::from(99_999u64), default_id(), capped(2), U256::zero(), deployer()),
        Err(ZERO_DOMAIN)
    );
}

#[test]
fn out_of_range_coordinates_rejected_on_mint() {
    let mut h = harness();
    let mut map = default_map();
    map.x = 361;
    map.y = 361;
    let id = encode(&map).unwrap();

    assert_eq!(
        h.engine.mint(deployer(), id, 1, &[], U256::zero(), deployer()),
        Err(OrbError::InvalidCoordinates { x: 361, y: 361 })
    );
}

#[test]
fn metadata_for_minted_orb() {
    let mut h = harness();
    let id = default_id();
    h.engine
        .mint(deployer(), id, 1, &[], U256::zero(), deployer())
        .unwrap();

    let metadata = h.engine.metadata(id).unwrap();
    assert_eq!(metadata.name, format!("Orb #{id}"));
    assert_eq!(metadata.external_url, format!("ipfs://Qm/?id={id}"));
    assert_eq!(metadata.attributes.len(), 10);
}

// =============================================================================
// CATEGORY 2: SUPPLY
// =============================================================================

#[test]
fn scenario_b_supply_cap() {
    let mut h = harness();
    let id = default_id();
    h.engine
        .load(id, capped(2), U256::zero(), deployer())
        .unwrap();

    h.engine
        .mint(collector(), id, 1, &[], U256::zero(), collector())
        .unwrap();
    h.engine
        .mint(collector(), id, 1, &[], U256::zero(), collector())
        .unwrap();
    assert_eq!(h.engine.total_supply(id), 2);

    let err = h
        .engine
        .mint(collector(), id, 1, &[], U256::zero(), collector())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TotalSupplyExceeded);
    assert_eq!(h.engine.total_supply(id), 2);
    assert_eq!(h.engine.balance_of(collector(), id), 2);
}

#[test]
fn open_mint_is_free_and_uncapped() {
    let mut h = harness();
    let id = default_id();

    h.engine
        .mint(deployer(), id, 1, &[], U256::zero(), deployer())
        .unwrap();
    h.engine
        .mint(deployer(), id, 1, &[], U256::zero(), deployer())
        .unwrap();

    assert_eq!(h.engine.balance_of(deployer(), id), 2);
    assert_eq!(h.engine.state(id), ProvenanceState::Unset);
    assert_eq!(
        h.engine
            .mint(deployer(), id, 1, &[], U256::from(1u64), deployer()),
        Err(OrbError::InvalidFunding {
            expected: U256::zero(),
            actual: U256::from(1u64)
        })
    );
}

// =============================================================================
// CATEGORY 3: TERMS
// =============================================================================

#[test]
fn vault_exclusivity_after_mint() {
    let mut h = harness();
    let id = default_id();

    h.engine
        .mint(deployer(), id, 1, &[], U256::zero(), deployer())
        .unwrap();

    let provenance = Provenance {
        max_supply: pack_max_supply(2u64, 2),
        ..capped(0)
    };

    // Open-minted units exist: only the vault being installed may load.
    assert_eq!(
        h.engine
            .load(id, provenance, U256::zero(), other_account()),
        Err(OrbError::InvalidVaultConfiguration)
    );
    h.engine
        .load(id, provenance, U256::zero(), deployer())
        .unwrap();

    assert_eq!(
        h.engine
            .load(id, provenance, U256::zero(), other_account()),
        Err(OrbError::InvalidVaultConfiguration)
    );
    assert!(h.engine.load(id, provenance, U256::zero(), deployer()).is_ok());
}

#[test]
fn max_supply_configuration_rules() {
    let mut h = harness();
    let id = default_id();

    // Packed 2 = supply 0, power 2.
    let no_units = Provenance {
        max_supply: U256::from(2u64),
        ..capped(0)
    };
    assert_eq!(
        h.engine.load(id, no_units, U256::zero(), deployer()),
        Err(OrbError::InvalidMaxSupplyConfiguration)
    );

    let closure_without_cap = Provenance {
        max_supply: U256::zero(),
        closure: NOW + THIRTY_DAYS,
        ..capped(0)
    };
    assert_eq!(
        h.engine
            .load(id, closure_without_cap, U256::zero(), deployer()),
        Err(OrbError::InvalidMaxSupplyConfiguration)
    );
}

#[test]
fn cap_below_open_minted_units_is_loadable() {
    let mut h = harness();
    let id = default_id();
    let one_ether = U256::from(10u64).pow(U256::from(18u64));

    h.engine
        .mint(deployer(), id, 5, &[], U256::zero(), deployer())
        .unwrap();

    let provenance = Provenance {
        max_supply: pack_max_supply(2u64, 3),
        price: pack_price(1u64, 18),
        ..capped(0)
    };
    let event = h.engine.load(id, provenance, one_ether, deployer()).unwrap();
    assert!(matches!(event, OrbEvent::Load { id: loaded, .. } if loaded == id));
    assert!(h.engine.check_invariants().is_valid());

    // The cap only stops further mints.
    let err = h
        .engine
        .mint(collector(), id, 1, &[], one_ether, collector())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TotalSupplyExceeded);

    assert_eq!(h.engine.forfeit(id, deployer()), Ok(OrbEvent::Forfeit { id }));
    assert_eq!(h.engine.total_supply(id), 5);
    assert!(h.engine.check_invariants().is_valid());
}

#[test]
fn scenario_c_closure_extension_and_past_closure() {
    let mut h = harness();
    let id = default_id();

    let mut provenance = capped(10);
    provenance.closure = NOW + THIRTY_DAYS;
    h.engine
        .load(id, provenance, U256::zero(), deployer())
        .unwrap();

    provenance.closure = NOW + THIRTY_DAYS + 10;
    h.engine
        .load(id, provenance, U256::zero(), deployer())
        .unwrap();

    provenance.closure = 1;
    assert_eq!(
        h.engine
            .load(id, provenance, U256::zero(), deployer())
            .map_err(|e| e.kind()),
        Err(ErrorKind::InvalidClosureConfiguration)
    );

    provenance.closure = NOW + 5;
    assert_eq!(
        h.engine
            .load(id, provenance, U256::zero(), deployer())
            .map_err(|e| e.kind()),
        Err(ErrorKind::InvalidClosureConfiguration)
    );
    assert_eq!(h.engine.provenance(id).closure, NOW + THIRTY_DAYS + 10);
}

#[test]
fn mint_after_closure_rejected() {
    let mut h = harness();
    let id = default_id();

    let mut provenance = capped(10);
    provenance.closure = NOW + 100;
    h.engine
        .load(id, provenance, U256::zero(), deployer())
        .unwrap();

    h.engine
        .mint(collector(), id, 1, &[], U256::zero(), collector())
        .unwrap();

    h.clock.advance(101);
    assert_eq!(
        h.engine
            .mint(collector(), id, 1, &[], U256::zero(), collector()),
        Err(OrbError::ProvenanceClosed {
            closure: NOW + 100,
            now: NOW + 101
        })
    );
}

#[test]
fn scenario_d_fork_rules() {
    let mut h = harness();
    let parent = default_id();
    let child = variant_id(128);

    assert_eq!(
        h.engine
            .fork(parent, parent, capped(2), U256::zero(), deployer()),
        Err(OrbError::ForkedProvenanceSameAsNew)
    );
    assert_eq!(
        h.engine
            .fork(parent, child, capped(2), U256::zero(), deployer()),
        Err(OrbError::ForkedProvenanceNotFound)
    );

    h.engine
        .load(parent, capped(2), U256::zero(), deployer())
        .unwrap();
    let inherited = h.engine.provenance(parent);

    let event = h
        .engine
        .fork(parent, child, inherited, U256::zero(), other_account())
        .unwrap();
    assert_eq!(
        event,
        OrbEvent::Fork {
            from_id: parent,
            to_id: child,
            provenance: Provenance {
                total_supply: 0,
                ..inherited
            },
        }
    );
    assert!(h.engine.state(child).is_active());

    // Same-id check still wins once the parent exists.
    assert_eq!(
        h.engine
            .fork(parent, parent, inherited, U256::zero(), deployer()),
        Err(OrbError::ForkedProvenanceSameAsNew)
    );
}

#[test]
fn fork_validates_both_identifiers() {
    let mut h = harness();
    let parent = default_id();
    h.engine
        .load(parent, capped(2), U256::zero(), deployer())
        .unwrap();

    assert_eq!(
        h.engine
            .fork(parent, TokenId::ZERO, capped(2), U256::zero(), deployer()),
        Err(OrbError::NoColors)
    );
    assert_eq!(
        h.engine
            .fork(TokenId::ZERO, parent, capped(2), U256::zero(), deployer()),
        Err(OrbError::NoColors)
    );
}

#[test]
fn forfeit_only_by_vault() {
    let mut h = harness();
    let id = default_id();
    h.engine
        .load(id, capped(5), U256::zero(), deployer())
        .unwrap();
    h.engine
        .mint(collector(), id, 2, &[], U256::zero(), collector())
        .unwrap();

    assert_eq!(
        h.engine.forfeit(id, other_account()),
        Err(OrbError::InvalidCaller)
    );
    h.engine.forfeit(id, deployer()).unwrap();

    assert_eq!(h.engine.state(id), ProvenanceState::Forfeited);
    assert_eq!(
        h.engine.provenance(id),
        Provenance {
            total_supply: 2,
            ..Provenance::default()
        }
    );
    assert_eq!(h.engine.forfeit(id, deployer()), Err(OrbError::InvalidCaller));

    // Units are still out there, so a new vault must claim for itself.
    let mut takeover = capped(5);
    takeover.vault = other_account();
    assert_eq!(
        h.engine.load(id, takeover, U256::zero(), deployer()),
        Err(OrbError::InvalidVaultConfiguration)
    );
    h.engine
        .load(id, takeover, U256::zero(), other_account())
        .unwrap();
    assert!(h.engine.state(id).is_active());
}

// =============================================================================
// CATEGORY 4: FUNDS
// =============================================================================

#[test]
fn scenario_e_exact_funding_and_withdraw() {
    let mut h = harness();
    let id = default_id();

    // 1 * 10^3 per unit.
    let price = pack_price(1u64, 3);
    h.engine
        .load(id, priced(10, price), U256::from(1_000u64), deployer())
        .unwrap();
    let after_load = h.engine.pending_withdrawal(deployer());
    assert_eq!(after_load, U256::from(1_000u64));

    let err = h
        .engine
        .mint(collector(), id, 2, &[], U256::from(1_999u64), collector())
        .unwrap_err();
    assert_eq!(
        err,
        OrbError::InvalidFunding {
            expected: U256::from(2_000u64),
            actual: U256::from(1_999u64)
        }
    );
    assert_eq!(h.engine.total_supply(id), 0);
    assert_eq!(h.engine.pending_withdrawal(deployer()), after_load);

    h.engine
        .mint(collector(), id, 2, &[], U256::from(2_000u64), collector())
        .unwrap();
    assert_eq!(
        h.engine.pending_withdrawal(deployer()) - after_load,
        U256::from(2_000u64)
    );

    assert_eq!(h.engine.withdraw(deployer()), U256::from(3_000u64));
    assert!(h.engine.withdraw(deployer()).is_zero());
    assert_eq!(h.engine.stats().funds_withdrawn, U256::from(3_000u64));
}

#[test]
fn overpayment_rejected() {
    let mut h = harness();
    let id = default_id();
    let price = pack_price(5u64, 0);
    h.engine
        .load(id, priced(10, price), U256::from(5u64), deployer())
        .unwrap();

    assert!(matches!(
        h.engine
            .mint(collector(), id, 1, &[], U256::from(6u64), collector()),
        Err(OrbError::InvalidFunding { .. })
    ));
}

#[test]
fn price_change_is_paid_for() {
    let mut h = harness();
    let id = default_id();
    h.engine
        .load(id, priced(10, pack_price(5u64, 0)), U256::from(5u64), deployer())
        .unwrap();

    assert!(h
        .engine
        .load(id, priced(10, pack_price(7u64, 0)), U256::zero(), deployer())
        .is_err());
    h.engine
        .load(id, priced(10, pack_price(7u64, 0)), U256::from(7u64), deployer())
        .unwrap();
    assert_eq!(h.engine.pending_withdrawal(deployer()), U256::from(12u64));
}

#[test]
fn funded_terms_are_claimed() {
    let mut h = harness();
    let id = default_id();
    h.engine
        .load(id, priced(10, pack_price(5u64, 0)), U256::from(5u64), deployer())
        .unwrap();

    let mut takeover = capped(10);
    takeover.vault = other_account();
    assert_eq!(
        h.engine
            .load(id, takeover, U256::zero(), other_account()),
        Err(OrbError::InvalidVaultConfiguration)
    );
}

// =============================================================================
// CATEGORY 5: TRANSFERS
// =============================================================================

#[test]
fn transfer_requires_owner_or_operator() {
    let mut h = harness();
    let id = default_id();
    h.engine
        .mint(collector(), id, 3, &[], U256::zero(), collector())
        .unwrap();

    assert_eq!(
        h.engine
            .safe_transfer_from(collector(), other_account(), id, 1, &[], other_account()),
        Err(OrbError::NotAuthorized)
    );

    h.engine
        .set_approval_for_all(other_account(), true, collector())
        .unwrap();
    assert!(h.engine.is_approved_for_all(collector(), other_account()));

    h.engine
        .safe_transfer_from(collector(), other_account(), id, 1, &[], other_account())
        .unwrap();
    assert_eq!(
        h.engine
            .balance_of_batch(&[collector(), other_account()], &[id, id])
            .unwrap(),
        vec![2, 1]
    );
}

#[test]
fn batch_transfer_is_atomic() {
    let mut h = harness();
    let a = default_id();
    let b = variant_id(1);
    h.engine
        .mint(collector(), a, 2, &[], U256::zero(), collector())
        .unwrap();
    h.engine
        .mint(collector(), b, 1, &[], U256::zero(), collector())
        .unwrap();

    let err = h
        .engine
        .safe_batch_transfer_from(collector(), deployer(), &[a, b], &[1, 2], &[], collector())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(h.engine.balance_of(collector(), a), 2);
    assert_eq!(h.engine.balance_of(deployer(), a), 0);

    // The same id twice draws on the staged balance.
    assert!(h
        .engine
        .safe_batch_transfer_from(collector(), deployer(), &[a, a], &[2, 1], &[], collector())
        .is_err());

    h.engine
        .safe_batch_transfer_from(collector(), deployer(), &[a, b], &[2, 1], &[], collector())
        .unwrap();
    assert_eq!(h.engine.balance_of(deployer(), a), 2);
    assert_eq!(h.engine.balance_of(deployer(), b), 1);
}

#[test]
fn batch_length_mismatch() {
    let mut h = harness();
    let id = default_id();
    assert_eq!(
        h.engine
            .safe_batch_transfer_from(collector(), deployer(), &[id], &[], &[], collector()),
        Err(OrbError::BatchLengthMismatch { ids: 1, values: 0 })
    );
    assert!(h.engine.balance_of_batch(&[collector()], &[]).is_err());
}

// =============================================================================
// CATEGORY 6: EVENTS
// =============================================================================

#[test]
fn one_event_per_successful_call() {
    let mut h = harness();
    let mut sub = h.bus.subscribe(EventFilter::all());
    let id = default_id();

    h.engine
        .load(id, priced(2, pack_price(1u64, 0)), U256::from(1u64), deployer())
        .unwrap();
    h.engine
        .mint(collector(), id, 1, b"gm", U256::from(1u64), collector())
        .unwrap();
    let _ = h
        .engine
        .mint(collector(), id, 5, &[], U256::from(5u64), collector());
    h.engine.burn(id, 1, collector()).unwrap();
    h.engine.withdraw(deployer());
    h.engine.forfeit(id, deployer()).unwrap();

    let names: Vec<&str> = sub.drain().iter().map(OrbEvent::name).collect();
    assert_eq!(
        names,
        vec!["Load", "TransferSingle", "TransferSingle", "Withdraw", "Forfeit"]
    );
    assert_eq!(h.engine.stats().rejections, 1);
    assert!(h.engine.check_invariants().is_valid());
}

#[test]
fn mint_event_shape() {
    let mut h = harness();
    let id = default_id();

    let event = h
        .engine
        .mint(collector(), id, 4, &[], U256::zero(), deployer())
        .unwrap();
    assert_eq!(
        event,
        OrbEvent::TransferSingle {
            operator: deployer(),
            from: Address::ZERO,
            to: collector(),
            id,
            amount: 4,
        }
    );
}

#[tokio::test]
async fn indexer_follows_one_token() {
    let mut h = harness();
    let watched = default_id();
    let ignored = variant_id(7);
    let mut sub = h.bus.subscribe(EventFilter::for_tokens(vec![watched]));

    h.engine
        .mint(collector(), ignored, 1, &[], U256::zero(), collector())
        .unwrap();
    h.engine
        .load(watched, capped(3), U256::zero(), deployer())
        .unwrap();

    let event = tokio::time::timeout(Duration::from_millis(100), sub.recv())
        .await
        .expect("timeout")
        .expect("event");
    assert_eq!(event.name(), "Load");
    assert_eq!(event.token_ids(), vec![watched]);
}
