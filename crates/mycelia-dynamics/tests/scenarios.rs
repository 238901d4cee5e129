//! End-to-end behaviour of the engine on small hand-built meshes.

use mycelia_dynamics::{
    AdaptationConfig, Engine, EngineConfig, FailureConfig, InhibitionConfig, ParentTargetConfig,
};
use mycelia_dynamics::policy::FlatMetabolism;
use mycelia_topology::{NodeId, Role};
use proptest::prelude::*;

fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.metabolism = FlatMetabolism {
        normal_rate: 0.0,
        bulwark_rate: 0.0,
    };
    config.alerting.threshold = 1_000.0;
    config
}

#[test]
fn injected_signal_is_clamped() {
    let mut config = quiet_config();
    config.signal.max_concentration = 50.0;
    config.alerting.threshold = 60.0;
    let mut engine = Engine::new(config).unwrap();
    let n = engine.on_node_joined();
    engine.inject_alert(n, 100.0);
    assert_eq!(engine.mesh().concentration(n), 50.0);
}

#[test]
fn isolated_signal_decays_geometrically() {
    let mut config = quiet_config();
    config.signal.decay_rate = 0.1;
    let mut engine = Engine::new(config).unwrap();
    let n = engine.on_node_joined();
    engine.inject_alert(n, 10.0);
    engine.on_cycle_tick(n);
    engine.on_cycle_tick(n);
    assert!((engine.mesh().concentration(n) - 8.1).abs() < 1e-9);
}

#[test]
fn tip_absorbs_smaller_tips() {
    let mut engine = Engine::new(quiet_config()).unwrap();
    let x = engine.join_with_capacity(10);
    let mut tips = Vec::new();
    let mut children = Vec::new();
    for _ in 0..2 {
        let tip = engine.join_with_capacity(5);
        tips.push(tip);
        for _ in 0..2 {
            let c = engine.join_with_capacity(1);
            engine.mesh_mut().add_neighbor(tip, c);
            children.push(c);
        }
    }
    let mesh = engine.mesh_mut();
    mesh.become_role(x, Role::Extending);
    for &tip in &tips {
        mesh.become_role(tip, Role::Extending);
        mesh.add_neighbor(x, tip);
    }

    engine.on_cycle_tick(x);
    let mesh = engine.mesh();
    for &tip in &tips {
        assert_eq!(mesh.role(tip), Role::Biomass);
        assert!(mesh.links(tip).is_empty());
    }
    for &c in &children {
        assert!(mesh.are_linked(x, c));
    }
    assert_eq!(mesh.check_invariants(), Ok(()));
}

#[test]
fn balanced_tip_keeps_its_role() {
    let mut engine = Engine::new(quiet_config()).unwrap();
    let b1 = engine.join_with_capacity(1);
    let e1 = engine.join_with_capacity(2);
    let b2 = engine.join_with_capacity(1);
    let mesh = engine.mesh_mut();
    mesh.become_role(e1, Role::Extending);
    mesh.add_neighbor(b1, e1);
    mesh.add_neighbor(e1, b2);

    engine.run_cycle();
    assert_eq!(engine.mesh().role(e1), Role::Extending);
    assert!(engine.mesh().are_linked(e1, b2));
    assert!(engine.mesh().are_linked(e1, b1));
}

#[test]
fn promotion_waits_for_inhibition_delay() {
    let mut config = quiet_config();
    config.signal.decay_rate = 0.0;
    config.alerting.threshold = 1.0;
    config.inhibition = InhibitionConfig::Delay {
        bulwark_delay: 3,
        revert_delay: 100,
    };
    let mut engine = Engine::new(config).unwrap();
    let n = engine.on_node_joined();
    engine.inject_alert(n, 10.0);

    for _ in 0..3 {
        engine.on_cycle_tick(n);
        assert_ne!(engine.mesh().role(n), Role::Bulwark);
    }
    engine.on_cycle_tick(n);
    assert_eq!(engine.mesh().role(n), Role::Bulwark);
    assert_eq!(engine.mesh().profile(n).bulwark_entries, 1);
}

#[test]
fn bulwark_reverts_to_prior_role() {
    let mut config = quiet_config();
    config.alerting.threshold = 1.0;
    config.inhibition = InhibitionConfig::Immediate;
    config.clear_on_revert = true;
    let mut engine = Engine::new(config).unwrap();
    let core = engine.join_with_capacity(1);
    let leaf = engine.join_with_capacity(1);
    let mesh = engine.mesh_mut();
    mesh.become_role(core, Role::Immobile);
    mesh.add_neighbor(core, leaf);
    // diffusion halves it, decay leaves 1.08
    engine.inject_alert(core, 2.4);

    engine.on_cycle_tick(core);
    assert_eq!(engine.mesh().role(core), Role::Bulwark);
    assert!(!engine.mesh().are_linked(core, leaf));
    assert_eq!(engine.mesh().control(core).prior_role, Some(Role::Immobile));
    assert!(engine.mesh().profile(leaf).disconnect_detected);

    // isolated decay takes it to 0.972
    engine.on_cycle_tick(core);
    assert_eq!(engine.mesh().role(core), Role::Immobile);
    assert_eq!(engine.mesh().concentration(core), 0.0);
    assert_eq!(engine.mesh().check_invariants(), Ok(()));
}

#[test]
fn flapping_lengthens_reversion_delay() {
    let mut config = quiet_config();
    config.signal.decay_rate = 0.0;
    config.alerting.threshold = 1.0;
    config.inhibition = InhibitionConfig::Immediate;
    config.adaptation = AdaptationConfig::Multiplicative {
        up: 2.0,
        down: 0.5,
        cooldown: 5,
        noise: 0.0,
    };
    let mut engine = Engine::new(config).unwrap();
    let n = engine.on_node_joined();
    engine.mesh_mut().become_role(n, Role::Extending);
    assert_eq!(engine.mesh().profile(n).reversion_delay, 3.0);

    let promote = |engine: &mut Engine| {
        engine.inject_alert(n, 10.0);
        engine.on_cycle_tick(n);
        assert_eq!(engine.mesh().role(n), Role::Bulwark);
        engine.mesh().profile(n).reversion_delay
    };
    let revert = |engine: &mut Engine| {
        engine.mesh_mut().wipe_signal(n);
        engine.on_cycle_tick(n);
        assert_eq!(engine.mesh().role(n), Role::Extending);
        engine.mesh().profile(n).reversion_delay
    };

    // re-entry right after leaving doubles, leaving halves
    assert_eq!(promote(&mut engine), 6.0);
    assert_eq!(revert(&mut engine), 3.0);
    assert_eq!(promote(&mut engine), 6.0);
    assert_eq!(revert(&mut engine), 3.0);
    assert_eq!(engine.mesh().control(n).elapsed, 0);

    // a long quiet spell outlasts the cooldown
    for _ in 0..6 {
        engine.on_cycle_tick(n);
    }
    assert_eq!(engine.mesh().control(n).elapsed, 6);
    assert_eq!(promote(&mut engine), 3.0);
    assert_eq!(revert(&mut engine), 1.5);
    assert_eq!(engine.mesh().profile(n).bulwark_entries, 3);
}

#[test]
fn core_failure_raises_parent_target() {
    let mut config = quiet_config();
    config.failure = FailureConfig::Linear {
        scale: 1.0,
        bulwark_scale: 0.5,
    };
    config.parent_target = ParentTargetConfig::KnownFailure { decay_prob: 0.0 };
    let mut engine = Engine::new(config).unwrap();
    let core = engine.on_node_joined();
    let leaf = engine.on_node_joined();
    let mesh = engine.mesh_mut();
    mesh.become_role(core, Role::Immobile);
    mesh.add_neighbor(core, leaf);

    engine.on_node_failed(core);
    assert_eq!(engine.mesh().concentration(leaf), 1.0);
    engine.on_cycle_tick(leaf);
    assert_eq!(engine.mesh().profile(leaf).parent_target(), 2.0);
    assert!(!engine.mesh().profile(leaf).failure_detected);
}

fn populate(seed: u64, nodes: usize) -> (Engine, Vec<NodeId>) {
    let config = EngineConfig {
        seed,
        inhibition: InhibitionConfig::Immediate,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config).unwrap();
    let ids = (0..nodes)
        .map(|i| engine.join_with_capacity(1 + ((i as u64 * 7 + seed % 15) % 15) as usize))
        .collect();
    (engine, ids)
}

#[test]
fn long_run_stays_consistent() {
    let (mut engine, ids) = populate(42, 60);
    for cycle in 0..60 {
        if cycle % 15 == 7 {
            engine.on_node_failed(ids[cycle]);
            engine.inject_alert(ids[cycle + 1], 30.0);
        }
        engine.run_cycle();
        assert_eq!(engine.mesh().check_invariants(), Ok(()), "cycle {cycle}");
    }
    let mesh = engine.mesh();
    for n in mesh.live_nodes() {
        assert_eq!(mesh.directory().role_of(n), Some(mesh.role(n)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]

    #[test]
    fn random_runs_keep_invariants(
        seed in any::<u64>(),
        nodes in 2usize..40,
        failures in proptest::collection::vec(0usize..40, 0..6),
    ) {
        let (mut engine, ids) = populate(seed, nodes);
        let max = engine.config().signal.max_concentration;
        for (cycle, victim) in failures.iter().enumerate() {
            engine.run_cycle();
            engine.on_node_failed(ids[victim % nodes]);
            if cycle % 2 == 0 {
                engine.inject_alert(ids[(victim + 1) % nodes], max * 2.0);
            }
            prop_assert_eq!(engine.mesh().check_invariants(), Ok(()));
        }
        for _ in 0..5 {
            engine.run_cycle();
        }
        prop_assert_eq!(engine.mesh().check_invariants(), Ok(()));
        for n in engine.mesh().ids() {
            let c = engine.mesh().concentration(n);
            prop_assert!((0.0..=max).contains(&c));
        }
    }
}
