//! Property tests: structural invariants hold under arbitrary sequences of
//! link primitives, signals stay in bounds, and capacity-gated growth never
//! pushes a node past its link budget.

use mycelia_topology::{DiffusionMode, Mesh, NodeId, ProfileConfig, Role, SignalParams};
use proptest::prelude::*;

const NODES: usize = 8;

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize),
    Remove(usize, usize),
    Transfer(usize, usize, usize),
    Absorb(usize, usize),
    Swap(usize, usize),
    Become(usize, Role),
    Grow(usize),
    Kill(usize),
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Biomass),
        Just(Role::Extending),
        Just(Role::Branching),
        Just(Role::Immobile),
        Just(Role::Bulwark),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let n = || 0..NODES;
    prop_oneof![
        4 => (n(), n()).prop_map(|(a, b)| Op::Add(a, b)),
        2 => (n(), n()).prop_map(|(a, b)| Op::Remove(a, b)),
        2 => (n(), n(), n()).prop_map(|(o, x, t)| Op::Transfer(o, x, t)),
        1 => (n(), n()).prop_map(|(o, t)| Op::Absorb(o, t)),
        1 => (n(), n()).prop_map(|(o, t)| Op::Swap(o, t)),
        2 => (n(), role_strategy()).prop_map(|(a, r)| Op::Become(a, r)),
        1 => n().prop_map(Op::Grow),
        1 => n().prop_map(Op::Kill),
    ]
}

fn build(capacities: &[usize]) -> Mesh {
    let config = ProfileConfig::default();
    let mut mesh = Mesh::new();
    for &c in capacities {
        mesh.add_node(config.profile_with_capacity(c));
    }
    mesh
}

fn apply(mesh: &mut Mesh, op: &Op) {
    let id = NodeId;
    match *op {
        Op::Add(a, b) => {
            mesh.add_neighbor(id(a), id(b));
        }
        Op::Remove(a, b) => {
            mesh.remove_neighbor(id(a), id(b));
        }
        Op::Transfer(o, x, t) => {
            let _ = mesh.transfer_neighbor(id(o), id(x), id(t));
        }
        Op::Absorb(o, t) => {
            let _ = mesh.absorb_hypha(id(o), id(t));
        }
        Op::Swap(o, t) => {
            let _ = mesh.swap_hyphae(id(o), id(t));
        }
        Op::Become(a, r) => {
            mesh.become_role(id(a), r);
        }
        Op::Grow(o) => {
            mesh.grow_hypha(id(o));
        }
        Op::Kill(a) => {
            mesh.kill(id(a));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn invariants_survive_random_operations(
        capacities in prop::collection::vec(0usize..6, NODES),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let mut mesh = build(&capacities);
        for op in &ops {
            apply(&mut mesh, op);
            if let Err(violation) = mesh.check_invariants() {
                return Err(TestCaseError::fail(format!("{violation} after {op:?}")));
            }
            for n in mesh.ids() {
                let links = mesh.links(n);
                prop_assert!(!links.contains(n));
                let mut sorted = links.to_vec();
                sorted.sort();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), links.len());
            }
        }
    }

    #[test]
    fn absorb_moves_every_link(
        capacities in prop::collection::vec(1usize..6, NODES),
        edges in prop::collection::vec((0..NODES, 0..NODES), 0..24),
    ) {
        let mut mesh = build(&capacities);
        for (a, b) in edges {
            mesh.add_neighbor(NodeId(a), NodeId(b));
        }
        let (owner, target) = (NodeId(0), NodeId(1));
        mesh.become_role(owner, Role::Extending);
        mesh.become_role(target, Role::Extending);
        let former: Vec<NodeId> = mesh.neighbors(target).into_iter().filter(|&n| n != owner).collect();

        prop_assert!(mesh.absorb_hypha(owner, target).is_ok());
        prop_assert_eq!(mesh.role(target), Role::Biomass);
        prop_assert!(mesh.links(target).is_empty());
        for n in former {
            prop_assert!(mesh.are_linked(owner, n));
            prop_assert!(mesh.are_linked(n, owner));
        }
        prop_assert!(mesh.check_invariants().is_ok());
    }

    #[test]
    fn growth_never_exceeds_capacity(
        capacities in prop::collection::vec(0usize..5, NODES),
        roles in prop::collection::vec(role_strategy(), NODES),
        seeded in prop::collection::vec((0..NODES, 0..NODES), 0..12),
        attempts in prop::collection::vec((0..NODES, 0..NODES), 1..60),
    ) {
        let mut mesh = build(&capacities);
        for (n, &role) in mesh.live_nodes().into_iter().zip(&roles) {
            mesh.become_role(n, role);
        }
        // ungated links may already push some nodes past capacity
        for (a, b) in seeded {
            mesh.add_neighbor(NodeId(a), NodeId(b));
        }
        for (a, b) in attempts {
            let (a, b) = (NodeId(a), NodeId(b));
            let full = mesh.degree(a) >= mesh.profile(a).capacity
                || mesh.degree(b) >= mesh.profile(b).capacity;
            let before = (mesh.degree(a), mesh.degree(b));
            let grown = mesh.grow_link(a, b);
            if full {
                prop_assert!(grown.is_err());
                prop_assert_eq!((mesh.degree(a), mesh.degree(b)), before);
            }
            if grown.is_ok() {
                prop_assert!(mesh.degree(a) <= mesh.profile(a).capacity);
                prop_assert!(mesh.degree(b) <= mesh.profile(b).capacity);
            }
        }
        prop_assert!(mesh.check_invariants().is_ok());
    }

    #[test]
    fn signal_stays_in_bounds(
        max in 1.0f64..200.0,
        decay in 0.0f64..1.0,
        rate in 0.0f64..1.0,
        fractional in any::<bool>(),
        injections in prop::collection::vec((0..NODES, -50.0f64..500.0), 1..30),
        edges in prop::collection::vec((0..NODES, 0..NODES), 0..20),
    ) {
        let params = SignalParams {
            max_concentration: max,
            decay_rate: decay,
            diffusion_rate: rate,
            diffusion: if fractional { DiffusionMode::Fractional } else { DiffusionMode::Equilibrate },
            ..SignalParams::default()
        };
        let mut mesh = build(&[3; NODES]);
        for (a, b) in edges {
            mesh.add_neighbor(NodeId(a), NodeId(b));
        }
        for (n, amount) in injections {
            mesh.inject_signal(NodeId(n), amount, &params);
            let mean = mesh.diffuse_signal(NodeId(n), &params);
            prop_assert!(mean >= 0.0);
            mesh.signal_dynamics(NodeId(n), &params);
            for id in mesh.ids() {
                let c = mesh.concentration(id);
                prop_assert!((0.0..=max).contains(&c), "{} holds {}", id, c);
            }
        }
    }
}
