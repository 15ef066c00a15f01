//! Reference topologies shared across solver and control tests.

use marionette_core::config::RigConfig;
use marionette_skeleton::{build_topology, chain_with_lengths, Bone, Topology, TopologySpec};
use nalgebra::Vector3;

use crate::rng::seeded_rng;

/// Build a chain of `links` unit-length bones along +X from (-4, 0, 0).
///
/// The fixed layout keeps solver expectations computable by hand: joint
/// `Ji` sits at (-4 + i, 0, 0) and the total reach equals `links`.
pub fn unit_chain(links: u32) -> Topology {
    let lengths = vec![1.0; links as usize];
    chain_with_lengths(
        &lengths,
        Vector3::new(-4.0, 0.0, 0.0),
        Bone::DEFAULT_THICKNESS,
    )
    .unwrap()
}

/// Build a randomized chain through the default config with a fixed seed.
pub fn random_chain(links: u32, seed: u64) -> Topology {
    let config = RigConfig::default();
    let mut rng = seeded_rng(seed);
    build_topology(TopologySpec::Chain { links }, &config, &mut rng).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
