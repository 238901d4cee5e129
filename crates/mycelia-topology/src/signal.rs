//! Diffusing, decaying alert signal.
//!
//! Each node may hold a scalar concentration in `[0, max_concentration]`.
//! Values below `cutoff` snap to zero and a zero signal is dropped, so a
//! node without a signal and a node with concentration 0 are the same.
//!
//! # Dynamics
//!
//! On a node's turn its signal, if above cutoff, first diffuses across the
//! 1-hop neighborhood and then decays. Diffusion computes the mean of the
//! node's own concentration and every neighbor's. In
//! [`DiffusionMode::Equilibrate`] every participant is set to that mean; in
//! [`DiffusionMode::Fractional`] each participant moves `diffusion_rate` of
//! the way towards it. Injection happens out of band when a neighbor fails.

use tracing::trace;

use crate::{Mesh, NodeId};

/// How far diffusion moves a neighborhood towards its mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiffusionMode {
    /// Every participant takes the mean
    #[default]
    Equilibrate,
    /// Every participant moves `diffusion_rate` of the way to the mean
    Fractional,
}

/// Signal parameters, shared by every node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignalParams {
    pub diffusion_rate: f64,
    /// Fraction lost per cycle
    pub decay_rate: f64,
    pub max_concentration: f64,
    pub cutoff: f64,
    pub diffusion: DiffusionMode,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            diffusion_rate: 0.5,
            decay_rate: 0.1,
            max_concentration: 100.0,
            cutoff: 1e-2,
            diffusion: DiffusionMode::Equilibrate,
        }
    }
}

impl SignalParams {
    /// Snap below-cutoff (and NaN) values to zero and cap at the maximum.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() || value < self.cutoff {
            0.0
        } else {
            value.min(self.max_concentration)
        }
    }
}

/// Concentration held by one node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertSignal {
    concentration: f64,
}

impl AlertSignal {
    /// A signal holding `amount`, clamped.
    pub fn new(amount: f64, params: &SignalParams) -> Self {
        Self {
            concentration: params.clamp(amount),
        }
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn is_zero(&self) -> bool {
        self.concentration == 0.0
    }

    pub fn set(&mut self, value: f64, params: &SignalParams) {
        self.concentration = params.clamp(value);
    }

    pub fn inject(&mut self, amount: f64, params: &SignalParams) {
        self.set(self.concentration + amount, params);
    }

    /// Multiply by `1 - decay_rate`.
    pub fn decay(&mut self, params: &SignalParams) {
        self.set(self.concentration * (1.0 - params.decay_rate), params);
    }

    /// Remove up to `quantity`, returning what was actually removed.
    pub fn extract(&mut self, quantity: f64, params: &SignalParams) -> f64 {
        let before = self.concentration;
        self.set(before - quantity.max(0.0), params);
        before - self.concentration
    }

    /// Consume `concentration * rate`.
    pub fn metabolize(&mut self, rate: f64, params: &SignalParams) -> f64 {
        self.extract(self.concentration * rate, params)
    }
}

impl Mesh {
    /// Concentration at `node`, zero if it holds no signal.
    pub fn concentration(&self, node: NodeId) -> f64 {
        self.node(node).signal.map_or(0.0, |s| s.concentration())
    }

    /// Set the concentration at `node`, dropping the signal if it clamps
    /// to zero.
    pub fn set_concentration(&mut self, node: NodeId, value: f64, params: &SignalParams) {
        let signal = AlertSignal::new(value, params);
        self.node_mut(node).signal = (!signal.is_zero()).then_some(signal);
    }

    /// Add `amount` at `node`, creating the signal if needed.
    pub fn inject_signal(&mut self, node: NodeId, amount: f64, params: &SignalParams) {
        let current = self.concentration(node);
        self.set_concentration(node, current + amount, params);
        trace!("{} signal {:.3} -> {:.3}", node, current, self.concentration(node));
    }

    /// Drop every trace of signal at `node`.
    pub fn wipe_signal(&mut self, node: NodeId) {
        self.node_mut(node).signal = None;
    }

    /// Consume `concentration * rate` at `node`; returns the amount consumed.
    pub fn metabolize_signal(&mut self, node: NodeId, rate: f64, params: &SignalParams) -> f64 {
        let Some(mut signal) = self.node(node).signal else {
            return 0.0;
        };
        let consumed = signal.metabolize(rate, params);
        self.node_mut(node).signal = (!signal.is_zero()).then_some(signal);
        consumed
    }

    /// Diffuse across the 1-hop neighborhood of `node`, returning the mean.
    ///
    /// A node without neighbors keeps its own concentration.
    pub fn diffuse_signal(&mut self, node: NodeId, params: &SignalParams) -> f64 {
        let neighbors = self.neighbors(node);
        let own = self.concentration(node);
        if neighbors.is_empty() {
            return own;
        }
        let total: f64 = own + neighbors.iter().map(|&n| self.concentration(n)).sum::<f64>();
        let mean = (total / (neighbors.len() + 1) as f64).max(0.0);

        let rate = match params.diffusion {
            DiffusionMode::Equilibrate => 1.0,
            DiffusionMode::Fractional => params.diffusion_rate.clamp(0.0, 1.0),
        };
        for participant in std::iter::once(node).chain(neighbors) {
            let current = self.concentration(participant);
            self.set_concentration(participant, current + rate * (mean - current), params);
        }
        mean
    }

    /// One turn of signal dynamics at `node`: nothing below cutoff,
    /// otherwise diffuse then decay.
    pub fn signal_dynamics(&mut self, node: NodeId, params: &SignalParams) {
        if self.concentration(node) < params.cutoff {
            self.wipe_signal(node);
            return;
        }
        self.diffuse_signal(node, params);
        if let Some(mut signal) = self.node(node).signal {
            signal.decay(params);
            self.node_mut(node).signal = (!signal.is_zero()).then_some(signal);
        }
    }
}
