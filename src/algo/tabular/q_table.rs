use std::collections::{HashMap, HashSet};

use rand::{seq::SliceRandom, thread_rng};

use crate::{
    decay::{self, Decay},
    error::{ConfigError, Result},
    exploration::{Choice, EpsilonGreedy},
    memory::Exp,
    util::{ensure_interval, round_to},
};

use super::Hashable;

/// Mapping from `(state, action)` to an estimate of long-term value
///
/// The table is a total function: a pair that has never been updated reads as a default.
/// Two defaults exist and they are deliberately different:
/// - [`lookup`](QTable::lookup) is used when exploiting and honours per-action overrides,
///   e.g. biasing an untried action with `f32::NEG_INFINITY`
/// - [`value`](QTable::value) is used when learning and always reads missing pairs as `0`
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    values: HashMap<(S, A), f32>,
    unseen: Vec<(A, f32)>,
}

impl<S: Hashable, A: Hashable> QTable<S, A> {
    pub fn new(unseen: Vec<(A, f32)>) -> Self {
        Self {
            values: HashMap::new(),
            unseen,
        }
    }

    /// Exploitation-time value of `action` in `state`
    pub fn lookup(&self, state: &S, action: A) -> f32 {
        self.values
            .get(&(*state, action))
            .copied()
            .unwrap_or_else(|| self.unseen_value(action))
    }

    /// Learning-time value of `action` in `state`
    pub fn value(&self, state: &S, action: A) -> f32 {
        self.values.get(&(*state, action)).copied().unwrap_or(0.0)
    }

    /// The value reported for a pair that has never been updated
    pub fn unseen_value(&self, action: A) -> f32 {
        self.unseen
            .iter()
            .find(|(a, _)| *a == action)
            .map_or(0.0, |&(_, v)| v)
    }

    pub(crate) fn set(&mut self, state: S, action: A, value: f32) {
        self.values.insert((state, action), value);
    }

    /// Whether `action` has ever been updated in `state`
    pub fn contains(&self, state: &S, action: A) -> bool {
        self.values.contains_key(&(*state, action))
    }

    /// Number of stored `(state, action)` entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of distinct states with at least one stored entry
    pub fn states(&self) -> usize {
        self.values.keys().map(|(s, _)| s).collect::<HashSet<_>>().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(S, A), &f32)> {
        self.values.iter()
    }
}

/// Most decimal places a stored value can keep, `10^39` no longer fits in an `f32`
pub const MAX_PRECISION: u32 = 38;

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone)]
pub struct QTableAgentConfig<A, D: Decay> {
    pub exploration: EpsilonGreedy<D>,
    /// Learning rate, in `(0, 1]`
    pub alpha: f32,
    /// Discount factor, in `[0, 1]`
    pub gamma: f32,
    /// Decimal places kept when storing a value, `None` keeps full precision
    pub precision: Option<u32>,
    /// Exploitation-time values for actions never tried in a state, unlisted actions read as `0`
    pub unseen_values: Vec<(A, f32)>,
}

impl<A> Default for QTableAgentConfig<A, decay::Constant> {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.1)),
            alpha: 0.2,
            gamma: 0.8,
            precision: Some(2),
            unseen_values: Vec::new(),
        }
    }
}

impl<A, D: Decay> QTableAgentConfig<A, D> {
    /// Replace the exploration policy, keeping every other setting
    ///
    /// ### Example
    /// ```ignore
    /// let config = QTableAgentConfig::default()
    ///     .with_exploration(EpsilonGreedy::new(decay::Multiplicative::new(0.995, 0.1, 0.001)?));
    /// ```
    pub fn with_exploration<E: Decay>(
        self,
        exploration: EpsilonGreedy<E>,
    ) -> QTableAgentConfig<A, E> {
        let Self {
            alpha,
            gamma,
            precision,
            unseen_values,
            ..
        } = self;
        QTableAgentConfig {
            exploration,
            alpha,
            gamma,
            precision,
            unseen_values,
        }
    }
}

/// A Q-learning agent that records one value per discrete state action pair
///
/// ### Generics
/// - `S` - The discretized state, used as a key in a [`HashMap`]
/// - `A` - The action type, used as a key in a [`HashMap`]
/// - `D` - The [`Decay`] schedule of the exploration rate
pub struct QTableAgent<S, A, D>
where
    S: Hashable,
    A: Hashable,
    D: Decay,
{
    q_table: QTable<S, A>,
    exploration: EpsilonGreedy<D>,
    alpha: f32,
    gamma: f32,
    precision: Option<u32>,
    t: u32, // ticks of epsilon decay applied
}

impl<S, A, D> QTableAgent<S, A, D>
where
    S: Hashable,
    A: Hashable,
    D: Decay,
{
    /// Initialize a new `QTableAgent`
    ///
    /// **Errors** if `alpha` is not in `(0,1]`, `gamma` is not in `[0,1]`, epsilon leaves `[0,1]`
    /// anywhere along its schedule, or `precision` exceeds [`MAX_PRECISION`]
    pub fn new(config: QTableAgentConfig<A, D>) -> Result<Self> {
        let QTableAgentConfig {
            exploration,
            alpha,
            gamma,
            precision,
            unseen_values,
        } = config;

        ensure_interval!(alpha, > 0.0, 1.0);
        ensure_interval!(gamma, 0.0, 1.0);
        exploration.validate()?;
        if let Some(precision) = precision {
            ensure_interval!(precision, 0.0, f64::from(MAX_PRECISION));
        }
        if let Some(&(_, value)) = unseen_values.iter().find(|(_, v)| v.is_nan()) {
            return Err(ConfigError::NotFinite {
                name: "unseen_values",
                value: value.into(),
            });
        }

        Ok(Self {
            q_table: QTable::new(unseen_values),
            exploration,
            alpha,
            gamma,
            precision,
            t: 0,
        })
    }

    pub fn q_table(&self) -> &QTable<S, A> {
        &self.q_table
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.t)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Choose an action based on the current state and exploration policy
    ///
    /// When exploiting, ties resolve to the earliest of the highest-valued `actions`.
    ///
    /// **Panics** if `actions` is empty
    pub fn act(&self, state: &S, actions: &[A]) -> A {
        match self.exploration.choose(self.t) {
            Choice::Explore => *actions
                .choose(&mut thread_rng())
                .expect("There is always at least one action available"),
            Choice::Exploit => self.greedy(state, actions),
        }
    }

    /// The highest-valued action, ignoring exploration
    pub fn greedy(&self, state: &S, actions: &[A]) -> A {
        let (first, rest) = actions
            .split_first()
            .expect("There is always at least one action available");
        let mut best = (*first, self.q_table.lookup(state, *first));
        for &action in rest {
            let value = self.q_table.lookup(state, action);
            if value > best.1 {
                best = (action, value);
            }
        }
        best.0
    }

    /// Apply the temporal-difference update for one transition
    ///
    /// `Q(s,a) += alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))`, with untried pairs read as `0`
    pub fn learn(&mut self, experience: Exp<S, A>, next_actions: &[A]) {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = experience;

        let q_value = self.q_table.value(&state, action);
        let max_next_q = next_actions
            .iter()
            .map(|&a| self.q_table.value(&next_state, a))
            .reduce(f32::max)
            .unwrap_or(0.0);
        let target = reward + self.gamma * max_next_q;
        let mut updated = q_value + self.alpha * (target - q_value);
        if let Some(places) = self.precision {
            updated = round_to(updated, places);
        }

        log::trace!("Q update: reward {reward}, {q_value} -> {updated}");
        self.q_table.set(state, action, updated);
    }

    /// Advance the exploration schedule by one tick
    pub fn decay_epsilon(&mut self) {
        self.t = self.t.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use statrs::distribution::{Binomial, DiscreteCDF};
    use strum::VariantArray;

    use super::*;

    #[derive(VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
    enum Act {
        Stay,
        Jump,
    }

    const ACTIONS: &[Act] = Act::VARIANTS;

    fn agent_with(
        epsilon: f32,
        alpha: f32,
        gamma: f32,
        precision: Option<u32>,
    ) -> QTableAgent<u8, Act, decay::Constant> {
        QTableAgent::new(QTableAgentConfig {
            exploration: EpsilonGreedy::new(decay::Constant::new(epsilon)),
            alpha,
            gamma,
            precision,
            unseen_values: Vec::new(),
        })
        .unwrap()
    }

    #[test]
    fn greedy_selects_argmax_and_breaks_ties_to_stay() {
        let mut agent = agent_with(0.0, 0.5, 0.5, None);
        for _ in 0..100 {
            assert_eq!(agent.act(&0, ACTIONS), Act::Stay, "Untried state ties to Stay");
        }

        agent.q_table.set(0, Act::Jump, 1.0);
        agent.q_table.set(0, Act::Stay, 1.0);
        assert_eq!(agent.act(&0, ACTIONS), Act::Stay, "Equal values tie to Stay");

        agent.q_table.set(0, Act::Jump, 1.5);
        for _ in 0..100 {
            assert_eq!(agent.act(&0, ACTIONS), Act::Jump, "Higher value always wins");
        }
    }

    #[test]
    fn unseen_bias_only_applies_when_exploiting() {
        let mut agent = QTableAgent::new(QTableAgentConfig {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.0)),
            unseen_values: vec![(Act::Jump, f32::NEG_INFINITY)],
            ..Default::default()
        })
        .unwrap();

        agent.q_table.set(0, Act::Stay, -3.0);
        assert_eq!(agent.q_table.lookup(&0, Act::Jump), f32::NEG_INFINITY);
        assert_eq!(agent.act(&0, ACTIONS), Act::Stay, "Biased Jump loses to a negative Stay");

        // Next state 1 is unseen: max_a' Q(1,a') must be 0, not -inf
        agent.learn(
            Exp {
                state: 0,
                action: Act::Jump,
                next_state: 1,
                reward: 1.0,
            },
            ACTIONS,
        );
        assert_eq!(agent.q_table.lookup(&0, Act::Jump), 0.2, "Learned from a finite target");
        assert_eq!(agent.act(&0, ACTIONS), Act::Jump);
    }

    #[test]
    fn exploration_is_uniform() {
        let agent = agent_with(1.0, 0.5, 0.5, None);
        let n = 10_000;
        let jumps = (0..n).filter(|_| agent.act(&0, ACTIONS) == Act::Jump).count() as u64;

        let binomial = Binomial::new(0.5, n).unwrap();
        let p_low = binomial.cdf(jumps);
        let p_high = 1.0 - binomial.cdf(jumps.saturating_sub(1));
        let p_value = 2.0 * p_low.min(p_high);
        assert!(
            p_value > 1e-6,
            "{jumps} jumps out of {n} is not plausibly uniform (p = {p_value})"
        );
    }

    #[test]
    fn single_update() {
        let mut agent = agent_with(0.1, 0.2, 0.8, Some(2));
        agent.q_table.set(1, Act::Stay, 5.0);
        agent.q_table.set(1, Act::Jump, 2.0);

        agent.learn(
            Exp {
                state: 0,
                action: Act::Jump,
                next_state: 1,
                reward: -10.0,
            },
            ACTIONS,
        );

        // 0 + 0.2 * (-10 + 0.8 * 5 - 0) = -1.2
        assert_eq!(agent.q_table.value(&0, Act::Jump), -1.2);
        assert_eq!(agent.q_table.len(), 3, "Exactly one entry inserted");
        assert!(!agent.q_table.contains(&0, Act::Stay), "Other action untouched");
        assert_eq!(agent.q_table.states(), 2);
    }

    #[test]
    fn stored_values_are_rounded() {
        let mut agent = agent_with(0.1, 0.3, 0.0, Some(2));
        agent.learn(
            Exp {
                state: 0,
                action: Act::Stay,
                next_state: 0,
                reward: 1.0 / 3.0,
            },
            ACTIONS,
        );
        assert_eq!(agent.q_table.value(&0, Act::Stay), 0.1, "0.3 * 0.333.. rounds to 0.1");
    }

    #[test]
    fn self_loop_converges() {
        let (reward, gamma) = (1.0, 0.5);
        let expected = reward / (1.0 - gamma);

        let mut exact = agent_with(0.1, 0.5, gamma, None);
        let mut rounded = agent_with(0.1, 0.5, gamma, Some(2));
        for _ in 0..200 {
            for agent in [&mut exact, &mut rounded] {
                agent.learn(
                    Exp {
                        state: 7,
                        action: Act::Jump,
                        next_state: 7,
                        reward,
                    },
                    ACTIONS,
                );
            }
        }

        let q = exact.q_table.value(&7, Act::Jump);
        assert!((q - expected).abs() < 1e-4, "Converged to {q}, expected {expected}");
        let q = rounded.q_table.value(&7, Act::Jump);
        assert!(
            (q - expected).abs() <= 0.05,
            "Quantized table settles within rounding of {expected}, got {q}"
        );
    }

    #[test]
    fn rejects_invalid_hyperparameters() {
        let build = |alpha, gamma, epsilon| {
            QTableAgent::<u8, Act, _>::new(QTableAgentConfig {
                exploration: EpsilonGreedy::new(decay::Constant::new(epsilon)),
                alpha,
                gamma,
                ..Default::default()
            })
        };
        assert!(build(0.2, 0.8, 0.1).is_ok());
        assert!(build(0.0, 0.8, 0.1).is_err(), "Zero learning rate rejected");
        assert!(build(1.2, 0.8, 0.1).is_err(), "Learning rate above 1 rejected");
        assert!(build(0.2, 1.5, 0.1).is_err(), "Discount above 1 rejected");
        assert!(build(0.2, 0.8, 1.5).is_err(), "Epsilon above 1 rejected");
    }

    #[test]
    fn rejects_unrepresentable_precision() {
        let build = |precision| {
            QTableAgent::<u8, Act, _>::new(QTableAgentConfig {
                precision,
                ..Default::default()
            })
        };
        assert!(build(None).is_ok());
        assert!(build(Some(MAX_PRECISION)).is_ok());
        assert!(
            matches!(build(Some(40)), Err(ConfigError::OutOfRange { name: "precision", .. })),
            "Scale factor would overflow to infinity"
        );
        assert!(build(Some(u32::MAX)).is_err());

        let mut agent = agent_with(0.0, 0.5, 0.5, Some(MAX_PRECISION));
        agent.learn(
            Exp {
                state: 0,
                action: Act::Jump,
                next_state: 1,
                reward: 10.0,
            },
            ACTIONS,
        );
        assert_eq!(
            agent.q_table().value(&0, Act::Jump),
            5.0,
            "Finest precision still stores a finite value"
        );
    }

    #[test]
    fn epsilon_decay_respects_floor_and_constant() {
        let mut fixed = agent_with(0.1, 0.2, 0.8, None);
        for _ in 0..1000 {
            fixed.decay_epsilon();
        }
        assert_eq!(fixed.epsilon(), 0.1, "Constant schedule never decays");

        let config = QTableAgentConfig::<Act, _>::default().with_exploration(EpsilonGreedy::new(
            decay::Multiplicative::new(0.995, 0.1, 0.001).unwrap(),
        ));
        assert_eq!(config.alpha, 0.2, "Other settings survive the swap");
        assert_eq!(config.precision, Some(2));
        let mut decaying = QTableAgent::<u8, Act, _>::new(config).unwrap();
        decaying.decay_epsilon();
        assert!((decaying.epsilon() - 0.0995).abs() < 1e-6, "One multiplicative step");
        for _ in 0..10_000 {
            decaying.decay_epsilon();
            assert!(decaying.epsilon() >= 0.001, "Never below the floor");
        }
        assert_eq!(decaying.epsilon(), 0.001);
    }
}
