//! Clustered sampling through per-key pools of previously emitted values.
//!
//! Each call either generates a fresh value from the wrapped generator or
//! re-emits one already produced for the same key. Every emitted value is
//! appended to the key's pool, so frequently emitted values become more likely
//! to be picked again (preferential attachment). The resulting columns have a
//! few very common values and a long tail, instead of uniform noise.

use super::ColumnGenerator;
use crate::error::{GenError, Result};
use crate::row::RowBuilder;
use crate::session::Session;
use crate::value::Value;
use ahash::AHashMap;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Probability of generating a fresh value even when the pool is non-empty.
pub const DEFAULT_SKIP_PROBABILITY: f64 = 0.1;

type KeyFn = Box<dyn Fn(&RowBuilder<'_>) -> Result<Value>>;

/// Wraps a generator to produce a skewed, clustered distribution.
///
/// Without a key function every row shares one pool. With one, rows are
/// clustered by the key (for example salaries grouped by job title), and each
/// key grows its own pool.
pub struct Biased<G> {
    base: G,
    key: Option<KeyFn>,
    skip_probability: f64,
    pools: AHashMap<Value, Vec<Value>>,
}

impl<G: ColumnGenerator> Biased<G> {
    pub fn new(base: G) -> Self {
        Self {
            base,
            key: None,
            skip_probability: DEFAULT_SKIP_PROBABILITY,
            pools: AHashMap::new(),
        }
    }

    /// Set the probability of bypassing a non-empty pool.
    ///
    /// `0.0` means only the first value per key is ever generated; `1.0`
    /// means every value is fresh.
    pub fn with_skip_probability(mut self, probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GenError::InvalidProbability(probability));
        }
        self.skip_probability = probability;
        Ok(self)
    }

    /// Cluster by an arbitrary function of the in-progress row
    pub fn keyed_by<F>(mut self, key: F) -> Self
    where
        F: Fn(&RowBuilder<'_>) -> Result<Value> + 'static,
    {
        self.key = Some(Box::new(key));
        self
    }

    /// Cluster by the value of an earlier column of the same row
    pub fn keyed_by_column(self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.keyed_by(move |row| row.get(&column).cloned())
    }

    pub fn skip_probability(&self) -> f64 {
        self.skip_probability
    }

    /// Values emitted so far for `key`, in emission order.
    ///
    /// Unkeyed samplers store everything under [`Value::Null`].
    pub fn pool(&self, key: &Value) -> &[Value] {
        self.pools.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct keys seen so far
    pub fn key_count(&self) -> usize {
        self.pools.len()
    }
}

impl<G: ColumnGenerator> ColumnGenerator for Biased<G> {
    fn generate(&mut self, row: &RowBuilder<'_>, session: &mut Session) -> Result<Value> {
        let key = match &self.key {
            Some(key_of) => key_of(row)?,
            None => Value::Null,
        };

        let reused = match self.pools.get(&key) {
            Some(pool) if !pool.is_empty() => {
                let rng = session.rng();
                if rng.random::<f64>() < self.skip_probability {
                    None
                } else {
                    pool.choose(rng).cloned()
                }
            }
            _ => None,
        };

        let value = match reused {
            Some(value) => value,
            None => self.base.generate(row, session)?,
        };

        self.pools.entry(key).or_default().push(value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Sequence;
    use crate::session::{Session, SessionConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_session() -> Session {
        Session::with_rng(SessionConfig::default(), StdRng::seed_from_u64(42)).unwrap()
    }

    /// Drive a sampler directly, outside of any table
    fn emit(sampler: &mut Biased<Sequence>, session: &mut Session, times: usize) -> Vec<Value> {
        let columns = vec!["v".to_string()];
        (0..times)
            .map(|_| {
                let builder = RowBuilder::new("t", &columns);
                sampler.generate(&builder, session).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_zero_skip_probability_emits_single_value() {
        let mut session = seeded_session();
        let mut sampler = Biased::new(Sequence::default())
            .with_skip_probability(0.0)
            .unwrap();

        let values = emit(&mut sampler, &mut session, 1000);

        assert!(values.iter().all(|v| v == &Value::Int(1)));
        assert_eq!(sampler.pool(&Value::Null).len(), 1000);
    }

    #[test]
    fn test_full_skip_probability_always_fresh() {
        let mut session = seeded_session();
        let mut sampler = Biased::new(Sequence::default())
            .with_skip_probability(1.0)
            .unwrap();

        let values = emit(&mut sampler, &mut session, 100);
        let expected: Vec<Value> = (1..=100).map(Value::Int).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_every_emission_is_recorded() {
        let mut session = seeded_session();
        let mut sampler = Biased::new(Sequence::default());

        emit(&mut sampler, &mut session, 250);

        assert_eq!(sampler.pool(&Value::Null).len(), 250);
        assert_eq!(sampler.key_count(), 1);
    }

    #[test]
    fn test_distinct_ratio_converges_to_skip_probability() {
        let mut session = seeded_session();
        let mut sampler = Biased::new(Sequence::default())
            .with_skip_probability(0.1)
            .unwrap();

        let values = emit(&mut sampler, &mut session, 20_000);
        let distinct: ahash::AHashSet<&Value> = values.iter().collect();
        let ratio = distinct.len() as f64 / values.len() as f64;

        assert!((ratio - 0.1).abs() < 0.02, "ratio was {ratio}");
    }

    #[test]
    fn test_invalid_probability_rejected() {
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                Biased::new(Sequence::default()).with_skip_probability(p),
                Err(GenError::InvalidProbability(_))
            ));
        }
    }
}
