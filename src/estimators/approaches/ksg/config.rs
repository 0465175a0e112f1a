// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration of the KSG estimator, as typed values and as string properties.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const PROP_K: &str = "k";
pub const PROP_ALGORITHM: &str = "algorithm";
pub const PROP_NORMALIZE: &str = "normalize";
pub const PROP_ADD_NOISE: &str = "add-noise";
pub const PROP_NOISE_SEED: &str = "noise-seed";
pub const PROP_DYN_CORR_EXCL_TIME: &str = "dyn-corr-excl-time";
pub const PROP_NUM_THREADS: &str = "num-threads";

pub const DEFAULT_K: usize = 4;
pub const DEFAULT_NOISE_LEVEL: f64 = 1e-8;

/// KSG estimator variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KsgVariant {
    /// Algorithm 1: joint hypercube radius, strict marginal counts.
    #[default]
    Algorithm1,
    /// Algorithm 2: per-axis rectangle radii, inclusive marginal counts.
    Algorithm2,
}

impl FromStr for KsgVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(KsgVariant::Algorithm1),
            "2" => Ok(KsgVariant::Algorithm2),
            _ => Err(invalid(PROP_ALGORITHM, s, "expected 1 or 2")),
        }
    }
}

impl fmt::Display for KsgVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KsgVariant::Algorithm1 => write!(f, "1"),
            KsgVariant::Algorithm2 => write!(f, "2"),
        }
    }
}

/// Seed for a random number generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seed {
    /// Drawn from process entropy; not reproducible across runs.
    #[default]
    Unseeded,
    Fixed(u64),
}

impl FromStr for Seed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unseeded") || trimmed.eq_ignore_ascii_case("none") {
            return Ok(Seed::Unseeded);
        }
        trimmed
            .parse::<u64>()
            .map(Seed::Fixed)
            .map_err(|_| invalid(PROP_NOISE_SEED, s, "expected \"unseeded\" or an unsigned integer"))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Unseeded => write!(f, "unseeded"),
            Seed::Fixed(seed) => write!(f, "{seed}"),
        }
    }
}

/// How many worker threads evaluate local values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadPolicy {
    /// One worker per available hardware thread.
    #[default]
    AllAvailable,
    /// An explicit worker count; 1 runs sequentially on the calling thread.
    Fixed(usize),
}

impl ThreadPolicy {
    /// Worker count before clamping to the amount of work; queries the hardware for
    /// `AllAvailable`.
    pub fn thread_count(self) -> usize {
        match self {
            ThreadPolicy::AllAvailable => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            ThreadPolicy::Fixed(n) => n.max(1),
        }
    }

    /// Resolve into a concrete worker count for `work_items` samples.
    pub fn resolve(self, work_items: usize) -> usize {
        clamp_workers(self.thread_count(), work_items)
    }
}

/// Clamp a worker count to `[1, work_items]`.
pub(crate) fn clamp_workers(threads: usize, work_items: usize) -> usize {
    threads.clamp(1, work_items.max(1))
}

impl FromStr for ThreadPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(ThreadPolicy::AllAvailable);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(ThreadPolicy::Fixed(n)),
            _ => Err(invalid(PROP_NUM_THREADS, s, "expected \"all\" or an integer >= 1")),
        }
    }
}

impl fmt::Display for ThreadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadPolicy::AllAvailable => write!(f, "all"),
            ThreadPolicy::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Settings of a KSG mutual information estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct KsgConfig {
    pub k: usize,
    pub variant: KsgVariant,
    pub normalize: bool,
    pub noise_level: f64,
    pub noise_seed: Seed,
    pub exclusion_window: usize,
    pub threads: ThreadPolicy,
}

impl Default for KsgConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            variant: KsgVariant::default(),
            normalize: true,
            noise_level: DEFAULT_NOISE_LEVEL,
            noise_seed: Seed::default(),
            exclusion_window: 0,
            threads: ThreadPolicy::default(),
        }
    }
}

impl KsgConfig {
    pub fn with_k(mut self, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidK(k));
        }
        self.k = k;
        Ok(self)
    }

    pub fn with_variant(mut self, variant: KsgVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_noise(mut self, level: f64, seed: Seed) -> Result<Self> {
        if !level.is_finite() || level < 0.0 {
            return Err(invalid(PROP_ADD_NOISE, &level.to_string(), "expected a finite value >= 0"));
        }
        self.noise_level = level;
        self.noise_seed = seed;
        Ok(self)
    }

    pub fn with_exclusion_window(mut self, window: usize) -> Self {
        self.exclusion_window = window;
        self
    }

    pub fn with_threads(mut self, threads: ThreadPolicy) -> Result<Self> {
        if threads == ThreadPolicy::Fixed(0) {
            return Err(invalid(PROP_NUM_THREADS, "0", "expected \"all\" or an integer >= 1"));
        }
        self.threads = threads;
        Ok(self)
    }

    /// Whether an index built under `self` is still valid under `other`.
    pub fn same_geometry(&self, other: &KsgConfig) -> bool {
        self.k == other.k
            && self.normalize == other.normalize
            && self.noise_level == other.noise_level
            && self.noise_seed == other.noise_seed
            && self.exclusion_window == other.exclusion_window
    }

    /// Set a property from its string form. Keys are matched case-insensitively.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        match key.trim().to_lowercase().as_str() {
            PROP_K => {
                let k = trimmed
                    .parse::<usize>()
                    .map_err(|_| invalid(PROP_K, value, "expected an integer >= 1"))?;
                *self = self.clone().with_k(k)?;
            }
            PROP_ALGORITHM => self.variant = value.parse()?,
            PROP_NORMALIZE => self.normalize = parse_bool(PROP_NORMALIZE, value)?,
            PROP_ADD_NOISE => {
                let level = if trimmed.eq_ignore_ascii_case("false") {
                    0.0
                } else {
                    trimmed
                        .parse::<f64>()
                        .map_err(|_| invalid(PROP_ADD_NOISE, value, "expected a real number >= 0"))?
                };
                if !level.is_finite() || level < 0.0 {
                    return Err(invalid(PROP_ADD_NOISE, value, "expected a finite value >= 0"));
                }
                self.noise_level = level;
            }
            PROP_NOISE_SEED => self.noise_seed = value.parse()?,
            PROP_DYN_CORR_EXCL_TIME => {
                self.exclusion_window = trimmed
                    .parse::<usize>()
                    .map_err(|_| invalid(PROP_DYN_CORR_EXCL_TIME, value, "expected an integer >= 0"))?;
            }
            PROP_NUM_THREADS => self.threads = value.parse()?,
            _ => return Err(Error::UnknownProperty(key.to_string())),
        }
        Ok(())
    }

    pub fn property(&self, key: &str) -> Result<String> {
        let value = match key.trim().to_lowercase().as_str() {
            PROP_K => self.k.to_string(),
            PROP_ALGORITHM => self.variant.to_string(),
            PROP_NORMALIZE => self.normalize.to_string(),
            PROP_ADD_NOISE => self.noise_level.to_string(),
            PROP_NOISE_SEED => self.noise_seed.to_string(),
            PROP_DYN_CORR_EXCL_TIME => self.exclusion_window.to_string(),
            PROP_NUM_THREADS => self.threads.to_string(),
            _ => return Err(Error::UnknownProperty(key.to_string())),
        };
        Ok(value)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

fn invalid(key: &str, value: &str, reason: &'static str) -> Error {
    Error::InvalidProperty {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}
