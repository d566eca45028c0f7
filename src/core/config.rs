//! Configuration management for spanlog.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Builder-based programmatic overrides
//! - Validation and defaults
//!
//! The defaults reproduce the classic layout: 37 timestamp bits, 5
//! group bits, 10 machine bits, leaving 12 sequence bits (4096
//! identifiers per millisecond per generator).

use crate::core::{Result, SpanlogError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of bits for the millisecond timestamp field.
pub const DEFAULT_TIMESTAMP_BITS: u32 = 37;
/// Default number of bits for the partition group field.
pub const DEFAULT_GROUP_BITS: u32 = 5;
/// Default number of bits for the machine field.
pub const DEFAULT_MACHINE_BITS: u32 = 10;
/// Default number of spans accepted per millisecond.
pub const DEFAULT_SPAN_LIMIT: u32 = 100;

/// Width of a packed identifier in bits.
pub const TOTAL_BITS: u32 = 64;

/// Complete configuration for spanlog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier generator configuration
    pub generator: GeneratorConfig,
    /// Sampling configuration
    pub sampling: SamplingConfig,
}

/// Identifier generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Bits reserved for the millisecond timestamp
    pub timestamp_bits: u32,
    /// Bits reserved for the partition group id
    pub group_bits: u32,
    /// Bits reserved for the machine id
    pub machine_bits: u32,
}

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Maximum spans accepted per millisecond
    pub span_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timestamp_bits: DEFAULT_TIMESTAMP_BITS,
            group_bits: DEFAULT_GROUP_BITS,
            machine_bits: DEFAULT_MACHINE_BITS,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            span_limit: DEFAULT_SPAN_LIMIT,
        }
    }
}

impl GeneratorConfig {
    /// Bits left over for the per-millisecond sequence counter.
    pub fn sequence_bits(&self) -> u32 {
        TOTAL_BITS.saturating_sub(self.timestamp_bits + self.group_bits + self.machine_bits)
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let g = &self.generator;
        for (name, bits) in [
            ("timestamp_bits", g.timestamp_bits),
            ("group_bits", g.group_bits),
            ("machine_bits", g.machine_bits),
        ] {
            if bits == 0 {
                return Err(SpanlogError::config(format!("{name} must be non-zero")));
            }
        }
        let used = g.timestamp_bits + g.group_bits + g.machine_bits;
        if used >= TOTAL_BITS {
            return Err(SpanlogError::config(format!(
                "bit widths use {used} of {TOTAL_BITS} bits, leaving no room for a sequence"
            )));
        }
        if self.sampling.span_limit == 0 {
            return Err(SpanlogError::config("span_limit must be non-zero"));
        }
        Ok(())
    }
}

/// Builder for creating Config instances
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a YAML document; fields the document does
    /// not mention fall back to their defaults.
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)?;
        Ok(self)
    }

    /// Sets the timestamp bit width.
    pub fn timestamp_bits(mut self, bits: u32) -> Self {
        self.config.generator.timestamp_bits = bits;
        self
    }

    /// Sets the group bit width.
    pub fn group_bits(mut self, bits: u32) -> Self {
        self.config.generator.group_bits = bits;
        self
    }

    /// Sets the machine bit width.
    pub fn machine_bits(mut self, bits: u32) -> Self {
        self.config.generator.machine_bits = bits;
        self
    }

    /// Sets the per-millisecond span budget.
    pub fn span_limit(mut self, limit: u32) -> Self {
        self.config.sampling.span_limit = limit;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
