//! Validated scalar value types for the market domain

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A probability-style price in the closed interval [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Construct from a decimal value, rejecting anything outside [0, 1]
    pub fn new(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(Error::InvalidRange(format!(
                "price must be between 0 and 1, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Parse from a decimal string as carried on the wire
    pub fn parse(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s)
            .map_err(|e| Error::Parse(format!("invalid price {s:?}: {e}")))?;
        Self::new(value)
    }

    /// Construct from a float, as read back from columnar storage
    pub fn from_f64(value: f64) -> Result<Self> {
        let dec = Decimal::from_f64(value)
            .ok_or_else(|| Error::InvalidRange(format!("price not representable: {value}")))?;
        Self::new(dec)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The venue's default tick size
    pub fn default_tick() -> Self {
        Self(Decimal::new(1, 2))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Lossy float representation for columnar storage
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative order size
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(Error::InvalidRange(format!(
                "quantity must be non-negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s)
            .map_err(|e| Error::Parse(format!("invalid quantity {s:?}: {e}")))?;
        Self::new(value)
    }

    pub fn from_f64(value: f64) -> Result<Self> {
        let dec = Decimal::from_f64(value)
            .ok_or_else(|| Error::InvalidRange(format!("quantity not representable: {value}")))?;
        Self::new(dec)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since the Unix epoch, never negative
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_millis(ms: i64) -> Result<Self> {
        if ms < 0 {
            return Err(Error::InvalidRange(format!(
                "timestamp must be non-negative, got {ms}"
            )));
        }
        Ok(Self(ms))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let ms: i64 = s
            .parse()
            .map_err(|e| Error::Parse(format!("invalid timestamp {s:?}: {e}")))?;
        Self::from_millis(ms)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    fn as_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// UTC calendar date, used for partition directories
    pub fn date_string(&self) -> String {
        self.as_datetime()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "1970-01-01".to_string())
    }

    /// Two-digit UTC hour, used in partition file names
    pub fn hour_string(&self) -> String {
        self.as_datetime()
            .map(|dt| dt.format("%H").to_string())
            .unwrap_or_else(|| "00".to_string())
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Columnar encoding: 0 = BUY, 1 = SELL
    pub fn as_u8(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(Error::InvalidEnum(format!("side code {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(Error::InvalidEnum(format!("side {other:?}"))),
        }
    }
}

/// A tradable outcome token, identified by (condition_id, token_id)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketAsset {
    condition_id: String,
    token_id: String,
}

impl MarketAsset {
    pub fn new(condition_id: impl Into<String>, token_id: impl Into<String>) -> Result<Self> {
        let condition_id = condition_id.into();
        let token_id = token_id.into();
        if condition_id.is_empty() {
            return Err(Error::InvalidRange("condition_id must not be empty".into()));
        }
        if token_id.is_empty() {
            return Err(Error::InvalidRange("token_id must not be empty".into()));
        }
        Ok(Self {
            condition_id,
            token_id,
        })
    }

    pub fn condition_id(&self) -> &str {
        &self.condition_id
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }
}

impl fmt::Display for MarketAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.condition_id, self.token_id)
    }
}

/// A single aggregated level of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub size: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price, size: Quantity) -> Self {
        Self { price, size }
    }

    pub fn from_strings(price: &str, size: &str) -> Result<Self> {
        Ok(Self {
            price: Price::parse(price)?,
            size: Quantity::parse(size)?,
        })
    }
}
